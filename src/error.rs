use crate::currency::Currency;
use crate::transport::TransportError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PriceFeedError>;

#[derive(Debug, Error)]
pub enum PriceFeedError {
    #[error("adapter [{0}] is not configured")]
    AdapterNotFound(String),

    #[error("currency [{currency}] is not supported by adapter [{adapter}]")]
    UnsupportedCurrency { adapter: String, currency: Currency },

    #[error("{adapter}: upstream request{} failed: {message}", for_currency(.currency))]
    Upstream {
        adapter: String,
        currency: Option<Currency>,
        message: String,
        #[source]
        source: Option<TransportError>,
    },

    #[error("{adapter}: {field} is missing for {currency}")]
    MalformedData {
        adapter: String,
        currency: Currency,
        field: &'static str,
    },

    #[error("invalid settings: {0}")]
    Settings(String),
}

fn for_currency(currency: &Option<Currency>) -> String {
    currency
        .map(|c| format!(" for {}", c))
        .unwrap_or_default()
}

impl PriceFeedError {
    pub fn upstream(adapter: &str, message: impl Into<String>) -> Self {
        PriceFeedError::Upstream {
            adapter: adapter.to_owned(),
            currency: None,
            message: message.into(),
            source: None,
        }
    }

    pub fn transport(adapter: &str, source: TransportError) -> Self {
        PriceFeedError::Upstream {
            adapter: adapter.to_owned(),
            currency: None,
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Fills in the requesting currency on errors raised while fetching a
    /// payload shared by many currencies.
    pub fn with_currency(self, requested: Currency) -> Self {
        match self {
            PriceFeedError::Upstream {
                adapter,
                currency: None,
                message,
                source,
            } => PriceFeedError::Upstream {
                adapter,
                currency: Some(requested),
                message,
                source,
            },
            other => other,
        }
    }

    /// The adapter the error originated from, when there is one.
    pub fn adapter(&self) -> Option<&str> {
        match self {
            PriceFeedError::AdapterNotFound(name) => Some(name),
            PriceFeedError::UnsupportedCurrency { adapter, .. }
            | PriceFeedError::Upstream { adapter, .. }
            | PriceFeedError::MalformedData { adapter, .. } => Some(adapter),
            PriceFeedError::Settings(_) => None,
        }
    }
}

impl From<config::ConfigError> for PriceFeedError {
    fn from(err: config::ConfigError) -> Self {
        PriceFeedError::Settings(err.to_string())
    }
}
