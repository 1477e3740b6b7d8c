use crate::currency::{Currency, CurrencyUnit};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One normalized quote for a currency.
///
/// Records are built fresh from every upstream parse and never mutated
/// afterwards; a newer fetch replaces them wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub currency: Currency,
    pub price: f64,
    pub unit: Option<CurrencyUnit>,
    pub symbol: Option<String>,
    pub change_24h: Option<f64>,
    pub change_percentage_24h: Option<f64>,
    pub high_24h: Option<f64>,
    pub low_24h: Option<f64>,
    pub volume_24h: Option<f64>,
    pub market_cap: Option<f64>,
    pub timestamp: DateTime<Utc>,
    /// Untransformed upstream data for this instrument.
    pub raw: Value,
}

impl PriceRecord {
    /// A bare record stamped with the current time.
    pub fn new(currency: Currency, price: f64) -> Self {
        Self {
            currency,
            price,
            unit: None,
            symbol: None,
            change_24h: None,
            change_percentage_24h: None,
            high_24h: None,
            low_24h: None,
            volume_24h: None,
            market_cap: None,
            timestamp: Utc::now(),
            raw: Value::Null,
        }
    }
}
