use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// Provider-independent identity of a priced instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Currency {
    // Cryptocurrencies
    Btc,
    Eth,
    Usdt,
    Bnb,
    Xrp,
    Ada,
    Doge,
    Sol,
    Trx,
    Dot,
    Matic,
    Ltc,
    Shib,
    Avax,
    Uni,
    Link,

    // Fiat
    Usd,
    Eur,
    Gbp,
    Jpy,
    Cny,
    Aud,
    Cad,
    Chf,
    Irr,
    Aed,
    Try,

    // Precious metals and coins
    Gold,
    Silver,
    Platinum,
    Palladium,
    GoldOunce,
    IrGold18,
    IrCoin1g,
    IrCoinQuarter,
    IrCoinHalf,
    IrCoinEmami,
    IrCoinBahar,
}

const CRYPTOCURRENCIES: &[Currency] = &[
    Currency::Btc,
    Currency::Eth,
    Currency::Usdt,
    Currency::Bnb,
    Currency::Xrp,
    Currency::Ada,
    Currency::Doge,
    Currency::Sol,
    Currency::Trx,
    Currency::Dot,
    Currency::Matic,
    Currency::Ltc,
    Currency::Shib,
    Currency::Avax,
    Currency::Uni,
    Currency::Link,
];

const FIAT_CURRENCIES: &[Currency] = &[
    Currency::Usd,
    Currency::Eur,
    Currency::Gbp,
    Currency::Jpy,
    Currency::Cny,
    Currency::Aud,
    Currency::Cad,
    Currency::Chf,
    Currency::Irr,
    Currency::Aed,
    Currency::Try,
];

const PRECIOUS_METALS: &[Currency] = &[
    Currency::Gold,
    Currency::Silver,
    Currency::Platinum,
    Currency::Palladium,
    Currency::GoldOunce,
    Currency::IrGold18,
    Currency::IrCoin1g,
    Currency::IrCoinQuarter,
    Currency::IrCoinHalf,
    Currency::IrCoinEmami,
    Currency::IrCoinBahar,
];

impl Currency {
    /// Every known identifier, in declaration order.
    pub const ALL: [Currency; 38] = [
        Currency::Btc,
        Currency::Eth,
        Currency::Usdt,
        Currency::Bnb,
        Currency::Xrp,
        Currency::Ada,
        Currency::Doge,
        Currency::Sol,
        Currency::Trx,
        Currency::Dot,
        Currency::Matic,
        Currency::Ltc,
        Currency::Shib,
        Currency::Avax,
        Currency::Uni,
        Currency::Link,
        Currency::Usd,
        Currency::Eur,
        Currency::Gbp,
        Currency::Jpy,
        Currency::Cny,
        Currency::Aud,
        Currency::Cad,
        Currency::Chf,
        Currency::Irr,
        Currency::Aed,
        Currency::Try,
        Currency::Gold,
        Currency::Silver,
        Currency::Platinum,
        Currency::Palladium,
        Currency::GoldOunce,
        Currency::IrGold18,
        Currency::IrCoin1g,
        Currency::IrCoinQuarter,
        Currency::IrCoinHalf,
        Currency::IrCoinEmami,
        Currency::IrCoinBahar,
    ];

    pub fn cases() -> &'static [Currency] {
        &Self::ALL
    }

    pub fn cryptocurrencies() -> &'static [Currency] {
        CRYPTOCURRENCIES
    }

    pub fn fiat_currencies() -> &'static [Currency] {
        FIAT_CURRENCIES
    }

    pub fn precious_metals() -> &'static [Currency] {
        PRECIOUS_METALS
    }

    pub fn is_crypto(self) -> bool {
        CRYPTOCURRENCIES.contains(&self)
    }

    pub fn is_fiat(self) -> bool {
        FIAT_CURRENCIES.contains(&self)
    }

    pub fn is_precious_metal(self) -> bool {
        PRECIOUS_METALS.contains(&self)
    }

    /// The stable user-facing symbol, also used in cache keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Currency::Btc => "BTC",
            Currency::Eth => "ETH",
            Currency::Usdt => "USDT",
            Currency::Bnb => "BNB",
            Currency::Xrp => "XRP",
            Currency::Ada => "ADA",
            Currency::Doge => "DOGE",
            Currency::Sol => "SOL",
            Currency::Trx => "TRX",
            Currency::Dot => "DOT",
            Currency::Matic => "MATIC",
            Currency::Ltc => "LTC",
            Currency::Shib => "SHIB",
            Currency::Avax => "AVAX",
            Currency::Uni => "UNI",
            Currency::Link => "LINK",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Jpy => "JPY",
            Currency::Cny => "CNY",
            Currency::Aud => "AUD",
            Currency::Cad => "CAD",
            Currency::Chf => "CHF",
            Currency::Irr => "IRR",
            Currency::Aed => "AED",
            Currency::Try => "TRY",
            Currency::Gold => "GOLD",
            Currency::Silver => "SILVER",
            Currency::Platinum => "PLATINUM",
            Currency::Palladium => "PALLADIUM",
            Currency::GoldOunce => "GOLD_OUNCE",
            Currency::IrGold18 => "IR_GOLD_18",
            Currency::IrCoin1g => "IR_COIN_1G",
            Currency::IrCoinQuarter => "IR_COIN_QUARTER",
            Currency::IrCoinHalf => "IR_COIN_HALF",
            Currency::IrCoinEmami => "IR_COIN_EMAMI",
            Currency::IrCoinBahar => "IR_COIN_BAHAR",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCurrency(pub String);

impl fmt::Display for UnknownCurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown currency {:?}", self.0)
    }
}

impl std::error::Error for UnknownCurrency {}

impl FromStr for Currency {
    type Err = UnknownCurrency;

    /// Case-insensitive lookup by symbol.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownCurrency(s.to_owned()))
    }
}

impl Serialize for Currency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Currency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let symbol = String::deserialize(deserializer)?;
        symbol.parse().map_err(de::Error::custom)
    }
}

/// Unit a provider quotes its prices in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurrencyUnit {
    /// Iranian Rial
    #[serde(rename = "IRR")]
    Irr,
    /// Iranian Toman
    #[serde(rename = "IRT")]
    Irt,
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "EUR")]
    Eur,
}

impl CurrencyUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            CurrencyUnit::Irr => "IRR",
            CurrencyUnit::Irt => "IRT",
            CurrencyUnit::Usd => "USD",
            CurrencyUnit::Eur => "EUR",
        }
    }

    /// Maps a quoting-currency code such as GoldAPI's `base_currency`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_uppercase().as_str() {
            "IRR" => Some(CurrencyUnit::Irr),
            "IRT" => Some(CurrencyUnit::Irt),
            "USD" => Some(CurrencyUnit::Usd),
            "EUR" => Some(CurrencyUnit::Eur),
            _ => None,
        }
    }
}

impl fmt::Display for CurrencyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
