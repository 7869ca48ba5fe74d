use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CoreError;

/// The type/category of a traded instrument.
/// Classification is heuristic (static symbol set + quote-suffix check),
/// not authoritative — see `SymbolNormalizer::classify_asset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    /// Equities (AAPL, MSFT, etc.)
    Stock,
    /// Cryptocurrencies (BTC, ETH, etc.)
    Crypto,
}

impl std::fmt::Display for AssetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetType::Stock => write!(f, "stock"),
            AssetType::Crypto => write!(f, "crypto"),
        }
    }
}

/// Direction of a trade. Never null in an emitted record — a row whose
/// side cannot be determined is skipped, not defaulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl std::fmt::Display for TradeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "buy"),
            TradeSide::Sell => write!(f, "sell"),
        }
    }
}

/// Provenance of a trade record: which importer (or manual entry) produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TradeSource {
    /// Generic CSV import
    Csv,
    /// Trading212 CSV export
    Trading212,
    /// Interactive Brokers activity statement
    Ibkr,
    /// Entered by hand in the UI
    Manual,
    /// A connected exchange account, by name (e.g. "binance")
    Exchange(String),
}

impl std::fmt::Display for TradeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeSource::Csv => write!(f, "csv"),
            TradeSource::Trading212 => write!(f, "trading212"),
            TradeSource::Ibkr => write!(f, "ibkr"),
            TradeSource::Manual => write!(f, "manual"),
            TradeSource::Exchange(name) => write!(f, "{name}"),
        }
    }
}

impl From<&str> for TradeSource {
    fn from(s: &str) -> Self {
        match s {
            "csv" => TradeSource::Csv,
            "trading212" => TradeSource::Trading212,
            "ibkr" => TradeSource::Ibkr,
            "manual" => TradeSource::Manual,
            other => TradeSource::Exchange(other.to_string()),
        }
    }
}

// Serialized as a plain tag string ("csv", "ibkr", exchange name...)
// so stored records stay readable and forward-compatible.
impl Serialize for TradeSource {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TradeSource {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(TradeSource::from(s.as_str()))
    }
}

/// A single buy or sell execution record — the canonical output of the
/// import pipeline and the only shape downstream storage/UI code relies on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Unique identifier, collision-resistant within a session
    pub id: Uuid,

    /// Resolved ticker/identifier, uppercased, exchange suffix trimmed
    pub symbol: String,

    /// Stock or crypto (heuristic classification)
    pub asset_type: AssetType,

    /// Buy or sell
    pub side: TradeSide,

    /// Units traded (always positive, full precision preserved)
    pub quantity: f64,

    /// Currency units per unit quantity (always positive)
    pub price: f64,

    /// Commission/fee paid, non-negative
    #[serde(default)]
    pub fee: f64,

    /// Execution timestamp; defaults to import time when unparsable
    pub date: DateTime<Utc>,

    /// Which importer produced this record
    pub source: TradeSource,

    /// Currency code from the export, when a currency column was detected
    #[serde(default)]
    pub currency: Option<String>,
}

impl Trade {
    pub fn new(
        symbol: impl Into<String>,
        asset_type: AssetType,
        side: TradeSide,
        quantity: f64,
        price: f64,
        date: DateTime<Utc>,
        source: TradeSource,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol: symbol.into().trim().to_uppercase(),
            asset_type,
            side,
            quantity,
            price,
            fee: 0.0,
            date,
            source,
            currency: None,
        }
    }

    /// Attach a fee (stored as absolute value).
    #[must_use]
    pub fn with_fee(mut self, fee: f64) -> Self {
        self.fee = fee.abs();
        self
    }

    /// Attach a currency code (uppercased).
    #[must_use]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into().trim().to_uppercase());
        self
    }

    /// Trade value excluding fees: quantity × price.
    #[must_use]
    pub fn notional(&self) -> f64 {
        self.quantity * self.price
    }

    /// Check the record invariants: non-empty symbol, positive quantity
    /// and price, non-negative finite fee.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.symbol.trim().is_empty() {
            return Err(CoreError::ValidationError("Symbol must not be empty".into()));
        }
        if !(self.quantity > 0.0) || !self.quantity.is_finite() {
            return Err(CoreError::ValidationError(format!(
                "Quantity must be positive, got {}",
                self.quantity
            )));
        }
        if !(self.price > 0.0) || !self.price.is_finite() {
            return Err(CoreError::ValidationError(format!(
                "Price must be positive, got {}",
                self.price
            )));
        }
        if self.fee < 0.0 || !self.fee.is_finite() {
            return Err(CoreError::ValidationError(format!(
                "Fee must be non-negative, got {}",
                self.fee
            )));
        }
        Ok(())
    }
}
