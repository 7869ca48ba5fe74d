use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::trade::AssetType;

/// An open position in a single symbol, derived from the trade history
/// with the average-cost method. Values come from trade data only —
/// no live prices are involved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Ticker symbol
    pub symbol: String,

    /// Stock or crypto
    pub asset_type: AssetType,

    /// Units currently held (> 0)
    pub quantity: f64,

    /// Running average cost per unit of the open position
    pub avg_cost: f64,

    /// Cost basis of the open position (quantity × avg_cost)
    pub cost_basis: f64,

    /// Realized gain/loss from sells, before fees
    pub realized_gain: f64,

    /// Total fees paid on this symbol's trades
    pub fees_paid: f64,

    /// This position's share of the open cost basis, in percent
    pub allocation_pct: f64,
}

/// Portfolio-wide totals plus the per-symbol breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Total number of trades considered
    pub total_trades: usize,

    /// Timestamp of the earliest trade, if any
    pub first_trade_date: Option<DateTime<Utc>>,

    /// Sum of buy-side notionals
    pub total_invested: f64,

    /// Sum of sell-side notionals
    pub total_proceeds: f64,

    /// Sum of all fees
    pub total_fees: f64,

    /// Realized gain/loss across all symbols, before fees
    pub realized_gain: f64,

    /// Cost basis still tied up in open positions
    pub open_cost_basis: f64,

    /// Open positions, sorted by symbol
    pub holdings: Vec<Holding>,
}
