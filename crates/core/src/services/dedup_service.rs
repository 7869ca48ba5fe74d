use chrono::Duration;

use crate::models::trade::Trade;

/// Fuzzy-equality window for duplicate detection. Re-exported CSVs can
/// carry slightly different rounding or timestamp granularity for the same
/// underlying trade, so exact matching would re-import them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DedupTolerance {
    /// Maximum quantity difference (exclusive)
    pub quantity: f64,
    /// Maximum price difference (exclusive)
    pub price: f64,
    /// Maximum timestamp difference in milliseconds (exclusive)
    pub time_ms: i64,
}

impl Default for DedupTolerance {
    fn default() -> Self {
        Self {
            quantity: 1e-4,
            price: 0.01,
            time_ms: 60_000,
        }
    }
}

/// Result of partitioning an incoming batch against existing trades.
#[derive(Debug, Clone, Default)]
pub struct DedupOutcome {
    /// Trades with no fuzzy match in the existing set
    pub unique: Vec<Trade>,
    /// Trades matching an already-stored trade
    pub duplicates: Vec<Trade>,
}

/// Detects near-duplicate trades so a re-imported export doesn't double
/// the portfolio. Pure logic, no I/O.
pub struct DedupService {
    tolerance: DedupTolerance,
}

impl DedupService {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tolerance: DedupTolerance::default(),
        }
    }

    /// Use a custom tolerance window. The defaults can false-positive on
    /// high-frequency fractional trades seconds apart; callers in that
    /// territory should tighten the time window.
    #[must_use]
    pub fn with_tolerance(tolerance: DedupTolerance) -> Self {
        Self { tolerance }
    }

    #[must_use]
    pub fn tolerance(&self) -> DedupTolerance {
        self.tolerance
    }

    /// Split an incoming batch into trades unseen in `existing` and
    /// duplicates of it. Trades are only compared against the existing
    /// set — two genuinely identical rows in one file stay two trades.
    #[must_use]
    pub fn partition(&self, incoming: Vec<Trade>, existing: &[Trade]) -> DedupOutcome {
        let mut outcome = DedupOutcome::default();
        for trade in incoming {
            if existing.iter().any(|e| self.is_same_trade(e, &trade)) {
                outcome.duplicates.push(trade);
            } else {
                outcome.unique.push(trade);
            }
        }
        outcome
    }

    /// Two trades are the same economic event when symbol and side match
    /// exactly and quantity, price, and timestamp land inside the tolerance
    /// window. Symmetric; fee and source are not considered.
    #[must_use]
    pub fn is_same_trade(&self, a: &Trade, b: &Trade) -> bool {
        a.symbol == b.symbol
            && a.side == b.side
            && (a.quantity - b.quantity).abs() < self.tolerance.quantity
            && (a.price - b.price).abs() < self.tolerance.price
            && (a.date - b.date).abs() < Duration::milliseconds(self.tolerance.time_ms)
    }
}

impl Default for DedupService {
    fn default() -> Self {
        Self::new()
    }
}
