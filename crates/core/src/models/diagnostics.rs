use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::trade::{Trade, TradeSide};

/// Aggregate record of a single import run. Rebuilt fresh per run —
/// holds no cross-call state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportDiagnostics {
    /// Data rows seen (header excluded, blank lines excluded)
    pub total_rows: usize,

    /// Trades emitted
    pub trades_imported: usize,

    /// Rows dropped, for any reason
    pub rows_skipped: usize,

    /// Skip-reason label → count. BTreeMap so summaries render in a
    /// stable order.
    pub skip_reasons: BTreeMap<String, usize>,

    /// Free-text warnings (missing quantity column, unrecognized
    /// instrument names, ...)
    pub warnings: Vec<String>,

    /// Sum of buy-side quantity × price over emitted trades
    pub total_invested: f64,

    /// Distinct symbols among emitted trades, sorted
    pub unique_symbols: Vec<String>,
}

impl ImportDiagnostics {
    pub fn record_skip(&mut self, reason: impl Into<String>) {
        self.rows_skipped += 1;
        *self.skip_reasons.entry(reason.into()).or_insert(0) += 1;
    }

    pub fn record_trade(&mut self, trade: &Trade) {
        self.trades_imported += 1;
        if trade.side == TradeSide::Buy {
            self.total_invested += trade.notional();
        }
        if let Err(pos) = self.unique_symbols.binary_search(&trade.symbol) {
            self.unique_symbols.insert(pos, trade.symbol.clone());
        }
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Human-readable one-liner for the skipped rows, e.g.
    /// `"Skipped 12 rows: Ignored: Dividend (8), Invalid price (4)"`.
    /// Empty string when nothing was skipped.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.rows_skipped == 0 {
            return String::new();
        }
        let reasons: Vec<String> = self
            .skip_reasons
            .iter()
            .map(|(reason, count)| format!("{reason} ({count})"))
            .collect();
        format!("Skipped {} rows: {}", self.rows_skipped, reasons.join(", "))
    }
}

/// Full result of one import run: the emitted trades, fatal-level errors
/// (non-empty ⇒ the import aborted with zero trades), and diagnostics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseResult {
    pub trades: Vec<Trade>,
    pub errors: Vec<String>,
    pub diagnostics: ImportDiagnostics,
}

impl ParseResult {
    /// Build a fatal result: no trades, a single error message.
    pub(crate) fn fatal(error: impl Into<String>) -> Self {
        Self {
            trades: Vec::new(),
            errors: vec![error.into()],
            diagnostics: ImportDiagnostics::default(),
        }
    }

    /// True when the run aborted before emitting anything.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !self.errors.is_empty()
    }
}
