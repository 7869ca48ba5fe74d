pub mod errors;
pub mod import;
pub mod models;
pub mod services;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use errors::CoreError;
use import::ImportService;
use models::{
    diagnostics::{ImportDiagnostics, ParseResult},
    holding::{Holding, PortfolioSummary},
    trade::{Trade, TradeSource},
};
use services::{dedup_service::DedupService, holdings_service::HoldingsService};

/// Result of absorbing one import into the tracker: how many trades were
/// new, how many were dropped as duplicates of already-held trades, and
/// the run's diagnostics for display.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub trades_added: usize,
    pub duplicates_skipped: usize,
    pub diagnostics: ImportDiagnostics,
}

/// Main entry point for the Portfolio Tracker core library.
/// Holds the trade history and the services that operate on it.
#[must_use]
pub struct PortfolioTracker {
    trades: Vec<Trade>,
    import_service: ImportService,
    dedup_service: DedupService,
    holdings_service: HoldingsService,
    /// Tracks whether any mutation has occurred since the last save/load.
    dirty: bool,
}

impl std::fmt::Debug for PortfolioTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioTracker")
            .field("trades", &self.trades.len())
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl PortfolioTracker {
    /// Create a tracker with no trade history.
    pub fn create_new() -> Self {
        Self::build(Vec::new())
    }

    /// Create a tracker over already-persisted trades (loaded by the
    /// external storage collaborator).
    pub fn from_trades(trades: Vec<Trade>) -> Self {
        Self::build(trades)
    }

    // ── Importing ───────────────────────────────────────────────────

    /// Import generic CSV text. Parses, drops near-duplicates of trades
    /// already held, and absorbs the rest. Fatal parse problems (no
    /// header, no symbol column, empty file) return an error and leave
    /// the tracker untouched.
    pub fn import_csv(
        &mut self,
        text: &str,
        source: TradeSource,
    ) -> Result<ImportOutcome, CoreError> {
        let result = self.import_service.parse_csv(text, source);
        self.absorb(result)
    }

    /// Import a Trading212 CSV export.
    pub fn import_trading212(&mut self, text: &str) -> Result<ImportOutcome, CoreError> {
        self.import_csv(text, TradeSource::Trading212)
    }

    /// Import an IBKR activity statement (sectioned format, with generic
    /// CSV fallback).
    pub fn import_ibkr_statement(&mut self, text: &str) -> Result<ImportOutcome, CoreError> {
        let result = self.import_service.parse_ibkr_statement(text);
        self.absorb(result)
    }

    /// Parse without mutating the tracker — for preview flows where the
    /// user confirms before the trades are stored.
    #[must_use]
    pub fn preview_csv(&self, text: &str, source: TradeSource) -> ParseResult {
        self.import_service.parse_csv(text, source)
    }

    fn absorb(&mut self, result: ParseResult) -> Result<ImportOutcome, CoreError> {
        if result.is_fatal() {
            return Err(CoreError::ImportFailed(result.errors.join("; ")));
        }

        let outcome = self.dedup_service.partition(result.trades, &self.trades);
        let trades_added = outcome.unique.len();
        if trades_added > 0 {
            self.trades.extend(outcome.unique);
            self.dirty = true;
        }

        Ok(ImportOutcome {
            trades_added,
            duplicates_skipped: outcome.duplicates.len(),
            diagnostics: result.diagnostics,
        })
    }

    // ── Trade Management ────────────────────────────────────────────

    /// Add a manually-entered trade. Validates the record invariants
    /// before committing.
    pub fn add_trade(&mut self, trade: Trade) -> Result<Uuid, CoreError> {
        trade.validate()?;
        let id = trade.id;
        self.trades.push(trade);
        self.dirty = true;
        Ok(id)
    }

    /// Remove a trade by its ID.
    pub fn remove_trade(&mut self, trade_id: Uuid) -> Result<(), CoreError> {
        let idx = self
            .trades
            .iter()
            .position(|t| t.id == trade_id)
            .ok_or_else(|| CoreError::TradeNotFound(trade_id.to_string()))?;
        self.trades.remove(idx);
        self.dirty = true;
        Ok(())
    }

    /// Get a single trade by its ID.
    #[must_use]
    pub fn get_trade(&self, trade_id: Uuid) -> Option<&Trade> {
        self.trades.iter().find(|t| t.id == trade_id)
    }

    /// All trades, in insertion order.
    #[must_use]
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Total number of trades held.
    #[must_use]
    pub fn trade_count(&self) -> usize {
        self.trades.len()
    }

    // ── Search & Filtering ──────────────────────────────────────────

    /// Trades for one symbol (case-insensitive), newest first.
    #[must_use]
    pub fn trades_for_symbol(&self, symbol: &str) -> Vec<&Trade> {
        let upper = symbol.to_uppercase();
        let mut trades: Vec<&Trade> = self
            .trades
            .iter()
            .filter(|t| t.symbol == upper)
            .collect();
        trades.sort_by(|a, b| b.date.cmp(&a.date));
        trades
    }

    /// Trades within a timestamp range (inclusive), newest first.
    #[must_use]
    pub fn trades_in_range(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<&Trade> {
        let mut trades: Vec<&Trade> = self
            .trades
            .iter()
            .filter(|t| t.date >= from && t.date <= to)
            .collect();
        trades.sort_by(|a, b| b.date.cmp(&a.date));
        trades
    }

    /// Search trades by matching the query against symbol and source
    /// (case-insensitive substring).
    #[must_use]
    pub fn search_trades(&self, query: &str) -> Vec<&Trade> {
        let q = query.to_lowercase();
        self.trades
            .iter()
            .filter(|t| {
                t.symbol.to_lowercase().contains(&q)
                    || t.source.to_string().to_lowercase().contains(&q)
            })
            .collect()
    }

    /// Distinct symbols across all trades, sorted.
    #[must_use]
    pub fn unique_symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.trades.iter().map(|t| t.symbol.clone()).collect();
        symbols.sort();
        symbols.dedup();
        symbols
    }

    // ── Holdings & Summary ──────────────────────────────────────────

    /// Current open positions derived from the trade history.
    #[must_use]
    pub fn get_holdings(&self) -> Vec<Holding> {
        self.holdings_service.get_holdings(&self.trades)
    }

    /// Portfolio totals (invested, proceeds, fees, realized gain) plus the
    /// per-symbol breakdown.
    #[must_use]
    pub fn get_portfolio_summary(&self) -> PortfolioSummary {
        self.holdings_service.get_summary(&self.trades)
    }

    // ── Export / Import ─────────────────────────────────────────────

    /// Export all trades as a JSON string.
    pub fn export_trades_to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.trades)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize trades: {e}")))
    }

    /// Export all trades as a CSV string.
    /// Columns: id, symbol, asset_type, side, quantity, price, fee, date,
    /// source, currency
    #[must_use]
    pub fn export_trades_to_csv(&self) -> String {
        let mut csv = String::from("id,symbol,asset_type,side,quantity,price,fee,date,source,currency\n");
        for trade in &self.trades {
            csv.push_str(&format!(
                "{},{},{},{},{},{},{},{},{},{}\n",
                trade.id,
                trade.symbol,
                trade.asset_type,
                trade.side,
                trade.quantity,
                trade.price,
                trade.fee,
                trade.date.to_rfc3339(),
                trade.source,
                trade.currency.as_deref().unwrap_or(""),
            ));
        }
        csv
    }

    /// Import trades from a JSON string. All records are validated first;
    /// if any record is invalid, none are added (all-or-nothing).
    /// Returns the number of trades imported.
    pub fn import_trades_from_json(&mut self, json: &str) -> Result<usize, CoreError> {
        let trades: Vec<Trade> = serde_json::from_str(json)?;
        for trade in &trades {
            trade.validate()?;
        }
        let count = trades.len();
        if count > 0 {
            self.trades.extend(trades);
            self.dirty = true;
        }
        Ok(count)
    }

    // ── Dirty State ─────────────────────────────────────────────────

    /// Returns `true` if trades have been modified since the last
    /// save/load acknowledgement.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    /// Clear the unsaved-changes flag after the caller has persisted the
    /// trades.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(trades: Vec<Trade>) -> Self {
        Self {
            trades,
            import_service: ImportService::new(),
            dedup_service: DedupService::new(),
            holdings_service: HoldingsService::new(),
            dirty: false,
        }
    }
}

impl Default for PortfolioTracker {
    fn default() -> Self {
        Self::create_new()
    }
}
