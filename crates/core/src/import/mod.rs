//! The CSV trade-import pipeline: text → rows → trades → diagnostics.
//!
//! Pure, synchronous, no I/O. All lookup tables are read-only after
//! construction, so one `ImportService` can serve concurrent imports.

pub mod actions;
pub mod columns;
pub mod ibkr;
pub mod line;
pub mod symbols;
pub mod values;

use std::collections::HashSet;

use chrono::Utc;
use log::debug;

use crate::errors::CoreError;
use crate::models::diagnostics::{ImportDiagnostics, ParseResult};
use crate::models::trade::{Trade, TradeSide, TradeSource};

use actions::{classify_action, ActionClass};
use columns::{detect_columns, ColumnMap};
use ibkr::extract_trades_section;
use line::{detect_delimiter, parse_csv_line, split_lines};
use symbols::SymbolNormalizer;
use values::{parse_decimal, parse_timestamp};

/// Parses broker CSV exports into `Trade` records.
///
/// One malformed row never aborts a batch: every row either becomes a
/// valid trade or is tallied in the diagnostics under a skip reason.
/// Only file-level problems (no header, no symbol column, no data) are
/// fatal, and those surface in `ParseResult::errors`.
pub struct ImportService {
    normalizer: SymbolNormalizer,
}

impl ImportService {
    #[must_use]
    pub fn new() -> Self {
        Self {
            normalizer: SymbolNormalizer::new(),
        }
    }

    /// Use a custom symbol normalizer (alternative lookup tables).
    #[must_use]
    pub fn with_normalizer(normalizer: SymbolNormalizer) -> Self {
        Self { normalizer }
    }

    /// Parse generic CSV text: first non-blank line is the header, the
    /// rest are data rows.
    #[must_use]
    pub fn parse_csv(&self, text: &str, source: TradeSource) -> ParseResult {
        let lines = split_lines(text);
        let rows: Vec<&str> = lines.into_iter().filter(|l| !l.trim().is_empty()).collect();
        self.parse_rows(&rows, source)
    }

    /// Parse an IBKR activity statement: extract the Trades section and run
    /// it through the generic pipeline. Files without a Trades section fall
    /// back to plain CSV parsing.
    #[must_use]
    pub fn parse_ibkr_statement(&self, text: &str) -> ParseResult {
        let lines = split_lines(text);
        match extract_trades_section(&lines) {
            Some(section) => {
                debug!("IBKR trades section found, {} data rows", section.rows.len());
                let mut rows: Vec<&str> = Vec::with_capacity(section.rows.len() + 1);
                rows.push(section.header.as_str());
                rows.extend(section.rows.iter().map(String::as_str));
                self.parse_rows(&rows, TradeSource::Ibkr)
            }
            None => {
                debug!("no IBKR trades section found, falling back to generic parsing");
                self.parse_csv(text, TradeSource::Ibkr)
            }
        }
    }

    fn parse_rows(&self, rows: &[&str], source: TradeSource) -> ParseResult {
        let Some((header_line, data_lines)) = rows.split_first() else {
            return ParseResult::fatal(CoreError::EmptyFile.to_string());
        };

        let delimiter = detect_delimiter(header_line);
        let headers = parse_csv_line(header_line, delimiter);
        let (columns, column_warnings) = detect_columns(&headers);

        if columns.is_empty() {
            return ParseResult::fatal(
                CoreError::NoHeaderRow {
                    headers: headers.join(", "),
                }
                .to_string(),
            );
        }
        if !columns.has_symbol_source() {
            return ParseResult::fatal(
                CoreError::SymbolColumnNotFound {
                    headers: headers.join(", "),
                }
                .to_string(),
            );
        }
        if data_lines.is_empty() {
            return ParseResult::fatal(CoreError::NoDataRows.to_string());
        }

        debug!("detected columns {columns:?}, delimiter {delimiter:?}");

        let mut result = ParseResult::default();
        result.diagnostics.warnings.extend(column_warnings);
        // One warning per distinct unmapped instrument name
        let mut unknown_names: HashSet<String> = HashSet::new();

        for line in data_lines {
            result.diagnostics.total_rows += 1;
            let fields = parse_csv_line(line, delimiter);
            if let Some(trade) = self.parse_row(
                &fields,
                &columns,
                &source,
                &mut result.diagnostics,
                &mut unknown_names,
            ) {
                result.diagnostics.record_trade(&trade);
                result.trades.push(trade);
            }
        }

        debug!(
            "imported {} of {} rows ({} skipped)",
            result.diagnostics.trades_imported,
            result.diagnostics.total_rows,
            result.diagnostics.rows_skipped,
        );
        result
    }

    /// Parse one data row into a `Trade`, or record a skip reason and
    /// return `None`. Partial trades are never emitted — a row that fails
    /// any invariant (side, symbol, quantity, price) is dropped. The one
    /// exception is the date, which defaults to now instead of skipping.
    fn parse_row(
        &self,
        fields: &[String],
        columns: &ColumnMap,
        source: &TradeSource,
        diagnostics: &mut ImportDiagnostics,
        unknown_names: &mut HashSet<String>,
    ) -> Option<Trade> {
        if fields.iter().all(|f| f.is_empty()) {
            diagnostics.record_skip("Empty row");
            return None;
        }
        if fields.len() < 2 {
            // Free-text footer or similar noise under a multi-column header
            diagnostics.record_skip("Parse error");
            return None;
        }

        let side = match cell(fields, columns.action) {
            Some(action) => match classify_action(action) {
                ActionClass::Buy => TradeSide::Buy,
                ActionClass::Sell => TradeSide::Sell,
                ActionClass::Ignored => {
                    diagnostics.record_skip(format!("Ignored: {action}"));
                    return None;
                }
                ActionClass::Unknown => {
                    diagnostics.record_skip(format!("Unknown action: {action}"));
                    return None;
                }
            },
            // No action column (or an empty cell): fall back to the sign of
            // the raw quantity — negative means sell.
            None => match cell(fields, columns.quantity).and_then(parse_decimal) {
                Some(q) if q < 0.0 => TradeSide::Sell,
                Some(_) => TradeSide::Buy,
                None => {
                    diagnostics.record_skip("Could not determine buy/sell");
                    return None;
                }
            },
        };

        let raw_symbol = cell(fields, columns.ticker)
            .or_else(|| cell(fields, columns.name))
            .or_else(|| cell(fields, columns.isin));
        let Some(raw_symbol) = raw_symbol else {
            diagnostics.record_skip("Missing symbol");
            return None;
        };
        let resolved = self.normalizer.resolve(raw_symbol);
        if resolved.symbol.is_empty() {
            diagnostics.record_skip("Missing symbol");
            return None;
        }
        if !resolved.recognized && unknown_names.insert(raw_symbol.to_string()) {
            diagnostics.warn(format!(
                "Unrecognized instrument '{raw_symbol}' imported as '{}'",
                resolved.symbol
            ));
        }

        let quantity = match cell(fields, columns.quantity)
            .and_then(parse_decimal)
            .map(f64::abs)
        {
            Some(q) if q > 0.0 => q,
            _ => {
                diagnostics.record_skip("Invalid quantity");
                return None;
            }
        };

        // Direct price column, else derive from |total| / quantity
        let direct = cell(fields, columns.price)
            .and_then(parse_decimal)
            .filter(|p| *p > 0.0);
        let derived = || {
            cell(fields, columns.total)
                .and_then(parse_decimal)
                .map(|total| total.abs() / quantity)
        };
        let price = match direct.or_else(derived) {
            Some(p) if p > 0.0 && p.is_finite() => p,
            _ => {
                diagnostics.record_skip("Invalid price");
                return None;
            }
        };

        let date = cell(fields, columns.date)
            .and_then(parse_timestamp)
            .unwrap_or_else(Utc::now);

        let fee = cell(fields, columns.fee)
            .and_then(parse_decimal)
            .map(f64::abs)
            .unwrap_or(0.0);

        let asset_type = self.normalizer.classify_asset(&resolved.symbol);
        let mut trade = Trade::new(
            resolved.symbol,
            asset_type,
            side,
            quantity,
            price,
            date,
            source.clone(),
        )
        .with_fee(fee);
        trade.currency = cell(fields, columns.currency).map(str::to_uppercase);

        Some(trade)
    }
}

impl Default for ImportService {
    fn default() -> Self {
        Self::new()
    }
}

/// Trimmed, non-empty field at `idx`, if the column exists and the row is
/// long enough.
fn cell(fields: &[String], idx: Option<usize>) -> Option<&str> {
    idx.and_then(|i| fields.get(i))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}
