//! Header detection: maps whatever column names a broker export uses onto
//! the canonical trade fields, via static alias tables.
//!
//! Detection runs per canonical field in a fixed priority order (symbol-ish
//! columns before name-ish ones). For each field an exact alias match wins
//! immediately; only then is substring containment tried, in header order.
//! An index claimed by an earlier field is never reassigned.

use serde::{Deserialize, Serialize};

// Alias vocabulary gathered from real exports: Trading212 ("No. of shares",
// "Price / share"), IBKR ("T. Price", "Comm/Fee", "Date/Time"), and the
// common generic wordings. All lowercase, single-spaced.

const ACTION_ALIASES: &[&str] = &[
    "action", "type", "side", "activity", "transaction type", "activity type",
    "trans type", "buy/sell", "direction", "operation", "order type",
];

const TICKER_ALIASES: &[&str] = &[
    "ticker", "symbol", "ticker symbol", "symbol/isin", "instrument symbol",
];

const NAME_ALIASES: &[&str] = &[
    "name", "instrument", "description", "security", "company", "product",
    "security name", "instrument name", "company name", "stock name",
];

const ISIN_ALIASES: &[&str] = &["isin", "security id"];

const QUANTITY_ALIASES: &[&str] = &[
    "quantity", "qty", "shares", "units", "no. of shares", "number of shares",
    "amount of shares",
];

const PRICE_ALIASES: &[&str] = &[
    "price", "price / share", "price per share", "unit price", "share price",
    "avg price", "average price", "cost per share", "t. price", "trade price",
    "execution price", "fill price",
];

const TOTAL_ALIASES: &[&str] = &[
    "total", "amount", "value", "cost", "proceeds", "net amount",
    "gross amount", "total amount", "total value", "total cost",
    "consideration", "market value",
];

const DATE_ALIASES: &[&str] = &[
    "date", "time", "date/time", "datetime", "trade date", "transaction date",
    "activity date", "settlement date", "executed at", "execution time",
    "trade time",
];

const CURRENCY_ALIASES: &[&str] = &["currency", "ccy", "curr", "currency code"];

const FEE_ALIASES: &[&str] = &[
    "fee", "fees", "commission", "comm/fee", "charge", "charges", "brokerage",
    "transaction fee", "trading fee", "broker fee",
];

/// Canonical field → zero-based column index. Built once per file from the
/// header row; reused for every data row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMap {
    pub action: Option<usize>,
    pub ticker: Option<usize>,
    pub name: Option<usize>,
    pub isin: Option<usize>,
    pub quantity: Option<usize>,
    pub price: Option<usize>,
    pub total: Option<usize>,
    pub date: Option<usize>,
    pub currency: Option<usize>,
    pub fee: Option<usize>,
}

impl ColumnMap {
    /// At least one column a symbol can be resolved from. Without one the
    /// import aborts rather than guessing.
    #[must_use]
    pub fn has_symbol_source(&self) -> bool {
        self.ticker.is_some() || self.name.is_some() || self.isin.is_some()
    }

    /// True when not a single header was recognized — the row cannot have
    /// been a header at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &ColumnMap::default()
    }
}

/// Lowercase, trim, and collapse internal whitespace.
fn normalize_header(raw: &str) -> String {
    raw.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// One field's lookup: exact pass over unclaimed headers first, then
/// bidirectional substring containment (header contains alias or alias
/// contains header — the latter tolerates abbreviated headers).
fn find_column(headers: &[String], claimed: &[bool], aliases: &[&str]) -> Option<usize> {
    for (idx, header) in headers.iter().enumerate() {
        if !claimed[idx] && aliases.contains(&header.as_str()) {
            return Some(idx);
        }
    }
    for (idx, header) in headers.iter().enumerate() {
        if claimed[idx] || header.is_empty() {
            continue;
        }
        if aliases
            .iter()
            .any(|a| header.contains(a) || a.contains(header.as_str()))
        {
            return Some(idx);
        }
    }
    None
}

/// Build a `ColumnMap` from the raw header fields. Returns the map plus any
/// degradation warnings (detection itself never fails here; the caller
/// decides what an unusable map means).
pub fn detect_columns(raw_headers: &[String]) -> (ColumnMap, Vec<String>) {
    let headers: Vec<String> = raw_headers.iter().map(|h| normalize_header(h)).collect();
    let mut claimed = vec![false; headers.len()];
    let mut map = ColumnMap::default();

    // Priority order: action first, symbol-ish columns before name-ish ones.
    let order: [(&[&str], &mut Option<usize>); 10] = [
        (ACTION_ALIASES, &mut map.action),
        (TICKER_ALIASES, &mut map.ticker),
        (NAME_ALIASES, &mut map.name),
        (ISIN_ALIASES, &mut map.isin),
        (QUANTITY_ALIASES, &mut map.quantity),
        (PRICE_ALIASES, &mut map.price),
        (TOTAL_ALIASES, &mut map.total),
        (DATE_ALIASES, &mut map.date),
        (CURRENCY_ALIASES, &mut map.currency),
        (FEE_ALIASES, &mut map.fee),
    ];

    for (aliases, slot) in order {
        if let Some(idx) = find_column(&headers, &claimed, aliases) {
            claimed[idx] = true;
            *slot = Some(idx);
        }
    }

    let mut warnings = Vec::new();
    if map.quantity.is_none() {
        warnings.push(
            "No quantity column detected — rows without a usable quantity will be skipped"
                .to_string(),
        );
    }

    (map, warnings)
}
