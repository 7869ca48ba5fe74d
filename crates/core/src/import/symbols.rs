//! Symbol normalization: turns whatever identifies an instrument in an
//! export — a ticker, a company name, an ISIN — into a canonical uppercase
//! symbol, and classifies it as stock or crypto.

use std::collections::{HashMap, HashSet};

use crate::models::trade::AssetType;

/// Company name (lowercase, legal suffixes stripped) → ticker.
/// Intentionally a closed static table; anything unmapped passes through
/// uppercased with a diagnostics warning.
const COMPANY_TICKERS: &[(&str, &str)] = &[
    ("apple", "AAPL"),
    ("microsoft", "MSFT"),
    ("amazon", "AMZN"),
    ("amazon.com", "AMZN"),
    ("alphabet", "GOOGL"),
    ("google", "GOOGL"),
    ("meta", "META"),
    ("meta platforms", "META"),
    ("facebook", "META"),
    ("tesla", "TSLA"),
    ("nvidia", "NVDA"),
    ("netflix", "NFLX"),
    ("berkshire hathaway", "BRK-B"),
    ("jpmorgan chase", "JPM"),
    ("visa", "V"),
    ("mastercard", "MA"),
    ("johnson & johnson", "JNJ"),
    ("walmart", "WMT"),
    ("procter & gamble", "PG"),
    ("exxon mobil", "XOM"),
    ("coca-cola", "KO"),
    ("pepsico", "PEP"),
    ("intel", "INTC"),
    ("advanced micro devices", "AMD"),
    ("international business machines", "IBM"),
    ("oracle", "ORCL"),
    ("salesforce", "CRM"),
    ("adobe", "ADBE"),
    ("paypal", "PYPL"),
    ("walt disney", "DIS"),
    ("disney", "DIS"),
    ("boeing", "BA"),
    ("mcdonald's", "MCD"),
    ("nike", "NKE"),
    ("starbucks", "SBUX"),
    ("uber", "UBER"),
    ("uber technologies", "UBER"),
    ("airbnb", "ABNB"),
    ("palantir", "PLTR"),
    ("palantir technologies", "PLTR"),
    ("shopify", "SHOP"),
    ("spotify", "SPOT"),
    ("bitcoin", "BTC"),
    ("ethereum", "ETH"),
    ("solana", "SOL"),
    ("cardano", "ADA"),
    ("dogecoin", "DOGE"),
    ("ripple", "XRP"),
    ("litecoin", "LTC"),
    ("polkadot", "DOT"),
    ("chainlink", "LINK"),
];

/// Known crypto tickers for asset-type classification.
const CRYPTO_SYMBOLS: &[&str] = &[
    "BTC", "ETH", "SOL", "ADA", "XRP", "DOGE", "DOT", "AVAX", "MATIC", "LINK",
    "LTC", "BCH", "UNI", "ATOM", "XLM", "ALGO", "TRX", "SHIB", "BNB", "NEAR",
    "FTM", "ICP", "ETC", "FIL", "APT", "ARB", "OP",
];

/// A symbol ending in one of these (and longer than it) reads as a crypto
/// trading pair, e.g. "BTCUSD", "ETH-USDT".
const CRYPTO_QUOTE_SUFFIXES: &[&str] = &["USDT", "USD", "BTC", "ETH"];

/// Exchange suffixes stripped from tickers ("AAPL.US" → AAPL, "VOD.L" →
/// VOD). Single-letter class designators (".B") are NOT in this set — they
/// normalize to dash form instead.
const EXCHANGE_SUFFIXES: &[&str] = &[
    "US", "UK", "L", "LSE", "DE", "F", "PA", "AS", "MI", "MC", "SW", "VX",
    "ST", "CO", "OL", "HE", "TO", "V", "HK", "T", "AX", "NZ", "SI",
];

/// Trailing legal-entity tokens stripped from company names before lookup.
/// Compared with surrounding commas/periods trimmed ("Inc.", "Ltd," match).
const LEGAL_SUFFIXES: &[&str] = &[
    "inc", "incorporated", "corp", "corporation", "ltd", "limited", "plc",
    "co", "company", "sa", "ag", "nv", "se",
];

/// Outcome of symbol resolution. `recognized` is false only for the
/// best-effort passthrough of an unmapped company name — the caller
/// surfaces a warning for those.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSymbol {
    pub symbol: String,
    pub recognized: bool,
}

/// Maps raw instrument identifiers to canonical symbols. The lookup tables
/// are immutable after construction, so one normalizer is safely shared
/// across concurrent imports.
pub struct SymbolNormalizer {
    company_tickers: HashMap<String, String>,
    crypto_symbols: HashSet<String>,
}

impl SymbolNormalizer {
    /// Build with the built-in static tables.
    #[must_use]
    pub fn new() -> Self {
        Self {
            company_tickers: COMPANY_TICKERS
                .iter()
                .map(|(name, ticker)| (name.to_string(), ticker.to_string()))
                .collect(),
            crypto_symbols: CRYPTO_SYMBOLS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Build with custom tables (tests, alternative universes).
    #[must_use]
    pub fn with_tables(
        company_tickers: HashMap<String, String>,
        crypto_symbols: HashSet<String>,
    ) -> Self {
        Self {
            company_tickers,
            crypto_symbols,
        }
    }

    /// Resolve a raw identifier to a canonical symbol.
    ///
    /// Ticker-shaped input passes through uppercased, after exchange
    /// prefix/suffix stripping — but is still checked against the company
    /// table, which covers ambiguous short names ("APPLE" → AAPL).
    /// Non-ticker input is cleaned of legal suffixes and looked up; an
    /// unmapped name passes through uppercased, flagged unrecognized.
    #[must_use]
    pub fn resolve(&self, raw: &str) -> ResolvedSymbol {
        let mut input = raw.trim();
        // Exchange prefix, e.g. "NYSE:AAPL" or "NASDAQ: Apple"
        if let Some((_, rest)) = input.split_once(':') {
            input = rest.trim();
        }

        let candidate = strip_exchange_suffix(&input.to_uppercase());
        if is_ticker_shaped(&candidate) || is_isin_shaped(&candidate) {
            if let Some(mapped) = self.company_tickers.get(&candidate.to_lowercase()) {
                return ResolvedSymbol {
                    symbol: mapped.clone(),
                    recognized: true,
                };
            }
            return ResolvedSymbol {
                symbol: candidate,
                recognized: true,
            };
        }
        if self.is_crypto(&candidate) {
            // Trading pairs like "BTC-USD" are self-describing
            return ResolvedSymbol {
                symbol: candidate,
                recognized: true,
            };
        }

        let cleaned = strip_legal_suffixes(input);
        if let Some(mapped) = self.company_tickers.get(&cleaned.to_lowercase()) {
            return ResolvedSymbol {
                symbol: mapped.clone(),
                recognized: true,
            };
        }

        ResolvedSymbol {
            symbol: cleaned.to_uppercase(),
            recognized: false,
        }
    }

    /// Heuristic stock/crypto classification — a static symbol set plus the
    /// quote-suffix rule. Not authoritative.
    #[must_use]
    pub fn classify_asset(&self, symbol: &str) -> AssetType {
        if self.is_crypto(symbol) {
            AssetType::Crypto
        } else {
            AssetType::Stock
        }
    }

    fn is_crypto(&self, symbol: &str) -> bool {
        if self.crypto_symbols.contains(symbol) {
            return true;
        }
        CRYPTO_QUOTE_SUFFIXES
            .iter()
            .any(|suffix| symbol.len() > suffix.len() && symbol.ends_with(suffix))
    }
}

impl Default for SymbolNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Strict ticker shape: 1–5 uppercase letters, optionally a dash and one
/// more letter ("AAPL", "BRK-B").
fn is_ticker_shaped(s: &str) -> bool {
    let (base, class) = match s.split_once('-') {
        Some((base, class)) => (base, Some(class)),
        None => (s, None),
    };
    let base_ok = (1..=5).contains(&base.len()) && base.chars().all(|c| c.is_ascii_uppercase());
    let class_ok = class.map_or(true, |c| c.len() == 1 && c.chars().all(|x| x.is_ascii_uppercase()));
    base_ok && class_ok
}

/// ISIN shape: 2-letter country code, 9 alphanumerics, 1 check digit
/// ("US0378331005").
fn is_isin_shaped(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 12
        && b[..2].iter().all(u8::is_ascii_uppercase)
        && b[2..11].iter().all(u8::is_ascii_alphanumeric)
        && b[11].is_ascii_digit()
}

/// Strip a trailing `.XX` exchange suffix, or convert a trailing
/// single-letter class designator to dash form ("BRK.B" → "BRK-B").
fn strip_exchange_suffix(symbol: &str) -> String {
    if let Some((base, suffix)) = symbol.rsplit_once('.') {
        if !base.is_empty() && !suffix.is_empty() {
            if EXCHANGE_SUFFIXES.contains(&suffix) {
                return base.to_string();
            }
            if suffix.len() == 1 && suffix.chars().all(|c| c.is_ascii_alphabetic()) {
                return format!("{base}-{suffix}");
            }
        }
    }
    symbol.to_string()
}

/// Drop trailing legal-entity tokens and "Class X" designators from a
/// company name: "Apple Inc." → "Apple", "Alphabet Inc. Class A" →
/// "Alphabet".
fn strip_legal_suffixes(name: &str) -> String {
    let mut tokens: Vec<&str> = name.split_whitespace().collect();
    loop {
        let Some(last) = tokens.last() else { break };
        let norm = last.trim_matches(|c: char| c == ',' || c == '.').to_lowercase();
        if LEGAL_SUFFIXES.contains(&norm.as_str()) {
            tokens.pop();
            continue;
        }
        if norm.len() == 1
            && norm.chars().all(|c| c.is_ascii_alphabetic())
            && tokens.len() >= 2
            && tokens[tokens.len() - 2].trim_matches('.').eq_ignore_ascii_case("class")
        {
            tokens.pop();
            tokens.pop();
            continue;
        }
        break;
    }
    // "Apple, Inc." leaves a trailing comma on the kept token
    tokens
        .join(" ")
        .trim_end_matches(|c| c == ',' || c == '.')
        .to_string()
}
