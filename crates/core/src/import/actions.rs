//! Action-text triage: is a row a buy, a sell, deliberate noise (dividends,
//! deposits, fees...), or something we don't understand?

/// Non-trade activity. A row whose action text contains any of these is
/// skipped with an `Ignored: ...` reason rather than flagged as unknown.
const IGNORED_ACTIONS: &[&str] = &[
    "deposit",
    "withdraw",
    "dividend",
    "interest",
    "conversion",
    "currency exchange",
    "fx",
    "fee",
    "tax",
    "transfer",
    "split",
    "corporate action",
    "cash",
    "adjustment",
    "stamp duty",
];

const BUY_WORDS: &[&str] = &["buy", "bought", "purchase", "long"];

const SELL_WORDS: &[&str] = &["sell", "sold", "sale"];

/// Outcome of classifying an action cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionClass {
    Buy,
    Sell,
    /// A recognized non-trade row (dividend, deposit, ...)
    Ignored,
    /// Present but matching neither trade verbs nor the ignore list
    Unknown,
}

/// Classify raw action text. The ignore list is checked first, then sell,
/// then buy. Trade verbs match bidirectionally — the action may contain
/// the verb ("Market buy") or the verb may contain the action ("B").
/// Sell runs before buy so the abbreviation "s" resolves against "sell"
/// rather than the 's' inside "purchase".
pub fn classify_action(raw: &str) -> ActionClass {
    let action = raw.trim().to_lowercase();
    if action.is_empty() {
        return ActionClass::Unknown;
    }

    if IGNORED_ACTIONS.iter().any(|word| action.contains(word)) {
        return ActionClass::Ignored;
    }
    if SELL_WORDS
        .iter()
        .any(|word| action.contains(word) || word.contains(action.as_str()))
    {
        return ActionClass::Sell;
    }
    if BUY_WORDS
        .iter()
        .any(|word| action.contains(word) || word.contains(action.as_str()))
    {
        return ActionClass::Buy;
    }

    ActionClass::Unknown
}
