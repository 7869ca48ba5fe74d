//! Interactive Brokers activity statements are multi-section CSV files:
//! every line is prefixed with a section name and a row discriminator
//! ("Trades,Header,...", "Trades,Data,...", "Dividends,Data,...").
//! This module pulls out just the Trades section so the generic pipeline
//! can parse it like any other CSV.

const TRADES_HEADER_MARKER: &str = "Trades,Header";
const TRADES_DATA_PREFIX: &str = "Trades,Data,";
const TRADES_END_MARKERS: &[&str] = &["Trades,Total", "Trades,SubTotal"];

/// The Trades section of a statement: its header row and data rows, all
/// with the section prefix already stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradesSection {
    pub header: String,
    pub rows: Vec<String>,
}

/// Locate the first Trades section. The remainder of the "Trades,Header"
/// line becomes the header row; subsequent "Trades,Data"-prefixed lines are
/// collected with the prefix stripped. Collection stops at the first blank
/// line, a line starting with a bare comma, or a Trades,Total/SubTotal
/// marker. Lines from other sections are skipped, never collected.
///
/// Returns `None` when the file has no such section — the caller falls back
/// to the generic parser.
pub fn extract_trades_section(lines: &[&str]) -> Option<TradesSection> {
    let start = lines
        .iter()
        .position(|line| line.starts_with(TRADES_HEADER_MARKER))?;

    let header = lines[start]
        .strip_prefix(TRADES_HEADER_MARKER)?
        .trim_start_matches(',')
        .to_string();
    if header.is_empty() {
        return None;
    }

    let mut rows = Vec::new();
    for line in &lines[start + 1..] {
        if line.trim().is_empty()
            || line.starts_with(',')
            || TRADES_END_MARKERS.iter().any(|m| line.starts_with(m))
        {
            break;
        }
        if let Some(rest) = line.strip_prefix(TRADES_DATA_PREFIX) {
            rows.push(rest.to_string());
        }
    }

    Some(TradesSection { header, rows })
}
