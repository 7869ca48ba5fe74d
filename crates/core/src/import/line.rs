//! Raw-text plumbing: line splitting, delimiter detection, and quote-aware
//! field tokenization (one line at a time, via the csv crate).

/// Split raw text into lines, tolerant of `\r\n` and `\n` endings.
/// Blank lines are preserved — the IBKR section extractor needs them.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n').map(|l| l.trim_end_matches('\r')).collect()
}

/// Detect the most likely field delimiter from the header line.
/// Most frequent of `, ; \t |` wins; comma when nothing is found.
pub fn detect_delimiter(header_line: &str) -> char {
    let counts = [
        (',', header_line.matches(',').count()),
        (';', header_line.matches(';').count()),
        ('\t', header_line.matches('\t').count()),
        ('|', header_line.matches('|').count()),
    ];

    counts
        .into_iter()
        .max_by_key(|(_, count)| *count)
        .map(|(delim, count)| if count > 0 { delim } else { ',' })
        .unwrap_or(',')
}

/// Tokenize a single line into trimmed fields. Quote-aware: a field may be
/// wrapped in double quotes, `""` inside a quoted field is an escaped quote,
/// and delimiters inside quotes do not split.
pub fn parse_csv_line(line: &str, delimiter: char) -> Vec<String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(line.as_bytes());

    if let Some(Ok(record)) = reader.records().next() {
        record.iter().map(|s| s.to_string()).collect()
    } else {
        // Fallback for lines the csv reader rejects (e.g. stray quotes)
        line.split(delimiter).map(|s| s.trim().to_string()).collect()
    }
}
