use thiserror::Error;

/// Unified error type for the entire portfolio-tracker-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Import (fatal — the whole file is rejected) ─────────────────
    #[error("File is empty or contains no rows")]
    EmptyFile,

    #[error("No header row detected — first row matched no known column (headers: [{headers}])")]
    NoHeaderRow { headers: String },

    #[error("Could not detect symbol column — no ticker, instrument name, or ISIN header found (headers: [{headers}])")]
    SymbolColumnNotFound { headers: String },

    #[error("No data rows found after the header row")]
    NoDataRows,

    #[error("Import failed: {0}")]
    ImportFailed(String),

    // ── Business Logic ──────────────────────────────────────────────
    #[error("Trade validation failed: {0}")]
    ValidationError(String),

    #[error("Trade not found: {0}")]
    TradeNotFound(String),

    // ── Serialization ───────────────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}
