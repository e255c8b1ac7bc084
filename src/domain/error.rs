// ============================================================
// Layer 3 — Data Errors
// ============================================================
// The data and infra layers return these typed errors so a caller
// can tell a broken setup (Config) from a bad sample (Lookup,
// Parse, Shape). The application layer wraps them in anyhow.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    /// A required file or vocabulary symbol is missing. Fatal at startup.
    #[error("configuration error: {0}")]
    Config(String),

    /// A symbol, id or sample index that does not exist.
    #[error("lookup error: {0}")]
    Lookup(String),

    /// A malformed label row.
    #[error("parse error: {0}")]
    Parse(String),

    /// Image buffer or channel layout that cannot be interpreted.
    #[error("shape error: {0}")]
    Shape(String),
}

impl DataError {
    pub fn config(msg: impl Into<String>) -> Self {
        DataError::Config(msg.into())
    }

    pub fn lookup(msg: impl Into<String>) -> Self {
        DataError::Lookup(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        DataError::Parse(msg.into())
    }

    pub fn shape(msg: impl Into<String>) -> Self {
        DataError::Shape(msg.into())
    }

    /// Prefix the message with the sample it came from, keeping the kind.
    pub fn in_sample(self, name: &str) -> Self {
        match self {
            DataError::Config(m) => DataError::Config(format!("sample '{name}': {m}")),
            DataError::Lookup(m) => DataError::Lookup(format!("sample '{name}': {m}")),
            DataError::Parse(m)  => DataError::Parse(format!("sample '{name}': {m}")),
            DataError::Shape(m)  => DataError::Shape(format!("sample '{name}': {m}")),
        }
    }
}
