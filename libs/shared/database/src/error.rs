use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DatabaseError {
    #[error("No row {key} in table {table}")]
    NotFound { table: String, key: String },

    #[error("Row {key} already exists in table {table}")]
    DuplicateKey { table: String, key: String },

    #[error("Row {key} in table {table} changed concurrently (expected version {expected}, found {found})")]
    VersionConflict {
        table: String,
        key: String,
        expected: u64,
        found: u64,
    },

    #[error("Table {table} did not respond within {timeout_ms}ms")]
    Timeout { table: String, timeout_ms: u64 },

    #[error("Snapshot I/O error: {0}")]
    Io(String),

    #[error("Snapshot serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for DatabaseError {
    fn from(e: serde_json::Error) -> Self {
        DatabaseError::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for DatabaseError {
    fn from(e: std::io::Error) -> Self {
        DatabaseError::Io(e.to_string())
    }
}
