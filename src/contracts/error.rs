use thiserror::Error;

/// Top-level error for process startup.
#[derive(Error, Debug)]
pub enum NumbersError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("RocksDB error: {0}")]
    RocksDb(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Schema version mismatch: expected {expected}, found {found}")]
    SchemaMismatch { expected: u32, found: u32 },

    #[error("Schema not initialized")]
    SchemaNotReady,

    #[error("Sequence error: {0}")]
    Sequence(#[from] SequenceError),

    #[error("Store task failed: {0}")]
    TaskFailed(String),
}

#[derive(Error, Debug)]
pub enum SequenceError {
    #[error("Sequence overflow")]
    Overflow,
}

/// Rejection of an inbound write before it reaches the store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Invalid JSON body: {0}")]
    InvalidBody(String),

    #[error("Number is required")]
    MissingInput,

    #[error("Invalid number format: {0}")]
    InvalidFormat(String),
}

impl InputError {
    /// Machine-readable code returned to clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidBody(_) => "INVALID_BODY",
            Self::MissingInput => "MISSING_INPUT",
            Self::InvalidFormat(_) => "INVALID_FORMAT",
        }
    }
}
