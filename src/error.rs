use thiserror::Error;

pub type Result<T> = std::result::Result<T, DriftboardError>;

#[derive(Debug, Error)]
pub enum DriftboardError {
    #[error("Card not found: {0}")]
    CardNotFound(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Duplicate card id on board: {0}")]
    DuplicateCard(String),

    #[error("Stale move rejected: card {card} is not at {column}[{index}]")]
    StaleMove {
        card: String,
        column: String,
        index: usize,
    },

    #[error("Persistence failed: {0}")]
    PersistenceFailed(String),

    #[error("Journal not initialized")]
    JournalNotInitialized,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
