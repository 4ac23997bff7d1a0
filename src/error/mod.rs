use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid or unreadable configuration.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Persistence failure.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Rejected story mutation.
    #[error("Story error: {0}")]
    Story(#[from] StoryError),

    /// Operator channel failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Storage layer errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Could not open the database.
    #[error("Database connection failed: {message}")]
    Connection { message: String },

    /// A query or row conversion failed.
    #[error("Query failed: {message}")]
    Query { message: String },

    /// No record of this kind has the id.
    #[error("{kind} record not found: {id}")]
    RecordNotFound { kind: String, id: String },

    /// Embedded migrations could not be applied.
    #[error("Migration failed: {message}")]
    Migration { message: String },

    /// Document rejected before storing.
    #[error("Invalid document: {message}")]
    InvalidDocument { message: String },

    /// Snapshot file could not be read or written.
    #[error("Snapshot file error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed document.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raw SQLx error.
    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Errors raised by story mutations and operator input.
///
/// None of these are fatal: the authoring session reports them and
/// returns to the top menu without touching the story.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoryError {
    /// Line or question index out of range.
    #[error("Invalid index: {index} (have {len})")]
    InvalidIndex { index: usize, len: usize },

    /// No path has this label.
    #[error("Invalid path label: {label}")]
    InvalidLabel { label: String },

    /// Not a dialog in the selected path.
    #[error("Invalid dialog id: {id}")]
    InvalidDialogId { id: String },

    /// Question target outside `0 < id < upper`.
    #[error("Invalid dialog id: {id} (must be between 0 and {upper}, exclusive)")]
    InvalidTarget { id: i64, upper: usize },

    /// Input matches no command in the current menu.
    #[error("Invalid command: {input}")]
    InvalidCommand { input: String },

    /// No id is left for another dialog.
    #[error("Dialog id space exhausted")]
    IdSpaceExhausted,
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for story operations
pub type StoryResult<T> = Result<T, StoryError>;
