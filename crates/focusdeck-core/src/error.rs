//! Core error types for focusdeck-core.
//!
//! Board, archive and focus commands return typed errors. The zone
//! classifier and the focus timer's tick path never error: bad data
//! degrades to "predicate not satisfied" or to an idle timer.

use std::path::PathBuf;
use thiserror::Error;

use crate::task::{GroupId, TaskId};

/// Core error type for focusdeck-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Task board errors
    #[error(transparent)]
    Board(#[from] BoardError),

    /// Focus mode errors
    #[error(transparent)]
    Focus(#[from] FocusError),

    /// Archive errors
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Stored document could not be decoded
    #[error("Corrupt document '{key}': {message}")]
    Corrupt { key: String, message: String },

    /// Snapshot id not present
    #[error("No snapshot with id {0}")]
    SnapshotNotFound(i64),

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown key in a dot path
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Alert interval outside the accepted range
    #[error("Alert interval must be between {min} and {max} minutes, got {got}")]
    AlertInterval { min: u32, max: u32, got: u32 },

    /// Website URL could not be parsed
    #[error("Invalid URL '{0}'")]
    InvalidUrl(String),

    /// Empty name or title
    #[error("{0} must not be empty")]
    Empty(&'static str),

    /// Out of bounds
    #[error("Index {index} out of bounds for {collection} (length: {len})")]
    OutOfBounds {
        collection: &'static str,
        index: usize,
        len: usize,
    },
}

/// Errors raised by task board mutations.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum BoardError {
    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Project not found: {0}")]
    GroupNotFound(GroupId),

    #[error("Task {task} has no subtask at index {index}")]
    SubtaskNotFound { task: TaskId, index: usize },

    #[error("Nothing matches '{0}'")]
    NoMatch(String),

    #[error("'{0}' matches more than one item; use a longer prefix")]
    Ambiguous(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Errors raised by focus mode commands.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FocusError {
    /// Start was called while another session is running
    #[error("Already focusing on task {0}; stop it first")]
    AlreadyFocusing(TaskId),

    /// The requested task does not exist
    #[error("Cannot focus on unknown task {0}")]
    UnknownTask(TaskId),

    /// Nothing is being focused on
    #[error("No active focus session")]
    NotFocusing,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Errors raised by archive operations.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ArchiveError {
    #[error("No archived entry at index {0}")]
    NotFound(usize),

    #[error("Archive entry {0} is a project marker and cannot be restored")]
    NotRestorable(usize),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) if e.code == rusqlite::ErrorCode::DatabaseLocked => {
                StorageError::Locked
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Storage(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
