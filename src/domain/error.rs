//! Error taxonomy shared by the store, the dictation adapter and the session.
//!
//! None of these are fatal: the presentation layer turns every variant into a
//! transient notice and keeps running.

use super::todo_list::ListId;

/// Failures of the durable list store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row whose tasks column could not be decoded.
    #[error("list {id} has a corrupt tasks column: {source}")]
    Corrupt {
        id: ListId,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not encode tasks: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum TodoError {
    /// Blank title or task text.
    #[error("{0}")]
    Validation(String),

    /// A list id or task index that no longer exists.
    #[error("{0} not found")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("no list is open")]
    NoListOpen,

    #[error("voice dictation is not available")]
    DictationUnavailable,

    /// A recognition error reported by the platform mid-session.
    #[error("speech recognition error: {0}")]
    Dictation(String),
}

impl TodoError {
    pub fn list_not_found(id: ListId) -> Self { TodoError::NotFound(format!("list {id}")) }

    pub fn task_not_found(index: usize) -> Self { TodoError::NotFound(format!("task {index}")) }

    pub fn is_not_found(&self) -> bool { matches!(self, TodoError::NotFound(_)) }
}

impl From<sqlx::Error> for TodoError {
    fn from(e: sqlx::Error) -> Self {
        let storage = match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => StorageError::Unavailable(e.to_string()),
            other => StorageError::Database(other),
        };
        TodoError::Storage(storage)
    }
}

pub type TodoResult<T> = Result<T, TodoError>;
