/// Error type shared by the store, the coordinator and the browser bridge
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WorkspaceError>;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("Workspace not found: {0}")]
    WorkspaceNotFound(String),

    #[error("Current workspace not found")]
    CurrentWorkspaceNotFound,

    #[error("Bookmark not found: {0}")]
    BookmarkNotFound(String),

    #[error("Cannot delete the last workspace")]
    LastWorkspace,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Tabs API error: {0}")]
    Tabs(String),

    #[error("Timer error: {0}")]
    Timer(String),

    #[error("Invalid workspace data: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WorkspaceError {
    pub fn storage(message: impl Into<String>) -> Self {
        WorkspaceError::Storage(message.into())
    }

    pub fn tabs(message: impl Into<String>) -> Self {
        WorkspaceError::Tabs(message.into())
    }
}
