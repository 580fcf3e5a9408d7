use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Nowhere to report: {0}")]
    NowhereToReport(String),
    #[error("Path {path} can't be used for this service")]
    UnusableOverride { path: String },
    #[error("Template error: {0}")]
    TemplateError(String),
    #[error("Ticketing error: {0}")]
    TicketingError(String),
    #[error("HTTP error: {0}")]
    HttpError(String),
    #[error("Inventory error: {0}")]
    InventoryError(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

impl CheckpointError {
    /// True for errors that abort an app before any ticket can be filed.
    pub fn is_board_error(&self) -> bool {
        matches!(
            self,
            CheckpointError::NowhereToReport(_) | CheckpointError::UnusableOverride { .. }
        )
    }
}
