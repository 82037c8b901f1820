use thiserror::Error;

use crate::client::ClientError;

#[derive(Error, Debug)]
pub enum ViewError {
    /// A programming-time contract violation, never retried.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Bad input typed by a user. Screens render it back as a warning banner.
    #[error("{0}")]
    UserInput(String),

    #[error("Platform error: {0}")]
    Client(#[from] ClientError),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ViewError>;
