use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AipacaError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
    #[error("Config error: {0}")]
    ConfigError(String),
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AipacaError {
    /// Wrap an I/O failure with the step or path it happened on.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        AipacaError::Io {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, AipacaError>;
