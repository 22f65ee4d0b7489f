use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DockerError {
    #[error("Docker connection error: {0}")]
    Connection(#[from] bollard::errors::Error),

    #[error("Invalid daemon endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Build context directory not found: {0}")]
    ContextNotFound(PathBuf),

    #[error("Build failed: {0}")]
    BuildFailed(String),

    #[error("Push failed: {message}")]
    PushFailed { message: String },

    #[error("Registry request failed: {0}")]
    Registry(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DockerError>;
