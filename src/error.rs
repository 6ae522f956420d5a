//! Error types for the environment, model loading and configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by environment operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum EnvError {
    #[error("action {action} invalid: expected a cell index in 0..{n}")]
    InvalidAction { action: usize, n: usize },

    #[error("cell {position} is already occupied")]
    CellOccupied { position: usize },

    #[error("environment must be reset before calling step")]
    NotReset,

    #[error("opponent model error: {0}")]
    Model(#[from] ModelError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised while loading or evaluating a network.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ModelError {
    #[error("failed to read model {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode model {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },

    #[error("failed to encode model: {0}")]
    Encode(String),

    #[error("no model file found for {stem} in {}", dir.display())]
    NotFound { stem: String, dir: PathBuf },

    #[error("shape mismatch in layer {layer}: expected {expected} inputs, got {got}")]
    ShapeMismatch {
        layer: usize,
        expected: usize,
        got: usize,
    },

    #[error("network has no layers")]
    Empty,
}

/// Errors raised while loading an environment configuration.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}
