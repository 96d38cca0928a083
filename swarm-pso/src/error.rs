//! Errors surfaced by runs, configuration files and trajectory files.

use std::io;
use std::path::PathBuf;

/// Failure of a [`crate::run`] or one of its file operations.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// The optimizer rejected its configuration or aborted mid-run
    #[error(transparent)]
    Optimizer(#[from] swarm_pso_core::Error),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: malformed JSON: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{}: malformed trajectory: {reason}", .path.display())]
    Trajectory { path: PathBuf, reason: String },

    /// A command-line or configuration value could not be interpreted
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl RunError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| RunError::Io { path, source }
    }

    pub(crate) fn json(path: impl Into<PathBuf>) -> impl FnOnce(serde_json::Error) -> Self {
        let path = path.into();
        move |source| RunError::Json { path, source }
    }
}

pub type Result<T> = std::result::Result<T, RunError>;
