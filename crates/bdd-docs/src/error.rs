//! Error types for documentation runs.
//!
//! Only [`DocsError`] aborts a run. Feature files that cannot be read or
//! parsed surface a [`crate::parser::FeatureParseError`] instead, which the
//! tree builder logs and recovers from by downgrading the node to a plain
//! file.

use std::path::PathBuf;

use thiserror::Error;

use crate::resolver::StepMatchError;
use crate::steps::StepIndexError;

/// An invalid configuration value.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid configuration: {0}")]
pub struct ConfigError(pub String);

/// Errors that abort a documentation run.
#[derive(Debug, Error)]
pub enum DocsError {
    /// A filesystem operation outside feature parsing failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path that was being inspected.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The step matcher failed while resolving a step.
    #[error(transparent)]
    StepMatch(#[from] StepMatchError),

    /// A step-definition source could not be indexed.
    #[error(transparent)]
    StepIndex(#[from] StepIndexError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The documentation site could not be serialised.
    #[error("failed to serialise documentation site: {0}")]
    Serialise(#[from] serde_json::Error),
}

impl DocsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
