//! Error types for the plugkit crate.
//!
//! Most failures in the engine never surface as errors: probe, execution
//! and spawn failures are logged where they happen and folded into a
//! boolean verdict or a [`ChangeStatus`](crate::ChangeStatus). The variants
//! here cover the few APIs that genuinely return `Result`.

use crate::types::ChangeStatus;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading plugins or driving a batch.
#[derive(Error, Debug)]
pub enum Error {
    /// Manifest could not be read from disk
    #[error("failed to read manifest {}: {source}", .path.display())]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Manifest is not valid JSON or has the wrong shape
    #[error("failed to parse manifest {}: {source}", .path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Manifest parsed but violates a descriptor invariant
    #[error("invalid manifest {}: {reason}", .path.display())]
    InvalidManifest { path: PathBuf, reason: String },

    /// A pending change was asked to move to a state it cannot reach
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition { from: ChangeStatus, to: ChangeStatus },

    /// No plugin with the given id exists in the catalog
    #[error("plugin not found: {0}")]
    PluginNotFound(String),
}

/// Result type for plugkit operations
pub type Result<T> = std::result::Result<T, Error>;
