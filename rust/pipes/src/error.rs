// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for reconstruction operations
pub type Result<T> = std::result::Result<T, ReconstructError>;

/// Errors that can occur during pipe reconstruction
#[derive(Error, Debug)]
pub enum ReconstructError {
    /// A stage received fewer points than it can reduce to a shape
    #[error("insufficient data: need at least {needed} points, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("scan ingestion failed: {0}")]
    Core(#[from] inwall_core::Error),

    #[error("I/O error on '{}': {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReconstructError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReconstructError::Io {
            path: path.into(),
            source,
        }
    }
}
