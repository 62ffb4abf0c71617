// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for scan ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for ingestion operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading scan data.
///
/// Individual malformed records are never errors: the parser skips them
/// and counts them instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot read scan file '{}': {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
