// Copyright 2026 the Votesync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

use std::io;
use std::path::PathBuf;

/// A data file could not be read, written or parsed.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// Filesystem failure.
    #[error("{}: {source}", path.display())]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// Malformed or unserializable JSON.
    #[error("{}: {source}", path.display())]
    Json {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// A built-in pattern failed to compile.
    #[error("pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl DataError {
    /// Whether the error is a missing file.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

/// Invalid user input.
#[derive(Clone, Debug, thiserror::Error)]
pub enum InputError {
    /// No video id could be extracted from the URL.
    #[error("not a recognizable video URL: {0:?}")]
    InvalidVideoUrl(String),
    /// A built-in pattern failed to compile.
    #[error("pattern: {0}")]
    Pattern(#[from] regex::Error),
}
