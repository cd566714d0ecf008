// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Library error type.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by planning, catalog loading and file output.
///
/// Range problems in musical data (scale indices, channels, velocities)
/// are repaired in place and never show up here.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// A genre id that the registry does not know
    #[error("unknown genre: {0}")]
    UnknownGenre(String),

    /// A catalog entry that fails validation
    #[error("invalid template for genre {genre}: {reason}")]
    InvalidTemplate { genre: String, reason: String },

    /// Destination could not be written
    #[error("failed to write {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ComposeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ComposeError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(genre: impl Into<String>, reason: impl Into<String>) -> Self {
        ComposeError::InvalidTemplate {
            genre: genre.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias for library operations
pub type Result<T> = std::result::Result<T, ComposeError>;
