//! Error types for the bootstrap pipeline.
//!
//! [`BootstrapError`] is the top-level error. Loader and selector errors are fatal and
//! short-circuit; policy problems are collected into [`FailureList`] and reported together.

use std::path::PathBuf;

use thiserror::Error;

use crate::failure::FailureList;

/// The override file exists but could not be read or parsed.
#[derive(Error, Debug)]
#[error("cannot read config override file {}: {reason}", path.display())]
pub struct ConfigSourceError {
    pub path: PathBuf,
    pub reason: String,
}

/// Selector input that cannot be interpreted at all. Messages name the field and at most the
/// scheme or type tag, never a full value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("{field} uses unsupported scheme '{scheme}'; accepted: {accepted}")]
    UnsupportedScheme {
        field: &'static str,
        scheme: String,
        accepted: String,
    },

    #[error("{field} is malformed: {reason}")]
    MalformedDsn {
        field: &'static str,
        reason: &'static str,
    },

    #[error("{field} '{value}' is unknown; expected one of: local, cloudinary, s3")]
    UnknownStorageType { field: &'static str, value: String },
}

/// Top-level error of a resolution run.
#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error(transparent)]
    ConfigSource(#[from] ConfigSourceError),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error("configuration rejected with {} failure(s):\n{0}", .0.len())]
    Rejected(FailureList),
}

impl BootstrapError {
    /// Process exit code: 1 for a rejected configuration, 2 for unreadable or malformed input.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Rejected(_) => 1,
            Self::ConfigSource(_) | Self::Selection(_) => 2,
        }
    }

    /// Collected failures when the run was rejected by validation.
    pub fn failures(&self) -> Option<&FailureList> {
        match self {
            Self::Rejected(failures) => Some(failures),
            _ => None,
        }
    }
}
