//! Error types for registry access and inventory runs.
//!
//! [`RegistryError`] covers everything that can go wrong while talking to a
//! registry. Most of these are absorbed close to where they happen: a missing
//! value becomes a placeholder, a missing location is skipped.
//! [`InventoryError`] holds the conditions that end a run.

use std::path::PathBuf;
use thiserror::Error;

/// Failure while reading from a registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The key does not exist or cannot be opened.
    #[error("Registry key not found: {path}")]
    KeyNotFound { path: String },

    /// The key exists but has no value with this name.
    #[error("Registry value not found: {name}")]
    ValueNotFound { name: String },

    /// The value exists but has a type that cannot be read as text.
    #[error("Registry value {name} has unsupported type {value_type}")]
    UnsupportedType { name: String, value_type: String },

    /// The registry tool ran but reported failure.
    #[error("Registry query failed for {path}: {message}")]
    QueryFailed { path: String, message: String },

    /// The registry tool could not be started.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Conditions that abort an inventory run.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// The directory given for the report does not exist.
    #[error("Invalid output path: {}", path.display())]
    InvalidOutputPath { path: PathBuf },

    /// The registry root of the target host could not be opened.
    #[error("Unable to open the registry on {host}: {source}")]
    RegistryUnavailable {
        host: String,
        #[source]
        source: RegistryError,
    },
}

impl InventoryError {
    /// Process exit code reported for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            InventoryError::InvalidOutputPath { .. } => 3,
            InventoryError::RegistryUnavailable { .. } => 4,
        }
    }
}
