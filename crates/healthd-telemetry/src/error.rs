//! Error types for attribute reads, value decoding and sampling

use crate::attribute::Attribute;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure to obtain the raw text of an attribute file
#[derive(Debug, Error)]
pub enum AttributeError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Attribute {} exceeds {limit} bytes", .path.display())]
    TooLarge { path: PathBuf, limit: u64 },
}

impl AttributeError {
    /// Path of the attribute file that could not be read
    pub fn path(&self) -> &Path {
        match self {
            AttributeError::Read { path, .. } | AttributeError::TooLarge { path, .. } => path,
        }
    }

    /// True when the file simply does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AttributeError::Read { source, .. } if source.kind() == io::ErrorKind::NotFound
        )
    }
}

/// Attribute text that does not hold the expected value type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Not a number: {0:?}")]
    NotANumber(String),

    #[error("Number out of range: {0:?}")]
    OutOfRange(String),

    #[error("Invalid counter #{index}: {token:?}")]
    InvalidCounter { index: usize, token: String },
}

/// First failure encountered while assembling a snapshot
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("Reading {attribute} failed: {source}")]
    Read {
        attribute: Attribute,
        #[source]
        source: AttributeError,
    },

    #[error("Decoding {attribute} failed: {source}")]
    Parse {
        attribute: Attribute,
        #[source]
        source: ParseError,
    },
}

impl SampleError {
    /// The attribute whose read or decode aborted the sample
    pub fn attribute(&self) -> Attribute {
        match self {
            SampleError::Read { attribute, .. } | SampleError::Parse { attribute, .. } => {
                *attribute
            }
        }
    }
}

/// Reply given to the reporting layer when telemetry cannot be produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{operation} is not supported")]
pub struct Unsupported {
    pub operation: &'static str,
}
