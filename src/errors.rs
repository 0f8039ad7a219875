//! Custom error types for patch processing

use std::fmt;
use std::io;

/// Errors raised while building or augmenting the image tree
#[derive(Debug)]
pub enum PatchError {
    /// I/O error
    IoError(io::Error),
    /// Raster decode/encode error
    ImageError(image::ImageError),
    /// Patch file name does not decode into a parent id and bounds
    MalformedName(String),
    /// Raster carries no coordinate reference system (recoverable)
    NoGeoReference(String),
    /// A derived quantity was requested before its prerequisite exists (recoverable)
    MissingGeoData(String),
    /// Invalid batch range bounds
    InvalidRange(String),
    /// Tree level outside {parent, child} at a text boundary
    UnknownLevel(String),
    /// Generic error with message
    GenericError(String),
}

impl fmt::Display for PatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchError::IoError(e) => write!(f, "I/O error: {}", e),
            PatchError::ImageError(e) => write!(f, "Image error: {}", e),
            PatchError::MalformedName(name) => write!(f, "Malformed patch name: {}", name),
            PatchError::NoGeoReference(id) => write!(f, "No geo reference found for: {}", id),
            PatchError::MissingGeoData(msg) => write!(f, "Missing geo data: {}", msg),
            PatchError::InvalidRange(msg) => write!(f, "Invalid range: {}", msg),
            PatchError::UnknownLevel(level) => write!(f, "Unknown tree level: {}", level),
            PatchError::GenericError(msg) => write!(f, "Patch error: {}", msg),
        }
    }
}

impl std::error::Error for PatchError {}

impl From<io::Error> for PatchError {
    fn from(error: io::Error) -> Self {
        PatchError::IoError(error)
    }
}

impl From<image::ImageError> for PatchError {
    fn from(error: image::ImageError) -> Self {
        PatchError::ImageError(error)
    }
}

impl From<String> for PatchError {
    fn from(msg: String) -> Self {
        PatchError::GenericError(msg)
    }
}

/// Result type for patch operations
pub type PatchResult<T> = Result<T, PatchError>;

impl PatchError {
    /// True for errors that degrade a feature rather than abort an operation
    ///
    /// Missing coordinate systems and absent derived data leave the
    /// affected field unset; batch operations log these and continue.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PatchError::NoGeoReference(_) | PatchError::MissingGeoData(_)
        )
    }
}
