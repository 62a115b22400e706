//! # Error Types
//!
//! This module defines error types used throughout the serial-stamp library.

use thiserror::Error;

/// Main error type for serial-stamp operations
#[derive(Debug, Error)]
pub enum StampError {
    /// Malformed or inconsistent specification
    #[error("Invalid specification: {0}")]
    Config(String),

    /// Specification text could not be parsed
    #[error("Failed to parse specification: {0}")]
    Parse(#[from] toml::de::Error),

    /// Image decoding or encoding error
    #[error("Image error: {0}")]
    Image(String),

    /// Font file could not be read or parsed
    #[error("Font error: {0}")]
    Font(String),

    /// Project archive could not be read or written
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// HTTP server error
    #[error("Server error: {0}")]
    Server(String),

    /// Background worker stopped without reporting a result
    #[error("Worker error: {0}")]
    Worker(String),

    /// Generation was cancelled between pages
    #[error("Generation cancelled")]
    Cancelled,

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for StampError {
    fn from(e: image::ImageError) -> Self {
        StampError::Image(e.to_string())
    }
}
