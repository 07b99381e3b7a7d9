//! Error types for platen.

use thiserror::Error;

/// Result type alias for platen operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while arranging.
#[derive(Debug, Error)]
pub enum Error {
    /// Degenerate or malformed part contour.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Invalid bed or bin description.
    #[error("Invalid bed: {0}")]
    InvalidBed(String),

    /// NFP computation failed.
    #[error("NFP computation failed: {0}")]
    NfpError(String),

    /// Coordinates outside the supported range; intermediate arithmetic
    /// would overflow.
    #[error("Arithmetic overflow: {0}")]
    Overflow(String),

    /// Computation cancelled by the stop predicate.
    #[error("Computation cancelled")]
    Cancelled,
}
