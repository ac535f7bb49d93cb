//! Error types for screen operations

use std::collections::TryReserveError;

use thiserror::Error;

/// Screen error type
#[derive(Error, Debug)]
pub enum ScreenError {
    /// Storage for a resize or rewrap could not be allocated.
    /// The screen state before the call is left untouched.
    #[error("failed to allocate screen storage: {0}")]
    Alloc(#[from] TryReserveError),

    /// A caller-supplied row index was outside the visible grid
    #[error("row {row} out of bounds (lines={lines})")]
    OutOfBounds { row: usize, lines: usize },
}

/// Result type for screen operations
pub type Result<T> = std::result::Result<T, ScreenError>;
