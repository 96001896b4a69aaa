//! Error module for the LIF network library.
use std::error::Error;
use std::fmt;

/// Error types for the library.
#[derive(Debug, PartialEq)]
pub enum SNNError {
    /// Error for invalid parameters, e.g., missing, non-numeric or out-of-range values.
    InvalidParameter(String),
    /// Error for a broken internal invariant, e.g., an empty network at update time.
    InvariantViolation(String),
    /// Error for out of bounds access, e.g., neuron not found.
    OutOfBounds(String),
    /// Error for I/O operations, e.g., the spike log cannot be opened.
    IOError(String),
}

impl fmt::Display for SNNError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SNNError::InvalidParameter(e) => write!(f, "Invalid parameter: {}", e),
            SNNError::InvariantViolation(e) => write!(f, "Invariant violation: {}", e),
            SNNError::OutOfBounds(e) => write!(f, "Index out of bounds: {}", e),
            SNNError::IOError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl Error for SNNError {}

impl From<std::io::Error> for SNNError {
    fn from(e: std::io::Error) -> Self {
        SNNError::IOError(e.to_string())
    }
}
