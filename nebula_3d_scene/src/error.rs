//! Error types for the Nebula3D scene core
//!
//! This module defines the error types surfaced by the scene task queue
//! and the owning-thread drain dispatch.

use std::fmt;

/// Result type for Nebula3D scene operations
pub type Result<T> = std::result::Result<T, Error>;

/// Nebula3D scene errors
#[derive(Debug, Clone)]
pub enum Error {
    /// A task named an element (by identity) that is not in its collection
    TargetNotFound(String),

    /// A task carried an explicit index outside its collection's bounds
    InvalidIndex(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::TargetNotFound(msg) => write!(f, "Target not found: {}", msg),
            Error::InvalidIndex(msg) => write!(f, "Invalid index: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
