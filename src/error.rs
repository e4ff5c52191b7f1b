//! Error types for the esim circuit analysis engine.
//!
//! This module provides a unified error type [`EsimError`] covering
//! element construction failures and solve-time singularities.

use thiserror::Error;

/// Result type alias using [`EsimError`].
pub type Result<T> = std::result::Result<T, EsimError>;

/// Unified error type for all esim operations.
#[derive(Error, Debug)]
pub enum EsimError {
    /// An element was constructed with out-of-domain parameters.
    ///
    /// Raised at add time (non-positive resistance, non-finite values,
    /// degenerate terminals) or at solve time when a current-controlled
    /// source references an element that no longer carries a branch
    /// current. The failing call leaves the circuit unchanged.
    #[error("invalid element: {message}")]
    InvalidElement { message: String },

    /// The assembled system has no unique solution.
    ///
    /// No pivot above the configured threshold could be found for the
    /// given column - the circuit may have a floating node, duplicate
    /// voltage constraints, or a subgraph with no ground reference.
    #[error("singular matrix: no usable pivot for column {column}")]
    SingularMatrix { column: usize },
}

impl EsimError {
    /// Create an invalid element error.
    pub fn invalid_element(message: impl Into<String>) -> Self {
        Self::InvalidElement {
            message: message.into(),
        }
    }
}
