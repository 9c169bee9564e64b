//! Error types for the pricing engine.
//!
//! Every failure the engine can report is a local computation failure:
//! either the caller handed in an input the formulas cannot price, or the
//! reference tax table is unusable.

use thiserror::Error;

/// Result type alias using [`PricingError`].
pub type Result<T> = std::result::Result<T, PricingError>;

/// Unified error type for pricing operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// The input was rejected before any computation took place.
    #[error("invalid input `{field}`: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// The tax reference data is missing or malformed.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl PricingError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        PricingError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        PricingError::Configuration(message.into())
    }

    /// Returns `true` when the error was caused by the caller's input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, PricingError::InvalidInput { .. })
    }
}
