//! # Error Types
//!
//! Structured error types for frame_core. Every failure in the editing engine
//! is local to a single event: the store rejects the mutation, the controller
//! reports it as an effect, and the editor stays interactive.
//!
//! ## Example
//!
//! ```rust
//! use frame_core::errors::{EditError, EditResult};
//!
//! fn validate_depth(depth: f64) -> EditResult<()> {
//!     if depth <= 0.0 {
//!         return Err(EditError::invalid_input("d", depth.to_string(), "Depth must be positive"));
//!     }
//!     Ok(())
//! }
//! assert!(validate_depth(-1.0).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for frame_core operations
pub type EditResult<T> = Result<T, EditError>;

/// Structured error type for model and editing operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum EditError {
    /// An input value is invalid (out of range, non-finite, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// Start and end of a member coincide
    #[error("Member '{id}' has zero length")]
    ZeroLengthMember { id: String },

    /// Another member already uses this id
    #[error("Duplicate member id: {id}")]
    DuplicateId { id: String },

    /// No member with this id exists
    #[error("Member not found: {id}")]
    MemberNotFound { id: String },
}

impl EditError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        EditError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a ZeroLengthMember error
    pub fn zero_length(id: impl Into<String>) -> Self {
        EditError::ZeroLengthMember { id: id.into() }
    }

    /// Create a DuplicateId error
    pub fn duplicate_id(id: impl Into<String>) -> Self {
        EditError::DuplicateId { id: id.into() }
    }

    /// Create a MemberNotFound error
    pub fn member_not_found(id: impl Into<String>) -> Self {
        EditError::MemberNotFound { id: id.into() }
    }

    /// Precondition failures are caller mistakes; the model is untouched.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            EditError::ZeroLengthMember { .. } | EditError::DuplicateId { .. } | EditError::InvalidInput { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            EditError::InvalidInput { .. } => "INVALID_INPUT",
            EditError::ZeroLengthMember { .. } => "ZERO_LENGTH_MEMBER",
            EditError::DuplicateId { .. } => "DUPLICATE_ID",
            EditError::MemberNotFound { .. } => "MEMBER_NOT_FOUND",
        }
    }
}
