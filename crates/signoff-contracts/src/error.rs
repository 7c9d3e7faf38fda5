//! Error types for the signoff approval engine.
//!
//! All fallible operations return `SignoffResult<T>`. Every variant is
//! caller-visible and non-retryable without a change in stored state.

use thiserror::Error;

/// The unified error type for the approval engine and its collaborators.
#[derive(Debug, Error)]
pub enum SignoffError {
    /// The template configuration cannot serve the request: no Approval is
    /// bound to the subject type, no Statement applies and none is default,
    /// or a catalog/config document is malformed.
    #[error("configuration error: {reason}")]
    Configuration { reason: String },

    /// The Run is not in a state that permits the operation, the acting
    /// principal is not a contributor of the active step, or the subject
    /// type is excluded from approval.
    #[error("precondition failed: {reason}")]
    Precondition { reason: String },

    /// A read-only operation required a Run that has not been materialized.
    #[error("not found: {reason}")]
    NotFound { reason: String },

    /// The backing store failed to complete a lookup or write.
    ///
    /// Surfaced unchanged; the engine performs no retries.
    #[error("store error: {reason}")]
    Store { reason: String },
}

impl SignoffError {
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration { reason: reason.into() }
    }

    pub fn precondition(reason: impl Into<String>) -> Self {
        Self::Precondition { reason: reason.into() }
    }

    pub fn not_found(reason: impl Into<String>) -> Self {
        Self::NotFound { reason: reason.into() }
    }

    pub fn store(reason: impl Into<String>) -> Self {
        Self::Store { reason: reason.into() }
    }
}

/// Convenience alias used throughout the signoff crates.
pub type SignoffResult<T> = Result<T, SignoffError>;
