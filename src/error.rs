//! Unified error type for the gateway.
//!
//! Four terminal kinds mirror the failure taxonomy surfaced to callers
//! through [`GatewayResult::Failure`]; `Validation` and `Cancelled` cover the
//! pre-dispatch invariant and caller-initiated aborts. None of these are
//! retried; the internal 429 loop is invisible to the caller until its
//! budget is exhausted.

use thiserror::Error;

use crate::types::{FailureKind, GatewayResult};

/// Unified error type for gateway operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("cancelled: {0}")]
    Cancelled(String),
}

impl Error {
    /// The caller-facing failure kind for this error.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Error::RateLimited(_) => FailureKind::RateLimited,
            Error::Provider(_) => FailureKind::Provider,
            Error::MalformedResponse(_) => FailureKind::MalformedResponse,
            Error::Transport(_) => FailureKind::Transport,
            Error::Validation(_) => FailureKind::Validation,
            Error::Cancelled(_) => FailureKind::Cancelled,
        }
    }

    /// Converts this error into the terminal [`GatewayResult::Failure`] variant.
    pub fn into_failure(self) -> GatewayResult {
        GatewayResult::Failure {
            kind: self.failure_kind(),
            message: self.to_string(),
        }
    }
}

/// Result type alias for the library.
pub type Result<T> = std::result::Result<T, Error>;
