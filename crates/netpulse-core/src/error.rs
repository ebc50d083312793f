// ── Core error types ──
//
// Errors surfaced by netpulse-core. None of them is fatal to the
// process: sampling errors are logged and the tick is skipped, lookup
// errors are returned to the caller that asked for the mutation.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Data errors ──────────────────────────────────────────────────
    #[error("Alert not found: {id}")]
    AlertNotFound { id: String },

    #[error("Alert already exists: {id}")]
    DuplicateAlert { id: String },

    #[error("Invalid alert status '{value}' (expected Active, Investigating or Resolved)")]
    InvalidStatus { value: String },

    // ── Sampling errors ──────────────────────────────────────────────
    #[error("Counter source unavailable: {message}")]
    CounterSource { message: String },

    #[error("Counter read did not finish within {timeout_ms}ms")]
    SampleTimeout { timeout_ms: u64 },

    #[error("Previous counter read is still running")]
    SampleInFlight,

    // ── Encoding errors ──────────────────────────────────────────────
    #[error("Failed to encode event: {0}")]
    Serialization(#[from] serde_json::Error),

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// True for errors caused by the caller's input rather than the host.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::AlertNotFound { .. } | Self::DuplicateAlert { .. } | Self::InvalidStatus { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_input_errors_are_client_errors() {
        assert!(CoreError::AlertNotFound { id: "A1".into() }.is_client_error());
        assert!(CoreError::InvalidStatus { value: "Closed".into() }.is_client_error());
        assert!(!CoreError::SampleInFlight.is_client_error());
        assert!(!CoreError::SampleTimeout { timeout_ms: 20 }.is_client_error());
        assert!(!CoreError::Internal("join failed".into()).is_client_error());
    }
}
