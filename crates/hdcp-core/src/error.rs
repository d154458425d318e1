//! Engine error types.

use thiserror::Error;

/// Error reported by a platform collaborator during setup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct CollaboratorError(pub String);

impl CollaboratorError {
    /// Builds an error from any displayable cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Errors raised while wiring up the engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InitError {
    /// Timer collaborator failed to initialize.
    #[error("timer setup failed: {0}")]
    Timer(CollaboratorError),
    /// Random source failed to initialize.
    #[error("random source setup failed: {0}")]
    Random(CollaboratorError),
    /// Cipher collaborator failed to initialize.
    #[error("cipher setup failed: {0}")]
    Cipher(CollaboratorError),
}

/// Errors returned by the public engine API.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxError {
    /// Operation requires the state machine to be enabled.
    #[error("state machine is disabled")]
    NotEnabled,
    /// Operation requires a fully authenticated link.
    #[error("link is not authenticated")]
    NotAuthenticated,
}

/// Reasons an authentication attempt is abandoned.
///
/// These never surface as `Err` from [`crate::HdcpTx::poll`]; they route
/// the state machine back to the start of a fresh attempt and are visible
/// in the status reported by `poll` and in the log stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptFailure {
    /// Receiver did not stage an expected message before the deadline.
    TransportTimeout,
    /// A DDC transfer failed outright.
    TransportFailure,
    /// Certificate signature did not verify against the DCP LLC key.
    SignatureInvalid,
    /// Receiver's H' did not match the locally derived value.
    HPrimeMismatch,
    /// Receiver's L' did not match the locality challenge.
    LPrimeMismatch,
    /// Locality check retry ceiling was exhausted.
    RetryCeilingExceeded,
    /// Receiver staged a frame the protocol does not allow here.
    MalformedMessage,
}

impl std::fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::TransportTimeout => "receiver response timeout",
            Self::TransportFailure => "ddc transfer failure",
            Self::SignatureInvalid => "certificate signature invalid",
            Self::HPrimeMismatch => "h-prime mismatch",
            Self::LPrimeMismatch => "l-prime mismatch",
            Self::RetryCeilingExceeded => "locality retry ceiling exceeded",
            Self::MalformedMessage => "malformed or unexpected message",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_attempt_failure_has_a_distinct_description() {
        let failures = [
            AttemptFailure::TransportTimeout,
            AttemptFailure::TransportFailure,
            AttemptFailure::SignatureInvalid,
            AttemptFailure::HPrimeMismatch,
            AttemptFailure::LPrimeMismatch,
            AttemptFailure::RetryCeilingExceeded,
            AttemptFailure::MalformedMessage,
        ];
        let mut seen = std::collections::HashSet::new();
        for failure in failures {
            assert!(seen.insert(failure.to_string()));
        }
        assert_eq!(
            AttemptFailure::LPrimeMismatch.to_string(),
            "l-prime mismatch"
        );
    }
}
