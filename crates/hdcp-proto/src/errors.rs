//! Codec error types.

use thiserror::Error;

/// Errors produced while decoding wire messages.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// Buffer length does not match the fixed size of the message.
    #[error("length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch {
        /// Fixed wire size of the expected message.
        expected: usize,
        /// Number of bytes actually supplied.
        actual: usize,
    },

    /// Leading identifier byte does not name the expected message.
    #[error("unexpected message id: expected {expected:#04x}, got {actual:#04x}")]
    UnexpectedMessageId {
        /// Identifier the caller was waiting for.
        expected: u8,
        /// Identifier found on the wire.
        actual: u8,
    },

    /// Identifier byte does not name any known message.
    #[error("unknown message id {0:#04x}")]
    UnknownMessageId(u8),
}

/// Convenience alias for codec results.
pub type Result<T> = std::result::Result<T, ProtocolError>;
