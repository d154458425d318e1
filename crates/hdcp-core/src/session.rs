//! Per-session mutable record.

use hdcp_proto::messages::NONCE_SIZE;

use crate::pairing::ReceiverId;
use crate::state::{State, Status};

/// Upper bound on locality check rounds within one attempt.
pub const MAX_LOCALITY_CHECKS: u32 = 1024;

/// Everything the state handlers mutate between polls.
///
/// Transition-table actions receive `&mut SessionInfo` and nothing else,
/// which keeps edge side effects free of IO by construction.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    /// State whose handler runs on the next poll.
    pub current_state: State,
    /// State whose handler ran on the previous poll.
    pub previous_state: State,
    /// Externally visible status.
    pub status: Status,
    /// Master enable for the whole machine.
    pub enabled: bool,
    /// Whether link encryption has been switched on by the integrator.
    pub encryption_enabled: bool,
    /// Result of the last capability probe.
    pub receiver_hdcp2_capable: bool,
    /// Transmitter nonce of the current attempt.
    pub rtx: [u8; NONCE_SIZE],
    /// Receiver nonce of the current attempt.
    pub rrx: [u8; NONCE_SIZE],
    /// Nonce of the current locality round.
    pub rn: [u8; NONCE_SIZE],
    /// Locality rounds opened in the current attempt.
    pub locality_check_count: u32,
    /// Set once the awaited message is known to be staged.
    pub msg_available: bool,
    /// Early-poll divisor for message waits; 0 disables early polling.
    pub polling_value: u32,
    /// Pairing cache key of the receiver in the current attempt.
    pub pairing_key: Option<ReceiverId>,
    /// Latched when the receiver asks for re-authentication.
    pub reauth_requested: bool,
}

impl SessionInfo {
    pub(crate) fn new(polling_value: u32) -> Self {
        Self {
            current_state: State::Idle,
            previous_state: State::Idle,
            status: Status::Unauthenticated,
            enabled: false,
            encryption_enabled: false,
            receiver_hdcp2_capable: false,
            rtx: [0; NONCE_SIZE],
            rrx: [0; NONCE_SIZE],
            rn: [0; NONCE_SIZE],
            locality_check_count: 0,
            msg_available: false,
            polling_value,
            pairing_key: None,
            reauth_requested: false,
        }
    }
}
