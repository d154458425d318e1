//! Link cipher control seam.

use hdcp_proto::messages::{KM_SIZE, NONCE_SIZE};

use crate::error::CollaboratorError;

/// Control surface of the link cipher datapath.
///
/// The engine keys the cipher during session key exchange and drives
/// enable/disable from the authentication outcome on every poll. Those
/// calls must be idempotent. Switching transmitter-side encryption on is
/// a separate integrator decision gated on an authenticated link.
pub trait CipherControl: Send {
    /// One-time initialization.
    fn setup(&mut self) -> Result<(), CollaboratorError>;

    /// Loads the global constant lc128 shared by all HDCP 2.2 devices.
    fn set_global_constant(&mut self, lc128: &[u8; KM_SIZE]);

    /// Loads the session key.
    fn set_session_key(&mut self, ks: &[u8; KM_SIZE]);

    /// Loads the cipher initialization vector.
    fn set_iv(&mut self, riv: &[u8; NONCE_SIZE]);

    /// Runs the cipher. Idempotent.
    fn enable(&mut self);

    /// Halts the cipher. Idempotent.
    fn disable(&mut self);

    /// Starts encrypting transmitted content.
    fn enable_tx_encryption(&mut self);

    /// Stops encrypting transmitted content.
    fn disable_tx_encryption(&mut self);
}
