//! Authentication state machine vocabulary.

/// States of the transmitter authentication machine.
///
/// Exactly one state handler runs per poll. Handlers return the next
/// state; side effects attached to specific edges live in the transition
/// table, not in the handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// No attempt requested. The machine rests here until
    /// [`crate::HdcpTx::authenticate`] is called.
    Idle,
    /// Probing the receiver's HDCP2VERSION register for capability.
    Probe,
    /// Entry point of every authentication attempt; also the target of
    /// every abort edge.
    AttemptStart,
    /// Sending AKE_Init with a fresh transmitter nonce.
    AkeInit,
    /// Waiting for AKE_Send_Cert.
    AwaitCert,
    /// Waiting for H' after a full (no-stored-Km) key exchange.
    AwaitHPrimeFresh,
    /// Waiting for AKE_Send_Pairing_Info.
    AwaitPairingInfo,
    /// Waiting for H' after replaying a stored pairing.
    AwaitHPrimeStored,
    /// Opening a locality check round.
    LocalityCheck,
    /// Waiting for and verifying LC_Send_L_prime.
    LocalityVerify,
    /// Generating and delivering the session key.
    SessionKeyExchange,
    /// Letting the link cipher settle before declaring success.
    CipherArm,
    /// Authenticated steady state with periodic re-auth monitoring.
    Authenticated,
}

/// Externally visible authentication status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// No authenticated session; no attempt in flight.
    Unauthenticated,
    /// An authentication attempt is in progress.
    Busy,
    /// The link is authenticated.
    Authenticated,
    /// Probe found no HDCP 2.2 support on the receiver.
    IncompatibleReceiver,
    /// Receiver requested re-authentication; a new attempt follows.
    ReauthRequested,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Busy => "busy",
            Self::Authenticated => "authenticated",
            Self::IncompatibleReceiver => "incompatible receiver",
            Self::ReauthRequested => "reauth requested",
        };
        f.write_str(text)
    }
}
