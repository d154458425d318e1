//! The transmitter authentication engine.

use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use hdcp_proto::ddc::{
    DDC_DEVICE_ADDRESS, HDCP2_CAPABLE_MASK, REG_HDCP2_VERSION, REG_READ_MSG,
    REG_WRITE_MSG,
};
use hdcp_proto::messages::{
    AkeInit, AkeNoStoredKm, AkeSendCert, AkeSendHPrime, AkeSendPairingInfo,
    AkeStoredKm, LcInit, LcSendLPrime, SkeSendEks, KM_SIZE, MASKING_SEED_SIZE,
    NONCE_SIZE,
};
use hdcp_proto::MessageId;

use crate::cipher::CipherControl;
use crate::crypto::{
    compute_e_dkey_ks, compute_h_prime, compute_l_prime, kpub_dcp_exponent,
    kpub_dcp_modulus, CryptoSuite, TX_CAPS,
};
use crate::ddc::{
    read_rx_status, AuthenticatedFn, Callbacks, DdcReadFn, DdcWriteFn,
    TransportFault,
};
use crate::error::{AttemptFailure, InitError, TxError};
use crate::pairing::{PairingCache, PairingEntry, ReceiverId};
use crate::session::{SessionInfo, MAX_LOCALITY_CHECKS};
use crate::state::{State, Status};
use crate::timer::{TimeoutReason, TimerDevice, TimerShared, TimerSignal};
use crate::transitions::TransitionTable;

/// Deadline for AKE_Send_Cert after AKE_Init.
const CERT_TIMEOUT_MS: u32 = 100;
/// Deadline for H' after a full key exchange.
const H_PRIME_FRESH_TIMEOUT_MS: u32 = 1000;
/// Deadline for H' after replaying a stored pairing.
const H_PRIME_STORED_TIMEOUT_MS: u32 = 200;
/// Deadline for AKE_Send_Pairing_Info after H'.
const PAIRING_INFO_TIMEOUT_MS: u32 = 200;
/// Deadline for LC_Send_L_prime within one locality round.
const L_PRIME_TIMEOUT_MS: u32 = 20;
/// Settle delay between keying the cipher and declaring success.
const CIPHER_SETTLE_MS: u32 = 200;
/// Interval of the re-authentication check while authenticated.
const REAUTH_CHECK_INTERVAL_MS: u32 = 1000;

/// Collaborators and tuning handed to [`HdcpTx::initialize`].
pub struct TxConfig {
    /// Cryptographic primitives.
    pub crypto: Box<dyn CryptoSuite>,
    /// Nonce and key entropy.
    pub rng: Box<dyn crate::rng::RandomSource>,
    /// Hardware countdown timer.
    pub timer: Box<dyn TimerDevice>,
    /// Link cipher datapath.
    pub cipher: Box<dyn CipherControl>,
    /// Early-poll divisor for message waits; 0 waits for timer expiry.
    pub polling_value: u32,
}

/// The HDCP 2.2 transmitter authentication engine.
///
/// Drive it by calling [`HdcpTx::poll`] from the integrator's main loop.
/// Each poll runs exactly one state-handler step and returns the current
/// [`Status`]; the engine never blocks and performs IO only through the
/// installed seams.
pub struct HdcpTx {
    crypto: Box<dyn CryptoSuite>,
    rng: Box<dyn crate::rng::RandomSource>,
    timer: Box<dyn TimerDevice>,
    cipher: Box<dyn CipherControl>,
    callbacks: Callbacks,
    shared: Arc<TimerShared>,
    info: SessionInfo,
    timer_reason: TimeoutReason,
    timer_initial_ms: u32,
    pairing: PairingCache,
    transitions: TransitionTable,
}

impl HdcpTx {
    /// Wires up the engine and runs one-time setup on each collaborator.
    ///
    /// The engine starts disabled in [`State::Idle`] with an empty
    /// pairing cache. DDC handlers are installed separately because they
    /// commonly close over resources built after the engine itself.
    pub fn initialize(config: TxConfig) -> Result<Self, InitError> {
        let TxConfig { crypto, mut rng, mut timer, mut cipher, polling_value } =
            config;
        timer.setup().map_err(InitError::Timer)?;
        rng.setup().map_err(InitError::Random)?;
        cipher.setup().map_err(InitError::Cipher)?;

        Ok(Self {
            crypto,
            rng,
            timer,
            cipher,
            callbacks: Callbacks::default(),
            shared: TimerShared::new(),
            info: SessionInfo::new(polling_value),
            timer_reason: TimeoutReason::None,
            timer_initial_ms: 0,
            pairing: PairingCache::new(),
            transitions: TransitionTable::new(),
        })
    }

    /// Installs the DDC write handler.
    pub fn set_ddc_write(&mut self, handler: DdcWriteFn) {
        self.callbacks.ddc_write = Some(handler);
    }

    /// Installs the DDC read handler.
    pub fn set_ddc_read(&mut self, handler: DdcReadFn) {
        self.callbacks.ddc_read = Some(handler);
    }

    /// Installs the notification fired on each edge into the
    /// authenticated state.
    pub fn set_authenticated_callback(&mut self, handler: AuthenticatedFn) {
        self.callbacks.authenticated = Some(handler);
    }

    /// Builds the handle the integrator fires from the timer expiry
    /// context. Available once both DDC handlers are installed.
    pub fn timer_signal(&self) -> Option<TimerSignal> {
        let write = self.callbacks.ddc_write.clone()?;
        let read = self.callbacks.ddc_read.clone()?;
        Some(TimerSignal::new(Arc::clone(&self.shared), write, read))
    }

    /// Loads the global constant lc128 into the cipher datapath.
    pub fn load_global_constant(&mut self, lc128: &[u8; KM_SIZE]) {
        self.cipher.set_global_constant(lc128);
    }

    /// Permits the state machine to run.
    pub fn enable(&mut self) {
        info!("state machine enabled");
        self.info.enabled = true;
        self.shared.set_enabled(true);
        self.timer.stop();
    }

    /// Freezes the state machine; subsequent polls are no-ops.
    pub fn disable(&mut self) {
        info!("state machine disabled");
        self.info.enabled = false;
        self.shared.set_enabled(false);
    }

    /// Requests a fresh authentication attempt.
    pub fn authenticate(&mut self) -> Result<(), TxError> {
        if !self.info.enabled {
            return Err(TxError::NotEnabled);
        }
        info!("authentication requested");
        self.info.receiver_hdcp2_capable = false;
        self.info.status = Status::Busy;
        self.info.current_state = State::Idle;
        Ok(())
    }

    /// Returns the engine to idle, tearing down any session.
    pub fn reset(&mut self) {
        debug!("state machine reset");
        self.info.current_state = State::Idle;
        self.info.previous_state = State::Idle;
        self.info.status = Status::Unauthenticated;
        self.info.msg_available = false;
        self.info.reauth_requested = false;
        self.timer_reason = TimeoutReason::None;
        self.timer.stop();
        self.shared.set_expired(true);
        self.cipher.disable_tx_encryption();
        self.info.encryption_enabled = false;
        self.cipher.disable();
    }

    /// Starts encrypting transmitted content. Requires an authenticated
    /// link.
    pub fn enable_encryption(&mut self) -> Result<(), TxError> {
        if !self.is_authenticated() {
            return Err(TxError::NotAuthenticated);
        }
        info!("link encryption enabled");
        self.cipher.enable_tx_encryption();
        self.info.encryption_enabled = true;
        Ok(())
    }

    /// Stops encrypting transmitted content.
    pub fn disable_encryption(&mut self) {
        self.cipher.disable_tx_encryption();
        self.info.encryption_enabled = false;
    }

    /// Sets the early-poll divisor for message waits. With a nonzero
    /// value `n`, the engine starts polling RXSTATUS once the remaining
    /// wait drops below `1/n` of the armed duration; 0 defers entirely
    /// to timer expiry.
    pub fn set_message_polling_value(&mut self, value: u32) {
        self.info.polling_value = value;
    }

    /// Current externally visible status.
    pub fn status(&self) -> Status {
        self.info.status
    }

    /// State whose handler runs on the next poll.
    pub fn current_state(&self) -> State {
        self.info.current_state
    }

    /// Whether the state machine is enabled.
    pub fn is_enabled(&self) -> bool {
        self.info.enabled
    }

    /// Whether the last probe found HDCP 2.2 support on the receiver.
    pub fn is_receiver_capable(&self) -> bool {
        self.info.receiver_hdcp2_capable
    }

    /// Whether the link is authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.info.status == Status::Authenticated
    }

    /// Whether an authentication attempt is in flight.
    pub fn is_in_progress(&self) -> bool {
        self.info.status == Status::Busy
    }

    /// Whether transmitted content is currently being encrypted.
    pub fn is_encryption_enabled(&self) -> bool {
        self.info.encryption_enabled
    }

    /// Runs one state-handler step.
    ///
    /// A no-op while disabled. Otherwise: execute the current state's
    /// handler, apply the side effect registered for the taken edge,
    /// advance the state, and reconcile the cipher with the outcome.
    pub fn poll(&mut self) -> Status {
        if !self.info.enabled {
            return self.info.status;
        }

        let prev_status = self.info.status;
        let from = self.info.current_state;
        let next = self.step();

        if let Some(action) = self.transitions.lookup(from, next) {
            action(&mut self.info);
        }
        self.info.previous_state = from;
        self.info.current_state = next;
        if next != from {
            trace!(?from, to = ?next, "state transition");
        }

        let status = self.info.status;
        if status != prev_status && status != Status::Busy {
            info!(%status, "authentication status changed");
        }
        if prev_status != Status::Authenticated
            && status == Status::Authenticated
        {
            if let Some(notify) = self.callbacks.authenticated.clone() {
                notify();
            }
        }

        if status == Status::Authenticated {
            self.cipher.enable();
        } else {
            self.cipher.disable();
        }
        status
    }

    fn step(&mut self) -> State {
        match self.info.current_state {
            State::Idle => self.state_idle(),
            State::Probe => self.state_probe(),
            State::AttemptStart => self.state_attempt_start(),
            State::AkeInit => self.state_ake_init(),
            State::AwaitCert => self.state_await_cert(),
            State::AwaitHPrimeFresh => self.state_await_h_prime_fresh(),
            State::AwaitPairingInfo => self.state_await_pairing_info(),
            State::AwaitHPrimeStored => self.state_await_h_prime_stored(),
            State::LocalityCheck => self.state_locality_check(),
            State::LocalityVerify => self.state_locality_verify(),
            State::SessionKeyExchange => self.state_session_key_exchange(),
            State::CipherArm => self.state_cipher_arm(),
            State::Authenticated => self.state_authenticated(),
        }
    }

    fn state_idle(&mut self) -> State {
        if self.info.status == Status::Busy {
            State::Probe
        } else {
            State::Idle
        }
    }

    fn state_probe(&mut self) -> State {
        // Rests here after an incompatible probe until the integrator
        // requests a new attempt.
        if self.info.status != Status::Busy {
            return State::Probe;
        }
        self.info.receiver_hdcp2_capable = false;

        let write = self.callbacks.ddc_write();
        let read = self.callbacks.ddc_read();
        let mut version = [0u8; 1];
        let probed = write(DDC_DEVICE_ADDRESS, &[REG_HDCP2_VERSION], false)
            .and_then(|_| read(DDC_DEVICE_ADDRESS, &mut version, true))
            .is_ok();

        if probed && version[0] & HDCP2_CAPABLE_MASK != 0 {
            debug!("receiver supports hdcp 2.2");
            self.info.receiver_hdcp2_capable = true;
            return State::AttemptStart;
        }
        self.info.status = Status::IncompatibleReceiver;
        State::Probe
    }

    fn state_attempt_start(&mut self) -> State {
        if !self.info.enabled {
            return State::Probe;
        }
        self.info.status = Status::Busy;
        self.shared.set_expired(true);
        self.timer_reason = TimeoutReason::None;
        self.info.msg_available = false;
        State::AkeInit
    }

    fn state_ake_init(&mut self) -> State {
        self.rng.fill(&mut self.info.rtx);
        let msg = AkeInit { rtx: self.info.rtx, tx_caps: TX_CAPS };
        if self.send_message(&msg.encode()).is_err() {
            return self.abort(AttemptFailure::TransportFailure);
        }
        self.start_phase_timer(CERT_TIMEOUT_MS, TimeoutReason::AkeSendCert);
        State::AwaitCert
    }

    fn state_await_cert(&mut self) -> State {
        if self
            .wait_for_receiver(MessageId::AkeSendCert.wire_size())
            .is_err()
        {
            return self.abort(AttemptFailure::TransportTimeout);
        }
        if !self.info.msg_available {
            return State::AwaitCert;
        }
        let raw = match self.receive_message(MessageId::AkeSendCert) {
            Ok(raw) => raw,
            Err(failure) => return self.abort(failure),
        };
        let msg = match AkeSendCert::decode(&raw) {
            Ok(msg) => msg,
            Err(_) => return self.abort(AttemptFailure::MalformedMessage),
        };
        self.info.rrx = msg.rrx;
        let id = ReceiverId(msg.cert.receiver_id);

        if let Some(entry) = self.pairing.lookup(id).copied() {
            debug!(receiver_id = ?id, "pairing hit, replaying stored km");
            let stored = AkeStoredKm {
                e_kh_km: entry.e_kh_km,
                rtx: entry.rtx,
                rrx: entry.rrx,
            };
            if self.send_message(&stored.encode()).is_err() {
                return self.abort(AttemptFailure::TransportFailure);
            }
            self.info.pairing_key = Some(id);
            self.start_phase_timer(
                H_PRIME_STORED_TIMEOUT_MS,
                TimeoutReason::AkeSendHPrime,
            );
            return State::AwaitHPrimeStored;
        }

        debug!(receiver_id = ?id, "no pairing, full key exchange");
        let signed = msg.cert.signed_portion();
        if !self.crypto.rsa_verify(
            &signed,
            &msg.cert.signature,
            kpub_dcp_modulus(),
            kpub_dcp_exponent(),
        ) {
            return self.abort(AttemptFailure::SignatureInvalid);
        }

        let mut entry = PairingEntry {
            receiver_id: id,
            rtx: self.info.rtx,
            rrx: self.info.rrx,
            rx_caps: msg.rx_caps,
            km: [0; KM_SIZE],
            e_kh_km: [0; KM_SIZE],
        };
        self.rng.fill(&mut entry.km);
        let mut seed = [0u8; MASKING_SEED_SIZE];
        self.rng.fill(&mut seed);
        let e_kpub_km =
            self.crypto.rsa_oaep_encrypt(&msg.cert.kpub_rx, &entry.km, &seed);
        self.pairing.upsert(entry);
        self.info.pairing_key = Some(id);

        let no_stored = AkeNoStoredKm { e_kpub_km };
        if self.send_message(&no_stored.encode()).is_err() {
            return self.abort(AttemptFailure::TransportFailure);
        }
        self.start_phase_timer(
            H_PRIME_FRESH_TIMEOUT_MS,
            TimeoutReason::AkeSendHPrime,
        );
        State::AwaitHPrimeFresh
    }

    fn state_await_h_prime_fresh(&mut self) -> State {
        if self
            .wait_for_receiver(MessageId::AkeSendHPrime.wire_size())
            .is_err()
        {
            self.invalidate_current_pairing();
            return self.abort(AttemptFailure::TransportTimeout);
        }
        if !self.info.msg_available {
            return State::AwaitHPrimeFresh;
        }
        let raw = match self.receive_message(MessageId::AkeSendHPrime) {
            Ok(raw) => raw,
            Err(failure) => {
                self.invalidate_current_pairing();
                return self.abort(failure);
            }
        };
        let msg = match AkeSendHPrime::decode(&raw) {
            Ok(msg) => msg,
            Err(_) => {
                self.invalidate_current_pairing();
                return self.abort(AttemptFailure::MalformedMessage);
            }
        };
        let Some(entry) = self.current_pairing() else {
            return self.abort(AttemptFailure::MalformedMessage);
        };

        let expected = compute_h_prime(
            self.crypto.as_ref(),
            &entry.rrx,
            &entry.rx_caps,
            &entry.rtx,
            &TX_CAPS,
            &entry.km,
        );
        if msg.h_prime != expected {
            self.invalidate_current_pairing();
            return self.abort(AttemptFailure::HPrimeMismatch);
        }
        self.start_phase_timer(
            PAIRING_INFO_TIMEOUT_MS,
            TimeoutReason::AkeSendPairingInfo,
        );
        State::AwaitPairingInfo
    }

    fn state_await_pairing_info(&mut self) -> State {
        if self
            .wait_for_receiver(MessageId::AkeSendPairingInfo.wire_size())
            .is_err()
        {
            self.invalidate_current_pairing();
            return self.abort(AttemptFailure::TransportTimeout);
        }
        if !self.info.msg_available {
            return State::AwaitPairingInfo;
        }
        let raw = match self.receive_message(MessageId::AkeSendPairingInfo) {
            Ok(raw) => raw,
            Err(failure) => {
                self.invalidate_current_pairing();
                return self.abort(failure);
            }
        };
        let msg = match AkeSendPairingInfo::decode(&raw) {
            Ok(msg) => msg,
            Err(_) => {
                self.invalidate_current_pairing();
                return self.abort(AttemptFailure::MalformedMessage);
            }
        };
        let Some(mut entry) = self.current_pairing() else {
            return self.abort(AttemptFailure::MalformedMessage);
        };
        entry.e_kh_km = msg.e_kh_km;
        self.pairing.upsert(entry);
        debug!("pairing stored");
        State::LocalityCheck
    }

    fn state_await_h_prime_stored(&mut self) -> State {
        if self
            .wait_for_receiver(MessageId::AkeSendHPrime.wire_size())
            .is_err()
        {
            return self.abort(AttemptFailure::TransportTimeout);
        }
        if !self.info.msg_available {
            return State::AwaitHPrimeStored;
        }
        let raw = match self.receive_message(MessageId::AkeSendHPrime) {
            Ok(raw) => raw,
            Err(failure) => return self.abort(failure),
        };
        let msg = match AkeSendHPrime::decode(&raw) {
            Ok(msg) => msg,
            Err(_) => return self.abort(AttemptFailure::MalformedMessage),
        };
        let Some(entry) = self.current_pairing() else {
            return self.abort(AttemptFailure::MalformedMessage);
        };

        // Current-session nonces, cached capabilities and master key.
        let expected = compute_h_prime(
            self.crypto.as_ref(),
            &self.info.rrx,
            &entry.rx_caps,
            &self.info.rtx,
            &TX_CAPS,
            &entry.km,
        );
        if msg.h_prime != expected {
            // The stored pairing no longer matches the receiver; drop it
            // so the next attempt falls back to a full key exchange.
            self.invalidate_current_pairing();
            return self.abort(AttemptFailure::HPrimeMismatch);
        }
        State::LocalityCheck
    }

    fn state_locality_check(&mut self) -> State {
        self.info.locality_check_count += 1;
        if self.info.locality_check_count > MAX_LOCALITY_CHECKS {
            return self.abort(AttemptFailure::RetryCeilingExceeded);
        }
        trace!(round = self.info.locality_check_count, "locality check");

        self.rng.fill(&mut self.info.rn);
        let msg = LcInit { rn: self.info.rn };
        if self.send_message(&msg.encode()).is_err() {
            return self.abort(AttemptFailure::TransportFailure);
        }
        self.start_phase_timer(
            L_PRIME_TIMEOUT_MS,
            TimeoutReason::LcSendLPrime,
        );
        State::LocalityVerify
    }

    fn state_locality_verify(&mut self) -> State {
        // Locality failures retry the round instead of aborting the
        // attempt; the ceiling in the check state bounds them.
        if self
            .wait_for_receiver(MessageId::LcSendLPrime.wire_size())
            .is_err()
        {
            return State::LocalityCheck;
        }
        if !self.info.msg_available {
            return State::LocalityVerify;
        }
        let raw = match self.receive_message(MessageId::LcSendLPrime) {
            Ok(raw) => raw,
            Err(_) => return State::LocalityCheck,
        };
        let msg = match LcSendLPrime::decode(&raw) {
            Ok(msg) => msg,
            Err(_) => return State::LocalityCheck,
        };
        let Some(entry) = self.current_pairing() else {
            return self.abort(AttemptFailure::MalformedMessage);
        };

        let expected = compute_l_prime(
            self.crypto.as_ref(),
            &self.info.rn,
            &entry.km,
            &self.info.rrx,
            &self.info.rtx,
        );
        if msg.l_prime != expected {
            trace!(
                failure = %AttemptFailure::LPrimeMismatch,
                round = self.info.locality_check_count,
                "locality round failed, retrying"
            );
            return State::LocalityCheck;
        }
        debug!(
            rounds = self.info.locality_check_count,
            "locality established"
        );
        State::SessionKeyExchange
    }

    fn state_session_key_exchange(&mut self) -> State {
        let Some(entry) = self.current_pairing() else {
            return self.abort(AttemptFailure::MalformedMessage);
        };

        let mut riv = [0u8; NONCE_SIZE];
        self.rng.fill(&mut riv);
        let mut ks = [0u8; KM_SIZE];
        self.rng.fill(&mut ks);
        self.cipher.set_iv(&riv);
        self.cipher.set_session_key(&ks);

        let e_dkey_ks = compute_e_dkey_ks(
            self.crypto.as_ref(),
            &self.info.rn,
            &entry.km,
            &ks,
            &self.info.rrx,
            &self.info.rtx,
        );
        let msg = SkeSendEks { e_dkey_ks, riv };
        if self.send_message(&msg.encode()).is_err() {
            return self.abort(AttemptFailure::TransportFailure);
        }
        debug!("session key delivered");
        State::CipherArm
    }

    fn state_cipher_arm(&mut self) -> State {
        self.start_phase_timer(CIPHER_SETTLE_MS, TimeoutReason::CipherSettle);
        State::Authenticated
    }

    fn state_authenticated(&mut self) -> State {
        if !self.shared.is_expired() {
            return State::Authenticated;
        }
        match self.timer_reason {
            TimeoutReason::CipherSettle => {
                self.info.status = Status::Authenticated;
                self.info.reauth_requested = false;
                self.start_phase_timer(
                    REAUTH_CHECK_INTERVAL_MS,
                    TimeoutReason::ReauthCheck,
                );
                State::Authenticated
            }
            TimeoutReason::ReauthCheck => {
                self.refresh_rx_status();
                if self.shared.rx_status().reauth_requested() {
                    info!("receiver requested re-authentication");
                    self.info.reauth_requested = true;
                    self.info.status = Status::ReauthRequested;
                    return State::AttemptStart;
                }
                self.start_phase_timer(
                    REAUTH_CHECK_INTERVAL_MS,
                    TimeoutReason::ReauthCheck,
                );
                State::Authenticated
            }
            _ => State::Authenticated,
        }
    }

    /// Tracks an in-flight message wait.
    ///
    /// Before expiry: with early polling enabled and the wait inside its
    /// final window, refresh RXSTATUS and short-circuit the timer when
    /// the expected size shows up. At expiry: the message is either
    /// there or the wait has failed.
    fn wait_for_receiver(
        &mut self,
        expected_size: usize,
    ) -> Result<(), AttemptFailure> {
        if !self.shared.is_expired() {
            if self.info.polling_value == 0 {
                return Ok(());
            }
            let window = self.timer_initial_ms / self.info.polling_value;
            if self.timer.remaining_ms() <= window {
                self.refresh_rx_status();
                if self.shared.rx_status().available_bytes() == expected_size
                {
                    self.timer.stop();
                    self.shared.set_expired(true);
                    self.info.msg_available = true;
                }
            }
            return Ok(());
        }
        if self.shared.rx_status().available_bytes() == expected_size {
            self.info.msg_available = true;
            return Ok(());
        }
        Err(AttemptFailure::TransportTimeout)
    }

    /// Drains the staged message after checking RXSTATUS agrees on its
    /// size, and verifies the leading identifier.
    fn receive_message(
        &mut self,
        id: MessageId,
    ) -> Result<Vec<u8>, AttemptFailure> {
        let expected = id.wire_size();
        if self.shared.rx_status().available_bytes() != expected {
            return Err(AttemptFailure::MalformedMessage);
        }
        let write = self.callbacks.ddc_write();
        let read = self.callbacks.ddc_read();
        write(DDC_DEVICE_ADDRESS, &[REG_READ_MSG], false)
            .map_err(|_| AttemptFailure::TransportFailure)?;
        let mut buf = vec![0u8; expected];
        read(DDC_DEVICE_ADDRESS, &mut buf, true)
            .map_err(|_| AttemptFailure::TransportFailure)?;
        if buf[0] != id as u8 {
            return Err(AttemptFailure::MalformedMessage);
        }
        trace!(?id, size = expected, "message received");
        Ok(buf)
    }

    /// Delivers one encoded message behind the write-message register.
    fn send_message(&mut self, frame: &[u8]) -> Result<(), TransportFault> {
        let mut buf = Vec::with_capacity(frame.len() + 1);
        buf.push(REG_WRITE_MSG);
        buf.extend_from_slice(frame);
        let write = self.callbacks.ddc_write();
        write(DDC_DEVICE_ADDRESS, &buf, true)?;
        trace!(id = frame[0], size = frame.len(), "message sent");
        Ok(())
    }

    fn start_phase_timer(&mut self, duration_ms: u32, reason: TimeoutReason) {
        self.shared.set_expired(false);
        self.timer_reason = reason;
        self.timer_initial_ms = duration_ms;
        if reason.awaits_message() {
            self.info.msg_available = false;
        }
        trace!(?reason, duration_ms, "timer armed");
        self.timer.start(duration_ms);
    }

    fn refresh_rx_status(&self) {
        let write = self.callbacks.ddc_write();
        let read = self.callbacks.ddc_read();
        read_rx_status(&self.shared, &write, &read);
    }

    fn current_pairing(&self) -> Option<PairingEntry> {
        self.info.pairing_key.and_then(|id| self.pairing.lookup(id)).copied()
    }

    fn invalidate_current_pairing(&mut self) {
        if let Some(id) = self.info.pairing_key {
            self.pairing.invalidate(id);
        }
    }

    fn abort(&mut self, failure: AttemptFailure) -> State {
        warn!(%failure, "authentication attempt abandoned");
        State::AttemptStart
    }
}
