//! Scripted receiver model behind the DDC callbacks.

use std::sync::{Arc, Mutex};

use hdcp_core::crypto::{
    compute_e_dkey_ks, compute_h_prime, compute_l_prime, kpub_dcp_modulus,
    CryptoSuite, TX_CAPS,
};
use hdcp_core::ddc::{DdcReadFn, DdcWriteFn};
use hdcp_proto::ddc::{
    REG_HDCP2_VERSION, REG_READ_MSG, REG_RXSTATUS, REG_WRITE_MSG,
};
use hdcp_proto::messages::{
    AkeInit, AkeNoStoredKm, AkeSendCert, AkeSendHPrime, AkeSendPairingInfo,
    AkeStoredKm, CertRx, LcInit, LcSendLPrime, SkeSendEks, CAPS_SIZE,
    CERT_SIGNATURE_SIZE, KM_SIZE, KPUB_RX_SIZE, NONCE_SIZE, RECEIVER_ID_SIZE,
};
use hdcp_proto::{MessageId, RxStatus};

use crate::crypto::{mock_oaep_unwrap, mock_signature, SoftCrypto};

/// Behavior knobs of the sim receiver. Defaults model a compliant,
/// responsive HDCP 2.2 sink.
#[derive(Debug, Clone, Copy)]
pub struct ReceiverBehavior {
    /// Advertise HDCP 2.2 support in the version register.
    pub hdcp2_capable: bool,
    /// Answer AKE_Init with a certificate.
    pub respond_cert: bool,
    /// Answer key exchanges with H'.
    pub respond_h_prime: bool,
    /// Stage pairing info after H' is read in the fresh path.
    pub respond_pairing_info: bool,
    /// Answer locality challenges with L'.
    pub respond_l_prime: bool,
    /// Corrupt H' before staging it.
    pub corrupt_h_prime: bool,
    /// Corrupt L' before staging it.
    pub corrupt_l_prime: bool,
    /// Raise the re-authentication request bit in RXSTATUS.
    pub request_reauth: bool,
}

impl Default for ReceiverBehavior {
    fn default() -> Self {
        Self {
            hdcp2_capable: true,
            respond_cert: true,
            respond_h_prime: true,
            respond_pairing_info: true,
            respond_l_prime: true,
            corrupt_h_prime: false,
            corrupt_l_prime: false,
            request_reauth: false,
        }
    }
}

/// Session material the receiver recovered from SKE_Send_Eks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiverSession {
    /// Recovered session key.
    pub ks: [u8; KM_SIZE],
    /// Received initialization vector.
    pub riv: [u8; NONCE_SIZE],
}

/// A one-device DDC sink that plays the receiver role of the protocol.
///
/// It reuses the engine's derivation functions with [`SoftCrypto`], so a
/// compliant run produces matching H'/L' values by construction and each
/// fault knob breaks exactly one thing.
pub struct SimReceiver {
    behavior: ReceiverBehavior,
    crypto: SoftCrypto,
    receiver_id: [u8; RECEIVER_ID_SIZE],
    kpub_rx: [u8; KPUB_RX_SIZE],
    rrx: [u8; NONCE_SIZE],
    rx_caps: [u8; CAPS_SIZE],
    reg_ptr: u8,
    staged: Vec<u8>,
    after_read: Option<Vec<u8>>,
    rtx: [u8; NONCE_SIZE],
    rn: [u8; NONCE_SIZE],
    km: [u8; KM_SIZE],
    session: Option<ReceiverSession>,
    ake_init_count: usize,
    stored_km_count: usize,
    no_stored_km_count: usize,
    lc_init_count: usize,
}

impl SimReceiver {
    /// A receiver with the given identifier and behavior. The public key
    /// is derived from the identifier so distinct receivers are distinct
    /// OAEP targets.
    pub fn new(
        receiver_id: [u8; RECEIVER_ID_SIZE],
        behavior: ReceiverBehavior,
    ) -> Self {
        let mut kpub_rx = [0u8; KPUB_RX_SIZE];
        for (i, byte) in kpub_rx.iter_mut().enumerate() {
            *byte = receiver_id[i % RECEIVER_ID_SIZE] ^ (i as u8);
        }
        Self {
            behavior,
            crypto: SoftCrypto::new(),
            receiver_id,
            kpub_rx,
            rrx: [0x3A, 0x71, 0x05, 0xC2, 0x99, 0x10, 0xEE, 0x44],
            rx_caps: [0x02, 0x00, 0x00],
            reg_ptr: 0,
            staged: Vec::new(),
            after_read: None,
            rtx: [0; NONCE_SIZE],
            rn: [0; NONCE_SIZE],
            km: [0; KM_SIZE],
            session: None,
            ake_init_count: 0,
            stored_km_count: 0,
            no_stored_km_count: 0,
            lc_init_count: 0,
        }
    }

    /// Mutable access to the behavior knobs, effective immediately.
    pub fn behavior_mut(&mut self) -> &mut ReceiverBehavior {
        &mut self.behavior
    }

    /// AKE_Init messages seen, one per transmitter attempt.
    pub fn ake_init_count(&self) -> usize {
        self.ake_init_count
    }

    /// Stored-Km replays seen.
    pub fn stored_km_count(&self) -> usize {
        self.stored_km_count
    }

    /// Full key exchanges seen.
    pub fn no_stored_km_count(&self) -> usize {
        self.no_stored_km_count
    }

    /// Locality challenges seen.
    pub fn lc_init_count(&self) -> usize {
        self.lc_init_count
    }

    /// Session material recovered from the last key exchange.
    pub fn session(&self) -> Option<ReceiverSession> {
        self.session
    }

    /// Handles a DDC write: a single byte selects a register, a payload
    /// behind the write-message register delivers a protocol message.
    pub fn handle_write(&mut self, buf: &[u8]) {
        if buf.len() == 1 {
            self.reg_ptr = buf[0];
            return;
        }
        if buf[0] == REG_WRITE_MSG {
            let wire = buf[1..].to_vec();
            self.handle_message(&wire);
        }
    }

    /// Handles a DDC read against the selected register.
    pub fn handle_read(&mut self, buf: &mut [u8]) {
        match self.reg_ptr {
            REG_HDCP2_VERSION => {
                buf[0] = if self.behavior.hdcp2_capable { 0x04 } else { 0x00 };
            }
            REG_RXSTATUS => {
                let word = self.rx_status_word().raw().to_le_bytes();
                buf[..2].copy_from_slice(&word);
            }
            REG_READ_MSG => {
                let n = buf.len().min(self.staged.len());
                buf[..n].copy_from_slice(&self.staged[..n]);
                // Reading drains the staged message; anything queued
                // behind it becomes available next.
                self.staged = self.after_read.take().unwrap_or_default();
            }
            _ => {}
        }
    }

    fn rx_status_word(&self) -> RxStatus {
        RxStatus::compose(
            self.staged.len() as u16,
            self.behavior.request_reauth,
        )
    }

    fn handle_message(&mut self, wire: &[u8]) {
        let Some(&id_byte) = wire.first() else {
            return;
        };
        let Ok(id) = MessageId::from_u8(id_byte) else {
            return;
        };
        match id {
            MessageId::AkeInit => self.on_ake_init(wire),
            MessageId::AkeNoStoredKm => self.on_no_stored_km(wire),
            MessageId::AkeStoredKm => self.on_stored_km(wire),
            MessageId::LcInit => self.on_lc_init(wire),
            MessageId::SkeSendEks => self.on_ske(wire),
            _ => {}
        }
    }

    fn on_ake_init(&mut self, wire: &[u8]) {
        let Ok(msg) = AkeInit::decode(wire) else {
            return;
        };
        self.ake_init_count += 1;
        self.rtx = msg.rtx;
        self.staged.clear();
        self.after_read = None;
        self.session = None;

        if !self.behavior.respond_cert {
            return;
        }
        let mut cert = CertRx {
            receiver_id: self.receiver_id,
            kpub_rx: self.kpub_rx,
            reserved: [0, 0],
            signature: [0; CERT_SIGNATURE_SIZE],
        };
        cert.signature =
            mock_signature(&cert.signed_portion(), kpub_dcp_modulus());
        let reply =
            AkeSendCert { cert, rrx: self.rrx, rx_caps: self.rx_caps };
        self.staged = reply.encode().to_vec();
    }

    fn on_no_stored_km(&mut self, wire: &[u8]) {
        let Ok(msg) = AkeNoStoredKm::decode(wire) else {
            return;
        };
        self.no_stored_km_count += 1;
        self.km = mock_oaep_unwrap(&self.kpub_rx, &msg.e_kpub_km);

        if !self.behavior.respond_h_prime {
            return;
        }
        self.stage_h_prime();
        if self.behavior.respond_pairing_info {
            let info = AkeSendPairingInfo { e_kh_km: self.wrap_km() };
            self.after_read = Some(info.encode().to_vec());
        }
    }

    fn on_stored_km(&mut self, wire: &[u8]) {
        let Ok(msg) = AkeStoredKm::decode(wire) else {
            return;
        };
        self.stored_km_count += 1;
        // A replay that does not match this receiver's pairing gets no
        // H', which the transmitter sees as a timeout.
        if msg.e_kh_km != self.wrap_km() {
            return;
        }
        if self.behavior.respond_h_prime {
            self.stage_h_prime();
        }
    }

    fn on_lc_init(&mut self, wire: &[u8]) {
        let Ok(msg) = LcInit::decode(wire) else {
            return;
        };
        self.lc_init_count += 1;
        self.rn = msg.rn;

        if !self.behavior.respond_l_prime {
            return;
        }
        let mut l_prime = compute_l_prime(
            &self.crypto,
            &self.rn,
            &self.km,
            &self.rrx,
            &self.rtx,
        );
        if self.behavior.corrupt_l_prime {
            l_prime[0] ^= 0xFF;
        }
        self.staged = LcSendLPrime { l_prime }.encode().to_vec();
    }

    fn on_ske(&mut self, wire: &[u8]) {
        let Ok(msg) = SkeSendEks::decode(wire) else {
            return;
        };
        // The session key mask is an xor stream, so unmasking is the
        // same computation as masking.
        let ks = compute_e_dkey_ks(
            &self.crypto,
            &self.rn,
            &self.km,
            &msg.e_dkey_ks,
            &self.rrx,
            &self.rtx,
        );
        self.session = Some(ReceiverSession { ks, riv: msg.riv });
    }

    fn stage_h_prime(&mut self) {
        let mut h_prime = compute_h_prime(
            &self.crypto,
            &self.rrx,
            &self.rx_caps,
            &self.rtx,
            &TX_CAPS,
            &self.km,
        );
        if self.behavior.corrupt_h_prime {
            h_prime[0] ^= 0xFF;
        }
        self.staged = AkeSendHPrime { h_prime }.encode().to_vec();
    }

    fn wrap_km(&self) -> [u8; KM_SIZE] {
        let mut input = Vec::with_capacity(KM_SIZE + KPUB_RX_SIZE);
        input.extend_from_slice(&self.km);
        input.extend_from_slice(&self.kpub_rx);
        let digest = self.crypto.sha256(&input);
        let mut out = [0u8; KM_SIZE];
        out.copy_from_slice(&digest[..KM_SIZE]);
        out
    }
}

/// Builds the engine's DDC callbacks over a shared receiver.
pub fn ddc_handlers(
    receiver: &Arc<Mutex<SimReceiver>>,
) -> (DdcWriteFn, DdcReadFn) {
    let rx = Arc::clone(receiver);
    let write: DdcWriteFn = Arc::new(move |_, buf, _| {
        rx.lock().unwrap().handle_write(buf);
        Ok(())
    });
    let rx = Arc::clone(receiver);
    let read: DdcReadFn = Arc::new(move |_, buf, _| {
        rx.lock().unwrap().handle_read(buf);
        Ok(())
    });
    (write, read)
}
