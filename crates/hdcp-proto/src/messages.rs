//! Authentication message layouts.
//!
//! Sizes and field order follow the HDCP 2.2 transmitter protocol. Each
//! message encodes to exactly [`MessageId::wire_size`] bytes, identifier
//! included.

use bytes::{BufMut, Bytes, BytesMut};

use crate::errors::{ProtocolError, Result};

/// Size of the rtx/rrx/rn nonces.
pub const NONCE_SIZE: usize = 8;
/// Size of the transmitter/receiver capability fields.
pub const CAPS_SIZE: usize = 3;
/// Size of the master key and derived key blocks.
pub const KM_SIZE: usize = 16;
/// Size of the RSAES-OAEP encrypted master key.
pub const E_KPUB_KM_SIZE: usize = 128;
/// Size of a SHA-256 output (H' and L').
pub const HASH_SIZE: usize = 32;
/// Size of a receiver identifier.
pub const RECEIVER_ID_SIZE: usize = 5;
/// Size of the receiver public key inside the certificate (n || e).
pub const KPUB_RX_SIZE: usize = 131;
/// Size of the DCP LLC signature over the certificate.
pub const CERT_SIGNATURE_SIZE: usize = 384;
/// Total size of the receiver certificate.
pub const CERT_RX_SIZE: usize =
    RECEIVER_ID_SIZE + KPUB_RX_SIZE + 2 + CERT_SIGNATURE_SIZE;
/// Size of the certificate prefix covered by the DCP LLC signature.
pub const CERT_SIGNED_SIZE: usize = RECEIVER_ID_SIZE + KPUB_RX_SIZE + 2;
/// Size of the OAEP masking seed.
pub const MASKING_SEED_SIZE: usize = 32;

/// Identifier byte of each wire message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageId {
    /// Transmitter opens an authentication attempt.
    AkeInit = 2,
    /// Receiver returns its certificate.
    AkeSendCert = 3,
    /// Transmitter sends a freshly encrypted master key.
    AkeNoStoredKm = 4,
    /// Transmitter replays a previously paired master key.
    AkeStoredKm = 5,
    /// Receiver proves knowledge of the master key.
    AkeSendHPrime = 7,
    /// Receiver returns pairing material for future stored-Km attempts.
    AkeSendPairingInfo = 8,
    /// Transmitter opens a locality check round.
    LcInit = 9,
    /// Receiver answers the locality challenge.
    LcSendLPrime = 10,
    /// Transmitter delivers the encrypted session key.
    SkeSendEks = 11,
}

impl MessageId {
    /// Resolves an identifier byte.
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            2 => Ok(Self::AkeInit),
            3 => Ok(Self::AkeSendCert),
            4 => Ok(Self::AkeNoStoredKm),
            5 => Ok(Self::AkeStoredKm),
            7 => Ok(Self::AkeSendHPrime),
            8 => Ok(Self::AkeSendPairingInfo),
            9 => Ok(Self::LcInit),
            10 => Ok(Self::LcSendLPrime),
            11 => Ok(Self::SkeSendEks),
            other => Err(ProtocolError::UnknownMessageId(other)),
        }
    }

    /// Fixed on-wire size of the message, identifier byte included.
    pub const fn wire_size(self) -> usize {
        match self {
            Self::AkeInit => 1 + NONCE_SIZE + CAPS_SIZE,
            Self::AkeSendCert => 1 + CERT_RX_SIZE + NONCE_SIZE + CAPS_SIZE,
            Self::AkeNoStoredKm => 1 + E_KPUB_KM_SIZE,
            Self::AkeStoredKm => 1 + KM_SIZE + NONCE_SIZE + NONCE_SIZE,
            Self::AkeSendHPrime => 1 + HASH_SIZE,
            Self::AkeSendPairingInfo => 1 + KM_SIZE,
            Self::LcInit => 1 + NONCE_SIZE,
            Self::LcSendLPrime => 1 + HASH_SIZE,
            Self::SkeSendEks => 1 + KM_SIZE + NONCE_SIZE,
        }
    }
}

/// Checks frame size and identifier, returning the body after the id byte.
fn expect_frame(buf: &[u8], id: MessageId) -> Result<&[u8]> {
    if buf.len() != id.wire_size() {
        return Err(ProtocolError::LengthMismatch {
            expected: id.wire_size(),
            actual: buf.len(),
        });
    }
    if buf[0] != id as u8 {
        return Err(ProtocolError::UnexpectedMessageId {
            expected: id as u8,
            actual: buf[0],
        });
    }
    Ok(&buf[1..])
}

fn take<const N: usize>(body: &[u8], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&body[offset..offset + N]);
    out
}

/// Receiver public key certificate, issued and signed by the DCP LLC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertRx {
    /// Receiver identifier.
    pub receiver_id: [u8; RECEIVER_ID_SIZE],
    /// Receiver RSA public key, modulus then exponent.
    pub kpub_rx: [u8; KPUB_RX_SIZE],
    /// Reserved bytes between key and signature.
    pub reserved: [u8; 2],
    /// RSASSA-PKCS1-v1_5 signature by the DCP LLC root key.
    pub signature: [u8; CERT_SIGNATURE_SIZE],
}

impl CertRx {
    /// Serializes the certificate into `buf`.
    pub fn write_to(&self, buf: &mut BytesMut) {
        buf.put_slice(&self.receiver_id);
        buf.put_slice(&self.kpub_rx);
        buf.put_slice(&self.reserved);
        buf.put_slice(&self.signature);
    }

    /// Parses a certificate from exactly [`CERT_RX_SIZE`] bytes.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        if buf.len() != CERT_RX_SIZE {
            return Err(ProtocolError::LengthMismatch {
                expected: CERT_RX_SIZE,
                actual: buf.len(),
            });
        }
        Ok(Self {
            receiver_id: take(buf, 0),
            kpub_rx: take(buf, RECEIVER_ID_SIZE),
            reserved: take(buf, RECEIVER_ID_SIZE + KPUB_RX_SIZE),
            signature: take(buf, CERT_SIGNED_SIZE),
        })
    }

    /// The leading portion covered by [`CertRx::signature`].
    pub fn signed_portion(&self) -> [u8; CERT_SIGNED_SIZE] {
        let mut out = [0u8; CERT_SIGNED_SIZE];
        out[..RECEIVER_ID_SIZE].copy_from_slice(&self.receiver_id);
        out[RECEIVER_ID_SIZE..RECEIVER_ID_SIZE + KPUB_RX_SIZE]
            .copy_from_slice(&self.kpub_rx);
        out[RECEIVER_ID_SIZE + KPUB_RX_SIZE..].copy_from_slice(&self.reserved);
        out
    }
}

/// AKE_Init: transmitter nonce and capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AkeInit {
    /// Fresh transmitter nonce.
    pub rtx: [u8; NONCE_SIZE],
    /// Transmitter capability field.
    pub tx_caps: [u8; CAPS_SIZE],
}

impl AkeInit {
    /// Encodes the full wire frame.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(MessageId::AkeInit.wire_size());
        buf.put_u8(MessageId::AkeInit as u8);
        buf.put_slice(&self.rtx);
        buf.put_slice(&self.tx_caps);
        buf.freeze()
    }

    /// Decodes a full wire frame.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let body = expect_frame(buf, MessageId::AkeInit)?;
        Ok(Self { rtx: take(body, 0), tx_caps: take(body, NONCE_SIZE) })
    }
}

/// AKE_Send_Cert: certificate, receiver nonce and capabilities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AkeSendCert {
    /// Receiver certificate.
    pub cert: CertRx,
    /// Receiver nonce.
    pub rrx: [u8; NONCE_SIZE],
    /// Receiver capability field.
    pub rx_caps: [u8; CAPS_SIZE],
}

impl AkeSendCert {
    /// Encodes the full wire frame.
    pub fn encode(&self) -> Bytes {
        let mut buf =
            BytesMut::with_capacity(MessageId::AkeSendCert.wire_size());
        buf.put_u8(MessageId::AkeSendCert as u8);
        self.cert.write_to(&mut buf);
        buf.put_slice(&self.rrx);
        buf.put_slice(&self.rx_caps);
        buf.freeze()
    }

    /// Decodes a full wire frame.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let body = expect_frame(buf, MessageId::AkeSendCert)?;
        Ok(Self {
            cert: CertRx::parse(&body[..CERT_RX_SIZE])?,
            rrx: take(body, CERT_RX_SIZE),
            rx_caps: take(body, CERT_RX_SIZE + NONCE_SIZE),
        })
    }
}

/// AKE_No_Stored_km: master key encrypted to the receiver public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AkeNoStoredKm {
    /// RSAES-OAEP ciphertext of the master key.
    pub e_kpub_km: [u8; E_KPUB_KM_SIZE],
}

impl AkeNoStoredKm {
    /// Encodes the full wire frame.
    pub fn encode(&self) -> Bytes {
        let mut buf =
            BytesMut::with_capacity(MessageId::AkeNoStoredKm.wire_size());
        buf.put_u8(MessageId::AkeNoStoredKm as u8);
        buf.put_slice(&self.e_kpub_km);
        buf.freeze()
    }

    /// Decodes a full wire frame.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let body = expect_frame(buf, MessageId::AkeNoStoredKm)?;
        Ok(Self { e_kpub_km: take(body, 0) })
    }
}

/// AKE_Stored_km: pairing material replayed from an earlier session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AkeStoredKm {
    /// Receiver-wrapped master key from the pairing exchange.
    pub e_kh_km: [u8; KM_SIZE],
    /// Transmitter nonce of the paired session.
    pub rtx: [u8; NONCE_SIZE],
    /// Receiver nonce of the paired session.
    pub rrx: [u8; NONCE_SIZE],
}

impl AkeStoredKm {
    /// Encodes the full wire frame.
    pub fn encode(&self) -> Bytes {
        let mut buf =
            BytesMut::with_capacity(MessageId::AkeStoredKm.wire_size());
        buf.put_u8(MessageId::AkeStoredKm as u8);
        buf.put_slice(&self.e_kh_km);
        buf.put_slice(&self.rtx);
        buf.put_slice(&self.rrx);
        buf.freeze()
    }

    /// Decodes a full wire frame.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let body = expect_frame(buf, MessageId::AkeStoredKm)?;
        Ok(Self {
            e_kh_km: take(body, 0),
            rtx: take(body, KM_SIZE),
            rrx: take(body, KM_SIZE + NONCE_SIZE),
        })
    }
}

/// AKE_Send_H_prime: receiver's proof of the derived key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AkeSendHPrime {
    /// SHA-256 verification value.
    pub h_prime: [u8; HASH_SIZE],
}

impl AkeSendHPrime {
    /// Encodes the full wire frame.
    pub fn encode(&self) -> Bytes {
        let mut buf =
            BytesMut::with_capacity(MessageId::AkeSendHPrime.wire_size());
        buf.put_u8(MessageId::AkeSendHPrime as u8);
        buf.put_slice(&self.h_prime);
        buf.freeze()
    }

    /// Decodes a full wire frame.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let body = expect_frame(buf, MessageId::AkeSendHPrime)?;
        Ok(Self { h_prime: take(body, 0) })
    }
}

/// AKE_Send_Pairing_Info: receiver-wrapped master key for later reuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AkeSendPairingInfo {
    /// Receiver-wrapped master key.
    pub e_kh_km: [u8; KM_SIZE],
}

impl AkeSendPairingInfo {
    /// Encodes the full wire frame.
    pub fn encode(&self) -> Bytes {
        let mut buf =
            BytesMut::with_capacity(MessageId::AkeSendPairingInfo.wire_size());
        buf.put_u8(MessageId::AkeSendPairingInfo as u8);
        buf.put_slice(&self.e_kh_km);
        buf.freeze()
    }

    /// Decodes a full wire frame.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let body = expect_frame(buf, MessageId::AkeSendPairingInfo)?;
        Ok(Self { e_kh_km: take(body, 0) })
    }
}

/// LC_Init: locality challenge nonce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LcInit {
    /// Locality check nonce.
    pub rn: [u8; NONCE_SIZE],
}

impl LcInit {
    /// Encodes the full wire frame.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(MessageId::LcInit.wire_size());
        buf.put_u8(MessageId::LcInit as u8);
        buf.put_slice(&self.rn);
        buf.freeze()
    }

    /// Decodes a full wire frame.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let body = expect_frame(buf, MessageId::LcInit)?;
        Ok(Self { rn: take(body, 0) })
    }
}

/// LC_Send_L_prime: receiver's locality response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LcSendLPrime {
    /// SHA-256 locality verification value.
    pub l_prime: [u8; HASH_SIZE],
}

impl LcSendLPrime {
    /// Encodes the full wire frame.
    pub fn encode(&self) -> Bytes {
        let mut buf =
            BytesMut::with_capacity(MessageId::LcSendLPrime.wire_size());
        buf.put_u8(MessageId::LcSendLPrime as u8);
        buf.put_slice(&self.l_prime);
        buf.freeze()
    }

    /// Decodes a full wire frame.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let body = expect_frame(buf, MessageId::LcSendLPrime)?;
        Ok(Self { l_prime: take(body, 0) })
    }
}

/// SKE_Send_Eks: encrypted session key and cipher initialization vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkeSendEks {
    /// Session key masked with the key-derivation stream.
    pub e_dkey_ks: [u8; KM_SIZE],
    /// Cipher initialization vector.
    pub riv: [u8; NONCE_SIZE],
}

impl SkeSendEks {
    /// Encodes the full wire frame.
    pub fn encode(&self) -> Bytes {
        let mut buf =
            BytesMut::with_capacity(MessageId::SkeSendEks.wire_size());
        buf.put_u8(MessageId::SkeSendEks as u8);
        buf.put_slice(&self.e_dkey_ks);
        buf.put_slice(&self.riv);
        buf.freeze()
    }

    /// Decodes a full wire frame.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let body = expect_frame(buf, MessageId::SkeSendEks)?;
        Ok(Self { e_dkey_ks: take(body, 0), riv: take(body, KM_SIZE) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_sizes_match_protocol_tables() {
        assert_eq!(MessageId::AkeInit.wire_size(), 12);
        assert_eq!(MessageId::AkeSendCert.wire_size(), 534);
        assert_eq!(MessageId::AkeNoStoredKm.wire_size(), 129);
        assert_eq!(MessageId::AkeStoredKm.wire_size(), 33);
        assert_eq!(MessageId::AkeSendHPrime.wire_size(), 33);
        assert_eq!(MessageId::AkeSendPairingInfo.wire_size(), 17);
        assert_eq!(MessageId::LcInit.wire_size(), 9);
        assert_eq!(MessageId::LcSendLPrime.wire_size(), 33);
        assert_eq!(MessageId::SkeSendEks.wire_size(), 25);
    }

    #[test]
    fn cert_round_trips_through_send_cert() {
        let cert = CertRx {
            receiver_id: [0x74, 0x5B, 0xB8, 0xBD, 0x04],
            kpub_rx: [0xAB; KPUB_RX_SIZE],
            reserved: [0, 0],
            signature: [0xCD; CERT_SIGNATURE_SIZE],
        };
        let msg = AkeSendCert {
            cert,
            rrx: [1, 2, 3, 4, 5, 6, 7, 8],
            rx_caps: [0x02, 0x00, 0x00],
        };
        let wire = msg.encode();
        assert_eq!(wire.len(), MessageId::AkeSendCert.wire_size());
        assert_eq!(AkeSendCert::decode(&wire).unwrap(), msg);
    }

    #[test]
    fn signed_portion_covers_id_key_and_reserved() {
        let cert = CertRx {
            receiver_id: [1; RECEIVER_ID_SIZE],
            kpub_rx: [2; KPUB_RX_SIZE],
            reserved: [3, 3],
            signature: [4; CERT_SIGNATURE_SIZE],
        };
        let signed = cert.signed_portion();
        assert_eq!(signed.len(), 138);
        assert_eq!(&signed[..RECEIVER_ID_SIZE], &[1; RECEIVER_ID_SIZE]);
        assert_eq!(&signed[136..], &[3, 3]);
    }

    #[test]
    fn decode_rejects_wrong_identifier() {
        let mut wire = LcInit { rn: [9; NONCE_SIZE] }.encode().to_vec();
        wire[0] = MessageId::LcSendLPrime as u8;
        assert_eq!(
            LcInit::decode(&wire),
            Err(ProtocolError::UnexpectedMessageId {
                expected: MessageId::LcInit as u8,
                actual: MessageId::LcSendLPrime as u8,
            })
        );
    }

    #[test]
    fn decode_rejects_truncated_frames() {
        let wire = AkeInit { rtx: [0; NONCE_SIZE], tx_caps: [0; CAPS_SIZE] }
            .encode();
        assert_eq!(
            AkeInit::decode(&wire[..5]),
            Err(ProtocolError::LengthMismatch { expected: 12, actual: 5 })
        );
    }

    #[test]
    fn unknown_identifier_is_reported() {
        assert_eq!(
            MessageId::from_u8(6),
            Err(ProtocolError::UnknownMessageId(6))
        );
    }
}
