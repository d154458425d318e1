//! Cryptographic seam and key derivations.
//!
//! The engine never implements primitives itself. [`CryptoSuite`] is the
//! seam the integrator fills with a hardware or software implementation;
//! the derivation functions below compose those primitives into the
//! protocol's verification values, and are shared with test doubles that
//! model the receiver side.

use hdcp_proto::messages::{
    CAPS_SIZE, E_KPUB_KM_SIZE, HASH_SIZE, KM_SIZE, KPUB_RX_SIZE,
    MASKING_SEED_SIZE, NONCE_SIZE,
};

/// Capability field the transmitter advertises in AKE_Init.
pub const TX_CAPS: [u8; CAPS_SIZE] = [0x02, 0x00, 0x00];

/// Size of the DCP LLC root modulus.
pub const KPUB_DCP_N_SIZE: usize = 384;
/// Size of the DCP LLC root exponent.
pub const KPUB_DCP_E_SIZE: usize = 1;

/// DCP LLC root public key, modulus followed by exponent. Receiver
/// certificates must verify against this key.
pub const KPUB_DCP: [u8; KPUB_DCP_N_SIZE + KPUB_DCP_E_SIZE] = [
    0xB0, 0xE9, 0xAA, 0x45, 0xF1, 0x29, 0xBA, 0x0A, 0x1C, 0xBE, 0x17, 0x57, 0x28, 0xEB, 0x2B, 0x4E,
    0x8F, 0xD0, 0xC0, 0x6A, 0xAD, 0x79, 0x98, 0x0F, 0x8D, 0x43, 0x8D, 0x47, 0x04, 0xB8, 0x2B, 0xF4,
    0x15, 0x21, 0x56, 0x19, 0x01, 0x40, 0x01, 0x3B, 0xD0, 0x91, 0x90, 0x62, 0x9E, 0x89, 0xC2, 0x27,
    0x8E, 0xCF, 0xB6, 0xDB, 0xCE, 0x3F, 0x72, 0x10, 0x50, 0x93, 0x8C, 0x23, 0x29, 0x83, 0x7B, 0x80,
    0x64, 0xA7, 0x59, 0xE8, 0x61, 0x67, 0x4C, 0xBC, 0xD8, 0x58, 0xB8, 0xF1, 0xD4, 0xF8, 0x2C, 0x37,
    0x98, 0x16, 0x26, 0x0E, 0x4E, 0xF9, 0x4E, 0xEE, 0x24, 0xDE, 0xCC, 0xD1, 0x4B, 0x4B, 0xC5, 0x06,
    0x7A, 0xFB, 0x49, 0x65, 0xE6, 0xC0, 0x00, 0x83, 0x48, 0x1E, 0x8E, 0x42, 0x2A, 0x53, 0xA0, 0xF5,
    0x37, 0x29, 0x2B, 0x5A, 0xF9, 0x73, 0xC5, 0x9A, 0xA1, 0xB5, 0xB5, 0x74, 0x7C, 0x06, 0xDC, 0x7B,
    0x7C, 0xDC, 0x6C, 0x6E, 0x82, 0x6B, 0x49, 0x88, 0xD4, 0x1B, 0x25, 0xE0, 0xEE, 0xD1, 0x79, 0xBD,
    0x39, 0x85, 0xFA, 0x4F, 0x25, 0xEC, 0x70, 0x19, 0x23, 0xC1, 0xB9, 0xA6, 0xD9, 0x7E, 0x3E, 0xDA,
    0x48, 0xA9, 0x58, 0xE3, 0x18, 0x14, 0x1E, 0x9F, 0x30, 0x7F, 0x4C, 0xA8, 0xAE, 0x53, 0x22, 0x66,
    0x2B, 0xBE, 0x24, 0xCB, 0x47, 0x66, 0xFC, 0x83, 0xCF, 0x5C, 0x2D, 0x1E, 0x3A, 0xAB, 0xAB, 0x06,
    0xBE, 0x05, 0xAA, 0x1A, 0x9B, 0x2D, 0xB7, 0xA6, 0x54, 0xF3, 0x63, 0x2B, 0x97, 0xBF, 0x93, 0xBE,
    0xC1, 0xAF, 0x21, 0x39, 0x49, 0x0C, 0xE9, 0x31, 0x90, 0xCC, 0xC2, 0xBB, 0x3C, 0x02, 0xC4, 0xE2,
    0xBD, 0xBD, 0x2F, 0x84, 0x63, 0x9B, 0xD2, 0xDD, 0x78, 0x3E, 0x90, 0xC6, 0xC5, 0xAC, 0x16, 0x77,
    0x2E, 0x69, 0x6C, 0x77, 0xFD, 0xED, 0x8A, 0x4D, 0x6A, 0x8C, 0xA3, 0xA9, 0x25, 0x6C, 0x21, 0xFD,
    0xB2, 0x94, 0x0C, 0x84, 0xAA, 0x07, 0x29, 0x26, 0x46, 0xF7, 0x9B, 0x3A, 0x19, 0x87, 0xE0, 0x9F,
    0xEB, 0x30, 0xA8, 0xF5, 0x64, 0xEB, 0x07, 0xF1, 0xE9, 0xDB, 0xF9, 0xAF, 0x2C, 0x8B, 0x69, 0x7E,
    0x2E, 0x67, 0x39, 0x3F, 0xF3, 0xA6, 0xE5, 0xCD, 0xDA, 0x24, 0x9B, 0xA2, 0x78, 0x72, 0xF0, 0xA2,
    0x27, 0xC3, 0xE0, 0x25, 0xB4, 0xA1, 0x04, 0x6A, 0x59, 0x80, 0x27, 0xB5, 0xDA, 0xB4, 0xB4, 0x53,
    0x97, 0x3B, 0x28, 0x99, 0xAC, 0xF4, 0x96, 0x27, 0x0F, 0x7F, 0x30, 0x0C, 0x4A, 0xAF, 0xCB, 0x9E,
    0xD8, 0x71, 0x28, 0x24, 0x3E, 0xBC, 0x35, 0x15, 0xBE, 0x13, 0xEB, 0xAF, 0x43, 0x01, 0xBD, 0x61,
    0x24, 0x54, 0x34, 0x9F, 0x73, 0x3E, 0xB5, 0x10, 0x9F, 0xC9, 0xFC, 0x80, 0xE8, 0x4D, 0xE3, 0x32,
    0x96, 0x8F, 0x88, 0x10, 0x23, 0x25, 0xF3, 0xD3, 0x3E, 0x6E, 0x6D, 0xBB, 0xDC, 0x29, 0x66, 0xEB,
    0x03,
];

/// Modulus half of [`KPUB_DCP`].
pub fn kpub_dcp_modulus() -> &'static [u8] {
    &KPUB_DCP[..KPUB_DCP_N_SIZE]
}

/// Exponent half of [`KPUB_DCP`].
pub fn kpub_dcp_exponent() -> &'static [u8] {
    &KPUB_DCP[KPUB_DCP_N_SIZE..]
}

/// Cryptographic primitives the engine relies on.
///
/// Implementations may be hardware offloads or software; the engine only
/// requires determinism for a given input.
pub trait CryptoSuite: Send {
    /// SHA-256 digest of `data`.
    fn sha256(&self, data: &[u8]) -> [u8; HASH_SIZE];

    /// AES-128 ECB encryption of a single block.
    fn aes128_encrypt(
        &self,
        key: &[u8; KM_SIZE],
        block: &[u8; KM_SIZE],
    ) -> [u8; KM_SIZE];

    /// RSASSA-PKCS1-v1_5 signature verification with SHA-256.
    fn rsa_verify(
        &self,
        message: &[u8],
        signature: &[u8],
        modulus: &[u8],
        exponent: &[u8],
    ) -> bool;

    /// RSAES-OAEP encryption of the master key to the receiver key.
    fn rsa_oaep_encrypt(
        &self,
        kpub_rx: &[u8; KPUB_RX_SIZE],
        plaintext: &[u8; KM_SIZE],
        masking_seed: &[u8; MASKING_SEED_SIZE],
    ) -> [u8; E_KPUB_KM_SIZE];
}

/// Derives the 32-byte key-derivation value kd from the master key and
/// the session nonces.
///
/// kd = AES-128(km, rtx || rrx) || AES-128(km, rtx || rrx ^ 1), where the
/// xor touches only the last byte of rrx.
pub fn derive_kd(
    crypto: &dyn CryptoSuite,
    km: &[u8; KM_SIZE],
    rtx: &[u8; NONCE_SIZE],
    rrx: &[u8; NONCE_SIZE],
) -> [u8; 2 * KM_SIZE] {
    let mut block = [0u8; KM_SIZE];
    block[..NONCE_SIZE].copy_from_slice(rtx);
    block[NONCE_SIZE..].copy_from_slice(rrx);
    let dkey0 = crypto.aes128_encrypt(km, &block);

    block[KM_SIZE - 1] ^= 0x01;
    let dkey1 = crypto.aes128_encrypt(km, &block);

    let mut kd = [0u8; 2 * KM_SIZE];
    kd[..KM_SIZE].copy_from_slice(&dkey0);
    kd[KM_SIZE..].copy_from_slice(&dkey1);
    kd
}

/// H' = SHA-256(kd || rtx || rx_caps || tx_caps).
pub fn compute_h_prime(
    crypto: &dyn CryptoSuite,
    rrx: &[u8; NONCE_SIZE],
    rx_caps: &[u8; CAPS_SIZE],
    rtx: &[u8; NONCE_SIZE],
    tx_caps: &[u8; CAPS_SIZE],
    km: &[u8; KM_SIZE],
) -> [u8; HASH_SIZE] {
    let kd = derive_kd(crypto, km, rtx, rrx);
    let mut input = Vec::with_capacity(kd.len() + NONCE_SIZE + 2 * CAPS_SIZE);
    input.extend_from_slice(&kd);
    input.extend_from_slice(rtx);
    input.extend_from_slice(rx_caps);
    input.extend_from_slice(tx_caps);
    crypto.sha256(&input)
}

/// L' = SHA-256(kd || rn || rrx || rtx).
pub fn compute_l_prime(
    crypto: &dyn CryptoSuite,
    rn: &[u8; NONCE_SIZE],
    km: &[u8; KM_SIZE],
    rrx: &[u8; NONCE_SIZE],
    rtx: &[u8; NONCE_SIZE],
) -> [u8; HASH_SIZE] {
    let kd = derive_kd(crypto, km, rtx, rrx);
    let mut input = Vec::with_capacity(kd.len() + 3 * NONCE_SIZE);
    input.extend_from_slice(&kd);
    input.extend_from_slice(rn);
    input.extend_from_slice(rrx);
    input.extend_from_slice(rtx);
    crypto.sha256(&input)
}

/// Masks the session key for SKE_Send_Eks.
///
/// EdkeyKs = ks ^ AES-128(km, rn || rrx ^ rtx); the mask block carries rn
/// in its upper half and the xor of the session nonces in its lower half.
pub fn compute_e_dkey_ks(
    crypto: &dyn CryptoSuite,
    rn: &[u8; NONCE_SIZE],
    km: &[u8; KM_SIZE],
    ks: &[u8; KM_SIZE],
    rrx: &[u8; NONCE_SIZE],
    rtx: &[u8; NONCE_SIZE],
) -> [u8; KM_SIZE] {
    let mut block = [0u8; KM_SIZE];
    block[..NONCE_SIZE].copy_from_slice(rn);
    for i in 0..NONCE_SIZE {
        block[NONCE_SIZE + i] = rrx[i] ^ rtx[i];
    }
    let mask = crypto.aes128_encrypt(km, &block);

    let mut out = [0u8; KM_SIZE];
    for i in 0..KM_SIZE {
        out[i] = ks[i] ^ mask[i];
    }
    out
}
