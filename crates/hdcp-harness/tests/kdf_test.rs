//! Key-derivation reference checks.
//!
//! Each derivation is recomputed here from bare primitives, independently
//! of the composition code in `hdcp_core::crypto`, and compared.

use aes::cipher::{BlockEncrypt, KeyInit};
use aes::Aes128;
use sha2::{Digest, Sha256};

use hdcp_core::crypto::{
    compute_e_dkey_ks, compute_h_prime, compute_l_prime, derive_kd, TX_CAPS,
};
use hdcp_harness::SoftCrypto;

const KM: [u8; 16] = [
    0x6C, 0x01, 0x9A, 0x52, 0x3E, 0xD1, 0x88, 0x4F, 0x07, 0xB2, 0xC5, 0x60,
    0x11, 0xFE, 0x93, 0x2A,
];
const RTX: [u8; 8] = [0xF9, 0xF1, 0x30, 0xA8, 0x2D, 0x5B, 0xE5, 0xC3];
const RRX: [u8; 8] = [0xE1, 0x7A, 0xB0, 0x46, 0x9C, 0x2E, 0x53, 0x81];
const RN: [u8; 8] = [0xA0, 0xFE, 0x58, 0x17, 0x6A, 0x02, 0x44, 0x9D];
const RX_CAPS: [u8; 3] = [0x02, 0x00, 0x00];

fn aes_ref(key: &[u8; 16], block: &[u8; 16]) -> [u8; 16] {
    let cipher = Aes128::new_from_slice(key).unwrap();
    let mut buf = aes::Block::clone_from_slice(block);
    cipher.encrypt_block(&mut buf);
    buf.into()
}

fn reference_kd() -> [u8; 32] {
    let mut block = [0u8; 16];
    block[..8].copy_from_slice(&RTX);
    block[8..].copy_from_slice(&RRX);
    let dkey0 = aes_ref(&KM, &block);
    block[15] ^= 0x01;
    let dkey1 = aes_ref(&KM, &block);

    let mut kd = [0u8; 32];
    kd[..16].copy_from_slice(&dkey0);
    kd[16..].copy_from_slice(&dkey1);
    kd
}

#[test]
fn kd_concatenates_the_two_derived_keys() {
    let crypto = SoftCrypto::new();
    assert_eq!(derive_kd(&crypto, &KM, &RTX, &RRX), reference_kd());
}

#[test]
fn h_prime_hashes_kd_rtx_and_both_capability_fields() {
    let crypto = SoftCrypto::new();

    let mut hasher = Sha256::new();
    hasher.update(reference_kd());
    hasher.update(RTX);
    hasher.update(RX_CAPS);
    hasher.update(TX_CAPS);
    let expected: [u8; 32] = hasher.finalize().into();

    assert_eq!(
        compute_h_prime(&crypto, &RRX, &RX_CAPS, &RTX, &TX_CAPS, &KM),
        expected
    );
}

#[test]
fn l_prime_hashes_kd_and_the_three_nonces() {
    let crypto = SoftCrypto::new();

    let mut hasher = Sha256::new();
    hasher.update(reference_kd());
    hasher.update(RN);
    hasher.update(RRX);
    hasher.update(RTX);
    let expected: [u8; 32] = hasher.finalize().into();

    assert_eq!(compute_l_prime(&crypto, &RN, &KM, &RRX, &RTX), expected);
}

#[test]
fn session_key_mask_is_an_involution() {
    let crypto = SoftCrypto::new();
    let ks = [0x42u8; 16];

    let masked = compute_e_dkey_ks(&crypto, &RN, &KM, &ks, &RRX, &RTX);
    assert_ne!(masked, ks);
    // Applying the mask twice recovers the session key, which is exactly
    // how the receiver side unwraps it.
    let unmasked = compute_e_dkey_ks(&crypto, &RN, &KM, &masked, &RRX, &RTX);
    assert_eq!(unmasked, ks);
}

#[test]
fn session_key_mask_matches_the_reference_block() {
    let crypto = SoftCrypto::new();
    let ks = [0x42u8; 16];

    let mut block = [0u8; 16];
    block[..8].copy_from_slice(&RN);
    for i in 0..8 {
        block[8 + i] = RRX[i] ^ RTX[i];
    }
    let mask = aes_ref(&KM, &block);
    let mut expected = [0u8; 16];
    for i in 0..16 {
        expected[i] = ks[i] ^ mask[i];
    }

    assert_eq!(compute_e_dkey_ks(&crypto, &RN, &KM, &ks, &RRX, &RTX), expected);
}
