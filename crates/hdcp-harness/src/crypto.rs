//! Software crypto suite.
//!
//! SHA-256 and AES-128 are real. The RSA operations are deterministic
//! doubles: certificates carry a digest-based mock signature, and the
//! OAEP double masks the master key with a stream derived from the
//! receiver's public key alone, so the sim receiver can unwrap it
//! without modeling a private key.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use aes::cipher::{BlockEncrypt, KeyInit};
use aes::Aes128;
use sha2::{Digest, Sha256};

use hdcp_core::crypto::CryptoSuite;
use hdcp_proto::messages::{
    CERT_SIGNATURE_SIZE, E_KPUB_KM_SIZE, HASH_SIZE, KM_SIZE, KPUB_RX_SIZE,
    MASKING_SEED_SIZE,
};

/// [`CryptoSuite`] implementation for the simulation.
///
/// Clones share the signature-verification counter, so a test can keep a
/// handle while the engine owns the boxed suite.
#[derive(Clone, Default)]
pub struct SoftCrypto {
    verify_calls: Arc<AtomicUsize>,
}

impl SoftCrypto {
    /// A fresh suite with a zeroed verification counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// How many signature verifications the engine has performed.
    pub fn signature_verifications(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }
}

impl CryptoSuite for SoftCrypto {
    fn sha256(&self, data: &[u8]) -> [u8; HASH_SIZE] {
        digest(data)
    }

    fn aes128_encrypt(
        &self,
        key: &[u8; KM_SIZE],
        block: &[u8; KM_SIZE],
    ) -> [u8; KM_SIZE] {
        aes128_block(key, block)
    }

    fn rsa_verify(
        &self,
        message: &[u8],
        signature: &[u8],
        modulus: &[u8],
        _exponent: &[u8],
    ) -> bool {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        signature.len() == CERT_SIGNATURE_SIZE
            && signature[..HASH_SIZE] == signing_digest(message, modulus)
    }

    fn rsa_oaep_encrypt(
        &self,
        kpub_rx: &[u8; KPUB_RX_SIZE],
        plaintext: &[u8; KM_SIZE],
        masking_seed: &[u8; MASKING_SEED_SIZE],
    ) -> [u8; E_KPUB_KM_SIZE] {
        let stream = digest(kpub_rx);
        let mut out = [0u8; E_KPUB_KM_SIZE];
        for i in 0..KM_SIZE {
            out[i] = plaintext[i] ^ stream[i];
        }
        out[KM_SIZE..KM_SIZE + MASKING_SEED_SIZE]
            .copy_from_slice(masking_seed);
        out
    }
}

/// Produces the mock signature [`SoftCrypto::rsa_verify`] accepts for
/// `message` under the key with the given modulus.
pub fn mock_signature(
    message: &[u8],
    modulus: &[u8],
) -> [u8; CERT_SIGNATURE_SIZE] {
    let mut out = [0u8; CERT_SIGNATURE_SIZE];
    out[..HASH_SIZE].copy_from_slice(&signing_digest(message, modulus));
    out
}

/// Receiver-side inverse of the OAEP double.
pub fn mock_oaep_unwrap(
    kpub_rx: &[u8; KPUB_RX_SIZE],
    ciphertext: &[u8; E_KPUB_KM_SIZE],
) -> [u8; KM_SIZE] {
    let stream = digest(kpub_rx);
    let mut out = [0u8; KM_SIZE];
    for i in 0..KM_SIZE {
        out[i] = ciphertext[i] ^ stream[i];
    }
    out
}

fn signing_digest(message: &[u8], modulus: &[u8]) -> [u8; HASH_SIZE] {
    let mut hasher = Sha256::new();
    hasher.update(message);
    hasher.update(modulus);
    hasher.finalize().into()
}

fn digest(data: &[u8]) -> [u8; HASH_SIZE] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

fn aes128_block(key: &[u8; KM_SIZE], block: &[u8; KM_SIZE]) -> [u8; KM_SIZE] {
    let cipher = Aes128::new_from_slice(key).expect("aes-128 key size");
    let mut buf = aes::Block::clone_from_slice(block);
    cipher.encrypt_block(&mut buf);
    let mut out = [0u8; KM_SIZE];
    out.copy_from_slice(&buf);
    out
}
