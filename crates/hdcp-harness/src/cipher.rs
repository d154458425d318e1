//! Recording cipher double.

use std::sync::{Arc, Mutex};

use hdcp_core::cipher::CipherControl;
use hdcp_core::error::CollaboratorError;

/// Observable cipher state captured by [`RecordingCipher`].
#[derive(Debug, Clone, Default)]
pub struct CipherState {
    /// Whether the cipher is running.
    pub running: bool,
    /// Whether transmitted content is being encrypted.
    pub tx_encryption: bool,
    /// Last loaded session key.
    pub session_key: Option<[u8; 16]>,
    /// Last loaded initialization vector.
    pub iv: Option<[u8; 8]>,
    /// Last loaded global constant.
    pub global_constant: Option<[u8; 16]>,
    /// Stopped-to-running edges seen. The engine reasserts enablement
    /// every poll, so this counts sessions rather than polls.
    pub run_edges: usize,
}

/// A [`CipherControl`] that records everything it is told.
///
/// Clones share state, so a test keeps a handle while the engine owns
/// the boxed collaborator.
#[derive(Clone, Default)]
pub struct RecordingCipher {
    inner: Arc<Mutex<CipherState>>,
}

impl RecordingCipher {
    /// A fresh, stopped cipher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded state.
    pub fn snapshot(&self) -> CipherState {
        self.inner.lock().unwrap().clone()
    }
}

impl CipherControl for RecordingCipher {
    fn setup(&mut self) -> Result<(), CollaboratorError> {
        Ok(())
    }

    fn set_global_constant(&mut self, lc128: &[u8; 16]) {
        self.inner.lock().unwrap().global_constant = Some(*lc128);
    }

    fn set_session_key(&mut self, ks: &[u8; 16]) {
        self.inner.lock().unwrap().session_key = Some(*ks);
    }

    fn set_iv(&mut self, riv: &[u8; 8]) {
        self.inner.lock().unwrap().iv = Some(*riv);
    }

    fn enable(&mut self) {
        let mut state = self.inner.lock().unwrap();
        if !state.running {
            state.running = true;
            state.run_edges += 1;
        }
    }

    fn disable(&mut self) {
        self.inner.lock().unwrap().running = false;
    }

    fn enable_tx_encryption(&mut self) {
        self.inner.lock().unwrap().tx_encryption = true;
    }

    fn disable_tx_encryption(&mut self) {
        self.inner.lock().unwrap().tx_encryption = false;
    }
}
