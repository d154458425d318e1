//! One-call wiring of the engine and its simulation doubles.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use hdcp_core::{HdcpTx, Status, TxConfig};

use crate::cipher::RecordingCipher;
use crate::clock::SimClock;
use crate::crypto::SoftCrypto;
use crate::receiver::{ddc_handlers, ReceiverBehavior, SimReceiver};
use crate::rng::SeededRandom;

/// Global constant loaded into the cipher by every rig.
pub const LC128: [u8; 16] = *b"hdcp2-lc128-sim!";

/// Receiver identifier used by every rig.
pub const RECEIVER_ID: [u8; 5] = [0x74, 0x5B, 0xB8, 0xBD, 0x04];

/// Fully wired engine plus handles on every double.
///
/// The default rig uses early polling (divisor 1) so message waits
/// resolve as soon as the receiver stages a reply; tests exercising the
/// expiry path set the divisor to 0 before starting.
pub struct TestRig {
    /// The engine under test.
    pub engine: HdcpTx,
    /// Shared handle on the scripted receiver.
    pub receiver: Arc<Mutex<SimReceiver>>,
    /// The simulation clock driving the engine's timer.
    pub clock: SimClock,
    /// Recorded cipher state.
    pub cipher: RecordingCipher,
    /// Crypto suite handle, for the verification counter.
    pub crypto: SoftCrypto,
    auth_events: Arc<AtomicUsize>,
}

impl TestRig {
    /// A rig with a compliant receiver.
    pub fn new() -> Self {
        Self::with_behavior(ReceiverBehavior::default())
    }

    /// A rig with the given receiver behavior.
    pub fn with_behavior(behavior: ReceiverBehavior) -> Self {
        init_tracing();
        let crypto = SoftCrypto::new();
        let receiver =
            Arc::new(Mutex::new(SimReceiver::new(RECEIVER_ID, behavior)));
        let clock = SimClock::new();
        let cipher = RecordingCipher::new();

        let mut engine = HdcpTx::initialize(TxConfig {
            crypto: Box::new(crypto.clone()),
            rng: Box::new(SeededRandom::new(0x5EED_CAFE)),
            timer: Box::new(clock.clone()),
            cipher: Box::new(cipher.clone()),
            polling_value: 1,
        })
        .expect("collaborator setup cannot fail in simulation");

        let (write, read) = ddc_handlers(&receiver);
        engine.set_ddc_write(write);
        engine.set_ddc_read(read);

        let auth_events = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&auth_events);
        engine.set_authenticated_callback(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        clock.connect(
            engine.timer_signal().expect("ddc handlers just installed"),
        );
        engine.load_global_constant(&LC128);

        Self { engine, receiver, clock, cipher, crypto, auth_events }
    }

    /// Enables the engine and requests authentication.
    pub fn start(&mut self) {
        self.engine.enable();
        self.engine.authenticate().expect("engine just enabled");
    }

    /// One poll followed by one millisecond of simulated time.
    pub fn tick(&mut self) -> Status {
        let status = self.engine.poll();
        self.clock.advance(1);
        status
    }

    /// Runs `polls` ticks and returns the last status.
    pub fn run(&mut self, polls: usize) -> Status {
        let mut status = self.engine.status();
        for _ in 0..polls {
            status = self.tick();
        }
        status
    }

    /// Ticks until a poll reports `target`, returning the tick count,
    /// or `None` after `max_polls`.
    pub fn run_until(
        &mut self,
        target: Status,
        max_polls: usize,
    ) -> Option<usize> {
        for n in 0..max_polls {
            if self.tick() == target {
                return Some(n + 1);
            }
        }
        None
    }

    /// Locks the receiver for inspection or behavior changes.
    pub fn receiver(&self) -> MutexGuard<'_, SimReceiver> {
        self.receiver.lock().unwrap()
    }

    /// Edges into the authenticated state observed via the callback.
    pub fn auth_events(&self) -> usize {
        self.auth_events.load(Ordering::SeqCst)
    }
}

impl Default for TestRig {
    fn default() -> Self {
        Self::new()
    }
}

/// Installs the test tracing subscriber once; later calls are no-ops.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
