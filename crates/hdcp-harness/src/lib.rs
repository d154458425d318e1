//! Deterministic simulation doubles for driving `hdcp-core`.
//!
//! This crate supplies everything the engine's seams need to run without
//! hardware: a software crypto suite, a scripted receiver behind the DDC
//! callbacks, a manually advanced clock that fires the timer signal, a
//! seeded random source, and a recording cipher. [`TestRig`] wires them
//! together for the integration suites.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cipher;
pub mod clock;
pub mod crypto;
pub mod receiver;
pub mod rig;
pub mod rng;

pub use cipher::{CipherState, RecordingCipher};
pub use clock::SimClock;
pub use crypto::SoftCrypto;
pub use receiver::{ddc_handlers, ReceiverBehavior, SimReceiver};
pub use rig::TestRig;
pub use rng::SeededRandom;
