//! Poll-driven HDCP 2.2 transmitter authentication engine.
//!
//! # Architecture: The Hollow Shell
//!
//! [`engine::HdcpTx`] is pure protocol logic. It performs no IO, spawns no
//! threads, and never blocks: each [`engine::HdcpTx::poll`] executes exactly
//! one state-handler step and returns. Waiting is represented as state that
//! persists across polls, so the engine can live inside a bare-metal main
//! loop, an RTOS task, or a test driver unchanged.
//!
//! All side effects flow through seams the integrator supplies:
//!
//! - [`crypto::CryptoSuite`] for hashing, block encryption and RSA
//! - [`timer::TimerDevice`] for the hardware countdown timer
//! - [`cipher::CipherControl`] for the link cipher datapath
//! - [`rng::RandomSource`] for protocol nonces and keys
//! - DDC register access via callbacks ([`ddc::DdcWriteFn`], [`ddc::DdcReadFn`])
//!
//! The timer expiry path is interrupt-safe: [`timer::TimerSignal`] may be
//! fired from a different execution context than the one calling `poll`,
//! and shares only atomics with the engine.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cipher;
pub mod crypto;
pub mod ddc;
pub mod engine;
pub mod error;
pub mod pairing;
pub mod rng;
pub mod session;
pub mod state;
pub mod timer;

mod transitions;

pub use engine::{HdcpTx, TxConfig};
pub use error::{AttemptFailure, CollaboratorError, InitError, TxError};
pub use state::{State, Status};
