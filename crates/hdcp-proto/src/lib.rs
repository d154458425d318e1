//! Wire-level types for the HDCP 2.2 transmitter protocol.
//!
//! This crate defines the authentication messages exchanged over the DDC
//! link, their fixed binary layouts, and the receiver-side register map.
//! It holds no protocol state; the engine in `hdcp-core` decides when each
//! message is produced or expected.
//!
//! Every message has a fixed size and a leading one-byte identifier.
//! Encoding and decoding are explicit per field so malformed frames are
//! rejected with typed errors rather than reinterpreted.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod ddc;
pub mod errors;
pub mod messages;
pub mod rxstatus;

pub use errors::{ProtocolError, Result};
pub use messages::MessageId;
pub use rxstatus::RxStatus;
