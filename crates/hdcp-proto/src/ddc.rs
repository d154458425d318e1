//! DDC register map of an HDCP 2.2 capable receiver.
//!
//! All traffic goes to a single I2C device. A one-byte write selects a
//! register offset; message payloads are written behind [`REG_WRITE_MSG`]
//! and read back from [`REG_READ_MSG`].

/// I2C device address of the HDCP port on the receiver.
pub const DDC_DEVICE_ADDRESS: u8 = 0x74;

/// Version register. Bit [`HDCP2_CAPABLE_MASK`] signals HDCP 2.2 support.
pub const REG_HDCP2_VERSION: u8 = 0x50;

/// Message ingress register. A write of `[offset, message...]` delivers
/// one complete authentication message to the receiver.
pub const REG_WRITE_MSG: u8 = 0x60;

/// RXSTATUS register, two bytes little-endian. See [`crate::RxStatus`].
pub const REG_RXSTATUS: u8 = 0x70;

/// Message egress register. Reading it drains the receiver's pending
/// message, whose size RXSTATUS advertised.
pub const REG_READ_MSG: u8 = 0x80;

/// Capability bit inside the version register.
pub const HDCP2_CAPABLE_MASK: u8 = 0x04;
