//! DDC access seam.
//!
//! The engine does not own a bus driver. The integrator installs two
//! callbacks for raw register traffic against the receiver's HDCP port;
//! both must be callable from the timer expiry context as well as the
//! polling context.

use std::sync::Arc;

use thiserror::Error;

use hdcp_proto::ddc::{DDC_DEVICE_ADDRESS, REG_RXSTATUS};

use crate::timer::TimerShared;

/// A DDC transfer failed. Carries no detail; the engine treats every
/// transfer failure the same way regardless of cause.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("ddc transfer failed")]
pub struct TransportFault;

/// Raw DDC write: device address, payload, stop condition.
pub type DdcWriteFn =
    Arc<dyn Fn(u8, &[u8], bool) -> Result<(), TransportFault> + Send + Sync>;

/// Raw DDC read: device address, buffer to fill, stop condition.
pub type DdcReadFn = Arc<
    dyn Fn(u8, &mut [u8], bool) -> Result<(), TransportFault> + Send + Sync,
>;

/// Notification fired on the edge into the authenticated state.
pub type AuthenticatedFn = Arc<dyn Fn() + Send + Sync>;

/// Installed integrator callbacks.
#[derive(Default)]
pub(crate) struct Callbacks {
    pub(crate) ddc_write: Option<DdcWriteFn>,
    pub(crate) ddc_read: Option<DdcReadFn>,
    pub(crate) authenticated: Option<AuthenticatedFn>,
}

impl Callbacks {
    /// Handlers are wiring, not runtime conditions: driving the engine
    /// without them is an integration bug, so this fails loudly instead
    /// of returning an error the caller could mask.
    pub(crate) fn ddc_write(&self) -> DdcWriteFn {
        self.ddc_write.clone().expect("DDC write handler not configured")
    }

    pub(crate) fn ddc_read(&self) -> DdcReadFn {
        self.ddc_read.clone().expect("DDC read handler not configured")
    }
}

/// Captures RXSTATUS into the shared word.
///
/// Guarded by the shared try-lock: when the other context is mid-read,
/// this one drops its read rather than blocking. Transfer failures leave
/// the previous capture in place.
pub(crate) fn read_rx_status(
    shared: &TimerShared,
    write: &DdcWriteFn,
    read: &DdcReadFn,
) {
    if !shared.try_lock_status_read() {
        return;
    }
    if write(DDC_DEVICE_ADDRESS, &[REG_RXSTATUS], false).is_ok() {
        let mut raw = [0u8; 2];
        if read(DDC_DEVICE_ADDRESS, &mut raw, true).is_ok() {
            shared.store_rx_status(u16::from_le_bytes(raw));
        }
    }
    shared.unlock_status_read();
}
