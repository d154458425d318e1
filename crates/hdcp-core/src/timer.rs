//! Timer seam and the interrupt-safe expiry path.

use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::Arc;

use hdcp_proto::RxStatus;

use crate::ddc::{read_rx_status, DdcReadFn, DdcWriteFn};
use crate::error::CollaboratorError;

/// Why the currently armed timer is running. The expiry handler in the
/// authenticated state branches on this, and message reasons clear the
/// availability latch when the timer is armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutReason {
    /// No timer armed, or a bare delay.
    None,
    /// Waiting for AKE_Send_Cert.
    AkeSendCert,
    /// Waiting for AKE_Send_H_prime.
    AkeSendHPrime,
    /// Waiting for AKE_Send_Pairing_Info.
    AkeSendPairingInfo,
    /// Waiting for LC_Send_L_prime.
    LcSendLPrime,
    /// Letting the link cipher settle after SKE.
    CipherSettle,
    /// Periodic re-authentication check while authenticated.
    ReauthCheck,
}

impl TimeoutReason {
    /// True for reasons that wait on a receiver message.
    pub fn awaits_message(self) -> bool {
        matches!(
            self,
            Self::AkeSendCert
                | Self::AkeSendHPrime
                | Self::AkeSendPairingInfo
                | Self::LcSendLPrime
        )
    }
}

/// Hardware countdown timer seam.
///
/// The engine arms one timer at a time. Expiry is not delivered through
/// this trait; the integrator fires [`TimerSignal`] from the expiry
/// context instead.
pub trait TimerDevice: Send {
    /// One-time initialization.
    fn setup(&mut self) -> Result<(), CollaboratorError>;

    /// Arms the timer for `duration_ms` milliseconds.
    fn start(&mut self, duration_ms: u32);

    /// Cancels the running timer.
    fn stop(&mut self);

    /// Milliseconds left on the running timer, zero when idle.
    fn remaining_ms(&self) -> u32;
}

/// State shared between the polling context and the timer expiry context.
///
/// Only atomics live here. The expiry context never touches the session
/// record or the timer reason; those stay exclusive to the poll side.
#[derive(Debug)]
pub struct TimerShared {
    expired: AtomicBool,
    rx_status: AtomicU16,
    status_read_guard: AtomicBool,
    engine_enabled: AtomicBool,
}

impl TimerShared {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            // No timer armed yet counts as expired, so the first wait
            // state does not stall before its timer starts.
            expired: AtomicBool::new(true),
            rx_status: AtomicU16::new(0),
            status_read_guard: AtomicBool::new(false),
            engine_enabled: AtomicBool::new(false),
        })
    }

    /// Whether the armed timer has expired.
    pub fn is_expired(&self) -> bool {
        self.expired.load(Ordering::Acquire)
    }

    pub(crate) fn set_expired(&self, value: bool) {
        self.expired.store(value, Ordering::Release);
    }

    /// Last RXSTATUS word captured from the receiver.
    pub fn rx_status(&self) -> RxStatus {
        RxStatus::new(self.rx_status.load(Ordering::Acquire))
    }

    pub(crate) fn store_rx_status(&self, raw: u16) {
        self.rx_status.store(raw, Ordering::Release);
    }

    pub(crate) fn set_enabled(&self, value: bool) {
        self.engine_enabled.store(value, Ordering::Release);
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.engine_enabled.load(Ordering::Acquire)
    }

    /// Claims the RXSTATUS read guard. A `false` return means another
    /// context holds it and this read should be dropped, not blocked on.
    pub(crate) fn try_lock_status_read(&self) -> bool {
        self.status_read_guard
            .compare_exchange(
                false,
                true,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    pub(crate) fn unlock_status_read(&self) {
        self.status_read_guard.store(false, Ordering::Release);
    }
}

/// Handle the integrator fires from the timer expiry context.
///
/// Marks the timer expired and, while the engine is enabled, captures a
/// fresh RXSTATUS word so the next poll sees current receiver state. May
/// run concurrently with `poll`; contention on the status read resolves
/// by dropping one read.
#[derive(Clone)]
pub struct TimerSignal {
    shared: Arc<TimerShared>,
    ddc_write: DdcWriteFn,
    ddc_read: DdcReadFn,
}

impl TimerSignal {
    pub(crate) fn new(
        shared: Arc<TimerShared>,
        ddc_write: DdcWriteFn,
        ddc_read: DdcReadFn,
    ) -> Self {
        Self { shared, ddc_write, ddc_read }
    }

    /// Signals expiry of the armed timer.
    pub fn fire(&self) {
        self.shared.set_expired(true);
        if self.shared.is_enabled() {
            read_rx_status(&self.shared, &self.ddc_write, &self.ddc_read);
        }
    }
}
