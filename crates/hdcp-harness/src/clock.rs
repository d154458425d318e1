//! Manually advanced simulation clock.

use std::sync::{Arc, Mutex};

use hdcp_core::error::CollaboratorError;
use hdcp_core::timer::{TimerDevice, TimerSignal};

struct ClockInner {
    now_ms: u64,
    deadline_ms: Option<u64>,
    signal: Option<TimerSignal>,
}

/// A [`TimerDevice`] whose time only moves when the test advances it.
///
/// Clones share the same clock. Crossing an armed deadline fires the
/// connected [`TimerSignal`] exactly as a hardware expiry interrupt
/// would, including the RXSTATUS capture it performs.
#[derive(Clone)]
pub struct SimClock {
    inner: Arc<Mutex<ClockInner>>,
}

impl SimClock {
    /// A clock at time zero with no armed deadline.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(ClockInner {
                now_ms: 0,
                deadline_ms: None,
                signal: None,
            })),
        }
    }

    /// Connects the expiry signal fired when a deadline is crossed.
    pub fn connect(&self, signal: TimerSignal) {
        self.inner.lock().unwrap().signal = Some(signal);
    }

    /// Advances time, firing the signal if the armed deadline is
    /// crossed. The signal runs outside the clock lock, matching an
    /// interrupt preempting the main loop.
    pub fn advance(&self, ms: u64) {
        let fired = {
            let mut inner = self.inner.lock().unwrap();
            inner.now_ms += ms;
            match inner.deadline_ms {
                Some(deadline) if inner.now_ms >= deadline => {
                    inner.deadline_ms = None;
                    inner.signal.clone()
                }
                _ => None,
            }
        };
        if let Some(signal) = fired {
            signal.fire();
        }
    }

    /// Current simulated time.
    pub fn now_ms(&self) -> u64 {
        self.inner.lock().unwrap().now_ms
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerDevice for SimClock {
    fn setup(&mut self) -> Result<(), CollaboratorError> {
        Ok(())
    }

    fn start(&mut self, duration_ms: u32) {
        let mut inner = self.inner.lock().unwrap();
        inner.deadline_ms = Some(inner.now_ms + u64::from(duration_ms));
    }

    fn stop(&mut self) {
        self.inner.lock().unwrap().deadline_ms = None;
    }

    fn remaining_ms(&self) -> u32 {
        let inner = self.inner.lock().unwrap();
        match inner.deadline_ms {
            Some(deadline) => deadline.saturating_sub(inner.now_ms) as u32,
            None => 0,
        }
    }
}
