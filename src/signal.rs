//! Single-permit wake signals for hardware edges.
//!
//! Each external edge source (bit clock, and one latch strobe per consumer) gets one
//! [`EdgeSignal`]. The ISR side calls [`notify()`](EdgeSignal::notify), which never blocks;
//! the task side takes the permit with [`try_take()`](EdgeSignal::try_take) or blocks on it
//! with [`wait()`](EdgeSignal::wait). Permits do not count: several edges before a take
//! collapse into one. There is no timeout. A task waiting on an edge that never comes stalls,
//! because the timing generator is the only source of timing truth.

use core::convert::Infallible;
use core::sync::atomic::{AtomicBool, Ordering};

/// A binary, coalescing wake signal.
#[derive(Debug, Default)]
pub struct EdgeSignal {
    pending: AtomicBool,
}

impl EdgeSignal {
    /// Creates a signal with no pending permit.
    pub const fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
        }
    }

    /// Posts the permit. Safe to call from interrupt context.
    pub fn notify(&self) {
        self.pending.store(true, Ordering::Release);
    }

    /// Whether a permit is waiting to be taken.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Takes the permit if one is pending.
    ///
    /// Uses a critical section rather than `swap` so it works on cores without atomic
    /// read-modify-write instructions.
    pub fn try_take(&self) -> nb::Result<(), Infallible> {
        let taken = critical_section::with(|_| {
            let pending = self.pending.load(Ordering::Acquire);
            self.pending.store(false, Ordering::Relaxed);
            pending
        });
        if taken {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    /// Spins until the permit is posted, then takes it.
    pub fn wait(&self) {
        let _ = nb::block!(self.try_take());
    }

    /// Drops a pending permit without waking anyone.
    pub fn clear(&self) {
        self.pending.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_without_notify_would_block() {
        let signal = EdgeSignal::new();
        assert_eq!(signal.try_take(), Err(nb::Error::WouldBlock));
    }

    #[test]
    fn test_notify_then_take() {
        let signal = EdgeSignal::new();
        signal.notify();
        assert!(signal.is_pending());
        assert_eq!(signal.try_take(), Ok(()));
        assert!(!signal.is_pending());
    }

    #[test]
    fn test_edges_coalesce() {
        let signal = EdgeSignal::new();
        signal.notify();
        signal.notify();
        signal.notify();
        assert_eq!(signal.try_take(), Ok(()));
        assert_eq!(signal.try_take(), Err(nb::Error::WouldBlock));
    }

    #[test]
    fn test_clear_drops_permit() {
        let signal = EdgeSignal::new();
        signal.notify();
        signal.clear();
        assert_eq!(signal.try_take(), Err(nb::Error::WouldBlock));
    }

    #[test]
    fn test_wait_returns_once_notified_from_another_thread() {
        let signal = std::sync::Arc::new(EdgeSignal::new());
        let isr = std::sync::Arc::clone(&signal);
        let handle = std::thread::spawn(move || isr.notify());
        signal.wait();
        handle.join().unwrap();
        assert!(!signal.is_pending());
    }
}
