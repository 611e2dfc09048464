//! External control lines.
//!
//! Reset, NMI and INT may be driven from any thread. The processor only
//! samples them at instruction boundaries, so a request never interrupts an
//! instruction in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct LineState {
    reset_requested: AtomicBool,
    nmi_level: AtomicBool,
    nmi_edge: AtomicBool,
    int_level: AtomicBool,
}

/// Cloneable handle to the reset/NMI/INT inputs of one processor.
#[derive(Debug, Clone, Default)]
pub struct InterruptLines {
    state: Arc<LineState>,
}

impl InterruptLines {
    /// Creates a handle with every line inactive.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Latches a reset request, honored at the next step.
    pub fn request_reset(&self) {
        self.state.reset_requested.store(true, Ordering::Release);
    }

    /// Drives the NMI line. Only a rising edge latches a request; dropping
    /// the line does not cancel one already latched.
    pub fn set_nmi(&self, level: bool) {
        let previous = self.state.nmi_level.swap(level, Ordering::AcqRel);
        if level && !previous {
            self.state.nmi_edge.store(true, Ordering::Release);
        }
    }

    /// Drives the level-sensed INT line.
    pub fn set_int(&self, level: bool) {
        self.state.int_level.store(level, Ordering::Release);
    }

    /// Current NMI line level.
    #[must_use]
    pub fn nmi_level(&self) -> bool {
        self.state.nmi_level.load(Ordering::Acquire)
    }

    /// Current INT line level.
    #[must_use]
    pub fn int_level(&self) -> bool {
        self.state.int_level.load(Ordering::Acquire)
    }

    /// True while a reset request waits for the next step.
    #[must_use]
    pub fn reset_requested(&self) -> bool {
        self.state.reset_requested.load(Ordering::Acquire)
    }

    pub(crate) fn take_reset(&self) -> bool {
        self.state.reset_requested.swap(false, Ordering::AcqRel)
    }

    pub(crate) fn take_nmi_edge(&self) -> bool {
        self.state.nmi_edge.swap(false, Ordering::AcqRel)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::InterruptLines;

    #[test]
    fn nmi_latches_on_rising_edge_only() {
        let lines = InterruptLines::new();
        lines.set_nmi(true);
        lines.set_nmi(true);
        assert!(lines.take_nmi_edge());
        assert!(!lines.take_nmi_edge());

        lines.set_nmi(false);
        assert!(!lines.take_nmi_edge());
        lines.set_nmi(true);
        assert!(lines.take_nmi_edge());
    }

    #[test]
    fn falling_edge_keeps_latched_nmi() {
        let lines = InterruptLines::new();
        lines.set_nmi(true);
        lines.set_nmi(false);
        assert!(!lines.nmi_level());
        assert!(lines.take_nmi_edge());
    }

    #[test]
    fn reset_request_is_consumed_once() {
        let lines = InterruptLines::new();
        lines.request_reset();
        assert!(lines.reset_requested());
        assert!(lines.take_reset());
        assert!(!lines.take_reset());
    }

    #[test]
    fn clones_share_lines_across_threads() {
        let lines = InterruptLines::new();
        let remote = lines.clone();
        thread::spawn(move || {
            remote.set_int(true);
            remote.set_nmi(true);
        })
        .join()
        .expect("line driver thread");

        assert!(lines.int_level());
        assert!(lines.take_nmi_edge());
    }
}
