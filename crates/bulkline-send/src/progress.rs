use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Live counters for one bulk-send invocation, shared with the display
/// layer through an `Arc`. Only the orchestrator writes while `active` is
/// true; everyone else polls [`SendProgress::snapshot`].
#[derive(Debug, Default)]
pub struct SendProgress {
    total: AtomicU32,
    sent: AtomicU32,
    failed: AtomicU32,
    active: AtomicBool,
}

impl SendProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the counters for a fresh send and mark it active.
    pub fn begin(&self, total: u32) {
        self.total.store(total, Ordering::Relaxed);
        self.sent.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
        self.active.store(true, Ordering::Relaxed);
    }

    pub fn record_sent(&self, n: u32) {
        self.sent.fetch_add(n, Ordering::Relaxed);
    }

    pub fn record_failed(&self, n: u32) {
        self.failed.fetch_add(n, Ordering::Relaxed);
    }

    /// Mark the send finished, leaving whatever counts accumulated.
    pub fn finish(&self) {
        self.active.store(false, Ordering::Relaxed);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            total: self.total.load(Ordering::Relaxed),
            sent: self.sent.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            active: self.active.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub total: u32,
    pub sent: u32,
    pub failed: u32,
    pub active: bool,
}

impl ProgressSnapshot {
    /// `(sent + failed) / total`, as a percentage. Zero when nothing was
    /// ever started.
    pub fn percent_complete(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        (self.sent + self.failed) as f32 / self.total as f32 * 100.0
    }
}
