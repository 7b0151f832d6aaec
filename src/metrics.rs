// Frame-loop performance metrics
//
// Lightweight counters for monitoring the recognition pipeline

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Counters for one run of the recognition loop.
///
/// Uses atomic operations so recording never needs a lock; the loop records
/// on every frame and the numbers are logged periodically and on shutdown.
#[derive(Debug)]
pub struct FrameMetrics {
    /// Camera frames processed
    frames: AtomicU64,

    /// Frames in which at least one hand was tracked
    hands_seen: AtomicU64,

    /// Frames whose primary hand classified to a known symbol
    symbols_classified: AtomicU64,

    /// Holds that crossed the hold threshold
    holds_confirmed: AtomicU64,

    /// Confirmations dropped because the cooldown gate was closed
    confirmations_gated: AtomicU64,

    /// Confirmations whose symbol had no binding
    confirmations_unbound: AtomicU64,

    /// Commands handed to the automation backend
    commands_dispatched: AtomicU64,

    /// Dispatches that reported an action failure
    dispatch_failures: AtomicU64,

    /// Loop start time
    start_time: Instant,
}

impl FrameMetrics {
    pub fn new() -> Self {
        Self {
            frames: AtomicU64::new(0),
            hands_seen: AtomicU64::new(0),
            symbols_classified: AtomicU64::new(0),
            holds_confirmed: AtomicU64::new(0),
            confirmations_gated: AtomicU64::new(0),
            confirmations_unbound: AtomicU64::new(0),
            commands_dispatched: AtomicU64::new(0),
            dispatch_failures: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_frame(&self) {
        self.frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_hand(&self) {
        self.hands_seen.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_classified(&self) {
        self.symbols_classified.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_hold_confirmed(&self) {
        self.holds_confirmed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_gated(&self) {
        self.confirmations_gated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unbound(&self) {
        self.confirmations_unbound.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dispatched(&self) {
        self.commands_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dispatch_failure(&self) {
        self.dispatch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    pub fn dispatched(&self) -> u64 {
        self.commands_dispatched.load(Ordering::Relaxed)
    }

    /// Total loop uptime
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Average frame rate over the whole run
    pub fn average_fps(&self) -> f64 {
        let secs = self.uptime().as_secs_f64();
        if secs > 0.0 {
            self.frames() as f64 / secs
        } else {
            0.0
        }
    }

    /// Log the full metrics summary (called on loop shutdown)
    pub fn log_summary(&self) {
        tracing::info!("=== Recognition Metrics Summary ===");
        tracing::info!(
            "Frames: {} in {:.2}s ({:.1} fps avg)",
            self.frames(),
            self.uptime().as_secs_f64(),
            self.average_fps()
        );
        tracing::info!(
            "Hands seen: {}, classified: {}, holds confirmed: {}",
            self.hands_seen.load(Ordering::Relaxed),
            self.symbols_classified.load(Ordering::Relaxed),
            self.holds_confirmed.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Dispatched: {}, failures: {}, gated: {}, unbound: {}",
            self.commands_dispatched.load(Ordering::Relaxed),
            self.dispatch_failures.load(Ordering::Relaxed),
            self.confirmations_gated.load(Ordering::Relaxed),
            self.confirmations_unbound.load(Ordering::Relaxed)
        );
    }

    /// Log a one-line progress snapshot (for long-running loops)
    pub fn log_periodic(&self) {
        tracing::info!(
            "Metrics: {} frames ({:.1} fps), {} dispatched, {} failures",
            self.frames(),
            self.average_fps(),
            self.dispatched(),
            self.dispatch_failures.load(Ordering::Relaxed)
        );
    }
}

impl Default for FrameMetrics {
    fn default() -> Self {
        Self::new()
    }
}
