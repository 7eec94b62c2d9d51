//! Elapsed-time and throughput bookkeeping shared by every widget.
//!
//! Two windows are tracked per widget: the run as a whole (from construction)
//! and the current interval (from the most recent repaint). Rates are always
//! derived from a monotonic [`Clock`], never from calendar time.
//!
//! ```rust
//! use pulse_widgets::stats::{ManualClock, Stats};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let clock = Arc::new(ManualClock::new());
//! let mut stats = Stats::new(clock.clone());
//!
//! clock.advance(Duration::from_secs(2));
//! let tp = stats.throughput(100, 50);
//! assert_eq!(tp.total, 50.0);
//! assert_eq!(tp.interval, 25.0);
//!
//! stats.mark_repaint();
//! clock.advance(Duration::from_secs(1));
//! assert_eq!(stats.interval_rate(50), 50.0);
//! ```

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of monotonic instants.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

/// Clock backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
///
/// Useful for deterministic rates in tests and replays. Share it through an
/// `Arc` and keep a handle to call [`ManualClock::advance`].
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    /// Creates a clock frozen at the current instant.
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock()
    }
}

/// Seconds elapsed on `clock` since `origin`, never negative.
pub fn elapsed(clock: &dyn Clock, origin: Instant) -> f64 {
    clock.now().saturating_duration_since(origin).as_secs_f64()
}

/// Items per second, or `0.0` when no measurable time has passed.
///
/// A zero window happens on coarse clocks when the first repaint lands in the
/// same tick as construction.
pub fn rate(amount: u64, seconds: f64) -> f64 {
    if seconds > 0.0 {
        amount as f64 / seconds
    } else {
        0.0
    }
}

/// Rates computed at the instant of a repaint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Throughput {
    /// Items per second since construction.
    pub total: f64,
    /// Items per second over the window closed by this repaint.
    pub interval: f64,
}

/// Final figures reported by `complete()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Widget label.
    pub tag: String,
    /// Pulses received; `None` for widgets without a unit of work.
    pub count: Option<u64>,
    /// Time from construction to completion.
    pub elapsed: Duration,
    /// `count / elapsed`, or `0.0` without a count.
    pub total_rate: f64,
}

/// Start instants for the total and current-interval windows.
#[derive(Debug, Clone)]
pub struct Stats {
    clock: Arc<dyn Clock>,
    start: Instant,
    interval_start: Instant,
}

impl Stats {
    /// Starts both windows now.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        Self {
            clock,
            start: now,
            interval_start: now,
        }
    }

    /// Seconds since construction.
    pub fn elapsed(&self) -> f64 {
        elapsed(self.clock.as_ref(), self.start)
    }

    /// Seconds since the last repaint.
    pub fn interval_elapsed(&self) -> f64 {
        elapsed(self.clock.as_ref(), self.interval_start)
    }

    /// Run-to-date throughput for `count` items.
    pub fn total_rate(&self, count: u64) -> f64 {
        rate(count, self.elapsed())
    }

    /// Throughput of the current window, assuming `window` items landed in it.
    pub fn interval_rate(&self, window: u64) -> f64 {
        rate(window, self.interval_elapsed())
    }

    /// Both rates at once.
    pub fn throughput(&self, count: u64, window: u64) -> Throughput {
        Throughput {
            total: self.total_rate(count),
            interval: self.interval_rate(window),
        }
    }

    /// Closes the current window. Call right after a repaint.
    pub fn mark_repaint(&mut self) {
        self.interval_start = self.clock.now();
    }

    /// Final figures for a widget labelled `tag`.
    pub fn summary(&self, tag: &str, count: Option<u64>) -> Summary {
        let elapsed = self.clock.now().saturating_duration_since(self.start);
        let total_rate = count.map_or(0.0, |n| rate(n, elapsed.as_secs_f64()));
        Summary {
            tag: tag.to_string(),
            count,
            elapsed,
            total_rate,
        }
    }
}

/// Caller supplied trailing text, evaluated on every repaint.
///
/// Must be cheap and free of side effects; it runs on the repainting thread.
pub type UserText = Arc<dyn Fn() -> String + Send + Sync>;

/// A [`UserText`] that contributes nothing.
pub fn no_user_text() -> UserText {
    Arc::new(String::new)
}

/// Status fragment shown after the bar or frame on a periodic repaint.
///
/// Rates are truncated to whole items per second.
pub fn status_text(count: u64, throughput: Throughput, user: &str) -> String {
    format!(
        "{:>15} complete ({} items/sec [total], {} items/sec [current interval]{})",
        count, throughput.total as u64, throughput.interval as u64, user
    )
}

/// Elapsed-time fragment of a final line, e.g. `done in 1.25s`.
pub fn elapsed_text(elapsed: Duration) -> String {
    format!("done in {:.2}s", elapsed.as_secs_f64())
}

/// Count and rate fragment of a final line.
pub fn summary_text(count: u64, total_rate: f64, user: &str) -> String {
    format!(
        "{:>15} complete ({} items/sec [total]{})",
        count, total_rate as u64, user
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_zero_elapsed_is_zero() {
        assert_eq!(rate(10, 0.0), 0.0);
        assert_eq!(rate(0, 0.0), 0.0);
        assert_eq!(rate(10, 2.0), 5.0);
    }

    #[test]
    fn test_first_pulse_with_frozen_clock_does_not_fault() {
        let clock = Arc::new(ManualClock::new());
        let stats = Stats::new(clock);
        let tp = stats.throughput(1, 1);
        assert_eq!(tp.total, 0.0);
        assert_eq!(tp.interval, 0.0);
    }

    #[test]
    fn test_interval_window_resets_on_repaint() {
        let clock = Arc::new(ManualClock::new());
        let mut stats = Stats::new(clock.clone());

        clock.advance(Duration::from_secs(4));
        assert_eq!(stats.interval_rate(8), 2.0);

        stats.mark_repaint();
        clock.advance(Duration::from_secs(1));
        assert_eq!(stats.interval_rate(8), 8.0);
        // total window is untouched by the repaint
        assert_eq!(stats.total_rate(16), 16.0 / 5.0);
    }

    #[test]
    fn test_summary_uses_total_window() {
        let clock = Arc::new(ManualClock::new());
        let mut stats = Stats::new(clock.clone());
        clock.advance(Duration::from_secs(9));
        stats.mark_repaint();
        clock.advance(Duration::from_secs(1));

        let summary = stats.summary("[t]", Some(20));
        assert_eq!(summary.elapsed, Duration::from_secs(10));
        assert_eq!(summary.total_rate, 2.0);
        assert_eq!(summary.count, Some(20));

        let no_count = stats.summary("[s]", None);
        assert_eq!(no_count.total_rate, 0.0);
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn test_status_text_layout() {
        let text = status_text(
            42,
            Throughput {
                total: 10.9,
                interval: 3.2,
            },
            " | ok",
        );
        assert_eq!(
            text,
            "             42 complete (10 items/sec [total], 3 items/sec [current interval] | ok)"
        );
    }

    #[test]
    fn test_final_fragments() {
        assert_eq!(elapsed_text(Duration::from_millis(1250)), "done in 1.25s");
        assert!(summary_text(7, 3.9, "").ends_with("7 complete (3 items/sec [total])"));
    }
}
