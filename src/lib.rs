#![warn(missing_docs)]
#![doc(html_root_url = "https://docs.rs/pulse-widgets/")]

//! # pulse-widgets
//!
//! Live, single-line status widgets for long-running batch jobs. Each widget
//! owns one terminal line and rewrites it in place as work advances, without
//! flooding the terminal: repaints are throttled to an interval and every
//! repaint reports throughput over two windows, the run so far and the
//! interval since the previous repaint.
//!
//! ## Widgets
//!
//! | Widget | Driven by | Shows |
//! |--------|-----------|-------|
//! | [`Gauge`] | `pulse()` against a known limit | filled bar |
//! | [`Counter`] | `pulse()` with no known total | rotating frame |
//! | [`Spinner`] | its own timer task | rotating frame |
//!
//! All three follow the same lifecycle: construct (draws the initial line),
//! make progress, then `complete()` (draws the final line and returns a
//! [`Summary`]). `complete` takes the widget by value, so a completed widget
//! cannot be pulsed or completed again.
//!
//! ## Quick Start
//!
//! ```rust
//! use pulse_widgets::prelude::*;
//! use std::sync::Arc;
//!
//! let recorder = Arc::new(RecordingRenderer::new());
//! let mut gauge = gauge_new(
//!     "[copy]",
//!     &[gauge::with_limit(1_000), gauge::with_renderer(recorder.clone())],
//! )
//! .unwrap();
//!
//! for _ in 0..1_000 {
//!     gauge.pulse();
//! }
//! let summary = gauge.complete();
//! assert_eq!(summary.count, Some(1_000));
//! ```
//!
//! ## Rendering
//!
//! Widgets draw through a [`line::LineRenderer`]. By default they share one
//! [`line::TerminalRenderer`] on standard error, which rewrites earlier rows
//! with cursor movement on a TTY and appends plain lines otherwise. Tests and
//! embedding applications can pass a [`line::RecordingRenderer`] instead.
//!
//! ## Logging
//!
//! The crate emits `tracing` events (construction and completion at `debug`,
//! each repaint at `trace`, failed repaints at `warn`) and never installs a
//! subscriber itself.

pub mod counter;
pub mod error;
pub mod frames;
pub mod gauge;
pub mod line;
pub mod spinner;
pub mod stats;
pub mod theme;

pub use counter::{new as counter_new, Counter, CounterOption};
pub use error::{Error, Result};
pub use frames::{Frames, DOT, LINE, METER, MINI_DOT, POINTS, PULSE};
pub use gauge::{new as gauge_new, Gauge, GaugeOption};
pub use line::{LineHandle, LineId, LineRenderer, RecordingRenderer, TerminalRenderer};
pub use spinner::{new as spinner_new, Spinner, SpinnerOption, SpinnerState};
pub use stats::{Clock, ManualClock, Summary, SystemClock};
pub use theme::{Theme, ThemeConfig};

/// Widgets that advance one item at a time.
///
/// Implemented by [`Gauge`] and [`Counter`]. A [`Spinner`] is driven by time
/// and has no notion of a pulse.
pub trait Pulse {
    /// Records one processed item, repainting when the interval is reached.
    fn pulse(&mut self);

    /// Items recorded so far.
    fn count(&self) -> u64;
}

impl Pulse for Gauge {
    fn pulse(&mut self) {
        Gauge::pulse(self);
    }

    fn count(&self) -> u64 {
        Gauge::count(self)
    }
}

impl Pulse for Counter {
    fn pulse(&mut self) {
        Counter::pulse(self);
    }

    fn count(&self) -> u64 {
        Counter::count(self)
    }
}

/// Any of the three widgets, for callers that hold them together.
#[derive(Debug)]
pub enum Widget {
    /// A bounded progress bar.
    Gauge(Gauge),
    /// An unbounded item counter.
    Counter(Counter),
    /// A time-driven spinner.
    Spinner(Spinner),
}

impl Widget {
    /// The widget label.
    pub fn tag(&self) -> &str {
        match self {
            Widget::Gauge(g) => g.tag(),
            Widget::Counter(c) => c.tag(),
            Widget::Spinner(s) => s.tag(),
        }
    }

    /// The pulse capability, if this widget has one.
    pub fn as_pulse(&mut self) -> Option<&mut dyn Pulse> {
        match self {
            Widget::Gauge(g) => Some(g),
            Widget::Counter(c) => Some(c),
            Widget::Spinner(_) => None,
        }
    }

    /// Completes whichever widget is held.
    pub fn complete(self) -> Summary {
        match self {
            Widget::Gauge(g) => g.complete(),
            Widget::Counter(c) => c.complete(),
            Widget::Spinner(s) => s.complete(),
        }
    }
}

impl From<Gauge> for Widget {
    fn from(g: Gauge) -> Self {
        Widget::Gauge(g)
    }
}

impl From<Counter> for Widget {
    fn from(c: Counter) -> Self {
        Widget::Counter(c)
    }
}

impl From<Spinner> for Widget {
    fn from(s: Spinner) -> Self {
        Widget::Spinner(s)
    }
}

/// Prelude module for convenient imports.
///
/// ```rust
/// use pulse_widgets::prelude::*;
///
/// fn drain(widget: &mut dyn Pulse, items: usize) {
///     for _ in 0..items {
///         widget.pulse();
///     }
/// }
/// ```
pub mod prelude {
    pub use crate::counter::{self, new as counter_new, Counter, CounterOption};
    pub use crate::error::{Error, Result};
    pub use crate::frames::{Frames, DOT, LINE, METER, MINI_DOT, POINTS, PULSE};
    pub use crate::gauge::{self, new as gauge_new, Gauge, GaugeOption};
    pub use crate::line::{LineHandle, LineId, LineRenderer, RecordingRenderer, TerminalRenderer};
    pub use crate::spinner::{self, new as spinner_new, Spinner, SpinnerOption, SpinnerState};
    pub use crate::stats::{Clock, ManualClock, Summary, SystemClock};
    pub use crate::theme::{Role, Theme, ThemeConfig};
    pub use crate::{Pulse, Widget};
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn widgets(recorder: &Arc<RecordingRenderer>) -> Vec<Widget> {
        let gauge = gauge::new(
            "[gauge]",
            &[
                gauge::with_limit(20),
                gauge::with_renderer(recorder.clone()),
                gauge::with_theme(Theme::plain()),
            ],
        )
        .unwrap();
        let counter = counter::new(
            "[counter]",
            &[
                counter::with_interval(5),
                counter::with_renderer(recorder.clone()),
                counter::with_theme(Theme::plain()),
            ],
        )
        .unwrap();
        vec![gauge.into(), counter.into()]
    }

    #[test]
    fn test_pulse_through_trait_object() {
        let recorder = Arc::new(RecordingRenderer::new());
        let mut all = widgets(&recorder);
        for widget in all.iter_mut() {
            let pulse = widget.as_pulse().unwrap();
            for _ in 0..10 {
                pulse.pulse();
            }
            assert_eq!(pulse.count(), 10);
        }

        let tags: Vec<String> = all.iter().map(|w| w.tag().to_string()).collect();
        assert_eq!(tags, vec!["[gauge]", "[counter]"]);

        let summaries: Vec<Summary> = all.into_iter().map(Widget::complete).collect();
        assert!(summaries.iter().all(|s| s.count == Some(10)));
        assert_eq!(recorder.line_count(), 2);
    }

    #[test]
    fn test_widgets_share_renderer_lines() {
        let recorder = Arc::new(RecordingRenderer::new());
        let mut all = widgets(&recorder);
        if let Some(pulse) = all[1].as_pulse() {
            for _ in 0..5 {
                pulse.pulse();
            }
        }
        // only the counter's line moved
        assert_eq!(recorder.update_count(LineId(0)), 0);
        assert_eq!(recorder.update_count(LineId(1)), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spinner_has_no_pulse() {
        let recorder = Arc::new(RecordingRenderer::new());
        let spinner = spinner::new(
            "[spin]",
            "working",
            &[
                spinner::with_interval(Duration::from_millis(100)),
                spinner::with_renderer(recorder.clone()),
            ],
        )
        .unwrap();
        let mut widget = Widget::from(spinner);
        assert!(widget.as_pulse().is_none());
        assert_eq!(widget.tag(), "[spin]");

        let summary = widget.complete();
        assert_eq!(summary.tag, "[spin]");
        assert_eq!(summary.count, None);
    }
}
