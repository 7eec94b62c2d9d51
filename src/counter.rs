//! Unbounded progress counter.
//!
//! Like a gauge without a target: every `update_interval` pulses the line is
//! rewritten with the next animation frame, the count and both rates.
//!
//! ```rust
//! use pulse_widgets::counter::{new, with_interval, with_renderer};
//! use pulse_widgets::line::RecordingRenderer;
//! use std::sync::Arc;
//!
//! let recorder = Arc::new(RecordingRenderer::new());
//! let mut counter = new("[lines]", &[with_interval(500), with_renderer(recorder)]).unwrap();
//! for _ in 0..1_200 {
//!     counter.pulse();
//! }
//! assert_eq!(counter.repaints(), 2);
//! counter.complete();
//! ```

use crate::error::{Error, Result};
use crate::frames::Frames;
use crate::line::{stderr_renderer, LineHandle, LineRenderer};
use crate::stats::{
    elapsed_text, no_user_text, status_text, summary_text, Clock, Stats, Summary, SystemClock,
    UserText,
};
use crate::theme::{Role, Theme};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

const DEFAULT_INTERVAL: u64 = 10_000;
const DONE_GLYPH: &str = "✔";

/// Configuration options for [`new`].
pub enum CounterOption {
    /// Pulses between repaints.
    WithInterval(u64),
    /// Animation frames.
    WithFrames(Frames),
    /// Trailing status text.
    WithUserText(UserText),
    /// Styles for each role.
    WithTheme(Box<Theme>),
    /// Time source for rates.
    WithClock(Arc<dyn Clock>),
    /// Surface to draw on.
    WithRenderer(Arc<dyn LineRenderer>),
}

struct Settings {
    interval: u64,
    frames: Frames,
    user_text: UserText,
    theme: Theme,
    clock: Arc<dyn Clock>,
    renderer: Arc<dyn LineRenderer>,
}

impl CounterOption {
    fn apply(&self, s: &mut Settings) {
        match self {
            CounterOption::WithInterval(interval) => s.interval = *interval,
            CounterOption::WithFrames(frames) => s.frames = frames.clone(),
            CounterOption::WithUserText(text) => s.user_text = text.clone(),
            CounterOption::WithTheme(theme) => s.theme = theme.as_ref().clone(),
            CounterOption::WithClock(clock) => s.clock = clock.clone(),
            CounterOption::WithRenderer(renderer) => s.renderer = renderer.clone(),
        }
    }
}

/// Repaints every `interval` pulses.
///
/// # Arguments
///
/// * `interval` - Pulses between repaints; defaults to 10 000. Must be non-zero.
///
/// # Examples
///
/// ```rust
/// use pulse_widgets::counter::{new, with_interval, with_renderer};
/// use pulse_widgets::line::RecordingRenderer;
/// use std::sync::Arc;
///
/// let recorder = Arc::new(RecordingRenderer::new());
/// let mut counter = new("[c]", &[with_interval(3), with_renderer(recorder.clone())]).unwrap();
/// for _ in 0..7 {
///     counter.pulse();
/// }
/// assert_eq!(counter.repaints(), 2);
/// ```
pub fn with_interval(interval: u64) -> CounterOption {
    CounterOption::WithInterval(interval)
}

/// Cycles through `frames` instead of [`crate::frames::LINE`].
///
/// # Examples
///
/// ```rust
/// use pulse_widgets::counter::with_frames;
/// use pulse_widgets::frames::{Frames, DOT};
///
/// let predefined = with_frames(DOT.clone());
/// let custom = with_frames(Frames::new([".", "o", "O", "o"]));
/// ```
pub fn with_frames(frames: Frames) -> CounterOption {
    CounterOption::WithFrames(frames)
}

/// Appends caller text to every repaint.
///
/// The closure runs on every repaint and on completion, so it should be
/// cheap.
///
/// # Examples
///
/// ```rust
/// use pulse_widgets::counter::with_user_text;
/// use std::sync::atomic::{AtomicU64, Ordering};
/// use std::sync::Arc;
///
/// let bytes = Arc::new(AtomicU64::new(0));
/// let seen = bytes.clone();
/// let opt = with_user_text(move || format!(", {} bytes", seen.load(Ordering::Relaxed)));
/// ```
pub fn with_user_text<F>(f: F) -> CounterOption
where
    F: Fn() -> String + Send + Sync + 'static,
{
    CounterOption::WithUserText(Arc::new(f))
}

/// Styles the line with `theme`.
pub fn with_theme(theme: Theme) -> CounterOption {
    CounterOption::WithTheme(Box::new(theme))
}

/// Measures elapsed time with `clock`.
pub fn with_clock(clock: Arc<dyn Clock>) -> CounterOption {
    CounterOption::WithClock(clock)
}

/// Draws on `renderer` instead of standard error.
pub fn with_renderer(renderer: Arc<dyn LineRenderer>) -> CounterOption {
    CounterOption::WithRenderer(renderer)
}

/// A live item counter bound to one line of a renderer.
pub struct Counter {
    tag: String,
    update_interval: u64,
    count: u64,
    repaints: u64,
    frames: Frames,
    user_text: UserText,
    theme: Theme,
    stats: Stats,
    line: LineHandle,
}

/// Creates a counter and draws its initial line.
///
/// # Arguments
///
/// * `tag` - Label shown at the start of the line
/// * `opts` - Configuration options, applied in order
///
/// # Errors
///
/// Fails on a zero interval, an empty frame set, or when the renderer cannot
/// create the line.
///
/// # Examples
///
/// ```rust
/// use pulse_widgets::counter::{new, with_renderer, with_theme};
/// use pulse_widgets::line::RecordingRenderer;
/// use pulse_widgets::theme::Theme;
/// use std::sync::Arc;
///
/// let recorder = Arc::new(RecordingRenderer::new());
/// let counter = new(
///     "[scan]",
///     &[with_theme(Theme::plain()), with_renderer(recorder.clone())],
/// )
/// .unwrap();
/// assert_eq!(counter.update_interval(), 10_000);
/// assert_eq!(
///     recorder.events()[0].text(),
///     "[scan] [-] starting..."
/// );
/// ```
pub fn new(tag: impl Into<String>, opts: &[CounterOption]) -> Result<Counter> {
    let tag = tag.into();
    let mut s = Settings {
        interval: DEFAULT_INTERVAL,
        frames: Frames::default(),
        user_text: no_user_text(),
        theme: Theme::default(),
        clock: Arc::new(SystemClock),
        renderer: stderr_renderer(),
    };
    for opt in opts {
        opt.apply(&mut s);
    }

    if s.interval == 0 {
        return Err(Error::InvalidInterval {
            interval: s.interval,
        });
    }
    if s.frames.is_empty() {
        return Err(Error::EmptyFrames { tag });
    }

    let initial = format!(
        "{} {} starting...",
        s.theme.paint(Role::Tag, &tag),
        s.theme.paint(Role::Progress, &format!("[{}]", s.frames.get(0)))
    );
    let line = LineHandle::create(s.renderer, &initial)?;
    debug!(tag = %tag, update_interval = s.interval, "counter started");

    Ok(Counter {
        tag,
        update_interval: s.interval,
        count: 0,
        repaints: 0,
        frames: s.frames,
        user_text: s.user_text,
        theme: s.theme,
        stats: Stats::new(s.clock),
        line,
    })
}

impl Counter {
    /// Records one processed item.
    pub fn pulse(&mut self) {
        self.count += 1;
        if self.count % self.update_interval == 0 {
            self.repaint();
        }
    }

    /// Draws the done marker with total figures and returns them.
    pub fn complete(mut self) -> Summary {
        let summary = self.stats.summary(&self.tag, Some(self.count));
        let user = self.user_fragment();
        let text = format!(
            "{} {} {} {}",
            self.theme.paint(Role::Tag, &self.tag),
            self.theme
                .paint(Role::Complete, &format!("[{DONE_GLYPH}]")),
            summary_text(self.count, summary.total_rate, &user),
            self.theme.paint(Role::Time, &elapsed_text(summary.elapsed))
        );
        self.draw(&text);
        debug!(tag = %self.tag, count = self.count, rate = summary.total_rate, "counter complete");
        summary
    }

    /// Index of the frame shown by the latest repaint.
    pub fn frame(&self) -> usize {
        ((self.count / self.update_interval) % self.frames.len() as u64) as usize
    }

    fn repaint(&mut self) {
        let throughput = self.stats.throughput(self.count, self.update_interval);
        let user = self.user_fragment();
        let text = format!(
            "{} {} {}",
            self.theme.paint(Role::Tag, &self.tag),
            self.theme
                .paint(Role::Progress, &format!("[{}]", self.frames.get(self.frame()))),
            status_text(self.count, throughput, &user)
        );
        self.draw(&text);
        self.stats.mark_repaint();
    }

    fn draw(&mut self, text: &str) {
        self.repaints += 1;
        trace!(tag = %self.tag, count = self.count, "counter repaint");
        if let Err(err) = self.line.update(text) {
            warn!(tag = %self.tag, error = %err, "counter repaint failed");
        }
    }

    fn user_fragment(&self) -> String {
        self.theme.paint(Role::User, &(self.user_text)())
    }

    /// The counter label.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Pulses received so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Pulses between repaints.
    pub fn update_interval(&self) -> u64 {
        self.update_interval
    }

    /// Repaints issued after the initial line.
    pub fn repaints(&self) -> u64 {
        self.repaints
    }
}

impl fmt::Debug for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Counter")
            .field("tag", &self.tag)
            .field("update_interval", &self.update_interval)
            .field("count", &self.count)
            .field("repaints", &self.repaints)
            .field("frames", &self.frames.len())
            .field("line", &self.line.id())
            .finish()
    }
}
