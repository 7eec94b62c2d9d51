//! Time-driven activity spinner.
//!
//! A spinner has no unit of work. Once built it repaints itself on a fixed
//! cadence from a tokio task, advancing one frame per tick, until
//! [`Spinner::complete`] stops the task and draws the final line.
//!
//! # Basic Usage
//!
//! ```rust
//! use pulse_widgets::spinner::{new, with_interval, with_renderer};
//! use pulse_widgets::line::RecordingRenderer;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let recorder = Arc::new(RecordingRenderer::new());
//! let spinner = new(
//!     "[sync]",
//!     "waiting for the index lock",
//!     &[with_interval(Duration::from_millis(100)), with_renderer(recorder)],
//! )
//! .unwrap();
//!
//! // ... do the slow thing ...
//!
//! let summary = spinner.complete();
//! assert_eq!(summary.count, None);
//! # }
//! ```
//!
//! # Lifecycle
//!
//! The timer task is owned by the [`Spinner`]. Completing the spinner stops it
//! before the final line is drawn, and a tick that races with completion sees
//! the completed state under the shared lock and draws nothing. Dropping a
//! spinner without completing it also stops the task, leaving the last frame
//! on screen.

use crate::error::{Error, Result};
use crate::frames::Frames;
use crate::line::{stderr_renderer, LineHandle, LineRenderer};
use crate::stats::{elapsed_text, Clock, Stats, Summary, SystemClock};
use crate::theme::{Role, Theme};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace, warn};

const DEFAULT_INTERVAL: Duration = Duration::from_millis(300);
const DONE_GLYPH: &str = "✔";

/// Whether the spinner is still animating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinnerState {
    /// The timer task is repainting.
    Running,
    /// `complete()` has run; no further repaints happen.
    Completed,
}

#[derive(Debug)]
struct Shared {
    state: SpinnerState,
    frame: usize,
    repaints: u64,
}

/// Configuration options for [`new`].
pub enum SpinnerOption {
    /// Time between autonomous repaints.
    WithInterval(Duration),
    /// Animation frames.
    WithFrames(Frames),
    /// Styles for each role.
    WithTheme(Box<Theme>),
    /// Time source for the final elapsed figure.
    WithClock(Arc<dyn Clock>),
    /// Surface to draw on.
    WithRenderer(Arc<dyn LineRenderer>),
}

struct Settings {
    interval: Duration,
    frames: Frames,
    theme: Theme,
    clock: Arc<dyn Clock>,
    renderer: Arc<dyn LineRenderer>,
}

impl SpinnerOption {
    fn apply(&self, s: &mut Settings) {
        match self {
            SpinnerOption::WithInterval(interval) => s.interval = *interval,
            SpinnerOption::WithFrames(frames) => s.frames = frames.clone(),
            SpinnerOption::WithTheme(theme) => s.theme = theme.as_ref().clone(),
            SpinnerOption::WithClock(clock) => s.clock = clock.clone(),
            SpinnerOption::WithRenderer(renderer) => s.renderer = renderer.clone(),
        }
    }
}

/// Repaints every `interval`; defaults to 300 ms.
///
/// # Arguments
///
/// * `interval` - Time between repaints. Must be non-zero.
///
/// # Examples
///
/// ```rust
/// use pulse_widgets::spinner::{new, with_interval, with_renderer};
/// use pulse_widgets::line::RecordingRenderer;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let recorder = Arc::new(RecordingRenderer::new());
/// let spinner = new(
///     "[poll]",
///     "waiting",
///     &[with_interval(Duration::from_millis(80)), with_renderer(recorder)],
/// )
/// .unwrap();
/// assert_eq!(spinner.interval(), Duration::from_millis(80));
/// # }
/// ```
pub fn with_interval(interval: Duration) -> SpinnerOption {
    SpinnerOption::WithInterval(interval)
}

/// Cycles through `frames` instead of [`crate::frames::LINE`].
///
/// # Examples
///
/// ```rust
/// use pulse_widgets::frames::{Frames, MINI_DOT};
/// use pulse_widgets::spinner::with_frames;
///
/// let predefined = with_frames(MINI_DOT.clone());
/// let custom = with_frames(Frames::new(["◐", "◓", "◑", "◒"]));
/// ```
pub fn with_frames(frames: Frames) -> SpinnerOption {
    SpinnerOption::WithFrames(frames)
}

/// Styles the line with `theme`.
///
/// # Examples
///
/// ```rust
/// use pulse_widgets::spinner::with_theme;
/// use pulse_widgets::theme::Theme;
///
/// // no colours, e.g. when output is captured to a file
/// let opt = with_theme(Theme::plain());
/// ```
pub fn with_theme(theme: Theme) -> SpinnerOption {
    SpinnerOption::WithTheme(Box::new(theme))
}

/// Measures the final elapsed time with `clock`.
///
/// Only the elapsed figure on the final line uses it; the repaint cadence
/// always follows the tokio timer.
///
/// # Examples
///
/// ```rust
/// use pulse_widgets::spinner::with_clock;
/// use pulse_widgets::stats::ManualClock;
/// use std::sync::Arc;
///
/// let clock = Arc::new(ManualClock::new());
/// let opt = with_clock(clock.clone());
/// ```
pub fn with_clock(clock: Arc<dyn Clock>) -> SpinnerOption {
    SpinnerOption::WithClock(clock)
}

/// Draws on `renderer` instead of standard error.
///
/// # Examples
///
/// ```rust
/// use pulse_widgets::line::RecordingRenderer;
/// use pulse_widgets::spinner::with_renderer;
/// use std::sync::Arc;
///
/// let recorder = Arc::new(RecordingRenderer::new());
/// let opt = with_renderer(recorder.clone());
/// ```
pub fn with_renderer(renderer: Arc<dyn LineRenderer>) -> SpinnerOption {
    SpinnerOption::WithRenderer(renderer)
}

/// A self-driving spinner bound to one line of a renderer.
pub struct Spinner {
    tag: String,
    text: String,
    interval: Duration,
    theme: Theme,
    stats: Stats,
    line: LineHandle,
    shared: Arc<Mutex<Shared>>,
    task: Option<JoinHandle<()>>,
}

/// Creates a spinner, draws its first frame and starts the timer.
///
/// The timer task is spawned on the current tokio runtime, so this must be
/// called from within one.
///
/// # Arguments
///
/// * `tag` - Label shown at the start of the line
/// * `text` - Fixed text shown after the frame
/// * `opts` - Configuration options, applied in order
///
/// # Errors
///
/// Fails on a zero interval or empty frame set, outside of a tokio runtime,
/// or when the renderer cannot create the line.
///
/// # Examples
///
/// ```rust
/// use pulse_widgets::spinner::{new, with_renderer};
/// use pulse_widgets::line::RecordingRenderer;
/// use pulse_widgets::Error;
/// use std::sync::Arc;
///
/// let recorder = Arc::new(RecordingRenderer::new());
///
/// // no runtime here
/// let err = new("[s]", "waiting", &[with_renderer(recorder.clone())]).unwrap_err();
/// assert!(matches!(err, Error::NoRuntime { .. }));
///
/// let rt = tokio::runtime::Builder::new_current_thread()
///     .enable_time()
///     .build()
///     .unwrap();
/// rt.block_on(async {
///     let spinner = new("[s]", "waiting", &[with_renderer(recorder.clone())]).unwrap();
///     spinner.complete();
/// });
/// ```
pub fn new(tag: impl Into<String>, text: impl Into<String>, opts: &[SpinnerOption]) -> Result<Spinner> {
    let tag = tag.into();
    let text = text.into();
    let mut s = Settings {
        interval: DEFAULT_INTERVAL,
        frames: Frames::default(),
        theme: Theme::default(),
        clock: Arc::new(SystemClock),
        renderer: stderr_renderer(),
    };
    for opt in opts {
        opt.apply(&mut s);
    }

    if s.interval.is_zero() {
        return Err(Error::InvalidInterval { interval: 0 });
    }
    if s.frames.is_empty() {
        return Err(Error::EmptyFrames { tag });
    }
    let Ok(runtime) = Handle::try_current() else {
        return Err(Error::NoRuntime { tag });
    };

    // The task only needs finished strings, one per frame.
    let prefix = s.theme.paint(Role::Tag, &tag);
    let suffix = s.theme.paint(Role::User, &text);
    let lines: Vec<String> = (0..s.frames.len())
        .map(|i| {
            let frame = s.theme.paint(Role::Progress, &format!("[{}]", s.frames.get(i)));
            format!("{prefix} {frame} {suffix}")
        })
        .collect();

    let line = LineHandle::create(s.renderer, &lines[0])?;
    let shared = Arc::new(Mutex::new(Shared {
        state: SpinnerState::Running,
        frame: 0,
        repaints: 0,
    }));

    let task = runtime.spawn(tick_loop(
        s.interval,
        lines,
        line.clone(),
        shared.clone(),
        tag.clone(),
    ));
    debug!(tag = %tag, interval = ?s.interval, "spinner started");

    Ok(Spinner {
        tag,
        text,
        interval: s.interval,
        theme: s.theme,
        stats: Stats::new(s.clock),
        line,
        shared,
        task: Some(task),
    })
}

async fn tick_loop(
    interval: Duration,
    lines: Vec<String>,
    line: LineHandle,
    shared: Arc<Mutex<Shared>>,
    tag: String,
) {
    let start = tokio::time::Instant::now() + interval;
    let mut ticker = tokio::time::interval_at(start, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let mut shared = shared.lock();
        if shared.state == SpinnerState::Completed {
            break;
        }
        shared.frame = (shared.frame + 1) % lines.len();
        shared.repaints += 1;
        trace!(tag = %tag, frame = shared.frame, "spinner tick");
        if let Err(err) = line.update(&lines[shared.frame]) {
            warn!(tag = %tag, error = %err, "spinner repaint failed");
        }
    }
}

impl Spinner {
    /// Stops the timer and draws the final line with the total elapsed time.
    pub fn complete(mut self) -> Summary {
        let mut shared = self.shared.lock();
        shared.state = SpinnerState::Completed;
        if let Some(task) = self.task.take() {
            task.abort();
        }

        let summary = self.stats.summary(&self.tag, None);
        let text = format!(
            "{} {} {} {}",
            self.theme.paint(Role::Tag, &self.tag),
            self.theme.paint(Role::Complete, &format!("[{DONE_GLYPH}]")),
            self.theme.paint(Role::User, &self.text),
            self.theme.paint(Role::Time, &elapsed_text(summary.elapsed))
        );
        if let Err(err) = self.line.update(&text) {
            warn!(tag = %self.tag, error = %err, "spinner final repaint failed");
        }
        debug!(tag = %self.tag, elapsed = ?summary.elapsed, ticks = shared.repaints, "spinner complete");
        drop(shared);
        summary
    }

    /// The spinner label.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The fixed text shown next to the frame.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Time between repaints.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Index of the frame currently on screen.
    pub fn frame(&self) -> usize {
        self.shared.lock().frame
    }

    /// Timer repaints so far, excluding the initial and final lines.
    pub fn repaints(&self) -> u64 {
        self.shared.lock().repaints
    }

    /// Lifecycle state as seen by the timer task.
    ///
    /// A live handle always reports [`SpinnerState::Running`]: both ways of
    /// reaching [`SpinnerState::Completed`] (`complete` and drop) consume the
    /// spinner. This is mostly useful as a debugging view.
    pub fn state(&self) -> SpinnerState {
        self.shared.lock().state
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            self.shared.lock().state = SpinnerState::Completed;
            task.abort();
            debug!(tag = %self.tag, "spinner dropped without complete");
        }
    }
}

impl fmt::Debug for Spinner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spinner")
            .field("tag", &self.tag)
            .field("text", &self.text)
            .field("interval", &self.interval)
            .field("shared", &*self.shared.lock())
            .field("line", &self.line.id())
            .finish()
    }
}
