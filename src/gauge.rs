//! Bounded progress gauge.
//!
//! A gauge knows how many items the batch will process (`limit`) and draws a
//! bar proportional to completion. Repaints are throttled by count: the line
//! is only rewritten when the pulse count hits a multiple of the update
//! interval, so calling [`Gauge::pulse`] in a hot loop stays cheap.
//!
//! # Basic Usage
//!
//! ```rust
//! use pulse_widgets::gauge::{new, with_limit, with_renderer};
//! use pulse_widgets::line::RecordingRenderer;
//! use std::sync::Arc;
//!
//! let recorder = Arc::new(RecordingRenderer::new());
//! let mut gauge = new("[rows]", &[with_limit(1_000), with_renderer(recorder.clone())]).unwrap();
//!
//! // at most 10 repaints over the whole run
//! assert_eq!(gauge.update_interval(), 100);
//!
//! for _ in 0..1_000 {
//!     gauge.pulse();
//! }
//! let summary = gauge.complete();
//! assert_eq!(summary.count, Some(1_000));
//! ```
//!
//! # Unknown totals
//!
//! A `limit` of zero means the total is not known. The bar is then drawn
//! empty with zero width and no fill is computed; the status text still
//! reports counts and rates, so the gauge behaves like a counter.

use crate::error::{Error, Result};
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
const DEFAULT_WIDTH: usize = 30;
const MIN_REPAINTS: u64 = 10;

/// Configuration options for [`new`].
pub enum GaugeOption {
    /// Target number of pulses; `0` for an unknown total.
    WithLimit(u64),
    /// Upper bound on pulses between repaints.
    WithInterval(u64),
    /// Upper bound on bar width in characters.
    WithWidth(usize),
    /// Characters for filled and empty cells.
    WithFillCharacters(char, char),
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
    limit: u64,
    interval: u64,
    width: usize,
    full: char,
    empty: char,
    user_text: UserText,
    theme: Theme,
    clock: Arc<dyn Clock>,
    renderer: Arc<dyn LineRenderer>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            limit: 0,
            interval: DEFAULT_INTERVAL,
            width: DEFAULT_WIDTH,
            full: '=',
            empty: ' ',
            user_text: no_user_text(),
            theme: Theme::default(),
            clock: Arc::new(SystemClock),
            renderer: stderr_renderer(),
        }
    }
}

impl GaugeOption {
    fn apply(&self, s: &mut Settings) {
        match self {
            GaugeOption::WithLimit(limit) => s.limit = *limit,
            GaugeOption::WithInterval(interval) => s.interval = *interval,
            GaugeOption::WithWidth(width) => s.width = *width,
            GaugeOption::WithFillCharacters(full, empty) => {
                s.full = *full;
                s.empty = *empty;
            }
            GaugeOption::WithUserText(text) => s.user_text = text.clone(),
            GaugeOption::WithTheme(theme) => s.theme = theme.as_ref().clone(),
            GaugeOption::WithClock(clock) => s.clock = clock.clone(),
            GaugeOption::WithRenderer(renderer) => s.renderer = renderer.clone(),
        }
    }
}

/// Sets the number of pulses that makes the run complete.
///
/// A limit of zero means the total is unknown: the bar stays empty and only
/// the counts and rates move.
///
/// # Arguments
///
/// * `limit` - Expected total number of pulses
///
/// # Examples
///
/// ```rust
/// use pulse_widgets::gauge::{new, with_limit, with_renderer};
/// use pulse_widgets::line::RecordingRenderer;
/// use std::sync::Arc;
///
/// let recorder = Arc::new(RecordingRenderer::new());
/// let gauge = new("[rows]", &[with_limit(5_000), with_renderer(recorder)]).unwrap();
/// assert_eq!(gauge.limit(), 5_000);
/// assert_eq!(gauge.update_interval(), 500);
/// ```
pub fn with_limit(limit: u64) -> GaugeOption {
    GaugeOption::WithLimit(limit)
}

/// Caps the pulses between repaints. The gauge may repaint more often for
/// small limits so that a run shows at least ten updates.
///
/// # Examples
///
/// ```rust
/// use pulse_widgets::gauge::{new, with_interval, with_limit, with_renderer};
/// use pulse_widgets::line::RecordingRenderer;
/// use std::sync::Arc;
///
/// let recorder = Arc::new(RecordingRenderer::new());
/// let opts = [with_limit(1_000), with_interval(50), with_renderer(recorder)];
/// assert_eq!(new("[t]", &opts).unwrap().update_interval(), 50);
/// ```
pub fn with_interval(interval: u64) -> GaugeOption {
    GaugeOption::WithInterval(interval)
}

/// Caps the bar width. The bar is never wider than `limit`.
///
/// # Examples
///
/// ```rust
/// use pulse_widgets::gauge::{new, with_limit, with_renderer, with_width};
/// use pulse_widgets::line::RecordingRenderer;
/// use std::sync::Arc;
///
/// let recorder = Arc::new(RecordingRenderer::new());
/// let gauge = new("[t]", &[with_limit(20), with_width(80), with_renderer(recorder)]).unwrap();
/// assert_eq!(gauge.width(), 20);
/// ```
pub fn with_width(width: usize) -> GaugeOption {
    GaugeOption::WithWidth(width)
}

/// Replaces the default `=` fill and blank empty cells.
///
/// # Arguments
///
/// * `full` - Character for completed cells
/// * `empty` - Character for remaining cells
///
/// # Examples
///
/// ```rust
/// use pulse_widgets::gauge::{new, with_fill_characters, with_limit, with_renderer, with_theme};
/// use pulse_widgets::line::RecordingRenderer;
/// use pulse_widgets::theme::Theme;
/// use std::sync::Arc;
///
/// let recorder = Arc::new(RecordingRenderer::new());
/// let mut gauge = new(
///     "[t]",
///     &[
///         with_limit(4),
///         with_fill_characters('#', '.'),
///         with_theme(Theme::plain()),
///         with_renderer(recorder.clone()),
///     ],
/// )
/// .unwrap();
/// gauge.pulse();
/// gauge.pulse();
/// assert!(recorder.events().last().unwrap().text().contains("[##..]"));
/// ```
pub fn with_fill_characters(full: char, empty: char) -> GaugeOption {
    GaugeOption::WithFillCharacters(full, empty)
}

/// Appends caller text to every repaint.
///
/// ```rust
/// use pulse_widgets::gauge::with_user_text;
///
/// let opt = with_user_text(|| ", 3 skipped".to_string());
/// ```
pub fn with_user_text<F>(f: F) -> GaugeOption
where
    F: Fn() -> String + Send + Sync + 'static,
{
    GaugeOption::WithUserText(Arc::new(f))
}

/// Styles the line with `theme`.
pub fn with_theme(theme: Theme) -> GaugeOption {
    GaugeOption::WithTheme(Box::new(theme))
}

/// Measures elapsed time with `clock`.
///
/// # Examples
///
/// ```rust
/// use pulse_widgets::gauge::{new, with_clock, with_limit, with_renderer};
/// use pulse_widgets::line::RecordingRenderer;
/// use pulse_widgets::stats::ManualClock;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let clock = Arc::new(ManualClock::new());
/// let recorder = Arc::new(RecordingRenderer::new());
/// let gauge = new(
///     "[t]",
///     &[with_limit(10), with_clock(clock.clone()), with_renderer(recorder)],
/// )
/// .unwrap();
/// clock.advance(Duration::from_secs(3));
/// assert_eq!(gauge.complete().elapsed, Duration::from_secs(3));
/// ```
pub fn with_clock(clock: Arc<dyn Clock>) -> GaugeOption {
    GaugeOption::WithClock(clock)
}

/// Draws on `renderer` instead of standard error.
pub fn with_renderer(renderer: Arc<dyn LineRenderer>) -> GaugeOption {
    GaugeOption::WithRenderer(renderer)
}

/// Pulses between repaints for a run of `limit` items.
///
/// Never more than `interval`, and small enough that a full run repaints at
/// least ten times. Always at least one.
pub fn update_interval_for(interval: u64, limit: u64) -> u64 {
    interval.min(limit.div_ceil(MIN_REPAINTS)).max(1)
}

/// Bar width for a run of `limit` items.
pub fn width_for(width: usize, limit: u64) -> usize {
    usize::try_from(limit).map_or(width, |limit| width.min(limit))
}

/// Filled cells for `count` out of `limit`, clamped to `width`.
///
/// Returns zero when `limit` is zero, since no proportion can be computed.
pub fn fill_for(count: u64, limit: u64, width: usize) -> usize {
    if limit == 0 {
        return 0;
    }
    let fill = (count as f64 / limit as f64 * width as f64).round() as usize;
    fill.min(width)
}

/// A live progress bar bound to one line of a renderer.
pub struct Gauge {
    tag: String,
    limit: u64,
    width: usize,
    update_interval: u64,
    count: u64,
    repaints: u64,
    full: char,
    empty: char,
    user_text: UserText,
    theme: Theme,
    stats: Stats,
    line: LineHandle,
}

/// Creates a gauge and draws its initial line.
///
/// # Errors
///
/// Fails on a zero interval or width, and when the renderer cannot create the
/// line.
///
/// ```rust
/// use pulse_widgets::gauge::{new, with_limit, with_renderer};
/// use pulse_widgets::line::RecordingRenderer;
/// use std::sync::Arc;
///
/// let recorder = Arc::new(RecordingRenderer::new());
/// let gauge = new("[t]", &[with_limit(10), with_renderer(recorder)]).unwrap();
/// assert_eq!(gauge.update_interval(), 1);
/// assert_eq!(gauge.width(), 10);
/// ```
pub fn new(tag: impl Into<String>, opts: &[GaugeOption]) -> Result<Gauge> {
    let tag = tag.into();
    let mut s = Settings::default();
    for opt in opts {
        opt.apply(&mut s);
    }

    if s.interval == 0 {
        return Err(Error::InvalidInterval {
            interval: s.interval,
        });
    }
    if s.width == 0 {
        return Err(Error::InvalidWidth { width: s.width });
    }

    let width = width_for(s.width, s.limit);
    let update_interval = update_interval_for(s.interval, s.limit);
    if s.limit == 0 {
        debug!(tag = %tag, "gauge has no limit, drawing an empty bar");
    }

    let initial = format!(
        "{} {}starting...",
        s.theme.paint(Role::Tag, &tag),
        bar(&s.theme, Role::Progress, 0, width, s.full, s.empty)
    );
    let line = LineHandle::create(s.renderer, &initial)?;
    debug!(tag = %tag, limit = s.limit, width, update_interval, "gauge started");

    Ok(Gauge {
        tag,
        limit: s.limit,
        width,
        update_interval,
        count: 0,
        repaints: 0,
        full: s.full,
        empty: s.empty,
        user_text: s.user_text,
        theme: s.theme,
        stats: Stats::new(s.clock),
        line,
    })
}

fn bar(theme: &Theme, role: Role, fill: usize, width: usize, full: char, empty: char) -> String {
    let filled: String = std::iter::repeat(full).take(fill).collect();
    let rest: String = std::iter::repeat(empty).take(width - fill).collect();
    format!("[{}{}] ", theme.paint(role, &filled), rest)
}

impl Gauge {
    /// Records one processed item, repainting when the count reaches a
    /// multiple of the update interval.
    pub fn pulse(&mut self) {
        self.count += 1;
        if self.count % self.update_interval == 0 {
            self.repaint();
        }
    }

    /// Draws the final line and returns the run's totals.
    ///
    /// The figures cover the whole run: total elapsed time and total rate,
    /// never the last interval.
    pub fn complete(mut self) -> Summary {
        let summary = self.stats.summary(&self.tag, Some(self.count));
        let user = self.user_fragment();
        let text = format!(
            "{} {}{} {}",
            self.theme.paint(Role::Tag, &self.tag),
            bar(
                &self.theme,
                Role::Complete,
                self.fill(),
                self.width,
                self.full,
                self.empty
            ),
            summary_text(self.count, summary.total_rate, &user),
            self.theme.paint(Role::Time, &elapsed_text(summary.elapsed))
        );
        self.draw(&text);
        debug!(
            tag = %self.tag,
            count = self.count,
            elapsed = ?summary.elapsed,
            rate = summary.total_rate,
            "gauge complete"
        );
        summary
    }

    fn repaint(&mut self) {
        let throughput = self.stats.throughput(self.count, self.update_interval);
        let user = self.user_fragment();
        let text = format!(
            "{} {}{}",
            self.theme.paint(Role::Tag, &self.tag),
            bar(
                &self.theme,
                Role::Progress,
                self.fill(),
                self.width,
                self.full,
                self.empty
            ),
            status_text(self.count, throughput, &user)
        );
        self.draw(&text);
        self.stats.mark_repaint();
    }

    fn draw(&mut self, text: &str) {
        self.repaints += 1;
        trace!(tag = %self.tag, count = self.count, "gauge repaint");
        if let Err(err) = self.line.update(text) {
            warn!(tag = %self.tag, error = %err, "gauge repaint failed");
        }
    }

    fn user_fragment(&self) -> String {
        self.theme.paint(Role::User, &(self.user_text)())
    }

    /// The gauge label.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Pulses received so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Target pulse count, `0` when unknown.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Effective bar width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Effective pulses between repaints.
    pub fn update_interval(&self) -> u64 {
        self.update_interval
    }

    /// Filled cells for the current count.
    pub fn fill(&self) -> usize {
        fill_for(self.count, self.limit, self.width)
    }

    /// Repaints issued after the initial line, including a failed one.
    pub fn repaints(&self) -> u64 {
        self.repaints
    }
}

impl fmt::Debug for Gauge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gauge")
            .field("tag", &self.tag)
            .field("limit", &self.limit)
            .field("width", &self.width)
            .field("update_interval", &self.update_interval)
            .field("count", &self.count)
            .field("repaints", &self.repaints)
            .field("line", &self.line.id())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::RecordingRenderer;
    use crate::stats::ManualClock;
    use proptest::prelude::*;
    use std::time::Duration;

    fn recorded(opts: Vec<GaugeOption>) -> (Gauge, Arc<RecordingRenderer>, Arc<ManualClock>) {
        let recorder = Arc::new(RecordingRenderer::new());
        let clock = Arc::new(ManualClock::new());
        let mut all = vec![
            with_renderer(recorder.clone()),
            with_clock(clock.clone()),
            with_theme(Theme::plain()),
        ];
        all.extend(opts);
        let gauge = new("[t]", &all).unwrap();
        (gauge, recorder, clock)
    }

    #[test]
    fn test_small_limit_scenario() {
        let (mut gauge, _, _) = recorded(vec![with_limit(10)]);
        assert_eq!(gauge.update_interval(), 1);
        assert_eq!(gauge.limit(), 10);
        assert_eq!(gauge.width(), 10);

        for i in 0..10 {
            gauge.pulse();
            assert_eq!(gauge.count(), i + 1);
        }
        // pulsing past the limit is tolerated
        gauge.pulse();
        assert_eq!(gauge.count(), 11);
        assert_eq!(gauge.fill(), 10);
    }

    #[test]
    fn test_update_interval_derivation() {
        assert_eq!(update_interval_for(10_000, 10), 1);
        assert_eq!(update_interval_for(10_000, 25), 3);
        assert_eq!(update_interval_for(10_000, 1_000), 100);
        assert_eq!(update_interval_for(7, 1_000), 7);
        assert_eq!(update_interval_for(10_000, 5), 1);
        assert_eq!(update_interval_for(10_000, 0), 1);
    }

    #[test]
    fn test_width_clamped_to_limit() {
        assert_eq!(width_for(30, 10), 10);
        assert_eq!(width_for(30, 100), 30);
        assert_eq!(width_for(30, 0), 0);
    }

    #[test]
    fn test_fill_values() {
        assert_eq!(fill_for(0, 10, 10), 0);
        assert_eq!(fill_for(5, 10, 10), 5);
        assert_eq!(fill_for(1, 3, 30), 10);
        assert_eq!(fill_for(50, 10, 10), 10);
        assert_eq!(fill_for(5, 0, 30), 0);
    }

    #[test]
    fn test_initial_line_shows_empty_bar() {
        let (gauge, recorder, _) = recorded(vec![with_limit(10)]);
        let first = recorder.current_plain(gauge.line.id()).unwrap();
        assert_eq!(first, "[t] [          ] starting...");
        assert_eq!(gauge.repaints(), 0);
    }

    #[test]
    fn test_repaints_are_throttled() {
        let (mut gauge, recorder, _) = recorded(vec![with_limit(25)]);
        assert_eq!(gauge.update_interval(), 3);
        let line = gauge.line.id();

        gauge.pulse();
        gauge.pulse();
        assert_eq!(recorder.update_count(line), 0);
        gauge.pulse();
        assert_eq!(recorder.update_count(line), 1);

        for _ in 3..25 {
            gauge.pulse();
        }
        assert_eq!(recorder.update_count(line), 25 / 3);

        gauge.complete();
        assert_eq!(recorder.update_count(line), 25 / 3 + 1);
    }

    #[test]
    fn test_full_run_repaint_count() {
        let (mut gauge, recorder, _) = recorded(vec![with_limit(1_000), with_interval(40)]);
        assert_eq!(gauge.update_interval(), 40);
        let line = gauge.line.id();
        for _ in 0..1_000 {
            gauge.pulse();
        }
        assert_eq!(recorder.update_count(line), 25);
        assert_eq!(gauge.repaints(), 25);
    }

    #[test]
    fn test_repaint_text() {
        let (mut gauge, recorder, clock) =
            recorded(vec![with_limit(4), with_user_text(|| ", 2 skipped".to_string())]);
        clock.advance(Duration::from_secs(2));
        gauge.pulse();
        gauge.pulse();
        let text = recorder.current_plain(gauge.line.id()).unwrap();
        // interval is 1 for a limit of 4, so only the second pulse's window counts
        assert_eq!(
            text,
            "[t] [==  ]               2 complete (1 items/sec [total], 0 items/sec [current interval], 2 skipped)"
        );
    }

    #[test]
    fn test_interval_rate_uses_window_since_last_repaint() {
        let (mut gauge, recorder, clock) = recorded(vec![with_limit(100), with_interval(10)]);
        let line = gauge.line.id();

        clock.advance(Duration::from_secs(10));
        for _ in 0..10 {
            gauge.pulse();
        }
        clock.advance(Duration::from_secs(1));
        for _ in 0..10 {
            gauge.pulse();
        }

        let text = recorder.current_plain(line).unwrap();
        assert!(text.contains("(1 items/sec [total], 10 items/sec [current interval])"));
    }

    #[test]
    fn test_complete_reports_total_rate() {
        let (mut gauge, recorder, clock) = recorded(vec![with_limit(10)]);
        let line = gauge.line.id();
        for _ in 0..9 {
            clock.advance(Duration::from_secs(1));
            gauge.pulse();
        }
        clock.advance(Duration::from_millis(500));
        gauge.pulse();
        let last_periodic = recorder.current_plain(line).unwrap();
        assert!(last_periodic.contains("2 items/sec [current interval]"));

        let summary = gauge.complete();
        assert_eq!(summary.count, Some(10));
        assert_eq!(summary.elapsed, Duration::from_millis(9_500));
        assert!((summary.total_rate - 10.0 / 9.5).abs() < 1e-9);
        assert_ne!(summary.total_rate, 2.0);

        let last = recorder.current_plain(line).unwrap();
        assert_eq!(
            last,
            "[t] [==========]              10 complete (1 items/sec [total]) done in 9.50s"
        );
        assert_ne!(last, last_periodic);
    }

    #[test]
    fn test_complete_forces_repaint_between_multiples() {
        let (mut gauge, recorder, _) = recorded(vec![with_limit(100)]);
        let line = gauge.line.id();
        for _ in 0..5 {
            gauge.pulse();
        }
        assert_eq!(recorder.update_count(line), 0);
        gauge.complete();
        assert_eq!(recorder.update_count(line), 1);
        let last = recorder.current_plain(line).unwrap();
        assert!(last.contains("[==                            ]"));
        assert!(last.contains("done in"));
    }

    #[test]
    fn test_unknown_limit_fallback() {
        let (mut gauge, recorder, _) = recorded(vec![]);
        assert_eq!(gauge.limit(), 0);
        assert_eq!(gauge.width(), 0);
        assert_eq!(gauge.update_interval(), 1);
        for _ in 0..3 {
            gauge.pulse();
        }
        assert_eq!(gauge.fill(), 0);
        let text = recorder.current_plain(gauge.line.id()).unwrap();
        assert!(text.starts_with("[t] [] "));
        assert!(text.contains("3 complete"));
    }

    #[test]
    fn test_fill_characters() {
        let (mut gauge, recorder, _) =
            recorded(vec![with_limit(4), with_fill_characters('#', '.')]);
        gauge.pulse();
        let text = recorder.current_plain(gauge.line.id()).unwrap();
        assert!(text.starts_with("[t] [#...] "));
    }

    #[test]
    fn test_invalid_configuration() {
        let recorder = Arc::new(RecordingRenderer::new());
        let err = new("[t]", &[with_interval(0), with_renderer(recorder.clone())]).unwrap_err();
        assert!(matches!(err, Error::InvalidInterval { interval: 0 }));

        let err = new("[t]", &[with_width(0), with_renderer(recorder.clone())]).unwrap_err();
        assert!(matches!(err, Error::InvalidWidth { width: 0 }));

        // nothing was drawn for rejected configurations
        assert_eq!(recorder.line_count(), 0);
    }

    #[test]
    fn test_initial_render_failure_is_an_error() {
        let recorder = Arc::new(RecordingRenderer::new());
        recorder.set_failing(true);
        let err = new("[t]", &[with_limit(5), with_renderer(recorder)]).unwrap_err();
        assert!(matches!(err, Error::Render { .. }));
    }

    #[test]
    fn test_repaint_failure_degrades_gracefully() {
        let (mut gauge, recorder, _) = recorded(vec![with_limit(5)]);
        recorder.set_failing(true);
        for _ in 0..5 {
            gauge.pulse();
        }
        assert_eq!(gauge.count(), 5);
        assert_eq!(gauge.repaints(), 5);
        let summary = gauge.complete();
        assert_eq!(summary.count, Some(5));
    }

    #[test]
    fn test_styled_output_keeps_plain_text() {
        let recorder = Arc::new(RecordingRenderer::new());
        let gauge = new(
            "[styled]",
            &[with_limit(10), with_renderer(recorder.clone())],
        )
        .unwrap();
        let plain = recorder.current_plain(gauge.line.id()).unwrap();
        assert_eq!(plain, "[styled] [          ] starting...");
    }

    proptest! {
        #[test]
        fn prop_fill_is_bounded_and_monotonic(
            limit in 1u64..10_000,
            width in 1usize..200,
            a in 0u64..20_000,
            b in 0u64..20_000,
        ) {
            let width = width_for(width, limit);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let f_lo = fill_for(lo, limit, width);
            let f_hi = fill_for(hi, limit, width);
            prop_assert!(f_lo <= f_hi);
            prop_assert!(f_hi <= width);
        }

        #[test]
        fn prop_update_interval_is_bounded(interval in 1u64..100_000, limit in 0u64..1_000_000) {
            let derived = update_interval_for(interval, limit);
            prop_assert!(derived >= 1);
            prop_assert!(derived <= interval);
            prop_assert!(derived <= limit.div_ceil(MIN_REPAINTS).max(1));
        }
    }
}
