//! Render surfaces that own fixed terminal lines.
//!
//! A [`LineRenderer`] hands out lines and later rewrites them in place. Each
//! widget owns exactly one line through a [`LineHandle`]; the renderer is the
//! single point that serializes writes, so several widgets can share one
//! output stream without interleaving partial lines.
//!
//! Two renderers are provided:
//! - [`TerminalRenderer`] moves the cursor back to an earlier row with
//!   crossterm and rewrites it. When the stream is not a TTY it degrades to
//!   appending every update as a new plain line.
//! - [`RecordingRenderer`] keeps everything in memory, for tests and for
//!   callers that want to inspect output.
//!
//! Anything else printed to the same stream must go through
//! [`TerminalRenderer::print_line`] (or the [`LogSink`] writer for a tracing
//! subscriber). Rows written behind the renderer's back shift every widget
//! line and later rewrites land on the wrong row.
//!
//! ```rust
//! use pulse_widgets::line::{LineHandle, RecordingRenderer};
//! use std::sync::Arc;
//!
//! let recorder = Arc::new(RecordingRenderer::new());
//! let line = LineHandle::create(recorder.clone(), "starting...").unwrap();
//! line.update("halfway").unwrap();
//! assert_eq!(recorder.current(line.id()).as_deref(), Some("halfway"));
//! assert_eq!(recorder.update_count(line.id()), 1);
//! ```

use crossterm::cursor::{MoveDown, MoveToColumn, MoveUp};
use tracing_subscriber::fmt::MakeWriter;
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use crossterm::tty::IsTty;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

/// Identifies a line created by a renderer. Rows are numbered from zero in
/// creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineId(pub usize);

/// A surface that can create lines and rewrite them later.
pub trait LineRenderer: Send + Sync + fmt::Debug {
    /// Appends a new line showing `initial` and returns its id.
    fn create_line(&self, initial: &str) -> io::Result<LineId>;

    /// Replaces the full content of `line` with `text`.
    fn update_line(&self, line: LineId, text: &str) -> io::Result<()>;
}

/// Exclusive handle on one line of a renderer.
#[derive(Debug, Clone)]
pub struct LineHandle {
    renderer: Arc<dyn LineRenderer>,
    id: LineId,
}

impl LineHandle {
    /// Creates a line on `renderer` showing `initial`.
    pub fn create(renderer: Arc<dyn LineRenderer>, initial: &str) -> io::Result<Self> {
        let id = renderer.create_line(initial)?;
        Ok(Self { renderer, id })
    }

    /// Replaces the line's content.
    pub fn update(&self, text: &str) -> io::Result<()> {
        self.renderer.update_line(self.id, text)
    }

    /// The id of the owned line.
    pub fn id(&self) -> LineId {
        self.id
    }
}

static STDERR: Lazy<Arc<TerminalRenderer>> = Lazy::new(|| Arc::new(TerminalRenderer::stderr()));

/// The process-wide renderer on standard error.
///
/// Widgets use it unless told otherwise, so every default widget shares one
/// serialized stream.
pub fn stderr_renderer() -> Arc<dyn LineRenderer> {
    STDERR.clone()
}

/// The same process-wide renderer as [`stderr_renderer`], with its concrete
/// type, for printing log lines between widget lines.
///
/// # Examples
///
/// ```rust,no_run
/// use pulse_widgets::line::stderr_terminal;
///
/// tracing_subscriber::fmt()
///     .with_writer(stderr_terminal().log_sink())
///     .init();
/// ```
pub fn stderr_terminal() -> Arc<TerminalRenderer> {
    STDERR.clone()
}

struct TerminalState {
    out: Box<dyn Write + Send>,
    lines: usize,
    ansi: bool,
}

/// Renderer that redraws lines in place on a terminal stream.
pub struct TerminalRenderer {
    state: Mutex<TerminalState>,
}

impl TerminalRenderer {
    /// Renders to `out`. With `ansi` false, updates are appended as new lines
    /// instead of rewriting earlier rows.
    pub fn new(out: Box<dyn Write + Send>, ansi: bool) -> Self {
        Self {
            state: Mutex::new(TerminalState {
                out,
                lines: 0,
                ansi,
            }),
        }
    }

    /// Renders to standard error, rewriting in place only on a TTY.
    pub fn stderr() -> Self {
        let ansi = io::stderr().is_tty();
        Self::new(Box::new(io::stderr()), ansi)
    }

    /// Number of rows written since creation.
    pub fn line_count(&self) -> usize {
        self.state.lock().lines
    }

    /// Prints `text` below the existing rows and counts every row it takes.
    ///
    /// Use this for any output that shares the stream with widget lines.
    pub fn print_line(&self, text: &str) -> io::Result<()> {
        let mut state = self.state.lock();
        for row in text.split('\n') {
            writeln!(state.out, "{row}")?;
            state.lines += 1;
        }
        state.out.flush()
    }

    /// A [`MakeWriter`] that sends formatted log events through
    /// [`print_line`](Self::print_line).
    pub fn log_sink(self: &Arc<Self>) -> LogSink {
        LogSink {
            renderer: self.clone(),
        }
    }
}

/// Log writer factory bound to a [`TerminalRenderer`].
#[derive(Debug, Clone)]
pub struct LogSink {
    renderer: Arc<TerminalRenderer>,
}

impl<'a> MakeWriter<'a> for LogSink {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter {
            renderer: self.renderer.clone(),
            pending: Vec::new(),
        }
    }
}

/// Buffers bytes and prints each complete line through the renderer.
///
/// A trailing partial line is printed on flush or drop.
#[derive(Debug)]
pub struct LogWriter {
    renderer: Arc<TerminalRenderer>,
    pending: Vec<u8>,
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let row: Vec<u8> = self.pending.drain(..=pos).collect();
            self.renderer
                .print_line(&String::from_utf8_lossy(&row[..pos]))?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let row = std::mem::take(&mut self.pending);
        self.renderer.print_line(&String::from_utf8_lossy(&row))
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

impl fmt::Debug for TerminalRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("TerminalRenderer")
            .field("lines", &state.lines)
            .field("ansi", &state.ansi)
            .finish()
    }
}

impl LineRenderer for TerminalRenderer {
    fn create_line(&self, initial: &str) -> io::Result<LineId> {
        let mut state = self.state.lock();
        writeln!(state.out, "{initial}")?;
        state.out.flush()?;
        let id = LineId(state.lines);
        state.lines += 1;
        Ok(id)
    }

    fn update_line(&self, line: LineId, text: &str) -> io::Result<()> {
        let mut state = self.state.lock();
        if line.0 >= state.lines {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("line {} was never created", line.0),
            ));
        }

        if !state.ansi {
            writeln!(state.out, "{text}")?;
            return state.out.flush();
        }

        // Cursor rests at the start of the row below the last created line.
        let up = u16::try_from(state.lines - line.0).unwrap_or(u16::MAX);
        let out = &mut state.out;
        queue!(
            out,
            MoveUp(up),
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print(text),
            MoveDown(up),
            MoveToColumn(0)
        )?;
        out.flush()
    }
}

/// One call recorded by a [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A line was created.
    Create {
        /// New line.
        line: LineId,
        /// Initial content.
        text: String,
    },
    /// A line was rewritten.
    Update {
        /// Target line.
        line: LineId,
        /// New content.
        text: String,
    },
}

impl Event {
    /// Line the event targets.
    pub fn line(&self) -> LineId {
        match self {
            Event::Create { line, .. } | Event::Update { line, .. } => *line,
        }
    }

    /// Text written by the event.
    pub fn text(&self) -> &str {
        match self {
            Event::Create { text, .. } | Event::Update { text, .. } => text,
        }
    }
}

#[derive(Debug, Default)]
struct Recording {
    events: Vec<Event>,
    lines: Vec<String>,
    failing: bool,
}

/// In-memory renderer that records every write.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    inner: Mutex<Recording>,
}

impl RecordingRenderer {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following call fail with an I/O error, or stop failing.
    pub fn set_failing(&self, failing: bool) {
        self.inner.lock().failing = failing;
    }

    /// All recorded events in call order.
    pub fn events(&self) -> Vec<Event> {
        self.inner.lock().events.clone()
    }

    /// Current content of `line`.
    pub fn current(&self, line: LineId) -> Option<String> {
        self.inner.lock().lines.get(line.0).cloned()
    }

    /// Current content of `line` with styling removed.
    pub fn current_plain(&self, line: LineId) -> Option<String> {
        self.current(line).map(strip_ansi_escapes::strip_str)
    }

    /// Every text written to `line` (creation first), styling removed.
    pub fn history(&self, line: LineId) -> Vec<String> {
        self.inner
            .lock()
            .events
            .iter()
            .filter(|event| event.line() == line)
            .map(|event| strip_ansi_escapes::strip_str(event.text()))
            .collect()
    }

    /// Number of updates (not counting creation) applied to `line`.
    pub fn update_count(&self, line: LineId) -> usize {
        self.inner
            .lock()
            .events
            .iter()
            .filter(|event| matches!(event, Event::Update { line: l, .. } if *l == line))
            .count()
    }

    /// Number of lines created so far.
    pub fn line_count(&self) -> usize {
        self.inner.lock().lines.len()
    }
}

fn injected_failure() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "recording renderer set to fail")
}

impl LineRenderer for RecordingRenderer {
    fn create_line(&self, initial: &str) -> io::Result<LineId> {
        let mut inner = self.inner.lock();
        if inner.failing {
            return Err(injected_failure());
        }
        let line = LineId(inner.lines.len());
        inner.lines.push(initial.to_string());
        inner.events.push(Event::Create {
            line,
            text: initial.to_string(),
        });
        Ok(line)
    }

    fn update_line(&self, line: LineId, text: &str) -> io::Result<()> {
        let mut inner = self.inner.lock();
        if inner.failing {
            return Err(injected_failure());
        }
        match inner.lines.get_mut(line.0) {
            Some(slot) => *slot = text.to_string(),
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("line {} was never created", line.0),
                ))
            }
        }
        inner.events.push(Event::Update {
            line,
            text: text.to_string(),
        });
        Ok(())
    }
}
