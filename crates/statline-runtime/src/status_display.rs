#![forbid(unsafe_code)]

//! Single-line status display.
//!
//! A status line is one terminal line that is overwritten in place (`\r`
//! followed by the new text) instead of scrolling, so a long-running command
//! can report progress without flooding the scrollback. Permanent output
//! still goes through the same display ([`StatusDisplay::write_line`]) so it
//! can blank the status first and never leaves fragments of it behind.
//!
//! # Redraw Coalescing
//!
//! Progress callbacks can fire thousands of times per second. The display
//! redraws at most once per [`MIN_REDRAW_INTERVAL`]; updates arriving sooner
//! are parked in a single pending slot (latest wins) and drawn when the
//! scheduler ticks the display:
//!
//! ```text
//!            show() within interval
//!   Idle ─────────────────────────────► Pending { text, due }
//!    ▲                                       │   │
//!    │  tick() after interval / clear() /    │   │ show() within interval
//!    └──────────── write_line() ─────────────┘   └──► text replaced
//! ```
//!
//! # Output Contract
//!
//! 1. Redraws are `\r` + line, never a newline.
//! 2. The status text is always shorter than the terminal width. Blanking
//!    spaces may run up to the width but never past it.
//! 3. A shorter line is padded with spaces (old length minus new length
//!    plus two) to blank what the previous line left behind.
//! 4. Nothing is drawn when the descriptor is not a terminal or the process
//!    is not in the terminal's foreground process group. The default title
//!    written by `clear` is the one exception.
//!
//! Write errors are not reported to callers. They are logged at `debug`
//! level.
//!
//! # Usage
//!
//! ```ignore
//! use statline_core::FdProbe;
//! use statline_runtime::StatusDisplay;
//!
//! let stdout = std::io::stdout();
//! let probe = FdProbe::new(&stdout)?;
//! let mut status = StatusDisplay::new(stdout, probe);
//! status.set_default_title("idle");
//! for pct in 0..=100 {
//!     status.show_fmt(format_args!("Downloading file.txt {pct}%"));
//! }
//! status.write_line("file.txt: done");
//! status.clear();
//! ```

use std::fmt;
use std::io::{self, Write};
use std::mem;
use std::time::{Duration, Instant};

use statline_core::{
    BoundedText, STATUS_CAPACITY, Settings, TerminalGeometry, TerminalProbe,
    TitleConfig, TitleTemplate,
};
use tracing::{debug, trace};

use crate::scheduler::{Task, Wakeup};

/// Minimum time between two immediate redraws.
pub const MIN_REDRAW_INTERVAL: Duration = Duration::from_secs(1);

/// Extra blanks written past the old line's length when a line shrinks.
const OVERWRITE_MARGIN: usize = 2;

/// What a call to [`StatusDisplay::show`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowOutcome {
    /// Redrawn immediately (possibly suppressed, see the module docs).
    Drawn,
    /// Parked; the display wants a tick after this long.
    Deferred { after: Duration },
    /// Identical to the text already waiting for the next redraw.
    AlreadyPending,
    /// Empty text: the line was cleared.
    Cleared,
}

#[derive(Debug, Clone)]
enum RedrawState {
    Idle,
    Pending { text: BoundedText, due: Instant },
}

/// Status line bound to one output stream.
pub struct StatusDisplay<W: Write, P: TerminalProbe> {
    writer: W,
    probe: P,
    is_terminal: bool,
    geometry: TerminalGeometry,
    shown: BoundedText,
    default_title: BoundedText,
    state: RedrawState,
    last_update: Option<Instant>,
    title: TitleTemplate,
    title_config: TitleConfig,
}

impl<W: Write, P: TerminalProbe> StatusDisplay<W, P> {
    /// Bind a display to `writer`, described by `probe`.
    ///
    /// Terminal-ness is decided here, once; the width is probed now and
    /// again on every redraw. Title writing starts disabled.
    pub fn new(writer: W, probe: P) -> Self {
        let is_terminal = probe.is_terminal();
        let mut geometry = TerminalGeometry::new();
        let width = geometry.get_width(&probe);
        debug!(is_terminal, width, "status display created");
        Self {
            writer,
            probe,
            is_terminal,
            geometry,
            shown: BoundedText::new(),
            default_title: BoundedText::new(),
            state: RedrawState::Idle,
            last_update: None,
            title: TitleTemplate::default(),
            title_config: TitleConfig::disabled(),
        }
    }

    /// Program identity used for `\s` and `\v` in title templates.
    #[must_use]
    pub fn with_title_template(mut self, title: TitleTemplate) -> Self {
        self.title = title;
        self
    }

    /// Use an already resolved title configuration.
    #[must_use]
    pub fn with_title_config(mut self, config: TitleConfig) -> Self {
        self.title_config = config;
        self
    }

    /// Resolve title settings for terminal type `term`.
    #[must_use]
    pub fn with_settings(self, settings: &Settings, term: Option<&str>) -> Self {
        self.with_title_config(TitleConfig::resolve(settings, term))
    }

    /// Title restored by [`clear`](Self::clear). Stored bounded; no redraw.
    pub fn set_default_title(&mut self, title: &str) {
        self.default_title.assign(title.as_bytes());
    }

    // ------------------------------------------------------------------
    // Public operations
    // ------------------------------------------------------------------

    /// Show `text` now, or as soon as the redraw interval allows.
    pub fn show(&mut self, text: &str) -> ShowOutcome {
        self.show_at(text, Instant::now())
    }

    /// [`show`](Self::show) with an explicit timestamp.
    pub fn show_at(&mut self, text: &str, now: Instant) -> ShowOutcome {
        self.submit(BoundedText::from_bytes(STATUS_CAPACITY, text.as_bytes()), now)
    }

    /// Show formatted text, truncated to the buffer capacity.
    pub fn show_fmt(&mut self, args: fmt::Arguments<'_>) -> ShowOutcome {
        self.show_fmt_at(args, Instant::now())
    }

    /// [`show_fmt`](Self::show_fmt) with an explicit timestamp.
    pub fn show_fmt_at(&mut self, args: fmt::Arguments<'_>, now: Instant) -> ShowOutcome {
        self.submit(BoundedText::from_fmt(STATUS_CAPACITY, args), now)
    }

    /// Erase the status line and restore the default title.
    ///
    /// Drops any pending text and allows the next `show` to draw at once.
    /// The default title is written whenever title writing is enabled, even
    /// when the line itself is suppressed.
    pub fn clear(&mut self) {
        self.update(BoundedText::new());
        self.state = RedrawState::Idle;
        self.last_update = None;

        let title = self.default_title.clone();
        self.write_title(title.as_bytes());
    }

    /// Write a permanent line of output without leaving status debris.
    ///
    /// With nothing shown (or no terminal) the text is written as-is plus a
    /// newline. Otherwise the text overwrites the status line in place,
    /// padded so the old status is fully blanked, and the status is
    /// forgotten: the next `show` draws on the fresh line below.
    pub fn write_line(&mut self, text: &str) {
        self.write_line_bytes(text.as_bytes().to_vec());
    }

    /// [`write_line`](Self::write_line) with formatting.
    pub fn write_line_fmt(&mut self, args: fmt::Arguments<'_>) {
        self.write_line_bytes(fmt::format(args).into_bytes());
    }

    /// Perform a deferred redraw if one is due.
    pub fn tick(&mut self, now: Instant) -> Wakeup {
        if !self.is_dirty() {
            return Wakeup::Stall;
        }
        let remaining = self.remaining_interval(now);
        if !remaining.is_zero() {
            if let RedrawState::Pending { due, .. } = &mut self.state {
                *due = now + remaining;
            }
            trace!(?remaining, "status.rearm");
            return Wakeup::After(remaining);
        }
        if let RedrawState::Pending { text, .. } = mem::replace(&mut self.state, RedrawState::Idle)
        {
            self.update(text);
            self.last_update = Some(now);
        }
        Wakeup::Stall
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Bytes currently visible on the status line.
    #[must_use]
    pub fn shown(&self) -> &[u8] {
        self.shown.as_bytes()
    }

    /// Text waiting for the next deferred redraw.
    #[must_use]
    pub fn pending(&self) -> Option<&[u8]> {
        match &self.state {
            RedrawState::Idle => None,
            RedrawState::Pending { text, .. } => Some(text.as_bytes()),
        }
    }

    /// Whether a deferred redraw is outstanding.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        matches!(self.state, RedrawState::Pending { .. })
    }

    /// When the deferred redraw is due.
    #[must_use]
    pub fn due(&self) -> Option<Instant> {
        match &self.state {
            RedrawState::Idle => None,
            RedrawState::Pending { due, .. } => Some(*due),
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.is_terminal
    }

    /// Width from the most recent probe.
    #[must_use]
    pub fn width(&self) -> u16 {
        self.geometry.last_width()
    }

    #[must_use]
    pub fn default_title(&self) -> &[u8] {
        self.default_title.as_bytes()
    }

    #[must_use]
    pub fn title_config(&self) -> &TitleConfig {
        &self.title_config
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Give back the writer. The status line is left as it is.
    pub fn into_inner(self) -> W {
        self.writer
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn submit(&mut self, candidate: BoundedText, now: Instant) -> ShowOutcome {
        if candidate.is_empty() {
            self.clear();
            return ShowOutcome::Cleared;
        }

        if self.remaining_interval(now).is_zero() {
            self.update(candidate);
            self.state = RedrawState::Idle;
            self.last_update = Some(now);
            return ShowOutcome::Drawn;
        }

        if let RedrawState::Pending { text, .. } = &self.state
            && *text == candidate
        {
            return ShowOutcome::AlreadyPending;
        }

        trace!(text = %candidate.to_string_lossy(), "status.deferred");
        self.state = RedrawState::Pending {
            text: candidate,
            due: now + MIN_REDRAW_INTERVAL,
        };
        ShowOutcome::Deferred {
            after: MIN_REDRAW_INTERVAL,
        }
    }

    /// Time left before an immediate redraw is allowed.
    fn remaining_interval(&self, now: Instant) -> Duration {
        self.last_update.map_or(Duration::ZERO, |last| {
            MIN_REDRAW_INTERVAL.saturating_sub(now.saturating_duration_since(last))
        })
    }

    fn may_draw(&self) -> bool {
        if !self.is_terminal {
            trace!(reason = "not a terminal", "status.suppressed");
            return false;
        }
        if !self.probe.is_foreground() {
            trace!(reason = "background process group", "status.suppressed");
            return false;
        }
        true
    }

    /// Redraw the status line with `line`.
    fn update(&mut self, mut line: BoundedText) {
        if !self.may_draw() {
            return;
        }

        // Blank titles are left to clear().
        if !line.is_empty() {
            self.write_title(line.as_bytes());
        }

        let width = usize::from(self.geometry.get_width(&self.probe));
        if line.len() >= width {
            line.truncate(width.saturating_sub(1));
        }
        line.trim_trailing_spaces();

        if line == self.shown {
            return;
        }

        let padding = (self.shown.len() + OVERWRITE_MARGIN).saturating_sub(line.len());
        self.shown = line.clone();
        line.pad_spaces(padding, width);

        if line.is_empty() {
            return;
        }

        trace!(text = %self.shown.to_string_lossy(), padding, width, "status.redraw");
        if let Err(err) = self.emit(&[b"\r", line.as_bytes()]) {
            debug!(error = %err, "status redraw failed");
        }
    }

    fn write_line_bytes(&mut self, mut line: Vec<u8>) {
        if !self.is_terminal || self.shown.is_empty() {
            line.push(b'\n');
            self.state = RedrawState::Idle;
            if let Err(err) = self.emit(&[&line]) {
                debug!(error = %err, "status write_line failed");
            }
            return;
        }

        while line.last() == Some(&b' ') {
            line.pop();
        }

        if self.shown == line[..] {
            // The status itself becomes the permanent line.
            self.shown.clear();
            if let Err(err) = self.emit(&[b"\n"]) {
                debug!(error = %err, "status write_line failed");
            }
            return;
        }

        let padding = (self.shown.len() + OVERWRITE_MARGIN).saturating_sub(line.len());
        let limit = usize::from(self.geometry.get_width(&self.probe)).saturating_sub(1);
        let target = line.len().saturating_add(padding).min(limit);
        if target > line.len() {
            line.resize(target, b' ');
        }
        line.push(b'\n');

        if let Err(err) = self.emit(&[b"\r", &line]) {
            debug!(error = %err, "status write_line failed");
        }
        self.shown.clear();
        self.state = RedrawState::Idle;
    }

    fn write_title(&mut self, status: &[u8]) {
        let Some(template) = self.title_config.active_template() else {
            return;
        };
        if let Err(err) = self
            .title
            .write_title(&mut self.writer, template.as_bytes(), status)
        {
            debug!(error = %err, "title write failed");
        }
    }

    fn emit(&mut self, parts: &[&[u8]]) -> io::Result<()> {
        for part in parts {
            self.writer.write_all(part)?;
        }
        self.writer.flush()
    }
}

impl<W: Write, P: TerminalProbe> Task for StatusDisplay<W, P> {
    fn tick(&mut self, now: Instant) -> Wakeup {
        StatusDisplay::tick(self, now)
    }

    fn deadline(&self) -> Option<Instant> {
        self.due()
    }
}

impl<W: Write, P: TerminalProbe> fmt::Debug for StatusDisplay<W, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusDisplay")
            .field("is_terminal", &self.is_terminal)
            .field("shown", &self.shown)
            .field("state", &self.state)
            .field("last_update", &self.last_update)
            .field("width", &self.geometry.last_width())
            .finish_non_exhaustive()
    }
}
