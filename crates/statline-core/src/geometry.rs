#![forbid(unsafe_code)]

//! Terminal geometry with fixed fallbacks.
//!
//! The OS window-size query can be unavailable (no `TIOCGWINSZ`, output
//! redirected) or can report zero for a dimension (some serial consoles and
//! freshly created ptys). In both cases the classic 80x24 defaults are used,
//! per dimension.
//!
//! [`TerminalGeometry`] remembers the last answer, but that value is only a
//! convenience for reporting: windows resize at any time, so every redraw
//! must go through [`TerminalGeometry::get_width`] again.

use crate::tty::TerminalProbe;

/// Column count used when the probe fails or reports zero columns.
pub const DEFAULT_COLS: u16 = 80;

/// Row count used when the probe fails or reports zero rows.
pub const DEFAULT_ROWS: u16 = 24;

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size {
    pub cols: u16,
    pub rows: u16,
}

impl Size {
    /// The 80x24 fallback.
    pub const FALLBACK: Size = Size::new(DEFAULT_COLS, DEFAULT_ROWS);

    #[must_use]
    pub const fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }

    /// Apply the per-dimension fallbacks to a raw probe result.
    #[must_use]
    pub fn normalize(observed: Option<(u16, u16)>) -> Self {
        let (cols, rows) = observed.unwrap_or((0, 0));
        Self {
            cols: normalize_dimension(cols, DEFAULT_COLS),
            rows: normalize_dimension(rows, DEFAULT_ROWS),
        }
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::FALLBACK
    }
}

fn normalize_dimension(observed: u16, default_value: u16) -> u16 {
    if observed > 0 { observed } else { default_value }
}

/// Width/height query with caching of the last result.
#[derive(Debug, Clone, Default)]
pub struct TerminalGeometry {
    last: Size,
}

impl TerminalGeometry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Query the probe and cache the normalized size.
    pub fn query<P: TerminalProbe + ?Sized>(&mut self, probe: &P) -> Size {
        let observed = match probe.size() {
            Ok(size) => Some(size),
            Err(err) => {
                crate::trace!(error = %err, "window size query failed; using fallback");
                None
            }
        };
        self.last = Size::normalize(observed);
        self.last
    }

    /// Query the probe and return the column count.
    pub fn get_width<P: TerminalProbe + ?Sized>(&mut self, probe: &P) -> u16 {
        self.query(probe).cols
    }

    /// Size from the most recent query (the fallback before any query).
    #[must_use]
    pub const fn last_size(&self) -> Size {
        self.last
    }

    /// Column count from the most recent query.
    #[must_use]
    pub const fn last_width(&self) -> u16 {
        self.last.cols
    }
}
