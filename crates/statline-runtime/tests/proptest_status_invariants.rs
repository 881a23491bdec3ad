//! Property-based invariant tests for the status display.
//!
//! 1. A short line is shown exactly, minus trailing spaces.
//! 2. A long line is cut to `width - 1` bytes, keeping its prefix.
//! 3. Status text stays narrower than the terminal; blanking never passes it.
//! 4. Identical updates within the redraw interval write at most once.
//! 5. `clear` always empties the line and restores the default title.
//! 6. `write_line` over a status blanks the whole previous status.
//! 7. Suppressed displays never change `shown`; only `clear` writes, and
//!    only the default title.

use std::mem;
use std::time::{Duration, Instant};

use proptest::prelude::*;
use statline_core::{ScriptedProbe, TitleConfig};
use statline_runtime::StatusDisplay;

type Display = StatusDisplay<Vec<u8>, ScriptedProbe>;

fn display(cols: u16) -> Display {
    StatusDisplay::new(Vec::new(), ScriptedProbe::terminal(cols, 24))
}

fn trimmed(text: &str) -> &[u8] {
    text.trim_end_matches(' ').as_bytes()
}

// ═════════════════════════════════════════════════════════════════════════
// 1-3. Geometry
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn short_line_is_shown_trimmed(cols in 2u16..200, text in "[a-z0-9 %.]{1,200}") {
        prop_assume!(text.len() < usize::from(cols));
        let mut status = display(cols);
        status.show_at(&text, Instant::now());
        prop_assert_eq!(status.shown(), trimmed(&text));
    }

    #[test]
    fn long_line_is_cut_to_width_minus_one(cols in 1u16..120, text in "[a-z0-9%.]{1,240}") {
        prop_assume!(text.len() >= usize::from(cols));
        let mut status = display(cols);
        status.show_at(&text, Instant::now());
        let keep = usize::from(cols) - 1;
        prop_assert_eq!(status.shown(), &text.as_bytes()[..keep]);
    }

    #[test]
    fn visible_line_stays_narrower_than_terminal(
        cols in 1u16..100,
        updates in prop::collection::vec("[a-z ]{0,150}", 1..12),
    ) {
        let mut status = display(cols);
        let start = Instant::now();
        for (i, text) in updates.iter().enumerate() {
            let now = start + Duration::from_secs(i as u64);
            status.show_at(text, now);
            prop_assert!(status.shown().len() < usize::from(cols));
            prop_assert!(!status.shown().ends_with(b" "));

            // Everything after the last `\r` is what the terminal row holds.
            let out = mem::take(status.writer_mut());
            if let Some(pos) = out.iter().rposition(|b| *b == b'\r') {
                prop_assert!(out.len() - pos - 1 <= usize::from(cols));
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Coalescing
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn identical_updates_within_interval_write_once(
        text in "[a-z]{1,30}",
        gap_ms in 0u64..999,
    ) {
        let mut status = display(80);
        let t0 = Instant::now();
        status.show_at(&text, t0);
        let first = mem::take(status.writer_mut());
        status.show_at(&text, t0 + Duration::from_millis(gap_ms));
        prop_assert_eq!(first, format!("\r{text}").into_bytes());
        prop_assert!(status.writer().is_empty());

        // The deferred copy is a no-op once drawn.
        status.tick(t0 + Duration::from_secs(5));
        prop_assert!(status.writer().is_empty());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5-6. Clear and permanent lines
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn clear_empties_and_restores_title(
        text in "[a-z ]{0,60}",
        title in "[a-z]{0,20}",
    ) {
        let mut status = display(80).with_title_config(TitleConfig::enabled("<\\T>"));
        status.set_default_title(&title);
        status.show_at(&text, Instant::now());
        mem::take(status.writer_mut());

        status.clear();
        prop_assert!(status.shown().is_empty());
        let expected_tail = format!("<{title}>").into_bytes();
        prop_assert!(status.writer().ends_with(&expected_tail));
    }

    #[test]
    fn write_line_blanks_previous_status(
        cols in 10u16..120,
        before in "[a-z]{1,100}",
        msg in "[A-Z]{0,100}",
    ) {
        let mut status = display(cols);
        status.show_at(&before, Instant::now());
        let shown_before = status.shown().len();
        mem::take(status.writer_mut());

        status.write_line(&msg);
        let out = mem::take(status.writer_mut());
        prop_assert_eq!(out.first(), Some(&b'\r'));
        prop_assert_eq!(out.last(), Some(&b'\n'));
        let line = &out[1..out.len() - 1];
        prop_assert!(line.starts_with(msg.as_bytes()));

        let wanted = shown_before.max(msg.len()).min(usize::from(cols) - 1);
        prop_assert!(line.len() >= wanted);
        prop_assert!(status.shown().is_empty());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Suppression
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn background_display_is_silent(
        updates in prop::collection::vec("[a-z ]{1,40}", 1..8),
    ) {
        let probe = ScriptedProbe::terminal(80, 24);
        probe.set_foreground(false);
        let mut status = StatusDisplay::new(Vec::new(), probe)
            .with_title_config(TitleConfig::enabled("\\e]0;\\T\\a"));
        let start = Instant::now();
        for (i, text) in updates.iter().enumerate() {
            let now = start + Duration::from_millis(300 * i as u64);
            status.show_at(text, now);
            status.tick(now + Duration::from_secs(1));
        }
        prop_assert!(status.writer().is_empty());
        prop_assert!(status.shown().is_empty());

        status.set_default_title("idle");
        status.clear();
        prop_assert_eq!(status.writer().as_slice(), b"\x1b]0;idle\x07");
        prop_assert!(status.shown().is_empty());
    }
}
