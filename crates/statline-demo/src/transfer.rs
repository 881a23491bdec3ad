#![forbid(unsafe_code)]

//! Simulated file transfer that reports through a status display.
//!
//! The transfer is a scheduler task: every tick advances one step and sends a
//! progress line to the display, usually faster than the display is willing
//! to redraw. The display's own deadline then flushes whatever text is
//! newest, so the terminal sees about one redraw per second.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use std::time::{Duration, Instant};

use statline_core::TerminalProbe;
use statline_runtime::{StatusDisplay, Task, Wakeup};
use tracing::debug;

/// One simulated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimFile {
    pub name: String,
    pub size: u64,
}

/// Files named `file-1.bin`, `file-2.bin`, ... of growing size.
#[must_use]
pub fn sample_files(count: u32) -> Vec<SimFile> {
    (1..=count)
        .map(|n| SimFile {
            name: format!("file-{n}.bin"),
            size: u64::from(n) * 1_048_576,
        })
        .collect()
}

/// Drives progress updates for a list of files.
pub struct Transfer<W: Write, P: TerminalProbe> {
    display: Rc<RefCell<StatusDisplay<W, P>>>,
    files: Vec<SimFile>,
    current: usize,
    step: u32,
    steps: u32,
    interval: Duration,
    log_lines: bool,
    due: Option<Instant>,
}

impl<W: Write, P: TerminalProbe> Transfer<W, P> {
    /// First step is due at `start`. `steps` is clamped to at least one.
    pub fn new(
        display: Rc<RefCell<StatusDisplay<W, P>>>,
        files: Vec<SimFile>,
        steps: u32,
        interval: Duration,
        start: Instant,
    ) -> Self {
        let due = (!files.is_empty()).then_some(start);
        Self {
            display,
            files,
            current: 0,
            step: 0,
            steps: steps.max(1),
            interval,
            log_lines: false,
            due,
        }
    }

    /// Write a permanent line as each file completes.
    #[must_use]
    pub fn with_log_lines(mut self, enabled: bool) -> Self {
        self.log_lines = enabled;
        self
    }

    /// Files fully transferred so far.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.current >= self.files.len()
    }

    fn advance(&mut self, now: Instant) {
        let Some(file) = self.files.get(self.current) else {
            return;
        };
        self.step += 1;
        let done = scaled(file.size, self.step, self.steps);
        let pct = scaled(100, self.step, self.steps);

        let mut display = self.display.borrow_mut();
        display.show_fmt_at(
            format_args!("Downloading {} {}/{} bytes {pct}%", file.name, done, file.size),
            now,
        );

        if self.step == self.steps {
            debug!(file = %file.name, "transfer complete");
            if self.log_lines {
                display.write_line_fmt(format_args!("{}: {} bytes", file.name, file.size));
            }
            self.current += 1;
            self.step = 0;
        }
    }
}

/// `total * step / steps` without intermediate overflow. `step <= steps`.
fn scaled(total: u64, step: u32, steps: u32) -> u64 {
    let wide = u128::from(total) * u128::from(step) / u128::from(steps.max(1));
    u64::try_from(wide).unwrap_or(total)
}

impl<W: Write, P: TerminalProbe> Task for Transfer<W, P> {
    fn tick(&mut self, now: Instant) -> Wakeup {
        self.advance(now);
        if self.is_finished() {
            self.due = None;
            Wakeup::Stall
        } else {
            self.due = Some(now + self.interval);
            Wakeup::After(self.interval)
        }
    }

    fn deadline(&self) -> Option<Instant> {
        self.due
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statline_core::ScriptedProbe;
    use statline_runtime::{Clock, ManualClock, Scheduler};

    type Display = StatusDisplay<Vec<u8>, ScriptedProbe>;
    type Shared<T> = Rc<RefCell<T>>;
    type Fixture = (
        Scheduler<ManualClock>,
        Shared<Display>,
        Shared<Transfer<Vec<u8>, ScriptedProbe>>,
    );

    fn setup(files: u32, steps: u32, log_lines: bool) -> Fixture {
        let clock = ManualClock::default();
        let display = Rc::new(RefCell::new(StatusDisplay::new(
            Vec::new(),
            ScriptedProbe::terminal(80, 24),
        )));
        let transfer = Rc::new(RefCell::new(
            Transfer::new(
                display.clone(),
                sample_files(files),
                steps,
                Duration::from_millis(100),
                clock.now(),
            )
            .with_log_lines(log_lines),
        ));
        let mut scheduler = Scheduler::with_clock(clock);
        scheduler.register(display.clone());
        scheduler.register(transfer.clone());
        (scheduler, display, transfer)
    }

    fn drive(scheduler: &mut Scheduler<ManualClock>) {
        let clock = scheduler.clock().clone();
        scheduler.run_until_idle(|wait| clock.advance(wait));
    }

    #[test]
    fn sample_files_grow() {
        let files = sample_files(2);
        assert_eq!(files[0].name, "file-1.bin");
        assert_eq!(files[1].size, 2 * 1_048_576);
        assert!(sample_files(0).is_empty());
    }

    #[test]
    fn transfer_runs_to_completion() {
        let (mut scheduler, display, transfer) = setup(2, 10, false);
        drive(&mut scheduler);

        assert!(transfer.borrow().is_finished());
        assert_eq!(transfer.borrow().completed(), 2);
        assert_eq!(
            display.borrow().shown(),
            b"Downloading file-2.bin 2097152/2097152 bytes 100%"
        );
        assert!(!display.borrow().is_dirty());
    }

    #[test]
    fn redraws_are_coalesced() {
        let (mut scheduler, display, _) = setup(1, 50, false);
        drive(&mut scheduler);

        // 50 updates over 4.9s: the first immediately, then about one per second.
        let out = display.borrow().writer().clone();
        let redraws = out.iter().filter(|b| **b == b'\r').count();
        assert!((2..=7).contains(&redraws), "{redraws} redraws");
    }

    #[test]
    fn log_lines_are_permanent() {
        let (mut scheduler, display, _) = setup(2, 3, true);
        drive(&mut scheduler);

        let out = String::from_utf8(display.borrow().writer().clone()).unwrap();
        assert!(out.contains("file-1.bin: 1048576 bytes"));
        assert!(out.contains("file-2.bin: 2097152 bytes"));
        assert_eq!(out.matches('\n').count(), 2);
    }

    #[test]
    fn huge_sizes_and_step_counts_do_not_overflow() {
        assert_eq!(scaled(u64::MAX, u32::MAX, u32::MAX), u64::MAX);
        assert_eq!(scaled(u64::MAX, 1, 2), u64::MAX / 2);
        assert_eq!(scaled(100, 1, u32::MAX), 0);

        let clock = ManualClock::default();
        let display = Rc::new(RefCell::new(StatusDisplay::new(
            Vec::new(),
            ScriptedProbe::terminal(200, 24),
        )));
        let files = vec![SimFile {
            name: "big.iso".into(),
            size: u64::MAX,
        }];
        let mut transfer = Transfer::new(
            display.clone(),
            files,
            u32::MAX,
            Duration::from_millis(1),
            clock.now(),
        );
        assert_eq!(transfer.tick(clock.now()), Wakeup::After(Duration::from_millis(1)));
        assert_eq!(
            display.borrow().shown(),
            format!("Downloading big.iso 4294967297/{} bytes 0%", u64::MAX).as_bytes()
        );
    }

    #[test]
    fn empty_transfer_never_ticks() {
        let (mut scheduler, display, transfer) = setup(0, 10, false);
        assert_eq!(scheduler.next_deadline(), None);
        drive(&mut scheduler);
        assert!(transfer.borrow().is_finished());
        assert!(display.borrow().writer().is_empty());
    }
}
