#![forbid(unsafe_code)]

//! Cooperative deadline scheduler.
//!
//! Tasks do not get their own threads. Each task publishes the instant at
//! which it next wants to run ([`Task::deadline`]); the scheduler ticks every
//! task whose deadline has passed and otherwise tells the host how long it
//! may sleep. Everything happens on the caller's thread, so tasks are shared
//! with the host through `Rc<RefCell<_>>` rather than locks.
//!
//! # Invariants
//!
//! 1. A task is only ticked when its deadline is at or before `now`.
//! 2. A task that returns [`Wakeup::After`] must report a later deadline,
//!    otherwise [`Scheduler::run_until_idle`] would spin.
//! 3. There is no cancellation: a task that no longer has work simply
//!    reports no deadline, and a stray tick is a no-op.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::trace;

/// What a task wants after being ticked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wakeup {
    /// Nothing to do until the next external event.
    Stall,
    /// Tick again after this long.
    After(Duration),
}

/// A unit of deferred work.
pub trait Task {
    /// Perform whatever work is due at `now`.
    fn tick(&mut self, now: Instant) -> Wakeup;

    /// When the task next wants to be ticked, if at all.
    fn deadline(&self) -> Option<Instant>;
}

/// Shared handle the scheduler keeps for each registered task.
pub type TaskHandle = Rc<RefCell<dyn Task>>;

// ============================================================================
// Clocks
// ============================================================================

/// Monotonic time source.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall-clock monotonic time (`Instant::now`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock for tests and simulations.
///
/// Clones share the same time, so a test can keep one handle and advance
/// the clock the scheduler reads from.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    #[must_use]
    pub fn new(start: Instant) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Instant::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

// ============================================================================
// Scheduler
// ============================================================================

/// Runs registered tasks when their deadlines pass.
pub struct Scheduler<C: Clock = SystemClock> {
    clock: C,
    tasks: Vec<TaskHandle>,
}

impl Scheduler<SystemClock> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for Scheduler<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Scheduler<C> {
    #[must_use]
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            tasks: Vec::new(),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Register a task. The caller keeps its own handle for direct calls.
    pub fn register<T: Task + 'static>(&mut self, task: Rc<RefCell<T>>) {
        let handle: TaskHandle = task;
        self.tasks.push(handle);
    }

    /// Number of registered tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Earliest deadline across all tasks.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.tasks
            .iter()
            .filter_map(|task| task.borrow().deadline())
            .min()
    }

    /// Time until the earliest deadline (zero if already due).
    pub fn time_until_next(&self) -> Option<Duration> {
        let now = self.clock.now();
        self.next_deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Tick every task whose deadline has passed. Returns how many ran.
    pub fn run_due(&mut self) -> usize {
        let now = self.clock.now();
        let mut ran = 0;
        for task in &self.tasks {
            let due = task.borrow().deadline().is_some_and(|deadline| deadline <= now);
            if !due {
                continue;
            }
            let wakeup = task.borrow_mut().tick(now);
            trace!(?wakeup, "task ticked");
            ran += 1;
        }
        ran
    }

    /// Sleep and tick until no task has a deadline left.
    ///
    /// `sleep` is called with the time to the next deadline; pass
    /// `std::thread::sleep` in production or a clock-advancing closure in
    /// tests. Returns the total number of ticks performed.
    pub fn run_until_idle<F>(&mut self, mut sleep: F) -> usize
    where
        F: FnMut(Duration),
    {
        let mut ran = 0;
        while let Some(wait) = self.time_until_next() {
            if !wait.is_zero() {
                sleep(wait);
            }
            ran += self.run_due();
        }
        ran
    }
}

impl<C: Clock + fmt::Debug> fmt::Debug for Scheduler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("clock", &self.clock)
            .field("tasks", &self.tasks.len())
            .finish()
    }
}
