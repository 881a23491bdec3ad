#![forbid(unsafe_code)]

//! statline runtime
//!
//! # Key Components
//!
//! - [`StatusDisplay`] - Single-line status display with redraw coalescing,
//!   width-aware truncation, title mirroring, and background suppression
//! - [`Scheduler`] - Cooperative deadline scheduler that drives deferred
//!   redraws
//! - [`Task`] / [`Wakeup`] - Contract between the scheduler and its tasks
//! - [`Clock`] - Monotonic time source (`SystemClock`, `ManualClock`)
//!
//! # How it fits in the system
//! `statline-core` answers questions about the terminal (size, ownership,
//! title escapes, settings). This crate owns the output state machine and
//! the timing that decides when bytes actually hit the terminal.

pub mod scheduler;
pub mod status_display;

pub use scheduler::{Clock, ManualClock, Scheduler, SystemClock, Task, TaskHandle, Wakeup};
pub use status_display::{MIN_REDRAW_INTERVAL, ShowOutcome, StatusDisplay};
