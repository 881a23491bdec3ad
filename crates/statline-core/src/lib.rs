#![forbid(unsafe_code)]

//! Core: bounded text buffers, terminal geometry, descriptor probes, title
//! templates, and the settings registry.

pub mod bounded_text;
pub mod geometry;
pub mod logging;
pub mod settings;
pub mod title;
pub mod tty;

pub use bounded_text::{BoundedText, STATUS_CAPACITY};
pub use geometry::{Size, TerminalGeometry};
pub use settings::{Settings, SettingsError};
pub use title::{TitleConfig, TitleTemplate};
pub use tty::{FdProbe, TerminalProbe};

#[cfg(any(test, feature = "test-helpers"))]
pub use tty::ScriptedProbe;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, trace};
