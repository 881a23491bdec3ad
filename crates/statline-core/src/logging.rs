#![forbid(unsafe_code)]

//! Logging and tracing support.
//!
//! Re-exports the tracing macros this crate uses when the `tracing` feature is
//! enabled. When the feature is disabled, no-op macros with the same names are
//! exported instead so call sites compile unchanged.

#[cfg(feature = "tracing")]
pub use tracing::{debug, trace};

// When tracing is not enabled, provide no-op macros
#[cfg(not(feature = "tracing"))]
mod noop_macros {
    /// No-op debug macro when tracing is disabled.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// No-op trace macro when tracing is disabled.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }
}
