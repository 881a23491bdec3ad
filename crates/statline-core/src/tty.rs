#![forbid(unsafe_code)]

//! Output descriptor probes.
//!
//! A status line only draws when its descriptor is an interactive terminal
//! and the calling process owns that terminal. [`TerminalProbe`] bundles the
//! three questions the display asks about its descriptor:
//!
//! | Question | Unix | Elsewhere |
//! |----------|------|-----------|
//! | Is it a terminal? | `isatty` via [`IsTerminal`] | [`IsTerminal`] |
//! | Are we in the foreground process group? | `tcgetpgrp(fd) == getpgrp()` | always `true` |
//! | How big is it? | `crossterm::terminal::size` | `crossterm::terminal::size` |
//!
//! The size column is per process, not per descriptor: crossterm reports the
//! controlling terminal.
//!
//! The foreground check is what keeps a backgrounded job (`cmd &`, or after
//! `^Z` + `bg`) from scribbling over whatever the foreground program shows.

use std::io::{self, IsTerminal};

#[cfg(unix)]
use std::os::fd::{AsFd, OwnedFd};

/// Capability queries about an output descriptor.
pub trait TerminalProbe {
    /// Whether the descriptor is an interactive terminal.
    fn is_terminal(&self) -> bool;

    /// Whether the calling process is in the terminal's foreground process
    /// group. Platforms without job control report `true`.
    fn is_foreground(&self) -> bool;

    /// Raw `(cols, rows)` as reported by the OS. Zero dimensions are passed
    /// through; [`TerminalGeometry`](crate::geometry::TerminalGeometry)
    /// applies the fallbacks.
    fn size(&self) -> io::Result<(u16, u16)>;
}

impl<P: TerminalProbe + ?Sized> TerminalProbe for Box<P> {
    fn is_terminal(&self) -> bool {
        (**self).is_terminal()
    }

    fn is_foreground(&self) -> bool {
        (**self).is_foreground()
    }

    fn size(&self) -> io::Result<(u16, u16)> {
        (**self).size()
    }
}

// ============================================================================
// Descriptor-backed probe
// ============================================================================

/// Probe bound to a real output descriptor.
///
/// On Unix the probe owns a duplicate of the descriptor, so it stays valid
/// for as long as the probe lives regardless of what happens to the writer
/// it was created from.
///
/// The terminal and foreground checks use that descriptor. [`size`] does
/// not: `crossterm::terminal::size` asks the process's controlling terminal,
/// so a probe bound to some other tty reports the controlling terminal's
/// size.
///
/// [`size`]: TerminalProbe::size
#[derive(Debug)]
pub struct FdProbe {
    #[cfg(unix)]
    fd: OwnedFd,
    #[cfg(not(unix))]
    terminal: bool,
}

#[cfg(unix)]
impl FdProbe {
    /// Bind to the descriptor behind `handle` (stdout, a file, a tty).
    pub fn new(handle: &impl AsFd) -> io::Result<Self> {
        Ok(Self {
            fd: handle.as_fd().try_clone_to_owned()?,
        })
    }
}

#[cfg(not(unix))]
impl FdProbe {
    /// Bind to `handle`. Only terminal-ness is recorded on this platform.
    pub fn new(handle: &impl IsTerminal) -> io::Result<Self> {
        Ok(Self {
            terminal: handle.is_terminal(),
        })
    }
}

impl TerminalProbe for FdProbe {
    #[cfg(unix)]
    fn is_terminal(&self) -> bool {
        self.fd.is_terminal()
    }

    #[cfg(not(unix))]
    fn is_terminal(&self) -> bool {
        self.terminal
    }

    #[cfg(unix)]
    fn is_foreground(&self) -> bool {
        match nix::unistd::tcgetpgrp(&self.fd) {
            Ok(foreground) => foreground == nix::unistd::getpgrp(),
            Err(errno) => {
                crate::trace!(%errno, "tcgetpgrp failed; treating as background");
                false
            }
        }
    }

    #[cfg(not(unix))]
    fn is_foreground(&self) -> bool {
        true
    }

    fn size(&self) -> io::Result<(u16, u16)> {
        crossterm::terminal::size()
    }
}

// ============================================================================
// Scripted probe (tests)
// ============================================================================

#[cfg(any(test, feature = "test-helpers"))]
mod scripted {
    use super::TerminalProbe;
    use std::cell::RefCell;
    use std::io;
    use std::rc::Rc;

    #[derive(Debug)]
    struct ScriptedState {
        terminal: bool,
        foreground: bool,
        size: Option<(u16, u16)>,
        size_queries: usize,
    }

    /// In-memory terminal for deterministic tests.
    ///
    /// Clones share state, so a test can keep one handle and reshape the
    /// "terminal" after handing another to the code under test.
    #[derive(Debug, Clone)]
    pub struct ScriptedProbe {
        state: Rc<RefCell<ScriptedState>>,
    }

    impl ScriptedProbe {
        /// Foreground terminal of the given size.
        #[must_use]
        pub fn terminal(cols: u16, rows: u16) -> Self {
            Self {
                state: Rc::new(RefCell::new(ScriptedState {
                    terminal: true,
                    foreground: true,
                    size: Some((cols, rows)),
                    size_queries: 0,
                })),
            }
        }

        /// A pipe or regular file.
        #[must_use]
        pub fn not_a_terminal() -> Self {
            let probe = Self::terminal(80, 24);
            probe.set_terminal(false);
            probe
        }

        pub fn set_terminal(&self, terminal: bool) {
            self.state.borrow_mut().terminal = terminal;
        }

        pub fn set_foreground(&self, foreground: bool) {
            self.state.borrow_mut().foreground = foreground;
        }

        /// `None` makes the size query fail.
        pub fn set_size(&self, size: Option<(u16, u16)>) {
            self.state.borrow_mut().size = size;
        }

        /// Number of size queries answered so far.
        #[must_use]
        pub fn size_queries(&self) -> usize {
            self.state.borrow().size_queries
        }
    }

    impl TerminalProbe for ScriptedProbe {
        fn is_terminal(&self) -> bool {
            self.state.borrow().terminal
        }

        fn is_foreground(&self) -> bool {
            self.state.borrow().foreground
        }

        fn size(&self) -> io::Result<(u16, u16)> {
            let mut state = self.state.borrow_mut();
            state.size_queries += 1;
            state
                .size
                .ok_or_else(|| io::Error::new(io::ErrorKind::Unsupported, "no window size"))
        }
    }
}

#[cfg(any(test, feature = "test-helpers"))]
pub use scripted::ScriptedProbe;
