#![forbid(unsafe_code)]

//! Settings registry keyed by option name and closure.
//!
//! Every option can hold one value per *closure*: a glob pattern matched
//! against a qualifier supplied at query time. For terminal options the
//! qualifier is the terminal type (`$TERM`), which is how a single registry
//! carries different title escapes for `screen`, `xterm`, and `rxvt`.
//!
//! # Resolution
//!
//! 1. The most recently set entry whose closure matches the qualifier.
//! 2. Otherwise the most recently set entry without a closure.
//! 3. Otherwise the option's built-in default.
//!
//! # Environment Overrides
//!
//! | Variable | Option |
//! |----------|--------|
//! | `STATLINE_SET_TERM_STATUS` | `cmd:set-term-status` |
//! | `STATLINE_TERM_STATUS` | `cmd:term-status` |
//!
//! `STATLINE_SET_TERM_STATUS` is stored without a closure.
//! `STATLINE_TERM_STATUS` is stored under closure `*`, so it outranks the
//! built-in per-terminal templates and applies to every terminal type.
//!
//! A missing qualifier is matched as the empty string: `*` still applies,
//! patterns such as `*xterm*` do not.

use std::env;
use std::fmt;

/// Whether status text is mirrored into the terminal title.
pub const SET_TERM_STATUS: &str = "cmd:set-term-status";

/// Template expanded into the terminal title (see [`crate::title`]).
pub const TERM_STATUS: &str = "cmd:term-status";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OptionKind {
    Bool,
    Text,
}

struct OptionDecl {
    name: &'static str,
    kind: OptionKind,
    default: &'static str,
    env: &'static str,
    env_closure: Option<&'static str>,
}

const OPTIONS: &[OptionDecl] = &[
    OptionDecl {
        name: SET_TERM_STATUS,
        kind: OptionKind::Bool,
        default: "no",
        env: "STATLINE_SET_TERM_STATUS",
        env_closure: None,
    },
    OptionDecl {
        name: TERM_STATUS,
        kind: OptionKind::Text,
        default: "",
        env: "STATLINE_TERM_STATUS",
        env_closure: Some("*"),
    },
];

/// Built-in per-terminal title templates.
const TERM_STATUS_DEFAULTS: &[(&str, &str)] = &[
    ("*screen*", "\\e_\\T\\e\\\\"),
    ("*xterm*", "\\e]0;\\T\\007"),
    ("*rxvt*", "\\e]0;\\T\\007"),
];

fn decl(name: &str) -> Option<&'static OptionDecl> {
    OPTIONS.iter().find(|decl| decl.name == name)
}

/// Parse a boolean setting value.
///
/// Accepts `yes/no`, `on/off`, `true/false`, and `1/0`, ignoring case and
/// surrounding whitespace.
#[must_use]
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "yes" | "on" | "true" | "1" => Some(true),
        "no" | "off" | "false" | "0" => Some(false),
        _ => None,
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors from updating the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// No option with this name exists.
    UnknownOption(String),
    /// A boolean option was given a value [`parse_bool`] rejects.
    InvalidBool { name: String, value: String },
    /// The closure is not a valid glob pattern.
    InvalidClosure { closure: String, reason: String },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::UnknownOption(name) => write!(f, "unknown setting: {name}"),
            SettingsError::InvalidBool { name, value } => {
                write!(f, "{name}: invalid boolean value {value:?}")
            }
            SettingsError::InvalidClosure { closure, reason } => {
                write!(f, "invalid closure pattern {closure:?}: {reason}")
            }
        }
    }
}

impl std::error::Error for SettingsError {}

// ============================================================================
// Registry
// ============================================================================

#[derive(Debug, Clone)]
struct Entry {
    name: &'static str,
    closure: Option<glob::Pattern>,
    value: String,
}

impl Entry {
    fn matches(&self, name: &str, qualifier: Option<&str>) -> bool {
        if self.name != name {
            return false;
        }
        self.closure
            .as_ref()
            .is_some_and(|pattern| pattern.matches(qualifier.unwrap_or("")))
    }
}

/// Option registry.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    entries: Vec<Entry>,
}

impl Settings {
    /// Registry with declared defaults only (no per-terminal templates).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in per-terminal title templates.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut settings = Self::new();
        for (closure, template) in TERM_STATUS_DEFAULTS {
            settings.entries.push(Entry {
                name: TERM_STATUS,
                // Built-in patterns are known to be valid globs.
                closure: glob::Pattern::new(closure).ok(),
                value: (*template).to_string(),
            });
        }
        settings
    }

    /// Set `name` (optionally scoped to `closure`) to `value`.
    pub fn set(
        &mut self,
        name: &str,
        closure: Option<&str>,
        value: &str,
    ) -> Result<(), SettingsError> {
        let decl = decl(name).ok_or_else(|| SettingsError::UnknownOption(name.to_string()))?;
        if decl.kind == OptionKind::Bool && parse_bool(value).is_none() {
            return Err(SettingsError::InvalidBool {
                name: name.to_string(),
                value: value.to_string(),
            });
        }
        let closure = closure
            .map(|raw| {
                glob::Pattern::new(raw).map_err(|err| SettingsError::InvalidClosure {
                    closure: raw.to_string(),
                    reason: err.to_string(),
                })
            })
            .transpose()?;
        crate::debug!(setting = decl.name, closure = ?closure.as_ref().map(glob::Pattern::as_str), "setting updated");
        self.entries.push(Entry {
            name: decl.name,
            closure,
            value: value.to_string(),
        });
        Ok(())
    }

    /// Resolve `name` for `qualifier`. `None` only for unknown options.
    #[must_use]
    pub fn query(&self, name: &str, qualifier: Option<&str>) -> Option<&str> {
        let decl = decl(name)?;
        let scoped = self
            .entries
            .iter()
            .rev()
            .find(|entry| entry.matches(name, qualifier));
        let global = || {
            self.entries
                .iter()
                .rev()
                .find(|entry| entry.name == name && entry.closure.is_none())
        };
        Some(
            scoped
                .or_else(global)
                .map_or(decl.default, |entry| entry.value.as_str()),
        )
    }

    /// Resolve a boolean option. Unknown options and unparsable values read
    /// as `false`.
    #[must_use]
    pub fn query_bool(&self, name: &str, qualifier: Option<&str>) -> bool {
        self.query(name, qualifier)
            .and_then(parse_bool)
            .unwrap_or(false)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), SettingsError> {
        self.apply_env_from(|key| env::var(key).ok())
    }

    /// Apply overrides using `lookup` in place of the environment.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        for decl in OPTIONS {
            if let Some(value) = lookup(decl.env) {
                self.set(decl.name, decl.env_closure, &value)?;
            }
        }
        Ok(())
    }
}
