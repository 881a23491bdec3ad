#![forbid(unsafe_code)]

//! Terminal title templates.
//!
//! The title is set with a terminal-specific escape sequence, for example
//! `ESC ] 0 ; text BEL` for xterm or `ESC _ text ESC \` for screen. Rather
//! than hard-coding those, the sequence comes from a template setting and is
//! expanded here.
//!
//! # Template Syntax
//!
//! | Sequence | Output |
//! |----------|--------|
//! | `\a` | BEL (0x07) |
//! | `\e` | ESC (0x1b) |
//! | `\n` | newline |
//! | `\s` | program name |
//! | `\T` | current status text |
//! | `\v` | program version |
//! | `\ooo` | byte with octal value `ooo` (1 to 3 digits) |
//! | `\\` | one backslash |
//! | `\x` (other) | `\x` unchanged |
//!
//! An octal escape that evaluates to NUL produces no output, and values
//! above `\377` keep their low 8 bits. A trailing lone backslash is emitted
//! as-is.

use std::io::{self, Write};

use crate::settings::{SET_TERM_STATUS, Settings, TERM_STATUS};

const BEL: u8 = 0x07;
const ESC: u8 = 0x1b;

/// Program identity substituted for `\s` and `\v`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleTemplate {
    program: String,
    version: String,
}

impl TitleTemplate {
    #[must_use]
    pub fn new(program: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            version: version.into(),
        }
    }

    /// Expand `template` with `status` substituted for `\T`.
    #[must_use]
    pub fn expand(&self, template: &[u8], status: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(template.len() + status.len());
        self.expand_into(template, status, &mut out);
        out
    }

    /// Expand `template` into `out`.
    pub fn expand_into(&self, template: &[u8], status: &[u8], out: &mut Vec<u8>) {
        let mut i = 0;
        while i < template.len() {
            let byte = template[i];
            i += 1;
            if byte != b'\\' {
                out.push(byte);
                continue;
            }
            let Some(&next) = template.get(i) else {
                out.push(b'\\');
                break;
            };
            i += 1;
            match next {
                b'\\' => out.push(b'\\'),
                b'0'..=b'7' => {
                    let (value, used) = parse_octal(&template[i - 1..]);
                    i += used - 1;
                    if value != 0 {
                        out.push(value);
                    }
                }
                b'a' => out.push(BEL),
                b'e' => out.push(ESC),
                b'n' => out.push(b'\n'),
                b's' => out.extend_from_slice(self.program.as_bytes()),
                b'T' => out.extend_from_slice(status),
                b'v' => out.extend_from_slice(self.version.as_bytes()),
                other => out.extend_from_slice(&[b'\\', other]),
            }
        }
    }

    /// Expand and write in a single call, then flush.
    pub fn write_title<W: Write + ?Sized>(
        &self,
        writer: &mut W,
        template: &[u8],
        status: &[u8],
    ) -> io::Result<()> {
        let bytes = self.expand(template, status);
        if bytes.is_empty() {
            return Ok(());
        }
        writer.write_all(&bytes)?;
        writer.flush()
    }
}

impl Default for TitleTemplate {
    fn default() -> Self {
        Self::new("statline", env!("CARGO_PKG_VERSION"))
    }
}

/// Read up to three octal digits. Returns the low 8 bits and the digit count.
fn parse_octal(digits: &[u8]) -> (u8, usize) {
    let mut value: u16 = 0;
    let mut used = 0;
    for &digit in digits.iter().take(3) {
        if !(b'0'..=b'7').contains(&digit) {
            break;
        }
        value = value * 8 + u16::from(digit - b'0');
        used += 1;
    }
    ((value & 0xff) as u8, used)
}

// ============================================================================
// Resolved configuration
// ============================================================================

/// Title settings resolved for one terminal type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleConfig {
    pub enabled: bool,
    pub template: Option<String>,
}

impl TitleConfig {
    /// Title writing switched off.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Title writing switched on with `template`.
    #[must_use]
    pub fn enabled(template: impl Into<String>) -> Self {
        Self {
            enabled: true,
            template: Some(template.into()),
        }
    }

    /// Query [`SET_TERM_STATUS`] and [`TERM_STATUS`] for `term`.
    #[must_use]
    pub fn resolve(settings: &Settings, term: Option<&str>) -> Self {
        let enabled = settings.query_bool(SET_TERM_STATUS, term);
        let template = settings
            .query(TERM_STATUS, term)
            .filter(|template| !template.is_empty())
            .map(str::to_string);
        crate::debug!(?term, enabled, has_template = template.is_some(), "title config resolved");
        Self { enabled, template }
    }

    /// The template to expand, if title writing should happen at all.
    #[must_use]
    pub fn active_template(&self) -> Option<&str> {
        if !self.enabled {
            return None;
        }
        self.template.as_deref().filter(|template| !template.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prog() -> TitleTemplate {
        TitleTemplate::new("prog", "1.0")
    }

    #[test]
    fn program_version_and_newline() {
        assert_eq!(prog().expand(b"\\s-\\v\\n", b""), b"prog-1.0\n");
    }

    #[test]
    fn octal_escapes_emit_bytes() {
        assert_eq!(prog().expand(b"\\101\\102", b""), b"AB");
        assert_eq!(prog().expand(b"\\7x", b""), b"\x07x");
        assert_eq!(prog().expand(b"\\1012", b""), b"A2", "at most three digits");
    }

    #[test]
    fn octal_overflow_keeps_low_byte() {
        assert_eq!(prog().expand(b"\\777", b""), vec![0xffu8]);
    }

    #[test]
    fn octal_nul_is_dropped() {
        assert_eq!(prog().expand(b"a\\000b\\0c", b""), b"abc");
    }

    #[test]
    fn double_backslash_consumes_escape() {
        assert_eq!(prog().expand(b"\\\\n", b""), b"\\n");
    }

    #[test]
    fn unknown_escape_passes_through() {
        assert_eq!(prog().expand(b"\\q\\8", b""), b"\\q\\8");
    }

    #[test]
    fn trailing_backslash_is_literal() {
        assert_eq!(prog().expand(b"end\\", b""), b"end\\");
    }

    #[test]
    fn status_and_control_bytes() {
        assert_eq!(
            prog().expand(b"\\e]0;\\T\\a", b"50% done"),
            b"\x1b]0;50% done\x07"
        );
    }

    #[test]
    fn screen_template_ends_with_string_terminator() {
        assert_eq!(prog().expand(b"\\e_\\T\\e\\\\", b"x"), b"\x1b_x\x1b\\");
    }

    #[test]
    fn write_title_skips_empty_expansion() {
        let mut out: Vec<u8> = Vec::new();
        prog().write_title(&mut out, b"", b"status").unwrap();
        assert!(out.is_empty());

        prog().write_title(&mut out, b"[\\T]", b"ok").unwrap();
        assert_eq!(out, b"[ok]");
    }

    #[test]
    fn config_resolves_from_settings() {
        let mut settings = Settings::with_defaults();
        assert_eq!(
            TitleConfig::resolve(&settings, Some("xterm")).active_template(),
            None,
            "disabled by default"
        );

        settings.set(SET_TERM_STATUS, None, "yes").unwrap();
        let config = TitleConfig::resolve(&settings, Some("xterm"));
        assert_eq!(config.active_template(), Some("\\e]0;\\T\\007"));

        let dumb = TitleConfig::resolve(&settings, Some("dumb"));
        assert!(dumb.enabled);
        assert_eq!(dumb.active_template(), None, "no template for dumb terminals");
    }

    #[test]
    fn enabled_with_empty_template_is_inactive() {
        assert_eq!(TitleConfig::enabled("").active_template(), None);
        assert_eq!(TitleConfig::disabled().active_template(), None);
    }
}
