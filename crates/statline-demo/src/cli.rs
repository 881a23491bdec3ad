#![forbid(unsafe_code)]

//! Command-line argument parsing for the demo.
//!
//! Parses args manually to keep the binary lean. Supports environment
//! variable overrides via the `STATLINE_DEMO_*` prefix.

use std::env;
use std::process;

use statline_core::settings::parse_bool;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const HELP_TEXT: &str = "\
statline demo: a simulated download reported on a single status line

USAGE:
    statline-demo [OPTIONS]

OPTIONS:
    --steps=N             Progress updates per file (default: 20)
    --step-ms=N           Milliseconds between updates (default: 120)
    --files=N             Number of simulated files (default: 3)
    --title               Mirror the status into the terminal title
    --title-template=T    Title escape template (implies --title)
    --log-lines           Print a permanent line when each file finishes
    --trace               Log redraw decisions to stderr
    --help, -h            Show this help message
    --version, -V         Show version

TITLE TEMPLATE ESCAPES:
    \\a BEL   \\e ESC   \\n newline   \\s program   \\v version
    \\T status text   \\ooo octal byte   \\\\ backslash

ENVIRONMENT VARIABLES:
    STATLINE_DEMO_STEPS           Override --steps
    STATLINE_DEMO_STEP_MS         Override --step-ms
    STATLINE_DEMO_FILES           Override --files
    STATLINE_DEMO_LOG_LINES       Enable --log-lines (yes|no)
    STATLINE_SET_TERM_STATUS      Enable title mirroring (yes|no)
    STATLINE_TERM_STATUS          Title template for every terminal
    RUST_LOG                      Filter for --trace output";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    /// Progress updates per simulated file.
    pub steps: u32,
    /// Delay between updates.
    pub step_ms: u64,
    /// Number of simulated files.
    pub files: u32,
    /// Mirror the status into the title.
    pub title: bool,
    /// Title template forced for every terminal type.
    pub title_template: Option<String>,
    /// Print a permanent line per finished file.
    pub log_lines: bool,
    /// Install a stderr tracing subscriber.
    pub trace: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            steps: 20,
            step_ms: 120,
            files: 3,
            title: false,
            title_template: None,
            log_lines: false,
            trace: false,
        }
    }
}

/// Why parsing stopped without producing options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliExit {
    Help,
    Version,
    Invalid(String),
}

impl Opts {
    /// Parse command-line arguments and environment variables, exiting the
    /// process for `--help`, `--version`, and invalid input.
    pub fn parse() -> Self {
        match Self::parse_from(env::args().skip(1), |key| env::var(key).ok()) {
            Ok(opts) => opts,
            Err(CliExit::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Err(CliExit::Version) => {
                println!("statline-demo {VERSION}");
                process::exit(0);
            }
            Err(CliExit::Invalid(message)) => {
                eprintln!("{message}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    /// Parse `args` with `lookup` standing in for the process environment.
    ///
    /// Environment variables take precedence over defaults but are overridden
    /// by explicit command-line flags.
    pub fn parse_from<I, F>(args: I, lookup: F) -> Result<Self, CliExit>
    where
        I: IntoIterator<Item = String>,
        F: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        // Apply environment variable defaults first
        if let Some(val) = lookup("STATLINE_DEMO_STEPS")
            && let Ok(n) = val.parse()
        {
            opts.steps = n;
        }
        if let Some(val) = lookup("STATLINE_DEMO_STEP_MS")
            && let Ok(n) = val.parse()
        {
            opts.step_ms = n;
        }
        if let Some(val) = lookup("STATLINE_DEMO_FILES")
            && let Ok(n) = val.parse()
        {
            opts.files = n;
        }
        if let Some(val) = lookup("STATLINE_DEMO_LOG_LINES")
            && let Some(flag) = parse_bool(&val)
        {
            opts.log_lines = flag;
        }

        // Parse command-line args (override env vars)
        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => return Err(CliExit::Help),
                "--version" | "-V" => return Err(CliExit::Version),
                "--title" => opts.title = true,
                "--log-lines" => opts.log_lines = true,
                "--trace" => opts.trace = true,
                other => {
                    if let Some(val) = other.strip_prefix("--steps=") {
                        opts.steps = parse_number("--steps", val)?;
                    } else if let Some(val) = other.strip_prefix("--step-ms=") {
                        opts.step_ms = parse_number("--step-ms", val)?;
                    } else if let Some(val) = other.strip_prefix("--files=") {
                        opts.files = parse_number("--files", val)?;
                    } else if let Some(val) = other.strip_prefix("--title-template=") {
                        opts.title = true;
                        opts.title_template = Some(val.to_string());
                    } else {
                        return Err(CliExit::Invalid(format!("Unknown argument: {other}")));
                    }
                }
            }
        }

        if opts.steps == 0 {
            return Err(CliExit::Invalid("--steps must be at least 1".into()));
        }
        Ok(opts)
    }
}

fn parse_number<T: std::str::FromStr>(flag: &str, val: &str) -> Result<T, CliExit> {
    val.parse()
        .map_err(|_| CliExit::Invalid(format!("Invalid {flag} value: {val}")))
}
