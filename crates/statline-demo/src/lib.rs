#![forbid(unsafe_code)]

//! statline demo: a simulated download on a single status line.

pub mod cli;
pub mod transfer;

use statline_core::settings::{SET_TERM_STATUS, TERM_STATUS};
use statline_core::{Settings, SettingsError};

/// Title settings: built-in templates, then `STATLINE_*` overrides from
/// `lookup`, then the command line.
pub fn settings_for<F>(opts: &cli::Opts, lookup: F) -> Result<Settings, SettingsError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut settings = Settings::with_defaults();
    settings.apply_env_from(lookup)?;
    if opts.title {
        settings.set(SET_TERM_STATUS, None, "yes")?;
    }
    if let Some(template) = &opts.title_template {
        // `*` outranks the built-in per-terminal entries.
        settings.set(TERM_STATUS, Some("*"), template)?;
    }
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use statline_core::TitleConfig;

    #[test]
    fn defaults_keep_title_off() {
        let settings = settings_for(&cli::Opts::default(), |_| None).unwrap();
        assert_eq!(TitleConfig::resolve(&settings, Some("xterm")).active_template(), None);
    }

    #[test]
    fn title_flag_uses_terminal_template() {
        let opts = cli::Opts {
            title: true,
            ..cli::Opts::default()
        };
        let settings = settings_for(&opts, |_| None).unwrap();
        assert_eq!(
            TitleConfig::resolve(&settings, Some("xterm-256color")).active_template(),
            Some("\\e]0;\\T\\007")
        );
    }

    #[test]
    fn template_flag_overrides_every_terminal() {
        let opts = cli::Opts {
            title: true,
            title_template: Some("[\\T]".into()),
            ..cli::Opts::default()
        };
        let settings = settings_for(&opts, |_| None).unwrap();
        for term in ["screen", "xterm", "vt100"] {
            assert_eq!(
                TitleConfig::resolve(&settings, Some(term)).active_template(),
                Some("[\\T]"),
                "{term}"
            );
        }
    }

    #[test]
    fn env_template_overrides_every_terminal() {
        let opts = cli::Opts {
            title: true,
            ..cli::Opts::default()
        };
        let settings = settings_for(&opts, |key| {
            (key == "STATLINE_TERM_STATUS").then(|| "[\\T]".to_string())
        })
        .unwrap();
        for term in [Some("vt100"), Some("xterm-256color"), Some("screen"), None] {
            assert_eq!(
                TitleConfig::resolve(&settings, term).active_template(),
                Some("[\\T]"),
                "{term:?}"
            );
        }
    }

    #[test]
    fn template_flag_beats_env_template() {
        let opts = cli::Opts {
            title: true,
            title_template: Some("<\\T>".into()),
            ..cli::Opts::default()
        };
        let settings = settings_for(&opts, |key| {
            (key == "STATLINE_TERM_STATUS").then(|| "[\\T]".to_string())
        })
        .unwrap();
        assert_eq!(
            TitleConfig::resolve(&settings, Some("xterm")).active_template(),
            Some("<\\T>")
        );
    }

    #[test]
    fn bad_env_override_is_an_error() {
        let result = settings_for(&cli::Opts::default(), |key| {
            (key == "STATLINE_SET_TERM_STATUS").then(|| "perhaps".to_string())
        });
        assert!(matches!(result, Err(SettingsError::InvalidBool { .. })));
    }
}
