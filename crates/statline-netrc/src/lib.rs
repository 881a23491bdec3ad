#![forbid(unsafe_code)]

//! Credential lookup in `~/.netrc`.
//!
//! Only the subset needed to fill in a login for one host is supported:
//!
//! | Token | Meaning |
//! |-------|---------|
//! | `machine NAME` | start an entry for host `NAME` |
//! | `default` | start the catch-all entry (ignored) |
//! | `login NAME` | user name for the current machine |
//! | `password PASS` | password; `\ooo` octal escapes are decoded |
//! | `account ACCT` | account string |
//! | `macdef NAME` | macro definition, skipped up to the next blank line |
//! | `#...` | comment to end of line |
//!
//! Host and user names compare ASCII case-insensitively. The first machine
//! that matches the host (and the user, when one is given) wins. Each
//! `login` under that machine replaces the previous one, so without a
//! requested user the last login is returned, and a requested user only
//! matches if no other login follows it. The first `password` and `account`
//! after the login are kept.
//!
//! Passwords never appear in logs or in `Debug` output.

mod tokens;

use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::tokens::Tokens;

/// File name looked up in `$HOME`.
pub const NETRC_FILE: &str = ".netrc";

/// A matched credential record.
#[derive(Clone, PartialEq, Eq)]
pub struct NetrcEntry {
    pub host: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub account: Option<String>,
}

impl fmt::Debug for NetrcEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetrcEntry")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("account", &self.account)
            .finish()
    }
}

/// Look up `host` (and optionally `user`) in `$HOME/.netrc`.
///
/// A missing `HOME` or an unreadable file yields `None`; the latter is
/// logged at `debug` level.
#[must_use]
pub fn lookup_host(host: &str, user: Option<&str>) -> Option<NetrcEntry> {
    let home = env::var_os("HOME");
    lookup_host_from(home.as_deref().map(Path::new), host, user)
}

/// [`lookup_host`] with `home` standing in for `$HOME`.
#[must_use]
pub fn lookup_host_from(
    home: Option<&Path>,
    host: &str,
    user: Option<&str>,
) -> Option<NetrcEntry> {
    let path = home?.join(NETRC_FILE);
    match lookup_in(&path, host, user) {
        Ok(entry) => entry,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "cannot open netrc");
            None
        }
    }
}

/// Look up `host` (and optionally `user`) in the file at `path`.
pub fn lookup_in(path: &Path, host: &str, user: Option<&str>) -> io::Result<Option<NetrcEntry>> {
    let bytes = fs::read(path)?;
    let content = String::from_utf8_lossy(&bytes);
    Ok(parse(&content, host, user))
}

/// Scan `.netrc` text for `host` (and optionally `user`).
#[must_use]
pub fn parse(content: &str, host: &str, user: Option<&str>) -> Option<NetrcEntry> {
    let mut scan = Scan::new(host, user);
    let mut tokens = Tokens::new(content);

    while let Some(token) = tokens.next_token() {
        if token.starts_with('#') {
            tokens.skip_line();
            continue;
        }
        match token {
            "macdef" => tokens.skip_macdef(),
            "default" => scan.machine = None,
            "machine" => {
                if scan.is_complete() {
                    break;
                }
                let Some(name) = tokens.next_token() else {
                    break;
                };
                scan.start_machine(name);
            }
            "login" => {
                let Some(login) = tokens.next_token() else {
                    break;
                };
                scan.login(login);
            }
            "password" => {
                let Some(raw) = tokens.next_token() else {
                    break;
                };
                if scan.accepts_detail() && scan.password.is_none() {
                    scan.password = Some(decode_password(raw));
                }
            }
            "account" => {
                let Some(account) = tokens.next_token() else {
                    break;
                };
                if scan.accepts_detail() && scan.account.is_none() {
                    scan.account = Some(account.to_string());
                }
            }
            _ => {}
        }
    }

    scan.finish()
}

/// Lookup state while walking the token stream.
struct Scan<'q> {
    host: &'q str,
    user: Option<&'q str>,
    machine: Option<String>,
    login: Option<String>,
    password: Option<String>,
    account: Option<String>,
    host_found: bool,
    user_found: bool,
}

impl<'q> Scan<'q> {
    fn new(host: &'q str, user: Option<&'q str>) -> Self {
        Self {
            host,
            user,
            machine: None,
            login: None,
            password: None,
            account: None,
            host_found: false,
            user_found: false,
        }
    }

    fn is_complete(&self) -> bool {
        self.host_found && self.user_found
    }

    fn on_matching_machine(&self) -> bool {
        self.machine
            .as_deref()
            .is_some_and(|machine| machine.eq_ignore_ascii_case(self.host))
    }

    fn start_machine(&mut self, name: &str) {
        self.machine = Some(name.to_string());
        self.login = None;
        self.password = None;
        self.account = None;
        self.host_found = name.eq_ignore_ascii_case(self.host);
        self.user_found = false;
    }

    fn login(&mut self, login: &str) {
        if !self.on_matching_machine() {
            return;
        }
        self.login = Some(login.to_string());
        self.password = None;
        self.account = None;
        self.user_found = self
            .user
            .is_none_or(|wanted| login.eq_ignore_ascii_case(wanted));
    }

    /// Whether `password`/`account` tokens belong to the requested login.
    fn accepts_detail(&self) -> bool {
        if !self.on_matching_machine() {
            return false;
        }
        match self.user {
            None => true,
            Some(wanted) => self
                .login
                .as_deref()
                .is_some_and(|login| login.eq_ignore_ascii_case(wanted)),
        }
    }

    fn finish(self) -> Option<NetrcEntry> {
        if !self.is_complete() {
            return None;
        }
        debug!(
            host = self.host,
            user = ?self.login,
            has_password = self.password.is_some(),
            has_account = self.account.is_some(),
            "found netrc entry"
        );
        Some(NetrcEntry {
            host: self.host.to_string(),
            user: self.login.filter(|login| !login.is_empty()),
            password: self.password.filter(|password| !password.is_empty()),
            account: self.account.filter(|account| !account.is_empty()),
        })
    }
}

/// Decode `\ooo` octal escapes (one to three digits).
///
/// Escapes whose value has a zero low byte are left as written.
fn decode_password(raw: &str) -> String {
    let src = raw.as_bytes();
    let mut out = Vec::with_capacity(src.len());
    let mut i = 0;
    while i < src.len() {
        let byte = src[i];
        if byte == b'\\'
            && let Some((value, used)) = octal_escape(&src[i + 1..])
        {
            out.push(value);
            i += 1 + used;
            continue;
        }
        out.push(byte);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn octal_escape(digits: &[u8]) -> Option<(u8, usize)> {
    let mut value: u16 = 0;
    let mut used = 0;
    for &digit in digits.iter().take(3) {
        if !(b'0'..=b'7').contains(&digit) {
            break;
        }
        value = value * 8 + u16::from(digit - b'0');
        used += 1;
    }
    let byte = (value & 0xff) as u8;
    (used > 0 && byte != 0).then_some((byte, used))
}
