#![forbid(unsafe_code)]

//! Whitespace tokenizer with the line-level skips `.netrc` needs.

/// Cursor over `.netrc` text.
#[derive(Debug, Clone)]
pub(crate) struct Tokens<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Tokens<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    /// Next whitespace-delimited token, or `None` at end of input.
    pub(crate) fn next_token(&mut self) -> Option<&'a str> {
        let rest = &self.src[self.pos..];
        let start = rest.len() - rest.trim_start().len();
        let rest = &rest[start..];
        if rest.is_empty() {
            self.pos = self.src.len();
            return None;
        }
        let len = rest.find(char::is_whitespace).unwrap_or(rest.len());
        self.pos += start + len;
        Some(&rest[..len])
    }

    /// Drop everything up to and including the next newline.
    pub(crate) fn skip_line(&mut self) {
        let rest = &self.src[self.pos..];
        self.pos += rest.find('\n').map_or(rest.len(), |nl| nl + 1);
    }

    /// Skip a macro definition: the rest of the `macdef` line, then body
    /// lines up to and including the first blank one.
    pub(crate) fn skip_macdef(&mut self) {
        self.skip_line();
        while self.pos < self.src.len() {
            let rest = &self.src[self.pos..];
            let line = rest.split('\n').next().unwrap_or(rest);
            self.skip_line();
            if line.trim_matches([' ', '\t', '\r']).is_empty() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_any_whitespace() {
        let mut tokens = Tokens::new("  machine\thost\n\nlogin  me ");
        assert_eq!(tokens.next_token(), Some("machine"));
        assert_eq!(tokens.next_token(), Some("host"));
        assert_eq!(tokens.next_token(), Some("login"));
        assert_eq!(tokens.next_token(), Some("me"));
        assert_eq!(tokens.next_token(), None);
        assert_eq!(tokens.next_token(), None);
    }

    #[test]
    fn skip_line_resumes_on_next_line() {
        let mut tokens = Tokens::new("#a comment here\nnext");
        assert_eq!(tokens.next_token(), Some("#a"));
        tokens.skip_line();
        assert_eq!(tokens.next_token(), Some("next"));
    }

    #[test]
    fn skip_line_at_end_of_input() {
        let mut tokens = Tokens::new("# trailing");
        tokens.next_token();
        tokens.skip_line();
        assert_eq!(tokens.next_token(), None);
    }

    #[test]
    fn macdef_body_ends_at_blank_line() {
        let mut tokens = Tokens::new("macdef init\ncd /pub\nbinary\n \t\nmachine h");
        assert_eq!(tokens.next_token(), Some("macdef"));
        tokens.skip_macdef();
        assert_eq!(tokens.next_token(), Some("machine"));
    }

    #[test]
    fn unterminated_macdef_consumes_rest() {
        let mut tokens = Tokens::new("macdef init\ncd /pub\nmachine h");
        tokens.next_token();
        tokens.skip_macdef();
        assert_eq!(tokens.next_token(), None);
    }
}
