#![forbid(unsafe_code)]

//! Length-capped byte buffers for status and title text.
//!
//! Status text is handled as raw bytes, not characters: truncation happens at
//! byte offsets and no display width is computed. A [`BoundedText`] behaves
//! like a fixed `char[N]` buffer filled with `snprintf`: at most `N - 1` bytes
//! are kept and anything past that is dropped without error.
//!
//! # Invariants
//!
//! 1. `len() <= capacity() - 1` at all times.
//! 2. Every mutating operation truncates deterministically (longest prefix).
//! 3. Equality compares content only, never capacity.

use std::fmt;

/// Capacity of the status, pending, and default-title buffers.
pub const STATUS_CAPACITY: usize = 2048;

/// A byte buffer that never grows past its capacity.
#[derive(Clone)]
pub struct BoundedText {
    bytes: Vec<u8>,
    limit: usize,
}

impl BoundedText {
    /// Empty buffer with [`STATUS_CAPACITY`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(STATUS_CAPACITY)
    }

    /// Empty buffer holding at most `capacity - 1` bytes.
    ///
    /// A capacity of zero is treated as one (an always-empty buffer).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let limit = capacity.max(1) - 1;
        Self {
            bytes: Vec::with_capacity(limit.min(256)),
            limit,
        }
    }

    /// Copy of `bytes`, truncated to fit.
    #[must_use]
    pub fn from_bytes(capacity: usize, bytes: &[u8]) -> Self {
        let mut text = Self::with_capacity(capacity);
        text.push_bytes(bytes);
        text
    }

    /// Render formatting arguments into a bounded buffer (`snprintf`).
    #[must_use]
    pub fn from_fmt(capacity: usize, args: fmt::Arguments<'_>) -> Self {
        let mut text = Self::with_capacity(capacity);
        // Our `write_str` never fails; overflow is truncated.
        let _ = fmt::Write::write_fmt(&mut text, args);
        text
    }

    /// Maximum buffer size including the reserved terminator slot.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.limit + 1
    }

    /// Stored bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Keep only the first `len` bytes.
    pub fn truncate(&mut self, len: usize) {
        self.bytes.truncate(len);
    }

    /// Replace the content with a (truncated) copy of `bytes`.
    pub fn assign(&mut self, bytes: &[u8]) {
        self.bytes.clear();
        self.push_bytes(bytes);
    }

    /// Append as much of `bytes` as fits. Returns the number of bytes kept.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> usize {
        let room = self.limit.saturating_sub(self.bytes.len());
        let take = room.min(bytes.len());
        self.bytes.extend_from_slice(&bytes[..take]);
        take
    }

    /// Remove trailing ASCII spaces (only `' '`, not tabs or newlines).
    pub fn trim_trailing_spaces(&mut self) {
        while self.bytes.last() == Some(&b' ') {
            self.bytes.pop();
        }
    }

    /// Append up to `count` spaces while the length stays below `bound`.
    pub fn pad_spaces(&mut self, count: usize, bound: usize) {
        let bound = bound.min(self.limit);
        let target = self.bytes.len().saturating_add(count).min(bound);
        if target > self.bytes.len() {
            self.bytes.resize(target, b' ');
        }
    }

    /// Lossy UTF-8 view, for logs and assertions.
    #[must_use]
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

impl Default for BoundedText {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for BoundedText {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for BoundedText {}

impl PartialEq<[u8]> for BoundedText {
    fn eq(&self, other: &[u8]) -> bool {
        self.bytes == other
    }
}

impl fmt::Debug for BoundedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedText")
            .field("text", &String::from_utf8_lossy(&self.bytes))
            .field("capacity", &self.capacity())
            .finish()
    }
}

impl fmt::Write for BoundedText {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_bytes(s.as_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_at_most_capacity_minus_one_bytes() {
        let text = BoundedText::from_bytes(4, b"abcdef");
        assert_eq!(text.as_bytes(), b"abc");
        assert_eq!(text.capacity(), 4);
    }

    #[test]
    fn zero_capacity_is_always_empty() {
        let mut text = BoundedText::with_capacity(0);
        assert_eq!(text.push_bytes(b"abc"), 0);
        assert!(text.is_empty());
    }

    #[test]
    fn formatting_truncates_like_snprintf() {
        let text = BoundedText::from_fmt(6, format_args!("{}-{}", "hello", 42));
        assert_eq!(text.as_bytes(), b"hello");
    }

    #[test]
    fn trim_only_strips_spaces() {
        let mut text = BoundedText::from_bytes(64, b"done \t  ");
        text.trim_trailing_spaces();
        assert_eq!(text.as_bytes(), b"done \t");
    }

    #[test]
    fn pad_respects_bound() {
        let mut text = BoundedText::from_bytes(64, b"ab");
        text.pad_spaces(10, 5);
        assert_eq!(text.as_bytes(), b"ab   ");

        text.pad_spaces(3, 4);
        assert_eq!(text.len(), 5, "padding never shrinks the buffer");
    }

    #[test]
    fn equality_ignores_capacity() {
        let a = BoundedText::from_bytes(8, b"same");
        let b = BoundedText::from_bytes(64, b"same");
        assert_eq!(a, b);
        assert!(a == b"same"[..]);
    }

    #[test]
    fn assign_replaces_content() {
        let mut text = BoundedText::from_bytes(8, b"old text");
        text.assign(b"new");
        assert_eq!(text.as_bytes(), b"new");
    }
}
