//! Fixed-capacity text storage for drawing without a heap.

use core::fmt::{self, Write};

/// A line of ASCII text with room for `N` bytes.
///
/// Writes past the capacity are truncated rather than failing, so formatting into it
/// never aborts a frame.
#[derive(Clone)]
pub struct TextLine<const N: usize> {
    buf: [u8; N],
    len: usize,
}

impl<const N: usize> TextLine<N> {
    pub const fn new() -> Self {
        Self { buf: [0; N], len: 0 }
    }

    pub fn as_str(&self) -> &str {
        // Only printable ASCII is ever stored.
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }

    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Appends a printable ASCII character. Returns false if it was not stored.
    pub fn push(&mut self, ch: char) -> bool {
        if !(ch.is_ascii_graphic() || ch == ' ') || self.is_full() {
            return false;
        }
        self.buf[self.len] = ch as u8;
        self.len += 1;
        true
    }

    pub fn pop(&mut self) -> Option<char> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        Some(self.buf[self.len] as char)
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl<const N: usize> Default for TextLine<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Write for TextLine<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for ch in s.chars() {
            self.push(ch);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop() {
        let mut line = TextLine::<4>::new();
        assert!(line.push('a'));
        assert!(line.push(' '));
        assert!(!line.push('\n'));
        assert_eq!(line.as_str(), "a ");
        assert_eq!(line.pop(), Some(' '));
        assert_eq!(line.as_str(), "a");
    }

    #[test]
    fn test_format_truncates() {
        let mut line = TextLine::<8>::new();
        write!(line, "x={} y={}", 1234, 5678).unwrap();
        assert_eq!(line.as_str(), "x=1234 y");
        assert!(line.is_full());
    }
}
