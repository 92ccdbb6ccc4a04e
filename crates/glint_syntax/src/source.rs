//! Byte-oriented source buffer with line/column tracking.
//!
//! Mirrors the character-at-a-time contract the lexer is built on: every
//! `read()` updates line/column by the same rules `decode_location` uses to
//! recover a location from a raw offset, so the two routes can never
//! disagree (I1).

use glint_base::{SourceInfo, SourceLocation};
use thiserror::Error;

/// An opaque snapshot of a [`SourceBuffer`]'s cursor state, usable to
/// rewind a speculative parse.
#[derive(Clone)]
pub struct SourceCursor {
    pos: usize,
    mark: usize,
    mark_location: SourceLocation,
    line: u32,
    column: u32,
}

const TAB_SIZE: u32 = 4;
const TERMINATOR: u8 = 0;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source buffer contains a NUL byte at offset {offset}")]
    ContainsTerminator { offset: usize },
}

/// Owns a source blob's bytes, guaranteed to end in a single terminator byte
/// with no other terminator bytes present. Tracks a read cursor and a mark
/// cursor, both given in line/column as well as raw offset.
pub struct SourceBuffer {
    info: SourceInfo,
    data: Vec<u8>,
    pos: usize,
    mark: usize,
    mark_location: SourceLocation,
    line: u32,
    column: u32,
}

impl SourceBuffer {
    /// Builds a buffer from `bytes`, which must contain no NUL byte. A
    /// terminator is appended internally.
    pub fn new(info: SourceInfo, bytes: &[u8]) -> Result<Self, SourceError> {
        if let Some(offset) = bytes.iter().position(|&b| b == TERMINATOR) {
            return Err(SourceError::ContainsTerminator { offset });
        }
        let mut data = Vec::with_capacity(bytes.len() + 1);
        data.extend_from_slice(bytes);
        data.push(TERMINATOR);
        let mark_location = SourceLocation::new(info.clone(), 1, 1);
        Ok(SourceBuffer {
            info,
            data,
            pos: 0,
            mark: 0,
            mark_location,
            line: 1,
            column: 1,
        })
    }

    pub fn info(&self) -> &SourceInfo {
        &self.info
    }

    /// The next byte to be read, or the terminator at end of input.
    pub fn peek(&self) -> u8 {
        self.data[self.pos]
    }

    /// Looks `ahead` bytes past the read cursor without advancing it.
    /// Returns the terminator if `ahead` runs past the end of the buffer.
    pub fn peek_at(&self, ahead: usize) -> u8 {
        self.data.get(self.pos + ahead).copied().unwrap_or(TERMINATOR)
    }

    /// Reads and returns the next byte, advancing line/column per the
    /// newline/tab rules. Returns the terminator forever once reached.
    pub fn read(&mut self) -> u8 {
        let c = self.data[self.pos];
        match c {
            TERMINATOR => return c,
            b'\n' => {
                self.line += 1;
                self.column = 1;
            }
            b'\r' => {
                if self.data.get(self.pos + 1) == Some(&b'\n') {
                    self.column += 1;
                } else {
                    self.line += 1;
                    self.column = 1;
                }
            }
            b'\t' => {
                self.column += TAB_SIZE - ((self.column - 1) % TAB_SIZE);
            }
            _ => {
                self.column += 1;
            }
        }
        self.pos += 1;
        c
    }

    /// Moves the read cursor back by one byte.
    ///
    /// # Panics
    ///
    /// Panics if nothing has been read yet, or if the last byte read was
    /// whitespace (undefined per the buffer's contract).
    pub fn unread(&mut self) {
        assert!(self.pos != 0, "unread() with nothing read yet");
        self.pos -= 1;
        let c = self.data[self.pos];
        assert!(c > 32, "unread() of a non-whitespace-only byte");
        self.column -= 1;
    }

    /// Inserts `bytes` immediately before the terminator. Cursor positions
    /// are preserved (they refer to offsets, which do not move for bytes
    /// already read).
    pub fn append(&mut self, bytes: &[u8]) -> Result<(), SourceError> {
        if let Some(offset) = bytes.iter().position(|&b| b == TERMINATOR) {
            return Err(SourceError::ContainsTerminator { offset });
        }
        let insert_at = self.data.len() - 1;
        self.data.splice(insert_at..insert_at, bytes.iter().copied());
        Ok(())
    }

    /// `true` if the last byte read was the first byte of its line.
    ///
    /// # Panics
    ///
    /// Panics if nothing has been read yet.
    pub fn was_first_on_line(&self) -> bool {
        assert!(self.pos != 0, "was_first_on_line() with nothing read yet");
        if self.pos == 1 {
            return true;
        }
        let prev = self.data[self.pos - 2];
        prev == b'\n' || prev == b'\r'
    }

    pub fn set_mark(&mut self) {
        self.mark = self.pos;
        self.mark_location = SourceLocation::new(self.info.clone(), self.line, self.column);
    }

    pub fn mark_location(&self) -> SourceLocation {
        self.mark_location.clone()
    }

    /// The substring from the mark to the current cursor.
    pub fn marked_string(&self) -> String {
        String::from_utf8_lossy(&self.data[self.mark..self.pos]).into_owned()
    }

    pub fn marked_len(&self) -> usize {
        self.pos - self.mark
    }

    /// The `length` bytes starting at `offset`, for recovering a token's
    /// lexeme from its stored location.
    pub fn range(&self, offset: usize, length: usize) -> &[u8] {
        &self.data[offset..offset + length]
    }

    /// The current read cursor's location.
    pub fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.info.clone(), self.line, self.column)
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Snapshots the read/mark cursors so a speculative parse can rewind
    /// without re-scanning from the start of the buffer.
    pub fn save_cursor(&self) -> SourceCursor {
        SourceCursor {
            pos: self.pos,
            mark: self.mark,
            mark_location: self.mark_location.clone(),
            line: self.line,
            column: self.column,
        }
    }

    pub fn restore_cursor(&mut self, cursor: SourceCursor) {
        self.pos = cursor.pos;
        self.mark = cursor.mark;
        self.mark_location = cursor.mark_location;
        self.line = cursor.line;
        self.column = cursor.column;
    }

    pub fn at_end(&self) -> bool {
        self.data[self.pos] == TERMINATOR
    }

    /// Recovers the (line, column) at `offset` by replaying the same
    /// newline/tab rules `read` uses, from the start of the buffer. Never
    /// advances any live cursor.
    pub fn decode_location(&self, offset: usize) -> SourceLocation {
        let mut line = 1u32;
        let mut column = 1u32;
        let mut i = 0usize;
        while i < offset {
            match self.data[i] {
                b'\n' => {
                    line += 1;
                    column = 1;
                }
                b'\r' => {
                    if self.data.get(i + 1) == Some(&b'\n') {
                        column += 1;
                    } else {
                        line += 1;
                        column = 1;
                    }
                }
                b'\t' => {
                    column += TAB_SIZE - ((column - 1) % TAB_SIZE);
                }
                _ => {
                    column += 1;
                }
            }
            i += 1;
        }
        SourceLocation::new(self.info.clone(), line, column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buf(bytes: &[u8]) -> SourceBuffer {
        SourceBuffer::new(SourceInfo::new("t.gl", "/tmp/t.gl"), bytes).unwrap()
    }

    #[test]
    fn rejects_embedded_nul() {
        assert!(SourceBuffer::new(SourceInfo::new("t", "t"), b"a\0b").is_err());
    }

    #[test]
    fn read_advances_column() {
        let mut b = buf(b"ab");
        assert_eq!(b.read(), b'a');
        assert_eq!(b.column, 2);
        assert_eq!(b.read(), b'b');
        assert_eq!(b.column, 3);
    }

    #[test]
    fn newline_resets_column_and_bumps_line() {
        let mut b = buf(b"a\nb");
        b.read();
        b.read();
        assert_eq!(b.line, 2);
        assert_eq!(b.column, 1);
    }

    #[test]
    fn crlf_counts_as_one_line_break() {
        let mut b = buf(b"a\r\nb");
        b.read(); // a
        b.read(); // \r -- column bump only
        assert_eq!(b.line, 1);
        b.read(); // \n -- now advances line
        assert_eq!(b.line, 2);
        assert_eq!(b.column, 1);
    }

    #[test]
    fn lone_cr_advances_line() {
        let mut b = buf(b"a\rb");
        b.read();
        b.read();
        assert_eq!(b.line, 2);
        assert_eq!(b.column, 1);
    }

    #[test]
    fn tab_advances_to_next_multiple_of_four() {
        let mut b = buf(b"a\tb");
        b.read(); // column -> 2
        b.read(); // tab: column 2 -> 5
        assert_eq!(b.column, 5);
    }

    #[test]
    fn read_past_end_returns_terminator_forever() {
        let mut b = buf(b"a");
        b.read();
        assert_eq!(b.read(), 0);
        assert_eq!(b.read(), 0);
    }

    #[test]
    fn unread_restores_column() {
        let mut b = buf(b"ab");
        b.read();
        b.read();
        b.unread();
        assert_eq!(b.column, 2);
        assert_eq!(b.peek(), b'b');
    }

    #[test]
    fn mark_and_marked_string_round_trip() {
        let mut b = buf(b"hello world");
        b.set_mark();
        for _ in 0..5 {
            b.read();
        }
        assert_eq!(b.marked_string(), "hello");
    }

    #[test]
    fn append_inserts_before_terminator() {
        let mut b = buf(b"ab");
        b.read();
        b.append(b"XY").unwrap();
        assert_eq!(b.peek(), b'b');
        assert_eq!(b.read(), b'b');
        assert_eq!(b.read(), b'X');
        assert_eq!(b.read(), b'Y');
        assert_eq!(b.read(), 0);
    }

    #[test]
    fn was_first_on_line_true_at_start() {
        let mut b = buf(b"ab");
        b.read();
        assert!(b.was_first_on_line());
    }

    #[test]
    fn was_first_on_line_true_after_newline() {
        let mut b = buf(b"a\nb");
        b.read();
        b.read();
        assert!(b.was_first_on_line());
    }

    #[test]
    fn cursor_save_restore_round_trips_position() {
        let mut b = buf(b"abcdef");
        b.read();
        b.read();
        let cursor = b.save_cursor();
        b.read();
        b.read();
        b.restore_cursor(cursor);
        assert_eq!(b.peek(), b'c');
        assert_eq!(b.column, 3);
    }

    #[test]
    fn decode_location_matches_read_based_traversal() {
        let text = b"ab\ncd\r\nef\tg";
        let b1 = buf(text);
        let mut b2 = buf(text);
        for offset in 0..text.len() {
            let decoded = b1.decode_location(offset);
            while b2.pos() < offset {
                b2.read();
            }
            let traversed = b2.current_location();
            assert_eq!(decoded.line, traversed.line, "offset {offset}");
            assert_eq!(decoded.column, traversed.column, "offset {offset}");
        }
    }
}
