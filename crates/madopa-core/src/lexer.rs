//! Line cursor over normalized input.
//!
//! The cursor hands the block parser one logical line at a time.
//! It uses `memchr` for fast newline detection (SIMD on supported platforms).
//!
//! - Lines borrow directly from the normalized input
//! - Peek/consume API for lookahead without allocations
//! - Checkpoints rewind the cursor after a speculative read

use memchr::memchr;

/// Normalize line endings: `\r\n` becomes `\n` and the text always ends
/// with a newline.
pub fn normalize(input: &str) -> String {
    let mut normalized = input.replace("\r\n", "\n");
    if !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}

/// A single line from the input, without its trailing newline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    pub text: &'a str,
}

impl<'a> Line<'a> {
    /// Check if this line contains only whitespace.
    #[inline(always)]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Get the line text with leading/trailing whitespace removed.
    #[inline(always)]
    pub fn trimmed(&self) -> &'a str {
        self.text.trim()
    }

    /// Get the line text with leading whitespace removed.
    #[inline(always)]
    pub fn trim_start(&self) -> &'a str {
        self.text.trim_start()
    }

    /// Number of leading whitespace bytes.
    #[inline]
    pub fn indent(&self) -> usize {
        self.text.len() - self.text.trim_start().len()
    }
}

/// Saved cursor position, see [`Cursor::checkpoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

/// Line cursor for the block parser.
///
/// All position state lives here, so one cursor belongs to exactly one
/// parse invocation.
pub struct Cursor<'a> {
    /// The normalized input text.
    input: &'a str,
    /// Current byte offset.
    offset: usize,
}

impl<'a> Cursor<'a> {
    /// Create a new cursor at the start of `input`.
    #[inline]
    pub fn new(input: &'a str) -> Self {
        Self { input, offset: 0 }
    }

    /// Get the current byte offset.
    #[inline(always)]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Check if all input has been consumed.
    #[inline(always)]
    pub fn is_eof(&self) -> bool {
        self.offset >= self.input.len()
    }

    /// Peek at the next line without consuming it.
    ///
    /// Returns `None` at end of input.
    #[inline]
    pub fn peek_line(&self) -> Option<Line<'a>> {
        self.scan().map(|(line, _)| line)
    }

    /// Consume and return the next line.
    ///
    /// Returns `None` at end of input.
    #[inline]
    pub fn next_line(&mut self) -> Option<Line<'a>> {
        let (line, next) = self.scan()?;
        self.offset = next;
        Some(line)
    }

    /// Remember the current position.
    #[inline]
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.offset)
    }

    /// Rewind to a position saved with [`Cursor::checkpoint`].
    #[inline]
    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.offset = checkpoint.0;
    }

    /// Skip blank lines and return the count skipped.
    #[inline]
    pub fn skip_blank_lines(&mut self) -> usize {
        let mut count = 0;
        while let Some(line) = self.peek_line() {
            if !line.is_blank() {
                break;
            }
            self.next_line();
            count += 1;
        }
        count
    }

    /// Locate the line starting at the current offset and the offset just
    /// past its newline.
    #[inline(always)]
    fn scan(&self) -> Option<(Line<'a>, usize)> {
        let start = self.offset;
        let rest = self.input.get(start..).filter(|rest| !rest.is_empty())?;

        // memchr is SIMD accelerated
        let (end, next) = match memchr(b'\n', rest.as_bytes()) {
            Some(pos) => (start + pos, start + pos + 1),
            None => (self.input.len(), self.input.len()),
        };

        // '\n' is ASCII, so both ends are char boundaries
        let text = self.input.get(start..end)?;
        Some((Line { text }, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_converts_crlf_and_appends_newline() {
        assert_eq!(normalize("a\r\nb"), "a\nb\n");
        assert_eq!(normalize("a\n"), "a\n");
        assert_eq!(normalize(""), "\n");
    }

    #[test]
    fn next_line_walks_lines_in_order() {
        let input = normalize("one\ntwo\n\nthree");
        let mut cursor = Cursor::new(&input);

        assert_eq!(cursor.next_line().map(|l| l.text), Some("one"));
        assert_eq!(cursor.next_line().map(|l| l.text), Some("two"));
        assert_eq!(cursor.next_line().map(|l| l.text), Some(""));
        assert_eq!(cursor.next_line().map(|l| l.text), Some("three"));
        assert!(cursor.is_eof());
        assert_eq!(cursor.next_line(), None);
    }

    #[test]
    fn peek_does_not_consume() {
        let input = normalize("first\nsecond");
        let mut cursor = Cursor::new(&input);

        assert_eq!(cursor.peek_line().map(|l| l.text), Some("first"));
        assert_eq!(cursor.peek_line().map(|l| l.text), Some("first"));
        assert_eq!(cursor.next_line().map(|l| l.text), Some("first"));
        assert_eq!(cursor.peek_line().map(|l| l.text), Some("second"));
    }

    #[test]
    fn restore_rewinds_to_checkpoint() {
        let input = normalize("a | b\nplain\nrest");
        let mut cursor = Cursor::new(&input);
        cursor.next_line();

        let saved = cursor.checkpoint();
        assert_eq!(cursor.next_line().map(|l| l.text), Some("plain"));
        assert_eq!(cursor.next_line().map(|l| l.text), Some("rest"));

        cursor.restore(saved);
        assert_eq!(cursor.offset(), 6);
        assert_eq!(cursor.next_line().map(|l| l.text), Some("plain"));
    }

    #[test]
    fn skip_blank_lines_counts_whitespace_only_lines() {
        let input = normalize("\n   \n\t\ntext");
        let mut cursor = Cursor::new(&input);

        assert_eq!(cursor.skip_blank_lines(), 3);
        assert_eq!(cursor.peek_line().map(|l| l.text), Some("text"));
    }

    #[test]
    fn line_helpers() {
        let line = Line { text: "    - item  " };
        assert_eq!(line.indent(), 4);
        assert_eq!(line.trim_start(), "- item  ");
        assert_eq!(line.trimmed(), "- item");
        assert!(!line.is_blank());
        assert!(Line { text: " \t " }.is_blank());
    }
}
