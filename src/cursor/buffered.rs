//! Buffered-stream cursor: grow-and-refill on demand.

use std::io::{self, Read};

use super::{Cursor, SAFETY_MARGIN};

const INITIAL_CAPACITY: usize = 64 * 1024;

/// A [`Cursor`] over any [`Read`], growing its buffer as needed.
///
/// `fill()` first left-shifts any unread bytes to offset 0, grows the
/// buffer if no headroom remains, then issues a single `read` into the
/// tail — the same compact-then-grow-then-read shape as a network read
/// buffer, applied here to file/pipe input instead of sockets.
#[derive(Debug)]
pub struct BufferedCursor<R> {
    reader: R,
    buf: Vec<u8>,
    read_pos: usize,
    write_pos: usize,
    eof: bool,
}

impl<R: Read> BufferedCursor<R> {
    /// Wraps `reader` in a cursor with the default initial capacity.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: vec![0u8; INITIAL_CAPACITY],
            read_pos: 0,
            write_pos: 0,
            eof: false,
        }
    }

    /// Bytes of the backing allocation available to `read` into without
    /// touching the trailing safety margin.
    fn spare_capacity(&self) -> usize {
        (self.buf.len() - SAFETY_MARGIN).saturating_sub(self.write_pos)
    }
}

impl<R: Read> Cursor for BufferedCursor<R> {
    fn buf_ptr(&self) -> *const u8 {
        unsafe { self.buf.as_ptr().add(self.read_pos) }
    }

    fn size(&self) -> usize {
        self.write_pos - self.read_pos
    }

    fn consume(&mut self, n: usize) {
        self.read_pos += n.min(self.size());
    }

    fn fill(&mut self) -> bool {
        if self.eof {
            return false;
        }

        if self.read_pos > 0 {
            self.buf.copy_within(self.read_pos..self.write_pos, 0);
            self.write_pos -= self.read_pos;
            self.read_pos = 0;
        }

        if self.spare_capacity() == 0 {
            let grown = (self.buf.len() * 2).max(self.write_pos + SAFETY_MARGIN + INITIAL_CAPACITY);
            self.buf.resize(grown, 0);
        }

        let end = self.buf.len() - SAFETY_MARGIN;
        loop {
            match self.reader.read(&mut self.buf[self.write_pos..end]) {
                Ok(0) => {
                    self.eof = true;
                    return false;
                }
                Ok(n) => {
                    self.write_pos += n;
                    return true;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(_) => {
                    self.eof = true;
                    return false;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_reads_and_advances_write_pos() {
        let mut cursor = BufferedCursor::new(io::Cursor::new(b"hello world".to_vec()));
        assert_eq!(cursor.size(), 0);
        assert!(cursor.fill());
        assert_eq!(cursor.size(), 11);
    }

    #[test]
    fn fill_returns_false_at_eof() {
        let mut cursor = BufferedCursor::new(io::Cursor::new(b"hi".to_vec()));
        assert!(cursor.fill());
        assert!(!cursor.fill());
        assert_eq!(cursor.size(), 2);
    }

    #[test]
    fn consume_then_fill_compacts_unread_tail() {
        let mut cursor = BufferedCursor::new(io::Cursor::new(b"abcdef".to_vec()));
        assert!(cursor.fill());
        cursor.consume(3);
        assert_eq!(cursor.size(), 3);
        // Further fill calls hit EOF on the underlying reader but must not
        // lose the already-buffered, not-yet-consumed bytes.
        assert!(!cursor.fill());
        assert_eq!(cursor.size(), 3);
        let remaining = unsafe { std::slice::from_raw_parts(cursor.buf_ptr(), cursor.size()) };
        assert_eq!(remaining, b"def");
    }

    #[test]
    fn grows_when_reader_exceeds_initial_capacity() {
        let data = vec![b'x'; INITIAL_CAPACITY * 3];
        let mut cursor = BufferedCursor::new(io::Cursor::new(data.clone()));
        let mut total = 0;
        while cursor.fill() {
            total = cursor.size();
        }
        assert_eq!(total, data.len());
    }
}
