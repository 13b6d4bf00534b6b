//! The row-level state machine.

use crate::cell::CellView;
use crate::config::CsvConfig;
use crate::cursor::Cursor;
use crate::spanner::CharClassSpanner;

#[cfg(feature = "std")]
use crate::cursor::buffered::BufferedCursor;
#[cfg(feature = "std")]
use crate::error::CsvError;
#[cfg(all(feature = "std", unix))]
use crate::cursor::mapped::MappedCursor;
#[cfg(feature = "std")]
use std::io::Read;
#[cfg(all(feature = "std", unix))]
use std::path::Path;

use alloc::vec;
use alloc::vec::Vec;

const INITIAL_CELL_CAPACITY: usize = 16;

#[derive(Clone, Copy, Debug)]
struct CellSlot {
    ptr: *const u8,
    len: usize,
    escaped: bool,
}

impl Default for CellSlot {
    fn default() -> Self {
        Self {
            ptr: core::ptr::null(),
            len: 0,
            escaped: false,
        }
    }
}

/// A parsed row: an ordered, bounded sequence of [`CellView`].
///
/// Valid until the next [`RowParser::read_row`] call.
pub struct Row<'a> {
    slots: &'a [CellSlot],
    config: &'a CsvConfig,
}

impl<'a> Row<'a> {
    /// Number of cells in this row.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True iff the row has no cells (only possible for a row with a
    /// single, immediately-terminated empty cell would instead have
    /// `len() == 1`; an empty `Row` only arises before the first
    /// successful [`RowParser::read_row`] call).
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the cell at `index`, if present.
    pub fn get(&self, index: usize) -> Option<CellView<'a>> {
        self.slots.get(index).map(|s| CellView {
            ptr: s.ptr,
            len: s.len,
            escaped: s.escaped,
            config: self.config,
        })
    }

    /// Iterates over the row's cells in left-to-right order.
    pub fn iter(&self) -> RowIter<'a> {
        RowIter {
            slots: self.slots,
            config: self.config,
            pos: 0,
        }
    }
}

/// Iterator over a [`Row`]'s cells, yielded in left-to-right order.
pub struct RowIter<'a> {
    slots: &'a [CellSlot],
    config: &'a CsvConfig,
    pos: usize,
}

impl<'a> Iterator for RowIter<'a> {
    type Item = CellView<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let s = *self.slots.get(self.pos)?;
        self.pos += 1;
        Some(CellView {
            ptr: s.ptr,
            len: s.len,
            escaped: s.escaped,
            config: self.config,
        })
    }
}

impl<'a> IntoIterator for Row<'a> {
    type Item = CellView<'a>;
    type IntoIter = RowIter<'a>;

    fn into_iter(self) -> RowIter<'a> {
        RowIter {
            slots: self.slots,
            config: self.config,
            pos: 0,
        }
    }
}

#[derive(Clone, Copy)]
enum State {
    NewlineSkip,
    CellStart,
    InQuoted,
    AfterQuote,
    InUnquoted,
    AfterUnquotedBreak,
}

enum Signal {
    Overflow,
    Underrun,
}

enum RowOutcome {
    Row(usize),
    End,
}

enum ScanResult {
    /// Absolute offset of the matched byte.
    Found(usize),
    /// No match was found before the buffer's confirmed end-of-input.
    EndOfInput(usize),
}

/// The row-parsing state machine.
///
/// Drives the two [`CharClassSpanner`] instances (one over
/// `{quotechar, escapechar}` for quoted cells, one over
/// `{delimiter, '\r', '\n', escapechar}` for unquoted cells), emits cell
/// descriptors, and advances the cursor by exactly the bytes consumed on
/// each successful row.
#[derive(Debug)]
pub struct RowParser<C: Cursor> {
    cursor: C,
    config: CsvConfig,
    cells: Vec<CellSlot>,
    count: usize,
    quoted_spanner: CharClassSpanner,
    unquoted_spanner: CharClassSpanner,
}

impl<C: Cursor> RowParser<C> {
    /// Builds a parser driving `cursor` with the given dialect.
    pub fn new(cursor: C, config: CsvConfig) -> Self {
        let quoted_spanner = CharClassSpanner::new([config.quotechar, config.escapechar, 0, 0]);
        let unquoted_spanner = CharClassSpanner::new([
            config.delimiter,
            b'\r',
            b'\n',
            config.escapechar,
        ]);
        Self {
            cursor,
            config,
            cells: vec![CellSlot::default(); INITIAL_CELL_CAPACITY],
            count: 0,
            quoted_spanner,
            unquoted_spanner,
        }
    }

    /// Attempts to parse the next row. Returns `false` when input is
    /// exhausted; otherwise [`RowParser::row`] exposes the parsed cells.
    pub fn read_row(&mut self) -> bool {
        let mut eof = false;
        loop {
            match self.try_parse(eof) {
                Ok(RowOutcome::Row(consumed)) => {
                    self.cursor.consume(consumed);
                    return true;
                }
                Ok(RowOutcome::End) => return false,
                Err(Signal::Overflow) => self.grow(),
                Err(Signal::Underrun) => {
                    debug_assert!(!eof, "eof attempt must never underrun");
                    if !self.cursor.fill() {
                        eof = true;
                    }
                }
            }
        }
    }

    /// The most recently parsed row. Valid until the next `read_row` call.
    pub fn row(&self) -> Row<'_> {
        Row {
            slots: &self.cells[..self.count],
            config: &self.config,
        }
    }

    fn grow(&mut self) {
        let new_len = self.cells.len() * 2;
        self.cells.resize(new_len, CellSlot::default());
    }

    fn push_cell(&mut self, ptr: *const u8, len: usize, escaped: bool) -> Result<(), Signal> {
        if self.count >= self.cells.len() {
            return Err(Signal::Overflow);
        }
        self.cells[self.count] = CellSlot { ptr, len, escaped };
        self.count += 1;
        Ok(())
    }

    /// Reads the byte at `pos`, or signals underrun/end-of-input.
    fn peek(&self, pos: usize, eof: bool) -> Result<Option<u8>, Signal> {
        let size = self.cursor.size();
        if pos < size {
            Ok(Some(unsafe { *self.cursor.buf_ptr().add(pos) }))
        } else if eof {
            Ok(None)
        } else {
            Err(Signal::Underrun)
        }
    }

    /// Scans forward from `pos` in 16-byte windows for any of `spanner`'s
    /// targets. On success, returns the absolute offset of the match; if
    /// the caller has confirmed no more data is coming, a lack of match
    /// resolves to the buffer's end rather than underrun.
    fn scan(&self, mut pos: usize, spanner: &CharClassSpanner, eof: bool) -> Result<ScanResult, Signal> {
        let size = self.cursor.size();
        loop {
            if pos + 16 <= size {
                let ptr = unsafe { self.cursor.buf_ptr().add(pos) };
                let k = unsafe { spanner.scan(ptr) };
                if k < 16 {
                    return Ok(ScanResult::Found(pos + k));
                }
                pos += 16;
                continue;
            }

            if !eof {
                return Err(Signal::Underrun);
            }

            if pos >= size {
                return Ok(ScanResult::EndOfInput(size));
            }

            // Fewer than 16 real bytes remain and no more input is
            // coming; one more vector load is still safe (the cursor
            // guarantees padding through size()+15), clamp the result to
            // the real remaining bytes.
            let ptr = unsafe { self.cursor.buf_ptr().add(pos) };
            let k = unsafe { spanner.scan(ptr) };
            let real_remaining = size - pos;
            return if k < real_remaining {
                Ok(ScanResult::Found(pos + k))
            } else {
                Ok(ScanResult::EndOfInput(size))
            };
        }
    }

    fn byte_at(&self, pos: usize) -> u8 {
        unsafe { *self.cursor.buf_ptr().add(pos) }
    }

    fn ptr_at(&self, pos: usize) -> *const u8 {
        unsafe { self.cursor.buf_ptr().add(pos) }
    }

    /// Consumes a `\r`, `\n`, or `\r\n` terminator starting at `pos`,
    /// returning the byte offset just past it.
    fn consume_terminator(&self, pos: usize, eof: bool) -> Result<usize, Signal> {
        if self.byte_at(pos) == b'\r' {
            match self.peek(pos + 1, eof)? {
                Some(b'\n') => Ok(pos + 2),
                _ => Ok(pos + 1),
            }
        } else {
            Ok(pos + 1)
        }
    }

    fn finish_incomplete(&self) -> RowOutcome {
        if self.config.yield_incomplete_row && self.count > 0 {
            RowOutcome::Row(self.cursor.size())
        } else {
            RowOutcome::End
        }
    }

    fn try_parse(&mut self, eof: bool) -> Result<RowOutcome, Signal> {
        self.count = 0;
        let mut pos = 0usize;
        let mut cell_start = 0usize;
        let mut escaped = false;
        let mut state = State::NewlineSkip;

        loop {
            match state {
                State::NewlineSkip => match self.peek(pos, eof)? {
                    None => return Ok(RowOutcome::End),
                    Some(b'\r') | Some(b'\n') => pos += 1,
                    Some(_) => {
                        cell_start = pos;
                        state = State::CellStart;
                    }
                },

                State::CellStart => match self.peek(pos, eof)? {
                    None => {
                        // Reached EOF exactly where a cell was about to
                        // start: if cells already exist (trailing
                        // delimiter), emit one final empty cell.
                        if self.count > 0 {
                            self.push_cell(self.ptr_at(pos), 0, false)?;
                        }
                        return Ok(self.finish_incomplete());
                    }
                    Some(b'\r') | Some(b'\n') => {
                        self.push_cell(self.ptr_at(cell_start), pos - cell_start, false)?;
                        let consumed = self.consume_terminator(pos, eof)?;
                        return Ok(RowOutcome::Row(consumed));
                    }
                    Some(b) if b == self.config.quotechar => {
                        pos += 1;
                        cell_start = pos;
                        escaped = false;
                        state = State::InQuoted;
                    }
                    Some(b) if b == self.config.delimiter => {
                        self.push_cell(self.ptr_at(cell_start), pos - cell_start, false)?;
                        pos += 1;
                        cell_start = pos;
                    }
                    Some(_) => {
                        escaped = false;
                        state = State::InUnquoted;
                    }
                },

                State::InQuoted => match self.scan(pos, &self.quoted_spanner, eof)? {
                    ScanResult::Found(mpos) => {
                        let b = self.byte_at(mpos);
                        if b == self.config.quotechar {
                            pos = mpos + 1;
                            state = State::AfterQuote;
                        } else {
                            // Explicit escapechar inside a quoted cell:
                            // take it and the following byte literally,
                            // but only if a partner byte is confirmed to
                            // exist. A dangling escapechar at confirmed
                            // end-of-input has nothing to pair with, so
                            // it is left as a literal, unescaped byte.
                            match self.peek(mpos + 1, eof)? {
                                Some(_) => {
                                    escaped = true;
                                    pos = mpos + 2;
                                }
                                None => pos = mpos + 1,
                            }
                        }
                    }
                    ScanResult::EndOfInput(epos) => {
                        self.push_cell(self.ptr_at(cell_start), epos - cell_start, escaped)?;
                        return Ok(self.finish_incomplete());
                    }
                },

                State::AfterQuote => match self.peek(pos, eof)? {
                    None => {
                        self.push_cell(self.ptr_at(cell_start), pos - 1 - cell_start, escaped)?;
                        return Ok(self.finish_incomplete());
                    }
                    Some(b'\r') | Some(b'\n') => {
                        self.push_cell(self.ptr_at(cell_start), pos - 1 - cell_start, escaped)?;
                        let consumed = self.consume_terminator(pos, eof)?;
                        return Ok(RowOutcome::Row(consumed));
                    }
                    Some(b) if b == self.config.delimiter => {
                        self.push_cell(self.ptr_at(cell_start), pos - 1 - cell_start, escaped)?;
                        pos += 1;
                        cell_start = pos;
                        escaped = false;
                        state = State::CellStart;
                    }
                    Some(_) => {
                        // A quotechar immediately followed by another
                        // non-delimiter, non-terminator byte: a doubled
                        // quote escaping a literal quote character.
                        escaped = true;
                        pos += 1;
                        state = State::InQuoted;
                    }
                },

                State::InUnquoted => match self.scan(pos, &self.unquoted_spanner, eof)? {
                    ScanResult::Found(mpos) => {
                        pos = mpos;
                        state = State::AfterUnquotedBreak;
                    }
                    ScanResult::EndOfInput(epos) => {
                        self.push_cell(self.ptr_at(cell_start), epos - cell_start, escaped)?;
                        return Ok(self.finish_incomplete());
                    }
                },

                State::AfterUnquotedBreak => {
                    let b = self.byte_at(pos);
                    if b == b'\r' || b == b'\n' {
                        self.push_cell(self.ptr_at(cell_start), pos - cell_start, escaped)?;
                        let consumed = self.consume_terminator(pos, eof)?;
                        return Ok(RowOutcome::Row(consumed));
                    } else if b == self.config.delimiter {
                        self.push_cell(self.ptr_at(cell_start), pos - cell_start, escaped)?;
                        pos += 1;
                        cell_start = pos;
                        escaped = false;
                        state = State::CellStart;
                    } else {
                        // Must be the configured escapechar (the fourth,
                        // non-zero-cleared target): take it and the
                        // following byte literally, but only if a partner
                        // byte is confirmed to exist — see the identical
                        // dangling-escapechar handling in `InQuoted`.
                        match self.peek(pos + 1, eof)? {
                            Some(_) => {
                                escaped = true;
                                pos += 2;
                            }
                            None => pos += 1,
                        }
                        state = State::InUnquoted;
                    }
                }
            }
        }
    }
}

#[cfg(feature = "std")]
impl<R: Read> RowParser<BufferedCursor<R>> {
    /// Builds a parser over any [`Read`], growing its buffer as needed.
    pub fn from_reader(reader: R, config: CsvConfig) -> Self {
        Self::new(BufferedCursor::new(reader), config)
    }
}

#[cfg(all(feature = "std", unix))]
impl RowParser<MappedCursor> {
    /// Opens `path` and memory-maps it in full.
    pub fn open(path: impl AsRef<Path>, config: CsvConfig) -> Result<Self, CsvError> {
        Ok(Self::new(MappedCursor::open(path)?, config))
    }
}
