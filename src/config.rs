//! Parser dialect configuration.

/// Dialect knobs for a [`crate::parser::RowParser`], fixed for its lifetime.
///
/// # Example
///
/// ```
/// use csvburst::CsvConfig;
///
/// // Parsing TSV instead of CSV, with backslash-escaping enabled.
/// let config = CsvConfig::new().with_delimiter(b'\t').with_escapechar(b'\\');
/// ```
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct CsvConfig {
    pub(crate) delimiter: u8,
    pub(crate) quotechar: u8,
    pub(crate) escapechar: u8,
    pub(crate) yield_incomplete_row: bool,
}

impl CsvConfig {
    /// The default dialect: `,` delimiter, `"` quote character, no escape
    /// character, and incomplete trailing rows dropped.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the field delimiter. Default: `,`.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets the quote character. Default: `"`.
    pub fn with_quotechar(mut self, quotechar: u8) -> Self {
        self.quotechar = quotechar;
        self
    }

    /// Sets the escape character. `0` means "none" (the default).
    pub fn with_escapechar(mut self, escapechar: u8) -> Self {
        self.escapechar = escapechar;
        self
    }

    /// Controls whether a final row lacking a line terminator is still
    /// emitted. Default: `false`.
    pub fn with_yield_incomplete_row(mut self, yield_incomplete_row: bool) -> Self {
        self.yield_incomplete_row = yield_incomplete_row;
        self
    }
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quotechar: b'"',
            escapechar: 0,
            yield_incomplete_row: false,
        }
    }
}
