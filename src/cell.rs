//! Passive, on-demand cell accessors.

use core::slice;

use crate::config::CsvConfig;

#[cfg(feature = "alloc")]
use alloc::borrow::Cow;
#[cfg(feature = "alloc")]
use alloc::vec::Vec;

/// A single cell within a row: a byte range into the cursor's buffer plus
/// whether it contains an escape occurrence that decoding must collapse.
///
/// Valid only until the next [`crate::RowParser::read_row`] call or cursor
/// mutation — it borrows from the cursor, never owns.
#[derive(Clone, Copy)]
pub struct CellView<'a> {
    pub(crate) ptr: *const u8,
    pub(crate) len: usize,
    pub(crate) escaped: bool,
    pub(crate) config: &'a CsvConfig,
}

impl<'a> CellView<'a> {
    /// The undecoded cell body, exclusive of surrounding quotes.
    pub fn raw(&self) -> &'a [u8] {
        if self.len == 0 {
            &[]
        } else {
            // SAFETY: `ptr..ptr+len` was produced by the parser from a
            // byte range it had just confirmed was within the cursor's
            // valid window at push time, and the view's lifetime is tied
            // to the row borrow that bounds cursor mutation.
            unsafe { slice::from_raw_parts(self.ptr, self.len) }
        }
    }

    /// True iff the cell's raw bytes contain at least one occurrence of
    /// the quote or escape character that decoding must collapse.
    ///
    /// Equivalently: true iff `decoded_bytes()` would differ from `raw()`.
    pub fn is_escaped(&self) -> bool {
        self.escaped
    }

    /// Returns the decoded bytes: a copy of `raw()` if unescaped,
    /// otherwise a freshly unescaped copy.
    ///
    /// Performs a single pass: when a byte equals the configured escape
    /// character or the quote character, it is skipped and the following
    /// byte is emitted literally; every other byte is emitted as-is. The
    /// output is never longer than the input, and running this on
    /// already-unescaped input will not panic (though it is a misuse that
    /// may silently drop bytes that happen to match the quote character).
    #[cfg(feature = "alloc")]
    pub fn decoded_bytes(&self) -> Cow<'a, [u8]> {
        let raw = self.raw();
        if !self.escaped {
            return Cow::Borrowed(raw);
        }

        let quotechar = self.config.quotechar;
        let escapechar = self.config.escapechar;
        let mut out = Vec::with_capacity(raw.len());
        let mut i = 0;
        while i < raw.len() {
            let b = raw[i];
            if b == quotechar || (escapechar != 0 && b == escapechar) {
                if i + 1 < raw.len() {
                    out.push(raw[i + 1]);
                    i += 2;
                    continue;
                }
            }
            out.push(b);
            i += 1;
        }
        Cow::Owned(out)
    }

    /// Decodes the cell and validates it as UTF-8.
    #[cfg(feature = "alloc")]
    pub fn try_as_str(&self) -> Result<Cow<'a, str>, core::str::Utf8Error> {
        match self.decoded_bytes() {
            Cow::Borrowed(bytes) => core::str::from_utf8(bytes).map(Cow::Borrowed),
            Cow::Owned(bytes) => {
                let s = alloc::string::String::from_utf8(bytes)
                    .map_err(|e| e.utf8_error())?;
                Ok(Cow::Owned(s))
            }
        }
    }

    /// Best-effort decimal parse of the raw bytes (leading sign, optional
    /// fractional part, optional exponent). Returns `0.0` on unparseable
    /// input rather than failing — strict validation is a caller concern.
    pub fn as_f64(&self) -> f64 {
        core::str::from_utf8(self.raw())
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(0.0)
    }

    /// Byte-wise equality against `needle`, using the raw (undecoded) view.
    pub fn eq_bytes(&self, needle: &[u8]) -> bool {
        self.raw() == needle
    }

    /// True iff the raw (undecoded) view starts with `prefix`.
    pub fn starts_with(&self, prefix: &[u8]) -> bool {
        self.raw().starts_with(prefix)
    }
}

impl core::fmt::Debug for CellView<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CellView")
            .field("raw", &self.raw())
            .field("escaped", &self.escaped)
            .finish()
    }
}

impl PartialEq for CellView<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.raw() == other.raw()
    }
}

impl Eq for CellView<'_> {}
