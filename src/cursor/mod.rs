//! Input-buffer abstraction with the 16-byte tail-padding safety invariant
//! that makes the spanner's vector loads well-defined at end-of-input.

#[cfg(feature = "std")]
pub mod buffered;
#[cfg(all(feature = "std", unix))]
pub mod mapped;

/// Margin of extra readable (but not necessarily meaningful) bytes that
/// every [`Cursor`] implementation must keep available past `size()`.
pub const SAFETY_MARGIN: usize = 16;

/// A growable view of input bytes, with a 16-byte safety margin past the
/// logically valid tail so a vector load always has somewhere safe to read.
///
/// A plain trait rather than a trait object on purpose: [`crate::RowParser`]
/// is generic over `C: Cursor`, which keeps cursor dispatch static and off
/// the hot scanning path.
pub trait Cursor {
    /// Pointer to the first valid byte. Bytes `[0, size() + 15]` are
    /// guaranteed readable (the trailing 15 bytes carry no meaning).
    fn buf_ptr(&self) -> *const u8;

    /// Number of valid bytes starting at `buf_ptr()`.
    fn size(&self) -> usize;

    /// Advances the logical start by `min(n, size())`, invalidating any
    /// previously returned cell views.
    fn consume(&mut self, n: usize);

    /// Attempts to make more bytes available. Returns `true` iff progress
    /// was made (more bytes are now readable than before the call);
    /// returns `false` on end-of-input or a read error. Invalidates any
    /// previously returned cell views.
    fn fill(&mut self) -> bool;
}
