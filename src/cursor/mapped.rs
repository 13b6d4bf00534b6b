//! Memory-mapped file cursor, with a guard page installed immediately
//! after the file's content so 16-byte vector loads near EOF never fault.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

use super::Cursor;
use crate::error::CsvError;

/// A [`Cursor`] over an entire memory-mapped file.
///
/// The whole file is visible from construction, so `fill()` is always
/// `false`. Built by reserving one anonymous, `PROT_NONE` mapping sized to
/// `round_up(file_len, page_size) + page_size`, then overlaying the file
/// onto the low portion with a second, `MAP_FIXED` mapping. Reserving the
/// whole span first guarantees the trailing page can never be raced by
/// another mapping request in the process before it becomes the guard
/// page — a naive "map the file, then map a guard page right after it"
/// sequence would leave a window where something else could claim that
/// address.
#[derive(Debug)]
pub struct MappedCursor {
    base: NonNull<u8>,
    reserved_len: usize,
    file_len: usize,
    consumed: usize,
}

// SAFETY: the mapping is read-only for the cursor's lifetime and owned
// exclusively by this value; there is no interior mutability to race.
unsafe impl Send for MappedCursor {}

impl MappedCursor {
    /// Opens `path` read-only and maps it in full.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CsvError> {
        let path = path.as_ref();
        let to_path_buf = || -> PathBuf { path.to_path_buf() };

        let file = File::open(path).map_err(|source| CsvError::ResourceOpen {
            path: to_path_buf(),
            source,
        })?;
        let file_len = file
            .metadata()
            .map_err(|source| CsvError::ResourceOpen {
                path: to_path_buf(),
                source,
            })?
            .len() as usize;

        if file_len == 0 {
            // No guard page is needed for an empty file: there is no valid
            // data, so the parser never issues a scan against it.
            return Ok(Self {
                base: NonNull::dangling(),
                reserved_len: 0,
                file_len: 0,
                consumed: 0,
            });
        }

        let page_size = page_size();
        let rounded = round_up(file_len, page_size);
        let reserved_len = rounded + page_size;

        unsafe {
            let reservation = libc::mmap(
                std::ptr::null_mut(),
                reserved_len,
                libc::PROT_NONE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                -1,
                0,
            );
            if reservation == libc::MAP_FAILED {
                return Err(CsvError::ResourceMap {
                    path: to_path_buf(),
                    source: io::Error::last_os_error(),
                });
            }

            let overlay = libc::mmap(
                reservation,
                file_len,
                libc::PROT_READ,
                libc::MAP_PRIVATE | libc::MAP_FIXED,
                std::os::unix::io::AsRawFd::as_raw_fd(&file),
                0,
            );
            if overlay == libc::MAP_FAILED {
                libc::munmap(reservation, reserved_len);
                return Err(CsvError::ResourceMap {
                    path: to_path_buf(),
                    source: io::Error::last_os_error(),
                });
            }

            libc::madvise(reservation, rounded, libc::MADV_SEQUENTIAL);

            // `file` is dropped here (fd closed); the mapping retains the
            // inode reference so the data stays visible.
            Ok(Self {
                base: NonNull::new_unchecked(reservation as *mut u8),
                reserved_len,
                file_len,
                consumed: 0,
            })
        }
    }
}

impl Cursor for MappedCursor {
    fn buf_ptr(&self) -> *const u8 {
        unsafe { self.base.as_ptr().add(self.consumed) }
    }

    fn size(&self) -> usize {
        self.file_len - self.consumed
    }

    fn consume(&mut self, n: usize) {
        self.consumed += n.min(self.size());
    }

    fn fill(&mut self) -> bool {
        false
    }
}

impl Drop for MappedCursor {
    fn drop(&mut self) {
        if self.reserved_len > 0 {
            unsafe {
                libc::munmap(self.base.as_ptr() as *mut libc::c_void, self.reserved_len);
            }
        }
    }
}

fn page_size() -> usize {
    unsafe { libc::sysconf(libc::_SC_PAGESIZE) as usize }
}

fn round_up(len: usize, page_size: usize) -> usize {
    (len + page_size - 1) / page_size * page_size
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn maps_whole_file() {
        let f = write_temp(b"a,b,c\n1,2,3\n");
        let cursor = MappedCursor::open(f.path()).unwrap();
        assert_eq!(cursor.size(), 12);
        let bytes = unsafe { std::slice::from_raw_parts(cursor.buf_ptr(), cursor.size()) };
        assert_eq!(bytes, b"a,b,c\n1,2,3\n");
    }

    #[test]
    fn fill_is_always_false() {
        let f = write_temp(b"hello");
        let mut cursor = MappedCursor::open(f.path()).unwrap();
        assert!(!cursor.fill());
    }

    #[test]
    fn tail_padding_is_readable_past_end_of_file() {
        // A file whose length lands exactly at a 16-byte boundary is the
        // case the guard page exists for: a vector load starting at the
        // last valid byte must not fault.
        let f = write_temp(&[b'x'; 16]);
        let cursor = MappedCursor::open(f.path()).unwrap();
        let last_byte_ptr = unsafe { cursor.buf_ptr().add(cursor.size() - 1) };
        // Reading 16 bytes starting at the last valid byte touches one
        // byte of real data and 15 bytes of guard-page padding.
        let window = unsafe { std::slice::from_raw_parts(last_byte_ptr, 16) };
        assert_eq!(window[0], b'x');
    }

    #[test]
    fn empty_file_has_zero_size() {
        let f = write_temp(b"");
        let cursor = MappedCursor::open(f.path()).unwrap();
        assert_eq!(cursor.size(), 0);
    }

    #[test]
    fn open_missing_file_is_resource_open_error() {
        let err = MappedCursor::open("/nonexistent/path/does-not-exist.csv").unwrap_err();
        assert!(matches!(err, CsvError::ResourceOpen { .. }));
    }

    #[test]
    fn consume_advances_and_shrinks_size() {
        let f = write_temp(b"abcdefgh");
        let mut cursor = MappedCursor::open(f.path()).unwrap();
        cursor.consume(3);
        assert_eq!(cursor.size(), 5);
        let bytes = unsafe { std::slice::from_raw_parts(cursor.buf_ptr(), cursor.size()) };
        assert_eq!(bytes, b"defgh");
    }
}
