//! `csvburst` is a high-throughput CSV parser built for bulk ingestion.
//!
//! See `benches/single_thread.rs` for throughput comparisons against
//! [BurntSushi/rust-csv]. Three techniques together get it there:
//!
//! [BurntSushi/rust-csv]: https://github.com/BurntSushi/rust-csv
//!
//! - **Zero-copy**: cells are exposed as `(ptr, len)` views directly into
//!   the input buffer — no field is copied unless the caller asks to
//!   decode it.
//! - **Vectorized scanning**: the scanner driving the row state machine
//!   advances 16 bytes at a time using SIMD compares, rather than
//!   byte-at-a-time branching.
//! - **Lazy decoding**: quote/escape unescaping only happens when a caller
//!   materializes a cell's decoded string. Reading a cell's raw bytes, or
//!   skipping it entirely, costs nothing extra.
//!
//! # Supported dialect
//!
//! A permissive subset of [RFC 4180](https://datatracker.ietf.org/doc/html/rfc4180):
//!
//! - Configurable delimiter, quote character, and an optional escape
//!   character (backslash-style, in addition to RFC 4180 doubled-quote
//!   escaping).
//! - LF, CRLF, or bare CR line endings, including mixed within one input.
//! - Leading blank lines (including bare CRLF runs) are skipped rather
//!   than yielding empty rows.
//! - Malformed input is never rejected — every byte stream parses to some
//!   sequence of rows. Strict validation is a caller concern.
//!
//! # Examples
//!
//! ```
//! # #[cfg(feature = "std")]
//! # {
//! use csvburst::{CsvConfig, RowParser};
//! use std::io::Cursor;
//!
//! let mut parser = RowParser::from_reader(Cursor::new(&b"a,b,c\n1,2,3\n"[..]), CsvConfig::new());
//! while parser.read_row() {
//!     for cell in parser.row().iter() {
//!         print!("{} ", cell.try_as_str().unwrap());
//!     }
//!     println!();
//! }
//! # }
//! ```
//!
//! # Crate features
//!
//! * **std** (default) - enables [`MappedCursor`] (memory-mapped file
//!   input) and [`BufferedCursor`] (any [`std::io::Read`]), plus
//!   `std::error::Error` on [`CsvError`].
//! * **alloc** (implied by `std`) - enables [`CellView::decoded_bytes`] and
//!   [`CellView::try_as_str`], which allocate only when a cell's content
//!   actually needs unescaping.

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]

#[cfg(feature = "alloc")]
extern crate alloc;

mod cell;
mod config;
mod cursor;
mod error;
#[cfg(feature = "alloc")]
mod parser;
mod spanner;

pub use cell::CellView;
pub use config::CsvConfig;
pub use cursor::Cursor;
#[cfg(feature = "std")]
pub use cursor::buffered::BufferedCursor;
#[cfg(all(feature = "std", unix))]
pub use cursor::mapped::MappedCursor;
pub use error::CsvError;
#[cfg(feature = "alloc")]
pub use parser::{Row, RowIter, RowParser};
