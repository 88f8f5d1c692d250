//! Decoder for a single window of the CG3 binary stream format.
//!
//! A window payload carries its own tag table: every lemma, tag, variable
//! name and relation name in the window is a `u16` index into that table.
//! Decoding resolves those indices into shared [`Tag`] handles, so each
//! distinct string is allocated once per window.
//!
//! The stream framing (magic, version, length prefixes) lives in
//! `cgbf-stream`; this crate only understands one payload at a time.

mod cursor;
pub mod decode;
pub mod error;
pub mod model;
pub mod tags;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use decode::{decode_window, VarMode, READING_SUBREADING, WINDOW_FLUSH_AFTER};
pub use error::{DecodeError, Result};
pub use model::{Chain, Cohort, Reading, Relations, Tag, Variables, Window, NO_PARENT};
pub use tags::TagTable;
