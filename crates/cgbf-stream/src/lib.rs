//! Stream-level framing for the CG3 binary format.
//!
//! A stream is an 8-byte header followed by length-prefixed windows:
//! - 4-byte magic `"CGBF"`
//! - `u32` little-endian format version (only `1` is understood)
//! - repeated `[u32 LE length][length bytes of window payload]`
//!
//! A short or missing final frame ends the stream cleanly. A bad header or
//! a window payload that fails to decode is fatal.

pub mod cancel;
pub mod codec;
pub mod config;
pub mod error;
pub mod header;
pub mod reader;

pub use cancel::CancelHandle;
#[cfg(feature = "async")]
pub use codec::WindowCodec;
pub use codec::split_frame;
pub use config::StreamConfig;
pub use error::{HeaderError, Result, StreamError};
pub use header::{validate_header, HEADER_SIZE, LENGTH_PREFIX_SIZE, MAGIC, VERSION};
pub use reader::{read_windows, WindowReader};

pub use cgbf_window::{decode_window, Window};
