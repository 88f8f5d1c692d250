use cgbf_window::DecodeError;

/// The stream does not start with a header this reader understands.
#[derive(Debug, thiserror::Error)]
pub enum HeaderError {
    /// Fewer than eight bytes were available for the header.
    #[error("could not read stream header (got {len} of 8 bytes)")]
    Truncated { len: usize },

    /// The first four bytes are not `"CGBF"`.
    #[error("stream does not start with magic bytes \"CGBF\" (found {found:02x?})")]
    InvalidMagic { found: [u8; 4] },

    /// The header names a format version other than the supported one.
    #[error("stream is version {found} but this reader only knows version {}", crate::header::VERSION)]
    UnsupportedVersion { found: u32 },
}

/// Errors that end a stream.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error(transparent)]
    Header(#[from] HeaderError),

    /// A correctly framed window payload failed to decode.
    #[error("window {index}: {source}")]
    Decode {
        index: u64,
        #[source]
        source: DecodeError,
    },

    /// A frame declares a payload above the configured limit.
    #[error("window too large ({size} bytes, max {max})")]
    WindowTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading the source.
    #[error("stream I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StreamError>;
