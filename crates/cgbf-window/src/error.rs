/// Errors that can occur while decoding a window payload.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The payload ended before a field could be read.
    #[error("unexpected end of window at offset {offset:#x} (need {need} bytes, have {have})")]
    UnexpectedEof {
        offset: usize,
        need: usize,
        have: usize,
    },

    /// A tag index points past the end of the window's tag table.
    #[error("tag index {index} out of range at offset {offset:#x} (table has {count} tags)")]
    TagIndexOutOfRange {
        index: u16,
        count: usize,
        offset: usize,
    },

    /// A length-prefixed string is not valid UTF-8.
    #[error("string at offset {offset:#x} is not valid UTF-8: {source}")]
    InvalidUtf8 {
        offset: usize,
        source: std::str::Utf8Error,
    },

    /// A variable entry carries a mode other than set, set-empty or remove.
    #[error("unknown variable mode {mode} at offset {offset:#x}")]
    UnknownVariableMode { mode: u8, offset: usize },
}

pub type Result<T> = std::result::Result<T, DecodeError>;
