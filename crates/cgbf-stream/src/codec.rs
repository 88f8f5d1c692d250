use bytes::{Buf, Bytes, BytesMut};

use crate::header::LENGTH_PREFIX_SIZE;

/// Declared payload length of the frame at the start of `src`, if the
/// length prefix is complete.
pub fn peek_frame_len(src: &[u8]) -> Option<usize> {
    let prefix = src.first_chunk::<LENGTH_PREFIX_SIZE>()?;
    Some(u32::from_le_bytes(*prefix) as usize)
}

/// Split one complete frame payload off the front of `src`.
///
/// Returns `None` if `src` doesn't hold a whole frame yet; nothing is
/// consumed in that case.
pub fn split_frame(src: &mut BytesMut) -> Option<Bytes> {
    let len = peek_frame_len(src)?;
    if src.len() < LENGTH_PREFIX_SIZE + len {
        return None;
    }

    src.advance(LENGTH_PREFIX_SIZE);
    Some(src.split_to(len).freeze())
}

#[cfg(feature = "async")]
mod window_codec {
    use bytes::{Buf, BytesMut};
    use cgbf_window::{decode_window, Window};
    use tokio_util::codec::Decoder;
    use tracing::{debug, trace};

    use super::{peek_frame_len, split_frame};
    use crate::config::StreamConfig;
    use crate::error::{HeaderError, StreamError};
    use crate::header::{validate_header, HEADER_SIZE};

    /// `tokio_util` decoder yielding windows from a CG3 binary stream.
    ///
    /// Expects the stream header first. A partial frame left at EOF ends the
    /// stream without an error.
    #[derive(Debug, Clone, Default)]
    pub struct WindowCodec {
        config: StreamConfig,
        header_seen: bool,
        frames: u64,
    }

    impl WindowCodec {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_config(config: StreamConfig) -> Self {
            Self {
                config,
                ..Self::default()
            }
        }

        /// Number of frames decoded so far.
        pub fn frames_read(&self) -> u64 {
            self.frames
        }
    }

    impl Decoder for WindowCodec {
        type Item = Window;
        type Error = StreamError;

        fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Window>, StreamError> {
            if !self.header_seen {
                if src.len() < HEADER_SIZE {
                    return Ok(None);
                }
                validate_header(&src[..HEADER_SIZE])?;
                src.advance(HEADER_SIZE);
                self.header_seen = true;
                debug!("stream header validated");
            }

            if let Some(len) = peek_frame_len(src) {
                self.config.check_window_size(len)?;
            }
            let Some(payload) = split_frame(src) else {
                return Ok(None);
            };

            let index = self.frames;
            self.frames += 1;
            trace!(index, len = payload.len(), "read frame");
            decode_window(&payload)
                .map(Some)
                .map_err(|source| StreamError::Decode { index, source })
        }

        fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Window>, StreamError> {
            if let Some(window) = self.decode(src)? {
                return Ok(Some(window));
            }
            if !self.header_seen {
                return Err(HeaderError::Truncated { len: src.len() }.into());
            }
            if !src.is_empty() {
                debug!(
                    frames = self.frames,
                    trailing = src.len(),
                    "incomplete final frame; ending stream"
                );
                src.clear();
            }
            Ok(None)
        }
    }
}

#[cfg(feature = "async")]
pub use window_codec::WindowCodec;
