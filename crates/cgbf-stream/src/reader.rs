use std::io::{ErrorKind, Read};
use std::iter::FusedIterator;

use bytes::Bytes;
use cgbf_window::{decode_window, Window};
use tracing::{debug, trace};

use crate::cancel::CancelHandle;
use crate::config::StreamConfig;
use crate::error::{Result, StreamError};
use crate::header::{validate_header, HEADER_SIZE, LENGTH_PREFIX_SIZE};

/// Reads windows from any `Read` source, one frame at a time.
///
/// The header is validated when the reader is created. Iteration stops for
/// good at the first error, at end of input, or at a truncated final frame.
pub struct WindowReader<R> {
    inner: R,
    config: StreamConfig,
    cancel: Option<CancelHandle>,
    frames: u64,
    finished: bool,
}

/// Validate the header of `source` and return an iterator over its windows.
pub fn read_windows<R: Read>(source: R) -> Result<WindowReader<R>> {
    WindowReader::new(source)
}

impl<R: Read> WindowReader<R> {
    /// Read and validate the stream header with default configuration.
    pub fn new(inner: R) -> Result<Self> {
        Self::with_config(inner, StreamConfig::default())
    }

    /// Read and validate the stream header with explicit configuration.
    pub fn with_config(mut inner: R, config: StreamConfig) -> Result<Self> {
        let mut header = [0u8; HEADER_SIZE];
        let filled = read_full(&mut inner, &mut header)?;
        validate_header(&header[..filled])?;
        debug!("stream header validated");

        Ok(Self {
            inner,
            config,
            cancel: None,
            frames: 0,
            finished: false,
        })
    }

    /// Stop cleanly at the next frame boundary once `cancel` is triggered.
    pub fn with_cancel(mut self, cancel: CancelHandle) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Read the next raw window payload, without decoding it.
    ///
    /// Returns `Ok(None)` at end of stream, including when the final frame
    /// is cut short.
    pub fn read_frame(&mut self) -> Result<Option<Bytes>> {
        if self.finished {
            return Ok(None);
        }
        match self.next_frame() {
            Ok(Some(payload)) => {
                self.frames += 1;
                Ok(Some(payload))
            }
            other => {
                self.finished = true;
                other
            }
        }
    }

    /// Read and decode the next window.
    pub fn read_window(&mut self) -> Result<Option<Window>> {
        let Some(payload) = self.read_frame()? else {
            return Ok(None);
        };
        let index = self.frames - 1;
        match decode_window(&payload) {
            Ok(window) => Ok(Some(window)),
            Err(source) => {
                self.finished = true;
                Err(StreamError::Decode { index, source })
            }
        }
    }

    /// Number of complete frames read so far.
    pub fn frames_read(&self) -> u64 {
        self.frames
    }

    /// Current reader configuration.
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Borrow the underlying source.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Mutably borrow the underlying source.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Consume the reader and return the inner source.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn next_frame(&mut self) -> Result<Option<Bytes>> {
        if self.cancel.as_ref().is_some_and(CancelHandle::is_cancelled) {
            debug!(frames = self.frames, "stream reading cancelled");
            return Ok(None);
        }

        let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
        let filled = read_full(&mut self.inner, &mut prefix)?;
        if filled < LENGTH_PREFIX_SIZE {
            debug!(frames = self.frames, trailing = filled, "end of stream");
            return Ok(None);
        }

        let len = u32::from_le_bytes(prefix) as usize;
        self.config.check_window_size(len)?;

        let mut payload = Vec::new();
        (&mut self.inner)
            .take(len as u64)
            .read_to_end(&mut payload)?;
        if payload.len() < len {
            debug!(
                frames = self.frames,
                declared = len,
                available = payload.len(),
                "truncated final frame; ending stream"
            );
            return Ok(None);
        }

        trace!(index = self.frames, len, "read frame");
        Ok(Some(Bytes::from(payload)))
    }
}

impl<R: Read> Iterator for WindowReader<R> {
    type Item = Result<Window>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_window().transpose()
    }
}

impl<R: Read> FusedIterator for WindowReader<R> {}

/// Fill `buf` from `reader`, stopping early only at EOF.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0usize;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}
