use crate::error::{Result, StreamError};

/// Configuration for reading a window stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamConfig {
    /// Largest window payload accepted, in bytes. Default: no limit.
    pub max_window_size: Option<usize>,
}

impl StreamConfig {
    /// Set the payload size limit.
    pub fn with_max_window_size(mut self, max: usize) -> Self {
        self.max_window_size = Some(max);
        self
    }

    /// Reject a declared payload length above the limit.
    pub fn check_window_size(&self, size: usize) -> Result<()> {
        match self.max_window_size {
            Some(max) if size > max => Err(StreamError::WindowTooLarge { size, max }),
            _ => Ok(()),
        }
    }
}
