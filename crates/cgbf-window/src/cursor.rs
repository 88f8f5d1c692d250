use bytes::Buf;

use crate::error::{DecodeError, Result};

/// Forward-only little-endian reader over a window payload.
pub(crate) struct Cursor<'a> {
    buf: &'a [u8],
    len: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self {
            buf: data,
            len: data.len(),
        }
    }

    /// Offset of the next unread byte, relative to the start of the payload.
    pub(crate) fn offset(&self) -> usize {
        self.len - self.buf.remaining()
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    fn ensure(&self, need: usize) -> Result<()> {
        if self.buf.remaining() < need {
            return Err(DecodeError::UnexpectedEof {
                offset: self.offset(),
                need,
                have: self.buf.remaining(),
            });
        }
        Ok(())
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    pub(crate) fn read_u16(&mut self) -> Result<u16> {
        self.ensure(2)?;
        Ok(self.buf.get_u16_le())
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        Ok(self.buf.get_u32_le())
    }

    pub(crate) fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let buf: &'a [u8] = self.buf;
        let (head, tail) = buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    /// Read a `u16` length followed by that many bytes of UTF-8.
    pub(crate) fn read_str(&mut self) -> Result<&'a str> {
        let len = self.read_u16()? as usize;
        let offset = self.offset();
        let bytes = self.read_bytes(len)?;
        std::str::from_utf8(bytes).map_err(|source| DecodeError::InvalidUtf8 { offset, source })
    }
}
