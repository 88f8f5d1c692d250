//! Per-window string interning table.

use std::sync::Arc;

use crate::cursor::Cursor;
use crate::error::{DecodeError, Result};
use crate::model::Tag;

/// The tag table at the head of every window payload.
///
/// Built once per window and dropped with it; nothing is shared between
/// windows.
#[derive(Debug, Clone, Default)]
pub struct TagTable {
    tags: Vec<Tag>,
}

impl TagTable {
    /// Build a table from already-decoded strings.
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Read `u16` count followed by that many length-prefixed strings.
    pub(crate) fn read(cursor: &mut Cursor<'_>) -> Result<Self> {
        let count = cursor.read_u16()? as usize;
        let mut tags = Vec::with_capacity(count);
        for _ in 0..count {
            tags.push(Tag::from(cursor.read_str()?));
        }
        Ok(Self { tags })
    }

    /// Number of entries in the table.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Look up a tag by index.
    pub fn get(&self, index: u16) -> Option<&Tag> {
        self.tags.get(index as usize)
    }

    /// Resolve an index into a shared handle, reporting `offset` on failure.
    pub fn resolve(&self, index: u16, offset: usize) -> Result<Tag> {
        self.get(index)
            .cloned()
            .ok_or(DecodeError::TagIndexOutOfRange {
                index,
                count: self.tags.len(),
                offset,
            })
    }

    /// Read a `u16` index at the cursor and resolve it.
    pub(crate) fn read_tag(&self, cursor: &mut Cursor<'_>) -> Result<Tag> {
        let offset = cursor.offset();
        let index = cursor.read_u16()?;
        self.resolve(index, offset)
    }

    /// Read a tag-index list: `u16` count, then that many indices.
    pub(crate) fn read_tag_list(&self, cursor: &mut Cursor<'_>) -> Result<Vec<Tag>> {
        let count = cursor.read_u16()? as usize;
        let mut tags = Vec::with_capacity(count);
        for _ in 0..count {
            tags.push(self.read_tag(cursor)?);
        }
        Ok(tags)
    }
}
