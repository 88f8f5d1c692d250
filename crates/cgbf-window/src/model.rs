//! Decoded window values.
//!
//! These are plain data holders. They are produced whole by
//! [`decode_window`](crate::decode_window) and carry no decode state.

use std::collections::HashMap;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::ser::{SerializeMap, Serializer};
#[cfg(feature = "serde")]
use serde::Serialize;

/// A string resolved through a window's tag table.
pub type Tag = Arc<str>;

/// Wire value of `dep_parent` when a cohort has no parent.
pub const NO_PARENT: u32 = u32::MAX;

/// One candidate analysis: lemma, tags and an optional subreading chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Reading {
    pub lemma: Tag,
    pub tags: Vec<Tag>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub subreading: Option<Box<Reading>>,
}

impl Reading {
    pub fn new(lemma: impl Into<Tag>, tags: Vec<Tag>) -> Self {
        Self {
            lemma: lemma.into(),
            tags,
            subreading: None,
        }
    }

    /// This reading followed by each of its subreadings, outermost first.
    pub fn chain(&self) -> Chain<'_> {
        Chain { next: Some(self) }
    }

    /// Number of readings in the chain, including this one.
    pub fn depth(&self) -> usize {
        self.chain().count()
    }
}

/// Iterator over a subreading chain. See [`Reading::chain`].
#[derive(Debug, Clone)]
pub struct Chain<'a> {
    next: Option<&'a Reading>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a Reading;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.subreading.as_deref();
        Some(current)
    }
}

/// Named links from a cohort to other cohorts, in first-seen order.
///
/// A name may carry several targets; a name is only present once it has at
/// least one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relations {
    entries: Vec<(Tag, Vec<u32>)>,
    // name -> position in `entries`
    slots: HashMap<Tag, usize>,
}

impl Relations {
    /// Append `target` to the list for `name`, creating it on first use.
    pub fn push(&mut self, name: Tag, target: u32) {
        match self.slots.get(&name) {
            Some(&slot) => self.entries[slot].1.push(target),
            None => {
                self.slots.insert(name.clone(), self.entries.len());
                self.entries.push((name, vec![target]));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&[u32]> {
        let &slot = self.slots.get(name)?;
        Some(self.entries[slot].1.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u32])> {
        self.entries
            .iter()
            .map(|(name, targets)| (&**name, targets.as_slice()))
    }

    /// Number of distinct relation names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Window variables set by the producer, in first-seen order.
///
/// `None` values mean the variable is set without a value, which is not the
/// same as the variable being absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables {
    entries: Vec<(Tag, Option<Tag>)>,
    // name -> position in `entries`
    slots: HashMap<Tag, usize>,
}

impl Variables {
    /// Set `name`, replacing any earlier value in place.
    pub fn set(&mut self, name: Tag, value: Option<Tag>) {
        match self.slots.get(&name) {
            Some(&slot) => self.entries[slot].1 = value,
            None => {
                self.slots.insert(name.clone(), self.entries.len());
                self.entries.push((name, value));
            }
        }
    }

    /// `None` if unset, `Some(None)` if set without a value.
    pub fn get(&self, name: &str) -> Option<Option<&str>> {
        let &slot = self.slots.get(name)?;
        Some(self.entries[slot].1.as_deref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(name, value)| (&**name, value.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// All analyses of one token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Cohort {
    /// The un-disambiguated surface analysis; its lemma is the wordform.
    #[cfg_attr(feature = "serde", serde(rename = "static"))]
    pub static_reading: Reading,
    /// Top-level readings only. Subreadings hang off their parent.
    pub readings: Vec<Reading>,
    pub dep_self: u32,
    pub dep_parent: Option<u32>,
    pub relations: Relations,
    pub text: String,
    pub wblank: String,
}

impl Cohort {
    /// The wordform, i.e. the static reading's lemma.
    pub fn wordform(&self) -> &str {
        &self.static_reading.lemma
    }

    /// Count of readings including every subreading.
    pub fn reading_count(&self) -> usize {
        self.readings.iter().map(Reading::depth).sum()
    }
}

/// One decoded window of the stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Window {
    pub cohorts: Vec<Cohort>,
    pub set_vars: Variables,
    pub rem_vars: Vec<Tag>,
    pub text: String,
    pub text_post: String,
    pub flush_after: bool,
}

impl Window {
    /// Count of readings across all cohorts, subreadings included.
    pub fn reading_count(&self) -> usize {
        self.cohorts.iter().map(Cohort::reading_count).sum()
    }
}

#[cfg(feature = "serde")]
impl Serialize for Relations {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, targets) in &self.entries {
            map.serialize_entry(&**name, targets)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
impl Serialize for Variables {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(&**name, &value.as_deref())?;
        }
        map.end()
    }
}
