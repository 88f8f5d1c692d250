//! Payload assembly for tests.
//!
//! Only compiled for this crate's tests or with the `test-util` feature.
//! Indices are written as given, so invalid payloads are easy to build.

use bytes::BufMut;

use crate::decode::READING_SUBREADING;
use crate::model::NO_PARENT;

fn put_str(dst: &mut Vec<u8>, s: &str) {
    dst.put_u16_le(s.len() as u16);
    dst.put_slice(s.as_bytes());
}

fn put_list(dst: &mut Vec<u8>, indices: &[u16]) {
    dst.put_u16_le(indices.len() as u16);
    for &index in indices {
        dst.put_u16_le(index);
    }
}

/// One reading record inside a cohort.
#[derive(Debug, Clone)]
pub struct ReadingRecord {
    flags: u16,
    lemma: u16,
    tags: Vec<u16>,
}

impl ReadingRecord {
    pub fn new(lemma: u16, tags: &[u16]) -> Self {
        Self {
            flags: 0,
            lemma,
            tags: tags.to_vec(),
        }
    }

    /// Mark as the subreading of the previous record.
    pub fn subreading(mut self) -> Self {
        self.flags |= READING_SUBREADING;
        self
    }

    pub fn flags(mut self, flags: u16) -> Self {
        self.flags = flags;
        self
    }
}

/// One cohort record.
#[derive(Debug, Clone)]
pub struct CohortBuilder {
    flags: u16,
    lemma: u16,
    static_tags: Vec<u16>,
    dep_self: u32,
    dep_parent: u32,
    relations: Vec<(u16, u32)>,
    text: String,
    wblank: String,
    readings: Vec<ReadingRecord>,
}

impl CohortBuilder {
    pub fn new(lemma: u16) -> Self {
        Self {
            flags: 0,
            lemma,
            static_tags: Vec::new(),
            dep_self: 0,
            dep_parent: NO_PARENT,
            relations: Vec::new(),
            text: String::new(),
            wblank: String::new(),
            readings: Vec::new(),
        }
    }

    pub fn flags(mut self, flags: u16) -> Self {
        self.flags = flags;
        self
    }

    pub fn static_tags(mut self, tags: &[u16]) -> Self {
        self.static_tags = tags.to_vec();
        self
    }

    pub fn deps(mut self, dep_self: u32, dep_parent: u32) -> Self {
        self.dep_self = dep_self;
        self.dep_parent = dep_parent;
        self
    }

    pub fn relation(mut self, name: u16, target: u32) -> Self {
        self.relations.push((name, target));
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_owned();
        self
    }

    pub fn wblank(mut self, wblank: &str) -> Self {
        self.wblank = wblank.to_owned();
        self
    }

    pub fn reading(mut self, reading: ReadingRecord) -> Self {
        self.readings.push(reading);
        self
    }

    fn encode(&self, dst: &mut Vec<u8>) {
        dst.put_u16_le(self.flags);
        dst.put_u16_le(self.lemma);
        put_list(dst, &self.static_tags);
        dst.put_u32_le(self.dep_self);
        dst.put_u32_le(self.dep_parent);
        dst.put_u16_le(self.relations.len() as u16);
        for &(name, target) in &self.relations {
            dst.put_u16_le(name);
            dst.put_u32_le(target);
        }
        put_str(dst, &self.text);
        put_str(dst, &self.wblank);
        dst.put_u16_le(self.readings.len() as u16);
        for reading in &self.readings {
            dst.put_u16_le(reading.flags);
            dst.put_u16_le(reading.lemma);
            put_list(dst, &reading.tags);
        }
    }
}

/// A whole window payload, without the stream length prefix.
#[derive(Debug, Clone, Default)]
pub struct WindowBuilder {
    flags: u16,
    tags: Vec<String>,
    vars: Vec<(u8, u16, u16)>,
    text: String,
    text_post: String,
    cohorts: Vec<CohortBuilder>,
}

impl WindowBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flags(mut self, flags: u16) -> Self {
        self.flags = flags;
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = tags.into_iter().map(|t| t.as_ref().to_owned()).collect();
        self
    }

    pub fn var(mut self, mode: u8, t1: u16, t2: u16) -> Self {
        self.vars.push((mode, t1, t2));
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_owned();
        self
    }

    pub fn text_post(mut self, text_post: &str) -> Self {
        self.text_post = text_post.to_owned();
        self
    }

    pub fn cohort(mut self, cohort: CohortBuilder) -> Self {
        self.cohorts.push(cohort);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut dst = Vec::new();
        dst.put_u16_le(self.flags);
        dst.put_u16_le(self.tags.len() as u16);
        for tag in &self.tags {
            put_str(&mut dst, tag);
        }
        dst.put_u16_le(self.vars.len() as u16);
        for &(mode, t1, t2) in &self.vars {
            dst.put_u8(mode);
            dst.put_u16_le(t1);
            dst.put_u16_le(t2);
        }
        put_str(&mut dst, &self.text);
        put_str(&mut dst, &self.text_post);
        dst.put_u16_le(self.cohorts.len() as u16);
        for cohort in &self.cohorts {
            cohort.encode(&mut dst);
        }
        dst
    }

    /// The payload with its `u32` length prefix, ready to append to a stream.
    pub fn build_frame(&self) -> Vec<u8> {
        let payload = self.build();
        let mut dst = Vec::with_capacity(4 + payload.len());
        dst.put_u32_le(payload.len() as u32);
        dst.put_slice(&payload);
        dst
    }
}
