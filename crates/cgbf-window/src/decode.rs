//! Window payload decoding.
//!
//! Payload layout (all integers little-endian):
//! ```text
//! u16 window_flags
//! u16 tag_count, tag_count × str           ; tag table
//! u16 var_count, var_count × (u8 mode, u16 t1, u16 t2)
//! str text, str text_post
//! u16 cohort_count, cohort_count × cohort
//!
//! cohort  = u16 flags, u16 lemma, tags, u32 dep_self, u32 dep_parent,
//!           u16 rel_count × (u16 name, u32 target), str text, str wblank,
//!           u16 reading_count × reading
//! reading = u16 flags, u16 lemma, tags
//! tags    = u16 count, count × u16 index
//! str     = u16 len, len × u8 (UTF-8)
//! ```

use tracing::trace;

use crate::cursor::Cursor;
use crate::error::{DecodeError, Result};
use crate::model::{Cohort, Reading, Window, NO_PARENT};
use crate::tags::TagTable;

/// Window flag: consumers should flush buffered output after this window.
pub const WINDOW_FLUSH_AFTER: u16 = 1 << 0;

/// Reading flag: this reading is the subreading of the one before it.
pub const READING_SUBREADING: u16 = 1 << 0;

/// Variable entry modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum VarMode {
    /// Set `t1` to the value `t2`.
    Set = 1,
    /// Set `t1` without a value.
    SetEmpty = 2,
    /// Record `t1` as removed.
    Remove = 3,
}

impl TryFrom<u8> for VarMode {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Set),
            2 => Ok(Self::SetEmpty),
            3 => Ok(Self::Remove),
            other => Err(other),
        }
    }
}

/// Decode one window payload (without its length prefix).
///
/// No partial window is returned: any underrun, bad tag index, invalid
/// UTF-8 or unknown variable mode fails the whole payload.
pub fn decode_window(payload: &[u8]) -> Result<Window> {
    let mut cursor = Cursor::new(payload);
    let mut window = Window::default();

    let flags = cursor.read_u16()?;
    window.flush_after = flags & WINDOW_FLUSH_AFTER != 0;

    let tags = TagTable::read(&mut cursor)?;

    let var_count = cursor.read_u16()?;
    for _ in 0..var_count {
        read_variable(&mut cursor, &tags, &mut window)?;
    }

    window.text = cursor.read_str()?.to_owned();
    window.text_post = cursor.read_str()?.to_owned();

    let cohort_count = cursor.read_u16()? as usize;
    window.cohorts.reserve(cohort_count);
    for _ in 0..cohort_count {
        window.cohorts.push(read_cohort(&mut cursor, &tags)?);
    }

    if cursor.remaining() > 0 {
        trace!(
            trailing = cursor.remaining(),
            "ignoring trailing bytes after last cohort"
        );
    }
    trace!(
        tags = tags.len(),
        cohorts = window.cohorts.len(),
        flush_after = window.flush_after,
        "decoded window"
    );

    Ok(window)
}

fn read_variable(cursor: &mut Cursor<'_>, tags: &TagTable, window: &mut Window) -> Result<()> {
    let offset = cursor.offset();
    let mode = cursor.read_u8()?;
    let mode = VarMode::try_from(mode)
        .map_err(|mode| DecodeError::UnknownVariableMode { mode, offset })?;

    let name_offset = cursor.offset();
    let name = cursor.read_u16()?;
    let value_offset = cursor.offset();
    let value = cursor.read_u16()?;

    let name = tags.resolve(name, name_offset)?;
    match mode {
        VarMode::Set => {
            let value = tags.resolve(value, value_offset)?;
            window.set_vars.set(name, Some(value));
        }
        VarMode::SetEmpty => window.set_vars.set(name, None),
        VarMode::Remove => window.rem_vars.push(name),
    }
    Ok(())
}

fn read_cohort(cursor: &mut Cursor<'_>, tags: &TagTable) -> Result<Cohort> {
    let mut cohort = Cohort::default();

    // Reserved; consumed to keep the cursor aligned.
    let _flags = cursor.read_u16()?;

    cohort.static_reading.lemma = tags.read_tag(cursor)?;
    cohort.static_reading.tags = tags.read_tag_list(cursor)?;

    cohort.dep_self = cursor.read_u32()?;
    cohort.dep_parent = match cursor.read_u32()? {
        NO_PARENT => None,
        parent => Some(parent),
    };

    let rel_count = cursor.read_u16()?;
    for _ in 0..rel_count {
        let name = tags.read_tag(cursor)?;
        let target = cursor.read_u32()?;
        cohort.relations.push(name, target);
    }

    cohort.text = cursor.read_str()?.to_owned();
    cohort.wblank = cursor.read_str()?.to_owned();

    let reading_count = cursor.read_u16()?;
    // Readings of the chain currently being built, outermost first.
    let mut chain: Vec<Reading> = Vec::new();
    for _ in 0..reading_count {
        let flags = cursor.read_u16()?;
        let lemma = tags.read_tag(cursor)?;
        let reading = Reading::new(lemma, tags.read_tag_list(cursor)?);

        if flags & READING_SUBREADING == 0 || chain.is_empty() {
            if let Some(top) = fold_chain(std::mem::take(&mut chain)) {
                cohort.readings.push(top);
            }
        }
        chain.push(reading);
    }
    if let Some(top) = fold_chain(chain) {
        cohort.readings.push(top);
    }

    Ok(cohort)
}

/// Nest `chain[i + 1]` as the subreading of `chain[i]`, returning `chain[0]`.
fn fold_chain(chain: Vec<Reading>) -> Option<Reading> {
    chain.into_iter().rev().reduce(|sub, mut parent| {
        parent.subreading = Some(Box::new(sub));
        parent
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CohortBuilder, ReadingRecord, WindowBuilder};

    #[test]
    fn empty_window() {
        let payload = WindowBuilder::new().build();
        let window = decode_window(&payload).unwrap();
        assert_eq!(window, Window::default());
    }

    #[test]
    fn flush_flag() {
        let payload = WindowBuilder::new().flags(WINDOW_FLUSH_AFTER).build();
        assert!(decode_window(&payload).unwrap().flush_after);

        let payload = WindowBuilder::new().flags(0x0002).build();
        assert!(!decode_window(&payload).unwrap().flush_after);
    }

    #[test]
    fn static_lemma_resolves_through_tag_table() {
        let payload = WindowBuilder::new()
            .tags(["foo", "bar", "baz"])
            .cohort(CohortBuilder::new(1).static_tags(&[2, 0]))
            .build();

        let window = decode_window(&payload).unwrap();
        let cohort = &window.cohorts[0];
        assert_eq!(cohort.wordform(), "bar");
        let tags: Vec<&str> = cohort.static_reading.tags.iter().map(|t| &**t).collect();
        assert_eq!(tags, ["baz", "foo"]);
    }

    #[test]
    fn repeated_tags_share_one_allocation() {
        let payload = WindowBuilder::new()
            .tags(["w", "N"])
            .cohort(
                CohortBuilder::new(0)
                    .reading(ReadingRecord::new(0, &[1, 1]))
                    .reading(ReadingRecord::new(0, &[1])),
            )
            .build();

        let window = decode_window(&payload).unwrap();
        let readings = &window.cohorts[0].readings;
        assert!(std::sync::Arc::ptr_eq(
            &readings[0].tags[0],
            &readings[1].tags[0]
        ));
        assert_eq!(readings[0].tags.len(), 2);
    }

    #[test]
    fn variables_by_mode() {
        let payload = WindowBuilder::new()
            .tags(["a", "1", "b", "c"])
            .var(1, 0, 1)
            .var(2, 2, 0)
            .var(3, 3, 0)
            .build();

        let window = decode_window(&payload).unwrap();
        assert_eq!(window.set_vars.get("a"), Some(Some("1")));
        assert_eq!(window.set_vars.get("b"), Some(None));
        assert_eq!(window.set_vars.get("c"), None);
        assert_eq!(window.rem_vars.len(), 1);
        assert_eq!(&*window.rem_vars[0], "c");
    }

    #[test]
    fn set_empty_ignores_value_index() {
        // t2 is not a valid index, but mode 2 never looks at it.
        let payload = WindowBuilder::new().tags(["a"]).var(2, 0, 999).build();
        let window = decode_window(&payload).unwrap();
        assert_eq!(window.set_vars.get("a"), Some(None));
    }

    #[test]
    fn unknown_variable_mode_is_rejected() {
        let payload = WindowBuilder::new().tags(["a"]).var(7, 0, 0).build();
        let err = decode_window(&payload).unwrap_err();
        // flags(2) + tag table(2 + 3) + var_count(2)
        assert!(matches!(
            err,
            DecodeError::UnknownVariableMode { mode: 7, offset: 9 }
        ));
    }

    #[test]
    fn window_texts() {
        let payload = WindowBuilder::new().text("<p>").text_post("</p>").build();
        let window = decode_window(&payload).unwrap();
        assert_eq!(window.text, "<p>");
        assert_eq!(window.text_post, "</p>");
    }

    #[test]
    fn dep_parent_sentinel_is_absent() {
        let payload = WindowBuilder::new()
            .tags(["w"])
            .cohort(CohortBuilder::new(0).deps(1, NO_PARENT))
            .cohort(CohortBuilder::new(0).deps(2, 1))
            .cohort(CohortBuilder::new(0).deps(3, 0))
            .cohort(CohortBuilder::new(0).deps(4, 0xFFFF_FFFE))
            .build();

        let window = decode_window(&payload).unwrap();
        let parents: Vec<Option<u32>> = window.cohorts.iter().map(|c| c.dep_parent).collect();
        assert_eq!(parents, [None, Some(1), Some(0), Some(0xFFFF_FFFE)]);
        assert_eq!(window.cohorts[3].dep_self, 4);
    }

    #[test]
    fn relations_accumulate_per_name() {
        let payload = WindowBuilder::new()
            .tags(["w", "obj", "subj"])
            .cohort(
                CohortBuilder::new(0)
                    .relation(1, 5)
                    .relation(2, 3)
                    .relation(1, 9),
            )
            .build();

        let window = decode_window(&payload).unwrap();
        let rels = &window.cohorts[0].relations;
        assert_eq!(rels.get("obj"), Some(&[5, 9][..]));
        assert_eq!(rels.get("subj"), Some(&[3][..]));
        assert_eq!(rels.len(), 2);
    }

    #[test]
    fn cohort_text_and_wblank() {
        let payload = WindowBuilder::new()
            .tags(["w"])
            .cohort(CohortBuilder::new(0).text(" ").wblank("[[b]]"))
            .build();

        let window = decode_window(&payload).unwrap();
        assert_eq!(window.cohorts[0].text, " ");
        assert_eq!(window.cohorts[0].wblank, "[[b]]");
    }

    #[test]
    fn subreading_flag_chains_onto_previous() {
        let payload = WindowBuilder::new()
            .tags(["w", "house", "boat", "N"])
            .cohort(
                CohortBuilder::new(0)
                    .reading(ReadingRecord::new(1, &[3]))
                    .reading(ReadingRecord::new(2, &[3]).subreading()),
            )
            .build();

        let window = decode_window(&payload).unwrap();
        let readings = &window.cohorts[0].readings;
        assert_eq!(readings.len(), 1);
        assert_eq!(&*readings[0].lemma, "house");
        let sub = readings[0].subreading.as_deref().unwrap();
        assert_eq!(&*sub.lemma, "boat");
        assert!(sub.subreading.is_none());
    }

    #[test]
    fn chains_extend_while_flag_is_set() {
        let payload = WindowBuilder::new()
            .tags(["w", "a", "b", "c", "d", "e"])
            .cohort(
                CohortBuilder::new(0)
                    .reading(ReadingRecord::new(1, &[]))
                    .reading(ReadingRecord::new(2, &[]).subreading())
                    .reading(ReadingRecord::new(3, &[]).subreading())
                    .reading(ReadingRecord::new(4, &[]))
                    .reading(ReadingRecord::new(5, &[]).subreading()),
            )
            .build();

        let window = decode_window(&payload).unwrap();
        let readings = &window.cohorts[0].readings;
        assert_eq!(readings.len(), 2);

        let first: Vec<&str> = readings[0].chain().map(|r| &*r.lemma).collect();
        let second: Vec<&str> = readings[1].chain().map(|r| &*r.lemma).collect();
        assert_eq!(first, ["a", "b", "c"]);
        assert_eq!(second, ["d", "e"]);
    }

    #[test]
    fn leading_subreading_flag_starts_new_reading() {
        let payload = WindowBuilder::new()
            .tags(["w", "a"])
            .cohort(CohortBuilder::new(0).reading(ReadingRecord::new(1, &[]).subreading()))
            .build();

        let window = decode_window(&payload).unwrap();
        assert_eq!(window.cohorts[0].readings.len(), 1);
        assert!(window.cohorts[0].readings[0].subreading.is_none());
    }

    #[test]
    fn chains_do_not_cross_cohorts() {
        let payload = WindowBuilder::new()
            .tags(["w", "a", "b"])
            .cohort(CohortBuilder::new(0).reading(ReadingRecord::new(1, &[])))
            .cohort(CohortBuilder::new(0).reading(ReadingRecord::new(2, &[]).subreading()))
            .build();

        let window = decode_window(&payload).unwrap();
        assert!(window.cohorts[0].readings[0].subreading.is_none());
        assert_eq!(&*window.cohorts[1].readings[0].lemma, "b");
    }

    #[test]
    fn tag_index_one_past_end_fails() {
        let payload = WindowBuilder::new()
            .tags(["foo", "bar", "baz"])
            .cohort(CohortBuilder::new(3))
            .build();

        let err = decode_window(&payload).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::TagIndexOutOfRange {
                index: 3,
                count: 3,
                ..
            }
        ));
    }

    #[test]
    fn bad_index_in_reading_tags_fails() {
        let payload = WindowBuilder::new()
            .tags(["w"])
            .cohort(CohortBuilder::new(0).reading(ReadingRecord::new(0, &[0, 1])))
            .build();
        assert!(matches!(
            decode_window(&payload),
            Err(DecodeError::TagIndexOutOfRange { index: 1, .. })
        ));
    }

    #[test]
    fn bad_static_tag_index_fails() {
        let payload = WindowBuilder::new()
            .tags(["w", "N"])
            .cohort(CohortBuilder::new(0).static_tags(&[1, 2]))
            .build();
        assert!(matches!(
            decode_window(&payload),
            Err(DecodeError::TagIndexOutOfRange { index: 2, count: 2, .. })
        ));
    }

    #[test]
    fn bad_relation_name_index_fails() {
        let payload = WindowBuilder::new()
            .tags(["w", "obj"])
            .cohort(CohortBuilder::new(0).relation(1, 4).relation(2, 5))
            .build();
        assert!(matches!(
            decode_window(&payload),
            Err(DecodeError::TagIndexOutOfRange { index: 2, count: 2, .. })
        ));
    }

    #[test]
    fn bad_variable_name_index_fails() {
        for mode in [1, 2, 3] {
            let payload = WindowBuilder::new().tags(["a", "1"]).var(mode, 2, 1).build();
            assert!(
                matches!(
                    decode_window(&payload),
                    Err(DecodeError::TagIndexOutOfRange { index: 2, count: 2, .. })
                ),
                "mode {mode}"
            );
        }
    }

    #[test]
    fn set_with_value_rejects_bad_value_index() {
        let payload = WindowBuilder::new().tags(["a", "1"]).var(1, 0, 2).build();
        // flags(2) + table(2 + 3 + 3) + var_count(2) + mode(1) + t1(2)
        assert!(matches!(
            decode_window(&payload),
            Err(DecodeError::TagIndexOutOfRange {
                index: 2,
                count: 2,
                offset: 15
            })
        ));
    }

    #[test]
    fn many_distinct_relation_names_decode_quickly() {
        let names: Vec<String> = (0..u16::MAX - 1).map(|i| format!("rel{i:05}")).collect();
        let cohort = (1..u16::MAX).fold(CohortBuilder::new(0), |c, i| c.relation(i, u32::from(i)));
        let payload = WindowBuilder::new()
            .tags(std::iter::once("w".to_owned()).chain(names))
            .cohort(cohort)
            .build();

        let started = std::time::Instant::now();
        let window = decode_window(&payload).unwrap();
        let elapsed = started.elapsed();

        let rels = &window.cohorts[0].relations;
        assert_eq!(rels.len(), usize::from(u16::MAX - 1));
        assert_eq!(rels.get("rel00000"), Some(&[1][..]));
        assert_eq!(rels.get("rel65533"), Some(&[65534][..]));
        assert!(elapsed < std::time::Duration::from_secs(5), "took {elapsed:?}");
    }

    #[test]
    fn many_distinct_variables_decode_quickly() {
        let names: Vec<String> = (0..u16::MAX).map(|i| format!("v{i:05}")).collect();
        let builder = (0..u16::MAX).fold(WindowBuilder::new().tags(names), |b, i| b.var(2, i, 0));
        let payload = builder.build();

        let started = std::time::Instant::now();
        let window = decode_window(&payload).unwrap();
        let elapsed = started.elapsed();

        assert_eq!(window.set_vars.len(), usize::from(u16::MAX));
        assert_eq!(window.set_vars.get("v65534"), Some(None));
        assert!(elapsed < std::time::Duration::from_secs(5), "took {elapsed:?}");
    }

    #[test]
    fn truncated_payload_fails() {
        let payload = WindowBuilder::new()
            .tags(["w", "N"])
            .cohort(CohortBuilder::new(0).reading(ReadingRecord::new(0, &[1])))
            .build();

        for cut in 0..payload.len() {
            let err = decode_window(&payload[..cut]).unwrap_err();
            assert!(
                matches!(err, DecodeError::UnexpectedEof { .. }),
                "cut at {cut}: {err}"
            );
        }
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let mut payload = WindowBuilder::new().tags(["w"]).cohort(CohortBuilder::new(0)).build();
        payload.extend_from_slice(&[0xDE, 0xAD]);
        let window = decode_window(&payload).unwrap();
        assert_eq!(window.cohorts.len(), 1);
    }

    #[test]
    fn reserved_flag_bits_are_ignored() {
        let payload = WindowBuilder::new()
            .tags(["w", "a", "b"])
            .cohort(
                CohortBuilder::new(0)
                    .flags(0xFFFF)
                    .reading(ReadingRecord::new(1, &[]))
                    .reading(ReadingRecord::new(2, &[]).flags(0x0006)),
            )
            .build();

        let window = decode_window(&payload).unwrap();
        let readings = &window.cohorts[0].readings;
        assert_eq!(readings.len(), 2);
        assert!(readings[0].subreading.is_none());
    }

    #[test]
    fn var_mode_conversion() {
        assert_eq!(VarMode::try_from(1), Ok(VarMode::Set));
        assert_eq!(VarMode::try_from(2), Ok(VarMode::SetEmpty));
        assert_eq!(VarMode::try_from(3), Ok(VarMode::Remove));
        assert_eq!(VarMode::try_from(0), Err(0));
        assert_eq!(VarMode::try_from(4), Err(4));
    }
}
