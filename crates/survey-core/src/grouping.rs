//! Matrix grouping.
//!
//! Partitions the enabled items of a group into standalone and matrix
//! records. The preview and the exporter both call [`compute_matrix_groups`],
//! so they always agree on which items form a matrix.

use std::collections::HashMap;

use survey_model::{
    Document, Group, GroupLayout, GroupingMode, Item, ItemId, MatrixGroupRecord, resolve_text,
};
use tracing::trace;

use crate::policy::must_stay_standalone;

/// Prefix of generated matrix question names.
pub const MATRIX_NAME_PREFIX: &str = "M";

/// Compute the layout of one group.
///
/// Disabled items never take part in grouping; they are listed in
/// [`GroupLayout::disabled`] as standalone records.
pub fn compute_matrix_groups(group: &Group, mode: GroupingMode, language: &str) -> GroupLayout {
    let (enabled, disabled): (Vec<&Item>, Vec<&Item>) =
        group.items.iter().partition(|item| item.enabled);

    let records = match mode {
        GroupingMode::Off => enabled
            .iter()
            .map(|item| MatrixGroupRecord::standalone(item.id.clone()))
            .collect(),
        GroupingMode::Global => group_global(group, &enabled, language),
        GroupingMode::Consecutive => group_consecutive(group, &enabled, language),
    };

    let layout = GroupLayout {
        group_id: group.id.clone(),
        records,
        disabled: disabled
            .iter()
            .map(|item| MatrixGroupRecord::standalone(item.id.clone()))
            .collect(),
    };
    trace!(
        group = %group.id,
        records = layout.records.len(),
        matrices = layout.matrix_count(),
        "computed group layout"
    );
    layout
}

/// Layouts for every group of a document, in group order.
pub fn compute_document_layouts(document: &Document) -> Vec<GroupLayout> {
    let mode = document.options.grouping_mode();
    document
        .groups
        .iter()
        .map(|group| compute_matrix_groups(group, mode, &document.survey.base_language))
        .collect()
}

/// The signature an item is grouped on, or `None` if it must stay standalone.
fn grouping_signature(group: &Group, item: &Item) -> Option<String> {
    if must_stay_standalone(item, group.no_matrix) {
        return None;
    }
    item.level_signature()
}

fn group_global(group: &Group, items: &[&Item], language: &str) -> Vec<MatrixGroupRecord> {
    let mut records = Vec::new();
    let mut bucket_order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, Vec<&Item>> = HashMap::new();

    for &item in items {
        let Some(signature) = grouping_signature(group, item) else {
            records.push(MatrixGroupRecord::standalone(item.id.clone()));
            continue;
        };
        buckets
            .entry(signature.clone())
            .or_insert_with(|| {
                bucket_order.push(signature);
                Vec::new()
            })
            .push(item);
    }

    for signature in bucket_order {
        let members = buckets.remove(&signature).unwrap_or_default();
        records.push(close_run(group, members, signature, language));
    }
    records
}

fn group_consecutive(group: &Group, items: &[&Item], language: &str) -> Vec<MatrixGroupRecord> {
    let mut records = Vec::new();
    let mut current: Option<(String, Vec<&Item>)> = None;

    for &item in items {
        match grouping_signature(group, item) {
            None => {
                if let Some((signature, members)) = current.take() {
                    records.push(close_run(group, members, signature, language));
                }
                records.push(MatrixGroupRecord::standalone(item.id.clone()));
            }
            Some(signature) => match current.as_mut() {
                Some((current_signature, members)) if *current_signature == signature => {
                    members.push(item);
                }
                _ => {
                    if let Some((previous, members)) = current.replace((signature, vec![item])) {
                        records.push(close_run(group, members, previous, language));
                    }
                }
            },
        }
    }
    if let Some((signature, members)) = current {
        records.push(close_run(group, members, signature, language));
    }
    records
}

/// Turn a finished run or bucket into a record. Single items stay standalone.
fn close_run(
    group: &Group,
    members: Vec<&Item>,
    signature: String,
    language: &str,
) -> MatrixGroupRecord {
    match members.as_slice() {
        [] => unreachable!("runs always hold at least one item"),
        [only] => MatrixGroupRecord::standalone(only.id.clone()),
        [first, ..] => {
            let name = format!("{MATRIX_NAME_PREFIX}{}", first.code);
            let heading = matrix_heading(group, first, language);
            let ids: Vec<ItemId> = members.iter().map(|item| item.id.clone()).collect();
            MatrixGroupRecord::matrix(name, ids, signature, heading)
        }
    }
}

/// Default heading of a matrix: the group instructions, else the first item's text.
pub fn matrix_heading(group: &Group, first: &Item, language: &str) -> String {
    group
        .instructions
        .as_ref()
        .map(|instructions| resolve_text(instructions, language))
        .filter(|text| !text.trim().is_empty())
        .unwrap_or_else(|| resolve_text(&first.description, language))
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_model::{GroupId, Levels, MultilingualText};

    fn likert(id: &str) -> Item {
        Item::new(ItemId::new(id).unwrap(), id.to_uppercase())
            .with_levels(Levels::from_pairs([("1", "Low"), ("2", "High")]))
    }

    fn yes_no(id: &str) -> Item {
        Item::new(ItemId::new(id).unwrap(), id.to_uppercase())
            .with_levels(Levels::from_pairs([("0", "No"), ("1", "Yes")]))
    }

    fn group(items: Vec<Item>) -> Group {
        Group::new(GroupId::new("g").unwrap(), "Group").with_items(items)
    }

    fn ids(record: &MatrixGroupRecord) -> Vec<&str> {
        record.item_ids.iter().map(ItemId::as_str).collect()
    }

    #[test]
    fn off_mode_keeps_every_enabled_item_standalone() {
        let group = group(vec![likert("a"), likert("b"), yes_no("c")]);
        let layout = compute_matrix_groups(&group, GroupingMode::Off, "en");
        assert_eq!(layout.records.len(), 3);
        assert!(layout.records.iter().all(|record| !record.is_matrix));
        assert_eq!(layout.enabled_item_ids().len(), 3);
    }

    #[test]
    fn global_mode_merges_across_interruptions() {
        let group = group(vec![likert("a"), yes_no("x"), likert("b")]);
        let layout = compute_matrix_groups(&group, GroupingMode::Global, "en");
        assert_eq!(layout.records.len(), 2);
        assert_eq!(ids(&layout.records[0]), vec!["a", "b"]);
        assert_eq!(layout.records[0].matrix_name.as_deref(), Some("MA"));
        assert_eq!(ids(&layout.records[1]), vec!["x"]);
        assert!(!layout.records[1].is_matrix);
    }

    #[test]
    fn consecutive_mode_splits_on_signature_change() {
        let group = group(vec![likert("a"), yes_no("x"), likert("b")]);
        let layout = compute_matrix_groups(&group, GroupingMode::Consecutive, "en");
        assert_eq!(layout.records.len(), 3);
        assert_eq!(layout.matrix_count(), 0);
    }

    #[test]
    fn global_mode_emits_ineligible_items_immediately() {
        let group = group(vec![
            likert("a"),
            likert("b"),
            likert("n").with_input_type("numerical"),
        ]);
        let layout = compute_matrix_groups(&group, GroupingMode::Global, "en");
        assert_eq!(ids(&layout.records[0]), vec!["n"]);
        assert_eq!(ids(&layout.records[1]), vec!["a", "b"]);
    }

    #[test]
    fn disabled_items_are_reported_separately() {
        let mut b = likert("b");
        b.enabled = false;
        let group = group(vec![likert("a"), b, likert("c")]);
        let layout = compute_matrix_groups(&group, GroupingMode::Consecutive, "en");
        assert_eq!(layout.records.len(), 1);
        assert_eq!(ids(&layout.records[0]), vec!["a", "c"]);
        assert_eq!(layout.disabled.len(), 1);
        assert_eq!(ids(&layout.disabled[0]), vec!["b"]);
    }

    #[test]
    fn items_without_levels_never_merge() {
        let group = group(vec![
            Item::new(ItemId::new("a").unwrap(), "A"),
            Item::new(ItemId::new("b").unwrap(), "B"),
        ]);
        for mode in [GroupingMode::Global, GroupingMode::Consecutive] {
            let layout = compute_matrix_groups(&group, mode, "en");
            assert_eq!(layout.matrix_count(), 0);
        }
    }

    #[test]
    fn template_flag_blocks_merging() {
        let mut group = group(vec![likert("a"), likert("b")]);
        group.no_matrix = true;
        let layout = compute_matrix_groups(&group, GroupingMode::Global, "en");
        assert_eq!(layout.matrix_count(), 0);
    }

    #[test]
    fn heading_prefers_group_instructions() {
        let mut group = group(vec![
            likert("a").with_description(MultilingualText::localized([
                ("en", "First"),
                ("de", "Erste"),
            ])),
            likert("b"),
        ]);
        let layout = compute_matrix_groups(&group, GroupingMode::Consecutive, "de");
        assert_eq!(layout.records[0].heading.as_deref(), Some("Erste"));

        group.instructions = Some(MultilingualText::localized([("en", "Rate each statement")]));
        let layout = compute_matrix_groups(&group, GroupingMode::Consecutive, "de");
        assert_eq!(layout.records[0].heading.as_deref(), Some("Rate each statement"));
    }
}
