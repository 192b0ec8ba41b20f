use proptest::prelude::*;
use survey_core::{SurveyEditor, compute_matrix_groups, renumber_runs};
use survey_model::{Group, GroupId, GroupingMode, Item, ItemId, Levels};

/// Item kinds: 0 and 1 are two level sets, 2 is numeric, 3 has no levels.
fn item(index: usize, kind: u8, enabled: bool) -> Item {
    let id = format!("i{index}");
    let mut item = Item::new(ItemId::new(&id).unwrap(), id.to_uppercase());
    item = match kind {
        0 => item.with_levels(Levels::from_pairs([("1", "Low"), ("2", "High")])),
        1 => item.with_levels(Levels::from_pairs([("0", "No"), ("1", "Yes")])),
        2 => item.with_input_type("numerical"),
        _ => item,
    };
    item.enabled = enabled;
    item
}

fn arb_items() -> impl Strategy<Value = Vec<Item>> {
    prop::collection::vec((0u8..4, prop::bool::weighted(0.8)), 0..12).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(index, (kind, enabled))| item(index, kind, enabled))
            .collect()
    })
}

fn arb_groups() -> impl Strategy<Value = Vec<Group>> {
    prop::collection::vec((prop::option::of(0u8..3), 0usize..3), 1..8).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(index, (source, items))| {
                let mut group = Group::new(GroupId::new(format!("g{index}")).unwrap(), "Scale")
                    .with_items((0..items).map(|n| item(index * 10 + n, 0, true)).collect());
                group.order = index;
                group.source_file = source.map(|source| format!("scale{source}.json"));
                group
            })
            .collect()
    })
}

#[derive(Debug, Clone)]
enum Edit {
    MoveGroup(usize, usize),
    DeleteGroup(usize),
    AddGroup,
    MoveItem(usize, usize, usize),
    Toggle(usize),
}

fn arb_edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (0usize..8, 0usize..8).prop_map(|(group, index)| Edit::MoveGroup(group, index)),
        (0usize..8).prop_map(Edit::DeleteGroup),
        Just(Edit::AddGroup),
        (0usize..30, 0usize..8, 0usize..4)
            .prop_map(|(item, group, index)| Edit::MoveItem(item, group, index)),
        (0usize..30).prop_map(Edit::Toggle),
    ]
}

fn apply(editor: &mut SurveyEditor, edit: &Edit) {
    let document = editor.document();
    let group_count = document.groups.len();
    let items: Vec<ItemId> = document.items().map(|item| item.id.clone()).collect();
    // Rejections are fine here; only the invariants after each step matter.
    match *edit {
        Edit::MoveGroup(group, index) => {
            let id = document.groups[group % group_count].id.clone();
            let _ = editor.move_group(&id, index);
        }
        Edit::DeleteGroup(group) => {
            let id = document.groups[group % group_count].id.clone();
            let _ = editor.delete_group(&id);
        }
        Edit::AddGroup => {
            let _ = editor.add_group("Added");
        }
        Edit::MoveItem(item, group, index) => {
            if items.is_empty() {
                return;
            }
            let id = items[item % items.len()].clone();
            let from = document.group_of(&id).map(|group| group.id.clone());
            let to = document.groups[group % group_count].id.clone();
            if let Some(from) = from {
                let _ = editor.move_item(&id, &from, &to, index);
            }
        }
        Edit::Toggle(item) => {
            if items.is_empty() {
                return;
            }
            let id = items[item % items.len()].clone();
            let enabled = editor.document().item(&id).is_some_and(|item| item.enabled);
            let _ = editor.set_item_enabled(&id, !enabled);
        }
    }
}

proptest! {
    #[test]
    fn off_mode_covers_every_enabled_item(items in arb_items()) {
        let group = Group::new(GroupId::new("g").unwrap(), "G").with_items(items);
        let layout = compute_matrix_groups(&group, GroupingMode::Off, "en");
        let expected: Vec<&ItemId> = group
            .items
            .iter()
            .filter(|item| item.enabled)
            .map(|item| &item.id)
            .collect();
        prop_assert_eq!(layout.enabled_item_ids(), expected);
        prop_assert!(layout.records.iter().all(|record| !record.is_matrix));
    }

    #[test]
    fn grouping_partitions_enabled_items(items in arb_items(), global in any::<bool>()) {
        let group = Group::new(GroupId::new("g").unwrap(), "G").with_items(items);
        let mode = if global { GroupingMode::Global } else { GroupingMode::Consecutive };
        let layout = compute_matrix_groups(&group, mode, "en");

        let mut covered: Vec<&str> =
            layout.enabled_item_ids().into_iter().map(ItemId::as_str).collect();
        covered.sort_unstable();
        let mut expected: Vec<&str> = group
            .items
            .iter()
            .filter(|item| item.enabled)
            .map(|item| item.id.as_str())
            .collect();
        expected.sort_unstable();
        prop_assert_eq!(covered, expected);

        for record in &layout.records {
            if record.is_matrix {
                prop_assert!(record.item_ids.len() >= 2);
                let first = group.item(&record.item_ids[0]).unwrap();
                prop_assert_eq!(record.matrix_name.clone(), Some(format!("M{}", first.code)));
            } else {
                prop_assert_eq!(record.item_ids.len(), 1);
            }
        }
    }

    #[test]
    fn renumbering_is_idempotent(mut groups in arb_groups()) {
        renumber_runs(&mut groups);
        let once = groups.clone();
        let changed = renumber_runs(&mut groups);
        prop_assert!(changed.is_empty());
        prop_assert_eq!(groups, once);
    }

    #[test]
    fn edits_keep_the_document_dense(
        groups in arb_groups(),
        edits in prop::collection::vec(arb_edit(), 0..20),
    ) {
        let mut editor = SurveyEditor::new(survey_model::Document::new(groups));
        let item_count = editor.document().item_count();
        for edit in &edits {
            apply(&mut editor, edit);
            prop_assert!(editor.document().is_consistent());
            prop_assert_eq!(editor.document().item_count(), item_count);
            prop_assert!(!editor.document().groups.is_empty());
            prop_assert_eq!(editor.layouts().len(), editor.document().groups.len());
        }
    }
}
