mod common;

use common::{document, gid, group, iid, likert, numeric, record_ids, yes_no};
use survey_core::{EditError, SurveyEditor, TemplateSource, detect_type};
use survey_core::{LoadError, LoadResponse, StudioSession};
use survey_model::{
    ExportOptions, Item, ItemId, OverrideKey, OverrideValue, QuestionType,
};

const PHQ_SELECTION: &str = r#"{
    "templates": [
        {"id": "phq9", "name": "PHQ-9", "sourceFile": "phq9",
         "items": [{"id": "p1", "code": "P1", "levels": {"0": "No", "1": "Yes"}}]},
        {"id": "bdi", "name": "BDI", "sourceFile": "bdi",
         "items": [{"id": "b1", "code": "B1"}]},
        {"id": "phq9", "name": "PHQ-9", "sourceFile": "phq9",
         "items": [{"id": "p1", "code": "P1", "levels": {"0": "No", "1": "Yes"}}]}
    ],
    "languages": ["en"]
}"#;

struct StaticSource;

impl TemplateSource for StaticSource {
    fn load(&self, _selection: &[String]) -> Result<LoadResponse, LoadError> {
        LoadResponse::from_json_str(PHQ_SELECTION)
    }
}

fn names(editor: &SurveyEditor) -> Vec<&str> {
    editor
        .document()
        .groups
        .iter()
        .map(|group| group.name.as_str())
        .collect()
}

#[test]
fn global_mode_merges_three_identical_items() {
    let mut doc = document(vec![group("g", vec![likert("a"), likert("b"), likert("c")])]);
    doc.options = ExportOptions::new().with_matrix_global(true);
    let editor = SurveyEditor::new(doc);

    let layout = editor.layout(&gid("g")).unwrap();
    assert_eq!(layout.records.len(), 1);
    let record = &layout.records[0];
    assert!(record.is_matrix);
    assert_eq!(record.matrix_name.as_deref(), Some("MA"));
    assert_eq!(record_ids(record), vec!["a", "b", "c"]);
    assert_eq!(record.heading.as_deref(), Some("Question a"));
}

#[test]
fn consecutive_mode_splits_on_ineligible_item() {
    let doc = document(vec![group(
        "g",
        vec![likert("a"), likert("b"), numeric("n"), likert("c")],
    )]);
    let editor = SurveyEditor::new(doc);

    let layout = editor.layout(&gid("g")).unwrap();
    let records: Vec<Vec<&str>> = layout.records.iter().map(record_ids).collect();
    assert_eq!(records, vec![vec!["a", "b"], vec!["n"], vec!["c"]]);
    assert_eq!(layout.records[0].matrix_name.as_deref(), Some("MA"));
    assert!(!layout.records[2].is_matrix);
}

#[test]
fn global_mode_ignores_interruptions() {
    let mut doc = document(vec![group(
        "g",
        vec![likert("a"), yes_no("y"), numeric("n"), likert("b")],
    )]);
    doc.options = ExportOptions::new().with_matrix_global(true);
    let editor = SurveyEditor::new(doc);

    let layout = editor.layout(&gid("g")).unwrap();
    let records: Vec<Vec<&str>> = layout.records.iter().map(record_ids).collect();
    assert_eq!(records, vec![vec!["n"], vec!["a", "b"], vec!["y"]]);
}

#[test]
fn disabling_a_member_splits_the_matrix() {
    let doc = document(vec![group("g", vec![likert("a"), likert("b")])]);
    let mut editor = SurveyEditor::new(doc);
    assert_eq!(editor.layout(&gid("g")).unwrap().matrix_count(), 1);

    editor.set_item_enabled(&iid("b"), false).unwrap();
    let layout = editor.layout(&gid("g")).unwrap();
    assert_eq!(layout.matrix_count(), 0);
    assert_eq!(record_ids(&layout.records[0]), vec!["a"]);
    assert_eq!(record_ids(&layout.disabled[0]), vec!["b"]);
    assert_eq!(editor.last_rendered(), &[gid("g")]);
}

#[test]
fn runs_follow_group_order() {
    let mut session = StudioSession::new();
    session.load(&StaticSource, &[]).unwrap();
    let editor = session.editor_mut().unwrap();
    assert_eq!(names(editor), vec!["PHQ-9 (Run 1)", "BDI", "PHQ-9 (Run 2)"]);

    editor.move_group(&gid("phq9-2"), 0).unwrap();
    assert_eq!(names(editor), vec!["PHQ-9 (Run 1)", "PHQ-9 (Run 2)", "BDI"]);
    let first = &editor.document().groups[0];
    assert_eq!(first.id, gid("phq9-2"));
    assert_eq!(first.run_number, Some(1));
    assert_eq!(first.items[0].run_number, Some(1));
    assert_eq!(editor.document().groups[1].run_number, Some(2));
}

#[test]
fn deleting_a_run_clears_suffixes() {
    let mut session = StudioSession::new();
    session.load(&StaticSource, &[]).unwrap();
    let editor = session.editor_mut().unwrap();

    editor.delete_group(&gid("phq9-2")).unwrap();
    assert_eq!(names(editor), vec!["PHQ-9", "BDI"]);
    let bdi = &editor.document().groups[1];
    assert_eq!(bdi.items.len(), 2);
    assert_eq!(bdi.items[1].id, iid("p1-2"));
    assert_eq!(bdi.items[1].run_number, None);
    assert!(editor.document().groups.iter().all(|g| g.run_number.is_none()));
    assert!(editor.document().is_consistent());
}

#[test]
fn deleting_the_first_group_feeds_the_next_one() {
    let doc = document(vec![
        group("first", vec![likert("a")]),
        group("second", vec![likert("b")]),
    ]);
    let mut editor = SurveyEditor::new(doc);
    editor.delete_group(&gid("first")).unwrap();

    let groups = &editor.document().groups;
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].order, 0);
    let ids: Vec<&str> = groups[0].items.iter().map(|item| item.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a"]);
    assert_eq!(groups[0].items[1].display_order, 1);
}

#[test]
fn deleting_the_last_group_is_rejected() {
    let doc = document(vec![group("only", vec![likert("a")])]);
    let mut editor = SurveyEditor::new(doc);
    let before = editor.document().clone();

    assert_eq!(editor.delete_group(&gid("only")), Err(EditError::LastGroup));
    assert_eq!(editor.document(), &before);
}

#[test]
fn invalid_moves_change_nothing() {
    let doc = document(vec![
        group("g1", vec![likert("a"), likert("b")]),
        group("g2", vec![likert("c")]),
    ]);
    let mut editor = SurveyEditor::new(doc);
    let before = editor.document().clone();

    assert_eq!(
        editor.move_item(&iid("a"), &gid("g1"), &gid("g2"), 5),
        Err(EditError::IndexOutOfRange { index: 5, max: 1 })
    );
    assert_eq!(
        editor.move_item(&iid("a"), &gid("g1"), &gid("nope"), 0),
        Err(EditError::UnknownGroup(gid("nope")))
    );
    assert_eq!(
        editor.move_item(&iid("c"), &gid("g1"), &gid("g2"), 0),
        Err(EditError::ItemNotInGroup {
            item: iid("c"),
            group: gid("g1"),
        })
    );
    assert_eq!(
        editor.move_group(&gid("g1"), 2),
        Err(EditError::IndexOutOfRange { index: 2, max: 1 })
    );
    assert_eq!(editor.add_group("   "), Err(EditError::EmptyName));
    assert_eq!(editor.document(), &before);
}

#[test]
fn moving_an_item_regroups_both_sides() {
    let doc = document(vec![
        group("g1", vec![likert("a"), likert("b"), yes_no("y")]),
        group("g2", vec![likert("c")]),
    ]);
    let mut editor = SurveyEditor::new(doc);

    editor.move_item(&iid("b"), &gid("g1"), &gid("g2"), 1).unwrap();
    assert_eq!(editor.layout(&gid("g1")).unwrap().matrix_count(), 0);
    let g2 = editor.layout(&gid("g2")).unwrap();
    assert_eq!(g2.matrix_count(), 1);
    assert_eq!(g2.records[0].matrix_name.as_deref(), Some("MC"));
    assert_eq!(editor.last_rendered(), &[gid("g1"), gid("g2")]);
    assert!(editor.document().is_consistent());

    editor.move_item(&iid("y"), &gid("g1"), &gid("g1"), 0).unwrap();
    let order: Vec<&str> = editor.document().groups[0]
        .items
        .iter()
        .map(|item| item.id.as_str())
        .collect();
    assert_eq!(order, vec!["y", "a"]);
}

#[test]
fn override_type_wins_over_text_hint() {
    let mut item = Item::new(ItemId::new("q").unwrap(), "Q").with_input_type("text");
    assert_eq!(detect_type(&item), QuestionType::ShortText);
    item.overrides
        .set(OverrideKey::QuestionType, QuestionType::Numeric.into())
        .unwrap();
    assert_eq!(detect_type(&item), QuestionType::Numeric);
}

#[test]
fn falsy_overrides_are_removed() {
    let doc = document(vec![group("g", vec![numeric("n")])]);
    let mut editor = SurveyEditor::new(doc);

    editor
        .set_item_override(&iid("n"), OverrideKey::Suffix, "kg".into())
        .unwrap();
    editor
        .set_item_override(&iid("n"), OverrideKey::Hidden, true.into())
        .unwrap();
    assert_eq!(editor.document().item(&iid("n")).unwrap().overrides.len(), 2);

    editor
        .set_item_override(&iid("n"), OverrideKey::Suffix, "".into())
        .unwrap();
    editor
        .set_item_override(&iid("n"), OverrideKey::Hidden, false.into())
        .unwrap();
    assert!(editor.document().item(&iid("n")).unwrap().overrides.is_empty());
}

#[test]
fn inapplicable_override_is_rejected() {
    let doc = document(vec![group("g", vec![likert("a")])]);
    let mut editor = SurveyEditor::new(doc);

    let error = editor
        .set_item_override(&iid("a"), OverrideKey::SliderMax, OverrideValue::Integer(10))
        .unwrap_err();
    assert!(matches!(error, EditError::Model(_)));
    assert!(!editor.is_modified());
}

#[test]
fn opening_a_second_editor_commits_the_first() {
    let doc = document(vec![group("g", vec![numeric("n"), likert("a")])]);
    let mut editor = SurveyEditor::new(doc);

    assert_eq!(editor.open_override_editor(&iid("n")).unwrap(), None);
    editor
        .edit_override(OverrideKey::MaxNumValue, OverrideValue::Integer(120))
        .unwrap();
    assert!(editor.document().item(&iid("n")).unwrap().overrides.is_empty());

    assert_eq!(editor.open_override_editor(&iid("a")).unwrap(), Some(iid("n")));
    assert_eq!(
        editor
            .document()
            .item(&iid("n"))
            .unwrap()
            .overrides
            .get(OverrideKey::MaxNumValue),
        Some(&OverrideValue::Number(120.0))
    );
    assert_eq!(editor.override_editor().active(), Some(&iid("a")));

    editor
        .edit_override(OverrideKey::Help, "Choose one".into())
        .unwrap();
    editor.reset();
    assert!(!editor.override_editor().is_open());
    assert!(!editor.is_modified());
    assert_eq!(
        editor.commit_override_editor(),
        Err(EditError::NoActiveEditor)
    );
}

#[test]
fn reset_restores_the_loaded_snapshot() {
    let doc = document(vec![group("g1", vec![likert("a")]), group("g2", vec![])]);
    let mut editor = SurveyEditor::new(doc);

    editor.add_group("Extra").unwrap();
    editor.rename_group(&gid("g1"), "Renamed").unwrap();
    editor.move_item(&iid("a"), &gid("g1"), &gid("g2"), 0).unwrap();
    editor.set_item_mandatory(&iid("a"), true).unwrap();
    assert!(editor.is_modified());

    editor.reset();
    assert_eq!(editor.document(), editor.snapshot());
    assert_eq!(editor.layouts().len(), 2);
}
