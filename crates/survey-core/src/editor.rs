//! Structural mutation engine.
//!
//! [`SurveyEditor`] owns the working document. Every operation either
//! succeeds completely or returns an [`EditError`] without touching the
//! document. After each mutation the layouts of affected groups are
//! recomputed so the preview always reflects the current structure.

use std::collections::{BTreeSet, HashMap};

use serde_json::Value;
use survey_model::{
    Document, ExportOptions, Group, GroupId, GroupLayout, Item, ItemId, ItemOverrides,
    ModelError, OverrideKey, OverrideValue, SurveyMeta,
};
use tracing::{debug, info, warn};

use crate::detector::detect_type;
use crate::error::EditError;
use crate::grouping::compute_matrix_groups;
use crate::override_editor::OverrideEditor;
use crate::renumber::renumber_runs;

/// Editable questionnaire state plus its load-time snapshot.
#[derive(Debug, Clone)]
pub struct SurveyEditor {
    document: Document,
    snapshot: Document,
    layouts: HashMap<GroupId, GroupLayout>,
    /// Groups whose layout was recomputed by the last operation.
    rendered: Vec<GroupId>,
    override_editor: OverrideEditor,
    next_group: usize,
}

impl SurveyEditor {
    /// Take ownership of a freshly loaded document and snapshot it.
    pub fn new(mut document: Document) -> Self {
        document.densify_order();
        for group in &mut document.groups {
            group.densify_display_order();
        }
        renumber_runs(&mut document.groups);
        let next_group = document.groups.len() + 1;
        let mut editor = Self {
            snapshot: document.clone(),
            document,
            layouts: HashMap::new(),
            rendered: Vec::new(),
            override_editor: OverrideEditor::default(),
            next_group,
        };
        editor.render_all();
        editor
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The document as it was loaded.
    pub fn snapshot(&self) -> &Document {
        &self.snapshot
    }

    pub fn is_modified(&self) -> bool {
        self.document != self.snapshot
    }

    pub fn layout(&self, group_id: &GroupId) -> Option<&GroupLayout> {
        self.layouts.get(group_id)
    }

    /// Layouts of all groups in group order.
    pub fn layouts(&self) -> Vec<&GroupLayout> {
        self.document
            .groups
            .iter()
            .filter_map(|group| self.layouts.get(&group.id))
            .collect()
    }

    /// Groups re-rendered by the most recent operation.
    pub fn last_rendered(&self) -> &[GroupId] {
        &self.rendered
    }

    pub fn override_editor(&self) -> &OverrideEditor {
        &self.override_editor
    }

    /// Append a new empty group.
    pub fn add_group(&mut self, name: &str) -> Result<GroupId, EditError> {
        let name = name.trim();
        if name.is_empty() {
            return self.rejected(EditError::EmptyName);
        }
        let id = self.fresh_group_id();
        let mut group = Group::new(id.clone(), name);
        group.order = self.document.groups.len();
        self.document.groups.push(group);
        debug!(group = %id, name, "added group");
        self.render([self.document.groups.len() - 1]);
        Ok(id)
    }

    pub fn rename_group(&mut self, id: &GroupId, name: &str) -> Result<(), EditError> {
        let name = name.trim();
        if name.is_empty() {
            return self.rejected(EditError::EmptyName);
        }
        let Some(index) = self.document.group_index(id) else {
            return self.rejected(EditError::UnknownGroup(id.clone()));
        };
        self.document.groups[index].name = name.to_string();
        let mut affected = self.renumber();
        affected.insert(index);
        debug!(group = %id, name, "renamed group");
        self.render(affected);
        Ok(())
    }

    /// Delete a group, moving its items into the preceding group (or the
    /// following one when the first group is deleted).
    pub fn delete_group(&mut self, id: &GroupId) -> Result<(), EditError> {
        let Some(index) = self.document.group_index(id) else {
            return self.rejected(EditError::UnknownGroup(id.clone()));
        };
        if self.document.groups.len() == 1 {
            return self.rejected(EditError::LastGroup);
        }

        let removed = self.document.groups.remove(index);
        let receiver = index.saturating_sub(1);
        let target = &mut self.document.groups[receiver];
        let moved = removed.items.len();
        for mut item in removed.items {
            item.run_number = target.run_number;
            target.items.push(item);
        }
        target.densify_display_order();
        let receiver_id = target.id.clone();

        self.document.densify_order();
        self.layouts.remove(id);
        let mut affected = self.renumber();
        affected.insert(receiver);
        debug!(group = %id, receiver = %receiver_id, moved, "deleted group");
        self.render(affected);
        Ok(())
    }

    /// Move a group to `new_index` in the group order.
    pub fn move_group(&mut self, id: &GroupId, new_index: usize) -> Result<(), EditError> {
        let Some(index) = self.document.group_index(id) else {
            return self.rejected(EditError::UnknownGroup(id.clone()));
        };
        let max = self.document.groups.len() - 1;
        if new_index > max {
            return self.rejected(EditError::IndexOutOfRange {
                index: new_index,
                max,
            });
        }
        if new_index == index {
            self.rendered.clear();
            return Ok(());
        }
        let group = self.document.groups.remove(index);
        self.document.groups.insert(new_index, group);
        self.document.densify_order();
        self.renumber();
        debug!(group = %id, from = index, to = new_index, "moved group");
        // Run suffixes may have changed on any group.
        self.render_all();
        Ok(())
    }

    /// Move an item to position `new_index` of group `to`.
    pub fn move_item(
        &mut self,
        id: &ItemId,
        from: &GroupId,
        to: &GroupId,
        new_index: usize,
    ) -> Result<(), EditError> {
        let Some(from_index) = self.document.group_index(from) else {
            return self.rejected(EditError::UnknownGroup(from.clone()));
        };
        let Some(to_index) = self.document.group_index(to) else {
            return self.rejected(EditError::UnknownGroup(to.clone()));
        };
        let Some(item_index) = self.document.groups[from_index].item_position(id) else {
            let error = if self.document.item(id).is_some() {
                EditError::ItemNotInGroup {
                    item: id.clone(),
                    group: from.clone(),
                }
            } else {
                EditError::UnknownItem(id.clone())
            };
            return self.rejected(error);
        };
        let max = if from_index == to_index {
            self.document.groups[to_index].items.len() - 1
        } else {
            self.document.groups[to_index].items.len()
        };
        if new_index > max {
            return self.rejected(EditError::IndexOutOfRange {
                index: new_index,
                max,
            });
        }

        let mut item = self.document.groups[from_index].items.remove(item_index);
        if from_index != to_index {
            item.run_number = self.document.groups[to_index].run_number;
        }
        let destination = &mut self.document.groups[to_index];
        destination.items.insert(new_index, item);
        destination.densify_display_order();
        self.document.groups[from_index].densify_display_order();
        debug!(item = %id, from = %from, to = %to, index = new_index, "moved item");
        self.render([from_index, to_index]);
        Ok(())
    }

    pub fn set_item_enabled(&mut self, id: &ItemId, enabled: bool) -> Result<(), EditError> {
        let Some((group_index, item_index)) = self.document.locate_item(id) else {
            return self.rejected(EditError::UnknownItem(id.clone()));
        };
        let item = &mut self.document.groups[group_index].items[item_index];
        if item.enabled == enabled {
            self.rendered.clear();
            return Ok(());
        }
        item.enabled = enabled;
        debug!(item = %id, enabled, "toggled item");
        // Disabling a member can split a matrix.
        self.render([group_index]);
        Ok(())
    }

    pub fn set_item_mandatory(&mut self, id: &ItemId, mandatory: bool) -> Result<(), EditError> {
        let Some(item) = self.document.item_mut(id) else {
            return self.rejected(EditError::UnknownItem(id.clone()));
        };
        item.mandatory = mandatory;
        debug!(item = %id, mandatory, "set mandatory");
        self.rendered.clear();
        Ok(())
    }

    /// Merge an override into the item. Falsy values remove the field.
    pub fn set_item_override(
        &mut self,
        id: &ItemId,
        key: OverrideKey,
        value: OverrideValue,
    ) -> Result<(), EditError> {
        let Some((group_index, item_index)) = self.document.locate_item(id) else {
            return self.rejected(EditError::UnknownItem(id.clone()));
        };
        let in_matrix = self.in_matrix(group_index, id);
        let item = &self.document.groups[group_index].items[item_index];
        if let Err(error) = check_applicable(&item.overrides, item, key, &value, in_matrix) {
            return self.rejected(error);
        }
        let mut updated = item.overrides.clone();
        let changed = match updated.set(key, value.clone()) {
            Ok(changed) => changed,
            Err(error) => return self.rejected(error.into()),
        };
        // Keep an open draft for this item in step with it.
        let draft = if self.override_editor.active() == Some(id) {
            let mut draft = self.override_editor.draft().clone();
            if let Err(error) = draft.set(key, value) {
                return self.rejected(error.into());
            }
            Some(draft)
        } else {
            None
        };
        self.document.groups[group_index].items[item_index].overrides = updated;
        if let Some(draft) = draft {
            *self.override_editor.draft_mut() = draft;
        }
        debug!(item = %id, key = %key, changed, "set override");
        if changed {
            self.render([group_index]);
        } else {
            self.rendered.clear();
        }
        Ok(())
    }

    pub fn clear_item_override(&mut self, id: &ItemId, key: OverrideKey) -> Result<(), EditError> {
        let Some((group_index, item_index)) = self.document.locate_item(id) else {
            return self.rejected(EditError::UnknownItem(id.clone()));
        };
        let removed = self.document.groups[group_index].items[item_index]
            .overrides
            .remove(key)
            .is_some();
        if self.override_editor.active() == Some(id) {
            self.override_editor.draft_mut().remove(key);
        }
        debug!(item = %id, key = %key, removed, "cleared override");
        if removed {
            self.render([group_index]);
        } else {
            self.rendered.clear();
        }
        Ok(())
    }

    /// Restore the load-time snapshot and drop any open override draft.
    pub fn reset(&mut self) {
        self.document = self.snapshot.clone();
        self.override_editor.discard();
        self.next_group = self.document.groups.len() + 1;
        self.layouts.clear();
        info!("reset document to loaded snapshot");
        self.render_all();
    }

    pub fn set_survey_meta(&mut self, survey: SurveyMeta) {
        let relayout = survey.base_language != self.document.survey.base_language;
        self.document.survey = survey;
        if relayout {
            self.render_all();
        } else {
            self.rendered.clear();
        }
    }

    pub fn set_export_options(&mut self, options: ExportOptions) {
        let relayout = options.grouping_mode() != self.document.options.grouping_mode();
        self.document.options = options;
        if relayout {
            self.render_all();
        } else {
            self.rendered.clear();
        }
    }

    /// Set a survey-level tool setting; `null` removes it.
    pub fn set_tool_setting(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if value.is_null() {
            self.document.tool_settings.remove(&key);
        } else {
            self.document.tool_settings.insert(key, value);
        }
        self.rendered.clear();
    }

    /// Open the override editor for `id`.
    ///
    /// If another item's editor is open, its draft is committed first and
    /// that item's id is returned.
    pub fn open_override_editor(&mut self, id: &ItemId) -> Result<Option<ItemId>, EditError> {
        let Some(item) = self.document.item(id) else {
            return self.rejected(EditError::UnknownItem(id.clone()));
        };
        if self.override_editor.active() == Some(id) {
            return Ok(None);
        }
        let overrides = item.overrides.clone();
        let committed = if self.override_editor.is_open() {
            Some(self.commit_override_editor()?)
        } else {
            None
        };
        self.override_editor.open(id.clone(), overrides);
        debug!(item = %id, committed = ?committed, "opened override editor");
        Ok(committed)
    }

    /// Change a field in the open draft.
    pub fn edit_override(
        &mut self,
        key: OverrideKey,
        value: OverrideValue,
    ) -> Result<(), EditError> {
        let Some(active) = self.override_editor.active().cloned() else {
            return self.rejected(EditError::NoActiveEditor);
        };
        let Some((group_index, item_index)) = self.document.locate_item(&active) else {
            return self.rejected(EditError::UnknownItem(active));
        };
        let in_matrix = self.in_matrix(group_index, &active);
        let item = &self.document.groups[group_index].items[item_index];
        let draft = self.override_editor.draft();
        if let Err(error) = check_applicable(draft, item, key, &value, in_matrix) {
            return self.rejected(error);
        }
        if let Err(error) = self.override_editor.draft_mut().set(key, value) {
            return self.rejected(error.into());
        }
        Ok(())
    }

    /// Write the draft into its item and close the editor.
    pub fn commit_override_editor(&mut self) -> Result<ItemId, EditError> {
        let Some((id, draft)) = self.override_editor.take() else {
            return self.rejected(EditError::NoActiveEditor);
        };
        let Some((group_index, item_index)) = self.document.locate_item(&id) else {
            return self.rejected(EditError::UnknownItem(id));
        };
        self.document.groups[group_index].items[item_index].overrides = draft;
        debug!(item = %id, "committed override editor");
        self.render([group_index]);
        Ok(id)
    }

    /// Close the editor without saving the draft.
    pub fn cancel_override_editor(&mut self) {
        self.override_editor.discard();
    }

    /// Whether the item currently renders as a row of a matrix.
    fn in_matrix(&self, group_index: usize, id: &ItemId) -> bool {
        self.document
            .groups
            .get(group_index)
            .and_then(|group| self.layouts.get(&group.id))
            .and_then(|layout| layout.record_for(id))
            .is_some_and(|record| record.is_matrix)
    }

    /// Log a rejected edit. Nothing was re-rendered, so the previous
    /// operation's render list is cleared.
    fn rejected<T>(&mut self, error: EditError) -> Result<T, EditError> {
        warn!(%error, "edit rejected");
        self.rendered.clear();
        Err(error)
    }

    fn fresh_group_id(&mut self) -> GroupId {
        loop {
            let candidate = format!("group-{}", self.next_group);
            self.next_group += 1;
            let Ok(id) = GroupId::new(candidate) else {
                continue;
            };
            if self.document.group(&id).is_none() {
                return id;
            }
        }
    }

    fn renumber(&mut self) -> BTreeSet<usize> {
        renumber_runs(&mut self.document.groups).into_iter().collect()
    }

    fn render(&mut self, group_indices: impl IntoIterator<Item = usize>) {
        let mode = self.document.options.grouping_mode();
        let language = self.document.survey.base_language.clone();
        let indices: BTreeSet<usize> = group_indices.into_iter().collect();
        self.rendered.clear();
        for index in indices {
            let Some(group) = self.document.groups.get(index) else {
                continue;
            };
            let layout = compute_matrix_groups(group, mode, &language);
            self.rendered.push(group.id.clone());
            self.layouts.insert(group.id.clone(), layout);
        }
    }

    fn render_all(&mut self) {
        self.render(0..self.document.groups.len());
    }
}

/// Reject fields that do not apply to the item's current question type.
///
/// `overrides` is the override set the value would be merged into, which
/// differs from the item's own set while a draft is open. Matrix rows also
/// take the array fields.
fn check_applicable(
    overrides: &ItemOverrides,
    item: &Item,
    key: OverrideKey,
    value: &OverrideValue,
    in_matrix: bool,
) -> Result<(), EditError> {
    if key == OverrideKey::QuestionType || value.is_falsy() {
        return Ok(());
    }
    let question_type = match overrides.question_type() {
        Some(question_type) => question_type,
        None => {
            let mut detected = item.clone();
            detected.overrides = ItemOverrides::default();
            detect_type(&detected)
        }
    };
    if key.applies_to_item(question_type, in_matrix) {
        Ok(())
    } else {
        Err(ModelError::OverrideNotApplicable { key, question_type }.into())
    }
}
