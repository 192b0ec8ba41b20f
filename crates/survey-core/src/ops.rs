//! Serializable edit operations.
//!
//! An edit script is a JSON array of [`EditOp`] values replayed against a
//! [`SurveyEditor`], e.g. `{"op": "move_group", "group": "phq9", "index": 0}`.

use serde::{Deserialize, Serialize};
use survey_model::{GroupId, ItemId, OverrideKey, OverrideValue};

use crate::editor::SurveyEditor;
use crate::error::EditError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOp {
    AddGroup {
        name: String,
    },
    RenameGroup {
        group: GroupId,
        name: String,
    },
    DeleteGroup {
        group: GroupId,
    },
    MoveGroup {
        group: GroupId,
        index: usize,
    },
    MoveItem {
        item: ItemId,
        from: GroupId,
        to: GroupId,
        index: usize,
    },
    SetEnabled {
        item: ItemId,
        enabled: bool,
    },
    SetMandatory {
        item: ItemId,
        mandatory: bool,
    },
    SetOverride {
        item: ItemId,
        key: OverrideKey,
        value: OverrideValue,
    },
    ClearOverride {
        item: ItemId,
        key: OverrideKey,
    },
    Reset,
}

impl EditOp {
    pub fn name(&self) -> &'static str {
        match self {
            EditOp::AddGroup { .. } => "add_group",
            EditOp::RenameGroup { .. } => "rename_group",
            EditOp::DeleteGroup { .. } => "delete_group",
            EditOp::MoveGroup { .. } => "move_group",
            EditOp::MoveItem { .. } => "move_item",
            EditOp::SetEnabled { .. } => "set_enabled",
            EditOp::SetMandatory { .. } => "set_mandatory",
            EditOp::SetOverride { .. } => "set_override",
            EditOp::ClearOverride { .. } => "clear_override",
            EditOp::Reset => "reset",
        }
    }
}

impl SurveyEditor {
    /// Apply a single operation.
    pub fn apply(&mut self, op: &EditOp) -> Result<(), EditError> {
        match op {
            EditOp::AddGroup { name } => self.add_group(name).map(|_| ()),
            EditOp::RenameGroup { group, name } => self.rename_group(group, name),
            EditOp::DeleteGroup { group } => self.delete_group(group),
            EditOp::MoveGroup { group, index } => self.move_group(group, *index),
            EditOp::MoveItem {
                item,
                from,
                to,
                index,
            } => self.move_item(item, from, to, *index),
            EditOp::SetEnabled { item, enabled } => self.set_item_enabled(item, *enabled),
            EditOp::SetMandatory { item, mandatory } => self.set_item_mandatory(item, *mandatory),
            EditOp::SetOverride { item, key, value } => {
                self.set_item_override(item, *key, value.clone())
            }
            EditOp::ClearOverride { item, key } => self.clear_item_override(item, *key),
            EditOp::Reset => {
                self.reset();
                Ok(())
            }
        }
    }

    /// Apply operations in order, stopping at the first rejection.
    ///
    /// Operations before the failing one stay applied; the failing one
    /// changes nothing. Returns the index of the failing operation.
    pub fn apply_all(&mut self, ops: &[EditOp]) -> Result<(), (usize, EditError)> {
        for (index, op) in ops.iter().enumerate() {
            self.apply(op).map_err(|error| (index, error))?;
        }
        Ok(())
    }
}
