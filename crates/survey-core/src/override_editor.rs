//! The single open tool-override editor.

use survey_model::{ItemId, ItemOverrides};

/// Draft state of the override editor.
///
/// At most one item is edited at a time. Opening another item commits the
/// current draft first; see [`crate::SurveyEditor::open_override_editor`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideEditor {
    active: Option<ItemId>,
    draft: ItemOverrides,
}

impl OverrideEditor {
    pub fn active(&self) -> Option<&ItemId> {
        self.active.as_ref()
    }

    pub fn draft(&self) -> &ItemOverrides {
        &self.draft
    }

    pub(crate) fn draft_mut(&mut self) -> &mut ItemOverrides {
        &mut self.draft
    }

    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    pub(crate) fn open(&mut self, item_id: ItemId, overrides: ItemOverrides) {
        self.active = Some(item_id);
        self.draft = overrides;
    }

    /// Close the editor, handing back the item and its draft.
    pub(crate) fn take(&mut self) -> Option<(ItemId, ItemOverrides)> {
        let item_id = self.active.take()?;
        Some((item_id, std::mem::take(&mut self.draft)))
    }

    pub(crate) fn discard(&mut self) {
        self.active = None;
        self.draft = ItemOverrides::default();
    }
}
