//! The editable questionnaire document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{GroupId, ItemId};
use crate::levels::Levels;
use crate::options::{ExportOptions, SurveyMeta};
use crate::overrides::ItemOverrides;
use crate::text::MultilingualText;

fn default_true() -> bool {
    true
}

/// A single question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub code: String,
    #[serde(default)]
    pub description: MultilingualText,
    #[serde(default)]
    pub levels: Levels,
    /// Input hint from the template (`text`, `numerical`, `dropdown`, ...).
    #[serde(default)]
    pub input_type: Option<String>,
    /// Question type requested by the template's tool-specific section.
    #[serde(default)]
    pub tool_type: Option<String>,
    #[serde(default)]
    pub multiline: bool,
    /// The item offers an "other" free-text option.
    #[serde(default)]
    pub has_other: bool,
    /// The item is computed from other answers.
    #[serde(default)]
    pub calculation: bool,
    #[serde(default)]
    pub overrides: ItemOverrides,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default)]
    pub display_order: usize,
    #[serde(default)]
    pub run_number: Option<u32>,
    #[serde(default)]
    pub source_file: Option<String>,
    /// Languages detected in this item's text.
    #[serde(default)]
    pub languages: Vec<String>,
}

impl Item {
    pub fn new(id: ItemId, code: impl Into<String>) -> Self {
        Self {
            id,
            code: code.into(),
            description: MultilingualText::default(),
            levels: Levels::default(),
            input_type: None,
            tool_type: None,
            multiline: false,
            has_other: false,
            calculation: false,
            overrides: ItemOverrides::default(),
            enabled: true,
            mandatory: false,
            display_order: 0,
            run_number: None,
            source_file: None,
            languages: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<MultilingualText>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_levels(mut self, levels: Levels) -> Self {
        self.levels = levels;
        self
    }

    pub fn with_input_type(mut self, input_type: impl Into<String>) -> Self {
        self.input_type = Some(input_type.into());
        self
    }

    pub fn with_source_file(mut self, source_file: impl Into<String>) -> Self {
        self.source_file = Some(source_file.into());
        self
    }

    /// Canonical level signature; `None` means the item can never be merged.
    pub fn level_signature(&self) -> Option<String> {
        self.levels.signature()
    }

    /// Input hint, trimmed and lowercased.
    pub fn input_hint(&self) -> Option<String> {
        self.input_type
            .as_deref()
            .map(|hint| hint.trim().to_ascii_lowercase())
            .filter(|hint| !hint.is_empty())
    }
}

/// A question group, usually one per loaded template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    #[serde(default)]
    pub order: usize,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub run_number: Option<u32>,
    #[serde(default)]
    pub source_file: Option<String>,
    /// Default heading for matrix questions built from this group.
    #[serde(default)]
    pub instructions: Option<MultilingualText>,
    /// The template forbids merging its items into matrices.
    #[serde(default)]
    pub no_matrix: bool,
}

impl Group {
    pub fn new(id: GroupId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            order: 0,
            items: Vec::new(),
            run_number: None,
            source_file: None,
            instructions: None,
            no_matrix: false,
        }
    }

    pub fn with_items(mut self, items: Vec<Item>) -> Self {
        self.items = items;
        self.densify_display_order();
        self
    }

    pub fn with_source_file(mut self, source_file: impl Into<String>) -> Self {
        self.source_file = Some(source_file.into());
        self
    }

    pub fn item(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn item_mut(&mut self, id: &ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| &item.id == id)
    }

    pub fn item_position(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }

    /// Rewrite `display_order` as 0..n following the current item order.
    pub fn densify_display_order(&mut self) {
        for (index, item) in self.items.iter_mut().enumerate() {
            item.display_order = index;
        }
    }
}

/// The whole editable state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub groups: Vec<Group>,
    #[serde(default)]
    pub survey: SurveyMeta,
    #[serde(default)]
    pub options: ExportOptions,
    /// Free-form survey-level settings for the target tool.
    #[serde(default)]
    pub tool_settings: BTreeMap<String, Value>,
}

impl Document {
    pub fn new(groups: Vec<Group>) -> Self {
        let mut document = Self {
            groups,
            ..Self::default()
        };
        document.densify_order();
        for group in &mut document.groups {
            group.densify_display_order();
        }
        document
    }

    pub fn group(&self, id: &GroupId) -> Option<&Group> {
        self.groups.iter().find(|group| &group.id == id)
    }

    pub fn group_mut(&mut self, id: &GroupId) -> Option<&mut Group> {
        self.groups.iter_mut().find(|group| &group.id == id)
    }

    pub fn group_index(&self, id: &GroupId) -> Option<usize> {
        self.groups.iter().position(|group| &group.id == id)
    }

    /// Position of an item as (group index, item index).
    pub fn locate_item(&self, id: &ItemId) -> Option<(usize, usize)> {
        self.groups.iter().enumerate().find_map(|(group_index, group)| {
            group
                .item_position(id)
                .map(|item_index| (group_index, item_index))
        })
    }

    pub fn item(&self, id: &ItemId) -> Option<&Item> {
        self.locate_item(id)
            .map(|(group_index, item_index)| &self.groups[group_index].items[item_index])
    }

    pub fn item_mut(&mut self, id: &ItemId) -> Option<&mut Item> {
        let (group_index, item_index) = self.locate_item(id)?;
        Some(&mut self.groups[group_index].items[item_index])
    }

    /// Owning group of an item.
    pub fn group_of(&self, id: &ItemId) -> Option<&Group> {
        self.locate_item(id)
            .map(|(group_index, _)| &self.groups[group_index])
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.groups.iter().flat_map(|group| group.items.iter())
    }

    pub fn item_count(&self) -> usize {
        self.groups.iter().map(|group| group.items.len()).sum()
    }

    /// Rewrite `order` as 0..n following the current group order.
    pub fn densify_order(&mut self) {
        for (index, group) in self.groups.iter_mut().enumerate() {
            group.order = index;
        }
    }

    /// True when orders and display orders are dense and items are unique.
    pub fn is_consistent(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        self.groups.iter().enumerate().all(|(index, group)| {
            group.order == index
                && group
                    .items
                    .iter()
                    .enumerate()
                    .all(|(position, item)| item.display_order == position && seen.insert(&item.id))
        })
    }
}
