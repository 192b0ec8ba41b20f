//! Derived matrix layout of a group.
//!
//! Layouts are a view over the document and are never persisted or exported.

use serde::{Deserialize, Serialize};

use crate::ids::{GroupId, ItemId};

/// One rendered question: either a standalone item or a matrix of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixGroupRecord {
    pub is_matrix: bool,
    /// `"M"` followed by the code of the first item; only for matrices.
    pub matrix_name: Option<String>,
    pub item_ids: Vec<ItemId>,
    /// Level signature the items were grouped on; `None` for standalone records.
    pub signature: Option<String>,
    /// Default heading text; only for matrices.
    pub heading: Option<String>,
}

impl MatrixGroupRecord {
    pub fn standalone(item_id: ItemId) -> Self {
        Self {
            is_matrix: false,
            matrix_name: None,
            item_ids: vec![item_id],
            signature: None,
            heading: None,
        }
    }

    pub fn matrix(name: String, item_ids: Vec<ItemId>, signature: String, heading: String) -> Self {
        Self {
            is_matrix: true,
            matrix_name: Some(name),
            item_ids,
            signature: Some(signature),
            heading: Some(heading),
        }
    }

    pub fn contains(&self, item_id: &ItemId) -> bool {
        self.item_ids.contains(item_id)
    }
}

/// Matrix records for one group plus its disabled items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupLayout {
    pub group_id: GroupId,
    /// Records covering exactly the enabled items, in display order.
    pub records: Vec<MatrixGroupRecord>,
    /// Disabled items as standalone records so they stay toggleable.
    pub disabled: Vec<MatrixGroupRecord>,
}

impl GroupLayout {
    pub fn matrix_count(&self) -> usize {
        self.records.iter().filter(|record| record.is_matrix).count()
    }

    pub fn record_for(&self, item_id: &ItemId) -> Option<&MatrixGroupRecord> {
        self.records
            .iter()
            .chain(self.disabled.iter())
            .find(|record| record.contains(item_id))
    }

    /// Enabled item ids in record order.
    pub fn enabled_item_ids(&self) -> Vec<&ItemId> {
        self.records
            .iter()
            .flat_map(|record| record.item_ids.iter())
            .collect()
    }
}
