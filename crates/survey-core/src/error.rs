//! Error types for editing, loading and exporting.

use survey_model::{GroupId, ItemId, ModelError};
use thiserror::Error;

/// A rejected structural edit. The document is unchanged when this is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("group name must not be empty")]
    EmptyName,
    #[error("cannot delete the last remaining group")]
    LastGroup,
    #[error("unknown group: {0}")]
    UnknownGroup(GroupId),
    #[error("unknown item: {0}")]
    UnknownItem(ItemId),
    #[error("item {item} is not in group {group}")]
    ItemNotInGroup { item: ItemId, group: GroupId },
    #[error("index {index} is out of range (maximum {max})")]
    IndexOutOfRange { index: usize, max: usize },
    #[error("no override editor is open")]
    NoActiveEditor,
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Template data could not be turned into a document.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no templates were selected")]
    NoTemplates,
    #[error("template {index} has no id")]
    MissingTemplateId { index: usize },
    #[error("template {template} contains an item without an id")]
    MissingItemId { template: String },
    #[error("template data is malformed: {source}")]
    Malformed {
        #[source]
        source: serde_json::Error,
    },
    #[error("template source failed: {message}")]
    Source { message: String },
}

impl LoadError {
    pub fn source_failed(message: impl Into<String>) -> Self {
        Self::Source {
            message: message.into(),
        }
    }
}

/// Export could not be started or did not complete.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("survey title must not be empty")]
    EmptyTitle,
    #[error("no document is loaded")]
    NoDocument,
    #[error("an export is already in progress")]
    InFlight,
    #[error("failed to serialize export payload: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },
    #[error("export transport failed: {message}")]
    Transport { message: String },
}

impl ExportError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Whether retrying the same export may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::InFlight)
    }
}
