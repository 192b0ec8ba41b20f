//! Boundary to the template-loading service.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use survey_model::{
    Document, FALLBACK_LANGUAGE, Group, GroupId, Item, ItemId, MultilingualText, SurveyMeta,
};
use tracing::{debug, info};

use crate::error::LoadError;
use crate::renumber::renumber_runs;

/// One parsed template file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub instructions: Option<MultilingualText>,
    #[serde(default)]
    pub source_file: Option<String>,
    /// The template forbids merging its items into matrices.
    #[serde(default)]
    pub no_matrix: bool,
}

/// Response of the template-loading service for a selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadResponse {
    pub templates: Vec<TemplateRecord>,
    /// Languages detected across the whole selection.
    #[serde(default)]
    pub languages: Vec<String>,
}

impl LoadResponse {
    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        serde_json::from_str(json).map_err(|source| LoadError::Malformed { source })
    }
}

/// Supplier of parsed templates.
pub trait TemplateSource {
    /// Load the templates named in `selection`.
    fn load(&self, selection: &[String]) -> Result<LoadResponse, LoadError>;
}

/// Build the initial document from a load response.
///
/// Group ids come from template ids and item ids are kept; when the same
/// template is selected more than once the repeated ids get a numeric
/// suffix. Items inherit the template's source file, and groups sharing a
/// source file are numbered as runs.
pub fn document_from_response(response: LoadResponse) -> Result<Document, LoadError> {
    if response.templates.is_empty() {
        return Err(LoadError::NoTemplates);
    }

    let mut group_ids = HashSet::new();
    let mut item_ids = HashSet::new();
    let mut groups = Vec::with_capacity(response.templates.len());
    for (index, template) in response.templates.into_iter().enumerate() {
        let base_id = template.id.trim().to_string();
        if base_id.is_empty() {
            return Err(LoadError::MissingTemplateId { index });
        }
        let group_id = GroupId::new(unique_id(&base_id, &mut group_ids))
            .map_err(|_| LoadError::MissingTemplateId { index })?;
        let name = if template.name.trim().is_empty() {
            base_id.clone()
        } else {
            template.name.trim().to_string()
        };

        let mut items = Vec::with_capacity(template.items.len());
        for mut item in template.items {
            let item_id = ItemId::new(unique_id(item.id.as_str(), &mut item_ids))
                .map_err(|_| LoadError::MissingItemId {
                    template: base_id.clone(),
                })?;
            item.id = item_id;
            if item.source_file.is_none() {
                item.source_file = template.source_file.clone();
            }
            items.push(item);
        }

        let mut group = Group::new(group_id, name).with_items(items);
        group.order = index;
        group.source_file = template.source_file;
        group.instructions = template.instructions;
        group.no_matrix = template.no_matrix;
        debug!(group = %group.id, items = group.items.len(), "loaded template");
        groups.push(group);
    }

    let mut document = Document::new(groups);
    renumber_runs(&mut document.groups);
    document.survey = survey_meta_for(&response.languages);
    info!(
        groups = document.groups.len(),
        items = document.item_count(),
        languages = ?document.survey.languages,
        "built document from templates"
    );
    Ok(document)
}

/// Survey metadata defaults for the detected languages. English is the
/// preview language when present, else the first detected language.
fn survey_meta_for(languages: &[String]) -> SurveyMeta {
    if languages.is_empty() {
        return SurveyMeta::default();
    }
    let base = if languages.iter().any(|lang| lang == FALLBACK_LANGUAGE) {
        FALLBACK_LANGUAGE.to_string()
    } else {
        languages[0].clone()
    };
    SurveyMeta::default()
        .with_languages(languages.iter().cloned())
        .with_base_language(base)
}

fn unique_id(base: &str, taken: &mut HashSet<String>) -> String {
    let base = base.trim();
    if taken.insert(base.to_string()) {
        return base.to_string();
    }
    let mut counter = 2;
    loop {
        let candidate = format!("{base}-{counter}");
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}

/// Whether a document is available to edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Nothing loaded yet, or the last load failed.
    #[default]
    NoData,
    Loaded,
}
