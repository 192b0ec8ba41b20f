//! Opening a session from files and describing its preview.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use survey_core::{
    EditOp, StudioSession, SurveyEditor, TemplateSource, detect_type, document_from_response,
};
use survey_model::{ExportOptions, GroupingMode, QuestionType, resolve_text};
use tracing::{info, info_span};

use crate::config::SurveyConfig;
use crate::source::FileTemplateSource;

/// Inputs for opening a session.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceInputs {
    pub load_response: PathBuf,
    /// Template ids to load; empty loads everything.
    pub selection: Vec<String>,
    pub config: Option<PathBuf>,
    /// JSON array of edit operations replayed after loading.
    pub edits: Option<PathBuf>,
    /// Survey title taking precedence over the config file.
    pub title: Option<String>,
    /// Preview language taking precedence over the config file.
    pub base_language: Option<String>,
    /// Grouping mode taking precedence over the config file.
    pub grouping: Option<GroupingMode>,
    pub save_to_library: bool,
}

/// Load templates, apply configuration, then replay the edit script.
///
/// Configuration is part of the load-time snapshot; edits are not.
pub fn open_workspace(inputs: &WorkspaceInputs) -> Result<StudioSession> {
    let span = info_span!("workspace", load = %inputs.load_response.display());
    let _guard = span.enter();

    let source = FileTemplateSource::new(&inputs.load_response);
    let response = source.load(&inputs.selection)?;
    let mut document = document_from_response(response)?;

    if let Some(path) = &inputs.config {
        SurveyConfig::load(path)?.apply(&mut document)?;
    }
    if let Some(title) = &inputs.title {
        document.survey.title = title.clone();
    }
    if let Some(language) = &inputs.base_language {
        document.survey.base_language = language.clone();
    }
    if let Some(mode) = inputs.grouping {
        document.options = apply_grouping(document.options, mode);
    }
    if inputs.save_to_library {
        document.options.save_to_library = true;
    }

    let mut session = StudioSession::new();
    session.load_document(document);

    if let Some(path) = &inputs.edits {
        let ops = read_edits(path)?;
        let editor = session
            .editor_mut()
            .ok_or_else(|| anyhow!("no document loaded"))?;
        editor.apply_all(&ops).map_err(|(index, error)| {
            anyhow!("edit {} ({}) rejected: {error}", index + 1, ops[index].name())
        })?;
        info!(edits = ops.len(), "replayed edit script");
    }
    Ok(session)
}

fn apply_grouping(options: ExportOptions, mode: GroupingMode) -> ExportOptions {
    match mode {
        GroupingMode::Off => options.with_matrix(false),
        GroupingMode::Consecutive => options.with_matrix(true).with_matrix_global(false),
        GroupingMode::Global => options.with_matrix(true).with_matrix_global(true),
    }
}

pub fn read_edits(path: &Path) -> Result<Vec<EditOp>> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read edits {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse edits {}", path.display()))
}

/// One rendered question of the preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewRow {
    pub label: String,
    pub question_type: QuestionType,
    pub item_codes: Vec<String>,
    pub text: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupPreview {
    pub name: String,
    pub rows: Vec<PreviewRow>,
}

/// Preview of every group in display order, text in the base language.
pub fn preview(editor: &SurveyEditor) -> Vec<GroupPreview> {
    let document = editor.document();
    let language = &document.survey.base_language;
    editor
        .layouts()
        .into_iter()
        .filter_map(|layout| {
            let group = document.group(&layout.group_id)?;
            let enabled = layout.records.iter().map(|record| (record, true));
            let disabled = layout.disabled.iter().map(|record| (record, false));
            let rows = enabled
                .chain(disabled)
                .filter_map(|(record, enabled)| {
                    let items: Vec<_> = record
                        .item_ids
                        .iter()
                        .filter_map(|id| group.item(id))
                        .collect();
                    let first = items.first()?;
                    let item_codes = items.iter().map(|item| item.code.clone()).collect();
                    let row = if record.is_matrix {
                        PreviewRow {
                            label: record.matrix_name.clone().unwrap_or_default(),
                            question_type: QuestionType::ArrayMatrix,
                            item_codes,
                            text: record.heading.clone().unwrap_or_default(),
                            enabled,
                        }
                    } else {
                        PreviewRow {
                            label: first.code.clone(),
                            question_type: detect_type(first),
                            item_codes,
                            text: resolve_text(&first.description, language),
                            enabled,
                        }
                    };
                    Some(row)
                })
                .collect();
            Some(GroupPreview {
                name: group.name.clone(),
                rows,
            })
        })
        .collect()
}
