//! Export payload assembly and the single in-flight export gate.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use survey_model::{Document, ExportOptions, Group, GroupLayout, GroupingMode, SurveyMeta};
use tracing::{debug, info};

use crate::detector::detect_type;
use crate::error::ExportError;
use crate::grouping::compute_matrix_groups;

/// Export options as the exporter reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportFormatOptions {
    pub matrix: bool,
    pub matrix_global: bool,
    pub target_tool: String,
    pub tool_version: Option<String>,
}

impl From<&ExportOptions> for ExportFormatOptions {
    fn from(options: &ExportOptions) -> Self {
        Self {
            matrix: options.matrix,
            matrix_global: options.matrix_global,
            target_tool: options.target_tool.clone(),
            tool_version: options.tool_version.clone(),
        }
    }
}

impl ExportFormatOptions {
    pub fn grouping_mode(&self) -> GroupingMode {
        ExportOptions::new()
            .with_matrix(self.matrix)
            .with_matrix_global(self.matrix_global)
            .grouping_mode()
    }
}

/// Immutable snapshot handed to the exporter.
///
/// Matrix layouts are not part of the payload. The exporter recomputes
/// them with [`ExportPayload::matrix_layouts`], which runs the same
/// grouping as the preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload {
    pub survey: SurveyMeta,
    pub groups: Vec<Group>,
    pub export_format: String,
    pub export_options: ExportFormatOptions,
    pub tool_settings: BTreeMap<String, Value>,
    pub save_to_library: bool,
}

impl ExportPayload {
    /// Matrix layouts of the exported groups, in group order.
    pub fn matrix_layouts(&self) -> Vec<GroupLayout> {
        let mode = self.export_options.grouping_mode();
        self.groups
            .iter()
            .map(|group| compute_matrix_groups(group, mode, &self.survey.base_language))
            .collect()
    }

    pub fn to_json_pretty(&self) -> Result<String, ExportError> {
        serde_json::to_string_pretty(self).map_err(|source| ExportError::Serialize { source })
    }

    pub fn from_json_str(json: &str) -> Result<Self, ExportError> {
        serde_json::from_str(json).map_err(|source| ExportError::Serialize { source })
    }
}

/// Snapshot the document for export.
///
/// The trimmed title must not be empty. Item overrides are reduced to the
/// fields that apply to the item's detected question type. Matrix rows keep
/// the array fields too.
pub fn build_export_payload(document: &Document) -> Result<ExportPayload, ExportError> {
    let title = document.survey.title.trim();
    if title.is_empty() {
        return Err(ExportError::EmptyTitle);
    }

    let mode = document.options.grouping_mode();
    let mut groups = document.groups.clone();
    let mut dropped = 0;
    for group in &mut groups {
        let layout = compute_matrix_groups(group, mode, &document.survey.base_language);
        for item in &mut group.items {
            let in_matrix = layout
                .record_for(&item.id)
                .is_some_and(|record| record.is_matrix);
            let applicable = item.overrides.applicable_to(detect_type(item), in_matrix);
            dropped += item.overrides.len() - applicable.len();
            item.overrides = applicable;
        }
    }
    if dropped > 0 {
        debug!(dropped, "dropped overrides not applicable to detected types");
    }

    let mut survey = document.survey.clone();
    survey.title = title.to_string();
    let payload = ExportPayload {
        survey,
        groups,
        export_format: document.options.target_tool.clone(),
        export_options: ExportFormatOptions::from(&document.options),
        tool_settings: document.tool_settings.clone(),
        save_to_library: document.options.save_to_library,
    };
    info!(
        title = %payload.survey.title,
        groups = payload.groups.len(),
        format = %payload.export_format,
        "built export payload"
    );
    Ok(payload)
}

/// Result returned by the exporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub content: Vec<u8>,
    /// Templates the exporter also stored in the shared library.
    pub persisted_templates: Option<usize>,
}

/// Turns an export payload into a survey artifact.
pub trait SurveyExporter {
    fn export(&self, payload: &ExportPayload) -> Result<ExportArtifact, ExportError>;
}

/// Exporter that writes the payload itself as pretty JSON.
#[derive(Debug, Clone, Default)]
pub struct JsonExporter {
    pub file_name: Option<String>,
}

impl SurveyExporter for JsonExporter {
    fn export(&self, payload: &ExportPayload) -> Result<ExportArtifact, ExportError> {
        let file_name = self
            .file_name
            .clone()
            .unwrap_or_else(|| format!("{}.json", file_stem(&payload.survey.title)));
        Ok(ExportArtifact {
            file_name,
            content: payload.to_json_pretty()?.into_bytes(),
            persisted_templates: None,
        })
    }
}

fn file_stem(title: &str) -> String {
    let stem: String = title
        .trim()
        .chars()
        .map(|ch| if ch.is_alphanumeric() { ch } else { '_' })
        .collect();
    if stem.is_empty() {
        "survey".to_string()
    } else {
        stem
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportStatus {
    #[default]
    Idle,
    InFlight,
}

/// Allows at most one export submission at a time.
#[derive(Debug, Clone, Default)]
pub struct ExportGate {
    status: ExportStatus,
}

impl ExportGate {
    pub fn status(&self) -> ExportStatus {
        self.status
    }

    pub fn is_in_flight(&self) -> bool {
        self.status == ExportStatus::InFlight
    }

    /// Mark a submission as started. A second call before [`finish`](Self::finish)
    /// is rejected.
    pub fn begin(&mut self) -> Result<(), ExportError> {
        if self.is_in_flight() {
            return Err(ExportError::InFlight);
        }
        self.status = ExportStatus::InFlight;
        Ok(())
    }

    pub fn finish(&mut self) {
        self.status = ExportStatus::Idle;
    }
}
