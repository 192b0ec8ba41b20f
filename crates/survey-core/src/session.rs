//! Workspace state machine tying loading, editing and export together.

use survey_model::Document;
use tracing::{info, warn};

use crate::editor::SurveyEditor;
use crate::error::{ExportError, LoadError};
use crate::export::{
    ExportArtifact, ExportGate, ExportPayload, ExportStatus, SurveyExporter, build_export_payload,
};
use crate::load::{LoadState, TemplateSource, document_from_response};

/// One editing session over a selection of templates.
#[derive(Debug, Default)]
pub struct StudioSession {
    editor: Option<SurveyEditor>,
    gate: ExportGate,
}

impl StudioSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LoadState {
        if self.editor.is_some() {
            LoadState::Loaded
        } else {
            LoadState::NoData
        }
    }

    pub fn export_status(&self) -> ExportStatus {
        self.gate.status()
    }

    /// Load `selection` from `source`. On failure the session holds no data.
    pub fn load(
        &mut self,
        source: &dyn TemplateSource,
        selection: &[String],
    ) -> Result<(), LoadError> {
        self.editor = None;
        let document = source
            .load(selection)
            .and_then(document_from_response)
            .inspect_err(|error| warn!(%error, "template load failed"))?;
        self.load_document(document);
        Ok(())
    }

    /// Start editing an already built document. It becomes the reset snapshot.
    pub fn load_document(&mut self, document: Document) {
        info!(groups = document.groups.len(), "session loaded");
        self.editor = Some(SurveyEditor::new(document));
    }

    pub fn editor(&self) -> Option<&SurveyEditor> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut SurveyEditor> {
        self.editor.as_mut()
    }

    /// Drop every edit and restore the load-time snapshot.
    pub fn discard_changes(&mut self) {
        if let Some(editor) = self.editor.as_mut() {
            editor.reset();
        }
    }

    /// Build the payload and mark an export as in flight.
    ///
    /// Validation failures leave the gate idle.
    pub fn begin_export(&mut self) -> Result<ExportPayload, ExportError> {
        let editor = self.editor.as_ref().ok_or(ExportError::NoDocument)?;
        if self.gate.is_in_flight() {
            return Err(ExportError::InFlight);
        }
        let payload = build_export_payload(editor.document())?;
        self.gate.begin()?;
        Ok(payload)
    }

    /// Mark the in-flight export as finished, whatever its outcome.
    pub fn complete_export(
        &mut self,
        outcome: Result<ExportArtifact, ExportError>,
    ) -> Result<ExportArtifact, ExportError> {
        self.gate.finish();
        match &outcome {
            Ok(artifact) => info!(
                file = %artifact.file_name,
                bytes = artifact.content.len(),
                persisted = ?artifact.persisted_templates,
                "export finished"
            ),
            Err(error) => warn!(%error, retryable = error.is_retryable(), "export failed"),
        }
        outcome
    }

    /// Build the payload and hand it to `exporter` in one step.
    pub fn submit_export(
        &mut self,
        exporter: &dyn SurveyExporter,
    ) -> Result<ExportArtifact, ExportError> {
        let payload = self.begin_export()?;
        let outcome = exporter.export(&payload);
        self.complete_export(outcome)
    }
}
