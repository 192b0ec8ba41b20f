pub mod detector;
pub mod editor;
pub mod error;
pub mod export;
pub mod grouping;
pub mod load;
pub mod ops;
pub mod override_editor;
pub mod policy;
pub mod renumber;
pub mod session;

pub use detector::{DROPDOWN_LEVEL_THRESHOLD, detect_type};
pub use editor::SurveyEditor;
pub use error::{EditError, ExportError, LoadError};
pub use export::{
    ExportArtifact, ExportFormatOptions, ExportGate, ExportPayload, ExportStatus, JsonExporter,
    SurveyExporter, build_export_payload,
};
pub use grouping::{MATRIX_NAME_PREFIX, compute_document_layouts, compute_matrix_groups};
pub use load::{LoadResponse, LoadState, TemplateRecord, TemplateSource, document_from_response};
pub use ops::EditOp;
pub use override_editor::OverrideEditor;
pub use policy::{ExclusionReason, exclusion_reasons, is_participants_source, must_stay_standalone};
pub use renumber::{renumber_runs, run_label, strip_run_suffix};
pub use session::StudioSession;
