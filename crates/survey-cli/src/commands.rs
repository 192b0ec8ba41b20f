use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use tracing::info;

use survey_cli::workspace::{GroupPreview, WorkspaceInputs, open_workspace, preview};
use survey_core::{ExportArtifact, JsonExporter};
use survey_model::GroupingMode;

use crate::cli::{ExportArgs, MatrixArg, PreviewArgs, SourceArgs};

pub fn run_preview(args: &PreviewArgs) -> Result<Vec<GroupPreview>> {
    let mut inputs = inputs_from(&args.source);
    inputs.base_language = args.lang.clone();
    let session = open_workspace(&inputs)?;
    let editor = session
        .editor()
        .ok_or_else(|| anyhow!("no document loaded"))?;
    Ok(preview(editor))
}

pub fn run_export(args: &ExportArgs) -> Result<(ExportArtifact, PathBuf)> {
    let mut inputs = inputs_from(&args.source);
    inputs.title = args.title.clone();
    inputs.save_to_library = args.save_to_library;
    let mut session = open_workspace(&inputs)?;

    let exporter = JsonExporter::default();
    let artifact = session.submit_export(&exporter)?;
    let path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&artifact.file_name));
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output dir {}", parent.display()))?;
    }
    fs::write(&path, &artifact.content)
        .with_context(|| format!("write payload {}", path.display()))?;
    info!(path = %path.display(), "export payload written");
    Ok((artifact, path))
}

fn inputs_from(source: &SourceArgs) -> WorkspaceInputs {
    WorkspaceInputs {
        load_response: source.load_response.clone(),
        selection: source.templates.clone(),
        config: source.config.clone(),
        edits: source.edits.clone(),
        grouping: source.matrix.map(|matrix| match matrix {
            MatrixArg::Off => GroupingMode::Off,
            MatrixArg::Consecutive => GroupingMode::Consecutive,
            MatrixArg::Global => GroupingMode::Global,
        }),
        ..WorkspaceInputs::default()
    }
}
