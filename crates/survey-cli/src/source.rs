//! Template source backed by a saved load response on disk.

use std::fs;
use std::path::PathBuf;

use survey_core::{LoadError, LoadResponse, TemplateSource};
use tracing::info;

/// Reads a JSON load response from a file.
///
/// An empty selection loads every template. Otherwise templates are
/// returned in selection order, and a template selected twice is returned
/// twice so it can be administered as several runs.
#[derive(Debug, Clone)]
pub struct FileTemplateSource {
    path: PathBuf,
}

impl FileTemplateSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TemplateSource for FileTemplateSource {
    fn load(&self, selection: &[String]) -> Result<LoadResponse, LoadError> {
        let contents = fs::read_to_string(&self.path).map_err(|error| {
            LoadError::source_failed(format!("read {}: {error}", self.path.display()))
        })?;
        let response = LoadResponse::from_json_str(&contents)?;
        let response = select(response, selection)?;
        info!(
            path = %self.path.display(),
            templates = response.templates.len(),
            "read template response"
        );
        Ok(response)
    }
}

fn select(response: LoadResponse, selection: &[String]) -> Result<LoadResponse, LoadError> {
    if selection.is_empty() {
        return Ok(response);
    }
    let mut templates = Vec::with_capacity(selection.len());
    for id in selection {
        let template = response
            .templates
            .iter()
            .find(|template| template.id == *id)
            .ok_or_else(|| LoadError::source_failed(format!("unknown template: {id}")))?;
        templates.push(template.clone());
    }
    Ok(LoadResponse {
        templates,
        languages: response.languages,
    })
}
