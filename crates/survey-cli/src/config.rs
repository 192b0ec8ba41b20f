//! TOML configuration for survey metadata, export options and tool settings.
//!
//! ```toml
//! [survey]
//! title = "Baseline visit"
//! languages = ["en", "de"]
//! base_language = "de"
//!
//! [export]
//! matrix = true
//! matrix_global = false
//! target_tool = "limesurvey"
//! tool_version = "6"
//!
//! [tool_settings]
//! anonymized = true
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use survey_model::Document;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SurveyConfig {
    pub survey: SurveySection,
    pub export: ExportSection,
    pub tool_settings: BTreeMap<String, toml::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SurveySection {
    pub title: Option<String>,
    pub languages: Option<Vec<String>>,
    pub base_language: Option<String>,
}

/// Unset fields keep the document's current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportSection {
    pub matrix: Option<bool>,
    pub matrix_global: Option<bool>,
    pub target_tool: Option<String>,
    pub tool_version: Option<String>,
    pub save_to_library: Option<bool>,
}

impl SurveyConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_toml_str(&contents).with_context(|| format!("parse config {}", path.display()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Write the configured values into a freshly loaded document.
    pub fn apply(&self, document: &mut Document) -> Result<()> {
        let survey = &mut document.survey;
        if let Some(title) = &self.survey.title {
            survey.title = title.clone();
        }
        if let Some(languages) = &self.survey.languages {
            *survey = std::mem::take(survey).with_languages(languages.iter().cloned());
        }
        if let Some(base_language) = &self.survey.base_language {
            survey.base_language = base_language.clone();
        }

        let options = &mut document.options;
        if let Some(matrix) = self.export.matrix {
            options.matrix = matrix;
        }
        if let Some(matrix_global) = self.export.matrix_global {
            options.matrix_global = matrix_global;
        }
        if let Some(tool) = &self.export.target_tool {
            options.target_tool = tool.clone();
        }
        if let Some(version) = &self.export.tool_version {
            options.tool_version = Some(version.clone());
        }
        if let Some(save) = self.export.save_to_library {
            options.save_to_library = save;
        }

        for (key, value) in &self.tool_settings {
            let value = serde_json::to_value(value)
                .with_context(|| format!("convert tool setting {key}"))?;
            document.tool_settings.insert(key.clone(), value);
        }
        debug!(
            settings = self.tool_settings.len(),
            mode = ?document.options.grouping_mode(),
            "applied configuration"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_model::GroupingMode;

    #[test]
    fn applies_every_section() {
        let config = SurveyConfig::from_toml_str(
            r#"
            [survey]
            title = "Baseline"
            languages = ["de", "en"]

            [export]
            matrix_global = true
            tool_version = "6"

            [tool_settings]
            anonymized = true
            welcome = { en = "Hello" }
            "#,
        )
        .unwrap();

        let mut document = Document::default();
        config.apply(&mut document).unwrap();
        assert_eq!(document.survey.title, "Baseline");
        assert_eq!(document.survey.language, "de");
        assert_eq!(document.survey.base_language, "en");
        assert_eq!(document.options.grouping_mode(), GroupingMode::Global);
        assert_eq!(document.options.tool_version.as_deref(), Some("6"));
        assert_eq!(document.tool_settings["anonymized"], serde_json::json!(true));
        assert_eq!(document.tool_settings["welcome"]["en"], "Hello");
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(SurveyConfig::from_toml_str("[export]\nmatrixx = true\n").is_err());
    }

    #[test]
    fn empty_config_changes_nothing() {
        let config = SurveyConfig::from_toml_str("").unwrap();
        let mut document = Document::default();
        config.apply(&mut document).unwrap();
        assert_eq!(document, Document::default());
    }
}
