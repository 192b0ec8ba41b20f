//! Survey metadata and export options.

use serde::{Deserialize, Serialize};

use crate::text::FALLBACK_LANGUAGE;

/// Tool targeted when nothing else is configured.
pub const DEFAULT_TARGET_TOOL: &str = "limesurvey";

/// How items of a group are merged into matrix questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingMode {
    /// Every item stays a standalone question.
    Off,
    /// Only adjacent items with equal levels are merged.
    Consecutive,
    /// Items with equal levels are merged wherever they sit in the group.
    Global,
}

/// Survey-level metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyMeta {
    pub title: String,
    /// Default language of the exported survey.
    pub language: String,
    /// Languages selected for export.
    pub languages: Vec<String>,
    /// Language used to resolve text for preview.
    pub base_language: String,
}

impl Default for SurveyMeta {
    fn default() -> Self {
        Self {
            title: String::new(),
            language: FALLBACK_LANGUAGE.to_string(),
            languages: vec![FALLBACK_LANGUAGE.to_string()],
            base_language: FALLBACK_LANGUAGE.to_string(),
        }
    }
}

impl SurveyMeta {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Select export languages. The first one becomes the survey language.
    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = languages.into_iter().map(Into::into).collect();
        if let Some(first) = self.languages.first() {
            self.language = first.clone();
        }
        self
    }

    pub fn with_base_language(mut self, language: impl Into<String>) -> Self {
        self.base_language = language.into();
        self
    }
}

/// Options forwarded to the exporter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Merge items with identical levels into matrix questions.
    pub matrix: bool,
    /// Merge across the whole group instead of only adjacent items.
    pub matrix_global: bool,
    pub target_tool: String,
    pub tool_version: Option<String>,
    /// Also store the exported templates in the shared library.
    pub save_to_library: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            matrix: true,
            matrix_global: false,
            target_tool: DEFAULT_TARGET_TOOL.to_string(),
            tool_version: None,
            save_to_library: false,
        }
    }
}

impl ExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_matrix(mut self, enable: bool) -> Self {
        self.matrix = enable;
        self
    }

    pub fn with_matrix_global(mut self, enable: bool) -> Self {
        self.matrix_global = enable;
        self
    }

    pub fn with_target_tool(mut self, tool: impl Into<String>, version: Option<String>) -> Self {
        self.target_tool = tool.into();
        self.tool_version = version;
        self
    }

    pub fn grouping_mode(&self) -> GroupingMode {
        match (self.matrix, self.matrix_global) {
            (false, _) => GroupingMode::Off,
            (true, false) => GroupingMode::Consecutive,
            (true, true) => GroupingMode::Global,
        }
    }
}
