pub mod document;
pub mod error;
pub mod ids;
pub mod layout;
pub mod levels;
pub mod options;
pub mod overrides;
pub mod question_type;
pub mod text;

pub use document::{Document, Group, Item};
pub use error::{ModelError, Result};
pub use ids::{GroupId, ItemId};
pub use layout::{GroupLayout, MatrixGroupRecord};
pub use levels::Levels;
pub use options::{DEFAULT_TARGET_TOOL, ExportOptions, GroupingMode, SurveyMeta};
pub use overrides::{ItemOverrides, OverrideKey, OverrideValue, ValueKind};
pub use question_type::QuestionType;
pub use text::{FALLBACK_LANGUAGE, MultilingualText, resolve_text};
