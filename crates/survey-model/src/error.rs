use thiserror::Error;

use crate::overrides::{OverrideKey, ValueKind};
use crate::question_type::QuestionType;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("invalid group id: {0:?}")]
    InvalidGroupId(String),
    #[error("invalid item id: {0:?}")]
    InvalidItemId(String),
    #[error("unknown question type: {0}")]
    UnknownQuestionType(String),
    #[error("unknown override field: {0}")]
    UnknownOverrideKey(String),
    #[error("override {key} expects a {expected} value, got {found}")]
    OverrideKind {
        key: OverrideKey,
        expected: ValueKind,
        found: ValueKind,
    },
    #[error("override {key} does not apply to {question_type} questions")]
    OverrideNotApplicable {
        key: OverrideKey,
        question_type: QuestionType,
    },
}

pub type Result<T> = std::result::Result<T, ModelError>;
