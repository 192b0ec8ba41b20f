//! Which items may be merged into matrix questions.
//!
//! The policy only looks at item metadata. Level equality is checked
//! separately by the grouping algorithm.

use std::fmt;

use survey_model::Item;

/// Input hints whose items always stay standalone.
pub const STANDALONE_INPUT_TYPES: &[&str] = &["dropdown", "numerical", "text", "calculated"];

/// Marker in the file name of participants-metadata templates.
const PARTICIPANTS_MARKER: &str = "participants";

/// Why an item cannot be merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExclusionReason {
    /// The owning template forbids matrices.
    TemplateForbidsMatrix,
    /// The item comes from a participants-metadata template.
    ParticipantsMetadata,
    /// The input hint needs its own question.
    InputType(String),
    /// The item offers an "other" free-text option.
    OtherOption,
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TemplateForbidsMatrix => f.write_str("template forbids matrices"),
            Self::ParticipantsMetadata => f.write_str("participants metadata"),
            Self::InputType(hint) => write!(f, "input type {hint}"),
            Self::OtherOption => f.write_str("has an other option"),
        }
    }
}

/// True when `item` must never be merged into a matrix.
pub fn must_stay_standalone(item: &Item, template_forbids_matrix: bool) -> bool {
    template_forbids_matrix
        || is_participants_source(item.source_file.as_deref())
        || item
            .input_hint()
            .is_some_and(|hint| STANDALONE_INPUT_TYPES.contains(&hint.as_str()))
        || item.has_other
}

/// Every reason that keeps `item` standalone, in no particular priority.
pub fn exclusion_reasons(item: &Item, template_forbids_matrix: bool) -> Vec<ExclusionReason> {
    let mut reasons = Vec::new();
    if template_forbids_matrix {
        reasons.push(ExclusionReason::TemplateForbidsMatrix);
    }
    if is_participants_source(item.source_file.as_deref()) {
        reasons.push(ExclusionReason::ParticipantsMetadata);
    }
    if let Some(hint) = item.input_hint()
        && STANDALONE_INPUT_TYPES.contains(&hint.as_str())
    {
        reasons.push(ExclusionReason::InputType(hint));
    }
    if item.has_other {
        reasons.push(ExclusionReason::OtherOption);
    }
    reasons
}

/// Whether the file name (not the directory) marks a participants template.
pub fn is_participants_source(source_file: Option<&str>) -> bool {
    let Some(path) = source_file else {
        return false;
    };
    let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    file_name.to_ascii_lowercase().contains(PARTICIPANTS_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_model::{ItemId, Levels};

    fn question() -> Item {
        Item::new(ItemId::new("q").unwrap(), "Q")
            .with_levels(Levels::from_pairs([("1", "Low"), ("2", "High")]))
    }

    #[test]
    fn plain_list_item_is_eligible() {
        assert!(!must_stay_standalone(&question(), false));
        assert!(exclusion_reasons(&question(), false).is_empty());
    }

    #[test]
    fn template_flag_excludes() {
        assert!(must_stay_standalone(&question(), true));
    }

    #[test]
    fn participants_templates_are_excluded() {
        let item = question().with_source_file("library/participants.json");
        assert!(must_stay_standalone(&item, false));
        let item = question().with_source_file("participants/phq9.json");
        assert!(!must_stay_standalone(&item, false));
        let item = question().with_source_file(r"C:\lib\Participants_extra.json");
        assert!(must_stay_standalone(&item, false));
    }

    #[test]
    fn free_input_types_are_excluded() {
        for hint in ["dropdown", "numerical", "text", "calculated"] {
            assert!(must_stay_standalone(&question().with_input_type(hint), false), "{hint}");
        }
        assert!(!must_stay_standalone(&question().with_input_type("slider"), false));
    }

    #[test]
    fn other_option_excludes() {
        let mut item = question();
        item.has_other = true;
        assert!(must_stay_standalone(&item, false));
    }

    #[test]
    fn overlapping_reasons_are_all_reported() {
        let mut item = question().with_source_file("participants.json");
        item.has_other = true;
        assert_eq!(
            exclusion_reasons(&item, false),
            vec![ExclusionReason::ParticipantsMetadata, ExclusionReason::OtherOption]
        );
    }
}
