//! # Option Tables
//!
//! The metadata fields that take a fixed vocabulary. The AI service speaks
//! in human-readable labels ("Attention / focus") while blocks store the
//! option value ("attention"); lookups accept either, case-insensitively.

use lectern_editor::MetadataField;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataOption {
    pub label: &'static str,
    pub value: &'static str,
}

const fn opt(label: &'static str, value: &'static str) -> MetadataOption {
    MetadataOption { label, value }
}

pub const BEHAVIOUR_TAGS: &[MetadataOption] = &[
    opt("Attention / focus", "attention"),
    opt("Recall / retrieval", "recall"),
    opt("Application / practice", "application"),
    opt("Reflection", "reflection"),
    opt("Collaboration", "collaboration"),
    opt("Motivation / engagement", "motivation"),
];

/// Bloom's taxonomy
pub const COGNITIVE_SKILLS: &[MetadataOption] = &[
    opt("Remember", "remember"),
    opt("Understand", "understand"),
    opt("Apply", "apply"),
    opt("Analyse", "analyse"),
    opt("Evaluate", "evaluate"),
    opt("Create", "create"),
];

pub const LEARNING_PATTERNS: &[MetadataOption] = &[
    opt("Worked example", "worked-example"),
    opt("Scaffolded practice", "scaffolded-practice"),
    opt("Spaced repetition", "spaced-repetition"),
    opt("Retrieval practice", "retrieval-practice"),
    opt("Direct instruction", "direct-instruction"),
    opt("Inquiry-based", "inquiry-based"),
    opt("Discussion", "discussion"),
];

/// Vocabulary for a field; free-form fields have none
pub fn options_for(field: MetadataField) -> Option<&'static [MetadataOption]> {
    match field {
        MetadataField::BehaviourTag => Some(BEHAVIOUR_TAGS),
        MetadataField::CognitiveSkill => Some(COGNITIVE_SKILLS),
        MetadataField::LearningPattern => Some(LEARNING_PATTERNS),
        MetadataField::Difficulty | MetadataField::Notes => None,
    }
}

/// Resolve a label or value to the stored option value
pub fn resolve(field: MetadataField, input: &str) -> Option<&'static str> {
    let needle = input.trim();
    if needle.is_empty() {
        return None;
    }
    options_for(field)?
        .iter()
        .find(|o| o.label.eq_ignore_ascii_case(needle) || o.value.eq_ignore_ascii_case(needle))
        .map(|o| o.value)
}

/// Display label for a stored value
pub fn label_for(field: MetadataField, value: &str) -> Option<&'static str> {
    options_for(field)?
        .iter()
        .find(|o| o.value == value)
        .map(|o| o.label)
}
