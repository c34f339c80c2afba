//! # Merge Policy
//!
//! Turns AI-produced values into stored metadata. The AI fills gaps and
//! refines what it confidently produced; a `null`, an unmatched label or an
//! out-of-range difficulty never overwrites what the block already has.

use crate::options;
use lectern_editor::{difficulty_value, Metadata, MetadataField, MetadataSource};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Fields the generation pass may write
pub const AI_FIELDS: [MetadataField; 4] = [
    MetadataField::BehaviourTag,
    MetadataField::CognitiveSkill,
    MetadataField::LearningPattern,
    MetadataField::Difficulty,
];

/// What a merge changed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeReport {
    pub updated: Vec<MetadataField>,
    /// Fields the AI answered but that resolved to nothing usable
    pub unresolved: Vec<MetadataField>,
}

/// Resolve a single AI value to its stored form. `None` means "leave the
/// field alone".
pub fn resolve_value(field: MetadataField, value: &Value) -> Option<Value> {
    match (field, value) {
        (_, Value::Null) => None,
        (MetadataField::Difficulty, v) => match difficulty_value(v) {
            Ok(Some(n)) => Some(Value::from(n)),
            Ok(None) => None,
            Err(e) => {
                warn!(%field, error = %e, "Ignoring AI difficulty");
                None
            }
        },
        (MetadataField::Notes, Value::String(s)) if !s.trim().is_empty() => {
            Some(Value::String(s.trim().to_string()))
        }
        (_, Value::String(label)) => {
            let resolved = options::resolve(field, label);
            if resolved.is_none() {
                warn!(%field, label = %label, "AI label matches no option");
            }
            resolved.map(|v| Value::String(v.to_string()))
        }
        _ => None,
    }
}

/// Look up a field in an AI object that may use either key spelling
pub fn field_value(object: &Map<String, Value>, field: MetadataField) -> Option<&Value> {
    object
        .get(field.as_str())
        .or_else(|| object.get(field.wire_name()))
}

/// Merge a generation response into block metadata, marking every written
/// field as AI-sourced.
pub fn merge_ai_metadata(metadata: &mut Metadata, response: &Value) -> MergeReport {
    let mut report = MergeReport::default();
    let Some(object) = response.as_object() else {
        warn!("AI metadata is not an object; nothing merged");
        return report;
    };

    for field in AI_FIELDS {
        let Some(raw) = field_value(object, field) else {
            continue;
        };
        match resolve_value(field, raw) {
            Some(value) => {
                if metadata.set(field, &value, MetadataSource::Ai).is_ok() {
                    report.updated.push(field);
                }
            }
            None if raw.is_null() => debug!(%field, "AI left field empty"),
            None => report.unresolved.push(field),
        }
    }
    report
}
