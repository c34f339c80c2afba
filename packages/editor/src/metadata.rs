//! # Learning Metadata
//!
//! The pedagogical "fingerprint" of a block together with per-field
//! provenance. Values written by an author are always marked `human`;
//! values written by the AI review workflow are marked `ai`.

use crate::ModelError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub const MAX_DIFFICULTY: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetadataField {
    BehaviourTag,
    CognitiveSkill,
    LearningPattern,
    Difficulty,
    Notes,
}

impl MetadataField {
    pub const ALL: [MetadataField; 5] = [
        MetadataField::BehaviourTag,
        MetadataField::CognitiveSkill,
        MetadataField::LearningPattern,
        MetadataField::Difficulty,
        MetadataField::Notes,
    ];

    /// camelCase name used in block JSON
    pub fn as_str(&self) -> &'static str {
        match self {
            MetadataField::BehaviourTag => "behaviourTag",
            MetadataField::CognitiveSkill => "cognitiveSkill",
            MetadataField::LearningPattern => "learningPattern",
            MetadataField::Difficulty => "difficulty",
            MetadataField::Notes => "notes",
        }
    }

    /// snake_case name used by the AI service
    pub fn wire_name(&self) -> &'static str {
        match self {
            MetadataField::BehaviourTag => "behaviour_tag",
            MetadataField::CognitiveSkill => "cognitive_skill",
            MetadataField::LearningPattern => "learning_pattern",
            MetadataField::Difficulty => "difficulty",
            MetadataField::Notes => "notes",
        }
    }
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetadataField {
    type Err = ModelError;

    /// Accepts both the camelCase and snake_case spellings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        MetadataField::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s || f.wire_name() == s)
            .ok_or_else(|| ModelError::UnknownField(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataSource {
    Ai,
    Human,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Metadata {
    pub behaviour_tag: Option<String>,
    pub cognitive_skill: Option<String>,
    pub learning_pattern: Option<String>,
    /// 0..=10
    pub difficulty: Option<u8>,
    pub notes: Option<String>,
    /// Who wrote the most recent value
    pub source: Option<MetadataSource>,
    pub field_sources: BTreeMap<MetadataField, MetadataSource>,
}

impl Metadata {
    /// Current value of a field as JSON (`null` when unset)
    pub fn get(&self, field: MetadataField) -> Value {
        match field {
            MetadataField::BehaviourTag => opt_string(&self.behaviour_tag),
            MetadataField::CognitiveSkill => opt_string(&self.cognitive_skill),
            MetadataField::LearningPattern => opt_string(&self.learning_pattern),
            MetadataField::Difficulty => self.difficulty.map_or(Value::Null, Value::from),
            MetadataField::Notes => opt_string(&self.notes),
        }
    }

    pub fn is_populated(&self, field: MetadataField) -> bool {
        !self.get(field).is_null()
    }

    pub fn is_empty(&self) -> bool {
        MetadataField::ALL.iter().all(|f| !self.is_populated(*f))
    }

    /// Write a field and record its provenance. `null` clears the field.
    pub fn set(
        &mut self,
        field: MetadataField,
        value: &Value,
        source: MetadataSource,
    ) -> Result<(), ModelError> {
        match field {
            MetadataField::BehaviourTag => self.behaviour_tag = text_value(field, value)?,
            MetadataField::CognitiveSkill => self.cognitive_skill = text_value(field, value)?,
            MetadataField::LearningPattern => self.learning_pattern = text_value(field, value)?,
            MetadataField::Difficulty => self.difficulty = difficulty_value(value)?,
            MetadataField::Notes => self.notes = text_value(field, value)?,
        }
        self.field_sources.insert(field, source);
        self.source = Some(source);
        Ok(())
    }

    /// Author edit outside the AI workflow
    pub fn set_by_author(&mut self, field: MetadataField, value: &Value) -> Result<(), ModelError> {
        self.set(field, value, MetadataSource::Human)
    }

    pub fn field_source(&self, field: MetadataField) -> Option<MetadataSource> {
        self.field_sources.get(&field).copied()
    }
}

fn opt_string(value: &Option<String>) -> Value {
    value.as_ref().map_or(Value::Null, |s| Value::String(s.clone()))
}

fn text_value(field: MetadataField, value: &Value) -> Result<Option<String>, ModelError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s.trim().to_string())),
        _ => Err(ModelError::WrongValueType {
            field: field.as_str(),
            expected: "a string",
        }),
    }
}

/// Difficulty accepts integers and integer strings within 0..=10
pub fn difficulty_value(value: &Value) -> Result<Option<u8>, ModelError> {
    let n = match value {
        Value::Null => return Ok(None),
        Value::Number(n) => match n.as_i64() {
            Some(i) => i,
            None => match n.as_f64() {
                Some(f) if f.fract() == 0.0 => f as i64,
                _ => {
                    return Err(ModelError::WrongValueType {
                        field: "difficulty",
                        expected: "an integer",
                    })
                }
            },
        },
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| ModelError::WrongValueType {
            field: "difficulty",
            expected: "an integer",
        })?,
        _ => {
            return Err(ModelError::WrongValueType {
                field: "difficulty",
                expected: "an integer",
            })
        }
    };

    if (0..=MAX_DIFFICULTY as i64).contains(&n) {
        Ok(Some(n as u8))
    } else {
        Err(ModelError::DifficultyOutOfRange(n))
    }
}
