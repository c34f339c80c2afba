//! # Sanity Review
//!
//! The transient per-block set of proposed corrections and the author's
//! accept/ignore decision on each. A review is built from a sanity-check
//! response, edited locally, and consumed by applying it.

use crate::errors::{Result, WorkflowError};
use crate::service::FieldSuggestion;
use chrono::{DateTime, Utc};
use lectern_editor::MetadataField;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    #[default]
    Accept,
    Ignore,
}

impl Decision {
    pub fn toggled(self) -> Self {
        match self {
            Decision::Accept => Decision::Ignore,
            Decision::Ignore => Decision::Accept,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewItem {
    pub original_value: Value,
    pub suggested_value: Value,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub decision: Decision,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SanityReview {
    pub block_id: String,
    pub fields: BTreeMap<MetadataField, ReviewItem>,
    pub created_at: DateTime<Utc>,
}

impl SanityReview {
    /// Build a review with every suggestion accepted. Suggestions naming an
    /// unknown field are skipped; a repeated field keeps the last one.
    pub fn from_suggestions(block_id: impl Into<String>, suggestions: Vec<FieldSuggestion>) -> Self {
        let mut fields = BTreeMap::new();
        for suggestion in suggestions {
            let Ok(field) = suggestion.field.parse::<MetadataField>() else {
                warn!(field = %suggestion.field, "Skipping suggestion for unknown field");
                continue;
            };
            fields.insert(
                field,
                ReviewItem {
                    original_value: suggestion.original_value,
                    suggested_value: suggestion.suggested_value,
                    reason: suggestion.reason,
                    confidence: suggestion.confidence,
                    decision: Decision::Accept,
                },
            );
        }
        Self {
            block_id: block_id.into(),
            fields,
            created_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn decision(&self, field: MetadataField) -> Option<Decision> {
        self.fields.get(&field).map(|item| item.decision)
    }

    pub fn set_decision(&mut self, field: MetadataField, decision: Decision) -> Result<()> {
        let item = self
            .fields
            .get_mut(&field)
            .ok_or_else(|| WorkflowError::UnknownField(field.to_string()))?;
        item.decision = decision;
        Ok(())
    }

    pub fn toggle(&mut self, field: MetadataField) -> Result<Decision> {
        let item = self
            .fields
            .get_mut(&field)
            .ok_or_else(|| WorkflowError::UnknownField(field.to_string()))?;
        item.decision = item.decision.toggled();
        Ok(item.decision)
    }

    pub fn accepted(&self) -> Vec<(MetadataField, &ReviewItem)> {
        self.with_decision(Decision::Accept)
    }

    pub fn ignored(&self) -> Vec<(MetadataField, &ReviewItem)> {
        self.with_decision(Decision::Ignore)
    }

    fn with_decision(&self, decision: Decision) -> Vec<(MetadataField, &ReviewItem)> {
        self.fields
            .iter()
            .filter(|(_, item)| item.decision == decision)
            .map(|(field, item)| (*field, item))
            .collect()
    }
}

/// Parse a sanity-check body. Accepts the object or its JSON-string
/// encoding; anything without usable suggestions is an empty result.
pub fn parse_sanity_response(body: &Value) -> Result<Vec<FieldSuggestion>> {
    let decoded;
    let body = match body {
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(value) => {
                decoded = value;
                &decoded
            }
            Err(e) => {
                warn!(error = %e, "Sanity check body is not JSON");
                return Ok(Vec::new());
            }
        },
        other => other,
    };

    if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
        let message = error
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(WorkflowError::Service(message));
    }

    let Some(list) = body.get("suggestions").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    Ok(list
        .iter()
        .filter_map(|entry| match serde_json::from_value(entry.clone()) {
            Ok(suggestion) => Some(suggestion),
            Err(e) => {
                warn!(error = %e, "Skipping malformed suggestion");
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn suggestion(field: &str, value: Value) -> FieldSuggestion {
        FieldSuggestion {
            field: field.to_string(),
            original_value: Value::Null,
            suggested_value: value,
            reason: "fits better".to_string(),
            confidence: Some(0.8),
        }
    }

    #[test]
    fn test_review_defaults_to_accept() {
        let review = SanityReview::from_suggestions(
            "b1",
            vec![
                suggestion("difficulty", json!(3)),
                suggestion("cognitive_skill", json!("Apply")),
            ],
        );
        assert_eq!(review.len(), 2);
        assert_eq!(review.decision(MetadataField::Difficulty), Some(Decision::Accept));
        assert_eq!(review.accepted().len(), 2);
        assert!(review.ignored().is_empty());
    }

    #[test]
    fn test_unknown_field_is_skipped() {
        let review = SanityReview::from_suggestions("b1", vec![suggestion("mood", json!("happy"))]);
        assert!(review.is_empty());
    }

    #[test]
    fn test_toggle_and_set() {
        let mut review =
            SanityReview::from_suggestions("b1", vec![suggestion("notes", json!("shorter"))]);
        assert_eq!(review.toggle(MetadataField::Notes).unwrap(), Decision::Ignore);
        assert_eq!(review.ignored().len(), 1);
        review.set_decision(MetadataField::Notes, Decision::Accept).unwrap();
        assert_eq!(review.accepted().len(), 1);

        assert!(matches!(
            review.toggle(MetadataField::Difficulty),
            Err(WorkflowError::UnknownField(_))
        ));
    }

    #[test]
    fn test_parse_object_and_string() {
        let object = json!({
            "suggestions": [
                { "field": "difficulty", "original_value": 8, "suggested_value": 5, "reason": "short text" }
            ]
        });
        let parsed = parse_sanity_response(&object).unwrap();
        assert_eq!(parsed.len(), 1);

        let encoded = Value::String(object.to_string());
        assert_eq!(parse_sanity_response(&encoded).unwrap(), parsed);
    }

    #[test]
    fn test_parse_error_body() {
        let result = parse_sanity_response(&json!({ "error": "model overloaded" }));
        assert_eq!(result, Err(WorkflowError::Service("model overloaded".to_string())));
    }

    #[test]
    fn test_parse_malformed_is_empty() {
        assert!(parse_sanity_response(&json!("not json {")).unwrap().is_empty());
        assert!(parse_sanity_response(&json!({ "suggestions": "none" })).unwrap().is_empty());
        let mixed = json!({ "suggestions": [ { "reason": "no field" }, { "field": "notes" } ] });
        assert_eq!(parse_sanity_response(&mixed).unwrap().len(), 1);
    }
}
