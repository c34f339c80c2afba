//! # Metadata Service Boundary
//!
//! Request and response shapes of the AI metadata service. Generation uses
//! camelCase keys; the sanity-check and suggestion-log endpoints use
//! snake_case, as the service defines them.

use async_trait::async_trait;
use lectern_editor::{BlockType, Metadata};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub block_id: String,
    pub block_type: BlockType,
    /// Extracted plain text of the block
    pub content: String,
    pub notes: Option<String>,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Label-valued fields; absent or malformed means "no result"
    #[serde(default)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SanityCheckRequest {
    pub block_id: String,
    pub block_content: String,
    pub ai1_metadata: Value,
}

/// One proposed correction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSuggestion {
    pub field: String,
    #[serde(default)]
    pub original_value: Value,
    #[serde(default)]
    pub suggested_value: Value,
    #[serde(default)]
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyCorrectionsRequest {
    pub block_id: String,
    /// Wire field name to accepted value
    pub accepted_fields: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplyCorrectionsResponse {
    #[serde(default)]
    pub updated: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionStatus {
    Applied,
    Ignored,
}

/// A processed row in the suggestion log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionDecision {
    pub field: String,
    pub status: SuggestionStatus,
}

/// AI metadata service
///
/// Errors are transport-level failures; the workflow maps them to
/// `WorkflowError::Transport` and restores its previous state.
#[async_trait]
pub trait MetadataService: Send + Sync {
    async fn generate_metadata(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse>;

    /// Raw response body: an object with `suggestions` or `error`, or the
    /// same object encoded as a JSON string.
    async fn sanity_check(&self, request: &SanityCheckRequest) -> anyhow::Result<Value>;

    /// Suggestions recorded by an earlier sanity check and not yet processed
    async fn pending_suggestions(&self, block_id: &str) -> anyhow::Result<Vec<FieldSuggestion>>;

    async fn apply_corrections(
        &self,
        request: &ApplyCorrectionsRequest,
    ) -> anyhow::Result<ApplyCorrectionsResponse>;

    async fn record_decisions(
        &self,
        block_id: &str,
        decisions: &[SuggestionDecision],
    ) -> anyhow::Result<()>;

    async fn clear_raw_metadata(&self, block_id: &str) -> anyhow::Result<()>;
}
