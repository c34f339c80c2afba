//! AI metadata service over HTTP
//!
//! ```text
//! POST   ai/generate-metadata
//! POST   ai/sanity-check
//! GET    ai/suggestions/{block_id}?status=pending
//! POST   ai/apply-corrections
//! POST   ai/suggestions/{block_id}/decisions
//! DELETE blocks/{block_id}/ai-metadata
//! ```

use crate::http::Client;
use anyhow::Context;
use async_trait::async_trait;
use lectern_metadata::{
    ApplyCorrectionsRequest, ApplyCorrectionsResponse, FieldSuggestion, GenerateRequest,
    GenerateResponse, MetadataService, SanityCheckRequest, SuggestionDecision,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

#[derive(Deserialize)]
#[serde(untagged)]
enum SuggestionList {
    Bare(Vec<FieldSuggestion>),
    Wrapped { suggestions: Vec<FieldSuggestion> },
}

#[derive(Serialize)]
struct DecisionBody<'a> {
    decisions: &'a [SuggestionDecision],
}

#[derive(Debug, Clone)]
pub struct HttpMetadataService {
    client: Client,
}

impl HttpMetadataService {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MetadataService for HttpMetadataService {
    #[instrument(level = "info", skip(self, request), fields(block_id = %request.block_id))]
    async fn generate_metadata(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        let response: Option<GenerateResponse> = self
            .client
            .post("ai/generate-metadata", request)
            .await
            .context("generating metadata")?;
        Ok(response.unwrap_or_default())
    }

    #[instrument(level = "info", skip(self, request), fields(block_id = %request.block_id))]
    async fn sanity_check(&self, request: &SanityCheckRequest) -> anyhow::Result<Value> {
        self.client
            .post("ai/sanity-check", request)
            .await
            .context("running sanity check")
    }

    #[instrument(level = "info", skip(self))]
    async fn pending_suggestions(&self, block_id: &str) -> anyhow::Result<Vec<FieldSuggestion>> {
        let list: Option<SuggestionList> = self
            .client
            .get(&format!("ai/suggestions/{}?status=pending", block_id))
            .await
            .context("loading pending suggestions")?;
        Ok(match list {
            Some(SuggestionList::Bare(s)) | Some(SuggestionList::Wrapped { suggestions: s }) => s,
            None => Vec::new(),
        })
    }

    #[instrument(level = "info", skip(self, request), fields(block_id = %request.block_id, fields = request.accepted_fields.len()))]
    async fn apply_corrections(
        &self,
        request: &ApplyCorrectionsRequest,
    ) -> anyhow::Result<ApplyCorrectionsResponse> {
        let response: Option<ApplyCorrectionsResponse> = self
            .client
            .post("ai/apply-corrections", request)
            .await
            .context("applying corrections")?;
        Ok(response.unwrap_or_default())
    }

    #[instrument(level = "info", skip(self, decisions), fields(count = decisions.len()))]
    async fn record_decisions(
        &self,
        block_id: &str,
        decisions: &[SuggestionDecision],
    ) -> anyhow::Result<()> {
        let _: Value = self
            .client
            .post(
                &format!("ai/suggestions/{}/decisions", block_id),
                &DecisionBody { decisions },
            )
            .await
            .context("recording suggestion decisions")?;
        Ok(())
    }

    #[instrument(level = "info", skip(self))]
    async fn clear_raw_metadata(&self, block_id: &str) -> anyhow::Result<()> {
        self.client
            .delete(&format!("blocks/{}/ai-metadata", block_id))
            .await
            .context("clearing raw AI metadata")
    }
}
