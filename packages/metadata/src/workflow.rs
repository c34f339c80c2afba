//! # Metadata Review Workflow
//!
//! Per-block state machine around the AI metadata service:
//!
//! ```text
//! Idle ──generate──▶ Generating ──▶ Generated ──dismiss──▶ Idle
//!                                      │
//!                                 sanity_check
//!                                      ▼
//!                               SanityChecking ──▶ Reviewing ──apply──▶ Applying ──▶ Idle
//! ```
//!
//! Every step that calls the service is all-or-nothing: the block and the
//! workflow are only changed after the service call succeeds, and a failure
//! puts the workflow back into the state it started from. `clear` is
//! available from any state and always ends in `Idle`.

use crate::errors::{Result, ValidationError, WorkflowError};
use crate::merge::{self, MergeReport};
use crate::review::{self, Decision, SanityReview};
use crate::service::{
    ApplyCorrectionsRequest, GenerateRequest, MetadataService, SanityCheckRequest,
    SuggestionDecision, SuggestionStatus,
};
use lectern_editor::{Block, MetadataField, MetadataSource};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkflowState {
    #[default]
    Idle,
    Generating,
    Generated,
    SanityChecking,
    Reviewing,
    Applying,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkflowState::Idle => "idle",
            WorkflowState::Generating => "generating metadata",
            WorkflowState::Generated => "showing generated metadata",
            WorkflowState::SanityChecking => "running a sanity check",
            WorkflowState::Reviewing => "reviewing suggestions",
            WorkflowState::Applying => "applying corrections",
        };
        f.write_str(s)
    }
}

/// Result of a sanity check
#[derive(Debug, Clone, PartialEq)]
pub enum SanityOutcome {
    /// A review with this many fields is open
    Review(usize),
    /// Neither the check nor the suggestion log had anything to review
    NoSuggestions,
}

/// Result of applying a review
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    /// Nothing was accepted or ignored; no request was made
    NothingToApply,
    Applied {
        applied: Vec<MetadataField>,
        ignored: Vec<MetadataField>,
    },
}

/// Review workflow for one block
#[derive(Debug, Clone, Default)]
pub struct MetadataReviewWorkflow {
    state: WorkflowState,
    review: Option<SanityReview>,
}

impl MetadataReviewWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn review(&self) -> Option<&SanityReview> {
        self.review.as_ref()
    }

    /// Ask the service for metadata and merge it into the block.
    #[instrument(level = "info", skip_all, fields(block_id = %block.id))]
    pub async fn generate(
        &mut self,
        block: &mut Block,
        service: &dyn MetadataService,
    ) -> Result<MergeReport> {
        self.require(&[WorkflowState::Idle, WorkflowState::Generated], "generate metadata")?;
        let content = ai_ready_text(block)?;

        let request = GenerateRequest {
            block_id: block.id.clone(),
            block_type: block.block_type(),
            content,
            notes: block.metadata.notes.clone(),
            metadata: block.metadata.clone(),
        };

        let prior = self.enter(WorkflowState::Generating);
        let response = match service.generate_metadata(&request).await {
            Ok(response) => response,
            Err(e) => return Err(self.fail(prior, WorkflowError::transport(e))),
        };

        let report = match response.metadata {
            Some(raw) => {
                let report = merge::merge_ai_metadata(&mut block.metadata, &raw);
                block.raw_ai_metadata = Some(raw);
                report
            }
            None => {
                warn!("Service returned no metadata");
                MergeReport::default()
            }
        };

        self.state = WorkflowState::Generated;
        info!(
            updated = report.updated.len(),
            unresolved = report.unresolved.len(),
            "Generated metadata"
        );
        Ok(report)
    }

    /// Leave the generated view without further checks
    pub fn dismiss(&mut self) -> Result<()> {
        self.require(&[WorkflowState::Generated], "dismiss generated metadata")?;
        self.state = WorkflowState::Idle;
        Ok(())
    }

    /// Run the second-opinion pass and open a review.
    ///
    /// When the check itself proposes nothing, suggestions still pending in
    /// the service's log are used instead so an earlier check can be resumed.
    /// A successful check replaces any unapplied review.
    #[instrument(level = "info", skip_all, fields(block_id = %block.id))]
    pub async fn sanity_check(
        &mut self,
        block: &Block,
        service: &dyn MetadataService,
    ) -> Result<SanityOutcome> {
        self.require(
            &[
                WorkflowState::Idle,
                WorkflowState::Generated,
                WorkflowState::Reviewing,
            ],
            "run a sanity check",
        )?;
        let block_content = ai_ready_text(block)?;

        let request = SanityCheckRequest {
            block_id: block.id.clone(),
            block_content,
            ai1_metadata: block
                .raw_ai_metadata
                .clone()
                .unwrap_or_else(|| serde_json::to_value(&block.metadata).unwrap_or(Value::Null)),
        };

        let prior = self.enter(WorkflowState::SanityChecking);
        let body = match service.sanity_check(&request).await {
            Ok(body) => body,
            Err(e) => return Err(self.fail(prior, WorkflowError::transport(e))),
        };
        let mut suggestions = match review::parse_sanity_response(&body) {
            Ok(suggestions) => suggestions,
            Err(e) => return Err(self.fail(prior, e)),
        };

        if suggestions.is_empty() {
            info!("Sanity check returned no suggestions; checking pending log");
            suggestions = match service.pending_suggestions(&block.id).await {
                Ok(pending) => pending,
                Err(e) => return Err(self.fail(prior, WorkflowError::transport(e))),
            };
        }

        let review = SanityReview::from_suggestions(block.id.clone(), suggestions);
        if self.review.is_some() {
            info!("Discarding unapplied review");
        }

        if review.is_empty() {
            self.review = None;
            self.state = WorkflowState::Idle;
            return Ok(SanityOutcome::NoSuggestions);
        }

        let count = review.len();
        self.review = Some(review);
        self.state = WorkflowState::Reviewing;
        info!(fields = count, "Opened review");
        Ok(SanityOutcome::Review(count))
    }

    pub fn set_decision(&mut self, field: MetadataField, decision: Decision) -> Result<()> {
        self.open_review("change a decision")?.set_decision(field, decision)
    }

    pub fn toggle_decision(&mut self, field: MetadataField) -> Result<Decision> {
        self.open_review("change a decision")?.toggle(field)
    }

    /// Send accepted corrections, log every decision and write the accepted
    /// values into the block. On failure the review is kept as it was.
    #[instrument(level = "info", skip_all, fields(block_id = %block.id))]
    pub async fn apply_corrections(
        &mut self,
        block: &mut Block,
        service: &dyn MetadataService,
    ) -> Result<ApplyOutcome> {
        let Some(review) = self.review.as_ref() else {
            self.require(
                &[WorkflowState::Idle, WorkflowState::Generated],
                "apply corrections",
            )?;
            info!("No review open; nothing to apply");
            return Ok(ApplyOutcome::NothingToApply);
        };
        self.require(&[WorkflowState::Reviewing], "apply corrections")?;

        let accepted = review.accepted();
        let ignored = review.ignored();
        if accepted.is_empty() && ignored.is_empty() {
            info!("Review is empty; nothing to apply");
            self.review = None;
            self.state = WorkflowState::Idle;
            return Ok(ApplyOutcome::NothingToApply);
        }

        // Accepted values that do not fit the field are logged as ignored
        let mut metadata = block.metadata.clone();
        let mut accepted_fields = Map::new();
        let mut applied = Vec::new();
        let mut ignored: Vec<MetadataField> = ignored.iter().map(|(field, _)| *field).collect();
        for (field, item) in &accepted {
            match merge::resolve_value(*field, &item.suggested_value) {
                Some(value) if metadata.set(*field, &value, MetadataSource::Ai).is_ok() => {
                    accepted_fields.insert(
                        field.wire_name().to_string(),
                        item.suggested_value.clone(),
                    );
                    applied.push(*field);
                }
                _ => {
                    warn!(%field, "Accepted value does not fit the field; ignoring it");
                    ignored.push(*field);
                }
            }
        }

        let decisions: Vec<SuggestionDecision> = applied
            .iter()
            .map(|field| (*field, SuggestionStatus::Applied))
            .chain(ignored.iter().map(|field| (*field, SuggestionStatus::Ignored)))
            .map(|(field, status)| SuggestionDecision {
                field: field.wire_name().to_string(),
                status,
            })
            .collect();

        let prior = self.enter(WorkflowState::Applying);
        if !accepted_fields.is_empty() {
            let request = ApplyCorrectionsRequest {
                block_id: block.id.clone(),
                accepted_fields,
            };
            if let Err(e) = service.apply_corrections(&request).await {
                return Err(self.fail(prior, WorkflowError::transport(e)));
            }
        }
        if let Err(e) = service.record_decisions(&block.id, &decisions).await {
            return Err(self.fail(prior, WorkflowError::transport(e)));
        }

        block.metadata = metadata;
        self.review = None;
        self.state = WorkflowState::Idle;
        info!(
            applied = applied.len(),
            ignored = ignored.len(),
            "Applied corrections"
        );
        Ok(ApplyOutcome::Applied { applied, ignored })
    }

    /// Reset the block's metadata. Saved blocks also lose their stored raw
    /// AI metadata; the local reset only happens once that succeeds.
    #[instrument(level = "info", skip_all, fields(block_id = %block.id))]
    pub async fn clear(&mut self, block: &mut Block, service: &dyn MetadataService) -> Result<()> {
        if block.saved_to_db {
            service
                .clear_raw_metadata(&block.id)
                .await
                .map_err(WorkflowError::transport)?;
        }
        block.metadata = Default::default();
        block.raw_ai_metadata = None;
        self.review = None;
        self.state = WorkflowState::Idle;
        info!("Cleared metadata");
        Ok(())
    }

    fn require(&self, allowed: &[WorkflowState], action: &'static str) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(WorkflowError::InvalidTransition {
                from: self.state,
                action,
            })
        }
    }

    fn open_review(&mut self, action: &'static str) -> Result<&mut SanityReview> {
        self.require(&[WorkflowState::Reviewing], action)?;
        self.review.as_mut().ok_or(WorkflowError::InvalidTransition {
            from: self.state,
            action,
        })
    }

    /// Enter an in-flight state, returning the state to restore on failure
    fn enter(&mut self, next: WorkflowState) -> WorkflowState {
        std::mem::replace(&mut self.state, next)
    }

    fn fail(&mut self, prior: WorkflowState, error: WorkflowError) -> WorkflowError {
        warn!(state = %self.state, error = %error, "Workflow step failed");
        self.state = prior;
        error
    }
}

/// AI endpoints need a durable id and something to read
fn ai_ready_text(block: &Block) -> Result<String> {
    if !block.saved_to_db {
        return Err(ValidationError::NotSaved.into());
    }
    let text = block.plain_text();
    if text.trim().is_empty() {
        return Err(ValidationError::NoText.into());
    }
    Ok(text)
}
