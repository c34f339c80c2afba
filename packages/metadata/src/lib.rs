//! # Lectern Metadata
//!
//! AI-assisted learning metadata for lesson blocks.
//!
//! A block's metadata can be drafted by the AI metadata service, given a
//! second-opinion "sanity check", and corrected field by field after the
//! author accepts or ignores each suggestion. [`MetadataReviewWorkflow`]
//! drives those steps for one block; [`MetadataService`] is the boundary to
//! the service itself.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lectern_metadata::{Decision, MetadataReviewWorkflow};
//!
//! let mut workflow = MetadataReviewWorkflow::new();
//! workflow.generate(&mut block, &service).await?;
//! workflow.sanity_check(&block, &service).await?;
//! workflow.set_decision(MetadataField::Difficulty, Decision::Ignore)?;
//! workflow.apply_corrections(&mut block, &service).await?;
//! ```

mod errors;
pub mod merge;
pub mod options;
mod review;
mod service;
mod workflow;

pub use errors::{Result, ValidationError, WorkflowError};
pub use merge::MergeReport;
pub use options::MetadataOption;
pub use review::{parse_sanity_response, Decision, ReviewItem, SanityReview};
pub use service::{
    ApplyCorrectionsRequest, ApplyCorrectionsResponse, FieldSuggestion, GenerateRequest,
    GenerateResponse, MetadataService, SanityCheckRequest, SuggestionDecision, SuggestionStatus,
};
pub use workflow::{ApplyOutcome, MetadataReviewWorkflow, SanityOutcome, WorkflowState};
