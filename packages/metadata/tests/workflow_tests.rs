//! Workflow tests against a scripted metadata service

use async_trait::async_trait;
use lectern_editor::{Block, BlockContent, MetadataField, MetadataSource};
use lectern_metadata::{
    ApplyCorrectionsRequest, ApplyCorrectionsResponse, ApplyOutcome, Decision, FieldSuggestion,
    GenerateRequest, GenerateResponse, MetadataReviewWorkflow, MetadataService, SanityCheckRequest,
    SanityOutcome, SuggestionDecision, SuggestionStatus, ValidationError, WorkflowError,
    WorkflowState,
};
use serde_json::{json, Value};
use std::sync::Mutex;

#[derive(Default)]
struct ScriptedService {
    generate: Mutex<Option<Value>>,
    sanity: Mutex<Value>,
    pending: Mutex<Vec<FieldSuggestion>>,
    fail: Mutex<Vec<&'static str>>,
    calls: Mutex<Vec<String>>,
    applied: Mutex<Vec<ApplyCorrectionsRequest>>,
    decisions: Mutex<Vec<SuggestionDecision>>,
}

impl ScriptedService {
    fn new() -> Self {
        let service = Self::default();
        *service.sanity.lock().unwrap() = json!({ "suggestions": [] });
        service
    }

    fn with_generate(self, metadata: Value) -> Self {
        *self.generate.lock().unwrap() = Some(metadata);
        self
    }

    fn with_sanity(self, body: Value) -> Self {
        *self.sanity.lock().unwrap() = body;
        self
    }

    fn with_pending(self, pending: Vec<FieldSuggestion>) -> Self {
        *self.pending.lock().unwrap() = pending;
        self
    }

    fn failing(&self, call: &'static str) {
        self.fail.lock().unwrap().push(call);
    }

    fn recover(&self) {
        self.fail.lock().unwrap().clear();
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push(call.to_string());
        if self.fail.lock().unwrap().contains(&call) {
            anyhow::bail!("{} unavailable", call);
        }
        Ok(())
    }
}

#[async_trait]
impl MetadataService for ScriptedService {
    async fn generate_metadata(&self, _request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        self.record("generate")?;
        Ok(GenerateResponse {
            metadata: self.generate.lock().unwrap().clone(),
        })
    }

    async fn sanity_check(&self, _request: &SanityCheckRequest) -> anyhow::Result<Value> {
        self.record("sanity")?;
        Ok(self.sanity.lock().unwrap().clone())
    }

    async fn pending_suggestions(&self, _block_id: &str) -> anyhow::Result<Vec<FieldSuggestion>> {
        self.record("pending")?;
        Ok(self.pending.lock().unwrap().clone())
    }

    async fn apply_corrections(
        &self,
        request: &ApplyCorrectionsRequest,
    ) -> anyhow::Result<ApplyCorrectionsResponse> {
        self.record("apply")?;
        self.applied.lock().unwrap().push(request.clone());
        Ok(ApplyCorrectionsResponse {
            updated: json!(true),
        })
    }

    async fn record_decisions(
        &self,
        _block_id: &str,
        decisions: &[SuggestionDecision],
    ) -> anyhow::Result<()> {
        self.record("decisions")?;
        self.decisions.lock().unwrap().extend_from_slice(decisions);
        Ok(())
    }

    async fn clear_raw_metadata(&self, _block_id: &str) -> anyhow::Result<()> {
        self.record("clear")
    }
}

fn saved_paragraph(text: &str) -> Block {
    let mut block = Block::with_content(BlockContent::Paragraph {
        body: format!("<p>{}</p>", text),
    });
    block.id = "db-1".to_string();
    block.saved_to_db = true;
    block
}

fn two_suggestions() -> Value {
    json!({
        "suggestions": [
            { "field": "difficulty", "original_value": 8, "suggested_value": 4, "reason": "short passage", "confidence": 0.9 },
            { "field": "cognitive_skill", "original_value": "remember", "suggested_value": "Understand", "reason": "asks for explanation" }
        ]
    })
}

#[tokio::test]
async fn test_generate_keeps_human_value_on_null() {
    let service = ScriptedService::new().with_generate(json!({
        "behaviourTag": null,
        "cognitiveSkill": "Apply",
        "difficulty": 5
    }));
    let mut block = saved_paragraph("Solve for x");
    block
        .metadata
        .set_by_author(MetadataField::BehaviourTag, &json!("recall"))
        .unwrap();

    let mut workflow = MetadataReviewWorkflow::new();
    let report = workflow.generate(&mut block, &service).await.unwrap();

    assert_eq!(workflow.state(), WorkflowState::Generated);
    assert_eq!(
        report.updated,
        vec![MetadataField::CognitiveSkill, MetadataField::Difficulty]
    );
    assert_eq!(block.metadata.behaviour_tag.as_deref(), Some("recall"));
    assert_eq!(
        block.metadata.field_source(MetadataField::BehaviourTag),
        Some(MetadataSource::Human)
    );
    assert_eq!(block.metadata.cognitive_skill.as_deref(), Some("apply"));
    assert_eq!(
        block.metadata.field_source(MetadataField::CognitiveSkill),
        Some(MetadataSource::Ai)
    );
    assert!(block.raw_ai_metadata.is_some());
}

#[tokio::test]
async fn test_generate_validation_makes_no_call() {
    let service = ScriptedService::new().with_generate(json!({}));
    let mut workflow = MetadataReviewWorkflow::new();

    let mut unsaved = saved_paragraph("text");
    unsaved.saved_to_db = false;
    let result = workflow.generate(&mut unsaved, &service).await;
    assert_eq!(
        result.unwrap_err(),
        WorkflowError::Validation(ValidationError::NotSaved)
    );

    let mut empty = saved_paragraph("  ");
    let result = workflow.generate(&mut empty, &service).await;
    assert_eq!(
        result.unwrap_err(),
        WorkflowError::Validation(ValidationError::NoText)
    );

    assert!(service.calls().is_empty());
    assert_eq!(workflow.state(), WorkflowState::Idle);
}

#[tokio::test]
async fn test_generate_failure_restores_state() {
    let service = ScriptedService::new().with_generate(json!({ "difficulty": 3 }));
    service.failing("generate");
    let mut block = saved_paragraph("Cells divide");
    let before = block.clone();

    let mut workflow = MetadataReviewWorkflow::new();
    let result = workflow.generate(&mut block, &service).await;
    assert!(matches!(result, Err(WorkflowError::Transport(_))));
    assert_eq!(workflow.state(), WorkflowState::Idle);
    assert_eq!(block, before);
}

#[tokio::test]
async fn test_missing_metadata_is_empty_result() {
    let service = ScriptedService::new();
    let mut block = saved_paragraph("Cells divide");
    let mut workflow = MetadataReviewWorkflow::new();

    let report = workflow.generate(&mut block, &service).await.unwrap();
    assert!(report.updated.is_empty());
    assert!(block.metadata.is_empty());
    assert_eq!(workflow.state(), WorkflowState::Generated);
}

#[tokio::test]
async fn test_sanity_check_accepts_string_body() {
    let service = ScriptedService::new().with_sanity(Value::String(two_suggestions().to_string()));
    let block = saved_paragraph("Explain osmosis");
    let mut workflow = MetadataReviewWorkflow::new();

    let outcome = workflow.sanity_check(&block, &service).await.unwrap();
    assert_eq!(outcome, SanityOutcome::Review(2));
    assert_eq!(workflow.state(), WorkflowState::Reviewing);

    let review = workflow.review().unwrap();
    assert_eq!(review.decision(MetadataField::Difficulty), Some(Decision::Accept));
    assert_eq!(review.decision(MetadataField::CognitiveSkill), Some(Decision::Accept));
    assert_eq!(service.calls(), vec!["sanity"]);
}

#[tokio::test]
async fn test_sanity_check_falls_back_to_pending() {
    let pending = vec![FieldSuggestion {
        field: "learningPattern".to_string(),
        original_value: Value::Null,
        suggested_value: json!("Retrieval practice"),
        reason: "quiz style".to_string(),
        confidence: None,
    }];
    let service = ScriptedService::new().with_pending(pending);
    let block = saved_paragraph("Quiz time");
    let mut workflow = MetadataReviewWorkflow::new();

    let outcome = workflow.sanity_check(&block, &service).await.unwrap();
    assert_eq!(outcome, SanityOutcome::Review(1));
    assert_eq!(service.calls(), vec!["sanity", "pending"]);
}

#[tokio::test]
async fn test_sanity_check_with_nothing_returns_to_idle() {
    let service = ScriptedService::new();
    let block = saved_paragraph("Quiz time");
    let mut workflow = MetadataReviewWorkflow::new();

    let outcome = workflow.sanity_check(&block, &service).await.unwrap();
    assert_eq!(outcome, SanityOutcome::NoSuggestions);
    assert_eq!(workflow.state(), WorkflowState::Idle);
    assert!(workflow.review().is_none());
}

#[tokio::test]
async fn test_sanity_error_body_keeps_previous_review() {
    let service = ScriptedService::new().with_sanity(two_suggestions());
    let block = saved_paragraph("Explain osmosis");
    let mut workflow = MetadataReviewWorkflow::new();
    workflow.sanity_check(&block, &service).await.unwrap();
    workflow
        .set_decision(MetadataField::Difficulty, Decision::Ignore)
        .unwrap();

    *service.sanity.lock().unwrap() = json!({ "error": "rate limited" });
    let result = workflow.sanity_check(&block, &service).await;
    assert_eq!(
        result.unwrap_err(),
        WorkflowError::Service("rate limited".to_string())
    );
    assert_eq!(workflow.state(), WorkflowState::Reviewing);
    assert_eq!(
        workflow.review().unwrap().decision(MetadataField::Difficulty),
        Some(Decision::Ignore)
    );
}

#[tokio::test]
async fn test_apply_partitions_decisions() {
    let service = ScriptedService::new().with_sanity(two_suggestions());
    let mut block = saved_paragraph("Explain osmosis");
    block
        .metadata
        .set_by_author(MetadataField::Difficulty, &json!(8))
        .unwrap();

    let mut workflow = MetadataReviewWorkflow::new();
    workflow.sanity_check(&block, &service).await.unwrap();
    assert_eq!(
        workflow.toggle_decision(MetadataField::Difficulty).unwrap(),
        Decision::Ignore
    );

    let outcome = workflow.apply_corrections(&mut block, &service).await.unwrap();
    assert_eq!(
        outcome,
        ApplyOutcome::Applied {
            applied: vec![MetadataField::CognitiveSkill],
            ignored: vec![MetadataField::Difficulty],
        }
    );
    assert_eq!(workflow.state(), WorkflowState::Idle);
    assert!(workflow.review().is_none());

    assert_eq!(block.metadata.cognitive_skill.as_deref(), Some("understand"));
    assert_eq!(
        block.metadata.field_source(MetadataField::CognitiveSkill),
        Some(MetadataSource::Ai)
    );
    assert_eq!(block.metadata.difficulty, Some(8));

    let applied = service.applied.lock().unwrap();
    assert_eq!(applied.len(), 1);
    assert_eq!(applied[0].accepted_fields.len(), 1);
    assert_eq!(applied[0].accepted_fields["cognitive_skill"], json!("Understand"));

    let decisions = service.decisions.lock().unwrap();
    assert!(decisions
        .iter()
        .any(|d| d.field == "cognitive_skill" && d.status == SuggestionStatus::Applied));
    assert!(decisions
        .iter()
        .any(|d| d.field == "difficulty" && d.status == SuggestionStatus::Ignored));
}

#[tokio::test]
async fn test_unfit_accepted_values_are_not_sent() {
    let service = ScriptedService::new().with_sanity(json!({
        "suggestions": [
            { "field": "difficulty", "original_value": 3, "suggested_value": 12, "reason": "harder" },
            { "field": "cognitive_skill", "original_value": "remember", "suggested_value": "Daydream", "reason": "?" },
            { "field": "behaviour_tag", "original_value": null, "suggested_value": null, "reason": "none" },
            { "field": "learning_pattern", "original_value": null, "suggested_value": "Scaffolded practice", "reason": "steps" }
        ]
    }));
    let mut block = saved_paragraph("Explain osmosis");
    block
        .metadata
        .set_by_author(MetadataField::Difficulty, &json!(3))
        .unwrap();

    let mut workflow = MetadataReviewWorkflow::new();
    workflow.sanity_check(&block, &service).await.unwrap();
    let outcome = workflow.apply_corrections(&mut block, &service).await.unwrap();

    let ApplyOutcome::Applied { applied, ignored } = outcome else {
        panic!("expected applied corrections");
    };
    assert_eq!(applied, vec![MetadataField::LearningPattern]);
    assert_eq!(ignored.len(), 3);
    assert!(ignored.contains(&MetadataField::Difficulty));
    assert!(ignored.contains(&MetadataField::CognitiveSkill));
    assert!(ignored.contains(&MetadataField::BehaviourTag));
    assert_eq!(block.metadata.difficulty, Some(3));

    let sent = service.applied.lock().unwrap();
    assert_eq!(sent.len(), 1);
    let keys: Vec<&String> = sent[0].accepted_fields.keys().collect();
    assert_eq!(keys, vec!["learning_pattern"]);

    let decisions = service.decisions.lock().unwrap();
    assert!(decisions
        .iter()
        .any(|d| d.field == "difficulty" && d.status == SuggestionStatus::Ignored));
    assert!(decisions
        .iter()
        .all(|d| d.status == SuggestionStatus::Ignored || d.field == "learning_pattern"));
}

#[tokio::test]
async fn test_all_unfit_accepted_values_skip_corrections_endpoint() {
    let service = ScriptedService::new().with_sanity(json!({
        "suggestions": [
            { "field": "difficulty", "original_value": 3, "suggested_value": 12, "reason": "harder" }
        ]
    }));
    let mut block = saved_paragraph("Explain osmosis");
    let mut workflow = MetadataReviewWorkflow::new();
    workflow.sanity_check(&block, &service).await.unwrap();

    let outcome = workflow.apply_corrections(&mut block, &service).await.unwrap();
    assert_eq!(
        outcome,
        ApplyOutcome::Applied {
            applied: vec![],
            ignored: vec![MetadataField::Difficulty],
        }
    );
    assert_eq!(service.calls(), vec!["sanity", "decisions"]);
}

#[tokio::test]
async fn test_all_ignored_skips_corrections_endpoint() {
    let service = ScriptedService::new().with_sanity(two_suggestions());
    let mut block = saved_paragraph("Explain osmosis");
    let mut workflow = MetadataReviewWorkflow::new();
    workflow.sanity_check(&block, &service).await.unwrap();
    workflow
        .set_decision(MetadataField::Difficulty, Decision::Ignore)
        .unwrap();
    workflow
        .set_decision(MetadataField::CognitiveSkill, Decision::Ignore)
        .unwrap();

    let before = block.metadata.clone();
    workflow.apply_corrections(&mut block, &service).await.unwrap();
    assert_eq!(service.calls(), vec!["sanity", "decisions"]);
    assert_eq!(block.metadata, before);
}

#[tokio::test]
async fn test_apply_with_nothing_makes_no_call() {
    let service = ScriptedService::new();
    let mut block = saved_paragraph("Anything");
    let before = block.metadata.clone();
    let mut workflow = MetadataReviewWorkflow::new();

    let outcome = workflow.apply_corrections(&mut block, &service).await.unwrap();
    assert_eq!(outcome, ApplyOutcome::NothingToApply);
    assert!(service.calls().is_empty());
    assert_eq!(block.metadata, before);
}

#[tokio::test]
async fn test_failed_apply_keeps_review() {
    let service = ScriptedService::new().with_sanity(two_suggestions());
    let mut block = saved_paragraph("Explain osmosis");
    let mut workflow = MetadataReviewWorkflow::new();
    workflow.sanity_check(&block, &service).await.unwrap();
    workflow
        .set_decision(MetadataField::Difficulty, Decision::Ignore)
        .unwrap();
    let review = workflow.review().cloned();
    let before = block.metadata.clone();

    service.failing("apply");
    let result = workflow.apply_corrections(&mut block, &service).await;
    assert!(matches!(result, Err(WorkflowError::Transport(_))));
    assert_eq!(workflow.state(), WorkflowState::Reviewing);
    assert_eq!(workflow.review().cloned(), review);
    assert_eq!(block.metadata, before);

    service.recover();
    workflow.apply_corrections(&mut block, &service).await.unwrap();
    assert_eq!(block.metadata.cognitive_skill.as_deref(), Some("understand"));
}

#[tokio::test]
async fn test_generate_rejected_while_reviewing() {
    let service = ScriptedService::new().with_sanity(two_suggestions());
    let mut block = saved_paragraph("Explain osmosis");
    let mut workflow = MetadataReviewWorkflow::new();
    workflow.sanity_check(&block, &service).await.unwrap();

    let result = workflow.generate(&mut block, &service).await;
    assert!(matches!(
        result,
        Err(WorkflowError::InvalidTransition {
            from: WorkflowState::Reviewing,
            ..
        })
    ));
}

#[tokio::test]
async fn test_clear_from_review() {
    let service = ScriptedService::new()
        .with_generate(json!({ "difficulty": 2 }))
        .with_sanity(two_suggestions());
    let mut block = saved_paragraph("Explain osmosis");
    let mut workflow = MetadataReviewWorkflow::new();
    workflow.generate(&mut block, &service).await.unwrap();
    workflow.sanity_check(&block, &service).await.unwrap();

    workflow.clear(&mut block, &service).await.unwrap();
    assert_eq!(workflow.state(), WorkflowState::Idle);
    assert!(workflow.review().is_none());
    assert!(block.metadata.is_empty());
    assert!(block.raw_ai_metadata.is_none());
    assert_eq!(service.calls().last().map(String::as_str), Some("clear"));
}

#[tokio::test]
async fn test_clear_unsaved_block_is_local() {
    let service = ScriptedService::new();
    let mut block = saved_paragraph("Draft");
    block.saved_to_db = false;
    block
        .metadata
        .set_by_author(MetadataField::Notes, &json!("keep it short"))
        .unwrap();

    MetadataReviewWorkflow::new()
        .clear(&mut block, &service)
        .await
        .unwrap();
    assert!(block.metadata.is_empty());
    assert!(service.calls().is_empty());
}
