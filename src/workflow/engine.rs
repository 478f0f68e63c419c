//! # Workflow Engine
//!
//! ## Architecture: Weekly Content-Production Orchestration
//!
//! Executes the fixed step sequence for one content week (or a batch of
//! weeks): planning, content generation, analytics tracking, learning-path
//! update, optional release integration, optional quality check, and
//! completion. Steps run strictly sequentially; the first failing step
//! halts the sequence, marks the workflow failed with partial results
//! intact, and surfaces the error to the caller. There is no automatic
//! retry and no rollback of already-completed steps.
//!
//! Batch execution walks the subject range sequentially (never
//! concurrently, to bound collaborator load), records per-subject
//! outcomes, and continues past failures unless `stop_on_error` is set.
//!
//! Outcomes are announced on the event bus (`workflow.completed` /
//! `workflow.failed`) with the full workflow record attached.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use crate::constants::{events as bus_events, steps};
use crate::error::{CoreError, Result};
use crate::events::EventBus;
use crate::models::TaskStore;
use crate::scoring::{assign_behavior_tasks, UserBehavior};
use crate::workflow::states::{StepState, WorkflowState};
use crate::workflow::types::{BatchSummary, SubjectOutcome, Workflow, WorkflowOptions};

/// Seam to the collaborating subsystems each step drives. Implementations
/// are expected to suspend at every call; the engine holds no locks across
/// them. A hung collaborator call blocks the workflow indefinitely - the
/// engine imposes no deadline, so callers needing one should wrap their
/// implementation with `tokio::time::timeout`.
#[async_trait]
pub trait WorkflowCollaborators: Send + Sync {
    /// Plan the week's content outline
    async fn plan_week(&self, subject: &str) -> Result<Value>;

    /// Generate the planned content
    async fn generate_content(&self, subject: &str) -> Result<Value>;

    /// Record the week in the analytics subsystem
    async fn track_analytics(&self, subject: &str) -> Result<Value>;

    /// Behavior snapshots the learning-path step feeds to the assignment
    /// engine
    async fn behavior_snapshots(&self, subject: &str) -> Result<Vec<UserBehavior>>;

    /// Create the release for the week's content
    async fn create_release(&self, subject: &str) -> Result<Value>;

    /// Run the quality check over the generated content
    async fn run_quality_check(&self, subject: &str) -> Result<Value>;
}

/// Orchestrates the fixed weekly step sequence against the collaborator
/// seam, persisting engine-produced work items through the task store.
pub struct WorkflowEngine {
    collaborators: Arc<dyn WorkflowCollaborators>,
    store: Arc<dyn TaskStore>,
    bus: EventBus,
}

impl WorkflowEngine {
    pub fn new(
        collaborators: Arc<dyn WorkflowCollaborators>,
        store: Arc<dyn TaskStore>,
        bus: EventBus,
    ) -> Self {
        Self {
            collaborators,
            store,
            bus,
        }
    }

    fn step_sequence(options: &WorkflowOptions) -> Vec<&'static str> {
        let mut sequence = vec![
            steps::PLANNING,
            steps::CONTENT_GENERATION,
            steps::ANALYTICS_TRACKING,
            steps::LEARNING_PATH_UPDATE,
        ];
        if options.create_release {
            sequence.push(steps::RELEASE_INTEGRATION);
        }
        if options.run_qa {
            sequence.push(steps::QUALITY_CHECK);
        }
        sequence.push(steps::COMPLETION);
        sequence
    }

    /// Execute the full step sequence for one subject.
    ///
    /// Returns the completed workflow record, or the step error after
    /// marking the failing step and the workflow as failed. The failed
    /// record, partial results included, is published on the bus before
    /// the error propagates.
    #[instrument(skip(self, options), fields(subject = %subject))]
    pub async fn execute_workflow(
        &self,
        subject: &str,
        options: &WorkflowOptions,
    ) -> Result<Workflow> {
        let (workflow, outcome) = self.run(subject, options).await;
        match outcome {
            Ok(()) => Ok(workflow),
            Err(err) => Err(err),
        }
    }

    /// Execute the sequence and always hand back the workflow record, even
    /// on failure. Batch execution uses this to aggregate partial results.
    pub async fn run(
        &self,
        subject: &str,
        options: &WorkflowOptions,
    ) -> (Workflow, Result<()>) {
        let sequence = Self::step_sequence(options);
        let mut workflow = Workflow::new(subject, &sequence);
        info!(
            workflow_id = %workflow.id,
            subject = %subject,
            step_count = sequence.len(),
            "Starting workflow"
        );
        self.publish_record(bus_events::WORKFLOW_STARTED, &workflow);

        for index in 0..workflow.steps.len() {
            let step_name = workflow.steps[index].name.clone();
            workflow.steps[index].status = StepState::Running;
            workflow.steps[index].started_at = Some(Utc::now());
            debug!(subject = %subject, step = %step_name, "Step started");

            match self.run_step(&step_name, subject, &workflow).await {
                Ok(result) => {
                    let step = &mut workflow.steps[index];
                    step.status = StepState::Completed;
                    step.completed_at = Some(Utc::now());
                    workflow.results.insert(step_name.clone(), result);
                    self.bus.publish(
                        bus_events::WORKFLOW_STEP_COMPLETED,
                        json!({"workflow_id": workflow.id, "step": step_name}),
                    );
                }
                Err(err) => {
                    let message = err.to_string();
                    let step = &mut workflow.steps[index];
                    step.status = StepState::Failed;
                    step.completed_at = Some(Utc::now());
                    step.error = Some(message.clone());
                    workflow.status = WorkflowState::Failed;
                    workflow.completed_at = Some(Utc::now());
                    error!(
                        workflow_id = %workflow.id,
                        subject = %subject,
                        step = %step_name,
                        error = %message,
                        "Workflow failed"
                    );
                    self.publish_record(bus_events::WORKFLOW_FAILED, &workflow);
                    return (workflow, Err(CoreError::step(subject, step_name, message)));
                }
            }
        }

        workflow.status = WorkflowState::Completed;
        workflow.completed_at = Some(Utc::now());
        info!(
            workflow_id = %workflow.id,
            subject = %subject,
            work_items = workflow.work_items_created(),
            "Workflow completed"
        );
        self.publish_record(bus_events::WORKFLOW_COMPLETED, &workflow);
        (workflow, Ok(()))
    }

    async fn run_step(&self, step_name: &str, subject: &str, workflow: &Workflow) -> Result<Value> {
        match step_name {
            steps::PLANNING => self.collaborators.plan_week(subject).await,
            steps::CONTENT_GENERATION => self.collaborators.generate_content(subject).await,
            steps::ANALYTICS_TRACKING => self.collaborators.track_analytics(subject).await,
            steps::LEARNING_PATH_UPDATE => self.update_learning_paths(subject).await,
            steps::RELEASE_INTEGRATION => self.collaborators.create_release(subject).await,
            steps::QUALITY_CHECK => self.collaborators.run_quality_check(subject).await,
            steps::COMPLETION => Ok(json!({
                "steps_completed": workflow
                    .steps
                    .iter()
                    .filter(|step| step.status == StepState::Completed)
                    .count(),
                "subject": subject,
            })),
            other => Err(CoreError::step(subject, other, "Unknown step name")),
        }
    }

    /// Learning-path step: feed collaborator behavior snapshots through the
    /// behavior-assignment engine and persist the resulting work items.
    async fn update_learning_paths(&self, subject: &str) -> Result<Value> {
        let snapshots = self.collaborators.behavior_snapshots(subject).await?;
        let now = Utc::now();
        let mut created = 0u64;
        for snapshot in &snapshots {
            for descriptor in assign_behavior_tasks(snapshot) {
                self.store.create(descriptor.into_work_item(now)).await?;
                created += 1;
            }
        }
        debug!(
            subject = %subject,
            snapshots = snapshots.len(),
            work_items_created = created,
            "Learning paths updated"
        );
        Ok(json!({
            "snapshots_evaluated": snapshots.len(),
            "work_items_created": created,
        }))
    }

    /// Execute one workflow per subject in the inclusive range,
    /// sequentially. Per-subject failures are recorded and the batch
    /// continues unless `stop_on_error` is set, in which case the first
    /// failure propagates immediately.
    #[instrument(skip(self, options))]
    pub async fn execute_batch(
        &self,
        range_start: u32,
        range_end: u32,
        options: &WorkflowOptions,
    ) -> Result<BatchSummary> {
        if range_start > range_end {
            return Err(CoreError::Configuration {
                message: format!("Invalid batch range: {range_start}..={range_end}"),
            });
        }

        let mut summary = BatchSummary {
            range_start,
            range_end,
            successful: 0,
            failed: 0,
            total_work_items: 0,
            outcomes: Vec::new(),
        };

        for subject_number in range_start..=range_end {
            let subject = subject_number.to_string();
            let (workflow, outcome) = self.run(&subject, options).await;
            let work_items = workflow.work_items_created();
            summary.total_work_items += work_items;

            match outcome {
                Ok(()) => {
                    summary.successful += 1;
                    summary.outcomes.push(SubjectOutcome {
                        subject,
                        succeeded: true,
                        work_items_created: work_items,
                        error: None,
                    });
                }
                Err(err) => {
                    summary.failed += 1;
                    summary.outcomes.push(SubjectOutcome {
                        subject: subject.clone(),
                        succeeded: false,
                        work_items_created: work_items,
                        error: Some(err.to_string()),
                    });
                    if options.stop_on_error {
                        warn!(subject = %subject, "Batch aborted by stop_on_error");
                        return Err(err);
                    }
                }
            }

            if options.delay_ms > 0 && subject_number < range_end {
                tokio::time::sleep(Duration::from_millis(options.delay_ms)).await;
            }
        }

        info!(
            successful = summary.successful,
            failed = summary.failed,
            total_work_items = summary.total_work_items,
            "Batch finished"
        );
        Ok(summary)
    }

    fn publish_record(&self, event_name: &str, workflow: &Workflow) {
        let record = serde_json::to_value(workflow).unwrap_or_else(|_| json!(null));
        // Publishing never fails the workflow itself
        self.bus.publish(event_name, record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InMemoryTaskStore;
    use parking_lot::Mutex;

    /// Stub collaborators that fail at one configurable step
    struct StubCollaborators {
        failing_step: Option<&'static str>,
        failing_subjects: Vec<String>,
        calls: Mutex<Vec<String>>,
    }

    impl StubCollaborators {
        fn healthy() -> Self {
            Self {
                failing_step: None,
                failing_subjects: Vec::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing_at(step: &'static str) -> Self {
            Self {
                failing_step: Some(step),
                failing_subjects: Vec::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing_for_subjects(step: &'static str, subjects: &[&str]) -> Self {
            Self {
                failing_step: Some(step),
                failing_subjects: subjects.iter().map(ToString::to_string).collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn respond(&self, step: &'static str, subject: &str) -> Result<Value> {
            self.calls.lock().push(step.to_string());
            let subject_matches =
                self.failing_subjects.is_empty() || self.failing_subjects.contains(&subject.to_string());
            if self.failing_step == Some(step) && subject_matches {
                return Err(CoreError::step(subject, step, "collaborator unavailable"));
            }
            Ok(json!({"step": step, "subject": subject}))
        }
    }

    #[async_trait]
    impl WorkflowCollaborators for StubCollaborators {
        async fn plan_week(&self, subject: &str) -> Result<Value> {
            self.respond(steps::PLANNING, subject)
        }

        async fn generate_content(&self, subject: &str) -> Result<Value> {
            self.respond(steps::CONTENT_GENERATION, subject)
        }

        async fn track_analytics(&self, subject: &str) -> Result<Value> {
            self.respond(steps::ANALYTICS_TRACKING, subject)
        }

        async fn behavior_snapshots(&self, subject: &str) -> Result<Vec<UserBehavior>> {
            self.respond(steps::LEARNING_PATH_UPDATE, subject)?;
            Ok(vec![UserBehavior {
                user_id: format!("user-{subject}"),
                engagement_score: 85,
                conversion_likelihood: 0.9,
                email_open_rate: 0.5,
                ..Default::default()
            }])
        }

        async fn create_release(&self, subject: &str) -> Result<Value> {
            self.respond(steps::RELEASE_INTEGRATION, subject)
        }

        async fn run_quality_check(&self, subject: &str) -> Result<Value> {
            self.respond(steps::QUALITY_CHECK, subject)
        }
    }

    fn engine(collaborators: StubCollaborators) -> (WorkflowEngine, Arc<InMemoryTaskStore>) {
        let store = Arc::new(InMemoryTaskStore::new());
        let engine = WorkflowEngine::new(
            Arc::new(collaborators),
            store.clone(),
            EventBus::default(),
        );
        (engine, store)
    }

    #[tokio::test]
    async fn test_full_sequence_completes() {
        let (engine, store) = engine(StubCollaborators::healthy());
        let workflow = engine
            .execute_workflow("10", &WorkflowOptions::default())
            .await
            .unwrap();

        assert_eq!(workflow.status, WorkflowState::Completed);
        assert_eq!(workflow.steps.len(), 7);
        assert!(workflow
            .steps
            .iter()
            .all(|step| step.status == StepState::Completed));
        assert!(workflow.results.contains_key(steps::QUALITY_CHECK));
        assert!(workflow.results.contains_key(steps::RELEASE_INTEGRATION));
        // learning-path step produced and persisted a sales-outreach item
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_optional_steps_skipped_when_disabled() {
        let (engine, _store) = engine(StubCollaborators::healthy());
        let options = WorkflowOptions {
            run_qa: false,
            create_release: false,
            ..Default::default()
        };
        let workflow = engine.execute_workflow("10", &options).await.unwrap();

        assert_eq!(workflow.status, WorkflowState::Completed);
        assert_eq!(workflow.steps.len(), 5);
        assert!(workflow.step(steps::QUALITY_CHECK).is_none());
        assert!(workflow.step(steps::RELEASE_INTEGRATION).is_none());
        assert!(!workflow.results.contains_key(steps::QUALITY_CHECK));
        assert!(!workflow.results.contains_key(steps::RELEASE_INTEGRATION));
    }

    #[tokio::test]
    async fn test_failed_step_halts_all_later_steps() {
        let (engine, _store) = engine(StubCollaborators::failing_at(steps::CONTENT_GENERATION));
        let (workflow, outcome) = engine.run("3", &WorkflowOptions::default()).await;

        assert!(outcome.is_err());
        assert_eq!(workflow.status, WorkflowState::Failed);

        let failed_index = workflow
            .steps
            .iter()
            .position(|step| step.status == StepState::Failed)
            .unwrap();
        assert_eq!(workflow.steps[failed_index].name, steps::CONTENT_GENERATION);
        assert!(workflow.steps[failed_index].error.is_some());
        for step in &workflow.steps[failed_index + 1..] {
            assert_eq!(step.status, StepState::Pending);
        }
        // results only for completed steps
        assert_eq!(workflow.results.len(), 1);
        assert!(workflow.results.contains_key(steps::PLANNING));
    }

    #[tokio::test]
    async fn test_failure_publishes_failed_record() {
        let store = Arc::new(InMemoryTaskStore::new());
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let engine = WorkflowEngine::new(
            Arc::new(StubCollaborators::failing_at(steps::PLANNING)),
            store,
            bus,
        );

        let result = engine.execute_workflow("5", &WorkflowOptions::default()).await;
        assert!(result.is_err());

        // started, then failed
        let started = rx.recv().await.unwrap();
        assert_eq!(started.name, bus_events::WORKFLOW_STARTED);
        let failed = rx.recv().await.unwrap();
        assert_eq!(failed.name, bus_events::WORKFLOW_FAILED);
        assert_eq!(failed.context["status"], "failed");
    }

    #[tokio::test]
    async fn test_batch_counts_always_cover_range() {
        let (engine, _store) = engine(StubCollaborators::failing_for_subjects(
            steps::ANALYTICS_TRACKING,
            &["2", "4"],
        ));
        let summary = engine
            .execute_batch(1, 5, &WorkflowOptions::default())
            .await
            .unwrap();

        assert_eq!(summary.successful, 3);
        assert_eq!(summary.failed, 2);
        assert!(summary.is_complete());
        assert_eq!(summary.outcomes.len(), 5);
        assert!(summary.outcomes[1].error.is_some());
        // successful subjects each produced one sales-outreach item
        assert_eq!(summary.total_work_items, 3);
    }

    #[tokio::test]
    async fn test_batch_stop_on_error_propagates_immediately() {
        let (engine, _store) = engine(StubCollaborators::failing_for_subjects(
            steps::PLANNING,
            &["2"],
        ));
        let options = WorkflowOptions {
            stop_on_error: true,
            ..Default::default()
        };
        let err = engine.execute_batch(1, 5, &options).await.unwrap_err();
        assert!(matches!(err, CoreError::Step { .. }));
    }

    #[tokio::test]
    async fn test_batch_rejects_inverted_range() {
        let (engine, _store) = engine(StubCollaborators::healthy());
        assert!(engine
            .execute_batch(5, 1, &WorkflowOptions::default())
            .await
            .is_err());
    }
}
