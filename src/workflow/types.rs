//! Workflow records, execution options, and batch summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

use crate::workflow::states::{StepState, WorkflowState};

/// One step of a workflow's fixed sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub index: usize,
    pub name: String,
    pub status: StepState,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl WorkflowStep {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            status: StepState::Pending,
            started_at: None,
            completed_at: None,
            error: None,
        }
    }
}

/// A workflow record, owned exclusively by the engine for its lifetime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: Uuid,
    pub subject: String,
    pub status: WorkflowState,
    pub steps: Vec<WorkflowStep>,
    /// Step results; holds entries only for steps with status completed
    pub results: HashMap<String, Value>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Workflow {
    pub fn new(subject: impl Into<String>, step_names: &[&str]) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject: subject.into(),
            status: WorkflowState::Running,
            steps: step_names
                .iter()
                .enumerate()
                .map(|(index, name)| WorkflowStep::new(index, *name))
                .collect(),
            results: HashMap::new(),
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn step(&self, name: &str) -> Option<&WorkflowStep> {
        self.steps.iter().find(|step| step.name == name)
    }

    /// Work items produced across all completed steps, summed from each
    /// step result's `work_items_created` entry
    pub fn work_items_created(&self) -> u64 {
        self.results
            .values()
            .filter_map(|value| value.get("work_items_created"))
            .filter_map(Value::as_u64)
            .sum()
    }
}

/// Recognized execution options. Unrecognized keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowOptions {
    /// Run the quality-check step (default true)
    #[serde(default = "default_true", alias = "runQA")]
    pub run_qa: bool,
    /// Run the release-integration step (default true)
    #[serde(default = "default_true", alias = "createRelease")]
    pub create_release: bool,
    /// Abort a batch on the first failing subject (default false)
    #[serde(default, alias = "stopOnError")]
    pub stop_on_error: bool,
    /// Fixed delay inserted between batch subjects, in milliseconds
    #[serde(default, alias = "delayMs")]
    pub delay_ms: u64,
}

fn default_true() -> bool {
    true
}

impl Default for WorkflowOptions {
    fn default() -> Self {
        Self {
            run_qa: true,
            create_release: true,
            stop_on_error: false,
            delay_ms: 0,
        }
    }
}

impl WorkflowOptions {
    /// Defaults seeded from the engine configuration
    pub fn from_config(config: &crate::config::CoreConfig) -> Self {
        Self {
            delay_ms: config.batch_delay_ms,
            ..Self::default()
        }
    }

    /// Parse an options map, applying defaults for absent keys
    pub fn from_value(value: &Value) -> crate::error::Result<Self> {
        serde_json::from_value(value.clone()).map_err(|e| {
            crate::error::CoreError::Configuration {
                message: format!("Invalid workflow options: {e}"),
            }
        })
    }
}

/// Outcome of one subject within a batch execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectOutcome {
    pub subject: String,
    pub succeeded: bool,
    pub work_items_created: u64,
    pub error: Option<String>,
}

/// Summary of a batch execution over an inclusive subject range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub range_start: u32,
    pub range_end: u32,
    pub successful: u32,
    pub failed: u32,
    pub total_work_items: u64,
    pub outcomes: Vec<SubjectOutcome>,
}

impl BatchSummary {
    /// Invariant: every subject in the range is accounted for exactly once
    pub fn is_complete(&self) -> bool {
        u64::from(self.successful) + u64::from(self.failed)
            == u64::from(self.range_end - self.range_start + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_options_default_true_unless_explicitly_false() {
        let options = WorkflowOptions::from_value(&json!({})).unwrap();
        assert!(options.run_qa);
        assert!(options.create_release);
        assert!(!options.stop_on_error);
        assert_eq!(options.delay_ms, 0);

        let options = WorkflowOptions::from_value(&json!({"run_qa": false})).unwrap();
        assert!(!options.run_qa);
        assert!(options.create_release);
    }

    #[test]
    fn test_options_accept_camel_case_aliases() {
        let options = WorkflowOptions::from_value(
            &json!({"runQA": false, "createRelease": false, "stopOnError": true, "delayMs": 250}),
        )
        .unwrap();
        assert!(!options.run_qa);
        assert!(!options.create_release);
        assert!(options.stop_on_error);
        assert_eq!(options.delay_ms, 250);
    }

    #[test]
    fn test_options_seeded_from_config() {
        let config = crate::config::CoreConfig {
            batch_delay_ms: 250,
            ..Default::default()
        };
        let options = WorkflowOptions::from_config(&config);
        assert_eq!(options.delay_ms, 250);
        assert!(options.run_qa);
        assert!(options.create_release);
        assert!(!options.stop_on_error);
    }

    #[test]
    fn test_work_items_created_sums_step_results() {
        let mut workflow = Workflow::new("3", &["planning", "learning_path_update"]);
        workflow
            .results
            .insert("planning".to_string(), json!({"lessons": 5}));
        workflow.results.insert(
            "learning_path_update".to_string(),
            json!({"work_items_created": 4}),
        );
        assert_eq!(workflow.work_items_created(), 4);
    }
}
