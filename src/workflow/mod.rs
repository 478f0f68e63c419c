pub mod engine;
pub mod states;
pub mod types;

pub use engine::{WorkflowCollaborators, WorkflowEngine};
pub use states::{StepState, WorkflowState};
pub use types::{BatchSummary, SubjectOutcome, Workflow, WorkflowOptions, WorkflowStep};
