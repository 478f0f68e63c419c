//! # Decision Engines
//!
//! Pure scoring and routing functions that turn raw business events into
//! prioritized work-item descriptors. No engine performs I/O; the event
//! router and the workflow engine's learning-path step call them and
//! materialize the results.

pub mod behavior;
pub mod lead;
pub mod support;

pub use behavior::{assign_behavior_tasks, UserBehavior};
pub use lead::{route_lead, score_lead, LeadAssessment};
pub use support::{route_support, SupportRoute};
