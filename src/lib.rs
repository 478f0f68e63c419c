//! # CourseOps Core
//!
//! Workflow orchestration and event-triggered task routing for online
//! course operations. The core turns external business events (purchases,
//! lead captures, support requests) into prioritized, assigned, time-bound
//! work items, and runs the multi-step weekly content-production workflow
//! with partial-failure semantics.
//!
//! ## Architecture
//!
//! - **Decision engines** ([`scoring`]): pure functions that score or route
//!   an event into work-item descriptors (lead scoring, support routing,
//!   behavior-based assignment).
//! - **Event router** ([`routing`]): validates a named business event
//!   against the closed type set, invokes the fixed handler for its type,
//!   then expands every dynamically registered trigger via template
//!   interpolation.
//! - **Workflow engine** ([`workflow`]): drives the fixed weekly step
//!   sequence with fail-fast semantics and sequential batch execution.
//! - **Service registry & health monitor** ([`registry`]): owns the
//!   collaborating subsystems, starts them concurrently (fail-fast join),
//!   and polls their health on a fixed interval.
//! - **Event bus** ([`events`]): in-process publish/subscribe carrying
//!   workflow and task lifecycle announcements.
//!
//! Persistence is a collaborator behind the [`models::TaskStore`] seam;
//! the HTTP ingress, content generation, and UI live outside this crate.
//!
//! ## Usage
//!
//! ```rust
//! use courseops_core::config::CoreConfig;
//! use courseops_core::events::EventBus;
//! use courseops_core::models::InMemoryTaskStore;
//! use courseops_core::routing::EventRouter;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CoreConfig::from_env()?;
//! let store = Arc::new(InMemoryTaskStore::new());
//! let router = EventRouter::new(store, EventBus::from_config(&config));
//!
//! let items = router
//!     .dispatch_value(
//!         "purchase_completed",
//!         &json!({"user_id": "u1", "order_id": "o1", "total": 299.0}),
//!     )
//!     .await?;
//! assert_eq!(items.len(), 3);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod registry;
pub mod routing;
pub mod scoring;
pub mod workflow;

pub use config::CoreConfig;
pub use error::{CoreError, Result};
pub use events::{BusinessEvent, EventBus, EventPayload};
pub use models::{Priority, TaskStore, WorkItem, WorkItemDescriptor};
pub use registry::{HealthMonitor, ServiceRegistry};
pub use routing::EventRouter;
pub use workflow::{Workflow, WorkflowEngine, WorkflowOptions};
