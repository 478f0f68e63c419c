pub mod handlers;
pub mod router;
pub mod triggers;

pub use router::EventRouter;
pub use triggers::{interpolate, TriggerConfig, WorkItemTemplate};
