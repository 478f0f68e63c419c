pub mod bus;
pub mod types;

// Re-export key types for convenience
pub use bus::{EventBus, PublishedEvent};
pub use types::{BusinessEvent, EventPayload, LeadBehavior, SupportContext};
