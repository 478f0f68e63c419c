pub mod health_monitor;
pub mod service_registry;

pub use health_monitor::{AggregateHealth, HealthMonitor, HealthStatus, ServiceHealth};
pub use service_registry::{ContentService, ServiceRegistry};
