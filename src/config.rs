use crate::constants::defaults;
use crate::error::{CoreError, Result};
use std::time::Duration;

/// Engine-level configuration with environment-variable overrides.
///
/// Consumed at construction time: [`crate::events::EventBus::from_config`]
/// sizes the bus, [`crate::registry::HealthMonitor::from_config`] takes the
/// probe interval, and [`crate::workflow::WorkflowOptions::from_config`]
/// seeds the batch delay.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Capacity of the broadcast channel backing the event bus
    pub event_bus_capacity: usize,
    /// Interval between health probe rounds
    pub health_check_interval: Duration,
    /// Default delay inserted between batch subjects (overridable per call)
    pub batch_delay_ms: u64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            event_bus_capacity: defaults::EVENT_BUS_CAPACITY,
            health_check_interval: Duration::from_secs(defaults::HEALTH_CHECK_INTERVAL_SECS),
            batch_delay_ms: 0,
        }
    }
}

impl CoreConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(capacity) = std::env::var("COURSEOPS_EVENT_BUS_CAPACITY") {
            config.event_bus_capacity = capacity.parse().map_err(|e| {
                CoreError::Configuration {
                    message: format!("Invalid event_bus_capacity: {e}"),
                }
            })?;
        }

        if let Ok(interval) = std::env::var("COURSEOPS_HEALTH_CHECK_INTERVAL_SECS") {
            let secs: u64 = interval.parse().map_err(|e| CoreError::Configuration {
                message: format!("Invalid health_check_interval_secs: {e}"),
            })?;
            config.health_check_interval = Duration::from_secs(secs);
        }

        if let Ok(delay) = std::env::var("COURSEOPS_BATCH_DELAY_MS") {
            config.batch_delay_ms = delay.parse().map_err(|e| CoreError::Configuration {
                message: format!("Invalid batch_delay_ms: {e}"),
            })?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CoreConfig::default();
        assert_eq!(config.event_bus_capacity, 1000);
        assert_eq!(config.health_check_interval, Duration::from_secs(30));
        assert_eq!(config.batch_delay_ms, 0);
    }
}
