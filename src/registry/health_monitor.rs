//! # Health Monitor
//!
//! Polls every registered service with the same lightweight probe on a
//! fixed interval, independent of in-flight workflows. Probe outcomes are
//! recorded in a lock-guarded map (entries are updated, never removed) and
//! rolled up into an aggregate status: healthy only when every service is
//! healthy, otherwise degraded. Probe failures are logged and reflected in
//! the aggregate; they are never fatal and never retried inline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::CoreConfig;
use crate::constants::events as bus_events;
use crate::events::EventBus;
use crate::registry::service_registry::ContentService;

/// Probe outcome for one service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// Probe succeeded and the service reported healthy
    Healthy,
    /// Probe succeeded but the service reported unhealthy
    Unhealthy,
    /// The probe itself failed
    Error,
}

/// Latest health record for one service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub service_name: String,
    pub status: HealthStatus,
    pub last_check: DateTime<Utc>,
    pub error: Option<String>,
}

/// Rolled-up status across all services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateHealth {
    Healthy,
    Degraded,
}

/// Periodic health prober over the registry's services
pub struct HealthMonitor {
    services: Vec<Arc<dyn ContentService>>,
    statuses: Arc<RwLock<HashMap<String, ServiceHealth>>>,
    interval: Duration,
    bus: EventBus,
}

impl HealthMonitor {
    pub fn new(services: Vec<Arc<dyn ContentService>>, interval: Duration, bus: EventBus) -> Self {
        Self {
            services,
            statuses: Arc::new(RwLock::new(HashMap::new())),
            interval,
            bus,
        }
    }

    /// Monitor using the configured probe interval
    pub fn from_config(
        services: Vec<Arc<dyn ContentService>>,
        config: &CoreConfig,
        bus: EventBus,
    ) -> Self {
        Self::new(services, config.health_check_interval, bus)
    }

    /// Probe every service once and return the aggregate status
    pub async fn check_health(&self) -> AggregateHealth {
        for service in &self.services {
            let name = service.name().to_string();
            let record = match service.check_health().await {
                Ok(true) => ServiceHealth {
                    service_name: name.clone(),
                    status: HealthStatus::Healthy,
                    last_check: Utc::now(),
                    error: None,
                },
                Ok(false) => ServiceHealth {
                    service_name: name.clone(),
                    status: HealthStatus::Unhealthy,
                    last_check: Utc::now(),
                    error: None,
                },
                Err(err) => {
                    warn!(service = %name, error = %err, "Health probe failed");
                    ServiceHealth {
                        service_name: name.clone(),
                        status: HealthStatus::Error,
                        last_check: Utc::now(),
                        error: Some(err.to_string()),
                    }
                }
            };
            self.statuses.write().await.insert(name, record);
        }

        let aggregate = self.aggregate().await;
        if aggregate == AggregateHealth::Degraded {
            let snapshot = self.statuses.read().await.clone();
            self.bus.publish(
                bus_events::SERVICE_HEALTH_DEGRADED,
                serde_json::json!({ "statuses": snapshot }),
            );
        }
        debug!(?aggregate, "Health check round finished");
        aggregate
    }

    /// Aggregate status from the latest records: healthy when every probed
    /// service is healthy. A monitor with no records yet (nothing probed,
    /// or nothing registered) is vacuously healthy.
    pub async fn aggregate(&self) -> AggregateHealth {
        let statuses = self.statuses.read().await;
        let all_healthy = statuses
            .values()
            .all(|record| record.status == HealthStatus::Healthy);
        if all_healthy {
            AggregateHealth::Healthy
        } else {
            AggregateHealth::Degraded
        }
    }

    /// Copy of the current per-service records
    pub async fn snapshot(&self) -> HashMap<String, ServiceHealth> {
        self.statuses.read().await.clone()
    }

    /// Spawn the fixed-interval probe loop. The returned handle aborts the
    /// loop when dropped by the caller's choosing; the monitor itself never
    /// stops polling.
    pub fn start(self: Arc<Self>) -> JoinHandle<()> {
        let monitor = self;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(monitor.interval);
            // first tick fires immediately; skip it so startup is not probed twice
            ticker.tick().await;
            loop {
                ticker.tick().await;
                monitor.check_health().await;
            }
        })
    }
}
