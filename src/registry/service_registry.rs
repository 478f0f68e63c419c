//! # Service Registry
//!
//! Owns references to the collaborating subsystems (content generator,
//! analytics, learning tracker, and so on), starts them concurrently with
//! fail-fast semantics, and wires the fixed cross-service subscriptions on
//! the event bus. The registry is an explicitly owned object passed to the
//! components that need it; there is no ambient global service map.

use async_trait::async_trait;
use futures::future::try_join_all;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::constants::events as bus_events;
use crate::error::{CoreError, Result};
use crate::events::{EventBus, PublishedEvent};

/// A collaborating subsystem managed by the registry.
///
/// `initialize` runs once at startup; `check_health` is the lightweight
/// probe the health monitor polls (`Ok(true)` healthy, `Ok(false)`
/// unhealthy, `Err` probe failure); `handle_event` receives the bus events
/// the registry subscribes the service to.
#[async_trait]
pub trait ContentService: Send + Sync {
    fn name(&self) -> &str;

    async fn initialize(&self) -> Result<()>;

    async fn check_health(&self) -> Result<bool>;

    async fn handle_event(&self, event: &PublishedEvent) -> Result<()> {
        let _ = event;
        Ok(())
    }
}

/// Registry of collaborating services with fail-fast concurrent startup
pub struct ServiceRegistry {
    services: Vec<Arc<dyn ContentService>>,
    bus: EventBus,
    subscription_task: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

impl ServiceRegistry {
    pub fn new(bus: EventBus) -> Self {
        Self {
            services: Vec::new(),
            bus,
            subscription_task: parking_lot::Mutex::new(None),
        }
    }

    /// Register a service. Registration happens before `initialize`; the
    /// set of services is fixed once startup begins.
    pub fn register(&mut self, service: Arc<dyn ContentService>) {
        debug!(service = service.name(), "Registering service");
        self.services.push(service);
    }

    pub fn services(&self) -> &[Arc<dyn ContentService>] {
        &self.services
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Start every registered service concurrently. Fail-fast join: the
    /// first failure aborts startup and no partial set of services is
    /// retried. On success the fixed cross-service subscriptions are wired.
    pub async fn initialize(&self) -> Result<()> {
        info!(service_count = self.services.len(), "Initializing services");

        try_join_all(self.services.iter().map(|service| {
            let service = Arc::clone(service);
            async move {
                service.initialize().await.map_err(|err| {
                    error!(service = service.name(), error = %err, "Service failed to initialize");
                    CoreError::Init {
                        service: service.name().to_string(),
                        message: err.to_string(),
                    }
                })
            }
        }))
        .await?;

        self.wire_subscriptions();
        self.bus.publish(
            bus_events::SERVICES_INITIALIZED,
            serde_json::json!({"service_count": self.services.len()}),
        );
        info!("All services initialized");
        Ok(())
    }

    /// Fixed cross-service wiring: completed tasks are forwarded to every
    /// service so analytics and learning tracking observe them.
    fn wire_subscriptions(&self) {
        let mut receiver = self.bus.subscribe();
        let services = self.services.clone();
        let handle = tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) if event.is(bus_events::TASK_COMPLETED) => {
                        for service in &services {
                            if let Err(err) = service.handle_event(&event).await {
                                warn!(
                                    service = service.name(),
                                    event = %event.name,
                                    error = %err,
                                    "Service event handler failed"
                                );
                            }
                        }
                    }
                    Ok(_) => {}
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Subscription lagged; events dropped");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        *self.subscription_task.lock() = Some(handle);
    }
}

impl Drop for ServiceRegistry {
    fn drop(&mut self) {
        if let Some(handle) = self.subscription_task.lock().take() {
            handle.abort();
        }
    }
}
