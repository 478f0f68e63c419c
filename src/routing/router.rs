//! # Event Router
//!
//! Validates and dispatches named business events: one fixed handler per
//! event type, then every dynamically registered trigger for that type.
//! Invalid events fail validation and never reach a handler. A failure
//! while materializing one trigger's work items aborts the remaining
//! triggers for that dispatch; already-created items are not rolled back.

use chrono::Utc;
use parking_lot::RwLock;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::constants::events as bus_events;
use crate::error::Result;
use crate::events::{BusinessEvent, EventBus};
use crate::models::{TaskStore, WorkItem};
use crate::routing::handlers::fixed_work_items;
use crate::routing::triggers::TriggerConfig;

/// Routes validated events to fixed handlers and registered triggers.
///
/// The trigger table is owned by the router and guarded by a lock; trigger
/// registration is the only runtime mutation it permits.
pub struct EventRouter {
    store: Arc<dyn TaskStore>,
    bus: EventBus,
    triggers: RwLock<HashMap<String, Vec<TriggerConfig>>>,
}

impl EventRouter {
    pub fn new(store: Arc<dyn TaskStore>, bus: EventBus) -> Self {
        Self {
            store,
            bus,
            triggers: RwLock::new(HashMap::new()),
        }
    }

    /// Append a trigger for its event type. Templates are not validated
    /// here; malformed placeholders surface at interpolation time.
    pub fn register_trigger(&self, config: TriggerConfig) {
        debug!(
            event_type = %config.event_type,
            templates = config.work_item_templates.len(),
            "Registering trigger"
        );
        self.triggers
            .write()
            .entry(config.event_type.clone())
            .or_default()
            .push(config);
    }

    /// Number of triggers registered for an event type
    pub fn trigger_count(&self, event_type: &str) -> usize {
        self.triggers
            .read()
            .get(event_type)
            .map_or(0, |configs| configs.len())
    }

    /// Validate raw JSON then dispatch. Validation failures produce zero
    /// work items and never reach a handler.
    pub async fn dispatch_value(&self, event_type: &str, raw: &Value) -> Result<Vec<WorkItem>> {
        let event = BusinessEvent::from_value(event_type, raw)?;
        self.dispatch(&event).await
    }

    /// Dispatch a validated event: fixed handler first, then registered
    /// triggers in registration order. Created work items are persisted to
    /// the task store and announced on the bus.
    #[instrument(skip(self, event), fields(event_type = %event.event_type()))]
    pub async fn dispatch(&self, event: &BusinessEvent) -> Result<Vec<WorkItem>> {
        let event_type = event.event_type().to_string();
        let now = Utc::now();
        let mut created = Vec::new();

        for descriptor in fixed_work_items(&event.payload) {
            let item = descriptor.into_work_item(now);
            self.store.create(item.clone()).await?;
            created.push(item);
        }

        // Snapshot under the lock, render and persist outside it
        let matching: Vec<TriggerConfig> = self
            .triggers
            .read()
            .get(&event_type)
            .cloned()
            .unwrap_or_default();

        let fields = event.payload.fields();
        for config in &matching {
            for template in &config.work_item_templates {
                let item = template.render(&fields).into_work_item(now);
                // Fail-fast across triggers: a store failure here aborts
                // the remaining triggers for this dispatch
                self.store.create(item.clone()).await?;
                created.push(item);
            }
        }

        for item in &created {
            self.bus.publish(
                bus_events::TASK_CREATED,
                json!({
                    "work_item_id": item.id,
                    "item_type": item.item_type,
                    "priority": item.priority,
                    "source_event": event_type,
                }),
            );
        }

        info!(
            event_type = %event_type,
            work_items = created.len(),
            triggers = matching.len(),
            "Dispatched event"
        );
        Ok(created)
    }
}
