//! # Trigger Configuration and Template Interpolation
//!
//! Dynamically registered triggers expand one business event into work
//! items by interpolating `{field}` placeholders against the event's typed
//! field map. Placeholders with no matching field are left verbatim;
//! malformed templates therefore surface at interpolation time, not at
//! registration.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Map;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::models::{Priority, WorkItemDescriptor};

// {field_name} placeholder; constant pattern, compile-time verified valid
#[allow(clippy::expect_used)]
static FIELD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([a-zA-Z_][a-zA-Z0-9_]*)\}").expect("constant regex pattern is valid")
});

/// Interpolate `{name}` placeholders with values from the field map.
/// Unknown placeholders are left as-is.
pub fn interpolate(template: &str, fields: &HashMap<String, String>) -> String {
    FIELD_PATTERN
        .replace_all(template, |caps: &regex::Captures| {
            let name = &caps[1];
            fields
                .get(name)
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .to_string()
}

/// One work item to create when the owning trigger fires
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItemTemplate {
    pub title_template: String,
    pub description_template: String,
    pub item_type: String,
    pub priority: Priority,
    pub assignee: String,
    pub due_offset_minutes: i64,
}

impl WorkItemTemplate {
    /// Render the template against an event's field map
    pub fn render(&self, fields: &HashMap<String, String>) -> WorkItemDescriptor {
        WorkItemDescriptor {
            title: interpolate(&self.title_template, fields),
            description: interpolate(&self.description_template, fields),
            item_type: self.item_type.clone(),
            priority: self.priority,
            assignee: self.assignee.clone(),
            due_offset_minutes: self.due_offset_minutes,
            metadata: Map::new(),
        }
    }
}

/// A registered rule expanding one event type into work items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerConfig {
    pub event_type: String,
    pub work_item_templates: Vec<WorkItemTemplate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_interpolate_replaces_known_fields() {
        let rendered = interpolate(
            "Congrats {user_email} on week {week}",
            &fields(&[("user_email", "a@b.com"), ("week", "3")]),
        );
        assert_eq!(rendered, "Congrats a@b.com on week 3");
    }

    #[test]
    fn test_unknown_placeholder_left_verbatim() {
        let rendered = interpolate("Hello {missing_field}", &fields(&[]));
        assert_eq!(rendered, "Hello {missing_field}");
    }

    #[test]
    fn test_template_render() {
        let template = WorkItemTemplate {
            title_template: "Congrats {user_email}".to_string(),
            description_template: "Send certificate to {user_email}".to_string(),
            item_type: "congratulation".to_string(),
            priority: Priority::Low,
            assignee: "customer_success".to_string(),
            due_offset_minutes: 30,
        };
        let descriptor = template.render(&fields(&[("user_email", "a@b.com")]));
        assert_eq!(descriptor.title, "Congrats a@b.com");
        assert_eq!(descriptor.description, "Send certificate to a@b.com");
        assert_eq!(descriptor.due_offset_minutes, 30);
    }
}
