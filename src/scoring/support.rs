//! # Support Routing Engine
//!
//! Deterministic (tier × action) table lookup producing assignee, priority,
//! response-time window, and escalation flags for a support request.
//! A missing table entry falls back to a documented default and is never
//! fatal.

use serde::{Deserialize, Serialize};

use crate::constants::defaults::{HIGH_VALUE_THRESHOLD, SUPPORT_RESPONSE_TIME_MINUTES};
use crate::events::SupportContext;
use crate::models::Priority;

/// Tags that force a priority upgrade regardless of the table cell
const PRIORITY_INDICATOR_TAGS: &[&str] = &["urgent", "complaint", "legal", "chargeback"];

/// Routing decision for one support request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportRoute {
    pub assignee: String,
    pub priority: Priority,
    pub response_time_minutes: u32,
    pub requires_escalation: bool,
    pub escalation_assignee: Option<String>,
}

/// Per-cell defaults for the (tier × action) routing table
struct TableEntry {
    assignee: &'static str,
    priority: Priority,
    response_time_minutes: u32,
    requires_escalation: bool,
    escalation_assignee: Option<&'static str>,
}

fn table_lookup(customer_tier: &str, action_type: &str) -> Option<TableEntry> {
    let entry = match (customer_tier, action_type) {
        ("vip", "refund_request") => TableEntry {
            assignee: "account_manager",
            priority: Priority::High,
            response_time_minutes: 30,
            requires_escalation: true,
            escalation_assignee: Some("support_director"),
        },
        ("vip", _) => TableEntry {
            assignee: "account_manager",
            priority: Priority::High,
            response_time_minutes: 60,
            requires_escalation: false,
            escalation_assignee: None,
        },
        ("premium", "refund_request") => TableEntry {
            assignee: "senior_support",
            priority: Priority::High,
            response_time_minutes: 120,
            requires_escalation: true,
            escalation_assignee: Some("support_lead"),
        },
        ("premium", "technical_issue") => TableEntry {
            assignee: "technical_support",
            priority: Priority::Medium,
            response_time_minutes: 120,
            requires_escalation: false,
            escalation_assignee: None,
        },
        ("premium", _) => TableEntry {
            assignee: "senior_support",
            priority: Priority::Medium,
            response_time_minutes: 180,
            requires_escalation: false,
            escalation_assignee: None,
        },
        ("standard", "refund_request") => TableEntry {
            assignee: "billing_support",
            priority: Priority::Medium,
            response_time_minutes: 240,
            requires_escalation: false,
            escalation_assignee: None,
        },
        ("standard", "technical_issue") => TableEntry {
            assignee: "technical_support",
            priority: Priority::Medium,
            response_time_minutes: 240,
            requires_escalation: false,
            escalation_assignee: None,
        },
        ("standard", "course_access") => TableEntry {
            assignee: "technical_support",
            priority: Priority::High,
            response_time_minutes: 60,
            requires_escalation: false,
            escalation_assignee: None,
        },
        ("standard", "general_question") => TableEntry {
            assignee: "general_support",
            priority: Priority::Low,
            response_time_minutes: 480,
            requires_escalation: false,
            escalation_assignee: None,
        },
        _ => return None,
    };
    Some(entry)
}

/// Route a support request. Table lookup is deterministic; the priority is
/// then upgraded to high when a priority-indicator tag is present or the
/// customer's cumulative purchase value exceeds the high-value threshold,
/// and the response window is the minimum of the table default and any
/// history-based override.
pub fn route_support(customer_tier: &str, action_type: &str, context: &SupportContext) -> SupportRoute {
    // Unknown (tier, action) pairs route to general support; recoverable,
    // never an error surfaced to the caller
    let entry = table_lookup(customer_tier, action_type).unwrap_or(TableEntry {
        assignee: "general_support",
        priority: Priority::Low,
        response_time_minutes: SUPPORT_RESPONSE_TIME_MINUTES,
        requires_escalation: false,
        escalation_assignee: None,
    });

    let has_indicator_tag = context
        .tags
        .iter()
        .any(|tag| PRIORITY_INDICATOR_TAGS.contains(&tag.as_str()));
    let high_value = context.purchase_value > HIGH_VALUE_THRESHOLD;

    let priority = if has_indicator_tag || high_value {
        Priority::High
    } else {
        entry.priority
    };

    let response_time_minutes = match context.history_response_minutes {
        Some(history) => entry.response_time_minutes.min(history),
        None => entry.response_time_minutes,
    };

    SupportRoute {
        assignee: entry.assignee.to_string(),
        priority,
        response_time_minutes,
        requires_escalation: entry.requires_escalation,
        escalation_assignee: entry.escalation_assignee.map(ToString::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_deterministic() {
        let context = SupportContext::default();
        let first = route_support("premium", "technical_issue", &context);
        let second = route_support("premium", "technical_issue", &context);
        assert_eq!(first, second);
        assert_eq!(first.assignee, "technical_support");
        assert_eq!(first.priority, Priority::Medium);
    }

    #[test]
    fn test_vip_refund_escalates() {
        let route = route_support("vip", "refund_request", &SupportContext::default());
        assert!(route.requires_escalation);
        assert_eq!(route.escalation_assignee.as_deref(), Some("support_director"));
        assert_eq!(route.response_time_minutes, 30);
    }

    #[test]
    fn test_indicator_tag_upgrades_priority() {
        let context = SupportContext {
            tags: vec!["complaint".to_string()],
            ..Default::default()
        };
        let route = route_support("standard", "general_question", &context);
        assert_eq!(route.priority, Priority::High);
        // assignee comes from the table cell, not the upgrade
        assert_eq!(route.assignee, "general_support");
    }

    #[test]
    fn test_high_value_customer_upgrades_priority() {
        let context = SupportContext {
            purchase_value: 750.0,
            ..Default::default()
        };
        let route = route_support("standard", "technical_issue", &context);
        assert_eq!(route.priority, Priority::High);
    }

    #[test]
    fn test_history_override_takes_minimum() {
        let context = SupportContext {
            history_response_minutes: Some(45),
            ..Default::default()
        };
        let route = route_support("standard", "technical_issue", &context);
        assert_eq!(route.response_time_minutes, 45);

        let slow_history = SupportContext {
            history_response_minutes: Some(999),
            ..Default::default()
        };
        let route = route_support("standard", "technical_issue", &slow_history);
        assert_eq!(route.response_time_minutes, 240);
    }

    #[test]
    fn test_unknown_cell_falls_back_to_default() {
        let route = route_support("enterprise", "spaceship_request", &SupportContext::default());
        assert_eq!(route.assignee, "general_support");
        assert_eq!(route.priority, Priority::Low);
        assert_eq!(route.response_time_minutes, 240);
        assert!(!route.requires_escalation);
    }
}
