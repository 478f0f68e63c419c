//! # Fixed Event Handlers
//!
//! One fixed handler per known event type: a pure mapping from the typed
//! payload to work-item descriptors, delegating scoring and routing to the
//! decision engines. Event types without a fixed handler produce no
//! descriptors; registered triggers may still fire for them.

use serde_json::{json, Map};

use crate::events::EventPayload;
use crate::models::{Priority, WorkItemDescriptor};
use crate::scoring::{route_lead, route_support, score_lead};

fn plain(
    title: String,
    description: String,
    item_type: &str,
    priority: Priority,
    assignee: &str,
    due_offset_minutes: i64,
) -> WorkItemDescriptor {
    WorkItemDescriptor {
        title,
        description,
        item_type: item_type.to_string(),
        priority,
        assignee: assignee.to_string(),
        due_offset_minutes,
        metadata: Map::new(),
    }
}

/// Map a validated event to the fixed work items for its type
pub fn fixed_work_items(payload: &EventPayload) -> Vec<WorkItemDescriptor> {
    match payload {
        EventPayload::PurchaseCompleted {
            user_id,
            order_id,
            total,
        } => {
            let mut items = vec![
                plain(
                    format!("Onboard customer {user_id}"),
                    format!("Kick off onboarding for order {order_id} (${total:.2})"),
                    "onboarding",
                    Priority::High,
                    "customer_success",
                    60,
                ),
                plain(
                    format!("Provision course access for {user_id}"),
                    format!("Grant platform access covered by order {order_id}"),
                    "access_provisioning",
                    Priority::High,
                    "technical_support",
                    30,
                ),
                plain(
                    format!("Post-purchase check-in with {user_id}"),
                    "Confirm onboarding landed and answer early questions".to_string(),
                    "follow_up",
                    Priority::Medium,
                    "customer_success",
                    3 * 24 * 60,
                ),
            ];
            for item in &mut items {
                item.metadata
                    .insert("order_id".to_string(), json!(order_id));
                item.metadata.insert("user_id".to_string(), json!(user_id));
            }
            items
        }
        EventPayload::LeadCapture {
            email,
            lead_magnet_type,
            source,
            behavior,
        } => {
            let score = score_lead(source.as_deref(), lead_magnet_type, behavior);
            let assessment = route_lead(score);
            let mut metadata = Map::new();
            metadata.insert("lead_score".to_string(), json!(assessment.score));
            metadata.insert(
                "follow_up_sequence".to_string(),
                json!(assessment.follow_up_sequence),
            );
            metadata.insert("email".to_string(), json!(email));
            vec![WorkItemDescriptor {
                title: format!("Follow up with lead {email}"),
                description: format!(
                    "Lead from '{lead_magnet_type}' scored {}; run the {} sequence",
                    assessment.score, assessment.follow_up_sequence
                ),
                item_type: "lead_follow_up".to_string(),
                priority: assessment.priority,
                assignee: assessment.assignee,
                due_offset_minutes: assessment.due_offset_minutes,
                metadata,
            }]
        }
        EventPayload::SupportRequest {
            customer_tier,
            action_type,
            context,
        } => {
            let route = route_support(customer_tier, action_type, context);
            let mut items = vec![plain(
                format!("Support: {action_type} ({customer_tier})"),
                format!(
                    "Respond within {} minutes; cumulative purchase value ${:.2}",
                    route.response_time_minutes, context.purchase_value
                ),
                "support_ticket",
                route.priority,
                &route.assignee,
                i64::from(route.response_time_minutes),
            )];
            if route.requires_escalation {
                if let Some(escalation_assignee) = &route.escalation_assignee {
                    items.push(plain(
                        format!("Escalation review: {action_type} ({customer_tier})"),
                        "Review the escalated ticket before first response goes out".to_string(),
                        "escalation_review",
                        Priority::High,
                        escalation_assignee,
                        i64::from(route.response_time_minutes),
                    ));
                }
            }
            items
        }
        EventPayload::RefundRequest { user_id, order_id } => {
            let who = user_id.as_deref().unwrap_or("unknown user");
            let order = order_id.as_deref().unwrap_or("unknown order");
            vec![
                plain(
                    format!("Retention outreach for {who}"),
                    format!("Refund requested on {order}; attempt a save before processing"),
                    "retention_outreach",
                    Priority::High,
                    "retention_team",
                    60,
                ),
                plain(
                    format!("Process refund for {order}"),
                    "Process the refund if retention outreach does not convert".to_string(),
                    "refund_processing",
                    Priority::High,
                    "billing_support",
                    24 * 60,
                ),
            ]
        }
        EventPayload::CourseEnrollment { user_id, course_id } => {
            vec![plain(
                format!("Welcome {user_id} to {course_id}"),
                "Start the welcome sequence and share the study plan".to_string(),
                "welcome_sequence",
                Priority::Medium,
                "customer_success",
                2 * 60,
            )]
        }
        EventPayload::UserRegistration { user_id, email } => {
            vec![plain(
                format!("Welcome email for {user_id}"),
                format!("Send the account welcome email to {email}"),
                "welcome_email",
                Priority::Low,
                "marketing_automation",
                30,
            )]
        }
        // Pure telemetry and unrecognized events have no fixed handler
        EventPayload::PageView { .. }
        | EventPayload::FormSubmission { .. }
        | EventPayload::SearchPerformed { .. }
        | EventPayload::Generic { .. } => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{LeadBehavior, SupportContext};

    #[test]
    fn test_purchase_fans_out_three_items() {
        let payload = EventPayload::PurchaseCompleted {
            user_id: "u1".to_string(),
            order_id: "o1".to_string(),
            total: 299.0,
        };
        let items = fixed_work_items(&payload);
        let types: Vec<&str> = items.iter().map(|d| d.item_type.as_str()).collect();
        assert_eq!(types, vec!["onboarding", "access_provisioning", "follow_up"]);
        assert!(items.iter().all(|d| d.metadata["order_id"] == "o1"));
    }

    #[test]
    fn test_lead_capture_routes_by_score() {
        let payload = EventPayload::LeadCapture {
            email: "a@b.com".to_string(),
            lead_magnet_type: "consultation_booking".to_string(),
            source: Some("direct_traffic".to_string()),
            behavior: LeadBehavior {
                pages_visited: 5,
                time_on_site: 300,
                return_visits: 2,
            },
        };
        let items = fixed_work_items(&payload);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].priority, crate::models::Priority::High);
        assert_eq!(items[0].metadata["lead_score"], 100);
    }

    #[test]
    fn test_support_escalation_adds_review_item() {
        let payload = EventPayload::SupportRequest {
            customer_tier: "vip".to_string(),
            action_type: "refund_request".to_string(),
            context: SupportContext::default(),
        };
        let items = fixed_work_items(&payload);
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].item_type, "escalation_review");
        assert_eq!(items[1].assignee, "support_director");
    }

    #[test]
    fn test_page_view_has_no_fixed_handler() {
        let payload = EventPayload::PageView {
            page_url: "/pricing".to_string(),
            session_id: "s1".to_string(),
        };
        assert!(fixed_work_items(&payload).is_empty());
    }
}
