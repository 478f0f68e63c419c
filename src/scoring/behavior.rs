//! # Behavior-Based Assignment Engine
//!
//! Ordered, independent rules over a user behavior snapshot. Every rule is
//! evaluated unconditionally and may append one work-item descriptor, so a
//! single snapshot can yield several simultaneous work items.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map};

use crate::constants::scoring::MAX_SCORE;
use crate::models::{Priority, WorkItemDescriptor};

/// Snapshot of a user's recent behavior across the site and email channels
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserBehavior {
    pub user_id: String,
    /// Engagement score, clamped to [0, 100] during evaluation
    #[serde(default)]
    pub engagement_score: u32,
    /// Estimated conversion likelihood in [0.0, 1.0]
    #[serde(default)]
    pub conversion_likelihood: f64,
    #[serde(default)]
    pub pricing_page_visits: u32,
    #[serde(default)]
    pub has_purchased: bool,
    /// Seconds of dwell time on course detail pages
    #[serde(default)]
    pub course_page_dwell_seconds: u32,
    #[serde(default)]
    pub has_enrolled: bool,
    #[serde(default)]
    pub support_page_visits: u32,
    /// Email open rate in [0.0, 1.0]
    #[serde(default)]
    pub email_open_rate: f64,
}

fn descriptor(
    behavior: &UserBehavior,
    title: String,
    description: String,
    item_type: &str,
    priority: Priority,
    assignee: &str,
    due_offset_minutes: i64,
) -> WorkItemDescriptor {
    let mut metadata = Map::new();
    metadata.insert("user_id".to_string(), json!(behavior.user_id));
    WorkItemDescriptor {
        title,
        description,
        item_type: item_type.to_string(),
        priority,
        assignee: assignee.to_string(),
        due_offset_minutes,
        metadata,
    }
}

/// Evaluate every assignment rule against the snapshot. Rules are
/// independent, not mutually exclusive; the result may hold zero or
/// several descriptors.
pub fn assign_behavior_tasks(behavior: &UserBehavior) -> Vec<WorkItemDescriptor> {
    let engagement = behavior.engagement_score.min(MAX_SCORE);
    let mut descriptors = Vec::new();

    // Highly engaged user likely to convert: direct sales outreach
    if engagement > 70 && behavior.conversion_likelihood > 0.7 {
        descriptors.push(descriptor(
            behavior,
            format!("Sales outreach for {}", behavior.user_id),
            "High engagement and conversion likelihood; reach out with enrollment offer"
                .to_string(),
            "sales_outreach",
            Priority::High,
            "senior_sales",
            60,
        ));
    }

    // Repeated pricing-page visits without a purchase: price sensitivity
    if behavior.pricing_page_visits >= 3 && !behavior.has_purchased {
        descriptors.push(descriptor(
            behavior,
            format!("Pricing follow-up for {}", behavior.user_id),
            "Multiple pricing page visits without purchase; consider a limited-time offer"
                .to_string(),
            "pricing_follow_up",
            Priority::Medium,
            "sales_team",
            4 * 60,
        ));
    }

    // Long course-page dwell without enrollment: nudge toward enrolling
    if behavior.course_page_dwell_seconds > 600 && !behavior.has_enrolled {
        descriptors.push(descriptor(
            behavior,
            format!("Enrollment nudge for {}", behavior.user_id),
            "Extended time on course pages without enrolling; send curriculum highlights"
                .to_string(),
            "enrollment_nudge",
            Priority::Medium,
            "marketing_automation",
            12 * 60,
        ));
    }

    // Support-page visits: get ahead of a ticket
    if behavior.support_page_visits >= 2 {
        descriptors.push(descriptor(
            behavior,
            format!("Proactive support check-in for {}", behavior.user_id),
            "Repeated support page visits; check in before a ticket is filed".to_string(),
            "proactive_support",
            Priority::Medium,
            "general_support",
            2 * 60,
        ));
    }

    // Disengaged and not opening email: re-engagement campaign
    if engagement < 20 && behavior.email_open_rate < 0.1 {
        descriptors.push(descriptor(
            behavior,
            format!("Re-engagement campaign for {}", behavior.user_id),
            "Low engagement and low email opens; move to win-back sequence".to_string(),
            "reengagement",
            Priority::Low,
            "marketing_automation",
            7 * 24 * 60,
        ));
    }

    descriptors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> UserBehavior {
        UserBehavior {
            user_id: "u-42".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_quiet_snapshot_produces_nothing() {
        let behavior = UserBehavior {
            engagement_score: 50,
            email_open_rate: 0.5,
            ..snapshot()
        };
        assert!(assign_behavior_tasks(&behavior).is_empty());
    }

    #[test]
    fn test_rules_are_independent() {
        // Triggers sales outreach, pricing follow-up, and enrollment nudge at once
        let behavior = UserBehavior {
            engagement_score: 85,
            conversion_likelihood: 0.9,
            pricing_page_visits: 4,
            has_purchased: false,
            course_page_dwell_seconds: 900,
            has_enrolled: false,
            ..snapshot()
        };
        let descriptors = assign_behavior_tasks(&behavior);
        let types: Vec<&str> = descriptors.iter().map(|d| d.item_type.as_str()).collect();
        assert_eq!(
            types,
            vec!["sales_outreach", "pricing_follow_up", "enrollment_nudge"]
        );
    }

    #[test]
    fn test_purchase_suppresses_pricing_rule() {
        let behavior = UserBehavior {
            pricing_page_visits: 5,
            has_purchased: true,
            engagement_score: 50,
            email_open_rate: 0.4,
            ..snapshot()
        };
        assert!(assign_behavior_tasks(&behavior).is_empty());
    }

    #[test]
    fn test_oversized_engagement_is_clamped() {
        // 500 clamps to 100; still satisfies the high-engagement rule
        let behavior = UserBehavior {
            engagement_score: 500,
            conversion_likelihood: 0.8,
            email_open_rate: 0.5,
            ..snapshot()
        };
        let descriptors = assign_behavior_tasks(&behavior);
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].item_type, "sales_outreach");
    }

    #[test]
    fn test_reengagement_rule() {
        let behavior = UserBehavior {
            engagement_score: 5,
            email_open_rate: 0.02,
            ..snapshot()
        };
        let descriptors = assign_behavior_tasks(&behavior);
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].priority, Priority::Low);
        assert_eq!(descriptors[0].assignee, "marketing_automation");
    }
}
