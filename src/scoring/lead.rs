//! # Lead Scoring Engine
//!
//! Weighted scoring for captured leads: a source weight, a lead-magnet
//! weight, and behavioral terms, clamped to [0, 100]. The score buckets
//! into priority, assignee pool, and follow-up sequence via fixed
//! thresholds.

use serde::{Deserialize, Serialize};

use crate::constants::scoring::{HIGH_THRESHOLD, MAX_SCORE, MEDIUM_THRESHOLD};
use crate::events::LeadBehavior;
use crate::models::Priority;

/// Traffic-source weights. Direct traffic signals the strongest intent.
fn source_weight(source: &str) -> u32 {
    match source {
        "direct_traffic" => 40,
        "organic_search" => 35,
        "email_campaign" => 30,
        "referral" => 25,
        "paid_ads" => 20,
        "social_media" => 10,
        _ => 5,
    }
}

/// Lead-magnet weights. High-commitment magnets outweigh passive downloads.
fn magnet_weight(lead_magnet_type: &str) -> u32 {
    match lead_magnet_type {
        "consultation_booking" => 60,
        "webinar_registration" => 45,
        "free_course_preview" => 35,
        "exam_practice_test" => 30,
        "study_guide_pdf" => 20,
        "newsletter_signup" => 10,
        _ => 15,
    }
}

/// Compute the lead score: source weight + magnet weight + behavioral terms
/// (2 per page visited, 1 per minute on site, 5 per return visit), clamped
/// to [0, 100].
pub fn score_lead(source: Option<&str>, lead_magnet_type: &str, behavior: &LeadBehavior) -> u32 {
    let source_term = source.map(source_weight).unwrap_or(0);
    // Counters arrive unchecked from the ingress boundary; saturate so the
    // clamp still holds for arbitrarily large values
    let behavioral_term = behavior
        .pages_visited
        .saturating_mul(2)
        .saturating_add(behavior.time_on_site / 60)
        .saturating_add(behavior.return_visits.saturating_mul(5));

    source_term
        .saturating_add(magnet_weight(lead_magnet_type))
        .saturating_add(behavioral_term)
        .min(MAX_SCORE)
}

/// Downstream routing decision derived from a lead score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadAssessment {
    pub score: u32,
    pub priority: Priority,
    pub assignee: String,
    pub follow_up_sequence: String,
    /// Minutes until the follow-up work item is due
    pub due_offset_minutes: i64,
}

/// Bucket a score into priority, assignee pool, and follow-up sequence.
/// Thresholds: score > 70 is high, > 40 is medium, otherwise low.
pub fn route_lead(score: u32) -> LeadAssessment {
    if score > HIGH_THRESHOLD {
        LeadAssessment {
            score,
            priority: Priority::High,
            assignee: "senior_sales".to_string(),
            follow_up_sequence: "high_value_nurture".to_string(),
            due_offset_minutes: 60,
        }
    } else if score > MEDIUM_THRESHOLD {
        LeadAssessment {
            score,
            priority: Priority::Medium,
            assignee: "sales_team".to_string(),
            follow_up_sequence: "standard_nurture".to_string(),
            due_offset_minutes: 24 * 60,
        }
    } else {
        LeadAssessment {
            score,
            priority: Priority::Low,
            assignee: "marketing_automation".to_string(),
            follow_up_sequence: "long_term_nurture".to_string(),
            due_offset_minutes: 72 * 60,
        }
    }
}
