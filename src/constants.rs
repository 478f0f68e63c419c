//! # System Constants
//!
//! Canonical event names, workflow step names, and the fixed lookup values
//! that define the operational boundaries of the automation core.

/// Lifecycle events published on the in-process event bus
pub mod events {
    // Workflow lifecycle
    pub const WORKFLOW_STARTED: &str = "workflow.started";
    pub const WORKFLOW_COMPLETED: &str = "workflow.completed";
    pub const WORKFLOW_FAILED: &str = "workflow.failed";
    pub const WORKFLOW_STEP_COMPLETED: &str = "workflow.step_completed";
    pub const WORKFLOW_STEP_FAILED: &str = "workflow.step_failed";

    // Task lifecycle
    pub const TASK_CREATED: &str = "task.created";
    pub const TASK_COMPLETED: &str = "task.completed";

    // Service lifecycle
    pub const SERVICES_INITIALIZED: &str = "services.initialized";
    pub const SERVICE_HEALTH_DEGRADED: &str = "services.health_degraded";
}

/// Fixed step names for the weekly content-production workflow, in
/// execution order
pub mod steps {
    pub const PLANNING: &str = "planning";
    pub const CONTENT_GENERATION: &str = "content_generation";
    pub const ANALYTICS_TRACKING: &str = "analytics_tracking";
    pub const LEARNING_PATH_UPDATE: &str = "learning_path_update";
    pub const RELEASE_INTEGRATION: &str = "release_integration";
    pub const QUALITY_CHECK: &str = "quality_check";
    pub const COMPLETION: &str = "completion";
}

/// Inbound business event type names (the closed set accepted by the router)
pub mod event_types {
    pub const PAGE_VIEW: &str = "page_view";
    pub const USER_REGISTRATION: &str = "user_registration";
    pub const COURSE_ENROLLMENT: &str = "course_enrollment";
    pub const PURCHASE_COMPLETED: &str = "purchase_completed";
    pub const LEAD_CAPTURE: &str = "lead_capture";
    pub const FORM_SUBMISSION: &str = "form_submission";
    pub const SEARCH_PERFORMED: &str = "search_performed";
    pub const SUPPORT_REQUEST: &str = "support_request";
    pub const REFUND_REQUEST: &str = "refund_request";
}

/// Scoring thresholds shared by the lead engine and the router
pub mod scoring {
    /// Scores above this route to the high-priority bucket
    pub const HIGH_THRESHOLD: u32 = 70;
    /// Scores above this (and at or below HIGH) route to the medium bucket
    pub const MEDIUM_THRESHOLD: u32 = 40;
    /// All scores are clamped to this ceiling
    pub const MAX_SCORE: u32 = 100;
}

/// Default operational settings
pub mod defaults {
    /// Event bus channel capacity
    pub const EVENT_BUS_CAPACITY: usize = 1000;
    /// Seconds between health probe rounds
    pub const HEALTH_CHECK_INTERVAL_SECS: u64 = 30;
    /// Default support response-time window in minutes
    pub const SUPPORT_RESPONSE_TIME_MINUTES: u32 = 240;
    /// Lifetime purchase value above which support tickets are upgraded
    pub const HIGH_VALUE_THRESHOLD: f64 = 500.0;
}
