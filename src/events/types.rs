//! # Business Event Types
//!
//! Typed payloads for the closed set of inbound business events. Raw JSON
//! from the ingress boundary is validated into one payload variant per
//! event type before any routing happens; an event missing a required field
//! never reaches a handler.

use crate::error::{CoreError, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Behavioral signals attached to a lead-capture event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadBehavior {
    #[serde(default)]
    pub pages_visited: u32,
    /// Seconds spent on site across the capture session
    #[serde(default)]
    pub time_on_site: u32,
    #[serde(default)]
    pub return_visits: u32,
}

/// Optional context attached to a support request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupportContext {
    #[serde(default)]
    pub tags: Vec<String>,
    /// Cumulative purchase value for the requesting customer
    #[serde(default)]
    pub purchase_value: f64,
    /// Historical average first-response time, when known
    #[serde(default)]
    pub history_response_minutes: Option<u32>,
}

/// One variant per accepted event type. Events outside the named set are
/// carried as `Generic` and only need the baseline contract (a timestamp).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum EventPayload {
    PageView {
        page_url: String,
        session_id: String,
    },
    UserRegistration {
        user_id: String,
        email: String,
    },
    CourseEnrollment {
        user_id: String,
        course_id: String,
    },
    PurchaseCompleted {
        user_id: String,
        order_id: String,
        total: f64,
    },
    LeadCapture {
        email: String,
        lead_magnet_type: String,
        source: Option<String>,
        behavior: LeadBehavior,
    },
    FormSubmission {
        form_id: String,
    },
    SearchPerformed {
        search_query: String,
    },
    SupportRequest {
        customer_tier: String,
        action_type: String,
        context: SupportContext,
    },
    RefundRequest {
        user_id: Option<String>,
        order_id: Option<String>,
    },
    Generic {
        name: String,
        attributes: serde_json::Map<String, Value>,
    },
}

impl EventPayload {
    /// Canonical event type name for routing and logging
    pub fn event_type(&self) -> &str {
        use crate::constants::event_types::*;
        match self {
            Self::PageView { .. } => PAGE_VIEW,
            Self::UserRegistration { .. } => USER_REGISTRATION,
            Self::CourseEnrollment { .. } => COURSE_ENROLLMENT,
            Self::PurchaseCompleted { .. } => PURCHASE_COMPLETED,
            Self::LeadCapture { .. } => LEAD_CAPTURE,
            Self::FormSubmission { .. } => FORM_SUBMISSION,
            Self::SearchPerformed { .. } => SEARCH_PERFORMED,
            Self::SupportRequest { .. } => SUPPORT_REQUEST,
            Self::RefundRequest { .. } => REFUND_REQUEST,
            Self::Generic { name, .. } => name,
        }
    }

    /// Validate raw JSON into a typed payload for the given event type.
    ///
    /// Enforces the required-field contract: each named type has a fixed
    /// required subset; every other type only needs a `timestamp` field.
    pub fn from_value(event_type: &str, raw: &Value) -> Result<Self> {
        use crate::constants::event_types::*;
        match event_type {
            PAGE_VIEW => Ok(Self::PageView {
                page_url: require_str(raw, event_type, "page_url")?,
                session_id: require_str(raw, event_type, "session_id")?,
            }),
            USER_REGISTRATION => Ok(Self::UserRegistration {
                user_id: require_str(raw, event_type, "user_id")?,
                email: require_str(raw, event_type, "email")?,
            }),
            COURSE_ENROLLMENT => Ok(Self::CourseEnrollment {
                user_id: require_str(raw, event_type, "user_id")?,
                course_id: require_str(raw, event_type, "course_id")?,
            }),
            PURCHASE_COMPLETED => Ok(Self::PurchaseCompleted {
                user_id: require_str(raw, event_type, "user_id")?,
                order_id: require_str(raw, event_type, "order_id")?,
                total: require_f64(raw, event_type, "total")?,
            }),
            LEAD_CAPTURE => Ok(Self::LeadCapture {
                email: require_str(raw, event_type, "email")?,
                lead_magnet_type: require_str(raw, event_type, "lead_magnet_type")?,
                source: optional_str(raw, "source"),
                behavior: raw
                    .get("behavior")
                    .map(|b| {
                        serde_json::from_value(b.clone()).map_err(|e| {
                            CoreError::validation(format!("lead_capture behavior: {e}"))
                        })
                    })
                    .transpose()?
                    .unwrap_or_default(),
            }),
            FORM_SUBMISSION => Ok(Self::FormSubmission {
                form_id: require_str(raw, event_type, "form_id")?,
            }),
            SEARCH_PERFORMED => Ok(Self::SearchPerformed {
                search_query: require_str(raw, event_type, "search_query")?,
            }),
            SUPPORT_REQUEST => {
                require_timestamp(raw, event_type)?;
                Ok(Self::SupportRequest {
                    customer_tier: optional_str(raw, "customer_tier")
                        .unwrap_or_else(|| "standard".to_string()),
                    action_type: optional_str(raw, "action_type")
                        .unwrap_or_else(|| "general_question".to_string()),
                    context: raw
                        .get("context")
                        .map(|c| {
                            serde_json::from_value(c.clone()).map_err(|e| {
                                CoreError::validation(format!("support_request context: {e}"))
                            })
                        })
                        .transpose()?
                        .unwrap_or_default(),
                })
            }
            REFUND_REQUEST => {
                require_timestamp(raw, event_type)?;
                Ok(Self::RefundRequest {
                    user_id: optional_str(raw, "user_id"),
                    order_id: optional_str(raw, "order_id"),
                })
            }
            other => {
                require_timestamp(raw, other)?;
                let attributes = match raw {
                    Value::Object(map) => map.clone(),
                    _ => {
                        return Err(CoreError::validation(format!(
                            "Event '{other}' payload must be a JSON object"
                        )))
                    }
                };
                Ok(Self::Generic {
                    name: other.to_string(),
                    attributes,
                })
            }
        }
    }

    /// Flat field map used for trigger-template interpolation. Nested
    /// structures contribute their scalar leaves under the leaf name.
    pub fn fields(&self) -> HashMap<String, String> {
        let mut fields = HashMap::new();
        match self {
            Self::PageView {
                page_url,
                session_id,
            } => {
                fields.insert("page_url".to_string(), page_url.clone());
                fields.insert("session_id".to_string(), session_id.clone());
            }
            Self::UserRegistration { user_id, email } => {
                fields.insert("user_id".to_string(), user_id.clone());
                fields.insert("email".to_string(), email.clone());
            }
            Self::CourseEnrollment { user_id, course_id } => {
                fields.insert("user_id".to_string(), user_id.clone());
                fields.insert("course_id".to_string(), course_id.clone());
            }
            Self::PurchaseCompleted {
                user_id,
                order_id,
                total,
            } => {
                fields.insert("user_id".to_string(), user_id.clone());
                fields.insert("order_id".to_string(), order_id.clone());
                fields.insert("total".to_string(), total.to_string());
            }
            Self::LeadCapture {
                email,
                lead_magnet_type,
                source,
                behavior,
            } => {
                fields.insert("email".to_string(), email.clone());
                fields.insert("lead_magnet_type".to_string(), lead_magnet_type.clone());
                if let Some(source) = source {
                    fields.insert("source".to_string(), source.clone());
                }
                fields.insert(
                    "pages_visited".to_string(),
                    behavior.pages_visited.to_string(),
                );
                fields.insert("time_on_site".to_string(), behavior.time_on_site.to_string());
                fields.insert(
                    "return_visits".to_string(),
                    behavior.return_visits.to_string(),
                );
            }
            Self::FormSubmission { form_id } => {
                fields.insert("form_id".to_string(), form_id.clone());
            }
            Self::SearchPerformed { search_query } => {
                fields.insert("search_query".to_string(), search_query.clone());
            }
            Self::SupportRequest {
                customer_tier,
                action_type,
                ..
            } => {
                fields.insert("customer_tier".to_string(), customer_tier.clone());
                fields.insert("action_type".to_string(), action_type.clone());
            }
            Self::RefundRequest { user_id, order_id } => {
                if let Some(user_id) = user_id {
                    fields.insert("user_id".to_string(), user_id.clone());
                }
                if let Some(order_id) = order_id {
                    fields.insert("order_id".to_string(), order_id.clone());
                }
            }
            Self::Generic { attributes, .. } => {
                for (key, value) in attributes {
                    if let Some(rendered) = scalar_to_string(value) {
                        fields.insert(key.clone(), rendered);
                    }
                }
            }
        }
        fields
    }
}

/// A validated business event ready for dispatch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessEvent {
    pub payload: EventPayload,
    pub occurred_at: DateTime<Utc>,
}

impl BusinessEvent {
    pub fn new(payload: EventPayload) -> Self {
        Self {
            payload,
            occurred_at: Utc::now(),
        }
    }

    /// Validate raw JSON into a dispatchable event. `occurred_at` is taken
    /// from a `timestamp` field (RFC 3339 string or Unix seconds) when
    /// present, otherwise the current time.
    pub fn from_value(event_type: &str, raw: &Value) -> Result<Self> {
        let payload = EventPayload::from_value(event_type, raw)?;
        let occurred_at = parse_timestamp(raw).unwrap_or_else(Utc::now);
        Ok(Self {
            payload,
            occurred_at,
        })
    }

    pub fn event_type(&self) -> &str {
        self.payload.event_type()
    }
}

fn require_str(raw: &Value, event_type: &str, field: &str) -> Result<String> {
    match raw.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::String(_)) => Err(CoreError::validation(format!(
            "Event '{event_type}' field '{field}' must not be empty"
        ))),
        Some(other) => Err(CoreError::validation(format!(
            "Event '{event_type}' field '{field}' must be a string, got {other}"
        ))),
        None => Err(CoreError::validation(format!(
            "Event '{event_type}' is missing required field '{field}'"
        ))),
    }
}

fn require_f64(raw: &Value, event_type: &str, field: &str) -> Result<f64> {
    match raw.get(field) {
        Some(value) => value.as_f64().ok_or_else(|| {
            CoreError::validation(format!(
                "Event '{event_type}' field '{field}' must be numeric, got {value}"
            ))
        }),
        None => Err(CoreError::validation(format!(
            "Event '{event_type}' is missing required field '{field}'"
        ))),
    }
}

fn require_timestamp(raw: &Value, event_type: &str) -> Result<()> {
    if raw.get("timestamp").is_none() {
        return Err(CoreError::validation(format!(
            "Event '{event_type}' is missing required field 'timestamp'"
        )));
    }
    Ok(())
}

fn optional_str(raw: &Value, field: &str) -> Option<String> {
    raw.get(field)
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn parse_timestamp(raw: &Value) -> Option<DateTime<Utc>> {
    match raw.get("timestamp")? {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_purchase_missing_total_fails_validation() {
        let raw = json!({"user_id": "u1", "order_id": "o1"});
        let err = EventPayload::from_value("purchase_completed", &raw).unwrap_err();
        assert!(err.to_string().contains("total"));
    }

    #[test]
    fn test_purchase_parses_required_fields() {
        let raw = json!({"user_id": "u1", "order_id": "o1", "total": 299.0});
        let payload = EventPayload::from_value("purchase_completed", &raw).unwrap();
        assert_eq!(
            payload,
            EventPayload::PurchaseCompleted {
                user_id: "u1".to_string(),
                order_id: "o1".to_string(),
                total: 299.0,
            }
        );
    }

    #[test]
    fn test_lead_capture_with_behavior() {
        let raw = json!({
            "email": "a@b.com",
            "lead_magnet_type": "consultation_booking",
            "source": "direct_traffic",
            "behavior": {"pages_visited": 5, "time_on_site": 300, "return_visits": 2}
        });
        let payload = EventPayload::from_value("lead_capture", &raw).unwrap();
        match payload {
            EventPayload::LeadCapture { behavior, .. } => {
                assert_eq!(behavior.pages_visited, 5);
                assert_eq!(behavior.time_on_site, 300);
                assert_eq!(behavior.return_visits, 2);
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_type_requires_timestamp() {
        let raw = json!({"user_email": "a@b.com"});
        assert!(EventPayload::from_value("course_completion", &raw).is_err());

        let raw = json!({"user_email": "a@b.com", "timestamp": "2025-01-15T10:00:00Z"});
        let payload = EventPayload::from_value("course_completion", &raw).unwrap();
        assert_eq!(payload.event_type(), "course_completion");
        assert_eq!(payload.fields().get("user_email").unwrap(), "a@b.com");
    }

    #[test]
    fn test_event_timestamp_parsing() {
        let raw = json!({
            "user_email": "a@b.com",
            "timestamp": "2025-01-15T10:00:00Z"
        });
        let event = BusinessEvent::from_value("course_completion", &raw).unwrap();
        assert_eq!(event.occurred_at.to_rfc3339(), "2025-01-15T10:00:00+00:00");
    }

    #[test]
    fn test_empty_required_string_rejected() {
        let raw = json!({"page_url": "", "session_id": "s1"});
        assert!(EventPayload::from_value("page_view", &raw).is_err());
    }
}
