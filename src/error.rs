//! # Core Error Types
//!
//! Error taxonomy for the automation core using thiserror for structured
//! error types instead of `Box<dyn Error>` patterns.
//!
//! Propagation policy: validation and routing errors are handled at the
//! boundary and never corrupt shared state; step and init errors surface to
//! the caller with partial workflow/registry state intact for diagnosis.
//! There is no automatic retry anywhere in the core.

use thiserror::Error;

/// Errors produced by the orchestration and routing core
#[derive(Error, Debug)]
pub enum CoreError {
    /// Malformed or incomplete event. Never dispatched to handlers.
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// No applicable routing rule or table entry. Callers fall back to a
    /// documented default; this variant is recoverable, never fatal.
    #[error("Routing error for {subject}: {message}")]
    Routing { subject: String, message: String },

    /// A workflow step's collaborator call failed. Halts the workflow.
    #[error("Step '{step}' failed for subject '{subject}': {message}")]
    Step {
        subject: String,
        step: String,
        message: String,
    },

    /// A service failed to start. Aborts orchestrator startup entirely.
    #[error("Service '{service}' failed to initialize: {message}")]
    Init { service: String, message: String },

    /// A health probe failed. Logged and reflected in aggregate status,
    /// never fatal.
    #[error("Health check failed for '{service}': {message}")]
    HealthCheck { service: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn step(
        subject: impl Into<String>,
        step: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Step {
            subject: subject.into(),
            step: step.into(),
            message: message.into(),
        }
    }

    /// Whether the error leaves the system in a usable state and the caller
    /// can continue with a documented fallback.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::Routing { .. } | Self::HealthCheck { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
