//! Custom error types for snaphook.
//!
//! Every failure is an explicit enum variant. Registration itself never
//! fails; errors come from configuration, lifecycle transitions, and hook
//! invocation.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::HookCategory;

/// Top-level error type for snaphook.
#[derive(Debug, Error)]
pub enum SnaphookError {
    // =========================================================================
    // Configuration Errors - Fail-Fast on Invalid Config
    // =========================================================================
    #[error("Hard validation error: {0}")]
    HardValidation(#[from] HardValidationError),

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String },

    // =========================================================================
    // Lifecycle Errors
    // =========================================================================
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(#[from] StateTransitionError),

    #[error("{category} hook #{index} ({hook}) aborted the sequence: {source}")]
    HookAborted {
        category: HookCategory,
        index: usize,
        hook: String,
        #[source]
        source: HookError,
    },

    // =========================================================================
    // System Errors
    // =========================================================================
    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Hard validation errors prevent the process from starting.
#[derive(Debug, Error)]
pub enum HardValidationError {
    #[error("Invalid field value: {field} = {value} - {reason}")]
    InvalidFieldValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid port: {port} - {reason}")]
    InvalidPort { port: u16, reason: String },
}

/// State transition errors for the lifecycle state machine.
#[derive(Debug, Error)]
pub enum StateTransitionError {
    #[error("Cannot transition from {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },
}

/// Errors raised by a hook while it runs.
///
/// Argument mismatches land here too: bound arguments are never checked
/// against the hook when it is registered, only when it is called.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HookError {
    #[error("missing positional argument at index {index}")]
    MissingPositional { index: usize },

    #[error("missing keyword argument '{name}'")]
    MissingKeyword { name: String },

    #[error("argument {argument} has the wrong type: {reason}")]
    InvalidArgument { argument: String, reason: String },

    #[error("hook failed: {message}")]
    Failed { message: String },

    #[error("hook panicked: {message}")]
    Panicked { message: String },
}

impl HookError {
    /// Convenience constructor for hooks reporting their own failure.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

/// Result type returned by every hook.
pub type HookResult = Result<(), HookError>;

/// Result type alias using SnaphookError.
pub type SnaphookResult<T> = Result<T, SnaphookError>;
