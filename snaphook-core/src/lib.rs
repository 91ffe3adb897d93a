// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! snaphook Core Library
//!
//! Ordered registry of hooks to run right before a process is frozen into a
//! snapshot and right after it is restored. Also provides the lifecycle
//! state machine and hook runner an environment manager needs to drive
//! those hooks, plus configuration parsing.

pub mod config;
pub mod error;
pub mod registry;
pub mod runner;
pub mod state;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::{Config, ConfigLoader, LifecycleConfig, ServerConfig};
pub use error::{
    HardValidationError, HookError, HookResult, SnaphookError, SnaphookResult,
    StateTransitionError,
};
pub use registry::HookRegistry;
pub use runner::{FailurePolicy, HookOutcome, HookRunner, RunReport};
pub use state::{LifecycleMachine, LifecycleMetrics, LifecycleState};
pub use store::{HookEntry, HookSequence, HookStore};
pub use types::{Hook, HookArgs, HookCategory};
