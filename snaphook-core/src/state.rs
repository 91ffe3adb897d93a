// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Process lifecycle state machine, as seen by the environment manager.
//!
//! Implements the snapshot cycle: Initializing → Running → Snapshotting →
//! Snapshotted → Restoring → Running. A failed snapshot preparation drops
//! back from Snapshotting to Running. Invalid transitions result in
//! StateTransitionError.
//!
//! The hook registry does not consult this machine; hooks may be registered
//! in any phase.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::StateTransitionError;

/// Lifecycle phases of a snapshot-capable process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    /// Process is starting up; hooks are normally registered here.
    Initializing,

    /// Process is serving normally.
    Running,

    /// Before-snapshot hooks are running.
    Snapshotting,

    /// Before-snapshot hooks finished; the environment may be frozen.
    Snapshotted,

    /// Environment was thawed and after-restore hooks are running.
    Restoring,
}

impl LifecycleState {
    /// Get the state name for error messages.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Initializing => "Initializing",
            Self::Running => "Running",
            Self::Snapshotting => "Snapshotting",
            Self::Snapshotted => "Snapshotted",
            Self::Restoring => "Restoring",
        }
    }

    /// Check if transition to the target state is valid.
    pub fn can_transition_to(&self, target: LifecycleState) -> bool {
        matches!(
            (self, target),
            (Self::Initializing, Self::Running) |
            (Self::Running, Self::Snapshotting) |
            // Aborted preparation returns to service
            (Self::Snapshotting, Self::Running) |
            (Self::Snapshotting, Self::Snapshotted) |
            (Self::Snapshotted, Self::Restoring) |
            (Self::Restoring, Self::Running)
        )
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// State machine for the process lifecycle.
/// Enforces valid transitions and tracks timing metrics.
#[derive(Debug)]
pub struct LifecycleMachine {
    current_state: LifecycleState,
    last_transition: Instant,
    transition_count: u64,
    snapshot_count: u64,
    restore_count: u64,
}

impl LifecycleMachine {
    /// Create a machine in the Initializing state.
    pub fn new() -> Self {
        Self {
            current_state: LifecycleState::Initializing,
            last_transition: Instant::now(),
            transition_count: 0,
            snapshot_count: 0,
            restore_count: 0,
        }
    }

    /// Get the current state.
    pub fn state(&self) -> LifecycleState {
        self.current_state
    }

    /// Get time since last transition.
    pub fn time_in_current_state(&self) -> std::time::Duration {
        self.last_transition.elapsed()
    }

    /// Get total number of transitions.
    pub fn transition_count(&self) -> u64 {
        self.transition_count
    }

    /// Number of completed snapshot preparations.
    pub fn snapshot_count(&self) -> u64 {
        self.snapshot_count
    }

    /// Number of completed restores.
    pub fn restore_count(&self) -> u64 {
        self.restore_count
    }

    /// Attempt to transition to a new state.
    pub fn transition_to(&mut self, target: LifecycleState) -> Result<(), StateTransitionError> {
        if !self.current_state.can_transition_to(target) {
            return Err(StateTransitionError::InvalidTransition {
                from: self.current_state.name(),
                to: target.name(),
            });
        }

        tracing::debug!(
            from = self.current_state.name(),
            to = target.name(),
            "Lifecycle transition"
        );

        match (self.current_state, target) {
            (LifecycleState::Snapshotting, LifecycleState::Snapshotted) => {
                self.snapshot_count += 1
            }
            (LifecycleState::Restoring, LifecycleState::Running) => self.restore_count += 1,
            _ => {}
        }

        self.current_state = target;
        self.last_transition = Instant::now();
        self.transition_count += 1;

        Ok(())
    }

    /// Check if the process is serving requests.
    pub fn is_serving(&self) -> bool {
        matches!(self.current_state, LifecycleState::Running)
    }

    /// Check if the process is ready to be frozen.
    pub fn is_frozen_ready(&self) -> bool {
        matches!(self.current_state, LifecycleState::Snapshotted)
    }
}

impl Default for LifecycleMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Metrics for the lifecycle machine.
#[derive(Debug, Clone, Serialize)]
pub struct LifecycleMetrics {
    pub current_state: String,
    pub time_in_state_ms: u64,
    pub transition_count: u64,
    pub snapshot_count: u64,
    pub restore_count: u64,
}

impl From<&LifecycleMachine> for LifecycleMetrics {
    fn from(sm: &LifecycleMachine) -> Self {
        Self {
            current_state: sm.current_state.name().to_string(),
            time_in_state_ms: sm.time_in_current_state().as_millis() as u64,
            transition_count: sm.transition_count,
            snapshot_count: sm.snapshot_count,
            restore_count: sm.restore_count,
        }
    }
}
