// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Environment manager: drives registered hooks around snapshot and restore.
//!
//! `SIGUSR1` prepares the process for a snapshot (before-snapshot hooks),
//! `SIGUSR2` completes a restore (after-restore hooks). The freeze itself is
//! performed by whatever sent the signals.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::signal::unix::{signal, Signal, SignalKind};
use uuid::Uuid;

use snaphook_core::{
    FailurePolicy, HookCategory, HookRegistry, HookRunner, LifecycleMachine, LifecycleMetrics,
    LifecycleState, RunReport, SnaphookResult,
};

use crate::metrics;

/// Owns the lifecycle state and invokes hooks from a frozen registry.
pub struct LifecycleManager {
    registry: Arc<HookRegistry>,
    runner: HookRunner,
    machine: Mutex<LifecycleMachine>,
}

impl LifecycleManager {
    pub fn new(registry: Arc<HookRegistry>, policy: FailurePolicy) -> Self {
        Self {
            registry,
            runner: HookRunner::new(policy),
            machine: Mutex::new(LifecycleMachine::new()),
        }
    }

    fn machine(&self) -> MutexGuard<'_, LifecycleMachine> {
        self.machine.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn transition(machine: &mut LifecycleMachine, to: LifecycleState) -> SnaphookResult<()> {
        machine.transition_to(to)?;
        metrics::record_transition(to);
        Ok(())
    }

    pub fn state(&self) -> LifecycleState {
        self.machine().state()
    }

    pub fn metrics(&self) -> LifecycleMetrics {
        LifecycleMetrics::from(&*self.machine())
    }

    /// Initialization is over; start serving.
    pub fn start(&self) -> SnaphookResult<()> {
        Self::transition(&mut self.machine(), LifecycleState::Running)?;
        tracing::info!(
            before_snapshot = self.registry.len(HookCategory::BeforeSnapshot),
            after_restore = self.registry.len(HookCategory::AfterRestore),
            policy = %self.runner.policy(),
            "Lifecycle manager started"
        );
        Ok(())
    }

    /// Run before-snapshot hooks. On success the process may be frozen; if
    /// the run aborts the process goes back to serving.
    pub fn prepare_snapshot(&self) -> SnaphookResult<RunReport> {
        let span = tracing::info_span!("snapshot", cycle = %Uuid::new_v4());
        let _enter = span.enter();

        let mut machine = self.machine();
        Self::transition(&mut machine, LifecycleState::Snapshotting)?;

        let hooks = self.registry.get_before_snapshot();
        let category = HookCategory::BeforeSnapshot;
        match self
            .runner
            .run_with(category, &hooks, |o| metrics::record_hook(category, o))
        {
            Ok(report) => {
                Self::transition(&mut machine, LifecycleState::Snapshotted)?;
                tracing::info!(
                    invoked = report.invoked(),
                    failed = report.failed(),
                    duration_us = report.total_duration().as_micros() as u64,
                    "Ready for snapshot"
                );
                Ok(report)
            }
            Err(e) => {
                Self::transition(&mut machine, LifecycleState::Running)?;
                Err(e)
            }
        }
    }

    /// Run after-restore hooks and resume serving.
    pub fn complete_restore(&self) -> SnaphookResult<RunReport> {
        let span = tracing::info_span!("restore", cycle = %Uuid::new_v4());
        let _enter = span.enter();

        let mut machine = self.machine();
        Self::transition(&mut machine, LifecycleState::Restoring)?;

        let hooks = self.registry.get_after_restore();
        let category = HookCategory::AfterRestore;
        let result = self
            .runner
            .run_with(category, &hooks, |o| metrics::record_hook(category, o));

        // The process is thawed either way; there is no snapshot to go back to.
        Self::transition(&mut machine, LifecycleState::Running)?;

        let report = result?;
        tracing::info!(
            invoked = report.invoked(),
            failed = report.failed(),
            duration_us = report.total_duration().as_micros() as u64,
            "Restore complete"
        );
        Ok(report)
    }
}

/// Handlers for the lifecycle signals.
///
/// Installing replaces the default action of `SIGUSR1`/`SIGUSR2`, which would
/// terminate the process, so this has to happen before anyone can learn our PID.
pub struct LifecycleSignals {
    snapshot: Signal,
    restore: Signal,
}

impl LifecycleSignals {
    pub fn install() -> std::io::Result<Self> {
        Ok(Self {
            snapshot: signal(SignalKind::user_defined1())?,
            restore: signal(SignalKind::user_defined2())?,
        })
    }
}

/// Handle lifecycle signals until the task is dropped.
pub async fn listen(manager: Arc<LifecycleManager>, signals: LifecycleSignals) {
    let LifecycleSignals {
        mut snapshot,
        mut restore,
    } = signals;

    loop {
        let category = tokio::select! {
            Some(()) = snapshot.recv() => HookCategory::BeforeSnapshot,
            Some(()) = restore.recv() => HookCategory::AfterRestore,
            else => break,
        };

        let m = Arc::clone(&manager);
        let joined = tokio::task::spawn_blocking(move || match category {
            HookCategory::BeforeSnapshot => m.prepare_snapshot(),
            HookCategory::AfterRestore => m.complete_restore(),
        })
        .await;

        match joined {
            Ok(Ok(_)) => {
                tracing::debug!(state = %manager.state(), "Lifecycle event handled");
            }
            Ok(Err(e)) => {
                tracing::error!(category = %category, "Lifecycle event failed: {}", e);
            }
            Err(e) => {
                tracing::error!(category = %category, "Lifecycle task panicked: {}", e);
            }
        }
    }

    tracing::error!("Lifecycle signal streams closed; snapshot and restore are disabled");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use nix::sys::signal::{raise, Signal as Sig};
    use snaphook_core::{Hook, HookArgs, HookError, HookResult, SnaphookError};

    fn noop(_: &HookArgs) -> HookResult {
        Ok(())
    }

    async fn wait_for(manager: &LifecycleManager, state: LifecycleState) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while manager.state() != state {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("manager stuck in {}, wanted {}", manager.state(), state));
    }

    fn manager_with(
        policy: FailurePolicy,
        register: impl FnOnce(&mut HookRegistry),
    ) -> LifecycleManager {
        let mut registry = HookRegistry::new();
        register(&mut registry);
        let manager = LifecycleManager::new(registry.into_shared(), policy);
        manager.start().unwrap();
        manager
    }

    #[test]
    fn test_snapshot_and_restore() {
        let manager = manager_with(FailurePolicy::Abort, |r| {
            r.before_snapshot(noop);
            r.after_restore(noop);
        });

        let report = manager.prepare_snapshot().unwrap();
        assert_eq!(report.invoked(), 1);
        assert_eq!(manager.state(), LifecycleState::Snapshotted);

        manager.complete_restore().unwrap();
        assert_eq!(manager.state(), LifecycleState::Running);
        assert_eq!(manager.metrics().restore_count, 1);
    }

    #[test]
    fn test_aborted_snapshot_resumes_service() {
        let manager = manager_with(FailurePolicy::Abort, |r| {
            r.register_before_snapshot(
                Hook::named("fails", |_: &HookArgs| Err(HookError::failed("busy"))),
                HookArgs::new(),
            );
        });

        let err = manager.prepare_snapshot().unwrap_err();
        assert!(matches!(err, SnaphookError::HookAborted { .. }));
        assert_eq!(manager.state(), LifecycleState::Running);
    }

    #[test]
    fn test_continue_policy_reaches_snapshotted() {
        let manager = manager_with(FailurePolicy::Continue, |r| {
            r.register_before_snapshot(
                Hook::named("fails", |_: &HookArgs| Err(HookError::failed("busy"))),
                HookArgs::new(),
            );
        });

        let report = manager.prepare_snapshot().unwrap();
        assert_eq!(report.failed(), 1);
        assert_eq!(manager.state(), LifecycleState::Snapshotted);
    }

    #[test]
    fn test_restore_without_snapshot_is_rejected() {
        let manager = manager_with(FailurePolicy::Abort, |_| {});

        let err = manager.complete_restore().unwrap_err();
        assert!(matches!(err, SnaphookError::InvalidStateTransition(_)));
        assert_eq!(manager.state(), LifecycleState::Running);
    }

    // The only test in this binary that raises signals; handlers are
    // process-wide, so a second one would see these too.
    #[tokio::test]
    async fn test_signals_drive_snapshot_and_restore() {
        let manager = Arc::new(manager_with(FailurePolicy::Abort, |r| {
            r.before_snapshot(noop);
            r.after_restore(noop);
        }));

        // Raised before the listener is first polled: the installed handler
        // must already catch it instead of the default terminate action.
        let signals = LifecycleSignals::install().unwrap();
        raise(Sig::SIGUSR1).unwrap();
        let task = tokio::spawn(listen(Arc::clone(&manager), signals));

        wait_for(&manager, LifecycleState::Snapshotted).await;
        assert_eq!(manager.metrics().snapshot_count, 1);

        raise(Sig::SIGUSR2).unwrap();
        wait_for(&manager, LifecycleState::Running).await;
        assert_eq!(manager.metrics().restore_count, 1);

        task.abort();
    }
}
