// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Sequential hook invocation for environment managers.
//!
//! The registry only hands back ordered sequences. Whoever drives the
//! snapshot decides what a failing hook means, so the runner has no default
//! policy: callers pick one explicitly.

use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::{HookError, HookResult, SnaphookError, SnaphookResult};
use crate::store::{HookEntry, HookSequence};
use crate::types::HookCategory;

/// What to do when a hook fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop at the first failure; remaining hooks are not invoked.
    Abort,
    /// Record the failure and invoke the remaining hooks.
    Continue,
}

impl FailurePolicy {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Abort => "abort",
            Self::Continue => "continue",
        }
    }
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "continue" => Ok(Self::Continue),
            other => Err(format!(
                "unknown failure policy '{}', expected 'abort' or 'continue'",
                other
            )),
        }
    }
}

/// Result of invoking one hook.
#[derive(Debug, Clone)]
pub struct HookOutcome {
    /// Position of the hook in its sequence.
    pub index: usize,
    pub hook: String,
    pub duration: Duration,
    pub result: HookResult,
}

impl HookOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcomes of a complete run over one sequence.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub category: HookCategory,
    pub outcomes: Vec<HookOutcome>,
}

impl RunReport {
    pub fn invoked(&self) -> usize {
        self.outcomes.len()
    }

    pub fn failures(&self) -> impl Iterator<Item = &HookOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn failed(&self) -> usize {
        self.failures().count()
    }

    pub fn total_duration(&self) -> Duration {
        self.outcomes.iter().map(|o| o.duration).sum()
    }
}

/// Invokes hook sequences in order under a fixed failure policy.
#[derive(Debug, Clone, Copy)]
pub struct HookRunner {
    policy: FailurePolicy,
}

impl HookRunner {
    pub fn new(policy: FailurePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Invoke every hook in `hooks`, in order.
    pub fn run(&self, category: HookCategory, hooks: &HookSequence) -> SnaphookResult<RunReport> {
        self.run_with(category, hooks, |_| {})
    }

    /// Like [`run`](Self::run), reporting each outcome to `observe` as soon
    /// as the hook returns.
    pub fn run_with<O>(
        &self,
        category: HookCategory,
        hooks: &HookSequence,
        mut observe: O,
    ) -> SnaphookResult<RunReport>
    where
        O: FnMut(&HookOutcome),
    {
        tracing::info!(
            category = category.name(),
            hooks = hooks.len(),
            policy = self.policy.name(),
            "Running hooks"
        );

        let mut outcomes = Vec::with_capacity(hooks.len());

        for (index, entry) in hooks.iter().enumerate() {
            let outcome = invoke(index, entry);
            observe(&outcome);

            match &outcome.result {
                Ok(()) => {
                    tracing::debug!(
                        category = category.name(),
                        index,
                        hook = %outcome.hook,
                        duration_us = outcome.duration.as_micros() as u64,
                        "Hook completed"
                    );
                }
                Err(e) if self.policy == FailurePolicy::Abort => {
                    tracing::error!(
                        category = category.name(),
                        index,
                        hook = %outcome.hook,
                        error = %e,
                        skipped = hooks.len() - index - 1,
                        "Hook failed, aborting sequence"
                    );
                    return Err(SnaphookError::HookAborted {
                        category,
                        index,
                        hook: outcome.hook,
                        source: e.clone(),
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        category = category.name(),
                        index,
                        hook = %outcome.hook,
                        error = %e,
                        "Hook failed, continuing"
                    );
                }
            }

            outcomes.push(outcome);
        }

        Ok(RunReport { category, outcomes })
    }
}

fn invoke(index: usize, entry: &HookEntry) -> HookOutcome {
    let start = Instant::now();
    let result = match panic::catch_unwind(AssertUnwindSafe(|| entry.invoke())) {
        Ok(result) => result,
        Err(payload) => Err(HookError::Panicked {
            message: panic_message(payload.as_ref()),
        }),
    };

    HookOutcome {
        index,
        hook: entry.target().name().to_string(),
        duration: start.elapsed(),
        result,
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::HookRegistry;
    use crate::types::{Hook, HookArgs};
    use std::sync::{Arc, Mutex};

    fn recording(log: &Arc<Mutex<Vec<String>>>, name: &str) -> Hook {
        let log = Arc::clone(log);
        Hook::named(name, move |args: &HookArgs| {
            let tag: String = args.keyword_or("tag", String::new())?;
            log.lock().unwrap().push(tag);
            Ok(())
        })
    }

    fn failing(name: &str) -> Hook {
        Hook::named(name, |_: &HookArgs| Err(HookError::failed("boom")))
    }

    #[test]
    fn test_runs_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = HookRegistry::new();
        for tag in ["a", "b", "c"] {
            registry.register_before_snapshot(
                recording(&log, tag),
                HookArgs::new().kwarg("tag", tag),
            );
        }

        let report = HookRunner::new(FailurePolicy::Abort)
            .run(HookCategory::BeforeSnapshot, &registry.get_before_snapshot())
            .unwrap();

        assert_eq!(report.invoked(), 3);
        assert_eq!(report.failed(), 0);
        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_abort_stops_sequence() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = HookRegistry::new();
        let first = recording(&log, "first");
        let third = recording(&log, "third");
        registry.register_after_restore(first, HookArgs::new().kwarg("tag", "1"));
        registry.register_after_restore(failing("broken"), HookArgs::new());
        registry.register_after_restore(third, HookArgs::new().kwarg("tag", "3"));

        let hooks = registry.get_after_restore();
        let mut seen = 0;
        let err = HookRunner::new(FailurePolicy::Abort)
            .run_with(HookCategory::AfterRestore, &hooks, |_| seen += 1)
            .unwrap_err();

        assert!(matches!(
            err,
            SnaphookError::HookAborted { index: 1, ref hook, .. } if hook == "broken"
        ));
        assert_eq!(seen, 2);
        assert_eq!(*log.lock().unwrap(), vec!["1"]);
    }

    #[test]
    fn test_continue_runs_everything() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = HookRegistry::new();
        registry.register_after_restore(failing("broken"), HookArgs::new());
        let after = recording(&log, "after");
        registry.register_after_restore(after, HookArgs::new().kwarg("tag", "ok"));

        let report = HookRunner::new(FailurePolicy::Continue)
            .run(HookCategory::AfterRestore, &registry.get_after_restore())
            .unwrap();

        assert_eq!(report.invoked(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.failures().next().unwrap().hook, "broken");
        assert_eq!(*log.lock().unwrap(), vec!["ok"]);
    }

    #[test]
    fn test_panicking_hook_is_reported() {
        let mut registry = HookRegistry::new();
        registry.register_before_snapshot(
            Hook::named("explodes", |_: &HookArgs| panic!("kaboom")),
            HookArgs::new(),
        );

        let report = HookRunner::new(FailurePolicy::Continue)
            .run(HookCategory::BeforeSnapshot, &registry.get_before_snapshot())
            .unwrap();

        assert_eq!(
            report.outcomes[0].result,
            Err(HookError::Panicked {
                message: "kaboom".to_string()
            })
        );
    }

    #[test]
    fn test_empty_sequence() {
        let report = HookRunner::new(FailurePolicy::Abort)
            .run(HookCategory::AfterRestore, &HookSequence::default())
            .unwrap();
        assert_eq!(report.invoked(), 0);
        assert_eq!(report.total_duration(), Duration::ZERO);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("abort".parse::<FailurePolicy>(), Ok(FailurePolicy::Abort));
        assert_eq!(
            "Continue".parse::<FailurePolicy>(),
            Ok(FailurePolicy::Continue)
        );
        assert!("retry".parse::<FailurePolicy>().is_err());
    }
}
