// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Prometheus metrics for hook runs and lifecycle transitions.

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
};

use snaphook_core::{HookCategory, HookOutcome, LifecycleState};

lazy_static! {
    pub static ref HOOK_INVOCATIONS: IntCounterVec = register_int_counter_vec!(
        "snaphook_hook_invocations_total",
        "Total number of hook invocations",
        &["category", "outcome"]
    )
    .unwrap();
    pub static ref HOOK_DURATION: HistogramVec = register_histogram_vec!(
        "snaphook_hook_duration_seconds",
        "Time spent inside a single hook",
        &["category"],
        vec![0.0001, 0.0005, 0.001, 0.005, 0.010, 0.050, 0.100, 0.500, 1.0]
    )
    .unwrap();
    pub static ref LIFECYCLE_TRANSITIONS: IntCounterVec = register_int_counter_vec!(
        "snaphook_lifecycle_transitions_total",
        "Total number of lifecycle state transitions",
        &["to"]
    )
    .unwrap();
}

/// Create every hook series at zero so `/metrics` lists them before the
/// first lifecycle event.
pub fn init() {
    for category in HookCategory::ALL {
        for result in ["ok", "error"] {
            HOOK_INVOCATIONS.with_label_values(&[category.name(), result]);
        }
        HOOK_DURATION.with_label_values(&[category.name()]);
    }
}

/// Record one hook invocation.
pub fn record_hook(category: HookCategory, outcome: &HookOutcome) {
    let result = if outcome.is_success() { "ok" } else { "error" };
    HOOK_INVOCATIONS
        .with_label_values(&[category.name(), result])
        .inc();
    HOOK_DURATION
        .with_label_values(&[category.name()])
        .observe(outcome.duration.as_secs_f64());
}

/// Record a lifecycle transition.
pub fn record_transition(to: LifecycleState) {
    LIFECYCLE_TRANSITIONS.with_label_values(&[to.name()]).inc();
}

/// Render every registered metric in the Prometheus text format.
pub fn render() -> String {
    let encoder = prometheus::TextEncoder::new();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
    }

    String::from_utf8(buffer).unwrap_or_else(|_| String::from("Encoding error"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use snaphook_core::HookError;
    use std::time::Duration;

    #[test]
    fn test_record_hook_counts_outcomes() {
        let ok = HookOutcome {
            index: 0,
            hook: "ok".to_string(),
            duration: Duration::from_micros(50),
            result: Ok(()),
        };
        let failed = HookOutcome {
            index: 1,
            hook: "failed".to_string(),
            duration: Duration::from_micros(50),
            result: Err(HookError::failed("boom")),
        };

        let before = HOOK_INVOCATIONS
            .with_label_values(&["after-restore", "error"])
            .get();
        record_hook(HookCategory::AfterRestore, &ok);
        record_hook(HookCategory::AfterRestore, &failed);

        assert_eq!(
            HOOK_INVOCATIONS
                .with_label_values(&["after-restore", "error"])
                .get(),
            before + 1
        );
        assert!(render().contains("snaphook_hook_invocations_total"));
    }

    #[test]
    fn test_init_exposes_every_category() {
        init();

        let text = render();
        for category in HookCategory::ALL {
            let series = format!(
                "snaphook_hook_invocations_total{{category=\"{}\",outcome=\"ok\"}}",
                category.name()
            );
            assert!(text.contains(&series), "missing {}", series);
        }
    }
}
