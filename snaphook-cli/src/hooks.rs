// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Application hooks registered by `snaphook serve` at startup.
//!
//! Every clone restored from one snapshot starts with identical memory, so
//! anything meant to be unique per instance has to be regenerated after
//! restore. The instance id below is the canonical example.

use std::io::Write;
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use uuid::Uuid;

use snaphook_core::{Hook, HookArgs, HookError, HookRegistry, HookResult};

/// Per-instance identity of this process.
#[derive(Debug)]
pub struct Instance {
    inner: RwLock<InstanceInfo>,
}

#[derive(Debug, Clone)]
struct InstanceInfo {
    id: Uuid,
    frozen_at: Option<SystemTime>,
}

impl Instance {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: RwLock::new(InstanceInfo {
                id: Uuid::new_v4(),
                frozen_at: None,
            }),
        })
    }

    pub fn id(&self) -> Uuid {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).id
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, InstanceInfo>, HookError> {
        self.inner
            .write()
            .map_err(|_| HookError::failed("instance state lock poisoned"))
    }
}

/// Register the application's hooks on `registry`.
pub fn register(registry: &mut HookRegistry, instance: &Arc<Instance>) {
    let inst = Arc::clone(instance);
    registry.register_before_snapshot(
        Hook::named("record_freeze_time", move |_: &HookArgs| {
            inst.write()?.frozen_at = Some(SystemTime::now());
            Ok(())
        }),
        HookArgs::new(),
    );

    registry.before_snapshot(flush_stdio);

    let inst = Arc::clone(instance);
    registry.register_after_restore(
        Hook::named("regenerate_instance_id", move |args: &HookArgs| {
            let service: String = args.keyword_or("service", "snaphook".to_string())?;
            let mut info = inst.write()?;
            let previous = std::mem::replace(&mut info.id, Uuid::new_v4());

            let frozen_ms = info
                .frozen_at
                .take()
                .and_then(|t| t.elapsed().ok())
                .map(|d| d.as_millis() as u64);

            tracing::info!(
                service = %service,
                previous = %previous,
                instance_id = %info.id,
                frozen_ms = ?frozen_ms,
                "Instance restored from snapshot"
            );
            Ok(())
        }),
        HookArgs::new().kwarg("service", env!("CARGO_PKG_NAME")),
    );
}

fn flush_stdio(_: &HookArgs) -> HookResult {
    std::io::stdout()
        .flush()
        .and_then(|_| std::io::stderr().flush())
        .map_err(|e| HookError::failed(format!("flushing stdio: {}", e)))
}
