// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Hook registry: the registration and retrieval surface.
//!
//! Application code registers hooks while the process initializes. The
//! environment manager later reads each category back in registration order
//! and decides how to invoke it. The registry never calls a hook itself.
//!
//! ```
//! use snaphook_core::{HookArgs, HookRegistry, HookResult};
//!
//! fn flush_cache(_: &HookArgs) -> HookResult {
//!     Ok(())
//! }
//!
//! let mut registry = HookRegistry::new();
//! let flush_cache = registry.before_snapshot(flush_cache);
//! assert!(flush_cache(&HookArgs::new()).is_ok());
//! assert_eq!(registry.get_before_snapshot().len(), 1);
//! ```

use std::sync::Arc;

use crate::error::HookResult;
use crate::store::{HookEntry, HookSequence, HookStore};
use crate::types::{Hook, HookArgs, HookCategory};

/// Owner of the before-snapshot and after-restore hook sequences.
///
/// Registration needs `&mut self`; share the registry behind an `Arc` once
/// initialization is over and only reads remain.
#[derive(Debug, Default)]
pub struct HookRegistry {
    store: HookStore,
}

impl HookRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Freeze the registry for shared, read-only use.
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Register `target` under `category` with bound `args`.
    /// Always succeeds and returns `target` unchanged.
    pub fn register(&mut self, category: HookCategory, target: Hook, args: HookArgs) -> Hook {
        tracing::debug!(
            category = category.name(),
            hook = target.name(),
            positional = args.positional().len(),
            keyword = args.keyword().len(),
            position = self.store.len(category),
            "Registered hook"
        );

        self.store.append(category, HookEntry::new(target.clone(), args));
        target
    }

    /// Register a hook to run before a snapshot is taken.
    pub fn register_before_snapshot(&mut self, target: Hook, args: HookArgs) -> Hook {
        self.register(HookCategory::BeforeSnapshot, target, args)
    }

    /// Register a hook to run after the environment is restored from a snapshot.
    pub fn register_after_restore(&mut self, target: Hook, args: HookArgs) -> Hook {
        self.register(HookCategory::AfterRestore, target, args)
    }

    /// Register a plain function with no bound arguments and hand it back.
    ///
    /// The returned value is the function passed in, so the caller can keep
    /// calling it exactly as before.
    pub fn wrap<F>(&mut self, category: HookCategory, func: F) -> F
    where
        F: Fn(&HookArgs) -> HookResult + Clone + Send + Sync + 'static,
    {
        self.register(category, Hook::new(func.clone()), HookArgs::new());
        func
    }

    /// Wrapping form of [`register_before_snapshot`](Self::register_before_snapshot).
    pub fn before_snapshot<F>(&mut self, func: F) -> F
    where
        F: Fn(&HookArgs) -> HookResult + Clone + Send + Sync + 'static,
    {
        self.wrap(HookCategory::BeforeSnapshot, func)
    }

    /// Wrapping form of [`register_after_restore`](Self::register_after_restore).
    pub fn after_restore<F>(&mut self, func: F) -> F
    where
        F: Fn(&HookArgs) -> HookResult + Clone + Send + Sync + 'static,
    {
        self.wrap(HookCategory::AfterRestore, func)
    }

    /// Every hook registered under `category`, in registration order.
    pub fn get(&self, category: HookCategory) -> HookSequence {
        self.store.read_all(category)
    }

    /// Hooks to run before a snapshot, in registration order.
    pub fn get_before_snapshot(&self) -> HookSequence {
        self.get(HookCategory::BeforeSnapshot)
    }

    /// Hooks to run after a restore, in registration order.
    pub fn get_after_restore(&self) -> HookSequence {
        self.get(HookCategory::AfterRestore)
    }

    /// Get the number of hooks registered under `category`.
    pub fn len(&self, category: HookCategory) -> usize {
        self.store.len(category)
    }

    /// Check whether `category` has no hooks yet.
    pub fn is_empty(&self, category: HookCategory) -> bool {
        self.store.is_empty(category)
    }
}
