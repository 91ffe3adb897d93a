// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Append-only storage for registered hooks.
//!
//! One ordered sequence per [`HookCategory`]. Entries are only ever appended
//! and read back; nothing is reordered, deduplicated, or removed.

use std::ops::Index;
use std::slice;

use crate::types::{Hook, HookArgs, HookCategory};

/// One registered hook plus the arguments it will be invoked with.
#[derive(Debug, Clone, PartialEq)]
pub struct HookEntry {
    target: Hook,
    args: HookArgs,
}

impl HookEntry {
    pub fn new(target: Hook, args: HookArgs) -> Self {
        Self { target, args }
    }

    pub fn target(&self) -> &Hook {
        &self.target
    }

    pub fn args(&self) -> &HookArgs {
        &self.args
    }

    /// Invoke the target with its bound arguments.
    pub fn invoke(&self) -> crate::HookResult {
        self.target.call(&self.args)
    }
}

/// Read-only copy of a category's entries, taken at read time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HookSequence {
    entries: Vec<HookEntry>,
}

impl HookSequence {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&HookEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> slice::Iter<'_, HookEntry> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[HookEntry] {
        &self.entries
    }
}

impl Index<usize> for HookSequence {
    type Output = HookEntry;

    fn index(&self, index: usize) -> &HookEntry {
        &self.entries[index]
    }
}

impl<'a> IntoIterator for &'a HookSequence {
    type Item = &'a HookEntry;
    type IntoIter = slice::Iter<'a, HookEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Storage for both hook categories.
#[derive(Debug, Default)]
pub struct HookStore {
    before_snapshot: Vec<HookEntry>,
    after_restore: Vec<HookEntry>,
}

impl HookStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self, category: HookCategory) -> &Vec<HookEntry> {
        match category {
            HookCategory::BeforeSnapshot => &self.before_snapshot,
            HookCategory::AfterRestore => &self.after_restore,
        }
    }

    /// Add `entry` to the end of `category`'s sequence.
    pub fn append(&mut self, category: HookCategory, entry: HookEntry) {
        match category {
            HookCategory::BeforeSnapshot => self.before_snapshot.push(entry),
            HookCategory::AfterRestore => self.after_restore.push(entry),
        }
    }

    /// Copy out every entry of `category` in registration order.
    pub fn read_all(&self, category: HookCategory) -> HookSequence {
        HookSequence {
            entries: self.entries(category).clone(),
        }
    }

    pub fn len(&self, category: HookCategory) -> usize {
        self.entries(category).len()
    }

    pub fn is_empty(&self, category: HookCategory) -> bool {
        self.entries(category).is_empty()
    }
}
