// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Hook targets, bound arguments, and hook categories.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{HookError, HookResult};

/// Lifecycle point a hook is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HookCategory {
    /// Runs right before the environment is frozen into a snapshot.
    BeforeSnapshot,
    /// Runs right after the environment is thawed from a snapshot.
    AfterRestore,
}

impl HookCategory {
    pub const ALL: [HookCategory; 2] = [Self::BeforeSnapshot, Self::AfterRestore];

    /// Get the category name for logs and metric labels.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::BeforeSnapshot => "before-snapshot",
            Self::AfterRestore => "after-restore",
        }
    }
}

impl fmt::Display for HookCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Arguments bound to a hook at registration and handed back on invocation.
///
/// Values are stored verbatim. Nothing checks them against what the hook
/// expects until the hook reads them through the typed getters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HookArgs {
    #[serde(default)]
    positional: Vec<Value>,
    #[serde(default)]
    keyword: BTreeMap<String, Value>,
}

impl HookArgs {
    /// Create an empty argument set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from already collected positional and keyword arguments.
    pub fn from_parts(positional: Vec<Value>, keyword: BTreeMap<String, Value>) -> Self {
        Self {
            positional,
            keyword,
        }
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Bind a keyword argument. Binding the same name twice keeps the last value.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.insert(name.into(), value.into());
        self
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    pub fn keyword(&self) -> &BTreeMap<String, Value> {
        &self.keyword
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }

    /// Decode the positional argument at `index`.
    pub fn get_positional<T: DeserializeOwned>(&self, index: usize) -> Result<T, HookError> {
        let value = self
            .positional
            .get(index)
            .ok_or(HookError::MissingPositional { index })?;
        decode(value, || format!("#{}", index))
    }

    /// Decode the keyword argument `name`.
    pub fn get_keyword<T: DeserializeOwned>(&self, name: &str) -> Result<T, HookError> {
        let value = self
            .keyword
            .get(name)
            .ok_or_else(|| HookError::MissingKeyword {
                name: name.to_string(),
            })?;
        decode(value, || format!("'{}'", name))
    }

    /// Decode the keyword argument `name`, falling back to `default` when unbound.
    pub fn keyword_or<T: DeserializeOwned>(&self, name: &str, default: T) -> Result<T, HookError> {
        match self.keyword.get(name) {
            Some(value) => decode(value, || format!("'{}'", name)),
            None => Ok(default),
        }
    }
}

fn decode<T: DeserializeOwned>(
    value: &Value,
    argument: impl FnOnce() -> String,
) -> Result<T, HookError> {
    T::deserialize(value).map_err(|e| HookError::InvalidArgument {
        argument: argument(),
        reason: e.to_string(),
    })
}

type HookFn = dyn Fn(&HookArgs) -> HookResult + Send + Sync;

/// An invocable hook target.
///
/// Cloning is cheap and keeps identity: two `Hook`s are equal only when they
/// wrap the same callable allocation.
#[derive(Clone)]
pub struct Hook {
    name: Arc<str>,
    func: Arc<HookFn>,
}

impl Hook {
    /// Wrap a callable, naming it after its type.
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&HookArgs) -> HookResult + Send + Sync + 'static,
    {
        Self::named(std::any::type_name::<F>(), func)
    }

    /// Wrap a callable under an explicit name.
    pub fn named<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&HookArgs) -> HookResult + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name.into()),
            func: Arc::new(func),
        }
    }

    /// Name used in logs. Carries no identity.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the target with `args`.
    pub fn call(&self, args: &HookArgs) -> HookResult {
        (self.func)(args)
    }
}

impl PartialEq for Hook {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl Eq for Hook {}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Hook").field(&self.name).finish()
    }
}
