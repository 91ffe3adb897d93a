// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `snaphook trigger` command - Signal a running server.
//!
//! Stands in for an external environment manager: asks the server to run its
//! before-snapshot or after-restore hooks.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use thiserror::Error;

use snaphook_core::ConfigLoader;

/// Lifecycle event to deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LifecycleEvent {
    /// Run before-snapshot hooks.
    Snapshot,
    /// Run after-restore hooks.
    Restore,
}

impl LifecycleEvent {
    pub fn signal(&self) -> Signal {
        match self {
            Self::Snapshot => Signal::SIGUSR1,
            Self::Restore => Signal::SIGUSR2,
        }
    }
}

#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("No PID given and no lifecycle.pid_file configured")]
    NoTarget,

    #[error("Failed to read PID file {path}: {source}")]
    PidFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid PID in {path}: {content:?}")]
    InvalidPid { path: PathBuf, content: String },

    #[error("Failed to send {signal} to PID {pid}: {source}")]
    Signal {
        signal: Signal,
        pid: i32,
        #[source]
        source: nix::Error,
    },
}

pub async fn execute(
    config_path: &str,
    event: LifecycleEvent,
    pid: Option<i32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let pid = match pid {
        Some(pid) => pid,
        None => {
            let config = ConfigLoader::load_file_or_default(config_path)?;
            let path = config.lifecycle.pid_file.ok_or(TriggerError::NoTarget)?;
            read_pid_file(&path)?
        }
    };

    let signal = event.signal();
    tracing::info!(pid, signal = %signal, event = ?event, "Triggering lifecycle event");

    kill(Pid::from_raw(pid), signal).map_err(|source| TriggerError::Signal {
        signal,
        pid,
        source,
    })?;

    println!("✓ Sent {} to PID {}", signal, pid);
    Ok(())
}

fn read_pid_file(path: &Path) -> Result<i32, TriggerError> {
    let content = std::fs::read_to_string(path).map_err(|source| TriggerError::PidFileRead {
        path: path.to_path_buf(),
        source,
    })?;

    match content.trim().parse::<i32>() {
        Ok(pid) if pid > 0 => Ok(pid),
        _ => Err(TriggerError::InvalidPid {
            path: path.to_path_buf(),
            content,
        }),
    }
}
