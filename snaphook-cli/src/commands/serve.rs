// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `snaphook serve` command - Run the web application.
//!
//! Registers the application hooks, freezes the registry, then serves HTTP
//! while the lifecycle manager waits for snapshot/restore signals.

use std::path::Path;
use std::sync::Arc;

use snaphook_core::{ConfigLoader, HookRegistry};

use crate::app;
use crate::hooks::{self, Instance};
use crate::lifecycle::{self, LifecycleManager, LifecycleSignals};
use crate::metrics;

pub async fn execute(config_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(config = %config_path, "Starting snaphook");

    let config = ConfigLoader::load_file_or_default(config_path)?;

    // Registration happens here, before anything runs concurrently.
    let instance = Instance::new();
    let mut registry = HookRegistry::new();
    hooks::register(&mut registry, &instance);

    let manager = Arc::new(LifecycleManager::new(
        registry.into_shared(),
        config.lifecycle.failure_policy,
    ));
    manager.start()?;
    metrics::init();

    // Handlers go in before the PID is published.
    let signals = LifecycleSignals::install()?;
    if let Some(pid_file) = &config.lifecycle.pid_file {
        write_pid_file(pid_file)?;
    }

    let lifecycle_task = tokio::spawn(lifecycle::listen(Arc::clone(&manager), signals));

    let addr = config.server.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        instance_id = %instance.id(),
        pid = std::process::id(),
        "Listening on http://{}",
        addr
    );

    axum::serve(listener, app::router())
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await?;

    lifecycle_task.abort();
    if let Some(pid_file) = &config.lifecycle.pid_file {
        if let Err(e) = std::fs::remove_file(pid_file) {
            tracing::warn!(path = %pid_file.display(), "Failed to remove PID file: {}", e);
        }
    }

    let stats = manager.metrics();
    tracing::info!(
        snapshots = stats.snapshot_count,
        restores = stats.restore_count,
        "Shut down"
    );
    Ok(())
}

fn write_pid_file(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, std::process::id().to_string())?;
    tracing::debug!(path = %path.display(), "Wrote PID file");
    Ok(())
}
