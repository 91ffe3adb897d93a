// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! snaphook CLI
//!
//! Web application with snapshot/restore lifecycle hooks, plus the commands
//! used to drive it.

use clap::{Parser, Subcommand};

mod app;
mod commands;
mod hooks;
mod lifecycle;
mod metrics;

use commands::trigger::LifecycleEvent;

/// snaphook - Snapshot-aware web application
#[derive(Parser)]
#[command(name = "snaphook")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "snaphook.yaml")]
    pub config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the web application and listen for lifecycle signals
    Serve,

    /// Ask a running server to prepare for a snapshot or finish a restore
    Trigger {
        /// Lifecycle event to deliver
        #[arg(value_enum)]
        event: LifecycleEvent,

        /// Target PID (defaults to the configured PID file)
        #[arg(short, long)]
        pid: Option<i32>,
    },

    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        file: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    // Dispatch to command handlers
    match cli.command {
        Commands::Serve => commands::serve::execute(&cli.config).await,
        Commands::Trigger { event, pid } => {
            commands::trigger::execute(&cli.config, event, pid).await
        }
        Commands::Validate { file } => commands::validate::execute(&file).await,
    }
}
