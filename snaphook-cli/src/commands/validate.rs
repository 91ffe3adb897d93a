// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `snaphook validate` command - Validate configuration file.

use snaphook_core::ConfigLoader;

pub async fn execute(file: &str) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(file = %file, "Validating configuration");

    match ConfigLoader::load_file(file) {
        Ok(config) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Server:");
            println!("  Listen Address:     {}", config.server.socket_addr());
            println!();
            println!("Lifecycle:");
            println!(
                "  Failure Policy:     {}",
                config.lifecycle.failure_policy
            );
            match &config.lifecycle.pid_file {
                Some(path) => println!("  PID File:           {}", path.display()),
                None => println!("  PID File:           (none)"),
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed:");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}
