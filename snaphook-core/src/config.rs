// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! YAML configuration parser with strict validation.
//!
//! Any invalid field results in a HardValidationError that prevents startup.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{HardValidationError, SnaphookError, SnaphookResult};
use crate::runner::FailurePolicy;

/// Raw server section as parsed from YAML (before validation).
#[derive(Debug, Deserialize)]
struct RawServerConfig {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for RawServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Raw lifecycle section.
#[derive(Debug, Deserialize)]
struct RawLifecycleConfig {
    #[serde(default = "default_failure_policy")]
    failure_policy: String,
    #[serde(default)]
    pid_file: Option<String>,
}

fn default_failure_policy() -> String {
    FailurePolicy::Abort.name().to_string()
}

impl Default for RawLifecycleConfig {
    fn default() -> Self {
        Self {
            failure_policy: default_failure_policy(),
            pid_file: None,
        }
    }
}

/// Raw root configuration file.
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    server: RawServerConfig,
    #[serde(default)]
    lifecycle: RawLifecycleConfig,
}

/// Validated HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Validated lifecycle configuration.
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// Applied by the environment manager when a hook fails.
    pub failure_policy: FailurePolicy,
    /// Where `serve` records its PID for `trigger`.
    pub pid_file: Option<PathBuf>,
}

/// Complete validated configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub lifecycle: LifecycleConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
                port: default_port(),
            },
            lifecycle: LifecycleConfig {
                failure_policy: FailurePolicy::Abort,
                pid_file: None,
            },
        }
    }
}

/// Configuration loader with strict validation.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration from a YAML file.
    pub fn load_file(path: impl AsRef<Path>) -> SnaphookResult<Config> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SnaphookError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| SnaphookError::Io {
            context: "reading config file",
            source: e,
        })?;

        Self::load_string(&content)
    }

    /// Load from `path` if it exists, otherwise use the defaults.
    pub fn load_file_or_default(path: impl AsRef<Path>) -> SnaphookResult<Config> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load_file(path);
        }

        tracing::info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }

    /// Load and validate configuration from a YAML string.
    pub fn load_string(content: &str) -> SnaphookResult<Config> {
        let raw: RawConfig =
            serde_yaml::from_str(content).map_err(|e| SnaphookError::ConfigParse {
                message: format!("YAML parse error: {}", e),
            })?;

        Self::validate(raw)
    }

    /// Validate raw configuration and convert to validated types.
    fn validate(raw: RawConfig) -> SnaphookResult<Config> {
        let server = Self::validate_server(raw.server)?;
        let lifecycle = Self::validate_lifecycle(raw.lifecycle)?;

        Ok(Config { server, lifecycle })
    }

    fn validate_server(raw: RawServerConfig) -> SnaphookResult<ServerConfig> {
        let host: IpAddr = raw
            .host
            .parse()
            .map_err(|e: std::net::AddrParseError| HardValidationError::InvalidFieldValue {
                field: "server.host",
                value: raw.host.clone(),
                reason: e.to_string(),
            })?;

        if raw.port == 0 {
            return Err(HardValidationError::InvalidPort {
                port: raw.port,
                reason: "Port 0 is reserved and cannot be used".to_string(),
            }
            .into());
        }

        Ok(ServerConfig {
            host,
            port: raw.port,
        })
    }

    fn validate_lifecycle(raw: RawLifecycleConfig) -> SnaphookResult<LifecycleConfig> {
        let failure_policy = raw.failure_policy.parse::<FailurePolicy>().map_err(|reason| {
            HardValidationError::InvalidFieldValue {
                field: "lifecycle.failure_policy",
                value: raw.failure_policy.clone(),
                reason,
            }
        })?;

        let pid_file = match raw.pid_file {
            Some(p) if p.trim().is_empty() => {
                return Err(HardValidationError::InvalidFieldValue {
                    field: "lifecycle.pid_file",
                    value: p,
                    reason: "PID file path cannot be empty".to_string(),
                }
                .into());
            }
            Some(p) => Some(PathBuf::from(p)),
            None => None,
        };

        Ok(LifecycleConfig {
            failure_policy,
            pid_file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_CONFIG: &str = r#"
server:
  host: 127.0.0.1
  port: 8080

lifecycle:
  failure_policy: continue
  pid_file: /tmp/snaphook-test.pid
"#;

    #[test]
    fn test_valid_config() {
        let config = ConfigLoader::load_string(VALID_CONFIG).unwrap();
        assert_eq!(config.server.socket_addr().to_string(), "127.0.0.1:8080");
        assert_eq!(config.lifecycle.failure_policy, FailurePolicy::Continue);
        assert_eq!(
            config.lifecycle.pid_file,
            Some(PathBuf::from("/tmp/snaphook-test.pid"))
        );
    }

    #[test]
    fn test_defaults_applied() {
        let yaml = r#"
server:
  port: 9000
"#;
        let config = ConfigLoader::load_string(yaml).unwrap();
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.lifecycle.failure_policy, FailurePolicy::Abort);
        assert!(config.lifecycle.pid_file.is_none());
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.lifecycle.failure_policy, FailurePolicy::Abort);
    }

    #[test]
    fn test_invalid_port_zero() {
        let yaml = r#"
server:
  port: 0
"#;
        let result = ConfigLoader::load_string(yaml);
        assert!(matches!(
            result,
            Err(SnaphookError::HardValidation(
                HardValidationError::InvalidPort { port: 0, .. }
            ))
        ));
    }

    #[test]
    fn test_invalid_host() {
        let yaml = r#"
server:
  host: not-an-ip
"#;
        assert!(ConfigLoader::load_string(yaml).is_err());
    }

    #[test]
    fn test_unknown_failure_policy() {
        let yaml = r#"
lifecycle:
  failure_policy: retry
"#;
        let err = ConfigLoader::load_string(yaml).unwrap_err();
        assert!(err.to_string().contains("lifecycle.failure_policy"));
    }

    #[test]
    fn test_empty_pid_file() {
        let yaml = r#"
lifecycle:
  pid_file: "  "
"#;
        assert!(ConfigLoader::load_string(yaml).is_err());
    }

    #[test]
    fn test_malformed_yaml() {
        let result = ConfigLoader::load_string("server: [unclosed");
        assert!(matches!(result, Err(SnaphookError::ConfigParse { .. })));
    }
}
