//! Runtime server configuration.
//!
//! Read from an optional TOML file layered under `PEOPLE_*` environment
//! variables. Every key has a default, so an empty environment and a missing
//! file still produce a usable configuration.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use serde::Deserialize;

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                 String,
  pub port:                 u16,
  pub database_path:        PathBuf,
  /// Requests still running after this long have their token cancelled.
  pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                 "127.0.0.1".to_string(),
      port:                 8080,
      database_path:        PathBuf::from("people.db"),
      request_timeout_secs: 30,
    }
  }
}

impl ServerConfig {
  /// Layer `path` (if it exists) under the `PEOPLE_` environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("PEOPLE").try_parsing(true))
      .build()?
      .try_deserialize()
  }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.request_timeout_secs)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}
