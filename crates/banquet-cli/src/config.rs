//! Process configuration: a `banquet.toml` file, overridable by `BANQUET_*`
//! environment variables, with built-in defaults so the binary runs with no
//! configuration at all.

use serde::Deserialize;
use std::path::PathBuf;

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Directory the knowledge graphs, session memory and retrieval pattern
    /// files are loaded from and persisted to.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// How long the Planner waits for a worker's reply before treating the
    /// task as timed out.
    #[serde(default = "default_task_timeout_ms")]
    pub task_timeout_ms: u64,

    /// `tracing-subscriber` env-filter directive, e.g. `info` or
    /// `banquet_planner=debug,info`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_task_timeout_ms() -> u64 {
    5_000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            task_timeout_ms: default_task_timeout_ms(),
            log_level: default_log_level(),
        }
    }
}

/// Load configuration from `<config_path>` (if it exists) layered under
/// defaults, then apply `BANQUET_*` environment overrides on top. Missing
/// file, missing environment variables, and a missing config path argument
/// are all non-fatal — the caller always gets a usable `AppConfig`.
pub fn load(config_path: Option<&std::path::Path>) -> anyhow::Result<AppConfig> {
    let mut builder = config::Config::builder();

    if let Some(path) = config_path {
        builder = builder.add_source(config::File::from(path).required(false));
    } else {
        builder = builder.add_source(config::File::with_name("banquet").required(false));
    }

    builder = builder.add_source(config::Environment::with_prefix("BANQUET").separator("_"));

    let config = builder.build()?;
    Ok(config.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_and_env_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(Some(&dir.path().join("nonexistent.toml"))).unwrap();
        assert_eq!(config.task_timeout_ms, default_task_timeout_ms());
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("banquet.toml");
        std::fs::write(&path, "task_timeout_ms = 9000\nlog_level = \"debug\"\n").unwrap();
        let config = load(Some(&path)).unwrap();
        assert_eq!(config.task_timeout_ms, 9000);
        assert_eq!(config.log_level, "debug");
    }
}
