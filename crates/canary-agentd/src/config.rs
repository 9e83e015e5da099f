use std::path::PathBuf;
use std::time::Duration;

use canary_gateway::HttpConfig;
use canary_model::{ChannelId, Endpoint};
use canary_observe::{LoggerConfig, LoggerError};
use canary_watch::{BATCH_INTERVAL, PER_TASK_INTERVAL};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Env var naming the JSON config file.
pub const CONFIG_PATH_VAR: &str = "CANARY_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid value for {var}: {reason}")]
    Env { var: &'static str, reason: String },
}

impl ConfigError {
    fn env(var: &'static str, e: impl std::fmt::Display) -> Self {
        ConfigError::Env {
            var,
            reason: e.to_string(),
        }
    }
}

/// How watches are polled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WatchMode {
    /// One loop per watch.
    #[default]
    PerTask,
    /// One sweep over every watch per interval.
    Batch,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub mode: WatchMode,
    /// Overrides the mode's default interval; `0` is treated as 1ms.
    pub interval_ms: Option<u64>,
}

impl WatchConfig {
    pub fn interval(&self) -> Duration {
        match (self.interval_ms, self.mode) {
            (Some(ms), _) => Duration::from_millis(ms.max(1)),
            (None, WatchMode::PerTask) => PER_TASK_INTERVAL,
            (None, WatchMode::Batch) => BATCH_INTERVAL,
        }
    }
}

/// Watch created at boot from the global endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchSeed {
    /// `stackName/serviceName`.
    pub service: String,
    #[serde(default)]
    pub channel: ChannelId,
    /// Environment to watch in, when not the global one.
    #[serde(default)]
    pub project_id: Option<String>,
}

impl WatchSeed {
    /// Snapshot of `global` for this seed.
    pub fn endpoint(&self, global: &Endpoint) -> Endpoint {
        match &self.project_id {
            Some(project) => global.with_project(project.as_str()),
            None => global.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub logger: LoggerConfig,
    pub rancher: Endpoint,
    pub http: HttpConfig,
    pub watch: WatchConfig,
    pub watches: Vec<WatchSeed>,
}

impl AgentConfig {
    /// File named by `CANARY_CONFIG` (if any), then process env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let base = match std::env::var_os(CONFIG_PATH_VAR) {
            Some(path) => Self::from_file(PathBuf::from(path))?,
            None => Self::default(),
        };
        base.with_env(|k| std::env::var(k).ok())
    }

    pub fn from_file(path: PathBuf) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read { path, source })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Apply overrides looked up through `var`.
    pub fn with_env<F>(mut self, var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = var("RANCHER_BASE_URL") {
            self.rancher.base_url = v;
        }
        if let Some(v) = var("RANCHER_ACCESS_KEY") {
            self.rancher.access_key = v;
        }
        if let Some(v) = var("RANCHER_SECRET_KEY") {
            self.rancher.secret_key = v;
        }
        if let Some(v) = var("RANCHER_PROJECT_ID") {
            self.rancher.project_id = v;
        }
        if let Some(v) = var("CANARY_LOG_LEVEL") {
            self.logger.level = v
                .parse()
                .map_err(|e: LoggerError| ConfigError::env("CANARY_LOG_LEVEL", e))?;
        }
        if let Some(v) = var("CANARY_LOG_FORMAT") {
            self.logger.format = v
                .parse()
                .map_err(|e: LoggerError| ConfigError::env("CANARY_LOG_FORMAT", e))?;
        }
        if let Some(v) = var("CANARY_WATCH_INTERVAL_MS") {
            let ms = v
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::env("CANARY_WATCH_INTERVAL_MS", e))?;
            self.watch.interval_ms = Some(ms);
        }
        if let Some(v) = var("CANARY_WATCH_MODE") {
            self.watch.mode = match v.trim() {
                "per-task" => WatchMode::PerTask,
                "batch" => WatchMode::Batch,
                other => return Err(ConfigError::env("CANARY_WATCH_MODE", format!("unknown mode '{other}'"))),
            };
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use canary_observe::LoggerFormat;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn defaults_poll_per_task_every_five_seconds() {
        let cfg = AgentConfig::default();
        assert_eq!(cfg.watch.mode, WatchMode::PerTask);
        assert_eq!(cfg.watch.interval(), Duration::from_secs(5));
        assert!(cfg.watches.is_empty());
    }

    #[test]
    fn batch_mode_defaults_to_two_minutes() {
        let cfg: AgentConfig = serde_json::from_str(r#"{"watch": {"mode": "batch"}}"#).unwrap();
        assert_eq!(cfg.watch.interval(), Duration::from_secs(120));
    }

    #[test]
    fn json_file_shape() {
        let cfg: AgentConfig = serde_json::from_str(
            r#"{
                "logger": {"format": "json"},
                "rancher": {"rancherUrl": "https://r.local/v2-beta/projects", "accessKey": "ak", "secretKey": "sk", "projectId": "1a5"},
                "http": {"timeout_ms": 5000},
                "watches": [{"service": "shop/api", "channel": "ops"}, {"service": "blog/web", "project_id": "1a7"}]
            }"#,
        )
        .unwrap();

        assert_eq!(cfg.logger.format, LoggerFormat::Json);
        assert_eq!(cfg.rancher.project_id, "1a5");
        assert_eq!(cfg.http.timeout_ms, 5000);
        assert_eq!(cfg.watches.len(), 2);
        assert_eq!(cfg.watches[0].endpoint(&cfg.rancher).project_id, "1a5");
        assert_eq!(cfg.watches[1].endpoint(&cfg.rancher).project_id, "1a7");
        assert_eq!(cfg.watches[1].channel, "");
    }

    #[test]
    fn env_overrides_file_values() {
        let cfg = AgentConfig::default()
            .with_env(env(&[
                ("RANCHER_BASE_URL", "https://r2.local/v2-beta/projects"),
                ("RANCHER_ACCESS_KEY", "ak2"),
                ("RANCHER_SECRET_KEY", "sk2"),
                ("RANCHER_PROJECT_ID", "1a9"),
                ("CANARY_LOG_LEVEL", "canary_watch=debug,info"),
                ("CANARY_WATCH_INTERVAL_MS", "250"),
                ("CANARY_WATCH_MODE", "batch"),
            ]))
            .unwrap();

        assert_eq!(cfg.rancher.base_url, "https://r2.local/v2-beta/projects");
        assert_eq!(cfg.rancher.project_id, "1a9");
        assert_eq!(cfg.logger.level.as_str(), "canary_watch=debug,info");
        assert_eq!(cfg.watch.mode, WatchMode::Batch);
        assert_eq!(cfg.watch.interval(), Duration::from_millis(250));
    }

    #[test]
    fn bad_env_values_name_the_variable() {
        let err = AgentConfig::default()
            .with_env(env(&[("CANARY_WATCH_INTERVAL_MS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: "CANARY_WATCH_INTERVAL_MS", .. }));

        let err = AgentConfig::default()
            .with_env(env(&[("CANARY_LOG_FORMAT", "xml")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: "CANARY_LOG_FORMAT", .. }));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = AgentConfig::from_file(PathBuf::from("/nonexistent/canary.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
