use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub enable_tracing: bool,
    /// Transfer replay settings for the binary
    #[serde(default)]
    pub replay: ReplayConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ReplayConfig {
    pub accounts_csv: String,
    pub transfers_csv: String,
    pub output_dir: String,
    pub worker_threads: usize,
    pub notification_capacity: usize,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            accounts_csv: crate::csv_io::ACCOUNTS_INIT_CSV.to_string(),
            transfers_csv: crate::csv_io::TRANSFERS_CSV.to_string(),
            output_dir: "output".to_string(),
            worker_threads: 4,
            notification_capacity: 65_536,
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        Self::from_yaml(&content).with_context(|| format!("Failed to parse {}", config_path))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: AppConfig = serde_yaml::from_str(content)?;
        anyhow::ensure!(
            config.replay.worker_threads > 0,
            "replay.worker_threads must be at least 1"
        );
        anyhow::ensure!(
            config.replay.notification_capacity > 0,
            "replay.notification_capacity must be at least 1"
        );
        Ok(config)
    }
}
