use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod env;

pub use env::DbCredentials;

pub const DEFAULT_USER_AGENT: &str = "kultur-ingest/0.1.0";
pub const DEFAULT_BUDGET_TABLE: &str = "fl_cultural_funding";

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_secs() -> u64 {
    1
}

fn default_budget_table() -> String {
    DEFAULT_BUDGET_TABLE.to_string()
}

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub download: Option<DownloadConfig>,
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
}

/// HTTP settings for the POI downloader
#[derive(Debug, Deserialize, Clone)]
pub struct DownloadConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retries after a timed-out request; other failures are not retried
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
    /// Where archives are saved; the OS temp dir when unset
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay_secs(),
            download_dir: None,
        }
    }
}

impl DownloadConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default = "default_budget_table")]
    pub budget_table: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            budget_table: default_budget_table(),
        }
    }
}

impl FileConfig {
    /// First parseable config file from the search path, if any
    pub fn load() -> Option<Self> {
        for path in get_config_paths() {
            if path.exists() {
                match Self::from_path(&path) {
                    Ok(config) => return Some(config),
                    Err(e) => {
                        eprintln!("Warning: Failed to parse config file {:?}: {}", path, e);
                    }
                }
            }
        }
        None
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn download(&self) -> DownloadConfig {
        self.download.clone().unwrap_or_default()
    }

    pub fn database(&self) -> DatabaseConfig {
        self.database.clone().unwrap_or_default()
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("kultur-ingest.toml"));
    paths.push(PathBuf::from(".kultur-ingest.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("kultur-ingest").join("config.toml"));
        paths.push(config_dir.join("kultur-ingest.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".kultur-ingest.toml"));
    }

    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert!(!config.verbose);

        let download = config.download();
        assert_eq!(download.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(download.max_retries, 3);
        assert_eq!(download.retry_delay(), Duration::from_secs(1));
        assert_eq!(download.download_dir(), std::env::temp_dir());

        assert_eq!(config.database().budget_table, DEFAULT_BUDGET_TABLE);
    }

    #[test]
    fn test_partial_sections() {
        let config: FileConfig = toml::from_str(
            r#"
verbose = true

[download]
user_agent = "Mozilla/5.0"
download_dir = "/var/tmp/poi"

[database]
budget_table = "budget_2024"
"#,
        )
        .unwrap();

        assert!(config.verbose);
        let download = config.download();
        assert_eq!(download.user_agent, "Mozilla/5.0");
        assert_eq!(download.timeout_secs, 30);
        assert_eq!(download.download_dir(), PathBuf::from("/var/tmp/poi"));
        assert_eq!(config.database().budget_table, "budget_2024");
    }

    #[test]
    fn test_config_paths_start_in_working_dir() {
        let paths = get_config_paths();
        assert_eq!(paths[0], PathBuf::from("kultur-ingest.toml"));
    }
}
