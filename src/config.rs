use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration file structure for sirenwatch.
///
/// Allows teams to keep the build-server and siren settings next to the
/// deployment instead of baked into the binary. Configuration files are
/// loaded from the current directory or a specified path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Build server connection settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Siren device settings
    #[serde(default)]
    pub siren: SirenConfig,

    /// Polling and suppression settings
    #[serde(default)]
    pub monitor: MonitorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ServerConfig {
    /// Build server base URL (e.g., 'http://teamcity.example.com')
    pub base_url: Option<String>,

    /// Context root the server is deployed under (e.g., '/teamcity')
    #[serde(default)]
    pub context_root: String,

    /// REST API username
    pub username: Option<String>,

    /// REST API password
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct SirenConfig {
    /// Siren device address as host:port
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MonitorConfig {
    /// Seconds between health-check cycles
    #[serde(default = "default_poll_interval_seconds")]
    pub poll_interval_seconds: u64,

    /// Keep the siren quiet outside working hours
    #[serde(default = "default_suppress_after_hours")]
    pub suppress_after_hours: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            siren: SirenConfig::default(),
            monitor: MonitorConfig::default(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_poll_interval_seconds(),
            suppress_after_hours: default_suppress_after_hours(),
        }
    }
}

fn default_poll_interval_seconds() -> u64 {
    10
}

fn default_suppress_after_hours() -> bool {
    true
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./sirenwatch.toml
    /// 3. ./sirenwatch.json
    /// 4. ./sirenwatch.yaml
    /// 5. ./sirenwatch.yml
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        // Try common configuration file names
        let candidates = [
            "sirenwatch.toml",
            "sirenwatch.json",
            "sirenwatch.yaml",
            "sirenwatch.yml",
        ];

        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::load_from_path(path);
            }
        }

        // No config file found, return defaults
        Ok(Self::default())
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => {
                // Try TOML first, then JSON, then YAML
                toml::from_str(&contents)
                    .or_else(|_| serde_json::from_str(&contents))
                    .or_else(|_| serde_yaml::from_str(&contents))
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))
            }
        }
    }

    /// Check that everything the monitor needs is present.
    pub fn validate(&self) -> Result<()> {
        if self.server.base_url.is_none() {
            anyhow::bail!("server base-url is required (config file or --base-url)");
        }
        if self.siren.address.is_none() {
            anyhow::bail!("siren address is required (config file or --siren-address)");
        }
        if self.monitor.poll_interval_seconds == 0 {
            anyhow::bail!("poll-interval-seconds must be at least 1");
        }
        Ok(())
    }
}
