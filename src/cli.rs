use anyhow::Result;
use clap::Parser;
use log::info;
use std::path::PathBuf;

use crate::config::Config;
use crate::monitor::Monitor;

#[derive(Parser)]
#[command(name = "sirenwatch")]
#[command(author, version, about = "Build-health monitor with a network siren", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Build server base URL (e.g., http://teamcity.example.com)
    #[arg(long)]
    base_url: Option<String>,

    /// Context root the server is deployed under (e.g., /teamcity)
    #[arg(long)]
    context_root: Option<String>,

    /// REST API username
    #[arg(short, long, env = "SIRENWATCH_USERNAME")]
    username: Option<String>,

    /// REST API password
    #[arg(short, long, env = "SIRENWATCH_PASSWORD")]
    password: Option<String>,

    /// Siren device address as host:port
    #[arg(short, long)]
    siren_address: Option<String>,

    /// Seconds between health-check cycles
    #[arg(short, long)]
    interval: Option<u64>,

    /// Alert around the clock instead of only during working hours
    #[arg(long, default_value_t = false)]
    no_after_hours: bool,

    /// Run a single cycle and exit
    #[arg(long, default_value_t = false)]
    once: bool,
}

impl Cli {
    /// Config file values overridden by whatever was given on the command
    /// line or through the environment.
    fn effective_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;

        if let Some(base_url) = &self.base_url {
            config.server.base_url = Some(base_url.clone());
        }
        if let Some(context_root) = &self.context_root {
            config.server.context_root = context_root.clone();
        }
        if let Some(username) = &self.username {
            config.server.username = Some(username.clone());
        }
        if let Some(password) = &self.password {
            config.server.password = Some(password.clone());
        }
        if let Some(siren_address) = &self.siren_address {
            config.siren.address = Some(siren_address.clone());
        }
        if let Some(interval) = self.interval {
            config.monitor.poll_interval_seconds = interval;
        }
        if self.no_after_hours {
            config.monitor.suppress_after_hours = false;
        }

        config.validate()?;
        Ok(config)
    }

    pub async fn execute(&self) -> Result<()> {
        let config = self.effective_config()?;

        info!(
            "Watching {} for unacknowledged build failures",
            config.server.base_url.as_deref().unwrap_or_default()
        );

        let monitor = Monitor::new(&config)?;

        if self.once {
            let command = monitor.run_cycle().await?;
            info!("Single cycle complete, siren {command}");
            return Ok(());
        }

        monitor.run().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_config_values() {
        let cli = Cli::parse_from([
            "sirenwatch",
            "--base-url",
            "http://ci.example.com",
            "--siren-address",
            "10.0.0.42:5000",
            "--interval",
            "30",
            "--no-after-hours",
        ]);

        let config = cli.effective_config().unwrap();
        assert_eq!(
            config.server.base_url.as_deref(),
            Some("http://ci.example.com")
        );
        assert_eq!(config.siren.address.as_deref(), Some("10.0.0.42:5000"));
        assert_eq!(config.monitor.poll_interval_seconds, 30);
        assert!(!config.monitor.suppress_after_hours);
    }

    #[test]
    fn test_missing_required_settings_fail_validation() {
        let cli = Cli::parse_from(["sirenwatch", "--once"]);
        assert!(cli.effective_config().is_err());
    }
}
