use chrono::{Local, NaiveDateTime};
use log::{error, info};
use std::time::Duration;
use tokio::time::MissedTickBehavior;

use crate::config::Config;
use crate::detect::FailureDetector;
use crate::error::{MonitorError, Result};
use crate::hours;
use crate::server::BuildServerClient;
use crate::siren::{SirenCommand, SirenController};

/// Runs the health-check cycle on a fixed interval.
///
/// Each cycle is a stateless snapshot: suppression check, detection query,
/// alert decision, siren command. Nothing is remembered between cycles and
/// cycles never overlap (one task, one interval).
pub struct Monitor {
    client: BuildServerClient,
    siren: SirenController,
    poll_interval: Duration,
    suppress_after_hours: bool,
}

impl Monitor {
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = config
            .server
            .base_url
            .as_deref()
            .ok_or_else(|| MonitorError::Config("server base-url is required".to_string()))?;
        let siren_address = config
            .siren
            .address
            .clone()
            .ok_or_else(|| MonitorError::Config("siren address is required".to_string()))?;

        let client = BuildServerClient::new(
            base_url,
            &config.server.context_root,
            config.server.username.clone(),
            config.server.password.clone(),
        )?;

        Ok(Self {
            client,
            siren: SirenController::new(siren_address),
            poll_interval: Duration::from_secs(config.monitor.poll_interval_seconds),
            suppress_after_hours: config.monitor.suppress_after_hours,
        })
    }

    /// Run one cycle against the given wall-clock time and return the
    /// command that was sent to the siren.
    ///
    /// After hours the whole cycle is suppressed: no server query happens
    /// and the siren is re-asserted off. A hard failure anywhere aborts the
    /// cycle before the siren step, leaving the device state untouched.
    pub async fn run_cycle_at(&self, now: NaiveDateTime) -> Result<SirenCommand> {
        if self.suppress_after_hours && hours::is_suppressed(&now) {
            info!("After hours, skipping the health check");
            self.siren.send(SirenCommand::Off).await?;
            return Ok(SirenCommand::Off);
        }

        let detector = FailureDetector::new(&self.client);
        let unacknowledged = detector.detect_unacknowledged_failures().await?;

        let command = if unacknowledged.is_empty() {
            SirenCommand::Off
        } else {
            info!(
                "{} unacknowledged failure(s): {}",
                unacknowledged.len(),
                unacknowledged.join(", ")
            );
            SirenCommand::On
        };

        self.siren.send(command).await?;
        Ok(command)
    }

    /// Run one cycle at the current local time.
    pub async fn run_cycle(&self) -> Result<SirenCommand> {
        self.run_cycle_at(Local::now().naive_local()).await
    }

    /// Scheduling loop: one cycle per tick until Ctrl-C.
    ///
    /// A failed cycle is logged and abandoned; the next tick starts fresh.
    /// There is no backoff and no circuit breaker, every tick is
    /// independent.
    pub async fn run(&self) -> Result<()> {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Monitoring every {}s, after-hours suppression {}",
            self.poll_interval.as_secs(),
            if self.suppress_after_hours {
                "enabled"
            } else {
                "disabled"
            }
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.run_cycle().await {
                        Ok(command) => info!("Cycle complete, siren {command}"),
                        Err(e) => error!("Cycle failed: {e}"),
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutting down");
                    return Ok(());
                }
            }
        }
    }
}
