//! Runtime configuration.
//!
//! Everything that was a hard-wired constant in the broker's original
//! dashboard is an option here. Precedence, lowest to highest: built-in
//! defaults, optional TOML file, `BROKERWATCH_*` environment variables, CLI
//! flags (applied by the binary after loading).

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::channel::{Backoff, ReconnectPolicy};
use crate::decode::DEFAULT_METRICS;

/// Which reconnect behavior to use when a channel's transport fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// Reopen silently with exponential backoff.
    Auto,
    /// Ask the operator to retry or abandon.
    Interactive,
}

/// Resolved settings for a dashboard run.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Broker status endpoint host.
    pub host: String,
    /// Broker status endpoint port.
    pub port: u16,
    /// Channels to subscribe, one connection each.
    pub channels: Vec<String>,
    /// Sliding window capacity N, in samples.
    pub capacity: usize,
    /// Render tick interval in milliseconds.
    pub tick_interval_ms: u64,
    /// Domain inset in ticks: 1 for the linear chart, 2 would suit a
    /// smoothed one.
    pub offset: u32,
    /// Reconnect policy.
    pub policy: PolicyKind,
    /// First auto-retry delay in milliseconds.
    pub backoff_initial_ms: u64,
    /// Auto-retry delay ceiling in milliseconds.
    pub backoff_max_ms: u64,
    /// Cap on consecutive auto retries; absent means retry indefinitely.
    #[serde(default)]
    pub max_retries: Option<u32>,
}

impl Settings {
    /// Load settings from defaults, an optional file, and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let default_channels: Vec<String> =
            DEFAULT_METRICS.iter().map(|s| s.to_string()).collect();

        let mut builder = Config::builder()
            .set_default("host", "localhost")?
            .set_default("port", 8080u16)?
            .set_default("channels", default_channels)?
            .set_default("capacity", 20u64)?
            .set_default("tick_interval_ms", 1000u64)?
            .set_default("offset", 1u64)?
            .set_default("policy", "auto")?
            .set_default("backoff_initial_ms", 500u64)?
            .set_default("backoff_max_ms", 30_000u64)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(Environment::with_prefix("BROKERWATCH").try_parsing(true));

        builder
            .build()
            .context("failed to assemble configuration")?
            .try_deserialize()
            .context("invalid configuration")
    }

    /// `host:port` for the transport.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Translate the declarative settings into a channel reconnect policy.
    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        match self.policy {
            PolicyKind::Auto => ReconnectPolicy::Auto(Backoff {
                initial: Duration::from_millis(self.backoff_initial_ms),
                max: Duration::from_millis(self.backoff_max_ms),
                max_retries: self.max_retries,
            }),
            PolicyKind::Interactive => ReconnectPolicy::Interactive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.endpoint(), "localhost:8080");
        assert_eq!(settings.channels, vec!["uptime", "commits"]);
        assert_eq!(settings.capacity, 20);
        assert_eq!(settings.tick_interval(), Duration::from_millis(1000));
        assert_eq!(settings.offset, 1);
        assert_eq!(settings.policy, PolicyKind::Auto);
        assert_eq!(settings.max_retries, None);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
host = "broker.internal"
port = 9090
policy = "interactive"
capacity = 40
max_retries = 5
"#
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.endpoint(), "broker.internal:9090");
        assert_eq!(settings.policy, PolicyKind::Interactive);
        assert_eq!(settings.capacity, 40);
        assert_eq!(settings.max_retries, Some(5));
        // Untouched keys keep their defaults
        assert_eq!(settings.tick_interval_ms, 1000);
    }

    #[test]
    fn test_auto_policy_carries_backoff() {
        let settings = Settings::load(None).unwrap();
        match settings.reconnect_policy() {
            ReconnectPolicy::Auto(backoff) => {
                assert_eq!(backoff.initial, Duration::from_millis(500));
                assert_eq!(backoff.max, Duration::from_secs(30));
                assert_eq!(backoff.max_retries, None);
            }
            other => panic!("expected auto policy, got {other:?}"),
        }
    }
}
