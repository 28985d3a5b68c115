//! Gateway session configuration
//!
//! Host-managed configuration treated as opaque input by the core: gateway
//! endpoint, poll cadence, watchdog cadence and per-install display
//! preferences. Loadable from a TOML file with `BACNET_MIRROR_*`
//! environment overrides.

use crate::error::{MirrorError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

fn default_url() -> Url {
    Url::parse("http://127.0.0.1:8099").expect("static default URL")
}

fn default_scan_interval() -> Duration {
    Duration::from_secs(30)
}

fn default_watchdog_interval() -> Duration {
    crate::watchdog::DEFAULT_WATCHDOG_INTERVAL
}

fn default_enabled() -> bool {
    true
}

/// Which object field the host should use when naming entities
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamePreference {
    #[default]
    ObjectName,
    Description,
    ObjectIdentifier,
}

/// Configuration for one gateway session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Gateway endpoint (the EcoPanel web API root)
    pub url: Url,

    /// Interval between scheduled refresh polls
    #[serde(with = "humantime_serde")]
    pub scan_interval: Duration,

    /// Interval between topology watchdog ticks
    #[serde(with = "humantime_serde")]
    pub watchdog_interval: Duration,

    /// Entity naming preference for the host's presentation layer
    pub name_preference: NamePreference,

    /// Whether mirrored entities are enabled by default on first discovery
    pub enabled_by_default: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            scan_interval: default_scan_interval(),
            watchdog_interval: default_watchdog_interval(),
            name_preference: NamePreference::default(),
            enabled_by_default: default_enabled(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from an optional TOML file plus
    /// `BACNET_MIRROR_*` environment variables, then validate.
    pub fn load(config_file: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = config_file {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }
        let settings = builder
            .add_source(config::Environment::with_prefix("BACNET_MIRROR"))
            .build()
            .map_err(|e| MirrorError::config(format!("failed to load configuration: {e}")))?;

        let config: GatewayConfig = settings
            .try_deserialize()
            .map_err(|e| MirrorError::config(format!("invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate field constraints
    pub fn validate(&self) -> Result<()> {
        if self.url.host_str().map_or(true, |h| h.is_empty()) {
            return Err(MirrorError::config("gateway URL must have a host"));
        }
        if self.scan_interval.is_zero() {
            return Err(MirrorError::config("scan_interval must be greater than 0"));
        }
        if self.watchdog_interval.is_zero() {
            return Err(MirrorError::config(
                "watchdog_interval must be greater than 0",
            ));
        }
        Ok(())
    }
}
