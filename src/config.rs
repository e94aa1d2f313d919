/*!
 * Disposal Configuration
 *
 * Runtime configuration for the disposal engine, installed process-wide
 */

use crate::core::errors::ConfigError;
use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

/// Environment variable selecting the unresolved release policy
pub const ENV_UNRESOLVED_RELEASE: &str = "DISPOSE_UNRESOLVED_RELEASE";
/// Environment variable for the slow cascade threshold in milliseconds
pub const ENV_SLOW_MS: &str = "DISPOSE_SLOW_MS";
/// Environment variable toggling per-cascade tracing spans
pub const ENV_TRACE_CASCADES: &str = "DISPOSE_TRACE_CASCADES";

/// What to do when a release method name did not resolve
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedPolicy {
    /// Skip silently, clear the field
    #[default]
    Ignore,
    /// Emit a warning, clear the field
    Warn,
}

impl FromStr for UnresolvedPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(UnresolvedPolicy::Ignore),
            "warn" => Ok(UnresolvedPolicy::Warn),
            _ => Err(ConfigError::InvalidValue {
                key: ENV_UNRESOLVED_RELEASE.to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Disposal engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct DisposeConfig {
    /// Policy for release methods whose name did not resolve
    pub unresolved_release: UnresolvedPolicy,
    /// Cascades slower than this are logged as warnings
    pub slow_dispose_threshold_ms: u64,
    /// Open a tracing span with a correlation id for every cascade
    pub trace_cascades: bool,
}

impl Default for DisposeConfig {
    fn default() -> Self {
        Self {
            unresolved_release: UnresolvedPolicy::Ignore,
            slow_dispose_threshold_ms: 10,
            trace_cascades: true,
        }
    }
}

impl DisposeConfig {
    /// Configuration that reports registration mistakes
    pub const fn strict() -> Self {
        Self {
            unresolved_release: UnresolvedPolicy::Warn,
            slow_dispose_threshold_ms: 10,
            trace_cascades: true,
        }
    }

    /// Configuration with the fewest per-cascade costs
    pub const fn quiet() -> Self {
        Self {
            unresolved_release: UnresolvedPolicy::Ignore,
            slow_dispose_threshold_ms: u64::MAX,
            trace_cascades: false,
        }
    }

    /// Slow cascade threshold as a duration
    #[inline]
    pub fn slow_dispose_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_dispose_threshold_ms)
    }

    /// Parse a JSON document; missing keys keep their defaults
    pub fn from_json(document: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(document)?)
    }

    /// Build from the process environment
    ///
    /// Environment variables:
    /// - DISPOSE_UNRESOLVED_RELEASE: `ignore` or `warn` (default: ignore)
    /// - DISPOSE_SLOW_MS: slow cascade threshold in ms (default: 10)
    /// - DISPOSE_TRACE_CASCADES: `1`/`true` or `0`/`false` (default: true)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup, starting from defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_UNRESOLVED_RELEASE) {
            config.unresolved_release = value.parse()?;
        }

        if let Some(value) = lookup(ENV_SLOW_MS) {
            config.slow_dispose_threshold_ms =
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: ENV_SLOW_MS.to_string(),
                        value: value.clone(),
                    })?;
        }

        if let Some(value) = lookup(ENV_TRACE_CASCADES) {
            config.trace_cascades = parse_flag(&value).ok_or_else(|| ConfigError::InvalidValue {
                key: ENV_TRACE_CASCADES.to_string(),
                value: value.clone(),
            })?;
        }

        Ok(config)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Environment-derived configuration, defaults on invalid values
fn load_from_env() -> DisposeConfig {
    DisposeConfig::from_env().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "invalid dispose configuration in environment, using defaults");
        DisposeConfig::default()
    })
}

fn cell() -> &'static ArcSwap<DisposeConfig> {
    static CONFIG: OnceLock<ArcSwap<DisposeConfig>> = OnceLock::new();
    CONFIG.get_or_init(|| ArcSwap::from_pointee(load_from_env()))
}

/// Currently installed configuration
#[inline]
pub fn current() -> Arc<DisposeConfig> {
    cell().load_full()
}

/// Install a configuration for the whole process
pub fn install(config: DisposeConfig) {
    tracing::debug!(?config, "installing dispose configuration");
    cell().store(Arc::new(config));
}

/// Restore the configuration taken from the environment
pub fn reset() {
    install(load_from_env());
}
