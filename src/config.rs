//! Process configuration read from the environment
//!
//! - `CLOUDFLARE_COUNTRY_A2`, `CLOUDFLARE_LOCATION`, `CLOUDFLARE_REGION` - deployment location
//! - `PORT` - listen port (default 8080)
//! - `SHUTDOWN_GRACE_SECONDS` - drain window before forced exit (default 60)

use std::time::Duration;
use thiserror::Error;

/// Default port for the HTTP server
pub const DEFAULT_PORT: u16 = 8080;

/// Default drain window between the first signal and the forced exit
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(60);

pub const COUNTRY_VAR: &str = "CLOUDFLARE_COUNTRY_A2";
pub const LOCATION_VAR: &str = "CLOUDFLARE_LOCATION";
pub const REGION_VAR: &str = "CLOUDFLARE_REGION";

const PORT_VAR: &str = "PORT";
const GRACE_VAR: &str = "SHUTDOWN_GRACE_SECONDS";

/// Errors that can occur while reading configuration
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid {var} value {value:?}: expected a port number")]
    InvalidPort { var: &'static str, value: String },

    #[error("Invalid {var} value {value:?}: expected whole seconds")]
    InvalidGracePeriod { var: &'static str, value: String },
}

/// Where this container is running
///
/// Missing variables are kept as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub country: String,
    pub location: String,
    pub region: String,
}

impl Location {
    /// Read the location from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the location through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).unwrap_or_default();
        Self {
            country: read(COUNTRY_VAR),
            location: read(LOCATION_VAR),
            region: read(REGION_VAR),
        }
    }

    /// Sentence served by the default route
    pub fn greeting(&self) -> String {
        format!(
            "Hi, I'm a container running in {}, {}, which is part of {} ",
            self.location, self.country, self.region
        )
    }
}

/// Server settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub grace_period: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            grace_period: DEFAULT_GRACE_PERIOD,
        }
    }
}

impl Config {
    /// Read settings from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary variable lookup
    ///
    /// Unset or blank values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = non_blank(lookup(PORT_VAR)) {
            config.port = value.parse().map_err(|_| ConfigError::InvalidPort {
                var: PORT_VAR,
                value: value.clone(),
            })?;
        }

        if let Some(value) = non_blank(lookup(GRACE_VAR)) {
            let secs: u64 = value
                .parse()
                .map_err(|_| ConfigError::InvalidGracePeriod {
                    var: GRACE_VAR,
                    value: value.clone(),
                })?;
            config.grace_period = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
