//! Environment-driven application configuration.

use std::num::ParseIntError;
use std::time::Duration;

use thiserror::Error;

use switchboard_events::{DispatchMode, ParseDispatchModeError};
use switchboard_observability::{LogConfig, LogConfigError};

use crate::activity::DEFAULT_ACTIVITY_CAPACITY;

pub const DISPATCH_MODE_VAR: &str = "SWITCHBOARD_DISPATCH_MODE";
pub const OPERATION_TIMEOUT_VAR: &str = "SWITCHBOARD_OPERATION_TIMEOUT_MS";
pub const ACTIVITY_CAPACITY_VAR: &str = "SWITCHBOARD_ACTIVITY_CAPACITY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SWITCHBOARD_OPERATION_TIMEOUT_MS: {value:?} is not a number of milliseconds")]
    InvalidTimeout {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("SWITCHBOARD_OPERATION_TIMEOUT_MS: timeout must be greater than zero")]
    ZeroTimeout,

    #[error("SWITCHBOARD_ACTIVITY_CAPACITY: {value:?} is not a positive number")]
    InvalidActivityCapacity { value: String },

    #[error("SWITCHBOARD_DISPATCH_MODE: {0}")]
    DispatchMode(#[from] ParseDispatchModeError),

    #[error(transparent)]
    Log(#[from] LogConfigError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// How the user service delivers its events.
    pub dispatch_mode: DispatchMode,
    /// Deadline attached to every operation context; `None` means no deadline.
    pub operation_timeout: Option<Duration>,
    /// Most recent events kept by the activity feed.
    pub activity_capacity: usize,
    pub log: LogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dispatch_mode: DispatchMode::default(),
            operation_timeout: None,
            activity_capacity: DEFAULT_ACTIVITY_CAPACITY,
            log: LogConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let dispatch_mode = match non_blank(lookup(DISPATCH_MODE_VAR)) {
            Some(raw) => raw.parse()?,
            None => DispatchMode::default(),
        };

        let operation_timeout = match non_blank(lookup(OPERATION_TIMEOUT_VAR)) {
            Some(raw) => {
                let ms: u64 = raw.trim().parse().map_err(|source| ConfigError::InvalidTimeout {
                    value: raw.clone(),
                    source,
                })?;
                if ms == 0 {
                    return Err(ConfigError::ZeroTimeout);
                }
                Some(Duration::from_millis(ms))
            }
            None => None,
        };

        let activity_capacity = match non_blank(lookup(ACTIVITY_CAPACITY_VAR)) {
            Some(raw) => {
                let parsed = raw.trim().parse::<usize>();
                match parsed {
                    Ok(n) if n > 0 => n,
                    _ => return Err(ConfigError::InvalidActivityCapacity { value: raw }),
                }
            }
            None => DEFAULT_ACTIVITY_CAPACITY,
        };

        let log = LogConfig::from_lookup(&lookup)?;

        Ok(Self {
            dispatch_mode,
            operation_timeout,
            activity_capacity,
            log,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
