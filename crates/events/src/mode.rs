use core::str::FromStr;

use thiserror::Error;

/// Which dispatch operation a publisher uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// `Dispatcher::publish`: stop at the first failing handler.
    #[default]
    FailFast,
    /// `Dispatcher::publish_all`: run every handler, report all failures.
    BestEffort,
}

impl DispatchMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DispatchMode::FailFast => "fail_fast",
            DispatchMode::BestEffort => "best_effort",
        }
    }
}

impl core::fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown dispatch mode {0:?} (expected \"fail_fast\" or \"best_effort\")")]
pub struct ParseDispatchModeError(pub String);

impl FromStr for DispatchMode {
    type Err = ParseDispatchModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "fail_fast" => Ok(DispatchMode::FailFast),
            "best_effort" => Ok(DispatchMode::BestEffort),
            _ => Err(ParseDispatchModeError(s.to_string())),
        }
    }
}
