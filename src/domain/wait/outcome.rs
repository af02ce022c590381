// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::infrastructure::constants::{DEFAULT_TIMEOUT_SECONDS, POLL_INTERVAL};
use std::fmt;
use std::time::Duration;

/// Result of a single poll attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Pending,
    Done,
    Failed(String),
}

impl fmt::Display for PollOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Done => write!(f, "done"),
            Self::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Timing parameters of one wait call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            interval: POLL_INTERVAL,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }
}

impl WaitConfig {
    /// Build from the `--timeout` flag. An unset or zero timeout falls back to `default`.
    pub fn from_timeout_flag(timeout_secs: Option<u64>, default: Duration) -> Self {
        let timeout = match timeout_secs {
            Some(secs) if secs > 0 => Duration::from_secs(secs),
            _ => default,
        };
        Self {
            interval: POLL_INTERVAL,
            timeout,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Zero durations are replaced with the defaults.
    pub fn normalized(self) -> Self {
        let defaults = Self::default();
        Self {
            interval: if self.interval.is_zero() {
                defaults.interval
            } else {
                self.interval
            },
            timeout: if self.timeout.is_zero() {
                defaults.timeout
            } else {
                self.timeout
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_flag_fallback() {
        let default = Duration::from_secs(600);
        assert_eq!(WaitConfig::from_timeout_flag(None, default).timeout, default);
        assert_eq!(WaitConfig::from_timeout_flag(Some(0), default).timeout, default);
        assert_eq!(
            WaitConfig::from_timeout_flag(Some(30), default).timeout,
            Duration::from_secs(30)
        );
        assert_eq!(
            WaitConfig::from_timeout_flag(Some(30), default).interval,
            POLL_INTERVAL
        );
    }

    #[test]
    fn test_normalized_replaces_zero() {
        let config = WaitConfig {
            interval: Duration::ZERO,
            timeout: Duration::ZERO,
        }
        .normalized();
        assert_eq!(config, WaitConfig::default());
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(PollOutcome::Pending.to_string(), "pending");
        assert_eq!(PollOutcome::Failed("boom".to_string()).to_string(), "failed: boom");
    }
}
