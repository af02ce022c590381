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

use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CloudError>;

#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Cloud API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Resource not found: {resource_type} '{id}'")]
    NotFound { resource_type: String, id: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("{resource_type} '{id}' does not report a state")]
    StateUnavailable { resource_type: String, id: String },

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error(transparent)]
    Wait(#[from] WaitError),
}

impl CloudError {
    pub fn config_error(context: impl Into<String>) -> Self {
        Self::Config(context.into())
    }

    pub fn validation(context: impl Into<String>) -> Self {
        Self::Validation(context.into())
    }

    pub fn not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn state_unavailable(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::StateUnavailable {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    pub fn is_state_unavailable(&self) -> bool {
        matches!(self, Self::StateUnavailable { .. })
    }
}

/// Terminal conditions of a wait loop.
#[derive(Error, Debug)]
pub enum WaitError {
    #[error("Timed out after {}s waiting for '{id}'", timeout.as_secs())]
    Timeout { id: String, timeout: Duration },

    #[error("Operation on '{id}' failed: {reason}")]
    OperationFailed { id: String, reason: String },

    #[error("Failed to query status of '{id}': {source}")]
    Query {
        id: String,
        #[source]
        source: Box<CloudError>,
    },

    #[error("Wait for '{id}' was cancelled")]
    Cancelled { id: String },
}

impl WaitError {
    pub fn query(id: impl Into<String>, source: CloudError) -> Self {
        Self::Query {
            id: id.into(),
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wait_error_display() {
        let err = WaitError::Timeout {
            id: "req-1".to_string(),
            timeout: Duration::from_secs(60),
        };
        assert_eq!(err.to_string(), "Timed out after 60s waiting for 'req-1'");

        let err = WaitError::query("req-1", CloudError::not_found("Request", "req-1"));
        assert!(err.to_string().contains("Resource not found: Request 'req-1'"));
    }

    #[test]
    fn test_wait_error_is_transparent() {
        let err: CloudError = WaitError::Cancelled {
            id: "dc-1".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Wait for 'dc-1' was cancelled");
        assert!(!err.is_not_found());
    }
}
