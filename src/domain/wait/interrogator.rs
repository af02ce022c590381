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

//! Polling strategies: what to ask and how to read the answer.

use super::outcome::PollOutcome;
use crate::infrastructure::constants::{
    REQUEST_STATUS_DONE, REQUEST_STATUS_FAILED, STATE_ERROR, STATE_FAILED_PREFIX,
};
use crate::shared::Result;

/// Status of an asynchronous request as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestStatus {
    pub status: String,
    pub message: Option<String>,
}

#[async_trait::async_trait]
pub trait StatusQuerier: Send + Sync {
    /// Current status of the request behind `handle`.
    async fn get_status(&self, handle: &str) -> Result<RequestStatus>;
}

#[async_trait::async_trait]
pub trait StateQuerier: Send + Sync {
    /// Current lifecycle state of the resource `id`.
    async fn get_state(&self, id: &str) -> Result<String>;
}

#[async_trait::async_trait]
pub trait Interrogator: Send + Sync {
    /// Ask once. An `Err` is a hard error and ends the wait.
    async fn interrogate(&self, id: &str) -> Result<PollOutcome>;
}

/// `FAILED`, `FAILED_*` and `ERROR` are terminal failures.
pub fn is_failed_state(state: &str) -> bool {
    let state = state.to_ascii_uppercase();
    state == STATE_ERROR || state.starts_with(STATE_FAILED_PREFIX)
}

/// Polls the status of an asynchronous request.
pub struct RequestStatusInterrogator<Q> {
    querier: Q,
}

impl<Q: StatusQuerier> RequestStatusInterrogator<Q> {
    pub fn new(querier: Q) -> Self {
        Self { querier }
    }
}

#[async_trait::async_trait]
impl<Q: StatusQuerier> Interrogator for RequestStatusInterrogator<Q> {
    async fn interrogate(&self, id: &str) -> Result<PollOutcome> {
        let status = self.querier.get_status(id).await?;
        let outcome = match status.status.as_str() {
            REQUEST_STATUS_DONE => PollOutcome::Done,
            REQUEST_STATUS_FAILED => PollOutcome::Failed(
                status
                    .message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| "request failed without a message".to_string()),
            ),
            _ => PollOutcome::Pending,
        };
        Ok(outcome)
    }
}

/// Polls a resource until its state matches `desired_state`.
pub struct ResourceStateInterrogator<Q> {
    querier: Q,
    desired_state: String,
}

impl<Q: StateQuerier> ResourceStateInterrogator<Q> {
    pub fn new(querier: Q, desired_state: impl Into<String>) -> Self {
        Self {
            querier,
            desired_state: desired_state.into(),
        }
    }
}

#[async_trait::async_trait]
impl<Q: StateQuerier> Interrogator for ResourceStateInterrogator<Q> {
    async fn interrogate(&self, id: &str) -> Result<PollOutcome> {
        let state = self.querier.get_state(id).await?;
        if state.eq_ignore_ascii_case(&self.desired_state) {
            Ok(PollOutcome::Done)
        } else if is_failed_state(&state) {
            Ok(PollOutcome::Failed(format!(
                "resource entered state {} while waiting for {}",
                state, self.desired_state
            )))
        } else {
            Ok(PollOutcome::Pending)
        }
    }
}

/// Polls a resource until the API no longer knows it.
pub struct ResourceDeletionInterrogator<Q> {
    querier: Q,
}

impl<Q: StateQuerier> ResourceDeletionInterrogator<Q> {
    pub fn new(querier: Q) -> Self {
        Self { querier }
    }
}

#[async_trait::async_trait]
impl<Q: StateQuerier> Interrogator for ResourceDeletionInterrogator<Q> {
    async fn interrogate(&self, id: &str) -> Result<PollOutcome> {
        match self.querier.get_state(id).await {
            Ok(state) if is_failed_state(&state) => Ok(PollOutcome::Failed(format!(
                "resource entered state {} while being deleted",
                state
            ))),
            Ok(_) => Ok(PollOutcome::Pending),
            Err(e) if e.is_not_found() => Ok(PollOutcome::Done),
            // Stateless objects (users, groups, shares) are pending while they exist
            Err(e) if e.is_state_unavailable() => Ok(PollOutcome::Pending),
            Err(e) => Err(e),
        }
    }
}
