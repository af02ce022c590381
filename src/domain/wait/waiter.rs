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

use super::interrogator::Interrogator;
use super::outcome::{PollOutcome, WaitConfig};
use crate::shared::WaitError;
use backon::{BackoffBuilder, ConstantBuilder};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Drives an [`Interrogator`] until it reports a terminal outcome, the timeout
/// elapses, or the cancellation token fires.
///
/// Polls are strictly sequential. Cancellation is observed before every poll and
/// while sleeping between polls; an in-flight poll is never interrupted.
#[derive(Debug, Clone)]
pub struct Waiter {
    config: WaitConfig,
    cancel: CancellationToken,
}

impl Waiter {
    pub fn new(config: WaitConfig) -> Self {
        Self {
            config: config.normalized(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &WaitConfig {
        &self.config
    }

    pub async fn wait<I>(&self, id: &str, interrogator: &I) -> Result<(), WaitError>
    where
        I: Interrogator + ?Sized,
    {
        let WaitConfig { interval, timeout } = self.config;
        let start = Instant::now();
        // One sleep per interval that fits in the timeout, rounded up.
        let mut delays = ConstantBuilder::default()
            .with_delay(interval)
            .with_max_times(sleep_budget(interval, timeout))
            .build();
        let mut attempt: u32 = 0;

        info!(id = %id, timeout_secs = timeout.as_secs(), "Waiting for completion");

        loop {
            if self.cancel.is_cancelled() {
                return Err(WaitError::Cancelled { id: id.to_string() });
            }

            attempt += 1;
            let outcome = interrogator
                .interrogate(id)
                .await
                .map_err(|e| WaitError::query(id, e))?;
            debug!(id = %id, attempt, outcome = %outcome, "Polled");

            match outcome {
                PollOutcome::Done => {
                    info!(id = %id, attempt, elapsed_ms = start.elapsed().as_millis() as u64, "Completed");
                    return Ok(());
                }
                PollOutcome::Failed(reason) => {
                    warn!(id = %id, attempt, reason = %reason, "Operation failed");
                    return Err(WaitError::OperationFailed {
                        id: id.to_string(),
                        reason,
                    });
                }
                PollOutcome::Pending => {}
            }

            let remaining = timeout.saturating_sub(start.elapsed());
            if remaining.is_zero() {
                return Err(WaitError::Timeout {
                    id: id.to_string(),
                    timeout,
                });
            }

            let Some(delay) = delays.next() else {
                warn!(id = %id, attempt, "Poll budget exhausted");
                return Err(WaitError::Timeout {
                    id: id.to_string(),
                    timeout,
                });
            };
            // Never sleep past the deadline.
            let delay = delay.min(remaining);
            tokio::select! {
                _ = sleep(delay) => {}
                _ = self.cancel.cancelled() => {
                    return Err(WaitError::Cancelled { id: id.to_string() });
                }
            }

            if start.elapsed() >= timeout {
                warn!(id = %id, attempt, "Timed out");
                return Err(WaitError::Timeout {
                    id: id.to_string(),
                    timeout,
                });
            }
        }
    }
}

fn sleep_budget(interval: Duration, timeout: Duration) -> usize {
    let sleeps = timeout.as_nanos().div_ceil(interval.as_nanos().max(1));
    usize::try_from(sleeps).unwrap_or(usize::MAX)
}
