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

/// API endpoint
pub const DEFAULT_API_URL: &str = "https://api.ionos.com/cloudapi/v6";
pub const DEFAULT_DEPTH: u32 = 1;
pub const USER_AGENT: &str = concat!("cloudctl/", env!("CARGO_PKG_VERSION"));

/// Configuration file and environment
pub const CONFIG_DIR_NAME: &str = ".cloudctl";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const ENV_CONFIG_FILE: &str = "CLOUDCTL_CONFIG";
pub const ENV_API_URL: &str = "CLOUDCTL_API_URL";
pub const ENV_USERNAME: &str = "CLOUDCTL_USERNAME";
pub const ENV_PASSWORD: &str = "CLOUDCTL_PASSWORD";
pub const ENV_TOKEN: &str = "CLOUDCTL_TOKEN";

/// Wait settings
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;
pub const K8S_TIMEOUT_SECONDS: u64 = 600;

/// Request status values
pub const REQUEST_STATUS_DONE: &str = "DONE";
pub const REQUEST_STATUS_FAILED: &str = "FAILED";

/// Resource lifecycle states
pub const STATE_AVAILABLE: &str = "AVAILABLE";
pub const STATE_ACTIVE: &str = "ACTIVE";
pub const STATE_READY: &str = "READY";
pub const STATE_ERROR: &str = "ERROR";
pub const STATE_FAILED_PREFIX: &str = "FAILED";

/// Concurrent deletes for `delete --all`
pub const DELETE_ALL_CONCURRENCY: usize = 4;
