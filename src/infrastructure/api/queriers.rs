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

use super::client::{request_id_from_handle, CloudApiClient};
use crate::domain::resource::{ParentIds, ResourceKind};
use crate::domain::wait::{RequestStatus, StateQuerier, StatusQuerier};
use crate::shared::{CloudError, Result};
use serde_json::Value;
use std::sync::Arc;

/// Reads `metadata.status` of `/requests/{id}/status`.
pub struct ApiStatusQuerier {
    client: Arc<dyn CloudApiClient>,
}

impl ApiStatusQuerier {
    pub fn new(client: Arc<dyn CloudApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl StatusQuerier for ApiStatusQuerier {
    async fn get_status(&self, handle: &str) -> Result<RequestStatus> {
        let request_id = request_id_from_handle(handle)?;
        let response = self.client.request_status(&request_id).await?;

        let status = string_at(&response, "/metadata/status").ok_or_else(|| {
            CloudError::InvalidResponse(format!(
                "status of request {} has no metadata.status",
                request_id
            ))
        })?;
        let message = string_at(&response, "/metadata/message");

        Ok(RequestStatus { status, message })
    }
}

/// Reads `metadata.state` of a resource of one kind.
pub struct ApiStateQuerier {
    client: Arc<dyn CloudApiClient>,
    kind: ResourceKind,
    parents: ParentIds,
}

impl ApiStateQuerier {
    pub fn new(client: Arc<dyn CloudApiClient>, kind: ResourceKind, parents: ParentIds) -> Self {
        Self {
            client,
            kind,
            parents,
        }
    }
}

#[async_trait::async_trait]
impl StateQuerier for ApiStateQuerier {
    async fn get_state(&self, id: &str) -> Result<String> {
        let path = self.kind.item_path(&self.parents, id)?;
        let resource = self.client.get(&path).await?;

        string_at(&resource, "/metadata/state")
            .ok_or_else(|| CloudError::state_unavailable(self.kind.name(), id))
    }
}

fn string_at(value: &Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
}
