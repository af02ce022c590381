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

//! Executes resource verbs against the API and waits on their completion.

use crate::domain::resource::{build_properties, items, ParentIds, ResourceKind, Tracking, Verb};
use crate::domain::wait::{
    Interrogator, RequestStatusInterrogator, ResourceDeletionInterrogator,
    ResourceStateInterrogator, WaitConfig, Waiter,
};
use crate::infrastructure::api::{ApiResponse, ApiStateQuerier, ApiStatusQuerier, CloudApiClient};
use crate::infrastructure::constants::{DELETE_ALL_CONCURRENCY, POLL_INTERVAL};
use crate::shared::{CloudError, Result};
use futures::{stream, StreamExt};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// What to wait for after a mutating call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitMode {
    #[default]
    None,
    /// Poll the request returned in the `Location` header until it is DONE.
    Request,
    /// Poll the resource until it reaches its ready state.
    State,
    /// Poll the resource until it is gone.
    Deletion,
}

/// Properties of a create or update call.
#[derive(Debug, Clone, Default)]
pub struct Mutation {
    pub name: Option<String>,
    pub properties: Vec<String>,
    pub wait: WaitMode,
    pub timeout: Option<u64>,
}

pub struct ResourceExecutor {
    client: Arc<dyn CloudApiClient>,
    kind: ResourceKind,
    parents: ParentIds,
    cancel: CancellationToken,
    interval: Duration,
}

impl ResourceExecutor {
    pub fn new(client: Arc<dyn CloudApiClient>, kind: ResourceKind, parents: ParentIds) -> Self {
        Self {
            client,
            kind,
            parents,
            cancel: CancellationToken::new(),
            interval: POLL_INTERVAL,
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub async fn list(&self, max_results: Option<usize>) -> Result<Value> {
        self.kind.ensure_supports(Verb::List)?;
        let path = self.kind.collection_path(&self.parents)?;
        let mut response = self.client.list(&path).await?;

        if let Some(max) = max_results {
            if let Some(list) = response.get_mut("items").and_then(Value::as_array_mut) {
                list.truncate(max);
            }
        }
        Ok(response)
    }

    pub async fn get(&self, id: &str) -> Result<Value> {
        self.kind.ensure_supports(Verb::Get)?;
        let path = self.kind.item_path(&self.parents, id)?;
        self.client.get(&path).await
    }

    /// Create a resource, optionally waiting until it is usable.
    pub async fn create(&self, resource_id: Option<&str>, mutation: &Mutation) -> Result<Value> {
        self.kind.ensure_supports(Verb::Create)?;
        self.check_wait_mode(mutation.wait, Verb::Create)?;

        let properties = build_properties(mutation.name.as_deref(), &mutation.properties)?;
        let path = self.kind.create_path(&self.parents, resource_id)?;
        let response = self
            .client
            .create(&path, &self.kind.create_body(properties))
            .await?;
        info!(kind = %self.kind, id = ?response.resource_id(), "Create accepted");

        self.finish_mutation(Verb::Create, response, mutation).await
    }

    pub async fn update(&self, id: &str, mutation: &Mutation) -> Result<Value> {
        self.kind.ensure_supports(Verb::Update)?;
        self.check_wait_mode(mutation.wait, Verb::Update)?;

        let properties = build_properties(mutation.name.as_deref(), &mutation.properties)?;
        if properties.is_empty() {
            return Err(CloudError::validation(
                "nothing to update: pass --name or at least one --property",
            ));
        }
        let path = self.kind.item_path(&self.parents, id)?;
        let response = self
            .client
            .update(&path, self.kind.update_method(), &self.kind.update_body(properties))
            .await?;
        info!(kind = %self.kind, id = %id, "Update accepted");

        self.finish_mutation(Verb::Update, response, mutation).await
    }

    /// Delete one resource. Returns a line describing what happened.
    pub async fn delete(&self, id: &str, wait: WaitMode, timeout: Option<u64>) -> Result<String> {
        self.kind.ensure_supports(Verb::Delete)?;
        self.check_wait_mode(wait, Verb::Delete)?;

        let path = self.kind.item_path(&self.parents, id)?;
        let response = self.client.delete(&path).await?;
        info!(kind = %self.kind, id = %id, "Delete accepted");

        self.wait_for_deletion(id, &response, wait, timeout).await
    }

    /// Delete every listed resource of this kind.
    ///
    /// Deletes run with bounded concurrency; waits, if requested, run one after
    /// another once all deletes have been accepted.
    pub async fn delete_all(&self, wait: WaitMode, timeout: Option<u64>) -> Result<Vec<String>> {
        self.kind.ensure_supports(Verb::Delete)?;
        self.check_wait_mode(wait, Verb::Delete)?;

        let listing = self.client.list(&self.kind.collection_path(&self.parents)?).await?;
        let mut targets = Vec::new();
        for item in items(&listing) {
            if let Some(id) = item.get("id").and_then(Value::as_str) {
                targets.push((id.to_string(), self.kind.item_path(&self.parents, id)?));
            }
        }
        if targets.is_empty() {
            return Ok(vec![format!("No {} resources to delete", self.kind)]);
        }
        info!(kind = %self.kind, count = targets.len(), "Deleting all resources");

        let results = stream::iter(targets)
            .map(|(id, path)| {
                let client = Arc::clone(&self.client);
                async move {
                    let result = client.delete(&path).await;
                    (id, result)
                }
            })
            .buffer_unordered(DELETE_ALL_CONCURRENCY)
            .collect::<Vec<_>>()
            .await;

        let mut accepted = Vec::new();
        let mut first_error = None;
        for (id, result) in results {
            match result {
                Ok(response) => accepted.push((id, response)),
                Err(e) => {
                    warn!(kind = %self.kind, id = %id, error = %e, "Delete failed");
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        let mut messages = Vec::with_capacity(accepted.len());
        for (id, response) in &accepted {
            messages.push(self.wait_for_deletion(id, response, wait, timeout).await?);
        }
        Ok(messages)
    }

    /// Wait on an existing request or resource.
    pub async fn wait(&self, id: &str, timeout: Option<u64>) -> Result<String> {
        self.kind.ensure_supports(Verb::Wait)?;

        if self.kind == ResourceKind::Request {
            self.await_request(id, timeout).await?;
            return Ok(format!("Request {} is DONE", id));
        }

        let ready = self.ready_state()?;
        self.await_state(id, ready, timeout).await?;
        Ok(format!("{} {} is {}", self.kind, id, ready))
    }

    fn check_wait_mode(&self, wait: WaitMode, verb: Verb) -> Result<()> {
        match (wait, verb) {
            (WaitMode::None, _) => Ok(()),
            (WaitMode::Request, _) if self.kind.tracking() == Tracking::State => {
                Err(CloudError::Unsupported(format!(
                    "{} does not return a request handle; use --wait-for-state or --wait-for-deletion",
                    self.kind
                )))
            }
            (WaitMode::Request, _) => Ok(()),
            (WaitMode::State, Verb::Create | Verb::Update) => self.ready_state().map(|_| ()),
            (WaitMode::Deletion, Verb::Delete) => Ok(()),
            (mode, verb) => Err(CloudError::validation(format!(
                "{:?} waiting does not apply to {}",
                mode, verb
            ))),
        }
    }

    fn ready_state(&self) -> Result<&'static str> {
        self.kind.ready_state().ok_or_else(|| {
            CloudError::Unsupported(format!("{} has no ready state to wait for", self.kind))
        })
    }

    async fn finish_mutation(
        &self,
        verb: Verb,
        response: ApiResponse,
        mutation: &Mutation,
    ) -> Result<Value> {
        match mutation.wait {
            WaitMode::Request => {
                let handle = self.request_handle(&response, verb)?;
                self.await_request(&handle, mutation.timeout).await?;
                Ok(response.body)
            }
            WaitMode::State => {
                let id = response
                    .resource_id()
                    .ok_or_else(|| {
                        CloudError::InvalidResponse(format!(
                            "{} {} response has no id",
                            self.kind, verb
                        ))
                    })?
                    .to_string();
                self.await_state(&id, self.ready_state()?, mutation.timeout)
                    .await?;
                self.client.get(&self.kind.item_path(&self.parents, &id)?).await
            }
            WaitMode::None | WaitMode::Deletion => Ok(response.body),
        }
    }

    async fn wait_for_deletion(
        &self,
        id: &str,
        response: &ApiResponse,
        wait: WaitMode,
        timeout: Option<u64>,
    ) -> Result<String> {
        match wait {
            WaitMode::Request => {
                let handle = self.request_handle(response, Verb::Delete)?;
                self.await_request(&handle, timeout).await?;
                Ok(format!("Deleted {} {}", self.kind, id))
            }
            WaitMode::Deletion => {
                let interrogator = ResourceDeletionInterrogator::new(self.state_querier());
                self.waiter(timeout).wait(id, &interrogator).await?;
                Ok(format!("Deleted {} {}", self.kind, id))
            }
            WaitMode::None | WaitMode::State => {
                Ok(format!("Deletion of {} {} requested", self.kind, id))
            }
        }
    }

    fn request_handle(&self, response: &ApiResponse, verb: Verb) -> Result<String> {
        response.request.clone().ok_or_else(|| {
            CloudError::validation(format!(
                "{} {} returned no request to wait for",
                self.kind, verb
            ))
        })
    }

    async fn await_request(&self, handle: &str, timeout: Option<u64>) -> Result<()> {
        let interrogator =
            RequestStatusInterrogator::new(ApiStatusQuerier::new(Arc::clone(&self.client)));
        self.run_wait(handle, &interrogator, timeout).await
    }

    async fn await_state(&self, id: &str, ready: &str, timeout: Option<u64>) -> Result<()> {
        let interrogator = ResourceStateInterrogator::new(self.state_querier(), ready);
        self.run_wait(id, &interrogator, timeout).await
    }

    async fn run_wait(
        &self,
        id: &str,
        interrogator: &dyn Interrogator,
        timeout: Option<u64>,
    ) -> Result<()> {
        Ok(self.waiter(timeout).wait(id, interrogator).await?)
    }

    fn state_querier(&self) -> ApiStateQuerier {
        ApiStateQuerier::new(Arc::clone(&self.client), self.kind, self.parents.clone())
    }

    fn waiter(&self, timeout: Option<u64>) -> Waiter {
        let config = WaitConfig::from_timeout_flag(timeout, self.kind.default_timeout())
            .with_interval(self.interval);
        Waiter::new(config).with_cancellation(self.cancel.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::resource::UpdateMethod;
    use crate::shared::WaitError;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// In-memory API that records calls and replays scripted states.
    #[derive(Default)]
    struct FakeApi {
        calls: Mutex<Vec<String>>,
        listing: Value,
        location: Option<String>,
        statuses: Mutex<VecDeque<&'static str>>,
        states: Mutex<VecDeque<Option<&'static str>>>,
        stateless: bool,
    }

    impl FakeApi {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn mutation(&self, body: Value) -> ApiResponse {
            ApiResponse {
                body,
                request: self.location.clone(),
            }
        }
    }

    #[async_trait::async_trait]
    impl CloudApiClient for FakeApi {
        async fn list(&self, path: &str) -> Result<Value> {
            self.record(format!("LIST {}", path));
            Ok(self.listing.clone())
        }

        async fn get(&self, path: &str) -> Result<Value> {
            self.record(format!("GET {}", path));
            let next = self.states.lock().unwrap().pop_front().unwrap_or(Some("AVAILABLE"));
            match next {
                Some(_) if self.stateless => Ok(json!({ "id": "res-1", "metadata": { "etag": "x" } })),
                Some(state) => Ok(json!({ "id": "res-1", "metadata": { "state": state } })),
                None => Err(CloudError::not_found("resource", path)),
            }
        }

        async fn create(&self, path: &str, body: &Value) -> Result<ApiResponse> {
            self.record(format!("POST {} {}", path, body));
            Ok(self.mutation(json!({ "id": "res-1" })))
        }

        async fn update(&self, path: &str, method: UpdateMethod, body: &Value) -> Result<ApiResponse> {
            self.record(format!("{:?} {} {}", method, path, body));
            Ok(self.mutation(json!({ "id": "res-1" })))
        }

        async fn delete(&self, path: &str) -> Result<ApiResponse> {
            self.record(format!("DELETE {}", path));
            Ok(self.mutation(Value::Null))
        }

        async fn request_status(&self, request_id: &str) -> Result<Value> {
            self.record(format!("STATUS {}", request_id));
            let status = self.statuses.lock().unwrap().pop_front().unwrap_or("DONE");
            Ok(json!({ "metadata": { "status": status, "message": "request failed" } }))
        }
    }

    fn executor(api: Arc<FakeApi>, kind: ResourceKind) -> ResourceExecutor {
        ResourceExecutor::new(api, kind, ParentIds::default())
            .with_poll_interval(Duration::from_millis(10))
    }

    fn mutation(wait: WaitMode) -> Mutation {
        Mutation {
            name: Some("prod".to_string()),
            properties: vec!["location=de/fra".to_string()],
            wait,
            timeout: None,
        }
    }

    #[tokio::test]
    async fn test_list_truncates_to_max_results() {
        let api = Arc::new(FakeApi {
            listing: json!({ "items": [ { "id": "a" }, { "id": "b" }, { "id": "c" } ] }),
            ..Default::default()
        });

        let listing = executor(api, ResourceKind::Datacenter)
            .list(Some(2))
            .await
            .unwrap();
        assert_eq!(listing["items"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_without_wait_does_not_poll() {
        let api = Arc::new(FakeApi::default());

        let body = executor(api.clone(), ResourceKind::Datacenter)
            .create(None, &mutation(WaitMode::None))
            .await
            .unwrap();

        assert_eq!(body["id"], "res-1");
        assert_eq!(
            api.calls(),
            vec![r#"POST /datacenters {"properties":{"location":"de/fra","name":"prod"}}"#]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_waits_for_request() {
        let api = Arc::new(FakeApi {
            location: Some("https://api.example.com/requests/req-1/status".to_string()),
            statuses: Mutex::new(VecDeque::from(vec!["QUEUED", "RUNNING", "DONE"])),
            ..Default::default()
        });

        executor(api.clone(), ResourceKind::Datacenter)
            .create(None, &mutation(WaitMode::Request))
            .await
            .unwrap();

        let statuses = api.calls().iter().filter(|c| c.starts_with("STATUS req-1")).count();
        assert_eq!(statuses, 3);
    }

    #[tokio::test]
    async fn test_wait_for_request_without_location_is_rejected() {
        let api = Arc::new(FakeApi::default());

        let err = executor(api, ResourceKind::Datacenter)
            .create(None, &mutation(WaitMode::Request))
            .await
            .unwrap_err();
        assert!(matches!(err, CloudError::Validation(_)));
    }

    #[tokio::test]
    async fn test_request_wait_rejected_for_state_tracked_kind() {
        let api = Arc::new(FakeApi::default());

        let err = executor(api.clone(), ResourceKind::K8sCluster)
            .create(None, &mutation(WaitMode::Request))
            .await
            .unwrap_err();
        assert!(matches!(err, CloudError::Unsupported(_)));
        assert!(api.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_request_surfaces_reason() {
        let api = Arc::new(FakeApi {
            location: Some("/requests/req-9/status".to_string()),
            statuses: Mutex::new(VecDeque::from(vec!["FAILED"])),
            ..Default::default()
        });

        let err = executor(api, ResourceKind::Pcc)
            .create(None, &mutation(WaitMode::Request))
            .await
            .unwrap_err();
        match err {
            CloudError::Wait(WaitError::OperationFailed { reason, .. }) => {
                assert_eq!(reason, "request failed")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_k8s_cluster_waits_for_active() {
        let api = Arc::new(FakeApi {
            states: Mutex::new(VecDeque::from(vec![
                Some("UPDATING"),
                Some("ACTIVE"),
                Some("ACTIVE"),
            ])),
            ..Default::default()
        });

        let body = executor(api.clone(), ResourceKind::K8sCluster)
            .update("res-1", &mutation(WaitMode::State))
            .await
            .unwrap();

        assert_eq!(body["metadata"]["state"], "ACTIVE");
        let calls = api.calls();
        assert!(calls[0].starts_with("Put /k8s/res-1"));
        assert_eq!(calls.iter().filter(|c| c.starts_with("GET")).count(), 3);
    }

    #[tokio::test]
    async fn test_update_requires_changes() {
        let api = Arc::new(FakeApi::default());

        let err = executor(api, ResourceKind::Datacenter)
            .update("dc-1", &Mutation::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CloudError::Validation(_)));
    }

    #[tokio::test]
    async fn test_state_wait_unsupported_without_ready_state() {
        let api = Arc::new(FakeApi::default());

        let err = executor(api, ResourceKind::User)
            .create(None, &mutation(WaitMode::State))
            .await
            .unwrap_err();
        assert!(matches!(err, CloudError::Unsupported(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_waits_until_gone() {
        let api = Arc::new(FakeApi {
            states: Mutex::new(VecDeque::from(vec![Some("DESTROYING"), None])),
            ..Default::default()
        });

        let message = executor(api.clone(), ResourceKind::K8sCluster)
            .delete("res-1", WaitMode::Deletion, None)
            .await
            .unwrap();

        assert_eq!(message, "Deleted k8s cluster res-1");
        assert_eq!(api.calls().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_waits_for_stateless_user() {
        let api = Arc::new(FakeApi {
            states: Mutex::new(VecDeque::from(vec![Some("present"), None])),
            stateless: true,
            ..Default::default()
        });

        let message = executor(api.clone(), ResourceKind::User)
            .delete("u-1", WaitMode::Deletion, None)
            .await
            .unwrap();

        assert_eq!(message, "Deleted user u-1");
        assert_eq!(
            api.calls(),
            vec!["DELETE /um/users/u-1", "GET /um/users/u-1", "GET /um/users/u-1"]
        );
    }

    #[tokio::test]
    async fn test_delete_all_deletes_every_item() {
        let api = Arc::new(FakeApi {
            listing: json!({ "items": [ { "id": "s-1" }, { "id": "s-2" }, { "id": "s-3" } ] }),
            ..Default::default()
        });

        let messages = executor(api.clone(), ResourceKind::Snapshot)
            .delete_all(WaitMode::None, None)
            .await
            .unwrap();

        assert_eq!(messages.len(), 3);
        let mut deletes: Vec<_> = api
            .calls()
            .into_iter()
            .filter(|c| c.starts_with("DELETE"))
            .collect();
        deletes.sort();
        assert_eq!(
            deletes,
            vec!["DELETE /snapshots/s-1", "DELETE /snapshots/s-2", "DELETE /snapshots/s-3"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_verb_on_request() {
        let api = Arc::new(FakeApi {
            statuses: Mutex::new(VecDeque::from(vec!["RUNNING", "DONE"])),
            ..Default::default()
        });

        let message = executor(api, ResourceKind::Request)
            .wait("req-1", Some(5))
            .await
            .unwrap();
        assert_eq!(message, "Request req-1 is DONE");
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_verb_on_k8s_node_until_ready() {
        let api = Arc::new(FakeApi {
            states: Mutex::new(VecDeque::from(vec![Some("PROVISIONING"), Some("READY")])),
            ..Default::default()
        });
        let parents = ParentIds {
            cluster_id: Some("c-1".to_string()),
            nodepool_id: Some("np-1".to_string()),
            ..Default::default()
        };

        let message = ResourceExecutor::new(api.clone(), ResourceKind::K8sNode, parents)
            .with_poll_interval(Duration::from_millis(10))
            .wait("n-1", None)
            .await
            .unwrap();

        assert_eq!(message, "k8s node n-1 is READY");
        assert_eq!(api.calls()[0], "GET /k8s/c-1/nodepools/np-1/nodes/n-1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_wait() {
        let api = Arc::new(FakeApi {
            states: Mutex::new(VecDeque::from(vec![Some("BUSY")])),
            ..Default::default()
        });
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = executor(api.clone(), ResourceKind::Datacenter)
            .with_cancellation(cancel)
            .wait("dc-1", None)
            .await
            .unwrap_err();

        assert!(matches!(err, CloudError::Wait(WaitError::Cancelled { .. })));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_verb() {
        let api = Arc::new(FakeApi::default());

        let err = executor(api, ResourceKind::Label)
            .delete("l-1", WaitMode::None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, CloudError::Unsupported(_)));
    }
}
