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

use crate::domain::config::{Credentials, Settings};
use crate::domain::resource::UpdateMethod;
use crate::infrastructure::constants::{DEFAULT_DEPTH, USER_AGENT};
use crate::shared::{CloudError, Result};
use regex::Regex;
use reqwest::header::LOCATION;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace};

/// Response of a mutating call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub body: Value,
    /// Handle of the asynchronous request, from the `Location` header.
    pub request: Option<String>,
}

impl ApiResponse {
    pub fn resource_id(&self) -> Option<&str> {
        self.body.get("id").and_then(Value::as_str)
    }
}

#[async_trait::async_trait]
pub trait CloudApiClient: Send + Sync {
    async fn list(&self, path: &str) -> Result<Value>;

    async fn get(&self, path: &str) -> Result<Value>;

    async fn create(&self, path: &str, body: &Value) -> Result<ApiResponse>;

    async fn update(&self, path: &str, method: UpdateMethod, body: &Value)
        -> Result<ApiResponse>;

    async fn delete(&self, path: &str) -> Result<ApiResponse>;

    async fn request_status(&self, request_id: &str) -> Result<Value>;
}

pub struct HttpCloudApiClient {
    client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl HttpCloudApiClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let credentials = settings.require_credentials()?.clone();
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CloudError::config_error(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: settings.api_url.clone(),
            credentials,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(method = %method, url = %url, "API request");
        let builder = self.client.request(method, url);
        match &self.credentials {
            Credentials::Token(token) => builder.bearer_auth(token),
            Credentials::Basic { username, password } => {
                builder.basic_auth(username, Some(password))
            }
        }
    }

    async fn send(&self, builder: RequestBuilder, path: &str) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        trace!(status = %status, path = %path, "API response");

        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(CloudError::not_found(resource_type_of(path), path));
        }

        let text = response.text().await.unwrap_or_default();
        Err(CloudError::Api {
            status: status.as_u16(),
            message: error_message(status, &text),
        })
    }

    async fn read(&self, path: &str) -> Result<Value> {
        let builder = self
            .request(Method::GET, path)
            .query(&[("depth", DEFAULT_DEPTH)]);
        let response = self.send(builder, path).await?;
        parse_body(response).await
    }

    async fn mutate(&self, method: Method, path: &str, body: Option<&Value>) -> Result<ApiResponse> {
        let mut builder = self.request(method, path);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = self.send(builder, path).await?;
        let request = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = parse_body(response).await?;
        Ok(ApiResponse { body, request })
    }
}

#[async_trait::async_trait]
impl CloudApiClient for HttpCloudApiClient {
    async fn list(&self, path: &str) -> Result<Value> {
        self.read(path).await
    }

    async fn get(&self, path: &str) -> Result<Value> {
        self.read(path).await
    }

    async fn create(&self, path: &str, body: &Value) -> Result<ApiResponse> {
        self.mutate(Method::POST, path, Some(body)).await
    }

    async fn update(
        &self,
        path: &str,
        method: UpdateMethod,
        body: &Value,
    ) -> Result<ApiResponse> {
        let method = match method {
            UpdateMethod::Patch => Method::PATCH,
            UpdateMethod::Put => Method::PUT,
        };
        self.mutate(method, path, Some(body)).await
    }

    async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.mutate(Method::DELETE, path, None).await
    }

    async fn request_status(&self, request_id: &str) -> Result<Value> {
        let path = format!("/requests/{}/status", request_id);
        let response = self.send(self.request(Method::GET, &path), &path).await?;
        parse_body(response).await
    }
}

async fn parse_body(response: Response) -> Result<Value> {
    let text = response.text().await?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text)?)
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    messages: Vec<ErrorMessage>,
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    #[serde(rename = "errorCode")]
    error_code: Option<String>,
    message: Option<String>,
}

/// Human-readable message from the provider's error body.
fn error_message(status: StatusCode, text: &str) -> String {
    let messages: Vec<String> = serde_json::from_str::<ErrorBody>(text)
        .map(|body| {
            body.messages
                .into_iter()
                .filter_map(|m| match (m.error_code, m.message) {
                    (Some(code), Some(msg)) => Some(format!("[{}] {}", code, msg)),
                    (None, Some(msg)) => Some(msg),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    if !messages.is_empty() {
        messages.join("; ")
    } else if !text.trim().is_empty() {
        text.trim().to_string()
    } else {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    }
}

/// Collection name used in not-found messages, e.g. `nodepools` for
/// `/k8s/c1/nodepools/np1`.
fn resource_type_of(path: &str) -> &str {
    let mut segments = path.trim_matches('/').rsplit('/');
    segments.next();
    segments.next().unwrap_or("resource")
}

/// Extract the request id from a request handle.
///
/// A handle is either the status URL returned in the `Location` header
/// (`.../requests/{id}/status`) or a bare request id.
pub fn request_id_from_handle(handle: &str) -> Result<String> {
    let re = Regex::new(r"/requests/([^/?#]+)")
        .map_err(|e| CloudError::validation(format!("Invalid request pattern: {}", e)))?;

    let handle = handle.trim();
    if let Some(caps) = re.captures(handle) {
        return Ok(caps[1].to_string());
    }
    if !handle.is_empty() && !handle.contains('/') {
        return Ok(handle.to_string());
    }
    Err(CloudError::validation(format!(
        "'{}' is not a request id or request status URL",
        handle
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_from_handle() {
        assert_eq!(
            request_id_from_handle(
                "https://api.example.test/cloudapi/v6/requests/6e1b3c58-3d3a-4e7a-9a58-bc0b6a4e1f21/status"
            )
            .unwrap(),
            "6e1b3c58-3d3a-4e7a-9a58-bc0b6a4e1f21"
        );
        assert_eq!(
            request_id_from_handle("/requests/abc/status").unwrap(),
            "abc"
        );
        assert_eq!(request_id_from_handle(" abc ").unwrap(), "abc");
        assert!(request_id_from_handle("").is_err());
        assert!(request_id_from_handle("/datacenters/abc").is_err());
    }

    #[test]
    fn test_error_message_from_body() {
        let body = r#"{"httpStatus":422,"messages":[{"errorCode":"100","message":"Invalid location"},{"message":"second"}]}"#;
        assert_eq!(
            error_message(StatusCode::UNPROCESSABLE_ENTITY, body),
            "[100] Invalid location; second"
        );
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "upstream down"),
            "upstream down"
        );
        assert_eq!(
            error_message(StatusCode::SERVICE_UNAVAILABLE, ""),
            "Service Unavailable"
        );
    }

    #[test]
    fn test_resource_type_of() {
        assert_eq!(resource_type_of("/k8s/c1/nodepools/np1"), "nodepools");
        assert_eq!(resource_type_of("/datacenters/dc-1"), "datacenters");
        assert_eq!(resource_type_of("/k8s"), "resource");
    }

    #[test]
    fn test_new_requires_credentials() {
        let settings = Settings {
            api_url: "https://api.example.test".to_string(),
            credentials: None,
        };
        assert!(matches!(
            HttpCloudApiClient::new(&settings),
            Err(CloudError::Config(_))
        ));
    }
}
