//! HTTP client for the memory engine REST API.
//!
//! The engine owns fact extraction, embeddings, and persistence; this client
//! only marshals requests onto its REST surface and hands back the opaque
//! JSON payloads it returns.

use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::Value;

use crate::config::EngineSettings;
use crate::error::{EngineError, Result};
use crate::types::{AddRequest, MemoryScope, SearchRequest, UpdateRequest};

/// Client for one engine instance.
///
/// The process holds a single shared instance behind the server's
/// initialization guard; nothing here is per-request state.
pub struct EngineClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl EngineClient {
    /// Build a client from connection settings.
    pub fn new(settings: &EngineSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.http.request(method, url);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        builder
    }

    /// Send a request and decode the JSON payload, mapping non-2xx statuses
    /// to [`EngineError::Api`] with the body's detail message when present.
    async fn execute(&self, builder: RequestBuilder) -> Result<Value> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(EngineError::api(status.as_u16(), error_detail(status, &body)));
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// Push the assembled provider configuration to the engine.
    pub async fn configure(&self, config: &Value) -> Result<Value> {
        tracing::info!("configuring memory engine at {}", self.base_url);
        self.execute(self.request(Method::POST, "/configure").json(config))
            .await
    }

    /// Store a conversation; the engine extracts and persists facts from it.
    pub async fn add(&self, request: &AddRequest) -> Result<Value> {
        self.execute(self.request(Method::POST, "/memories").json(request))
            .await
    }

    /// Semantic search across stored memories.
    pub async fn search(&self, request: &SearchRequest) -> Result<Value> {
        self.execute(self.request(Method::POST, "/search").json(request))
            .await
    }

    /// List memories in the given scope.
    pub async fn list(&self, scope: &MemoryScope) -> Result<Value> {
        self.execute(
            self.request(Method::GET, "/memories")
                .query(&scope.query_params()),
        )
        .await
    }

    /// Fetch a single memory by id.
    pub async fn get(&self, memory_id: &str) -> Result<Value> {
        self.execute(self.request(Method::GET, &format!("/memories/{memory_id}")))
            .await
    }

    /// Overwrite a memory's text.
    pub async fn update(&self, memory_id: &str, text: &str) -> Result<Value> {
        let body = UpdateRequest {
            text: text.to_string(),
        };
        self.execute(
            self.request(Method::PUT, &format!("/memories/{memory_id}"))
                .json(&body),
        )
        .await
    }

    /// Delete a single memory by id.
    pub async fn delete(&self, memory_id: &str) -> Result<Value> {
        self.execute(self.request(Method::DELETE, &format!("/memories/{memory_id}")))
            .await
    }

    /// Bulk-delete every memory in the given scope.
    pub async fn delete_all(&self, scope: &MemoryScope) -> Result<Value> {
        self.execute(
            self.request(Method::DELETE, "/memories")
                .query(&scope.query_params()),
        )
        .await
    }

    /// Change history for a memory.
    pub async fn history(&self, memory_id: &str) -> Result<Value> {
        self.execute(self.request(Method::GET, &format!("/memories/{memory_id}/history")))
            .await
    }

    /// Drop every memory the engine holds.
    pub async fn reset(&self) -> Result<Value> {
        self.execute(self.request(Method::POST, "/reset")).await
    }
}

/// Pull a human-readable message out of an error body. The engine wraps
/// errors as `{"detail": "..."}`; fall back to the raw body, then the status.
fn error_detail(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(detail) = value.get("detail").and_then(Value::as_str) {
            return detail.to_string();
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;
    use axum::extract::{Path, Query, RawQuery};
    use axum::http::HeaderMap;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    /// Spin up an in-process engine stub and return its base url.
    async fn spawn_mock_engine() -> String {
        let app = Router::new()
            .route(
                "/configure",
                post(|Json(body): Json<Value>| async move {
                    Json(json!({"message": "configured", "received": body}))
                }),
            )
            .route(
                "/memories",
                post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    Json(json!({"results": [{"event": "ADD", "memory": body}], "auth": auth}))
                })
                .get(|Query(params): Query<HashMap<String, String>>| async move {
                    Json(json!({"results": [], "scope": params}))
                })
                .delete(|RawQuery(query): RawQuery| async move {
                    Json(json!({"message": "deleted", "query": query.unwrap_or_default()}))
                }),
            )
            .route(
                "/memories/{id}",
                get(|Path(id): Path<String>| async move {
                    if id == "missing" {
                        return Err((
                            axum::http::StatusCode::NOT_FOUND,
                            Json(json!({"detail": "memory missing not found"})),
                        ));
                    }
                    Ok(Json(json!({"id": id, "memory": "likes espresso"})))
                }),
            )
            .route(
                "/memories/{id}/history",
                get(|Path(id): Path<String>| async move {
                    Json(json!([{"memory_id": id, "event": "ADD"}]))
                }),
            )
            .route("/reset", post(|| async { Json(json!({"message": "reset"})) }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client_for(base_url: &str, api_key: Option<&str>) -> EngineClient {
        EngineClient::new(&EngineSettings {
            base_url: base_url.to_string(),
            api_key: api_key.map(str::to_string),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_configure_round_trip() {
        let base = spawn_mock_engine().await;
        let client = client_for(&base, None);

        let result = client.configure(&json!({"llm": {"provider": "openai"}})).await.unwrap();
        assert_eq!(result["message"], "configured");
        assert_eq!(result["received"]["llm"]["provider"], "openai");
    }

    #[tokio::test]
    async fn test_add_sends_bearer_token() {
        let base = spawn_mock_engine().await;
        let client = client_for(&base, Some("secret-key"));

        let request = AddRequest {
            messages: vec![Message::user("likes espresso")],
            scope: MemoryScope::for_user("alice"),
            metadata: None,
        };
        let result = client.add(&request).await.unwrap();
        assert_eq!(result["auth"], "Bearer secret-key");
        assert_eq!(result["results"][0]["event"], "ADD");
    }

    #[tokio::test]
    async fn test_list_projects_scope_into_query() {
        let base = spawn_mock_engine().await;
        let client = client_for(&base, None);

        let scope = MemoryScope {
            user_id: Some("alice".into()),
            agent_id: Some("coder".into()),
            run_id: None,
        };
        let result = client.list(&scope).await.unwrap();
        assert_eq!(result["scope"]["user_id"], "alice");
        assert_eq!(result["scope"]["agent_id"], "coder");
        assert!(result["scope"].get("run_id").is_none());
    }

    #[tokio::test]
    async fn test_get_missing_maps_detail_to_api_error() {
        let base = spawn_mock_engine().await;
        let client = client_for(&base, None);

        let err = client.get("missing").await.unwrap_err();
        match err {
            EngineError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "memory missing not found");
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_history_returns_bare_array() {
        let base = spawn_mock_engine().await;
        let client = client_for(&base, None);

        let result = client.history("m-1").await.unwrap();
        assert_eq!(result[0]["memory_id"], "m-1");
    }

    #[tokio::test]
    async fn test_delete_all_without_scope_sends_no_params() {
        let base = spawn_mock_engine().await;
        let client = client_for(&base, None);

        let result = client.delete_all(&MemoryScope::default()).await.unwrap();
        assert_eq!(result["query"], "");
    }

    #[tokio::test]
    async fn test_reset() {
        let base = spawn_mock_engine().await;
        let client = client_for(&base, None);

        let result = client.reset().await.unwrap();
        assert_eq!(result["message"], "reset");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = client_for("http://localhost:8888/", None);
        assert_eq!(client.base_url(), "http://localhost:8888");
    }

    #[test]
    fn test_error_detail_fallbacks() {
        assert_eq!(
            error_detail(StatusCode::BAD_REQUEST, r#"{"detail": "bad scope"}"#),
            "bad scope"
        );
        assert_eq!(
            error_detail(StatusCode::BAD_REQUEST, "plain text failure"),
            "plain text failure"
        );
        assert_eq!(
            error_detail(StatusCode::INTERNAL_SERVER_ERROR, ""),
            "Internal Server Error"
        );
    }
}
