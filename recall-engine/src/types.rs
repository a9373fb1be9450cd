//! Wire types exchanged with the memory engine.
//!
//! The engine owns the shape of memory records; this layer only carries
//! opaque `serde_json::Value` payloads plus the small typed envelopes the
//! REST API expects on the way in.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single message in a conversation handed to the engine for extraction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Role of the speaker, e.g. "user" or "assistant".
    pub role: String,
    /// Full text of the utterance to store.
    pub content: String,
}

impl Message {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    /// A single user-role message, the shape a plain `text` write collapses to.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }
}

/// Scope identifiers attached to memory operations.
///
/// Unset fields are omitted from request bodies and query strings so the
/// engine applies its own defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemoryScope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
}

impl MemoryScope {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Default::default()
        }
    }

    /// Fill an empty `user_id` with the given default, leaving explicit
    /// overrides untouched.
    pub fn with_default_user(mut self, default_user_id: &str) -> Self {
        if self.user_id.is_none() {
            self.user_id = Some(default_user_id.to_string());
        }
        self
    }

    /// Project set fields into query parameters for GET/DELETE endpoints.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(user_id) = &self.user_id {
            params.push(("user_id", user_id.clone()));
        }
        if let Some(agent_id) = &self.agent_id {
            params.push(("agent_id", agent_id.clone()));
        }
        if let Some(run_id) = &self.run_id {
            params.push(("run_id", run_id.clone()));
        }
        params
    }

    pub fn is_empty(&self) -> bool {
        self.user_id.is_none() && self.agent_id.is_none() && self.run_id.is_none()
    }
}

/// Body for POST /memories.
#[derive(Debug, Clone, Serialize)]
pub struct AddRequest {
    pub messages: Vec<Message>,
    #[serde(flatten)]
    pub scope: MemoryScope,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// Body for POST /search.
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(flatten)]
    pub scope: MemoryScope,
    /// Metadata filters, e.g. `{"project": "recall"}` or operator forms
    /// like `{"key": {"in": ["a", "b"]}}`. Forwarded verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

/// Body for PUT /memories/{id}.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateRequest {
    pub text: String,
}

/// Extract the memory list from an engine payload.
///
/// The engine returns either `{"results": [...]}` or a bare array depending
/// on the endpoint; both collapse to the inner list, anything else to empty.
pub fn results_of(payload: &Value) -> Vec<Value> {
    if let Some(results) = payload.get("results").and_then(Value::as_array) {
        return results.clone();
    }
    if let Some(items) = payload.as_array() {
        return items.clone();
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scope_query_params_skip_unset() {
        let scope = MemoryScope {
            user_id: Some("alice".into()),
            agent_id: None,
            run_id: Some("run-7".into()),
        };
        let params = scope.query_params();
        assert_eq!(
            params,
            vec![
                ("user_id", "alice".to_string()),
                ("run_id", "run-7".to_string())
            ]
        );
    }

    #[test]
    fn test_scope_default_user_fills_only_when_unset() {
        let scope = MemoryScope::default().with_default_user("default_user");
        assert_eq!(scope.user_id.as_deref(), Some("default_user"));

        let scope = MemoryScope::for_user("bob").with_default_user("default_user");
        assert_eq!(scope.user_id.as_deref(), Some("bob"));
    }

    #[test]
    fn test_add_request_serialization_flattens_scope() {
        let req = AddRequest {
            messages: vec![Message::user("likes espresso")],
            scope: MemoryScope::for_user("alice"),
            metadata: None,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["user_id"], "alice");
        assert_eq!(value["messages"][0]["role"], "user");
        assert!(value.get("metadata").is_none());
        assert!(value.get("agent_id").is_none());
    }

    #[test]
    fn test_search_request_forwards_filters() {
        let req = SearchRequest {
            query: "coffee".into(),
            scope: MemoryScope::for_user("alice"),
            filters: Some(json!({"project": {"in": ["a", "b"]}})),
            limit: Some(5),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["filters"]["project"]["in"][0], "a");
        assert_eq!(value["limit"], 5);
    }

    #[test]
    fn test_results_of_envelope() {
        let payload = json!({"results": [{"id": "m1"}, {"id": "m2"}]});
        assert_eq!(results_of(&payload).len(), 2);
    }

    #[test]
    fn test_results_of_bare_array() {
        let payload = json!([{"id": "m1"}]);
        assert_eq!(results_of(&payload).len(), 1);
    }

    #[test]
    fn test_results_of_other_shapes_empty() {
        assert!(results_of(&json!({"id": "m1"})).is_empty());
        assert!(results_of(&json!(null)).is_empty());
    }
}
