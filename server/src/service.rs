//! Memory service backing the MCP tools.
//!
//! Owns the single shared [`EngineClient`] for the process. The client is
//! constructed lazily on first use: the slow path takes the write lock,
//! re-checks, builds the client, assembles the provider configuration from
//! the environment, and pushes it to the engine before publishing the
//! client. Every tool call after that takes the read path.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::RwLock;

use recall_engine::error::Result;
use recall_engine::{
    build_engine_config, default_user_id, results_of, AddRequest, EngineClient, EngineSettings,
    Env, MemoryScope, Message, SearchRequest,
};

/// Memory service for the MCP server
pub struct MemoryService {
    engine: RwLock<Option<Arc<EngineClient>>>,
    env: Env,
    default_user_id: String,
}

impl MemoryService {
    /// Create a new service over the given environment snapshot.
    ///
    /// No connection is made here; the engine client is built on first use.
    pub fn new(env: Env) -> Self {
        let default_user_id = default_user_id(&env);
        Self {
            engine: RwLock::new(None),
            env,
            default_user_id,
        }
    }

    /// The user scope applied when a caller provides none.
    pub fn default_user_id(&self) -> &str {
        &self.default_user_id
    }

    /// Check if the engine client has been initialized
    pub async fn is_initialized(&self) -> bool {
        self.engine.read().await.is_some()
    }

    /// Get or lazily create the shared engine client.
    async fn client(&self) -> Result<Arc<EngineClient>> {
        // Fast path: already initialized
        if let Some(client) = self.engine.read().await.clone() {
            return Ok(client);
        }

        // Slow path: initialize under the write lock, re-checking first so
        // concurrent callers configure the engine exactly once.
        let mut guard = self.engine.write().await;
        if let Some(client) = guard.clone() {
            return Ok(client);
        }

        tracing::info!("initializing engine client");
        let client = Arc::new(EngineClient::new(&EngineSettings::from_env(&self.env))?);
        let config = build_engine_config(&self.env)?;
        client.configure(&config).await?;
        tracing::info!("engine client initialized");

        *guard = Some(Arc::clone(&client));
        Ok(client)
    }

    fn scoped(&self, scope: MemoryScope) -> MemoryScope {
        scope.with_default_user(&self.default_user_id)
    }

    /// Store text or a conversation in long-term memory.
    ///
    /// `text` collapses to a single user message when no structured
    /// conversation is provided. Returns the raw engine result (the list of
    /// extraction events) and logs how many memories were actually added.
    pub async fn add(
        &self,
        text: String,
        messages: Option<Vec<Message>>,
        scope: MemoryScope,
        metadata: Option<Value>,
    ) -> Result<Value> {
        let client = self.client().await?;

        let conversation = match messages {
            Some(messages) if !messages.is_empty() => messages,
            _ => vec![Message::user(text)],
        };

        let scope = self.scoped(scope);
        let request = AddRequest {
            messages: conversation,
            scope,
            metadata,
        };
        let result = client.add(&request).await?;

        // An event of "NONE" means the engine judged the input not worth
        // storing (duplicate or no extractable fact).
        let added = results_of(&result)
            .iter()
            .filter(|m| m.get("event").and_then(Value::as_str) == Some("ADD"))
            .count();
        tracing::info!(
            user_id = request.scope.user_id.as_deref().unwrap_or_default(),
            added,
            "memory add completed"
        );

        Ok(result)
    }

    /// Semantic search, shaped as `{"results": [...], "count": N}`.
    pub async fn search(
        &self,
        query: String,
        scope: MemoryScope,
        filters: Option<Value>,
        limit: usize,
    ) -> Result<Value> {
        let client = self.client().await?;

        let request = SearchRequest {
            query,
            scope: self.scoped(scope),
            filters,
            limit: Some(limit),
        };
        let result = client.search(&request).await?;
        let memories = results_of(&result);

        tracing::info!(count = memories.len(), "search completed");
        Ok(json!({ "results": memories, "count": memories.len() }))
    }

    /// List memories in scope, shaped as `{"results": [...], "count": N}`.
    pub async fn list(&self, scope: MemoryScope) -> Result<Value> {
        let client = self.client().await?;

        let scope = self.scoped(scope);
        let result = client.list(&scope).await?;
        let memories = results_of(&result);

        tracing::info!(
            user_id = scope.user_id.as_deref().unwrap_or_default(),
            count = memories.len(),
            "retrieved memories"
        );
        Ok(json!({ "results": memories, "count": memories.len() }))
    }

    /// Fetch a single memory by id.
    pub async fn get(&self, memory_id: &str) -> Result<Value> {
        let client = self.client().await?;
        let result = client.get(memory_id).await?;
        tracing::info!(memory_id, "retrieved memory");
        Ok(result)
    }

    /// Overwrite a memory's text.
    pub async fn update(&self, memory_id: &str, text: &str) -> Result<Value> {
        let client = self.client().await?;
        let result = client.update(memory_id, text).await?;
        tracing::info!(memory_id, "updated memory");
        Ok(result)
    }

    /// Delete a single memory.
    pub async fn delete(&self, memory_id: &str) -> Result<Value> {
        let client = self.client().await?;
        let result = client.delete(memory_id).await?;
        tracing::info!(memory_id, "deleted memory");
        Ok(json!({ "success": true, "deleted_id": memory_id, "result": result }))
    }

    /// Bulk-delete every memory in scope.
    ///
    /// The user scope always falls back to the configured default so an
    /// argument-less call can never cross user boundaries.
    pub async fn delete_all(&self, scope: MemoryScope) -> Result<Value> {
        let client = self.client().await?;

        let scope = self.scoped(scope);
        tracing::warn!(?scope, "bulk deleting memories");
        let result = client.delete_all(&scope).await?;

        Ok(json!({ "success": true, "scope": scope, "result": result }))
    }

    /// Change history for a memory.
    pub async fn history(&self, memory_id: &str) -> Result<Value> {
        let client = self.client().await?;
        let result = client.history(memory_id).await?;
        tracing::info!(memory_id, "retrieved memory history");
        Ok(result)
    }

    /// Reset the entire store. Refuses to act without `confirm: true`.
    pub async fn reset(&self, confirm: bool) -> Result<Value> {
        if !confirm {
            return Ok(json!({
                "error": "confirmation_required",
                "message": "Set confirm=true to proceed with reset. This will delete ALL memories!"
            }));
        }

        let client = self.client().await?;
        let result = client.reset().await?;
        tracing::warn!("all memories have been reset");
        Ok(json!({ "success": true, "message": "All memories have been reset", "result": result }))
    }
}
