//! Engine configuration assembly.
//!
//! The memory engine is configured with a single JSON document describing
//! which LLM, embedder, vector store, and (optionally) graph store it should
//! drive. This module assembles that document from environment variables,
//! shaping each section for the selected provider the way the engine
//! expects it.
//!
//! Env access goes through [`Env`], a plain snapshot map, so tests inject
//! variables directly instead of mutating the process environment.

use std::collections::HashMap;

use serde_json::{json, Map, Value};

use crate::error::{EngineError, Result};
use crate::prompts::{self, PromptKind};

/// Fallback user scope when a caller provides none.
pub const DEFAULT_USER_ID: &str = "default_user";

/// Snapshot of environment variables with typed accessors.
#[derive(Debug, Clone, Default)]
pub struct Env {
    vars: HashMap<String, String>,
}

impl Env {
    /// Capture the current process environment.
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Build from explicit pairs. Tests use this instead of touching the
    /// process environment.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn str_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_string()
    }

    /// Boolean parsing: `1/true/yes/on` and `0/false/no/off`; anything else
    /// falls back to the default.
    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        match self.get(key).map(str::to_ascii_lowercase).as_deref() {
            Some("1") | Some("true") | Some("yes") | Some("on") => true,
            Some("0") | Some("false") | Some("no") | Some("off") => false,
            _ => default,
        }
    }

    /// Integer parsing; unparseable values fall back to the default.
    pub fn int_or(&self, key: &str, default: i64) -> i64 {
        self.get(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Float parsing; unparseable values fall back to the default.
    pub fn float_or(&self, key: &str, default: f64) -> f64 {
        self.get(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }
}

/// Connection settings for the engine REST service itself.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Base URL of the engine, e.g. `http://localhost:8888`.
    pub base_url: String,
    /// Optional bearer token for the engine.
    pub api_key: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl EngineSettings {
    pub fn from_env(env: &Env) -> Self {
        Self {
            base_url: env.str_or("ENGINE_BASE_URL", "http://localhost:8888"),
            api_key: env.get("ENGINE_API_KEY").map(str::to_string),
            timeout_secs: env.int_or("ENGINE_TIMEOUT_SECS", 30).max(1) as u64,
        }
    }
}

/// Resolved default user scope (`DEFAULT_USER_ID` env override).
pub fn default_user_id(env: &Env) -> String {
    env.str_or("DEFAULT_USER_ID", DEFAULT_USER_ID)
}

fn set_if(section: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        section.insert(key.to_string(), json!(value));
    }
}

/// Build the `llm` section from `LLM_*` variables.
fn build_llm_section(env: &Env) -> Value {
    let provider = env.str_or("LLM_PROVIDER", "openai");
    let model = env.str_or("LLM_MODEL", "gpt-4o-mini");
    let api_key = env.get("LLM_API_KEY");
    let base_url = env.get("LLM_BASE_URL");

    let mut config = Map::new();
    config.insert("model".into(), json!(model));
    config.insert(
        "temperature".into(),
        json!(env.float_or("LLM_TEMPERATURE", 0.2)),
    );
    config.insert(
        "max_tokens".into(),
        json!(env.int_or("LLM_MAX_TOKENS", 2000)),
    );

    // The engine's provider key. OpenRouter is OpenAI-compatible and is
    // presented to the engine as "openai" with a different base url.
    let mut engine_provider = provider.clone();

    match provider.as_str() {
        "openai" => {
            set_if(&mut config, "api_key", api_key);
            set_if(&mut config, "openai_base_url", base_url);
        }
        "openrouter" => {
            engine_provider = "openai".into();
            set_if(&mut config, "api_key", api_key);
            config.insert(
                "openai_base_url".into(),
                json!(base_url.unwrap_or("https://openrouter.ai/api/v1")),
            );
        }
        "ollama" => {
            config.insert(
                "ollama_base_url".into(),
                json!(base_url.unwrap_or("http://localhost:11434")),
            );
        }
        "azure_openai" => {
            set_if(&mut config, "api_key", api_key);
            set_if(&mut config, "azure_endpoint", base_url);
            config.insert(
                "api_version".into(),
                json!(env.str_or("AZURE_API_VERSION", "2024-02-15-preview")),
            );
            set_if(&mut config, "azure_deployment", env.get("AZURE_DEPLOYMENT"));
        }
        "deepseek" => {
            set_if(&mut config, "api_key", api_key);
            set_if(&mut config, "base_url", base_url);
        }
        "together" | "groq" => {
            set_if(&mut config, "api_key", api_key);
        }
        _ => {
            // Generic OpenAI-compatible endpoint.
            set_if(&mut config, "api_key", api_key);
            set_if(&mut config, "openai_base_url", base_url);
        }
    }

    tracing::info!(provider = %engine_provider, model = %model, "configured LLM provider");
    json!({ "provider": engine_provider, "config": config })
}

/// Build the `embedder` section from `EMBEDDING_*` variables.
///
/// Provider, key, and base url fall back to their `LLM_*` counterparts so a
/// single-provider setup needs no duplicate variables.
fn build_embedder_section(env: &Env) -> Value {
    let provider = env
        .get("EMBEDDING_PROVIDER")
        .or_else(|| env.get("LLM_PROVIDER"))
        .unwrap_or("openai")
        .to_string();
    let model = env.str_or("EMBEDDING_MODEL", "text-embedding-3-small");
    let dims = env.int_or("EMBEDDING_DIMS", 1536);
    let api_key = env.get("EMBEDDING_API_KEY").or_else(|| env.get("LLM_API_KEY"));
    let base_url = env.get("EMBEDDING_BASE_URL").or_else(|| env.get("LLM_BASE_URL"));

    let mut config = Map::new();
    config.insert("model".into(), json!(model));
    config.insert("embedding_dims".into(), json!(dims));

    match provider.as_str() {
        "openai" => {
            set_if(&mut config, "api_key", api_key);
            set_if(&mut config, "openai_base_url", base_url);
        }
        "ollama" => {
            config.insert(
                "ollama_base_url".into(),
                json!(base_url.unwrap_or("http://localhost:11434")),
            );
        }
        "azure_openai" => {
            set_if(&mut config, "api_key", api_key);
            set_if(&mut config, "azure_endpoint", base_url);
            config.insert(
                "api_version".into(),
                json!(env.str_or("AZURE_API_VERSION", "2024-02-15-preview")),
            );
        }
        "huggingface" => {
            // Local model, keyless.
        }
        _ => {
            set_if(&mut config, "api_key", api_key);
            set_if(&mut config, "base_url", base_url);
        }
    }

    tracing::info!(provider = %provider, model = %model, dims, "configured embedder");
    json!({ "provider": provider, "config": config })
}

/// Build the `vector_store` section from `VECTOR_STORE_PROVIDER` and friends.
fn build_vector_store_section(env: &Env) -> Result<Value> {
    let provider = env.str_or("VECTOR_STORE_PROVIDER", "qdrant");
    let dims = env.int_or("EMBEDDING_DIMS", 1536);

    let section = match provider.as_str() {
        "qdrant" => {
            let mut config = Map::new();
            config.insert(
                "collection_name".into(),
                json!(env.str_or("QDRANT_COLLECTION", "recall_memories")),
            );
            // Embedded Qdrant wipes its path on startup unless on_disk is set.
            config.insert("on_disk".into(), json!(env.bool_or("QDRANT_ON_DISK", false)));
            config.insert("embedding_model_dims".into(), json!(dims));

            if let Some(path) = env.get("QDRANT_PATH") {
                config.insert("path".into(), json!(path));
                tracing::info!(path, "configured Qdrant with embedded storage");
            } else if let Some(host) = env.get("QDRANT_HOST") {
                config.insert("host".into(), json!(host));
                config.insert("port".into(), json!(env.int_or("QDRANT_PORT", 6333)));
                set_if(&mut config, "api_key", env.get("QDRANT_API_KEY"));
                tracing::info!(host, "configured Qdrant with remote server");
            } else {
                config.insert("path".into(), json!("./recall_data"));
                tracing::info!("configured Qdrant with default embedded storage: ./recall_data");
            }

            json!({ "provider": "qdrant", "config": config })
        }
        "pgvector" => {
            let database_url = env.get("DATABASE_URL").ok_or_else(|| {
                EngineError::config("DATABASE_URL is required for the pgvector provider")
            })?;
            tracing::info!("configured pgvector vector store");
            json!({
                "provider": "pgvector",
                "config": {
                    "connection_string": database_url,
                    "collection_name": env.str_or("PGVECTOR_COLLECTION", "recall_memories"),
                    "embedding_model_dims": dims,
                }
            })
        }
        "chroma" => {
            tracing::info!("configured Chroma vector store");
            json!({
                "provider": "chroma",
                "config": {
                    "collection_name": env.str_or("CHROMA_COLLECTION", "recall_memories"),
                    "path": env.str_or("CHROMA_PATH", "./chroma_data"),
                }
            })
        }
        other => {
            return Err(EngineError::config(format!(
                "unsupported vector store provider: {other}"
            )))
        }
    };

    Ok(section)
}

/// Build the optional `graph_store` section (`ENABLE_GRAPH_MEMORY`).
fn build_graph_store_section(env: &Env) -> Option<Value> {
    if !env.bool_or("ENABLE_GRAPH_MEMORY", false) {
        return None;
    }
    tracing::info!("graph memory enabled with Neo4j");
    Some(json!({
        "provider": "neo4j",
        "config": {
            "url": env.str_or("NEO4J_URL", "bolt://localhost:7687"),
            "username": env.str_or("NEO4J_USERNAME", "neo4j"),
            "password": env.str_or("NEO4J_PASSWORD", "password"),
        }
    }))
}

/// Resolve the fact-extraction prompt: file override first, then the
/// built-in template selected by `FACT_EXTRACTION_PROMPT`.
fn resolve_fact_extraction_prompt(env: &Env) -> Result<Option<String>> {
    if let Some(path) = env.get("FACT_EXTRACTION_PROMPT_FILE") {
        return prompts::fact_extraction_prompt_from_file(path).map(Some);
    }
    let kind = PromptKind::parse(&env.str_or("FACT_EXTRACTION_PROMPT", "default"));
    Ok(prompts::fact_extraction_prompt(kind))
}

/// Assemble the full configuration document for POST /configure.
pub fn build_engine_config(env: &Env) -> Result<Value> {
    let mut config = Map::new();
    config.insert("llm".into(), build_llm_section(env));
    config.insert("embedder".into(), build_embedder_section(env));
    config.insert("vector_store".into(), build_vector_store_section(env)?);

    if let Some(graph) = build_graph_store_section(env) {
        config.insert("graph_store".into(), graph);
    }

    if let Some(prompt) = resolve_fact_extraction_prompt(env)? {
        config.insert("custom_fact_extraction_prompt".into(), json!(prompt));
    }

    Ok(Value::Object(config))
}
