//! Recall Engine Client
//!
//! Client layer for the external memory engine: the engine owns fact
//! extraction (LLM), embedding generation, vector-store persistence, and
//! optional graph-store writes; this crate assembles its provider
//! configuration from the environment and marshals requests onto its REST
//! API.
//!
//! ## Example
//!
//! ```ignore
//! use recall_engine::{build_engine_config, Env, EngineClient, EngineSettings};
//!
//! let env = Env::from_process();
//! let client = EngineClient::new(&EngineSettings::from_env(&env))?;
//! client.configure(&build_engine_config(&env)?).await?;
//!
//! let result = client.search(&request).await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod prompts;
pub mod types;

// Re-exports for convenience
pub use client::EngineClient;
pub use config::{build_engine_config, default_user_id, Env, EngineSettings, DEFAULT_USER_ID};
pub use error::EngineError;
pub use prompts::PromptKind;
pub use types::{results_of, AddRequest, MemoryScope, Message, SearchRequest, UpdateRequest};
