//! Server configuration from environment variables.
//!
//! Provider selection for the engine lives in `recall_engine::config`; this
//! module only covers how the MCP server itself listens. CLI flags layered
//! in `main` win over the environment.

use recall_engine::Env;

/// Which transport the server speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Newline-delimited JSON-RPC over stdin/stdout.
    Stdio,
    /// Streamable HTTP: one JSON-RPC request per POST /mcp.
    Http,
}

impl Transport {
    /// Parse the `TRANSPORT` setting. Unknown values fall back to stdio.
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "http" | "streamable-http" => Self::Http,
            "stdio" => Self::Stdio,
            other => {
                tracing::warn!(transport = other, "unknown transport, using stdio");
                Self::Stdio
            }
        }
    }
}

/// Resolved server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub transport: Transport,
}

impl ServerConfig {
    pub fn from_env(env: &Env) -> Self {
        Self {
            host: env.str_or("HOST", "0.0.0.0"),
            port: env.int_or("PORT", 8050).clamp(1, u16::MAX as i64) as u16,
            transport: Transport::parse(&env.str_or("TRANSPORT", "stdio")),
        }
    }
}
