//! MCP (Model Context Protocol) Server Module
//!
//! Implements the MCP server surface for the memory tools, allowing AI
//! clients like Claude Desktop, Cursor, and Cline to store and recall
//! long-term memories.
//!
//! ## Usage
//!
//! ```bash
//! recall-mcp                  # stdio transport
//! recall-mcp --http           # streamable HTTP on HOST:PORT
//! ```
//!
//! Over stdio the server speaks newline-delimited JSON-RPC 2.0; over HTTP
//! each POST to `/mcp` carries one request.

pub mod http;
pub mod protocol;
pub mod prompts;
pub mod server;
pub mod tools;
pub mod transport;

pub use protocol::*;
pub use server::McpServer;
