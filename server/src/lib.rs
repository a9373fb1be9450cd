//! Recall MCP Server Library
//!
//! This crate implements an MCP (Model Context Protocol) server exposing
//! long-term memory tools. All storage and retrieval intelligence lives in
//! the external memory engine behind `recall-engine`; this crate maps tool
//! calls onto it and shapes the responses.

pub mod config;
pub mod mcp;
pub mod service;

pub use config::{ServerConfig, Transport};
pub use mcp::McpServer;
pub use service::MemoryService;
