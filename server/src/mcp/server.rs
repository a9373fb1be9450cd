//! MCP Server Implementation
//!
//! Handles MCP protocol requests and routes tool calls to the memory
//! service. Handlers take `&self` because the HTTP transport serves
//! concurrent requests against the same server instance.

use super::protocol::*;
use super::prompts::{get_all_prompts, get_prompt};
use super::tools::get_all_tools;
use super::transport::StdioTransport;
use crate::service::MemoryService;
use recall_engine::{MemoryScope, Message};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "recall";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// MCP Server - handles protocol messages
pub struct McpServer {
    service: Arc<MemoryService>,
    initialized: AtomicBool,
}

impl McpServer {
    pub fn new(service: Arc<MemoryService>) -> Self {
        Self {
            service,
            initialized: AtomicBool::new(false),
        }
    }

    /// Run the MCP server event loop over stdio
    pub async fn run_stdio(&self) -> std::io::Result<()> {
        let mut transport = StdioTransport::new();

        tracing::info!("MCP server starting on stdio");

        loop {
            match transport.read_request().await {
                Ok(Some(request)) => {
                    let response = self.handle_request(request).await;
                    transport.write_response(&response).await?;
                }
                Ok(None) => {
                    // EOF or empty line - continue
                    continue;
                }
                Err(e) => {
                    if e.kind() == std::io::ErrorKind::UnexpectedEof {
                        tracing::info!("Client disconnected");
                        break;
                    }
                    let response = JsonRpcResponse::error(
                        None,
                        JsonRpcError::parse_error(format!("Parse error: {}", e)),
                    );
                    transport.write_response(&response).await?;
                }
            }
        }

        Ok(())
    }

    /// Handle a JSON-RPC request
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        tracing::debug!("Handling request: {}", request.method);

        match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id, request.params),
            "initialized" => {
                // Notification, no response needed but we return success
                JsonRpcResponse::success(request.id, Value::Null)
            }
            "ping" => {
                JsonRpcResponse::success(request.id, serde_json::to_value(PingResult {}).unwrap())
            }
            "tools/list" => self.handle_tools_list(request.id),
            "tools/call" => self.handle_tools_call(request.id, request.params).await,
            "prompts/list" => self.handle_prompts_list(request.id),
            "prompts/get" => self.handle_prompts_get(request.id, request.params),
            "notifications/cancelled" => {
                // Notification, no response needed
                JsonRpcResponse::success(request.id, Value::Null)
            }
            _ => {
                JsonRpcResponse::error(request.id, JsonRpcError::method_not_found(&request.method))
            }
        }
    }

    fn handle_initialize(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: InitializeParams = params
            .map(|p| serde_json::from_value(p).unwrap_or_default())
            .unwrap_or_default();

        if let Some(client) = &params.client_info {
            tracing::info!(client = %client.name, "client connected");
        }

        self.initialized.store(true, Ordering::SeqCst);

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                logging: Some(LoggingCapability {}),
                prompts: Some(PromptsCapability {
                    list_changed: Some(false),
                }),
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: Some(SERVER_VERSION.to_string()),
            },
        };

        JsonRpcResponse::success(id, serde_json::to_value(result).unwrap())
    }

    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = ToolsListResult {
            tools: get_all_tools(),
        };
        JsonRpcResponse::success(id, serde_json::to_value(result).unwrap())
    }

    async fn handle_tools_call(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: ToolCallParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(p) => p,
                Err(e) => {
                    return JsonRpcResponse::error(
                        id,
                        JsonRpcError::invalid_params(format!("Invalid params: {}", e)),
                    );
                }
            },
            None => {
                return JsonRpcResponse::error(id, JsonRpcError::invalid_params("Missing params"));
            }
        };

        match self.execute_tool(&params.name, params.arguments).await {
            Ok(result) => {
                let tool_result = ToolCallResult {
                    content: vec![ToolResultContent::Text {
                        text: serde_json::to_string_pretty(&result)
                            .unwrap_or_else(|_| result.to_string()),
                    }],
                    is_error: None,
                };
                JsonRpcResponse::success(id, serde_json::to_value(tool_result).unwrap())
            }
            Err(e) => {
                let tool_result = ToolCallResult {
                    content: vec![ToolResultContent::Text {
                        text: format!("Error: {}", e),
                    }],
                    is_error: Some(true),
                };
                JsonRpcResponse::success(id, serde_json::to_value(tool_result).unwrap())
            }
        }
    }

    fn handle_prompts_list(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = PromptsListResult {
            prompts: get_all_prompts(),
        };
        JsonRpcResponse::success(id, serde_json::to_value(result).unwrap())
    }

    fn handle_prompts_get(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: PromptGetParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(p) => p,
                Err(e) => {
                    return JsonRpcResponse::error(
                        id,
                        JsonRpcError::invalid_params(format!("Invalid params: {}", e)),
                    );
                }
            },
            None => {
                return JsonRpcResponse::error(id, JsonRpcError::invalid_params("Missing params"));
            }
        };

        match get_prompt(&params.name) {
            Some(result) => JsonRpcResponse::success(id, serde_json::to_value(result).unwrap()),
            None => JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_params(format!("Prompt not found: {}", params.name)),
            ),
        }
    }

    /// Execute a tool by name - delegates to the memory service
    async fn execute_tool(&self, name: &str, args: Option<Value>) -> Result<Value, String> {
        let args = args.unwrap_or(Value::Object(serde_json::Map::new()));

        match name {
            "add_memory" => {
                let text = required_str(&args, "text")?;
                let messages = parse_messages(&args)?;
                let metadata = args.get("metadata").cloned();

                self.service
                    .add(text, messages, scope_of(&args), metadata)
                    .await
                    .map_err(|e| e.to_string())
            }

            "search_memories" => {
                let query = required_str(&args, "query")?;
                let filters = args.get("filters").cloned();
                let limit = args
                    .get("limit")
                    .and_then(Value::as_u64)
                    .map(|v| v as usize)
                    .unwrap_or(100);

                self.service
                    .search(query, scope_of(&args), filters, limit)
                    .await
                    .map_err(|e| e.to_string())
            }

            "get_memories" => self
                .service
                .list(scope_of(&args))
                .await
                .map_err(|e| e.to_string()),

            "get_memory" => {
                let memory_id = required_str(&args, "memory_id")?;
                self.service
                    .get(&memory_id)
                    .await
                    .map_err(|e| e.to_string())
            }

            "update_memory" => {
                let memory_id = required_str(&args, "memory_id")?;
                let text = required_str(&args, "text")?;
                self.service
                    .update(&memory_id, &text)
                    .await
                    .map_err(|e| e.to_string())
            }

            "delete_memory" => {
                let memory_id = required_str(&args, "memory_id")?;
                self.service
                    .delete(&memory_id)
                    .await
                    .map_err(|e| e.to_string())
            }

            "delete_all_memories" => self
                .service
                .delete_all(scope_of(&args))
                .await
                .map_err(|e| e.to_string()),

            "get_memory_history" => {
                let memory_id = required_str(&args, "memory_id")?;
                self.service
                    .history(&memory_id)
                    .await
                    .map_err(|e| e.to_string())
            }

            "reset_memories" => {
                let confirm = args
                    .get("confirm")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                self.service.reset(confirm).await.map_err(|e| e.to_string())
            }

            _ => Err(format!("Unknown tool: {}", name)),
        }
    }
}

/// Extract a required string argument
fn required_str(args: &Value, key: &str) -> Result<String, String> {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| format!("Missing '{}' parameter", key))
}

/// Extract an optional string argument
fn optional_str(args: &Value, key: &str) -> Option<String> {
    args.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Build the scope filters from tool arguments
fn scope_of(args: &Value) -> MemoryScope {
    MemoryScope {
        user_id: optional_str(args, "user_id"),
        agent_id: optional_str(args, "agent_id"),
        run_id: optional_str(args, "run_id"),
    }
}

/// Decode the structured conversation argument when present
fn parse_messages(args: &Value) -> Result<Option<Vec<Message>>, String> {
    match args.get("messages") {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| format!("Invalid 'messages' parameter: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recall_engine::Env;
    use serde_json::json;

    fn test_server() -> McpServer {
        // Engine is never reached by the protocol-level tests below.
        let service = Arc::new(MemoryService::new(Env::from_pairs([(
            "ENGINE_BASE_URL",
            "http://127.0.0.1:1",
        )])));
        McpServer::new(service)
    }

    fn request(method: &str, params: Option<Value>) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(json!(1)),
            method: method.to_string(),
            params,
        }
    }

    #[tokio::test]
    async fn test_initialize_handshake() {
        let server = test_server();
        let response = server
            .handle_request(request(
                "initialize",
                Some(json!({"clientInfo": {"name": "test-client"}})),
            ))
            .await;

        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], "2024-11-05");
        assert_eq!(result["serverInfo"]["name"], "recall");
        assert!(result["capabilities"]["tools"].is_object());
        assert!(result["capabilities"]["prompts"].is_object());
        assert!(server.initialized.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_tools_list() {
        let server = test_server();
        let response = server.handle_request(request("tools/list", None)).await;
        let result = response.result.unwrap();
        assert_eq!(result["tools"].as_array().unwrap().len(), 9);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let server = test_server();
        let response = server.handle_request(request("bogus/method", None)).await;
        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn test_tools_call_missing_params() {
        let server = test_server();
        let response = server.handle_request(request("tools/call", None)).await;
        assert_eq!(response.error.unwrap().code, -32602);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_tool_error() {
        let server = test_server();
        let response = server
            .handle_request(request(
                "tools/call",
                Some(json!({"name": "bogus_tool", "arguments": {}})),
            ))
            .await;

        // Tool failures are content with is_error, not JSON-RPC errors.
        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        assert!(result["content"][0]["text"]
            .as_str()
            .unwrap()
            .contains("Unknown tool"));
    }

    #[tokio::test]
    async fn test_missing_required_argument() {
        let server = test_server();
        let response = server
            .handle_request(request(
                "tools/call",
                Some(json!({"name": "get_memory", "arguments": {}})),
            ))
            .await;

        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        assert!(result["content"][0]["text"]
            .as_str()
            .unwrap()
            .contains("memory_id"));
    }

    #[tokio::test]
    async fn test_reset_without_confirm_never_reaches_engine() {
        let server = test_server();
        let response = server
            .handle_request(request(
                "tools/call",
                Some(json!({"name": "reset_memories", "arguments": {}})),
            ))
            .await;

        let result = response.result.unwrap();
        assert!(result.get("isError").is_none());
        assert!(result["content"][0]["text"]
            .as_str()
            .unwrap()
            .contains("confirmation_required"));
    }

    #[tokio::test]
    async fn test_prompts_list_and_get() {
        let server = test_server();
        let response = server.handle_request(request("prompts/list", None)).await;
        let result = response.result.unwrap();
        assert_eq!(result["prompts"][0]["name"], "memory_assistant");

        let response = server
            .handle_request(request(
                "prompts/get",
                Some(json!({"name": "memory_assistant"})),
            ))
            .await;
        let result = response.result.unwrap();
        assert!(result["messages"][0]["content"]["text"]
            .as_str()
            .unwrap()
            .contains("search_memories"));

        let response = server
            .handle_request(request("prompts/get", Some(json!({"name": "missing"}))))
            .await;
        assert_eq!(response.error.unwrap().code, -32602);
    }

    #[test]
    fn test_parse_messages_rejects_bad_shape() {
        let args = json!({"messages": [{"role": "user"}]});
        assert!(parse_messages(&args).is_err());

        let args = json!({"messages": [{"role": "user", "content": "hi"}]});
        let messages = parse_messages(&args).unwrap().unwrap();
        assert_eq!(messages[0].content, "hi");
    }

    #[test]
    fn test_scope_of_ignores_non_strings() {
        let args = json!({"user_id": "alice", "agent_id": 42});
        let scope = scope_of(&args);
        assert_eq!(scope.user_id.as_deref(), Some("alice"));
        assert!(scope.agent_id.is_none());
    }
}
