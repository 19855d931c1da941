use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, info};

use crate::context::AppContext;
use crate::error::GraphError;
use crate::registry::ToolRegistry;
use rmcp::model::*;

/// MCP server over the tool registry and the shared application context.
pub struct McpServer {
    registry: Arc<ToolRegistry>,
    ctx: Arc<AppContext>,
}

impl McpServer {
    pub fn new(registry: ToolRegistry, ctx: Arc<AppContext>) -> Self {
        Self {
            registry: Arc::new(registry),
            ctx,
        }
    }

    pub async fn handle_initialize(
        &self,
        _request: InitializeRequestParam,
    ) -> Result<InitializeResult, GraphError> {
        info!("MCP server initializing");

        Ok(InitializeResult {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities {
                tools: Some(Default::default()),
                ..Default::default()
            },
            server_info: Implementation {
                name: "graphdesk".to_string(),
                title: None,
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Microsoft Graph tools for the configured tenant: Outlook mail and calendar, \
                 directory search, presence, and Teams data."
                    .to_string(),
            ),
        })
    }

    pub async fn handle_list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
    ) -> Result<ListToolsResult, GraphError> {
        Ok(self.registry.list_tools())
    }

    pub async fn handle_call_tool(
        &self,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult, GraphError> {
        self.registry.invoke(Arc::clone(&self.ctx), request).await
    }
}

/// JSON-RPC message handler for the MCP server.
#[derive(Clone)]
pub struct JsonRpcHandler {
    server: Arc<McpServer>,
}

impl JsonRpcHandler {
    pub fn new(server: McpServer) -> Self {
        Self {
            server: Arc::new(server),
        }
    }

    /// Process a JSON-RPC request. Returns `None` for notifications, which
    /// must not be answered.
    pub async fn handle_request(&self, request: Value) -> Option<Value> {
        debug!("Handling JSON-RPC request: {:?}", request);

        let id = request.get("id").cloned();
        let method = request.get("method").and_then(|m| m.as_str()).unwrap_or("");
        let params = request.get("params").cloned().unwrap_or(json!({}));

        if id.is_none() || method.starts_with("notifications/") {
            debug!("Ignoring notification: {}", method);
            return None;
        }

        let result = match method {
            "initialize" => match serde_json::from_value::<InitializeRequestParam>(params) {
                Ok(req) => self
                    .server
                    .handle_initialize(req)
                    .await
                    .and_then(|r| serde_json::to_value(r).map_err(GraphError::SerdeJson))
                    .map_err(|e| e.to_jsonrpc_error()),
                Err(e) => Err(GraphError::SerdeJson(e).to_jsonrpc_error()),
            },
            "ping" => Ok(json!({})),
            "tools/list" => match serde_json::from_value::<Option<PaginatedRequestParam>>(params) {
                Ok(req) => self
                    .server
                    .handle_list_tools(req)
                    .await
                    .and_then(|r| serde_json::to_value(r).map_err(GraphError::SerdeJson))
                    .map_err(|e| e.to_jsonrpc_error()),
                Err(e) => Err(GraphError::SerdeJson(e).to_jsonrpc_error()),
            },
            "tools/call" => match serde_json::from_value::<CallToolRequestParam>(params) {
                Ok(req) => self
                    .server
                    .handle_call_tool(req)
                    .await
                    .and_then(|r| serde_json::to_value(r).map_err(GraphError::SerdeJson))
                    .map_err(|e| e.to_jsonrpc_error()),
                Err(e) => Err(GraphError::SerdeJson(e).to_jsonrpc_error()),
            },
            _ => Err(GraphError::MethodNotFound.to_jsonrpc_error()),
        };

        Some(match result {
            Ok(result) => json!({
                "jsonrpc": "2.0",
                "result": result,
                "id": id,
            }),
            Err(error) => json!({
                "jsonrpc": "2.0",
                "error": error,
                "id": id,
            }),
        })
    }
}
