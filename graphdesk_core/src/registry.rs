use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use rmcp::model::{CallToolRequestParam, CallToolResult, Content, ListToolsResult, Tool};
use serde_json::{Map, Value};
use tracing::debug;

use crate::context::AppContext;
use crate::credentials::CredentialKind;
use crate::error::GraphError;
use crate::schema;

/// Returned by every Graph-backed tool when the server runs on demo
/// credentials, instead of attempting a doomed remote call.
pub const AUTH_REQUIRED_NOTICE: &str = "Authentication required: the server is running with demo \
credentials, so Microsoft Graph cannot be reached. Set TENANT_ID, CLIENT_ID and CLIENT_SECRET \
and restart to enable live data.";

pub type ToolHandler =
    fn(Arc<AppContext>, Map<String, Value>) -> BoxFuture<'static, Result<String, GraphError>>;

/// One registered tool: the MCP descriptor plus dispatch metadata.
pub struct ToolDescriptor {
    pub tool: Tool,
    /// Completes "Failed to {label}: {error}" in the uniform error text.
    pub error_label: &'static str,
    /// Tools that reach Microsoft Graph short-circuit under demo credentials.
    pub requires_graph: bool,
    pub handler: ToolHandler,
}

/// Registered once at startup, never mutated afterward.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: ToolDescriptor) {
        let name = descriptor.tool.name.to_string();
        debug_assert!(!self.index.contains_key(&name), "duplicate tool {name}");
        self.index.insert(name, self.tools.len());
        self.tools.push(descriptor);
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.index.get(name).map(|i| &self.tools[*i])
    }

    pub fn list_tools(&self) -> ListToolsResult {
        ListToolsResult {
            tools: self.tools.iter().map(|d| d.tool.clone()).collect(),
            next_cursor: None,
        }
    }

    /// Dispatch one invocation.
    ///
    /// Unknown names and schema violations are dispatch-level errors and
    /// propagate to the transport. Any failure past validation is rendered
    /// as text inside a normal response, so a failing tool never terminates
    /// the session.
    pub async fn invoke(
        &self,
        ctx: Arc<AppContext>,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult, GraphError> {
        let descriptor = self
            .get(request.name.as_ref())
            .ok_or(GraphError::ToolNotFound)?;

        let args = schema::validate_arguments(descriptor.tool.input_schema.as_ref(), request.arguments)?;

        if descriptor.requires_graph && ctx.kind == CredentialKind::Demo {
            debug!("{}: demo credentials, skipping Graph call", descriptor.tool.name);
            ctx.log.append(
                "info",
                &format!("{}: demo credentials, Graph call skipped", descriptor.tool.name),
            );
            return Ok(text_result(AUTH_REQUIRED_NOTICE.to_string(), false));
        }

        match (descriptor.handler)(Arc::clone(&ctx), args).await {
            Ok(text) => Ok(text_result(text, false)),
            Err(err) => {
                ctx.log
                    .append("error", &format!("{}: {}", descriptor.tool.name, err));
                Ok(text_result(
                    format!("Failed to {}: {}", descriptor.error_label, err),
                    true,
                ))
            }
        }
    }
}

fn text_result(text: String, is_error: bool) -> CallToolResult {
    CallToolResult {
        content: vec![Content::text(text)],
        structured_content: None,
        is_error: Some(is_error),
        meta: None,
    }
}
