// src/error.rs
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// Fatal at startup only; the server must not come up without credentials.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Microsoft Graph error ({status}): {detail}")]
    Upstream { status: u16, detail: String },

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Tool not found")]
    ToolNotFound,

    #[error("Method not found")]
    MethodNotFound,

    #[error("Parse error")]
    ParseError,

    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),
}

impl GraphError {
    pub fn to_jsonrpc_error(&self) -> serde_json::Value {
        let (code, message) = match self {
            GraphError::ToolNotFound => (-32602, "Tool not found".to_string()),
            GraphError::InvalidParams(msg) => (-32602, msg.to_string()),
            GraphError::MethodNotFound => (-32601, "Method not found".to_string()),
            GraphError::ParseError => (-32700, "Parse error".to_string()),
            err => (-32603, err.to_string()),
        };

        json!({
            "code": code,
            "message": message,
        })
    }
}
