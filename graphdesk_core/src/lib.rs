// src/lib.rs
pub mod client;
pub mod context;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod mcp_server;
pub mod registry;
pub mod schema;
pub mod token;
pub mod tools;
pub mod transport;

// Re-export the rmcp model types that users of the library need.
pub use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, InitializeRequestParam,
    InitializeResult, ListToolsResult, PaginatedRequestParam, ProtocolVersion, RawContent,
    ServerCapabilities, Tool,
};

pub use client::{build_clients, GraphClient, GraphClients, GRAPH_BETA_ENDPOINT, GRAPH_V1_ENDPOINT};
pub use context::AppContext;
pub use credentials::{
    is_placeholder_credential, CredentialKind, Credentials, MissingCredentialPolicy,
};
pub use error::GraphError;
pub use registry::{ToolDescriptor, ToolRegistry, AUTH_REQUIRED_NOTICE};
pub use token::{
    select_provider, ClientCredentialsProvider, DemoTokenProvider, TokenProvider, DEMO_TOKEN,
};
