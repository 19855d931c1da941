use crate::client::{build_clients, GraphClient, GraphClients};
use crate::credentials::{is_placeholder_credential, CredentialKind, Credentials};
use crate::logging::LogSink;

/// Process-wide state, constructed once at startup and read-only afterward.
/// Handlers receive this instead of reaching for ambient globals.
pub struct AppContext {
    pub clients: GraphClients,
    pub kind: CredentialKind,
    pub log: LogSink,
}

impl AppContext {
    pub fn new(credentials: &Credentials) -> Self {
        Self {
            clients: build_clients(credentials),
            kind: is_placeholder_credential(credentials),
            log: LogSink::from_env(),
        }
    }

    /// Assemble a context from pre-built parts (tests point the clients at a
    /// mock server).
    pub fn from_parts(clients: GraphClients, kind: CredentialKind, log: LogSink) -> Self {
        Self { clients, kind, log }
    }

    pub fn v1(&self) -> &GraphClient {
        &self.clients.v1
    }

    pub fn beta(&self) -> &GraphClient {
        &self.clients.beta
    }
}
