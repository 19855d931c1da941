use serde::{Deserialize, Serialize};

use crate::error::GraphError;

pub const DEFAULT_SCOPE: &str = "User.Read";

/// Placeholder identifiers substituted in demo-fallback mode. Each contains
/// the `demo` marker so the set classifies as [`CredentialKind::Demo`].
pub const DEMO_TENANT_ID: &str = "demo-tenant-id";
pub const DEMO_CLIENT_ID: &str = "demo-client-id";
pub const DEMO_CLIENT_SECRET: &str = "demo-client-secret";

const DEMO_MARKER: &str = "demo";

/// OAuth2 client-credentials identifiers for one tenant/app registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    Real,
    Demo,
}

/// What to do when `TENANT_ID`, `CLIENT_ID` or `CLIENT_SECRET` is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingCredentialPolicy {
    /// Fail startup. The process must exit 1 rather than degrade silently.
    #[default]
    Strict,
    /// Substitute the `demo-*` placeholders and run without directory access.
    DemoFallback,
}

pub fn demo_fallback_enabled() -> bool {
    std::env::var("GRAPHDESK_DEMO_FALLBACK").ok().as_deref() == Some("1")
}

/// Classify a credential set. A set is demo if any identifier contains the
/// case-sensitive substring `demo`, regardless of how it was obtained. This
/// is the single discriminator for token-provider selection.
pub fn is_placeholder_credential(credentials: &Credentials) -> CredentialKind {
    let placeholder = [
        &credentials.tenant_id,
        &credentials.client_id,
        &credentials.client_secret,
    ]
    .iter()
    .any(|field| field.contains(DEMO_MARKER));

    if placeholder {
        CredentialKind::Demo
    } else {
        CredentialKind::Real
    }
}

/// Resolve credentials from the process environment.
pub fn resolve(policy: MissingCredentialPolicy) -> Result<Credentials, GraphError> {
    resolve_from(|name| std::env::var(name).ok(), policy)
}

/// Resolve credentials through an arbitrary lookup, for callers that hold
/// configuration elsewhere (and for tests).
pub fn resolve_from<F>(lookup: F, policy: MissingCredentialPolicy) -> Result<Credentials, GraphError>
where
    F: Fn(&str) -> Option<String>,
{
    let tenant_id = identifier(&lookup, "TENANT_ID", DEMO_TENANT_ID, policy)?;
    let client_id = identifier(&lookup, "CLIENT_ID", DEMO_CLIENT_ID, policy)?;
    let client_secret = identifier(&lookup, "CLIENT_SECRET", DEMO_CLIENT_SECRET, policy)?;

    let scopes = lookup("SCOPES")
        .map(|raw| parse_scopes(&raw))
        .filter(|scopes| !scopes.is_empty())
        .unwrap_or_else(|| vec![DEFAULT_SCOPE.to_string()]);

    Ok(Credentials {
        tenant_id,
        client_id,
        client_secret,
        scopes,
    })
}

fn identifier<F>(
    lookup: &F,
    name: &str,
    placeholder: &str,
    policy: MissingCredentialPolicy,
) -> Result<String, GraphError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name).filter(|value| !value.trim().is_empty()) {
        Some(value) => Ok(value),
        None => match policy {
            MissingCredentialPolicy::Strict => Err(GraphError::Configuration(format!(
                "{name} is not set; set it or enable GRAPHDESK_DEMO_FALLBACK=1 for a credential-free demo run"
            ))),
            MissingCredentialPolicy::DemoFallback => Ok(placeholder.to_string()),
        },
    }
}

/// `SCOPES` is comma-separated; blank entries are dropped.
pub fn parse_scopes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|scope| scope.trim())
        .filter(|scope| !scope.is_empty())
        .map(|scope| scope.to_string())
        .collect()
}
