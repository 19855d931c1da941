use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::client;
use crate::credentials::{is_placeholder_credential, CredentialKind, Credentials};
use crate::error::GraphError;

/// The sentinel token handed out when no real directory access is configured.
pub const DEMO_TOKEN: &str = "demo-token";

pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";

/// Produces a bearer token on demand. Selected once at client-factory time,
/// never switched at runtime.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn get_access_token(&self) -> Result<String, GraphError>;
}

/// Performs a live OAuth2 client-credentials exchange on every call.
/// No internal caching and no retries; retry policy belongs to the caller.
pub struct ClientCredentialsProvider {
    credentials: Credentials,
    authority: String,
}

impl ClientCredentialsProvider {
    pub fn new(credentials: Credentials) -> Self {
        Self::with_authority(credentials, DEFAULT_AUTHORITY)
    }

    /// Point the provider at an alternate identity host (tests).
    pub fn with_authority(credentials: Credentials, authority: impl Into<String>) -> Self {
        Self {
            credentials,
            authority: authority.into(),
        }
    }

    fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority.trim_end_matches('/'),
            self.credentials.tenant_id
        )
    }
}

#[async_trait]
impl TokenProvider for ClientCredentialsProvider {
    async fn get_access_token(&self) -> Result<String, GraphError> {
        let body = [
            ("grant_type", "client_credentials".to_string()),
            ("client_id", self.credentials.client_id.clone()),
            ("client_secret", self.credentials.client_secret.clone()),
            ("scope", self.credentials.scopes.join(" ")),
        ];
        let resp = client::http()
            .post(self.token_url())
            .form(&body)
            .send()
            .await
            .map_err(GraphError::HttpRequest)?;
        let status = resp.status();
        let v = resp
            .json::<Value>()
            .await
            .map_err(|e| GraphError::Auth(format!("token response was not JSON: {e}")))?;
        if !status.is_success() {
            return Err(GraphError::Auth(format!(
                "token exchange failed ({}): {}",
                status.as_u16(),
                exchange_detail(&v)
            )));
        }
        v.get("access_token")
            .and_then(|t| t.as_str())
            .map(|t| t.to_string())
            .ok_or_else(|| GraphError::Auth("no access_token in token response".to_string()))
    }
}

/// Returns [`DEMO_TOKEN`] unconditionally so the server can start up and
/// exercise registration and the transport handshake without credentials.
pub struct DemoTokenProvider;

#[async_trait]
impl TokenProvider for DemoTokenProvider {
    async fn get_access_token(&self) -> Result<String, GraphError> {
        Ok(DEMO_TOKEN.to_string())
    }
}

/// Construct-time selection per the credential classification.
pub fn select_provider(credentials: &Credentials) -> Arc<dyn TokenProvider> {
    match is_placeholder_credential(credentials) {
        CredentialKind::Demo => Arc::new(DemoTokenProvider),
        CredentialKind::Real => Arc::new(ClientCredentialsProvider::new(credentials.clone())),
    }
}

fn exchange_detail(v: &Value) -> String {
    v.get("error_description")
        .or_else(|| v.get("error"))
        .and_then(|d| d.as_str())
        .map(|d| d.to_string())
        .unwrap_or_else(|| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::DEFAULT_SCOPE;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_credentials() -> Credentials {
        Credentials {
            tenant_id: "t".to_string(),
            client_id: "c".to_string(),
            client_secret: "bad".to_string(),
            scopes: vec![DEFAULT_SCOPE.to_string()],
        }
    }

    #[tokio::test]
    async fn demo_provider_returns_sentinel_token() {
        let token = DemoTokenProvider.get_access_token().await.unwrap();
        assert_eq!(token, DEMO_TOKEN);
    }

    #[tokio::test]
    async fn exchange_posts_grant_and_returns_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/t/oauth2/v2.0/token"))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("scope=User.Read"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token_type": "Bearer",
                "expires_in": 3599,
                "access_token": "live-token"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = ClientCredentialsProvider::with_authority(test_credentials(), server.uri());
        let token = provider.get_access_token().await.unwrap();
        assert_eq!(token, "live-token");
    }

    #[tokio::test]
    async fn failed_exchange_surfaces_auth_error_with_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/t/oauth2/v2.0/token"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": "invalid_client",
                "error_description": "AADSTS7000215: Invalid client secret provided."
            })))
            .mount(&server)
            .await;

        let provider = ClientCredentialsProvider::with_authority(test_credentials(), server.uri());
        let err = provider.get_access_token().await.unwrap_err();
        assert!(matches!(err, GraphError::Auth(_)));
        let text = err.to_string();
        assert!(text.contains("401"));
        assert!(text.contains("AADSTS7000215"));
    }

    #[tokio::test]
    async fn missing_access_token_field_is_an_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/t/oauth2/v2.0/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token_type": "Bearer"})))
            .mount(&server)
            .await;

        let provider = ClientCredentialsProvider::with_authority(test_credentials(), server.uri());
        let err = provider.get_access_token().await.unwrap_err();
        assert!(err.to_string().contains("no access_token"));
    }
}
