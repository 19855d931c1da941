use std::sync::Arc;

use once_cell::sync::Lazy;
use reqwest::Method;
use serde_json::Value;
use url::Url;

use crate::credentials::Credentials;
use crate::error::GraphError;
use crate::token::{select_provider, TokenProvider};

pub const GRAPH_V1_ENDPOINT: &str = "https://graph.microsoft.com/v1.0";
pub const GRAPH_BETA_ENDPOINT: &str = "https://graph.microsoft.com/beta";

// One connection pool for the process. No request timeout at this layer;
// callers needing a deadline wrap the invocation.
static HTTP: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

pub(crate) fn http() -> &'static reqwest::Client {
    &HTTP
}

/// Thin request builder bound to one Graph base URL and a shared token
/// provider. Stateless beyond that binding; constructed once at startup.
#[derive(Clone)]
pub struct GraphClient {
    base_url: String,
    token_provider: Arc<dyn TokenProvider>,
}

impl GraphClient {
    pub fn new(base_url: impl Into<String>, token_provider: Arc<dyn TokenProvider>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token_provider,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token_provider(&self) -> &Arc<dyn TokenProvider> {
        &self.token_provider
    }

    /// GET `{base}{path}` with optional OData query parameters.
    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, GraphError> {
        self.request(Method::GET, path, query, None).await
    }

    /// POST a JSON body to `{base}{path}`.
    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, GraphError> {
        self.request(Method::POST, path, &[], Some(body)).await
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value, GraphError> {
        // A fresh token per call; failure to obtain one is this call's error.
        let token = self.token_provider.get_access_token().await?;

        let url = Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| GraphError::InvalidParams(format!("bad request path {path}: {e}")))?;

        let mut request = http().request(method, url).bearer_auth(token);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let resp = request.send().await.map_err(GraphError::HttpRequest)?;
        let status = resp.status();
        let text = resp.text().await.map_err(GraphError::HttpRequest)?;

        if !status.is_success() {
            return Err(GraphError::Upstream {
                status: status.as_u16(),
                detail: upstream_detail(&text),
            });
        }

        if text.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|_| GraphError::Upstream {
            status: status.as_u16(),
            detail: "response body was not JSON".to_string(),
        })
    }
}

pub struct GraphClients {
    pub v1: GraphClient,
    pub beta: GraphClient,
}

/// Build the standard and beta clients around a single provider chosen once
/// from the credential classification.
pub fn build_clients(credentials: &Credentials) -> GraphClients {
    let provider = select_provider(credentials);
    GraphClients {
        v1: GraphClient::new(GRAPH_V1_ENDPOINT, Arc::clone(&provider)),
        beta: GraphClient::new(GRAPH_BETA_ENDPOINT, provider),
    }
}

/// Graph failures arrive as `{"error": {"code", "message"}}`; fall back to
/// the raw body, truncated, when they don't.
fn upstream_detail(body: &str) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(body) {
        if let Some(message) = v
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return message.to_string();
        }
    }
    let trimmed = body.trim();
    if trimmed.chars().count() > 300 {
        let cut: String = trimmed.chars().take(300).collect();
        format!("{cut}…")
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::DEFAULT_SCOPE;
    use crate::token::{DemoTokenProvider, DEMO_TOKEN};
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn attaches_bearer_token_from_provider() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1.0/me"))
            .and(header("authorization", format!("Bearer {DEMO_TOKEN}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"displayName": "Ada"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = GraphClient::new(
            format!("{}/v1.0", server.uri()),
            Arc::new(DemoTokenProvider),
        );
        let v = client.get("/me", &[]).await.unwrap();
        assert_eq!(v["displayName"], "Ada");
    }

    #[tokio::test]
    async fn query_parameters_are_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1.0/me/messages"))
            .and(query_param("$top", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client = GraphClient::new(
            format!("{}/v1.0", server.uri()),
            Arc::new(DemoTokenProvider),
        );
        client
            .get("/me/messages", &[("$top", "10".to_string())])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn non_2xx_surfaces_upstream_error_with_graph_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1.0/me"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {"code": "Authorization_RequestDenied", "message": "Insufficient privileges"}
            })))
            .mount(&server)
            .await;

        let client = GraphClient::new(
            format!("{}/v1.0", server.uri()),
            Arc::new(DemoTokenProvider),
        );
        let err = client.get("/me", &[]).await.unwrap_err();
        match err {
            GraphError::Upstream { status, detail } => {
                assert_eq!(status, 403);
                assert_eq!(detail, "Insufficient privileges");
            }
            other => panic!("expected Upstream, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_body_maps_to_null() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1.0/me/sendMail"))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;

        let client = GraphClient::new(
            format!("{}/v1.0", server.uri()),
            Arc::new(DemoTokenProvider),
        );
        let v = client.post("/me/sendMail", &json!({})).await.unwrap();
        assert!(v.is_null());
    }

    #[test]
    fn factory_binds_both_base_urls_to_one_provider() {
        let credentials = Credentials {
            tenant_id: "contoso".to_string(),
            client_id: "app".to_string(),
            client_secret: "secret".to_string(),
            scopes: vec![DEFAULT_SCOPE.to_string()],
        };
        let clients = build_clients(&credentials);
        assert_eq!(clients.v1.base_url(), GRAPH_V1_ENDPOINT);
        assert_eq!(clients.beta.base_url(), GRAPH_BETA_ENDPOINT);
        assert!(Arc::ptr_eq(
            clients.v1.token_provider(),
            clients.beta.token_provider()
        ));
    }
}
