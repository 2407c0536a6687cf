use crate::config::ClientConfig;
use crate::error::ClientError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Header naming the API revision in use.
const API_VERSION_HEADER: &str = "x-github-api-version";

/// One templated REST call: verb, path relative to the base URL, and an
/// optional JSON body.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// A completed call. 3xx responses land here too: redirects are never
/// followed, and callers read the `location` header themselves.
#[derive(Debug)]
pub struct ApiResponse {
    pub status: u16,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Deserialize the body into a typed value.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        serde_json::from_slice(&self.body).map_err(ClientError::from)
    }

    /// Read a header value, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// A failed call, narrowed to the fields every caller needs. The error body
/// is parsed leniently at this boundary so nothing downstream has to guess
/// at its shape.
#[derive(Debug)]
pub struct ApiFailure {
    pub status: u16,
    pub url: String,
    /// Server-supplied failure description.
    pub message: String,
    pub documentation_url: Option<String>,
}

#[derive(Debug, Error)]
pub enum TransportError {
    /// The server answered with a 4xx/5xx status.
    #[error("request to {} failed with status {}", .0.url, .0.status)]
    Status(ApiFailure),

    /// The request never produced a response.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl TransportError {
    /// Status code of the failure, when one exists.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status(failure) => Some(failure.status),
            TransportError::Http(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

/// The seam between sub-clients and the wire. Test doubles implement this
/// to replace the transport without replacing business logic.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// Authenticated reqwest-backed transport.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    token: String,
    api_version: String,
}

impl HttpTransport {
    /// Build a transport from a validated configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(30))
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .tcp_keepalive(Duration::from_secs(60))
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::none())
            .gzip(true)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            token: config.token.clone(),
            api_version: config.api_version.clone(),
        })
    }
}

/// Lenient view of the upstream error body.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    documentation_url: Option<String>,
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);
        debug!(method = %request.method, path = %request.path, "dispatching api request");

        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/vnd.github+json")
            .header(API_VERSION_HEADER, &self.api_version);

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let final_url = response.url().to_string();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        if status.is_client_error() || status.is_server_error() {
            let parsed: ErrorBody = serde_json::from_slice(&body).unwrap_or_default();
            return Err(TransportError::Status(ApiFailure {
                status: status.as_u16(),
                url: final_url,
                message: parsed.message.unwrap_or_else(|| status.to_string()),
                documentation_url: parsed.documentation_url,
            }));
        }

        Ok(ApiResponse {
            status: status.as_u16(),
            url: final_url,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn test_transport(server: &Server) -> HttpTransport {
        let config = ClientConfig::new("ghp_test_token").with_base_url(server.url());
        HttpTransport::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_every_request_carries_version_and_bearer_headers() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/me/my-repo/actions/variables")
            .match_header("x-github-api-version", "2022-11-28")
            .match_header("authorization", "Bearer ghp_test_token")
            .match_header("accept", "application/vnd.github+json")
            .with_status(200)
            .with_body(r#"{"total_count":0,"variables":[]}"#)
            .create_async()
            .await;

        let transport = test_transport(&server);
        let response = transport
            .execute(ApiRequest::get("/repos/me/my-repo/actions/variables"))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_is_narrowed_into_api_failure() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/repos/me/unknown/actions/secrets")
            .with_status(404)
            .with_body(
                r#"{"message":"Not Found","documentation_url":"https://docs.github.com/rest/actions/secrets"}"#,
            )
            .create_async()
            .await;

        let transport = test_transport(&server);
        let err = transport
            .execute(ApiRequest::get("/repos/me/unknown/actions/secrets"))
            .await
            .unwrap_err();

        match err {
            TransportError::Status(failure) => {
                assert_eq!(failure.status, 404);
                assert_eq!(failure.message, "Not Found");
                assert_eq!(
                    failure.documentation_url.as_deref(),
                    Some("https://docs.github.com/rest/actions/secrets")
                );
                assert!(failure.url.contains("/repos/me/unknown/actions/secrets"));
            }
            other => panic!("expected Status failure, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_json_error_body_still_produces_a_failure() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/repos/me/my-repo/actions/runs")
            .with_status(502)
            .with_body("<html>bad gateway</html>")
            .create_async()
            .await;

        let transport = test_transport(&server);
        let err = transport
            .execute(ApiRequest::get("/repos/me/my-repo/actions/runs"))
            .await
            .unwrap_err();

        match err {
            TransportError::Status(failure) => {
                assert_eq!(failure.status, 502);
                assert!(failure.documentation_url.is_none());
            }
            other => panic!("expected Status failure, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_redirects_are_not_followed() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/repos/me/my-repo/actions/runs/42/logs")
            .with_status(302)
            .with_header("location", "https://objects.example.com/logs.zip")
            .create_async()
            .await;

        let transport = test_transport(&server);
        let response = transport
            .execute(ApiRequest::get("/repos/me/my-repo/actions/runs/42/logs"))
            .await
            .unwrap();

        assert_eq!(response.status, 302);
        assert_eq!(
            response.header("location"),
            Some("https://objects.example.com/logs.zip")
        );
    }
}
