use crate::error::ClientError;
use std::time::Duration;

/// API revision sent as `X-GitHub-Api-Version` on every request.
pub const DEFAULT_API_VERSION: &str = "2022-11-28";

/// Default REST endpoint. Overridable for GitHub Enterprise or tests.
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Configuration for building a client.
///
/// The token is injected explicitly; the library never reads the
/// environment on its own. `from_env` exists as a one-shot convenience for
/// embedding applications that keep the token in `GITHUB_TOKEN`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Bearer token used on every request.
    pub token: String,
    /// REST endpoint, without a trailing slash.
    pub base_url: String,
    /// API revision header value.
    pub api_version: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl ClientConfig {
    /// Create a configuration with the given token and default settings.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            user_agent: format!("github-actions-client/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Resolve the token from `GITHUB_TOKEN`, once, at construction time.
    pub fn from_env() -> Result<Self, ClientError> {
        let token = std::env::var("GITHUB_TOKEN")
            .map_err(|_| ClientError::Config("GITHUB_TOKEN is not set".to_string()))?;
        Ok(Self::new(token))
    }

    /// Override the REST endpoint. A trailing slash is trimmed.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Override the API revision header.
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Validate the configuration before a transport is built from it.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.token.is_empty() {
            return Err(ClientError::Config("token cannot be empty".to_string()));
        }

        reqwest::Url::parse(&self.base_url)
            .map_err(|e| ClientError::Config(format!("invalid base url '{}': {e}", self.base_url)))?;

        if self.api_version.is_empty() {
            return Err(ClientError::Config(
                "api version cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("ghp_test");
        assert_eq!(config.base_url, "https://api.github.com");
        assert_eq!(config.api_version, "2022-11-28");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_token_is_rejected() {
        let config = ClientConfig::new("");
        assert!(matches!(config.validate(), Err(ClientError::Config(_))));
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let config = ClientConfig::new("ghp_test").with_base_url("not a url");
        assert!(matches!(config.validate(), Err(ClientError::Config(_))));
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = ClientConfig::new("ghp_test").with_base_url("https://ghe.example.com/api/v3/");
        assert_eq!(config.base_url, "https://ghe.example.com/api/v3");
    }

    #[test]
    #[serial]
    fn test_from_env_reads_token_once() {
        std::env::set_var("GITHUB_TOKEN", "ghp_from_env");
        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.token, "ghp_from_env");
        std::env::remove_var("GITHUB_TOKEN");
    }

    #[test]
    #[serial]
    fn test_from_env_without_token_fails() {
        std::env::remove_var("GITHUB_TOKEN");
        assert!(matches!(
            ClientConfig::from_env(),
            Err(ClientError::Config(_))
        ));
    }
}
