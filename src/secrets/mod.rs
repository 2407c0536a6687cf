pub mod seal;

pub use seal::seal_secret_value;

use crate::error::{normalize, ClientError, ResourceKind};
use crate::transport::{ApiRequest, Transport};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Secret metadata. The value is write-only: it never round-trips back
/// from the API, so no field for it exists.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Secret {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A repository's current encryption key. Fetched fresh for every secret
/// write; never cached.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RepositoryPublicKey {
    /// Server-side identifier of the key, echoed back on writes.
    pub key_id: String,
    /// Base64-encoded X25519 public key, standard alphabet.
    pub key: String,
}

#[derive(Debug, Deserialize)]
struct SecretList {
    secrets: Vec<Secret>,
}

/// Sub-client for repository secrets.
#[derive(Clone)]
pub struct SecretsClient {
    transport: Arc<dyn Transport>,
}

impl SecretsClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// List all secrets of a repository. Returns the unwrapped array, never
    /// the envelope.
    pub async fn list_repository_secrets(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<Secret>, ClientError> {
        let request = ApiRequest::get(format!("/repos/{owner}/{repo}/actions/secrets"));
        match self.transport.execute(request).await {
            Ok(response) => {
                let list: SecretList = response.json()?;
                Ok(list.secrets)
            }
            Err(err) if err.status() == Some(404) => Err(ClientError::UnknownRepository {
                owner: owner.to_string(),
                repo: repo.to_string(),
            }),
            Err(err) => Err(normalize(err)),
        }
    }

    /// Get a single secret's metadata. The value is not part of the
    /// response.
    pub async fn get_repository_secret(
        &self,
        owner: &str,
        repo: &str,
        secret_name: &str,
    ) -> Result<Secret, ClientError> {
        let request =
            ApiRequest::get(format!("/repos/{owner}/{repo}/actions/secrets/{secret_name}"));
        match self.transport.execute(request).await {
            Ok(response) => response.json(),
            Err(err) if err.status() == Some(404) => Err(ClientError::UnknownResource {
                kind: ResourceKind::Secret,
                scope: format!("{owner}/{repo}"),
                name: secret_name.to_string(),
            }),
            Err(err) => Err(normalize(err)),
        }
    }

    /// Fetch the repository's current public key.
    pub async fn get_public_key(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<RepositoryPublicKey, ClientError> {
        let request = ApiRequest::get(format!(
            "/repos/{owner}/{repo}/actions/secrets/public-key"
        ));
        match self.transport.execute(request).await {
            Ok(response) => response.json(),
            Err(err) if err.status() == Some(404) => Err(ClientError::UnknownRepository {
                owner: owner.to_string(),
                repo: repo.to_string(),
            }),
            Err(err) => Err(normalize(err)),
        }
    }

    /// Create or update a repository secret.
    ///
    /// Fetches the current public key, seals the plaintext, and `PUT`s the
    /// ciphertext together with the key id. Returns the response status:
    /// 201 when the secret was created, 204 when it was updated.
    pub async fn create_or_update_repository_secret(
        &self,
        owner: &str,
        repo: &str,
        secret_name: &str,
        secret_value: &str,
    ) -> Result<u16, ClientError> {
        let public_key = self.get_public_key(owner, repo).await?;
        let encrypted_value = seal::seal_secret_value(&public_key, secret_value)?;

        let request =
            ApiRequest::put(format!("/repos/{owner}/{repo}/actions/secrets/{secret_name}"))
                .with_body(json!({
                    "encrypted_value": encrypted_value,
                    "key_id": public_key.key_id,
                }));

        match self.transport.execute(request).await {
            Ok(response) => Ok(response.status),
            Err(err) => Err(normalize(err)),
        }
    }

    /// Delete a repository secret. Returns 204 on success.
    pub async fn delete_repository_secret(
        &self,
        owner: &str,
        repo: &str,
        secret_name: &str,
    ) -> Result<u16, ClientError> {
        let request = ApiRequest::delete(format!(
            "/repos/{owner}/{repo}/actions/secrets/{secret_name}"
        ));
        match self.transport.execute(request).await {
            Ok(response) => Ok(response.status),
            Err(err) if err.status() == Some(404) => Err(ClientError::UnknownResource {
                kind: ResourceKind::Secret,
                scope: format!("{owner}/{repo}"),
                name: secret_name.to_string(),
            }),
            Err(err) => Err(normalize(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::transport::HttpTransport;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine as _;
    use crypto_box::aead::OsRng;
    use crypto_box::SecretKey;
    use mockito::{Matcher, Server};

    fn test_client(server: &Server) -> SecretsClient {
        let config = ClientConfig::new("ghp_test_token").with_base_url(server.url());
        SecretsClient::new(Arc::new(HttpTransport::new(&config).unwrap()))
    }

    #[tokio::test]
    async fn test_list_returns_descriptors_without_values() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/repos/me/my-repo/actions/secrets")
            .with_status(200)
            .with_body(
                r#"{
                  "total_count": 2,
                  "secrets": [
                    {"name": "A", "created_at": "2023-01-02T10:00:00Z", "updated_at": "2023-01-02T10:00:00Z"},
                    {"name": "B", "created_at": "2023-02-03T11:30:00Z", "updated_at": "2023-04-05T08:15:00Z"}
                  ]
                }"#,
            )
            .create_async()
            .await;

        let secrets = test_client(&server)
            .list_repository_secrets("me", "my-repo")
            .await
            .unwrap();

        assert_eq!(secrets.len(), 2);
        assert_eq!(secrets[0].name, "A");
        assert_eq!(secrets[1].name, "B");

        // Descriptors serialize without any value field.
        let serialized = serde_json::to_string(&secrets[0]).unwrap();
        assert!(!serialized.contains("value"));
    }

    #[tokio::test]
    async fn test_list_on_empty_collection_returns_empty_vec() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/repos/me/my-repo/actions/secrets")
            .with_status(200)
            .with_body(r#"{"total_count":0,"secrets":[]}"#)
            .create_async()
            .await;

        let secrets = test_client(&server)
            .list_repository_secrets("me", "my-repo")
            .await
            .unwrap();
        assert!(secrets.is_empty());
    }

    #[tokio::test]
    async fn test_get_on_404_names_the_requested_secret() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/repos/me/my-repo/actions/secrets/MISSING")
            .with_status(404)
            .with_body(r#"{"message":"Not Found"}"#)
            .create_async()
            .await;

        let err = test_client(&server)
            .get_repository_secret("me", "my-repo", "MISSING")
            .await
            .unwrap_err();

        match err {
            ClientError::UnknownResource { kind, scope, name } => {
                assert_eq!(kind, ResourceKind::Secret);
                assert_eq!(scope, "me/my-repo");
                assert_eq!(name, "MISSING");
            }
            other => panic!("expected UnknownResource, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_or_update_fetches_key_seals_and_puts() {
        let mut server = Server::new_async().await;

        let secret_key = SecretKey::generate(&mut OsRng);
        let key_body = format!(
            r#"{{"key_id":"568250167242549743","key":"{}"}}"#,
            BASE64.encode(secret_key.public_key().as_bytes())
        );

        let key_mock = server
            .mock("GET", "/repos/me/my-repo/actions/secrets/public-key")
            .with_status(200)
            .with_body(&key_body)
            .create_async()
            .await;

        let put_mock = server
            .mock("PUT", "/repos/me/my-repo/actions/secrets/DEPLOY_TOKEN")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "key_id": "568250167242549743"
            })))
            .with_status(201)
            .create_async()
            .await;

        let status = test_client(&server)
            .create_or_update_repository_secret("me", "my-repo", "DEPLOY_TOKEN", "hunter2")
            .await
            .unwrap();

        assert_eq!(status, 201);
        key_mock.assert_async().await;
        put_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_or_update_with_malformed_key_never_writes() {
        let mut server = Server::new_async().await;

        let _key_mock = server
            .mock("GET", "/repos/me/my-repo/actions/secrets/public-key")
            .with_status(200)
            .with_body(r#"{"key_id":"k1","key":"%%% not base64 %%%"}"#)
            .create_async()
            .await;

        let put_mock = server
            .mock("PUT", "/repos/me/my-repo/actions/secrets/DEPLOY_TOKEN")
            .expect(0)
            .create_async()
            .await;

        let err = test_client(&server)
            .create_or_update_repository_secret("me", "my-repo", "DEPLOY_TOKEN", "hunter2")
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::InvalidPublicKey { .. }));
        put_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_public_key_is_fetched_fresh_for_every_write() {
        let mut server = Server::new_async().await;

        let secret_key = SecretKey::generate(&mut OsRng);
        let key_body = format!(
            r#"{{"key_id":"k1","key":"{}"}}"#,
            BASE64.encode(secret_key.public_key().as_bytes())
        );

        let key_mock = server
            .mock("GET", "/repos/me/my-repo/actions/secrets/public-key")
            .with_status(200)
            .with_body(&key_body)
            .expect(2)
            .create_async()
            .await;

        let _put_mock = server
            .mock("PUT", "/repos/me/my-repo/actions/secrets/TOKEN")
            .with_status(204)
            .expect(2)
            .create_async()
            .await;

        let client = test_client(&server);
        client
            .create_or_update_repository_secret("me", "my-repo", "TOKEN", "one")
            .await
            .unwrap();
        client
            .create_or_update_repository_secret("me", "my-repo", "TOKEN", "two")
            .await
            .unwrap();

        key_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_returns_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("DELETE", "/repos/me/my-repo/actions/secrets/OLD")
            .with_status(204)
            .create_async()
            .await;

        let status = test_client(&server)
            .delete_repository_secret("me", "my-repo", "OLD")
            .await
            .unwrap();
        assert_eq!(status, 204);
    }
}
