use crate::transport::{ApiFailure, TransportError};
use thiserror::Error;
use tracing::error;

/// Resource families a not-found error can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Secret,
    Variable,
    Workflow,
    WorkflowRun,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResourceKind::Secret => "secret",
            ResourceKind::Variable => "variable",
            ResourceKind::Workflow => "workflow",
            ResourceKind::WorkflowRun => "workflow run",
        };
        f.write_str(name)
    }
}

/// Errors surfaced by every client operation
#[derive(Debug, Error)]
pub enum ClientError {
    /// Upstream call failed with a status that is not a recognized
    /// not-found case. The message carries everything a caller gets.
    #[error("request to {url} failed with status {status}, see {documentation_url}")]
    Upstream {
        status: u16,
        url: String,
        documentation_url: String,
    },

    /// 404 from a collection endpoint: the owner or repository is wrong.
    #[error("owner '{owner}' or repository '{repo}' is unknown")]
    UnknownRepository { owner: String, repo: String },

    /// 404 from an organization-scoped collection endpoint.
    #[error("organization '{org}' is unknown")]
    UnknownOrganization { org: String },

    /// 404 for a named resource inside an existing scope.
    #[error("{kind} '{name}' is unknown in {scope}")]
    UnknownResource {
        kind: ResourceKind,
        scope: String,
        name: String,
    },

    /// Trigger-by-name found no workflow with that display name. No
    /// dispatch request was issued.
    #[error("workflow '{name}' not found in {owner}/{repo}")]
    WorkflowNotFound {
        name: String,
        owner: String,
        repo: String,
    },

    /// Network-level failure without an HTTP response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The repository public key could not be decoded. Fails closed: the
    /// secret value is never sent unencrypted.
    #[error("public key '{key_id}' is malformed: {reason}")]
    InvalidPublicKey { key_id: String, reason: String },

    /// Sealed-box encryption failed. Fails closed as above.
    #[error("sealing the secret value failed")]
    Seal,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("unexpected response body: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// Fallback documentation link when the failure body carries none.
const DOCS_FALLBACK: &str = "https://docs.github.com/rest";

/// Convert a transport failure into the single normalized error shape.
///
/// The raw failure is logged with structured fields before it is rewritten;
/// callers only ever see the normalized message.
pub(crate) fn normalize(err: TransportError) -> ClientError {
    match err {
        TransportError::Status(failure) => {
            let ApiFailure {
                status,
                url,
                message,
                documentation_url,
            } = failure;
            error!(status, url = %url, message = %message, "api call failed");
            ClientError::Upstream {
                status,
                url,
                documentation_url: documentation_url
                    .unwrap_or_else(|| DOCS_FALLBACK.to_string()),
            }
        }
        TransportError::Http(e) => {
            error!(error = %e, "transport failure without a response");
            ClientError::Transport(e)
        }
    }
}
