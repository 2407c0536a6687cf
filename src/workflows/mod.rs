pub mod types;

pub use types::{
    BillableUsage, CommitActor, HeadCommit, OsUsage, RepositoryRef, RunConclusion, RunStatus,
    Workflow, WorkflowRun, WorkflowSelector, WorkflowState, WorkflowUsage,
};

use crate::error::{normalize, ClientError, ResourceKind};
use crate::transport::{ApiRequest, Transport};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct WorkflowList {
    workflows: Vec<Workflow>,
}

#[derive(Debug, Deserialize)]
struct WorkflowRunList {
    workflow_runs: Vec<WorkflowRun>,
}

/// Sub-client for workflows and workflow runs.
#[derive(Clone)]
pub struct WorkflowsClient {
    transport: Arc<dyn Transport>,
}

impl WorkflowsClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// List all workflows of a repository. Returns the unwrapped array,
    /// never the envelope.
    pub async fn list(&self, owner: &str, repo: &str) -> Result<Vec<Workflow>, ClientError> {
        let request = ApiRequest::get(format!("/repos/{owner}/{repo}/actions/workflows"));
        match self.transport.execute(request).await {
            Ok(response) => {
                let list: WorkflowList = response.json()?;
                Ok(list.workflows)
            }
            Err(err) if err.status() == Some(404) => Err(ClientError::UnknownRepository {
                owner: owner.to_string(),
                repo: repo.to_string(),
            }),
            Err(err) => Err(normalize(err)),
        }
    }

    /// Get a single workflow by numeric id or file name.
    pub async fn get(
        &self,
        owner: &str,
        repo: &str,
        selector: &WorkflowSelector,
    ) -> Result<Workflow, ClientError> {
        let request =
            ApiRequest::get(format!("/repos/{owner}/{repo}/actions/workflows/{selector}"));
        match self.transport.execute(request).await {
            Ok(response) => response.json(),
            Err(err) if err.status() == Some(404) => Err(ClientError::UnknownResource {
                kind: ResourceKind::Workflow,
                scope: format!("{owner}/{repo}"),
                name: selector.to_string(),
            }),
            Err(err) => Err(normalize(err)),
        }
    }

    /// Trigger a workflow by its display name.
    ///
    /// The dispatch endpoint only accepts a numeric id or a file name, so
    /// the workflows are listed first and scanned for a name match. No
    /// match raises `WorkflowNotFound` without issuing a dispatch request.
    /// Returns the dispatch status (204) otherwise.
    pub async fn trigger(
        &self,
        owner: &str,
        repo: &str,
        workflow_name: &str,
        git_ref: &str,
        inputs: Option<serde_json::Value>,
    ) -> Result<u16, ClientError> {
        let workflows = self.list(owner, repo).await?;
        let Some(workflow) = workflows.iter().find(|w| w.name == workflow_name) else {
            return Err(ClientError::WorkflowNotFound {
                name: workflow_name.to_string(),
                owner: owner.to_string(),
                repo: repo.to_string(),
            });
        };

        debug!(workflow_id = workflow.id, git_ref, "dispatching workflow");

        let mut body = json!({ "ref": git_ref });
        if let Some(inputs) = inputs {
            body["inputs"] = inputs;
        }

        let request = ApiRequest::post(format!(
            "/repos/{owner}/{repo}/actions/workflows/{}/dispatches",
            workflow.id
        ))
        .with_body(body);

        match self.transport.execute(request).await {
            Ok(response) => Ok(response.status),
            Err(err) if err.status() == Some(404) => Err(ClientError::UnknownResource {
                kind: ResourceKind::Workflow,
                scope: format!("{owner}/{repo}"),
                name: workflow_name.to_string(),
            }),
            Err(err) => Err(normalize(err)),
        }
    }

    /// List all runs of a repository.
    pub async fn list_runs(&self, owner: &str, repo: &str) -> Result<Vec<WorkflowRun>, ClientError> {
        let request = ApiRequest::get(format!("/repos/{owner}/{repo}/actions/runs"));
        match self.transport.execute(request).await {
            Ok(response) => {
                let list: WorkflowRunList = response.json()?;
                Ok(list.workflow_runs)
            }
            Err(err) if err.status() == Some(404) => Err(ClientError::UnknownRepository {
                owner: owner.to_string(),
                repo: repo.to_string(),
            }),
            Err(err) => Err(normalize(err)),
        }
    }

    /// Get a single run by id.
    pub async fn get_run(
        &self,
        owner: &str,
        repo: &str,
        run_id: u64,
    ) -> Result<WorkflowRun, ClientError> {
        let request = ApiRequest::get(format!("/repos/{owner}/{repo}/actions/runs/{run_id}"));
        match self.transport.execute(request).await {
            Ok(response) => response.json(),
            Err(err) if err.status() == Some(404) => Err(ClientError::UnknownResource {
                kind: ResourceKind::WorkflowRun,
                scope: format!("{owner}/{repo}"),
                name: run_id.to_string(),
            }),
            Err(err) => Err(normalize(err)),
        }
    }

    /// Get the short-lived download URL for a run's log archive.
    ///
    /// The endpoint answers with a redirect; the `location` header is
    /// returned verbatim (`None` when the server did not provide one) and
    /// the redirect is never followed.
    pub async fn download_run_logs(
        &self,
        owner: &str,
        repo: &str,
        run_id: u64,
    ) -> Result<Option<String>, ClientError> {
        let request = ApiRequest::get(format!("/repos/{owner}/{repo}/actions/runs/{run_id}/logs"));
        match self.transport.execute(request).await {
            Ok(response) => Ok(response.header("location").map(str::to_string)),
            Err(err) if err.status() == Some(404) => Err(ClientError::UnknownResource {
                kind: ResourceKind::WorkflowRun,
                scope: format!("{owner}/{repo}"),
                name: run_id.to_string(),
            }),
            Err(err) => Err(normalize(err)),
        }
    }

    /// Billable minutes used by a workflow in the current billing cycle.
    pub async fn usage(
        &self,
        owner: &str,
        repo: &str,
        selector: &WorkflowSelector,
    ) -> Result<WorkflowUsage, ClientError> {
        let request = ApiRequest::get(format!(
            "/repos/{owner}/{repo}/actions/workflows/{selector}/timing"
        ));
        match self.transport.execute(request).await {
            Ok(response) => response.json(),
            Err(err) if err.status() == Some(404) => Err(ClientError::UnknownResource {
                kind: ResourceKind::Workflow,
                scope: format!("{owner}/{repo}"),
                name: selector.to_string(),
            }),
            Err(err) => Err(normalize(err)),
        }
    }

    /// Enable a workflow; its state becomes `active`. Returns 204.
    pub async fn enable(
        &self,
        owner: &str,
        repo: &str,
        selector: &WorkflowSelector,
    ) -> Result<u16, ClientError> {
        self.set_enabled(owner, repo, selector, "enable").await
    }

    /// Disable a workflow; its state becomes `disabled_manually`.
    /// Returns 204.
    pub async fn disable(
        &self,
        owner: &str,
        repo: &str,
        selector: &WorkflowSelector,
    ) -> Result<u16, ClientError> {
        self.set_enabled(owner, repo, selector, "disable").await
    }

    async fn set_enabled(
        &self,
        owner: &str,
        repo: &str,
        selector: &WorkflowSelector,
        action: &str,
    ) -> Result<u16, ClientError> {
        let request = ApiRequest::put(format!(
            "/repos/{owner}/{repo}/actions/workflows/{selector}/{action}"
        ));
        match self.transport.execute(request).await {
            Ok(response) => Ok(response.status),
            Err(err) if err.status() == Some(404) => Err(ClientError::UnknownResource {
                kind: ResourceKind::Workflow,
                scope: format!("{owner}/{repo}"),
                name: selector.to_string(),
            }),
            Err(err) => Err(normalize(err)),
        }
    }
}
