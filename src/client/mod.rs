use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::secrets::{RepositoryPublicKey, Secret, SecretsClient};
use crate::transport::{HttpTransport, Transport};
use crate::variables::{Variable, VariablesClient};
use crate::workflows::{
    Workflow, WorkflowRun, WorkflowSelector, WorkflowUsage, WorkflowsClient,
};
use std::sync::Arc;

/// Facade over the three sub-clients, bound to one owner/repository.
///
/// Token and API version live in the transport shared by all sub-clients.
/// Instances are cheap to construct and independent; the library adds no
/// synchronization, request coalescing, retries, or cancellation on top of
/// them, so callers wanting timeouts impose them externally.
#[derive(Clone)]
pub struct ActionsClient {
    owner: String,
    repo: String,
    workflows: WorkflowsClient,
    variables: VariablesClient,
    secrets: SecretsClient,
}

impl ActionsClient {
    /// Build a client with the reqwest-backed transport.
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self, ClientError> {
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(&config)?);
        Ok(Self::with_transport(owner, repo, transport))
    }

    /// Build a client over an injected transport, e.g. a test double.
    pub fn with_transport(
        owner: impl Into<String>,
        repo: impl Into<String>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            workflows: WorkflowsClient::new(Arc::clone(&transport)),
            variables: VariablesClient::new(Arc::clone(&transport)),
            secrets: SecretsClient::new(transport),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    // Workflows

    pub async fn list_workflows(&self) -> Result<Vec<Workflow>, ClientError> {
        self.workflows.list(&self.owner, &self.repo).await
    }

    pub async fn get_workflow(
        &self,
        selector: &WorkflowSelector,
    ) -> Result<Workflow, ClientError> {
        self.workflows.get(&self.owner, &self.repo, selector).await
    }

    /// Trigger a workflow by display name on the given ref, with optional
    /// dispatch inputs.
    pub async fn trigger_workflow(
        &self,
        workflow_name: &str,
        git_ref: &str,
        inputs: Option<serde_json::Value>,
    ) -> Result<u16, ClientError> {
        self.workflows
            .trigger(&self.owner, &self.repo, workflow_name, git_ref, inputs)
            .await
    }

    pub async fn list_workflow_runs(&self) -> Result<Vec<WorkflowRun>, ClientError> {
        self.workflows.list_runs(&self.owner, &self.repo).await
    }

    pub async fn get_workflow_run(&self, run_id: u64) -> Result<WorkflowRun, ClientError> {
        self.workflows.get_run(&self.owner, &self.repo, run_id).await
    }

    /// Short-lived download URL for a run's log archive, when the server
    /// provided one.
    pub async fn download_workflow_run_logs(
        &self,
        run_id: u64,
    ) -> Result<Option<String>, ClientError> {
        self.workflows
            .download_run_logs(&self.owner, &self.repo, run_id)
            .await
    }

    pub async fn get_workflow_usage(
        &self,
        selector: &WorkflowSelector,
    ) -> Result<WorkflowUsage, ClientError> {
        self.workflows.usage(&self.owner, &self.repo, selector).await
    }

    pub async fn enable_workflow(&self, selector: &WorkflowSelector) -> Result<u16, ClientError> {
        self.workflows.enable(&self.owner, &self.repo, selector).await
    }

    pub async fn disable_workflow(&self, selector: &WorkflowSelector) -> Result<u16, ClientError> {
        self.workflows.disable(&self.owner, &self.repo, selector).await
    }

    // Repository variables

    pub async fn list_repository_variables(&self) -> Result<Vec<Variable>, ClientError> {
        self.variables
            .list_repository_variables(&self.owner, &self.repo)
            .await
    }

    pub async fn get_repository_variable(&self, name: &str) -> Result<Variable, ClientError> {
        self.variables
            .get_repository_variable(&self.owner, &self.repo, name)
            .await
    }

    pub async fn create_repository_variable(
        &self,
        name: &str,
        value: &str,
    ) -> Result<u16, ClientError> {
        self.variables
            .create_repository_variable(&self.owner, &self.repo, name, value)
            .await
    }

    pub async fn update_repository_variable(
        &self,
        name: &str,
        value: &str,
    ) -> Result<u16, ClientError> {
        self.variables
            .update_repository_variable(&self.owner, &self.repo, name, value)
            .await
    }

    pub async fn delete_repository_variable(&self, name: &str) -> Result<u16, ClientError> {
        self.variables
            .delete_repository_variable(&self.owner, &self.repo, name)
            .await
    }

    /// `false` for any failure, not just 404.
    pub async fn repository_variable_exists(&self, name: &str) -> bool {
        self.variables
            .repository_variable_exists(&self.owner, &self.repo, name)
            .await
    }

    pub async fn create_or_update_repository_variable(
        &self,
        name: &str,
        value: &str,
    ) -> Result<u16, ClientError> {
        self.variables
            .create_or_update_repository_variable(&self.owner, &self.repo, name, value)
            .await
    }

    // Organization variables. The org is passed explicitly: the bound
    // owner is not necessarily an organization.

    pub async fn list_organization_variables(
        &self,
        org: &str,
    ) -> Result<Vec<Variable>, ClientError> {
        self.variables.list_organization_variables(org).await
    }

    pub async fn get_organization_variable(
        &self,
        org: &str,
        name: &str,
    ) -> Result<Variable, ClientError> {
        self.variables.get_organization_variable(org, name).await
    }

    pub async fn create_organization_variable(
        &self,
        org: &str,
        name: &str,
        value: &str,
    ) -> Result<u16, ClientError> {
        self.variables
            .create_organization_variable(org, name, value)
            .await
    }

    pub async fn update_organization_variable(
        &self,
        org: &str,
        name: &str,
        value: &str,
    ) -> Result<u16, ClientError> {
        self.variables
            .update_organization_variable(org, name, value)
            .await
    }

    pub async fn delete_organization_variable(
        &self,
        org: &str,
        name: &str,
    ) -> Result<u16, ClientError> {
        self.variables.delete_organization_variable(org, name).await
    }

    pub async fn organization_variable_exists(&self, org: &str, name: &str) -> bool {
        self.variables.organization_variable_exists(org, name).await
    }

    pub async fn create_or_update_organization_variable(
        &self,
        org: &str,
        name: &str,
        value: &str,
    ) -> Result<u16, ClientError> {
        self.variables
            .create_or_update_organization_variable(org, name, value)
            .await
    }

    // Secrets

    pub async fn list_repository_secrets(&self) -> Result<Vec<Secret>, ClientError> {
        self.secrets
            .list_repository_secrets(&self.owner, &self.repo)
            .await
    }

    pub async fn get_repository_secret(&self, secret_name: &str) -> Result<Secret, ClientError> {
        self.secrets
            .get_repository_secret(&self.owner, &self.repo, secret_name)
            .await
    }

    pub async fn get_secrets_public_key(&self) -> Result<RepositoryPublicKey, ClientError> {
        self.secrets.get_public_key(&self.owner, &self.repo).await
    }

    /// Seal the plaintext under the repository's current public key and
    /// write it. The plaintext never leaves the process unencrypted.
    pub async fn create_or_update_repository_secret(
        &self,
        secret_name: &str,
        secret_value: &str,
    ) -> Result<u16, ClientError> {
        self.secrets
            .create_or_update_repository_secret(&self.owner, &self.repo, secret_name, secret_value)
            .await
    }

    pub async fn delete_repository_secret(&self, secret_name: &str) -> Result<u16, ClientError> {
        self.secrets
            .delete_repository_secret(&self.owner, &self.repo, secret_name)
            .await
    }
}
