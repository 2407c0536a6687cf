use crate::error::{normalize, ClientError, ResourceKind};
use crate::transport::{ApiRequest, Transport};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// An Actions variable. Unlike secrets, the value is plaintext and is
/// returned by reads.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Variable {
    pub name: String,
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct VariableList {
    variables: Vec<Variable>,
}

/// Sub-client for repository- and organization-scoped variables.
#[derive(Clone)]
pub struct VariablesClient {
    transport: Arc<dyn Transport>,
}

impl VariablesClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// List all variables of a repository. Returns the unwrapped array,
    /// never the envelope.
    pub async fn list_repository_variables(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<Variable>, ClientError> {
        let request = ApiRequest::get(format!("/repos/{owner}/{repo}/actions/variables"));
        match self.transport.execute(request).await {
            Ok(response) => {
                let list: VariableList = response.json()?;
                Ok(list.variables)
            }
            Err(err) if err.status() == Some(404) => Err(ClientError::UnknownRepository {
                owner: owner.to_string(),
                repo: repo.to_string(),
            }),
            Err(err) => Err(normalize(err)),
        }
    }

    /// Get a single repository variable.
    pub async fn get_repository_variable(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
    ) -> Result<Variable, ClientError> {
        let request = ApiRequest::get(format!("/repos/{owner}/{repo}/actions/variables/{name}"));
        match self.transport.execute(request).await {
            Ok(response) => response.json(),
            Err(err) if err.status() == Some(404) => Err(ClientError::UnknownResource {
                kind: ResourceKind::Variable,
                scope: format!("{owner}/{repo}"),
                name: name.to_string(),
            }),
            Err(err) => Err(normalize(err)),
        }
    }

    /// Create a repository variable. Returns 201 on success.
    pub async fn create_repository_variable(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
        value: &str,
    ) -> Result<u16, ClientError> {
        let request = ApiRequest::post(format!("/repos/{owner}/{repo}/actions/variables"))
            .with_body(json!({ "name": name, "value": value }));
        match self.transport.execute(request).await {
            Ok(response) => Ok(response.status),
            Err(err) => Err(normalize(err)),
        }
    }

    /// Update a repository variable. Returns 204 on success.
    pub async fn update_repository_variable(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
        value: &str,
    ) -> Result<u16, ClientError> {
        let request = ApiRequest::patch(format!("/repos/{owner}/{repo}/actions/variables/{name}"))
            .with_body(json!({ "name": name, "value": value }));
        match self.transport.execute(request).await {
            Ok(response) => Ok(response.status),
            Err(err) => Err(normalize(err)),
        }
    }

    /// Delete a repository variable. Returns 204 on success.
    pub async fn delete_repository_variable(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
    ) -> Result<u16, ClientError> {
        let request =
            ApiRequest::delete(format!("/repos/{owner}/{repo}/actions/variables/{name}"));
        match self.transport.execute(request).await {
            Ok(response) => Ok(response.status),
            Err(err) if err.status() == Some(404) => Err(ClientError::UnknownResource {
                kind: ResourceKind::Variable,
                scope: format!("{owner}/{repo}"),
                name: name.to_string(),
            }),
            Err(err) => Err(normalize(err)),
        }
    }

    /// Check whether a repository variable exists.
    ///
    /// Collapses every failure to `false`, including auth failures and
    /// server errors, so a 500 is indistinguishable from "not found" here.
    pub async fn repository_variable_exists(&self, owner: &str, repo: &str, name: &str) -> bool {
        self.get_repository_variable(owner, repo, name).await.is_ok()
    }

    /// Create the variable if it is missing, update it otherwise.
    ///
    /// Check-then-act: a concurrent external writer can still create the
    /// variable between the existence check and the create call, in which
    /// case the create surfaces a conflict. The library adds no locking.
    pub async fn create_or_update_repository_variable(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
        value: &str,
    ) -> Result<u16, ClientError> {
        if self.repository_variable_exists(owner, repo, name).await {
            self.update_repository_variable(owner, repo, name, value).await
        } else {
            self.create_repository_variable(owner, repo, name, value).await
        }
    }

    /// List all variables of an organization.
    pub async fn list_organization_variables(
        &self,
        org: &str,
    ) -> Result<Vec<Variable>, ClientError> {
        let request = ApiRequest::get(format!("/orgs/{org}/actions/variables"));
        match self.transport.execute(request).await {
            Ok(response) => {
                let list: VariableList = response.json()?;
                Ok(list.variables)
            }
            Err(err) if err.status() == Some(404) => Err(ClientError::UnknownOrganization {
                org: org.to_string(),
            }),
            Err(err) => Err(normalize(err)),
        }
    }

    /// Get a single organization variable.
    pub async fn get_organization_variable(
        &self,
        org: &str,
        name: &str,
    ) -> Result<Variable, ClientError> {
        let request = ApiRequest::get(format!("/orgs/{org}/actions/variables/{name}"));
        match self.transport.execute(request).await {
            Ok(response) => response.json(),
            Err(err) if err.status() == Some(404) => Err(ClientError::UnknownResource {
                kind: ResourceKind::Variable,
                scope: format!("organization '{org}'"),
                name: name.to_string(),
            }),
            Err(err) => Err(normalize(err)),
        }
    }

    /// Create an organization variable visible to all repositories.
    /// Returns 201 on success.
    pub async fn create_organization_variable(
        &self,
        org: &str,
        name: &str,
        value: &str,
    ) -> Result<u16, ClientError> {
        let request = ApiRequest::post(format!("/orgs/{org}/actions/variables")).with_body(json!({
            "name": name,
            "value": value,
            "visibility": "all",
        }));
        match self.transport.execute(request).await {
            Ok(response) => Ok(response.status),
            Err(err) => Err(normalize(err)),
        }
    }

    /// Update an organization variable. Returns 204 on success.
    pub async fn update_organization_variable(
        &self,
        org: &str,
        name: &str,
        value: &str,
    ) -> Result<u16, ClientError> {
        let request = ApiRequest::patch(format!("/orgs/{org}/actions/variables/{name}"))
            .with_body(json!({ "name": name, "value": value }));
        match self.transport.execute(request).await {
            Ok(response) => Ok(response.status),
            Err(err) => Err(normalize(err)),
        }
    }

    /// Delete an organization variable. Returns 204 on success.
    pub async fn delete_organization_variable(
        &self,
        org: &str,
        name: &str,
    ) -> Result<u16, ClientError> {
        let request = ApiRequest::delete(format!("/orgs/{org}/actions/variables/{name}"));
        match self.transport.execute(request).await {
            Ok(response) => Ok(response.status),
            Err(err) if err.status() == Some(404) => Err(ClientError::UnknownResource {
                kind: ResourceKind::Variable,
                scope: format!("organization '{org}'"),
                name: name.to_string(),
            }),
            Err(err) => Err(normalize(err)),
        }
    }

    /// Check whether an organization variable exists. Same imprecision as
    /// the repository-scoped check.
    pub async fn organization_variable_exists(&self, org: &str, name: &str) -> bool {
        self.get_organization_variable(org, name).await.is_ok()
    }

    /// Create the organization variable if it is missing, update it
    /// otherwise. Same check-then-act caveat as the repository-scoped call.
    pub async fn create_or_update_organization_variable(
        &self,
        org: &str,
        name: &str,
        value: &str,
    ) -> Result<u16, ClientError> {
        if self.organization_variable_exists(org, name).await {
            self.update_organization_variable(org, name, value).await
        } else {
            self.create_organization_variable(org, name, value).await
        }
    }
}
