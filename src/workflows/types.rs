use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a workflow file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    Active,
    Deleted,
    DisabledFork,
    DisabledInactivity,
    DisabledManually,
}

/// A workflow definition inside a repository.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Workflow {
    pub id: u64,
    pub node_id: String,
    /// Display name from the workflow file, used by trigger-by-name.
    pub name: String,
    /// Path of the workflow file inside the repository.
    pub path: String,
    pub state: WorkflowState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub url: String,
    pub html_url: String,
    pub badge_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Execution status of a run. Upstream may add states; unrecognized ones
/// land in `Unknown` instead of failing deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    Completed,
    Waiting,
    Requested,
    Pending,
    #[serde(other)]
    Unknown,
}

/// Final outcome of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunConclusion {
    Success,
    Failure,
    Neutral,
    Cancelled,
    Skipped,
    TimedOut,
    ActionRequired,
    Stale,
    StartupFailure,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CommitActor {
    pub name: String,
    pub email: String,
}

/// The commit a run was started from.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HeadCommit {
    pub id: String,
    pub tree_id: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub author: Option<CommitActor>,
    #[serde(default)]
    pub committer: Option<CommitActor>,
}

/// Slim reference to the repository a run belongs to.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RepositoryRef {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// One execution of a workflow. Read-only from this client's perspective.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkflowRun {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    pub node_id: String,
    #[serde(default)]
    pub head_branch: Option<String>,
    #[serde(default)]
    pub head_sha: Option<String>,
    pub run_number: u64,
    #[serde(default)]
    pub run_attempt: Option<u64>,
    /// Event that triggered the run, e.g. `push` or `workflow_dispatch`.
    pub event: String,
    pub status: Option<RunStatus>,
    /// `None` until the run completes.
    pub conclusion: Option<RunConclusion>,
    pub workflow_id: u64,
    pub url: String,
    pub html_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub run_started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub head_commit: Option<HeadCommit>,
    pub repository: RepositoryRef,
}

/// Billable milliseconds for one runner operating system.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct OsUsage {
    pub total_ms: u64,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct BillableUsage {
    #[serde(rename = "UBUNTU", default)]
    pub ubuntu: Option<OsUsage>,
    #[serde(rename = "MACOS", default)]
    pub macos: Option<OsUsage>,
    #[serde(rename = "WINDOWS", default)]
    pub windows: Option<OsUsage>,
}

/// Billable minutes used by a workflow in the current billing cycle.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct WorkflowUsage {
    pub billable: BillableUsage,
}

/// Token accepted by single-workflow endpoints: the numeric id or the
/// workflow file name (e.g. `main.yml`). A display name is not accepted
/// here; resolve it through trigger-by-name instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowSelector {
    Id(u64),
    FileName(String),
}

impl std::fmt::Display for WorkflowSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkflowSelector::Id(id) => write!(f, "{id}"),
            WorkflowSelector::FileName(name) => f.write_str(name),
        }
    }
}

impl From<u64> for WorkflowSelector {
    fn from(id: u64) -> Self {
        WorkflowSelector::Id(id)
    }
}

impl From<&str> for WorkflowSelector {
    fn from(file_name: &str) -> Self {
        WorkflowSelector::FileName(file_name.to_string())
    }
}
