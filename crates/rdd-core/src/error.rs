use thiserror::Error;

#[derive(Debug, Error)]
pub enum RddError {
    #[error("not a git repository: run this from within a git repository")]
    NotGitRepo,

    #[error("git executable not found on PATH")]
    GitNotFound,

    #[error("template not found: {0}")]
    TemplateNotFound(String),

    #[error("invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("invalid branch name '{0}': expected {{enh|fix}}/{{YYYYMMDD-HHmm}}-{{name}}")]
    InvalidBranchName(String),

    #[error("invalid change type '{0}': valid types are enh, fix")]
    InvalidChangeKind(String),

    #[error("invalid workspace type '{0}': valid types are change, fix")]
    InvalidWorkspaceKind(String),

    #[error("branch already exists: {0}")]
    BranchExists(String),

    #[error("branch not found: {0}")]
    BranchNotFound(String),

    #[error("refusing to operate on protected branch '{0}'")]
    ProtectedBranch(String),

    #[error("not on an enhancement or fix branch (current: {0})")]
    NotWorkBranch(String),

    #[error("not on default branch: current '{current}', expected '{expected}'")]
    NotOnDefaultBranch { current: String, expected: String },

    #[error("could not determine current branch (detached HEAD?)")]
    NoCurrentBranch,

    #[error("uncommitted changes present: commit or stash them first")]
    UncommittedChanges(Vec<String>),

    #[error("workspace directory is not empty: {0}")]
    WorkspaceNotEmpty(String),

    #[error("workspace directory is empty: {0}")]
    WorkspaceEmpty(String),

    #[error("prompt not found: {0}")]
    PromptNotFound(String),

    #[error("prompt id '{0}' appears more than once in the journal")]
    DuplicatePrompt(String),

    #[error("journal not found: {0}")]
    JournalNotFound(String),

    #[error("git {command} failed: {stderr}")]
    Git { command: String, stderr: String },

    #[error("merge conflicts in {} file(s)", .0.len())]
    MergeConflict(Vec<String>),

    #[error("operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl RddError {
    /// Errors caused by what the user typed, as opposed to the environment.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            RddError::InvalidName { .. }
                | RddError::InvalidBranchName(_)
                | RddError::InvalidChangeKind(_)
                | RddError::InvalidWorkspaceKind(_)
                | RddError::BranchExists(_)
                | RddError::BranchNotFound(_)
                | RddError::ProtectedBranch(_)
                | RddError::NotWorkBranch(_)
                | RddError::NotOnDefaultBranch { .. }
                | RddError::WorkspaceNotEmpty(_)
                | RddError::WorkspaceEmpty(_)
                | RddError::PromptNotFound(_)
                | RddError::DuplicatePrompt(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, RddError>;
