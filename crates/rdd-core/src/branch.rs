//! Branch classification and work-branch naming.
//!
//! Classification is derived from the branch name every time it is needed;
//! nothing about a branch's type is persisted.

use crate::error::RddError;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Branches that are always protected, in addition to the configured default.
pub const PROTECTED_BRANCHES: &[&str] = &["main", "master"];

// ---------------------------------------------------------------------------
// BranchKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchKind {
    Enhancement,
    Fix,
    Protected,
    Other,
}

impl BranchKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BranchKind::Enhancement => "enhancement",
            BranchKind::Fix => "fix",
            BranchKind::Protected => "protected",
            BranchKind::Other => "other",
        }
    }
}

impl fmt::Display for BranchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify `branch` relative to the repository's `default_branch`.
///
/// Rules apply in order: protected names first, then the `enh/` and `fix/`
/// prefixes, then everything else.
pub fn classify(branch: &str, default_branch: &str) -> BranchKind {
    if branch == default_branch || PROTECTED_BRANCHES.contains(&branch) {
        BranchKind::Protected
    } else if branch.starts_with("enh/") {
        BranchKind::Enhancement
    } else if branch.starts_with("fix/") {
        BranchKind::Fix
    } else {
        BranchKind::Other
    }
}

/// Anything that is not protected may be worked on (and deleted).
pub fn is_valid_work_branch(branch: &str, default_branch: &str) -> bool {
    classify(branch, default_branch) != BranchKind::Protected
}

/// True for branches that a change can be wrapped up from.
pub fn is_change_branch(branch: &str, default_branch: &str) -> bool {
    matches!(
        classify(branch, default_branch),
        BranchKind::Enhancement | BranchKind::Fix
    )
}

// ---------------------------------------------------------------------------
// ChangeKind
// ---------------------------------------------------------------------------

/// The two kinds of change a work branch can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Enh,
    Fix,
}

impl ChangeKind {
    /// Branch prefix without the trailing slash.
    pub fn prefix(self) -> &'static str {
        match self {
            ChangeKind::Enh => "enh",
            ChangeKind::Fix => "fix",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChangeKind::Enh => "Enhancement",
            ChangeKind::Fix => "Fix",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

impl std::str::FromStr for ChangeKind {
    type Err = RddError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enh" => Ok(ChangeKind::Enh),
            "fix" => Ok(ChangeKind::Fix),
            _ => Err(RddError::InvalidChangeKind(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Branch naming
// ---------------------------------------------------------------------------

/// Local-time stamp used inside branch names: `YYYYMMDD-HHMM`.
pub fn branch_timestamp(now: DateTime<Local>) -> String {
    now.format("%Y%m%d-%H%M").to_string()
}

/// Build `{kind}/{stamp}-{name}`. `name` is expected to be validated already.
pub fn format_work_branch(kind: ChangeKind, stamp: &str, name: &str) -> String {
    format!("{}/{stamp}-{name}", kind.prefix())
}

/// Archive folders are flat: `enh/2025...-x` becomes `enh-2025...-x`.
pub fn archive_folder_name(branch: &str) -> String {
    branch.replace('/', "-")
}

/// Pick the default branch: the configured value if any, otherwise `main`
/// or `master` when they exist locally, otherwise `main`.
pub fn resolve_default_branch(configured: Option<&str>, local_branches: &[String]) -> String {
    if let Some(name) = configured.map(str::trim).filter(|s| !s.is_empty()) {
        return name.to_string();
    }
    for candidate in PROTECTED_BRANCHES {
        if local_branches.iter().any(|b| b == candidate) {
            return (*candidate).to_string();
        }
    }
    "main".to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
