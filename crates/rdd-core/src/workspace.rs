//! The per-change scratch directory at `.rdd-docs/workspace/`.
//!
//! Lifecycle: empty → populated (by [`Workspace::init`]) → archived into
//! `.rdd-docs/archive/<branch>/` and cleared again. A missing directory is
//! treated exactly like an empty one.

use crate::branch::archive_folder_name;
use crate::error::{RddError, Result};
use crate::io::{self, CopyFailure};
use crate::paths;
use crate::templates::{self, Templates};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which set of templates a workspace starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceKind {
    Change,
    Fix,
}

impl WorkspaceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkspaceKind::Change => "change",
            WorkspaceKind::Fix => "fix",
        }
    }
}

impl fmt::Display for WorkspaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WorkspaceKind {
    type Err = RddError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "change" => Ok(WorkspaceKind::Change),
            "fix" => Ok(WorkspaceKind::Fix),
            _ => Err(RddError::InvalidWorkspaceKind(s.to_string())),
        }
    }
}

impl From<crate::branch::ChangeKind> for WorkspaceKind {
    fn from(kind: crate::branch::ChangeKind) -> Self {
        match kind {
            crate::branch::ChangeKind::Enh => WorkspaceKind::Change,
            crate::branch::ChangeKind::Fix => WorkspaceKind::Fix,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkspaceState {
    Empty,
    Populated,
}

/// Who and what an archive was taken from. Gathered from git by the caller.
#[derive(Debug, Clone, Default)]
pub struct ArchiveProvenance {
    pub archived_by: String,
    pub last_commit: String,
    pub last_commit_message: String,
}

/// Contents of `.archive-metadata`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveMetadata {
    pub archived_at: DateTime<Utc>,
    pub branch: String,
    pub archived_by: String,
    pub last_commit: String,
    pub last_commit_message: String,
}

#[derive(Debug)]
pub enum ArchiveOutcome {
    Archived {
        path: PathBuf,
        /// Entries that could not be copied; the rest of the archive stands.
        failures: Vec<CopyFailure>,
        /// Whether the workspace was emptied afterwards.
        cleared: bool,
    },
    /// An archive for this branch already existed and overwriting was refused.
    Declined { path: PathBuf },
}

// ---------------------------------------------------------------------------
// Workspace
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    dir: PathBuf,
}

impl Workspace {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            dir: paths::workspace_dir(root),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn state(&self) -> Result<WorkspaceState> {
        if io::is_dir_empty(&self.dir)? {
            Ok(WorkspaceState::Empty)
        } else {
            Ok(WorkspaceState::Populated)
        }
    }

    /// Top-level entry names, sorted.
    pub fn entries(&self) -> Result<Vec<String>> {
        io::list_entries(&self.dir)
    }

    /// Populate an empty workspace with the templates for `kind`.
    /// Returns the files written.
    pub fn init(&self, kind: WorkspaceKind, templates: &Templates) -> Result<Vec<PathBuf>> {
        if self.state()? == WorkspaceState::Populated {
            return Err(RddError::WorkspaceNotEmpty(
                paths::WORKSPACE_DIR.to_string(),
            ));
        }
        io::ensure_dir(&self.dir)?;

        let mut written = Vec::new();
        if kind == WorkspaceKind::Fix {
            let dest = self.dir.join(templates::FIX_TEMPLATE);
            templates.copy_to(templates::FIX_TEMPLATE, &dest)?;
            written.push(dest);
        }
        let journal = self.dir.join(paths::PROMPTS_JOURNAL);
        templates.copy_to(templates::PROMPTS_TEMPLATE, &journal)?;
        written.push(journal);

        debug!(kind = %kind, files = written.len(), "workspace initialized");
        Ok(written)
    }

    /// Where the archive for `branch` lives.
    pub fn archive_path(&self, branch: &str) -> PathBuf {
        paths::archive_root(&self.root).join(archive_folder_name(branch))
    }

    /// Copy the workspace into the branch's archive folder.
    ///
    /// `confirm_overwrite` is asked only when that folder already exists; a
    /// `false` answer leaves the existing archive and the workspace as they
    /// are. The workspace is cleared afterwards unless `keep` is set or some
    /// entry failed to copy.
    pub fn archive<F>(
        &self,
        branch: &str,
        provenance: &ArchiveProvenance,
        keep: bool,
        confirm_overwrite: F,
    ) -> Result<ArchiveOutcome>
    where
        F: FnOnce(&Path) -> Result<bool>,
    {
        if self.state()? == WorkspaceState::Empty {
            return Err(RddError::WorkspaceEmpty(paths::WORKSPACE_DIR.to_string()));
        }

        let target = self.archive_path(branch);
        if target.exists() {
            if !confirm_overwrite(&target)? {
                debug!(path = %target.display(), "archive overwrite declined");
                return Ok(ArchiveOutcome::Declined { path: target });
            }
            std::fs::remove_dir_all(&target)?;
        }

        let failures = io::copy_tree(&self.dir, &target)?;
        for failure in &failures {
            warn!(path = %failure.path.display(), error = %failure.error, "entry not archived");
        }

        let metadata = ArchiveMetadata {
            archived_at: Utc::now(),
            branch: branch.to_string(),
            archived_by: provenance.archived_by.clone(),
            last_commit: provenance.last_commit.clone(),
            last_commit_message: provenance.last_commit_message.clone(),
        };
        let data = serde_json::to_string_pretty(&metadata)?;
        io::atomic_write(&target.join(paths::ARCHIVE_METADATA), data.as_bytes())?;

        let cleared = !keep && failures.is_empty();
        if cleared {
            self.clear()?;
        }
        debug!(path = %target.display(), cleared, "workspace archived");
        Ok(ArchiveOutcome::Archived {
            path: target,
            failures,
            cleared,
        })
    }

    /// Remove everything inside the workspace. Returns how many top-level
    /// entries were removed.
    pub fn clear(&self) -> Result<usize> {
        let removed = io::clear_dir(&self.dir)?;
        debug!(removed, "workspace cleared");
        Ok(removed)
    }
}

/// Read `.archive-metadata` from an archive folder.
pub fn read_archive_metadata(archive_dir: &Path) -> Result<ArchiveMetadata> {
    let data = std::fs::read_to_string(archive_dir.join(paths::ARCHIVE_METADATA))?;
    Ok(serde_json::from_str(&data)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
