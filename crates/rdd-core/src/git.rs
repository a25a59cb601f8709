//! Thin wrapper around the `git` executable.
//!
//! Every operation is a blocking subprocess call in the repository's working
//! directory. Failures carry the command and its stderr so callers can decide
//! whether a failure is fatal or just worth a warning.

use crate::error::{RddError, Result};
use std::path::PathBuf;
use std::process::{Command, Output};
use tracing::{debug, instrument};

pub const DEFAULT_REMOTE: &str = "origin";

/// One line of `git branch -a`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchEntry {
    pub name: String,
    pub current: bool,
}

/// How a file differs between two revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
    Other,
}

impl ChangeStatus {
    fn from_code(code: &str) -> Self {
        match code.chars().next() {
            Some('A') => ChangeStatus::Added,
            Some('M') => ChangeStatus::Modified,
            Some('D') => ChangeStatus::Deleted,
            Some('R') => ChangeStatus::Renamed,
            _ => ChangeStatus::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChangeStatus::Added => "added",
            ChangeStatus::Modified => "modified",
            ChangeStatus::Deleted => "deleted",
            ChangeStatus::Renamed => "renamed",
            ChangeStatus::Other => "changed",
        }
    }
}

/// Parsed `git diff --name-status` entry. Renames report the new path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub status: ChangeStatus,
    pub path: String,
}

#[derive(Debug, Clone)]
pub struct Git {
    program: PathBuf,
    workdir: PathBuf,
}

impl Git {
    /// Use whatever `git` resolves to on `PATH` at spawn time.
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            program: PathBuf::from("git"),
            workdir: workdir.into(),
        }
    }

    /// Locate `git` up front so a missing executable is reported clearly.
    pub fn locate(workdir: impl Into<PathBuf>) -> Result<Self> {
        let program = which::which("git").map_err(|_| RddError::GitNotFound)?;
        Ok(Self {
            program,
            workdir: workdir.into(),
        })
    }

    // -----------------------------------------------------------------------
    // Repository queries
    // -----------------------------------------------------------------------

    pub fn is_repo(&self) -> bool {
        self.run(&["rev-parse", "--is-inside-work-tree"])
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    pub fn require_repo(&self) -> Result<()> {
        if self.is_repo() {
            Ok(())
        } else {
            Err(RddError::NotGitRepo)
        }
    }

    /// Current branch name; errors on detached HEAD.
    #[instrument(skip_all)]
    pub fn current_branch(&self) -> Result<String> {
        let out = self.run_capture(&["branch", "--show-current"])?;
        let name = out.trim().to_string();
        if name.is_empty() {
            return Err(RddError::NoCurrentBranch);
        }
        debug!(branch = %name, "current branch");
        Ok(name)
    }

    pub fn branch_exists(&self, branch: &str) -> Result<bool> {
        let status = self
            .run(&[
                "show-ref",
                "--verify",
                "--quiet",
                &format!("refs/heads/{branch}"),
            ])?
            .status;
        Ok(status.success())
    }

    pub fn local_branches(&self) -> Result<Vec<String>> {
        let out = self.run_capture(&["branch", "--format=%(refname:short)"])?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Local and remote-tracking branches, as `git branch -a` lists them.
    pub fn list_branches_all(&self) -> Result<Vec<BranchEntry>> {
        let out = self.run_capture(&["branch", "-a"])?;
        Ok(parse_branch_list(&out))
    }

    /// `Name <email>` from git config; missing values are left blank.
    pub fn user_identity(&self) -> String {
        let get = |key: &str| {
            self.run_capture(&["config", key])
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };
        format!("{} <{}>", get("user.name"), get("user.email"))
    }

    /// Short status lines when there are staged, modified, or untracked files.
    /// Empty means the working tree is clean.
    #[instrument(skip_all)]
    pub fn uncommitted_changes(&self) -> Result<Vec<String>> {
        let tracked_dirty = !self
            .run(&["diff-index", "--quiet", "HEAD", "--"])?
            .status
            .success();
        let untracked = self.run_capture(&["ls-files", "--others", "--exclude-standard"])?;
        if !tracked_dirty && untracked.trim().is_empty() {
            debug!("working tree clean");
            return Ok(Vec::new());
        }
        let status = self.run_capture(&["status", "--short"])?;
        Ok(status
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(str::to_string)
            .collect())
    }

    pub fn head_commit(&self) -> Result<String> {
        Ok(self.run_capture(&["rev-parse", "HEAD"])?.trim().to_string())
    }

    /// First line of the last commit message.
    pub fn last_commit_subject(&self) -> Result<String> {
        let out = self.run_capture(&["log", "-1", "--pretty=%B"])?;
        Ok(out.lines().next().unwrap_or("").trim().to_string())
    }

    /// Number of commits in `base..HEAD`.
    pub fn commits_ahead(&self, base: &str) -> Result<u32> {
        self.count_commits(&format!("{base}..HEAD"))
    }

    /// Number of commits in `HEAD..target`, i.e. what a merge of `target` would bring in.
    pub fn commits_behind(&self, target: &str) -> Result<u32> {
        self.count_commits(&format!("HEAD..{target}"))
    }

    fn count_commits(&self, range: &str) -> Result<u32> {
        let out = self.run_capture(&["rev-list", "--count", range])?;
        out.trim().parse().map_err(|_| RddError::Git {
            command: format!("rev-list --count {range}"),
            stderr: format!("unexpected output: {}", out.trim()),
        })
    }

    /// `git log --oneline --graph` for `range`, at most `max` commits.
    pub fn log_graph(&self, range: &str, max: u32) -> Result<String> {
        let max = format!("--max-count={max}");
        self.run_capture(&["log", "--oneline", "--graph", &max, range])
    }

    pub fn diff_name_status(&self, range: &str) -> Result<Vec<FileChange>> {
        let out = self.run_capture(&["diff", "--name-status", range])?;
        Ok(out.lines().filter_map(parse_name_status_line).collect())
    }

    /// Paths left unmerged after a failed merge.
    pub fn unmerged_files(&self) -> Result<Vec<String>> {
        let out = self.run_capture(&["diff", "--name-only", "--diff-filter=U"])?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    pub fn remote_branch_exists(&self, remote: &str, branch: &str) -> Result<bool> {
        let out = self.run_capture(&["ls-remote", "--heads", remote, branch])?;
        Ok(!out.trim().is_empty())
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    #[instrument(skip_all, fields(branch))]
    pub fn checkout(&self, branch: &str) -> Result<()> {
        debug!(branch, "checking out branch");
        self.run_checked(&["checkout", branch])?;
        Ok(())
    }

    #[instrument(skip_all, fields(branch))]
    pub fn checkout_new_branch(&self, branch: &str) -> Result<()> {
        debug!(branch, "creating and checking out new branch");
        self.run_checked(&["checkout", "-b", branch])?;
        Ok(())
    }

    pub fn delete_branch(&self, branch: &str, force: bool) -> Result<()> {
        let flag = if force { "-D" } else { "-d" };
        self.run_checked(&["branch", flag, branch])?;
        Ok(())
    }

    pub fn fetch(&self, remote: &str, branch: Option<&str>) -> Result<()> {
        match branch {
            Some(b) => self.run_checked(&["fetch", remote, b, "--quiet"])?,
            None => self.run_checked(&["fetch", remote, "--quiet"])?,
        };
        Ok(())
    }

    pub fn pull(&self, remote: &str, branch: &str) -> Result<()> {
        self.run_checked(&["pull", remote, branch])?;
        Ok(())
    }

    pub fn push_upstream(&self, remote: &str, branch: &str) -> Result<()> {
        self.run_checked(&["push", "-u", remote, branch])?;
        Ok(())
    }

    pub fn push_delete(&self, remote: &str, branch: &str) -> Result<()> {
        self.run_checked(&["push", remote, "--delete", branch])?;
        Ok(())
    }

    pub fn add_all(&self) -> Result<()> {
        self.run_checked(&["add", "-A"])?;
        Ok(())
    }

    pub fn has_staged_changes(&self) -> Result<bool> {
        let status = self.run(&["diff", "--cached", "--quiet"])?.status;
        Ok(!status.success())
    }

    /// Commit what is staged. Returns `Ok(false)` when there was nothing to commit.
    #[instrument(skip_all)]
    pub fn commit(&self, message: &str) -> Result<bool> {
        if !self.has_staged_changes()? {
            debug!("no staged changes, skipping commit");
            return Ok(false);
        }
        self.run_checked(&["commit", "-m", message])?;
        Ok(true)
    }

    /// Stash tracked and untracked changes. Returns whether a stash entry was created.
    pub fn stash_push(&self, message: &str) -> Result<bool> {
        let out = self.run_capture(&["stash", "push", "--include-untracked", "-m", message])?;
        Ok(!out.contains("No local changes to save"))
    }

    pub fn stash_pop(&self) -> Result<()> {
        self.run_checked(&["stash", "pop"])?;
        Ok(())
    }

    /// Merge `target` into the current branch.
    ///
    /// A failed merge that leaves unmerged paths is reported as
    /// [`RddError::MergeConflict`]; the merge is not aborted.
    #[instrument(skip_all, fields(target))]
    pub fn merge(&self, target: &str) -> Result<()> {
        let output = self.run(&["merge", "--no-edit", target])?;
        if output.status.success() {
            return Ok(());
        }
        let conflicts = self.unmerged_files()?;
        if !conflicts.is_empty() {
            return Err(RddError::MergeConflict(conflicts));
        }
        Err(git_failure(&["merge", "--no-edit", target], &output))
    }

    // -----------------------------------------------------------------------
    // Plumbing
    // -----------------------------------------------------------------------

    fn run_capture(&self, args: &[&str]) -> Result<String> {
        let output = self.run_checked(args)?;
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn run_checked(&self, args: &[&str]) -> Result<Output> {
        let output = self.run(args)?;
        if !output.status.success() {
            return Err(git_failure(args, &output));
        }
        Ok(output)
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        debug!(args = %args.join(" "), "git");
        let output = Command::new(&self.program)
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    RddError::GitNotFound
                } else {
                    RddError::Io(e)
                }
            })?;
        Ok(output)
    }
}

fn git_failure(args: &[&str], output: &Output) -> RddError {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    RddError::Git {
        command: args.join(" "),
        stderr,
    }
}

fn parse_branch_list(out: &str) -> Vec<BranchEntry> {
    out.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|line| {
            let current = line.starts_with('*');
            let name = line.trim_start_matches('*').trim().to_string();
            BranchEntry { name, current }
        })
        .collect()
}

fn parse_name_status_line(line: &str) -> Option<FileChange> {
    let mut parts = line.split('\t');
    let code = parts.next()?.trim();
    if code.is_empty() {
        return None;
    }
    let path = parts.last()?.trim();
    if path.is_empty() {
        return None;
    }
    Some(FileChange {
        status: ChangeStatus::from_code(code),
        path: path.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
