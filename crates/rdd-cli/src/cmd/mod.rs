pub mod branch;
pub mod change;
pub mod config;
pub mod fix;
pub mod git;
pub mod prompt;
pub mod workspace;

use rdd_cli::output::Output;
use rdd_cli::prompt::Prompter;
use rdd_core::branch::resolve_default_branch;
use rdd_core::config::ConfigStore;
use rdd_core::git::Git;
use std::path::{Path, PathBuf};

/// Everything a command needs besides its own arguments.
pub struct Context {
    pub root: PathBuf,
    pub json: bool,
    pub out: Output,
    pub prompter: Prompter,
}

impl Context {
    pub fn config(&self) -> ConfigStore {
        ConfigStore::new(&self.root)
    }

    /// Git façade for the root, failing early outside a repository.
    pub fn git(&self) -> anyhow::Result<Git> {
        let git = Git::locate(&self.root)?;
        git.require_repo()?;
        Ok(git)
    }

    pub fn default_branch(&self, git: &Git) -> String {
        let local = git.local_branches().unwrap_or_default();
        resolve_default_branch(self.config().default_branch().as_deref(), &local)
    }

    pub fn local_only(&self) -> bool {
        self.config().local_only()
    }

    /// In local-only mode, announce that `what` is skipped and return true.
    pub fn skip_remote(&self, what: &str) -> bool {
        if self.local_only() {
            self.out.info(format!("Local-only mode: skipping {what}"));
            true
        } else {
            false
        }
    }

    /// `path` relative to the root, for display.
    pub fn rel(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .display()
            .to_string()
    }
}
