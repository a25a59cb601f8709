use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const RDD_DOCS_DIR: &str = ".rdd-docs";
pub const WORKSPACE_DIR: &str = ".rdd-docs/workspace";
pub const ARCHIVE_DIR: &str = ".rdd-docs/archive";
pub const TEMPLATES_DIR: &str = ".rdd/templates";

pub const CONFIG_FILE: &str = ".rdd-docs/config.json";

pub const PROMPTS_JOURNAL: &str = ".rdd.copilot-prompts.md";
pub const EXECUTION_LOG: &str = "log.jsonl";
pub const ARCHIVE_METADATA: &str = ".archive-metadata";

/// Line added to `.gitignore` so the scratch area never gets committed.
pub const WORKSPACE_GITIGNORE_ENTRY: &str = ".rdd-docs/workspace/";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn rdd_docs_dir(root: &Path) -> PathBuf {
    root.join(RDD_DOCS_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn workspace_dir(root: &Path) -> PathBuf {
    root.join(WORKSPACE_DIR)
}

pub fn archive_root(root: &Path) -> PathBuf {
    root.join(ARCHIVE_DIR)
}

pub fn templates_dir(root: &Path) -> PathBuf {
    root.join(TEMPLATES_DIR)
}

pub fn journal_path(root: &Path) -> PathBuf {
    workspace_dir(root).join(PROMPTS_JOURNAL)
}

pub fn execution_log_path(root: &Path) -> PathBuf {
    workspace_dir(root).join(EXECUTION_LOG)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
