use rdd_core::paths::RDD_DOCS_DIR;
use std::path::{Path, PathBuf};

/// Resolve the repository root.
///
/// Priority:
/// 1. `--root` flag / `RDD_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `.rdd-docs/`
/// 3. Walk upward from `cwd` looking for `.git`
/// 4. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    resolve_root_from(explicit, &cwd)
}

pub fn resolve_root_from(explicit: Option<&Path>, cwd: &Path) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    if let Some(dir) = find_upward(cwd, |d| d.join(RDD_DOCS_DIR).is_dir()) {
        return dir;
    }
    // `.git` may be a file inside worktrees and submodules.
    if let Some(dir) = find_upward(cwd, |d| d.join(".git").exists()) {
        return dir;
    }
    cwd.to_path_buf()
}

fn find_upward(start: &Path, found: impl Fn(&Path) -> bool) -> Option<PathBuf> {
    start.ancestors().find(|d| found(d)).map(Path::to_path_buf)
}
