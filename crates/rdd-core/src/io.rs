use crate::error::Result;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Atomically write `data` to `path` using a tempfile in the same directory.
/// Prevents partial writes from corrupting the config document or journal.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Create a directory and all parents, idempotent.
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)?;
    Ok(())
}

/// Write a file only if it does not already exist. Returns true if written.
pub fn write_if_missing(path: &Path, data: &[u8]) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    atomic_write(path, data)?;
    Ok(true)
}

/// Append text to a file, creating it (and its parent) if it doesn't exist.
pub fn append_text(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut f = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    f.write_all(text.as_bytes())?;
    Ok(())
}

/// Add `entry` to `root/.gitignore` if it isn't already present.
///
/// Checks for an exact line match. Appends with a leading newline separator
/// if the file doesn't already end with one.
pub fn ensure_gitignore_entry(root: &Path, entry: &str) -> Result<()> {
    let gitignore = root.join(".gitignore");
    let existing = if gitignore.exists() {
        std::fs::read_to_string(&gitignore)?
    } else {
        String::new()
    };
    if existing.lines().any(|l| l == entry) {
        return Ok(());
    }
    let sep = if existing.is_empty() || existing.ends_with('\n') {
        ""
    } else {
        "\n"
    };
    let mut f = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&gitignore)?;
    writeln!(f, "{sep}{entry}")?;
    Ok(())
}

/// True if `dir` is missing or has no entries.
pub fn is_dir_empty(dir: &Path) -> Result<bool> {
    if !dir.is_dir() {
        return Ok(true);
    }
    Ok(std::fs::read_dir(dir)?.next().is_none())
}

/// Top-level entry names of `dir`, sorted. Missing directory yields an empty list.
pub fn list_entries(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        names.push(entry?.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

/// A single path that could not be copied during [`copy_tree`].
#[derive(Debug)]
pub struct CopyFailure {
    pub path: PathBuf,
    pub error: std::io::Error,
}

/// Recursively copy the contents of `src` into `dst`.
///
/// Best-effort: a file or directory that fails to copy is recorded and the
/// walk continues. Nothing already copied is rolled back.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<Vec<CopyFailure>> {
    std::fs::create_dir_all(dst)?;
    let mut failures = Vec::new();
    copy_tree_into(src, dst, &mut failures)?;
    Ok(failures)
}

fn copy_tree_into(src: &Path, dst: &Path, failures: &mut Vec<CopyFailure>) -> Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        let outcome = if entry.file_type()?.is_dir() {
            std::fs::create_dir_all(&to).map(|_| true)
        } else {
            std::fs::copy(&from, &to).map(|_| false)
        };
        match outcome {
            Ok(true) => {
                if let Err(e) = copy_tree_into(&from, &to, failures) {
                    failures.push(CopyFailure {
                        path: from,
                        error: std::io::Error::other(e.to_string()),
                    });
                }
            }
            Ok(false) => {}
            Err(error) => {
                tracing::warn!(path = %from.display(), %error, "copy failed");
                failures.push(CopyFailure { path: from, error });
            }
        }
    }
    Ok(())
}

/// Remove every entry inside `dir`, keeping `dir` itself. Returns the number
/// of top-level entries removed.
pub fn clear_dir(dir: &Path) -> Result<usize> {
    if !dir.is_dir() {
        return Ok(0);
    }
    let mut removed = 0;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            std::fs::remove_dir_all(&path)?;
        } else {
            std::fs::remove_file(&path)?;
        }
        removed += 1;
    }
    Ok(removed)
}
