//! Name normalization and validation for change names and branch names.

use crate::error::{RddError, Result};
use regex::Regex;
use std::sync::OnceLock;

/// Maximum number of hyphen-separated words in a change name.
pub const MAX_NAME_WORDS: usize = 5;

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Normalize free text to kebab-case: `"Add User Auth"` → `"add-user-auth"`.
///
/// Returns `None` when nothing usable remains.
pub fn normalize(raw: &str) -> Option<String> {
    normalize_with(raw, false)
}

/// Like [`normalize`] but keeps `/` so path-like names (`feature/login`) survive.
///
/// The result is meant to be a git ref, so slashes are cleaned up too: runs
/// of `/` collapse, a hyphen touching a slash is dropped, and `/` is trimmed
/// from both ends along with `-`.
pub fn normalize_path(raw: &str) -> Option<String> {
    normalize_with(raw, true)
}

fn normalize_with(raw: &str, keep_slash: bool) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    for c in raw.to_lowercase().chars() {
        let c = if c == '_' || c == ' ' { '-' } else { c };
        let allowed =
            c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || (keep_slash && c == '/');
        if !allowed {
            continue;
        }
        // Collapse runs; a hyphen next to a slash adds nothing.
        if c == '-' && (out.ends_with('-') || out.ends_with('/')) {
            continue;
        }
        if c == '/' {
            if out.ends_with('/') {
                continue;
            }
            if out.ends_with('-') {
                out.pop();
            }
        }
        out.push(c);
    }
    let trimmed = out.trim_matches(|c| c == '-' || c == '/');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

static NAME_RE: OnceLock<Regex> = OnceLock::new();
static BRANCH_RE: OnceLock<Regex> = OnceLock::new();
static REF_RE: OnceLock<Regex> = OnceLock::new();

fn name_re() -> &'static Regex {
    NAME_RE.get_or_init(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").unwrap())
}

fn branch_re() -> &'static Regex {
    BRANCH_RE.get_or_init(|| Regex::new(r"^(enh|fix)/[0-9]{8}-[0-9]{4}-[a-z0-9-]+$").unwrap())
}

fn ref_re() -> &'static Regex {
    REF_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9._][A-Za-z0-9._/-]*$").unwrap())
}

/// A change name must be kebab-case with at most [`MAX_NAME_WORDS`] words.
pub fn validate_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| RddError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };
    if name.is_empty() {
        return Err(invalid("name cannot be empty"));
    }
    if !name_re().is_match(name) {
        return Err(invalid(
            "must be kebab-case (lowercase, hyphens only, no spaces)",
        ));
    }
    let words = name.split('-').count();
    if words > MAX_NAME_WORDS {
        return Err(invalid(&format!(
            "too long: {words} words (maximum {MAX_NAME_WORDS})"
        )));
    }
    Ok(())
}

/// Strict work-branch grammar: `{enh|fix}/{YYYYMMDD}-{HHMM}-{kebab-name}`.
pub fn validate_branch_name(branch: &str) -> Result<()> {
    if branch_re().is_match(branch) {
        Ok(())
    } else {
        Err(RddError::InvalidBranchName(branch.to_string()))
    }
}

/// Loose check for a user-supplied default branch such as `dev` or `release/2.x`.
pub fn validate_ref_name(name: &str) -> Result<()> {
    let ok = ref_re().is_match(name)
        && !name.contains("..")
        && !name.contains("//")
        && !name.ends_with('/')
        && !name.ends_with(".lock");
    if ok {
        Ok(())
    } else {
        Err(RddError::InvalidName {
            name: name.to_string(),
            reason: "not a usable git branch name".to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
