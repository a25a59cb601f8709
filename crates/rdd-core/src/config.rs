//! Flat key-value settings persisted at `.rdd-docs/config.json`.
//!
//! The document is re-read on every access. Reads never fail: a missing or
//! unreadable document behaves like an empty one. Writes merge a single key
//! into the existing object and restamp `lastModified`.

use crate::error::{RddError, Result};
use crate::paths;
use chrono::{DateTime, Duration, SecondsFormat, Timelike, Utc};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub const KEY_DEFAULT_BRANCH: &str = "defaultBranch";
pub const KEY_LOCAL_ONLY: &str = "localOnly";
pub const KEY_VERSION: &str = "version";
pub const KEY_CREATED: &str = "created";
pub const KEY_LAST_MODIFIED: &str = "lastModified";

/// Keys shown in `config --help` style listings, with a short description.
pub const KNOWN_KEYS: &[(&str, &str)] = &[
    (KEY_DEFAULT_BRANCH, "The default branch for creating changes"),
    (KEY_LOCAL_ONLY, "Skip all remote git operations (true/false)"),
    (KEY_VERSION, "Framework version recorded for this repository"),
];

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store rooted at `<root>/.rdd-docs/config.json`.
    pub fn new(root: &Path) -> Self {
        Self {
            path: paths::config_path(root),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// The whole document, or `None` if it is missing or unreadable.
    pub fn document(&self) -> Option<Map<String, Value>> {
        match self.read_strict() {
            Ok(map) => map,
            Err(e) => {
                tracing::debug!(
                    path = %self.path.display(),
                    error = %e,
                    "config unreadable, treating as empty"
                );
                None
            }
        }
    }

    /// Value for `key`, or `None` when absent or the document is unreadable.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.document().and_then(|mut doc| doc.remove(key))
    }

    /// String rendering of `key`, falling back to `default`.
    pub fn get_string(&self, key: &str, default: &str) -> String {
        self.get(key)
            .map(|v| display_value(&v))
            .unwrap_or_else(|| default.to_string())
    }

    /// Configured default branch, if any.
    pub fn default_branch(&self) -> Option<String> {
        let name = self.get_string(KEY_DEFAULT_BRANCH, "");
        let name = name.trim();
        (!name.is_empty()).then(|| name.to_string())
    }

    /// Local-only mode. Accepts a JSON boolean or the strings `"true"`/`"1"`.
    pub fn local_only(&self) -> bool {
        match self.get(KEY_LOCAL_ONLY) {
            Some(Value::Bool(b)) => b,
            Some(Value::String(s)) => matches!(s.as_str(), "true" | "True" | "1"),
            _ => false,
        }
    }

    /// Merge `key = value` into the document and write it back.
    ///
    /// Creates the document and its parent directory when missing. An existing
    /// document that cannot be parsed is left untouched and reported.
    pub fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut doc = self.read_strict()?.unwrap_or_default();
        doc.insert(key.to_string(), value);
        self.write(doc)
    }

    /// Record the chosen default branch plus `created`, keeping other keys.
    pub fn initialize(&self, default_branch: &str) -> Result<()> {
        let mut doc = self.read_strict()?.unwrap_or_default();
        doc.insert(
            KEY_DEFAULT_BRANCH.to_string(),
            Value::String(default_branch.to_string()),
        );
        let created = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        doc.insert(KEY_CREATED.to_string(), Value::String(created));
        self.write(doc)
    }

    fn read_strict(&self) -> Result<Option<Map<String, Value>>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&self.path)?;
        if data.trim().is_empty() {
            return Ok(Some(Map::new()));
        }
        match serde_json::from_str::<Value>(&data)? {
            Value::Object(map) => Ok(Some(map)),
            _ => Err(RddError::Json(serde::de::Error::custom(
                "config document is not a JSON object",
            ))),
        }
    }

    fn write(&self, mut doc: Map<String, Value>) -> Result<()> {
        let previous = doc
            .get(KEY_LAST_MODIFIED)
            .and_then(Value::as_str)
            .map(str::to_string);
        let stamp = next_timestamp(previous.as_deref(), Utc::now());
        doc.insert(KEY_LAST_MODIFIED.to_string(), Value::String(stamp));

        let mut data = serde_json::to_string_pretty(&Value::Object(doc))?;
        data.push('\n');
        crate::io::atomic_write(&self.path, data.as_bytes())?;
        tracing::debug!(path = %self.path.display(), "config written");
        Ok(())
    }
}

/// Interpret a CLI-supplied value: `true`/`false` become booleans, anything
/// else is kept as a string.
pub fn parse_value(raw: &str) -> Value {
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        other => Value::String(other.to_string()),
    }
}

/// Render a value for display without JSON quoting of plain strings.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A `lastModified` stamp that sorts strictly after `previous`.
fn next_timestamp(previous: Option<&str>, now: DateTime<Utc>) -> String {
    let fmt = |t: DateTime<Utc>| t.to_rfc3339_opts(SecondsFormat::Micros, true);
    let Some(prev_raw) = previous else {
        return fmt(now);
    };
    let Ok(prev) = DateTime::parse_from_rfc3339(prev_raw) else {
        return fmt(now);
    };
    let prev = prev.with_timezone(&Utc);

    let mut candidate = if now > prev {
        now
    } else {
        prev + Duration::microseconds(1)
    };
    if fmt(candidate).as_str() <= prev_raw {
        // Previous stamp had no fractional part; only the next second sorts after it.
        candidate = prev.with_nanosecond(0).unwrap_or(prev) + Duration::seconds(1);
    }
    fmt(candidate)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
