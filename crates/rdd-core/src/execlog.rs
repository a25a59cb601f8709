//! Append-only JSON-lines log of prompt executions (`workspace/log.jsonl`).

use crate::error::Result;
use crate::io;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    pub timestamp: DateTime<Utc>,
    pub prompt_id: String,
    pub execution_details: String,
    pub session_id: String,
}

/// Session identifier of the form `exec-YYYYMMDD-HHMM`.
pub fn session_id(now: DateTime<Local>) -> String {
    format!("exec-{}", now.format("%Y%m%d-%H%M"))
}

/// Append one record to the log at `path`, creating it if needed.
pub fn log_execution(
    path: &Path,
    prompt_id: &str,
    details: &str,
    session_id: &str,
) -> Result<ExecutionRecord> {
    let record = ExecutionRecord {
        timestamp: Utc::now(),
        prompt_id: prompt_id.to_string(),
        execution_details: details.to_string(),
        session_id: session_id.to_string(),
    };
    let mut line = serde_json::to_string(&record)?;
    line.push('\n');
    io::append_text(path, &line)?;
    tracing::debug!(prompt_id, session_id, "execution logged");
    Ok(record)
}

/// Every well-formed record in the log. Malformed lines are skipped.
pub fn read_all(path: &Path) -> Result<Vec<ExecutionRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let data = std::fs::read_to_string(path)?;
    let mut records = Vec::new();
    for (n, line) in data.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(line) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!(line = n + 1, error = %e, "skipping malformed log line"),
        }
    }
    Ok(records)
}
