//! The prompt checklist in `.rdd-docs/workspace/.rdd.copilot-prompts.md`.
//!
//! Prompts are markdown task lines of the form `- [ ] [P01] description`.
//! Parsing keeps every line's raw text so that rewriting the file after a
//! change touches only the checkbox that changed.

use crate::error::{RddError, Result};
use crate::io;
use regex::Regex;
use serde::Serialize;
use std::ops::Range;
use std::path::Path;
use std::sync::OnceLock;

static PROMPT_RE: OnceLock<Regex> = OnceLock::new();

fn prompt_re() -> &'static Regex {
    PROMPT_RE.get_or_init(|| {
        Regex::new(r"^(\s*)-\s*\[(\s*|\s*[xX]\s*)\]\s*\[(P[0-9]+)\]\s*(.*?)\s*$").unwrap()
    })
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prompt {
    pub id: String,
    pub checked: bool,
    pub description: String,
    #[serde(skip)]
    pub indent: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptStatus {
    Unchecked,
    Checked,
    Absent,
}

impl PromptStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PromptStatus::Unchecked => "unchecked",
            PromptStatus::Checked => "checked",
            PromptStatus::Absent => "absent",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Unchecked,
    Checked,
}

impl StatusFilter {
    fn admits(self, prompt: &Prompt) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Unchecked => !prompt.checked,
            StatusFilter::Checked => prompt.checked,
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "all" => Ok(StatusFilter::All),
            "unchecked" => Ok(StatusFilter::Unchecked),
            "checked" => Ok(StatusFilter::Checked),
            other => Err(format!(
                "unknown status '{other}': expected all, unchecked, or checked"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    Marked,
    AlreadyCompleted,
}

#[derive(Debug, Clone)]
enum Line {
    Prompt {
        raw: String,
        /// Byte range of the checkbox contents inside `raw`; may be empty (`[]`).
        mark: Range<usize>,
        prompt: Prompt,
    },
    Text(String),
}

// ---------------------------------------------------------------------------
// Journal
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Journal {
    lines: Vec<Line>,
}

impl Journal {
    /// Read and parse the journal at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(RddError::JournalNotFound(path.display().to_string()));
        }
        Ok(Self::parse(&std::fs::read_to_string(path)?))
    }

    pub fn parse(text: &str) -> Self {
        let lines = text.split_inclusive('\n').map(parse_line).collect();
        Self { lines }
    }

    /// The journal text; untouched lines come back byte-for-byte.
    pub fn render(&self) -> String {
        self.lines
            .iter()
            .map(|line| match line {
                Line::Prompt { raw, .. } | Line::Text(raw) => raw.as_str(),
            })
            .collect()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        io::atomic_write(path, self.render().as_bytes())
    }

    pub fn prompts(&self) -> impl Iterator<Item = &Prompt> {
        self.lines.iter().filter_map(|line| match line {
            Line::Prompt { prompt, .. } => Some(prompt),
            Line::Text(_) => None,
        })
    }

    pub fn list(&self, filter: StatusFilter) -> Vec<&Prompt> {
        self.prompts().filter(|p| filter.admits(p)).collect()
    }

    /// Status of the first prompt with `id`.
    pub fn status(&self, id: &str) -> PromptStatus {
        match self.prompts().find(|p| p.id == id) {
            Some(p) if p.checked => PromptStatus::Checked,
            Some(_) => PromptStatus::Unchecked,
            None => PromptStatus::Absent,
        }
    }

    /// Check the box of prompt `id`. Never unchecks anything.
    pub fn mark_completed(&mut self, id: &str) -> Result<MarkOutcome> {
        let count = self.prompts().filter(|p| p.id == id).count();
        match count {
            0 => return Err(RddError::PromptNotFound(id.to_string())),
            1 => {}
            _ => return Err(RddError::DuplicatePrompt(id.to_string())),
        }

        for line in &mut self.lines {
            let Line::Prompt {
                raw,
                mark,
                prompt,
            } = line
            else {
                continue;
            };
            if prompt.id != id {
                continue;
            }
            if prompt.checked {
                return Ok(MarkOutcome::AlreadyCompleted);
            }
            raw.replace_range(mark.clone(), "x");
            prompt.checked = true;
            return Ok(MarkOutcome::Marked);
        }
        Err(RddError::PromptNotFound(id.to_string()))
    }
}

/// Load the journal at `path`, check prompt `id`, and write it back only
/// when something changed.
pub fn mark_completed(path: &Path, id: &str) -> Result<MarkOutcome> {
    let mut journal = Journal::load(path)?;
    let outcome = journal.mark_completed(id)?;
    if outcome == MarkOutcome::Marked {
        journal.save(path)?;
        tracing::debug!(id, path = %path.display(), "prompt marked completed");
    }
    Ok(outcome)
}

fn parse_line(raw: &str) -> Line {
    let content = raw.trim_end_matches(['\n', '\r']);
    let Some(caps) = prompt_re().captures(content) else {
        return Line::Text(raw.to_string());
    };
    let prompt = Prompt {
        id: caps[3].to_string(),
        checked: caps[2].trim().eq_ignore_ascii_case("x"),
        description: caps[4].to_string(),
        indent: caps[1].to_string(),
    };
    let mark = caps.get(2).map(|m| m.range()).unwrap_or_default();
    Line::Prompt {
        raw: raw.to_string(),
        mark,
        prompt,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
