//! Template lookup for `.rdd-docs/` and the change workspace.
//!
//! A file in `.rdd/templates/<name>` wins over the built-in copy, so a
//! repository can customize any template without rebuilding the binary.

use crate::error::{RddError, Result};
use crate::{io, paths};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const FIX_TEMPLATE: &str = "fix.md";
pub const PROMPTS_TEMPLATE: &str = "copilot-prompts.md";
pub const CONFIG_TEMPLATE: &str = "config.json";

/// Documents that always live at the top of `.rdd-docs/`.
pub const CORE_TEMPLATES: &[&str] = &[
    "backlog.md",
    "requirements.md",
    "tech-spec.md",
    "folder-structure.md",
    "data-model.md",
    CONFIG_TEMPLATE,
];

#[derive(Debug, Clone)]
pub struct Templates {
    dir: PathBuf,
}

impl Templates {
    pub fn new(root: &Path) -> Self {
        Self {
            dir: paths::templates_dir(root),
        }
    }

    /// Template body by name: repository override first, then built-in.
    pub fn load(&self, name: &str) -> Result<String> {
        let custom = self.dir.join(name);
        if custom.is_file() {
            debug!(template = name, path = %custom.display(), "using repository template");
            return Ok(std::fs::read_to_string(custom)?);
        }
        builtin(name)
            .map(str::to_string)
            .ok_or_else(|| RddError::TemplateNotFound(name.to_string()))
    }

    /// Write template `name` to `dest`, replacing whatever is there.
    pub fn copy_to(&self, name: &str, dest: &Path) -> Result<()> {
        let body = self.load(name)?;
        io::atomic_write(dest, body.as_bytes())?;
        debug!(template = name, dest = %dest.display(), "template copied");
        Ok(())
    }
}

/// Result of [`init_docs`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DocsInit {
    /// Core templates written this run.
    pub created: Vec<String>,
    /// True when `config.json` did not exist before; the caller should pick
    /// a default branch and initialize it.
    pub config_created: bool,
}

/// Make sure `.rdd-docs/` holds every core template and that the workspace
/// is git-ignored. Existing files are never overwritten.
pub fn init_docs(root: &Path, templates: &Templates) -> Result<DocsInit> {
    let docs = paths::rdd_docs_dir(root);
    io::ensure_dir(&docs)?;

    let mut result = DocsInit::default();
    for name in CORE_TEMPLATES {
        let body = templates.load(name)?;
        if io::write_if_missing(&docs.join(name), body.as_bytes())? {
            debug!(template = name, "core template created");
            result.created.push((*name).to_string());
            if *name == CONFIG_TEMPLATE {
                result.config_created = true;
            }
        }
    }
    io::ensure_gitignore_entry(root, paths::WORKSPACE_GITIGNORE_ENTRY)?;
    Ok(result)
}

fn builtin(name: &str) -> Option<&'static str> {
    let body = match name {
        "backlog.md" => BACKLOG_MD,
        "requirements.md" => REQUIREMENTS_MD,
        "tech-spec.md" => TECH_SPEC_MD,
        "folder-structure.md" => FOLDER_STRUCTURE_MD,
        "data-model.md" => DATA_MODEL_MD,
        CONFIG_TEMPLATE => CONFIG_JSON,
        FIX_TEMPLATE => FIX_MD,
        PROMPTS_TEMPLATE => COPILOT_PROMPTS_MD,
        _ => return None,
    };
    Some(body)
}

// ---------------------------------------------------------------------------
// Built-in templates
// ---------------------------------------------------------------------------

const BACKLOG_MD: &str = r#"# Backlog

Ideas and requests that are not scheduled yet. Move an item into a change
when work starts.

## Items

- [ ]
"#;

const REQUIREMENTS_MD: &str = r#"# Requirements

## General Functionalities

## Functional Requirements

## Non-Functional Requirements

## Technical Requirements
"#;

const TECH_SPEC_MD: &str = r#"# Technical Specification

## System Overview

## Architecture

## Technology Stack

## Development Standards

## Deployment
"#;

const FOLDER_STRUCTURE_MD: &str = r#"# Folder Structure

```
.
├── .rdd-docs/            # requirements, specs, archives
│   ├── workspace/        # scratch area for the active change (git-ignored)
│   └── archive/          # one folder per wrapped-up change
└── ...
```
"#;

const DATA_MODEL_MD: &str = r#"# Data Model

## Entities

## Relationships
"#;

const CONFIG_JSON: &str = r#"{
  "version": "1.0.0",
  "defaultBranch": "main",
  "localOnly": false
}
"#;

const FIX_MD: &str = r#"# Fix

## What is the problem?

## How to reproduce

## Expected behavior

## Root cause

## Solution
"#;

const COPILOT_PROMPTS_MD: &str = r#"# Prompts

Check a prompt off with `rdd prompt mark-completed <id>` once it has run.

## Stand Alone Prompts

 - [ ] [P01] Describe the change in `.rdd-docs/workspace/` and list the affected requirements.

 - [ ] [P02] Implement the change described in the workspace.

 - [ ] [P03] Update `.rdd-docs/requirements.md` and `.rdd-docs/tech-spec.md` to match the implementation.
"#;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
