use super::Context;
use anyhow::Context as _;
use chrono::Local;
use clap::Subcommand;
use rdd_cli::exit_codes::Outcome;
use rdd_cli::output::{print_json, print_table};
use rdd_core::journal::{self, Journal, MarkOutcome, PromptStatus, StatusFilter};
use rdd_core::{execlog, paths, RddError};

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum PromptSubcommand {
    /// Check off a prompt in the workspace journal
    MarkCompleted {
        /// Prompt id, e.g. P01
        id: String,
    },

    /// Append an execution record to the workspace log
    LogExecution {
        /// Prompt id, e.g. P01
        id: String,
        /// What was done
        details: String,
    },

    /// List prompts in the journal
    List {
        /// Filter: all, unchecked, or checked
        #[arg(long, default_value = "all")]
        status: StatusFilter,
    },

    /// Show whether a prompt is checked
    Status {
        /// Prompt id, e.g. P01
        id: String,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(ctx: &mut Context, subcmd: PromptSubcommand) -> anyhow::Result<Outcome> {
    let journal_path = paths::journal_path(&ctx.root);
    match subcmd {
        PromptSubcommand::MarkCompleted { id } => {
            match journal::mark_completed(&journal_path, &id)? {
                MarkOutcome::Marked => {
                    ctx.out.success(format!("Marked prompt {id} as completed"));
                }
                MarkOutcome::AlreadyCompleted => {
                    ctx.out.warning(format!("Prompt {id} is already marked as completed"));
                }
            }
            Ok(Outcome::Done)
        }

        PromptSubcommand::LogExecution { id, details } => {
            let log_path = paths::execution_log_path(&ctx.root);
            let session = execlog::session_id(Local::now());
            let record = execlog::log_execution(&log_path, &id, &details, &session)
                .with_context(|| format!("failed to write {}", ctx.rel(&log_path)))?;
            if ctx.json {
                print_json(&record)?;
            } else {
                ctx.out.success(format!(
                    "Logged execution of {id} to {}",
                    ctx.rel(&log_path)
                ));
            }
            Ok(Outcome::Done)
        }

        PromptSubcommand::List { status } => {
            let journal = Journal::load(&journal_path)?;
            let prompts = journal.list(status);
            if ctx.json {
                print_json(&prompts)?;
                return Ok(Outcome::Done);
            }
            if prompts.is_empty() {
                ctx.out.info("No prompts found");
                return Ok(Outcome::Done);
            }
            let rows = prompts
                .iter()
                .map(|p| {
                    let state = if p.checked { "checked" } else { "unchecked" };
                    vec![p.id.clone(), state.to_string(), p.description.clone()]
                })
                .collect();
            print_table(&["ID", "STATUS", "DESCRIPTION"], rows);
            Ok(Outcome::Done)
        }

        PromptSubcommand::Status { id } => {
            let journal = Journal::load(&journal_path)?;
            let status = journal.status(&id);
            if ctx.json {
                print_json(&serde_json::json!({ "id": id, "status": status }))?;
            } else {
                ctx.out.info(format!("{id}: {}", status.as_str()));
            }
            if status == PromptStatus::Absent {
                return Err(RddError::PromptNotFound(id).into());
            }
            Ok(Outcome::Done)
        }
    }
}
