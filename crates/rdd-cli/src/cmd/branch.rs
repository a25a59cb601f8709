use super::Context;
use anyhow::Context as _;
use chrono::Local;
use clap::Subcommand;
use colored::Colorize;
use rdd_cli::exit_codes::Outcome;
use rdd_cli::output::print_json;
use rdd_core::branch::{self, ChangeKind};
use rdd_core::git::{Git, DEFAULT_REMOTE};
use rdd_core::naming;
use rdd_core::RddError;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum BranchSubcommand {
    /// Create a timestamped work branch from the default branch
    Create {
        /// Branch type: enh or fix
        kind: String,
        /// Kebab-case name, at most five words
        name: String,
    },

    /// Delete a branch locally and on the remote
    Delete {
        /// Branch to delete (default: current branch)
        name: Option<String>,
        /// Delete even if not fully merged
        #[arg(long)]
        force: bool,
    },

    /// Switch to the default branch, pull, and delete a merged branch
    Cleanup {
        /// Branch to delete (asked interactively when omitted)
        name: Option<String>,
    },

    /// List local and remote branches
    List {
        /// Only show branches containing this text
        filter: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(ctx: &mut Context, subcmd: BranchSubcommand) -> anyhow::Result<Outcome> {
    match subcmd {
        BranchSubcommand::Create { kind, name } => {
            let kind: ChangeKind = kind.parse()?;
            let git = ctx.git()?;
            create_work_branch(ctx, &git, kind, &name)?;
            Ok(Outcome::Done)
        }
        BranchSubcommand::Delete { name, force } => delete(ctx, name, force),
        BranchSubcommand::Cleanup { name } => cleanup(ctx, name),
        BranchSubcommand::List { filter } => list(ctx, filter.as_deref()),
    }
}

// ---------------------------------------------------------------------------
// create
// ---------------------------------------------------------------------------

/// Create `{kind}/{YYYYMMDD-HHMM}-{name}` from a freshly pulled default branch
/// and check it out. Returns the full branch name.
pub fn create_work_branch(
    ctx: &Context,
    git: &Git,
    kind: ChangeKind,
    name: &str,
) -> anyhow::Result<String> {
    naming::validate_name(name)?;

    let stamp = branch::branch_timestamp(Local::now());
    let full = branch::format_work_branch(kind, &stamp, name);
    if git.branch_exists(&full)? {
        return Err(RddError::BranchExists(full).into());
    }

    let default = ctx.default_branch(git);
    let out = &ctx.out;
    out.step(format!("Creating new branch: {full}"));

    out.info(format!("Switching to '{default}' and pulling latest changes..."));
    git.checkout(&default)
        .with_context(|| format!("failed to checkout '{default}'"))?;
    if !ctx.skip_remote("pull") {
        if let Err(e) = git.pull(DEFAULT_REMOTE, &default) {
            tracing::debug!(error = %e, "pull failed");
            out.warning("Failed to pull from origin (continuing anyway)");
        }
    }

    out.info(format!("Creating branch '{full}'..."));
    git.checkout_new_branch(&full)
        .context("failed to create branch")?;

    out.success(format!("Created and checked out branch: {full}"));
    out.blank();
    out.info("Branch details:");
    out.line(format!("  Type: {}", kind.prefix()));
    out.line(format!("  Name: {name}"));
    out.line(format!("  ID: {stamp}-{name}"));
    out.line(format!("  Full: {full}"));
    Ok(full)
}

// ---------------------------------------------------------------------------
// delete
// ---------------------------------------------------------------------------

fn delete(ctx: &mut Context, name: Option<String>, force: bool) -> anyhow::Result<Outcome> {
    let git = ctx.git()?;
    let name = match name {
        Some(n) => n,
        None => git.current_branch()?,
    };
    let default = ctx.default_branch(&git);
    if !branch::is_valid_work_branch(&name, &default) {
        return Err(RddError::ProtectedBranch(name).into());
    }

    let out = ctx.out;
    if let Err(e) = naming::validate_branch_name(&name) {
        tracing::debug!(error = %e, "not a work branch name");
        out.warning(format!(
            "'{name}' is not a work branch ({{enh|fix}}/YYYYMMDD-HHMM-name)"
        ));
    }
    out.info("Checking for uncommitted changes...");
    ensure_clean(ctx, &git)?;
    out.blank();

    if !git.branch_exists(&name)? {
        return Err(RddError::BranchNotFound(name).into());
    }

    out.info(format!("Switching to branch '{default}'..."));
    git.checkout(&default)
        .with_context(|| format!("failed to checkout '{default}'"))?;
    out.blank();

    out.info(format!("Deleting local branch '{name}'..."));
    git.delete_branch(&name, force)
        .context("failed to delete local branch")?;
    out.success(if force {
        "Local branch force-deleted"
    } else {
        "Local branch deleted"
    });
    out.blank();

    delete_remote(ctx, &git, &name);
    Ok(Outcome::Done)
}

/// Fail with the `git status --short` listing when the tree is dirty.
pub fn ensure_clean(ctx: &Context, git: &Git) -> anyhow::Result<()> {
    let changes = git.uncommitted_changes()?;
    if changes.is_empty() {
        return Ok(());
    }
    ctx.out.info("Uncommitted changes:");
    for line in &changes {
        ctx.out.line(format!("  {line}"));
    }
    Err(RddError::UncommittedChanges(changes).into())
}

/// Remove `origin/<name>` if it exists. Failures are warnings only.
fn delete_remote(ctx: &Context, git: &Git, name: &str) {
    let out = &ctx.out;
    if ctx.skip_remote(&format!("remote deletion of '{name}'")) {
        return;
    }
    match git.remote_branch_exists(DEFAULT_REMOTE, name) {
        Ok(true) => {
            out.info(format!("Deleting remote branch '{DEFAULT_REMOTE}/{name}'..."));
            match git.push_delete(DEFAULT_REMOTE, name) {
                Ok(()) => out.success("Remote branch deleted"),
                Err(e) => {
                    tracing::debug!(error = %e, "remote delete failed");
                    out.warning("Failed to delete remote branch (it may not exist)");
                }
            }
        }
        Ok(false) => out.info("Remote branch does not exist (already deleted)"),
        Err(e) => {
            tracing::debug!(error = %e, "ls-remote failed");
            out.warning("Could not query the remote for this branch");
        }
    }
}

// ---------------------------------------------------------------------------
// cleanup
// ---------------------------------------------------------------------------

fn cleanup(ctx: &mut Context, name: Option<String>) -> anyhow::Result<Outcome> {
    let git = ctx.git()?;
    let out = ctx.out;
    out.banner("POST-MERGE CLEANUP", None);

    let default = ctx.default_branch(&git);
    let current = git.current_branch()?;

    let name = match name {
        Some(n) => Some(n),
        None => ask_branch_to_delete(ctx, &current, &default)?,
    };
    if let Some(n) = &name {
        if !branch::is_valid_work_branch(n, &default) {
            return Err(RddError::ProtectedBranch(n.clone()).into());
        }
    }

    out.step(format!("1. Switching to '{default}' branch"));
    if current != default {
        git.checkout(&default)
            .with_context(|| format!("failed to checkout '{default}'"))?;
        out.success(format!("Switched to '{default}'"));
    } else {
        out.info(format!("Already on '{default}'"));
    }
    out.blank();

    out.step("2. Fetching latest changes from remote");
    if !ctx.skip_remote("fetch") {
        match git.fetch(DEFAULT_REMOTE, None) {
            Ok(()) => out.success("Fetched latest changes"),
            Err(e) => {
                tracing::debug!(error = %e, "fetch failed");
                out.warning("Failed to fetch from remote");
            }
        }
    }
    out.blank();

    out.step(format!("3. Pulling latest changes for '{default}'"));
    if !ctx.skip_remote("pull") {
        match git.pull(DEFAULT_REMOTE, &default) {
            Ok(()) => out.success("Pulled latest changes"),
            Err(e) => {
                tracing::debug!(error = %e, "pull failed");
                out.warning("Failed to pull latest changes");
            }
        }
    }
    out.blank();

    if let Some(n) = &name {
        out.step(format!("4. Deleting branch '{n}'"));
        delete_merged_local(ctx, &git, n)?;
        delete_remote(ctx, &git, n);
        out.blank();
    }

    out.banner("CLEANUP COMPLETE", None);
    out.success("Post-merge cleanup completed successfully!");
    out.blank();
    out.info("Summary:");
    out.line(format!("  • Switched to '{default}' branch"));
    if !ctx.local_only() {
        out.line("  • Fetched and pulled latest changes");
    }
    if let Some(n) = &name {
        out.line(format!("  • Deleted branch '{n}'"));
    }
    Ok(Outcome::Done)
}

fn ask_branch_to_delete(
    ctx: &mut Context,
    current: &str,
    default: &str,
) -> anyhow::Result<Option<String>> {
    if current != default {
        ctx.out.info(format!("Current branch: {current}"));
        if ctx.prompter.confirm("Delete current branch after cleanup?")? {
            return Ok(Some(current.to_string()));
        }
    }
    let answer = ctx
        .prompter
        .ask("Enter branch name to delete (or press Enter to skip):")?;
    if answer.is_empty() {
        ctx.out.info("No branch specified for deletion");
        Ok(None)
    } else {
        Ok(Some(answer))
    }
}

/// `-d` first; when git refuses an unmerged branch, offer `-D`.
fn delete_merged_local(ctx: &mut Context, git: &Git, name: &str) -> anyhow::Result<()> {
    let out = ctx.out;
    if !git.branch_exists(name)? {
        out.info("Local branch does not exist (already deleted)");
        return Ok(());
    }
    match git.delete_branch(name, false) {
        Ok(()) => out.success("Local branch deleted"),
        Err(e) => {
            tracing::debug!(error = %e, "safe delete refused");
            out.warning("Branch not fully merged");
            if ctx.prompter.confirm("Force delete local branch?")? {
                git.delete_branch(name, true)
                    .context("failed to force-delete local branch")?;
                out.success("Local branch force-deleted");
            } else {
                out.info("Local branch kept");
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

fn list(ctx: &Context, filter: Option<&str>) -> anyhow::Result<Outcome> {
    let git = ctx.git()?;
    let entries: Vec<_> = git
        .list_branches_all()?
        .into_iter()
        .filter(|b| filter.map_or(true, |f| b.name.contains(f)))
        .collect();

    if ctx.json {
        let json: Vec<_> = entries
            .iter()
            .map(|b| serde_json::json!({ "name": b.name, "current": b.current }))
            .collect();
        print_json(&json)?;
        return Ok(Outcome::Done);
    }

    ctx.out.step("Listing branches...");
    ctx.out.blank();
    for b in &entries {
        if b.current {
            println!("{}", format!("* {}", b.name).green());
        } else {
            println!("  {}", b.name);
        }
    }
    Ok(Outcome::Done)
}
