use super::Context;
use anyhow::Context as _;
use chrono::Local;
use clap::Subcommand;
use colored::Colorize;
use rdd_cli::exit_codes::Outcome;
use rdd_cli::output::print_json;
use rdd_core::git::{ChangeStatus, FileChange, Git, DEFAULT_REMOTE};
use rdd_core::RddError;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum GitSubcommand {
    /// Compare the current branch with the default branch
    Compare,

    /// List files changed relative to the default branch
    ModifiedFiles,

    /// Push the current branch with upstream tracking
    Push,

    /// Merge the latest default branch into the current branch
    UpdateFromMain,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(ctx: &mut Context, subcmd: GitSubcommand) -> anyhow::Result<Outcome> {
    let git = ctx.git()?;
    match subcmd {
        GitSubcommand::Compare => compare(ctx, &git),
        GitSubcommand::ModifiedFiles => {
            let default = ctx.default_branch(&git);
            let files = modified_files(&git, &base_ref(ctx.local_only(), &default))?;
            if ctx.json {
                print_json(&files_json(&files))?;
            } else {
                print_modified_files(ctx, &git, &default, &files)?;
            }
            Ok(Outcome::Done)
        }
        GitSubcommand::Push => push(ctx, &git),
        GitSubcommand::UpdateFromMain => update_from_main(ctx, &git),
    }
}

/// What the current branch is compared against: `origin/<default>`, or the
/// local default branch in local-only mode.
fn base_ref(local_only: bool, default: &str) -> String {
    if local_only {
        default.to_string()
    } else {
        format!("{DEFAULT_REMOTE}/{default}")
    }
}

fn fetch_default(ctx: &Context, git: &Git, default: &str) {
    if ctx.skip_remote("fetch") {
        return;
    }
    ctx.out.step(format!("Fetching latest from {DEFAULT_REMOTE}/{default}..."));
    if let Err(e) = git.fetch(DEFAULT_REMOTE, Some(default)) {
        tracing::debug!(error = %e, "fetch failed");
        ctx.out.warning(format!("Failed to fetch from {DEFAULT_REMOTE}/{default}"));
    }
}

// ---------------------------------------------------------------------------
// compare / modified-files
// ---------------------------------------------------------------------------

fn compare(ctx: &Context, git: &Git) -> anyhow::Result<Outcome> {
    let default = ctx.default_branch(git);
    let current = git.current_branch()?;
    if !ctx.json {
        fetch_default(ctx, git, &default);
    } else if !ctx.local_only() {
        if let Err(e) = git.fetch(DEFAULT_REMOTE, Some(&default)) {
            tracing::warn!(error = %e, "fetch from {DEFAULT_REMOTE}/{default} failed");
        }
    }

    let base = base_ref(ctx.local_only(), &default);
    let ahead = git
        .commits_ahead(&base)
        .with_context(|| unresolved_base(&base))?;
    let files = modified_files(git, &base)?;

    if ctx.json {
        print_json(&serde_json::json!({
            "branch": current,
            "base": base,
            "ahead": ahead,
            "files": files_json(&files),
        }))?;
        return Ok(Outcome::Done);
    }

    let out = &ctx.out;
    out.blank();
    out.rule();
    out.line(format!("  COMPARISON: {current} vs {default}"));
    out.rule();
    out.blank();

    out.step("Commit differences:");
    out.line(format!("  This branch is {ahead} commit(s) ahead of {default}"));
    out.blank();
    if ahead > 0 {
        let graph = git.log_graph(&format!("{base}..HEAD"), 10)?;
        out.line(graph.trim_end());
        out.blank();
    }

    out.step("File changes:");
    print_modified_files(ctx, git, &default, &files)?;
    out.blank();
    out.rule();
    Ok(Outcome::Done)
}

fn modified_files(git: &Git, base: &str) -> anyhow::Result<Vec<FileChange>> {
    git.diff_name_status(&format!("{base}...HEAD"))
        .with_context(|| unresolved_base(base))
}

fn unresolved_base(base: &str) -> String {
    format!(
        "cannot compare with '{base}' (without a remote, run 'rdd config set localOnly true')"
    )
}

fn print_modified_files(
    ctx: &Context,
    git: &Git,
    default: &str,
    files: &[FileChange],
) -> anyhow::Result<()> {
    let out = &ctx.out;
    let current = git.current_branch()?;
    out.info(format!("Comparing {current} with {default}..."));
    out.blank();
    if files.is_empty() {
        out.warning(format!("No files modified compared to {default}"));
        return Ok(());
    }
    out.line("Modified files:");
    for f in files {
        let symbol = match f.status {
            ChangeStatus::Added => "+".green(),
            ChangeStatus::Modified => "~".yellow(),
            ChangeStatus::Deleted => "-".red(),
            ChangeStatus::Renamed => "→".cyan(),
            ChangeStatus::Other => "?".blue(),
        };
        out.line(format!("  {symbol} {} ({})", f.path, f.status.as_str()));
    }
    out.blank();
    out.success(format!("Found {} modified file(s)", files.len()));
    Ok(())
}

fn files_json(files: &[FileChange]) -> serde_json::Value {
    files
        .iter()
        .map(|f| serde_json::json!({ "path": f.path, "status": f.status.as_str() }))
        .collect()
}

// ---------------------------------------------------------------------------
// push
// ---------------------------------------------------------------------------

fn push(ctx: &Context, git: &Git) -> anyhow::Result<Outcome> {
    if ctx.skip_remote("push") {
        return Ok(Outcome::NoOp);
    }
    let branch = git.current_branch()?;
    ctx.out.info(format!("Pushing branch '{branch}' to remote..."));
    git.push_upstream(DEFAULT_REMOTE, &branch)
        .context("failed to push branch to remote")?;
    ctx.out.success("Branch pushed to remote with upstream tracking");
    Ok(Outcome::Done)
}

// ---------------------------------------------------------------------------
// update-from-main
// ---------------------------------------------------------------------------

fn update_from_main(ctx: &Context, git: &Git) -> anyhow::Result<Outcome> {
    let out = &ctx.out;
    let current = git.current_branch()?;
    let default = ctx.default_branch(git);
    // Read before stashing: the stash may take an uncommitted config.json with it.
    let local_only = ctx.local_only();
    let subtitle = format!("{default} → {current}");
    out.banner("Update From Default Branch", Some(subtitle.as_str()));

    let dirty = !git.uncommitted_changes()?.is_empty();
    let stashed = if dirty {
        out.step("Stashing local changes...");
        let label = format!("rdd update-from-main {}", Local::now().format("%Y%m%d-%H%M"));
        git.stash_push(&label).context("failed to stash local changes")?
    } else {
        false
    };

    if local_only {
        out.info("Local-only mode: skipping fetch and pull");
    } else {
        out.step(format!("Fetching latest from {DEFAULT_REMOTE}/{default}..."));
        if let Err(e) = git.fetch(DEFAULT_REMOTE, Some(&default)) {
            tracing::debug!(error = %e, "fetch failed");
            out.warning(format!("Failed to fetch from {DEFAULT_REMOTE}/{default}"));
        }
        if current != default {
            refresh_default(ctx, git, &default, &current)?;
        }
    }

    let target = base_ref(local_only, &default);
    let behind = match git.commits_behind(&target) {
        Ok(n) => n,
        Err(e) => {
            restore_stash(ctx, git, stashed)?;
            return Err(e).with_context(|| unresolved_base(&target));
        }
    };
    if behind == 0 {
        out.info(format!("Already up to date with {target}"));
        restore_stash(ctx, git, stashed)?;
        return Ok(Outcome::NoOp);
    }

    out.step(format!("Merging {behind} commit(s) from {target} into {current}..."));
    match git.merge(&target) {
        Ok(()) => out.success(format!("Merged {target} into {current}")),
        Err(RddError::MergeConflict(files)) => {
            out.error("Merge conflicts detected in:");
            for f in &files {
                out.line(format!("  {f}"));
            }
            out.blank();
            out.info("Resolve the conflicts manually, then:");
            out.line("  git add <resolved files>");
            out.line("  git commit");
            out.line("Or abandon the merge with: git merge --abort");
            if stashed {
                out.warning("Your local changes are still stashed; run 'git stash pop' afterwards");
            }
            return Err(RddError::MergeConflict(files).into());
        }
        Err(e) => {
            restore_stash(ctx, git, stashed)?;
            return Err(e).with_context(|| format!("failed to merge {target}"));
        }
    }

    restore_stash(ctx, git, stashed)?;
    out.success(format!("{current} is up to date with {target}"));
    Ok(Outcome::Done)
}

/// Fast-forward the local default branch, then return to `current`.
fn refresh_default(ctx: &Context, git: &Git, default: &str, current: &str) -> anyhow::Result<()> {
    ctx.out.step(format!("Pulling latest changes for '{default}'..."));
    git.checkout(default)
        .with_context(|| format!("failed to checkout '{default}'"))?;
    if let Err(e) = git.pull(DEFAULT_REMOTE, default) {
        tracing::debug!(error = %e, "pull failed");
        ctx.out.warning("Failed to pull latest changes");
    }
    git.checkout(current)
        .with_context(|| format!("failed to return to '{current}'"))?;
    Ok(())
}

fn restore_stash(ctx: &Context, git: &Git, stashed: bool) -> anyhow::Result<()> {
    if !stashed {
        return Ok(());
    }
    ctx.out.step("Restoring stashed changes...");
    git.stash_pop().context(
        "stashed changes could not be re-applied cleanly; resolve them, then run 'git stash drop'",
    )?;
    Ok(())
}
