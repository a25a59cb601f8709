use super::{branch, workspace, Context};
use anyhow::Context as _;
use chrono::Local;
use clap::Subcommand;
use rdd_cli::exit_codes::Outcome;
use rdd_core::branch::{is_change_branch, ChangeKind};
use rdd_core::git::{Git, DEFAULT_REMOTE};
use rdd_core::workspace::{Workspace, WorkspaceState};
use rdd_core::{execlog, naming, paths, RddError};

/// Set to `1`/`true` to offer Enhancement in the interactive type menu.
const REVEAL_ENH_ENV: &str = "RDD_REVEAL_ENH";

/// Prompt id of the `log.jsonl` entry holding the change description.
const DESCRIPTION_ENTRY: &str = "description";

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ChangeSubcommand {
    /// Start a change: work branch, .rdd-docs, and workspace
    Create {
        /// Change type: enh or fix (chosen from a menu when omitted)
        kind: Option<String>,
        /// Change name; normalized to kebab-case (asked when omitted)
        #[arg(long)]
        name: Option<String>,
        /// Short description of the change (asked when omitted)
        #[arg(long)]
        description: Option<String>,
        /// Offer Enhancement in the type menu
        #[arg(long, hide = true)]
        reveal_enh: bool,
    },

    /// Archive the workspace, commit, and push the current change branch
    WrapUp,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(ctx: &mut Context, subcmd: ChangeSubcommand) -> anyhow::Result<Outcome> {
    match subcmd {
        ChangeSubcommand::Create {
            kind,
            name,
            description,
            reveal_enh,
        } => {
            let kind = kind.map(|k| k.parse::<ChangeKind>()).transpose()?;
            let reveal = reveal_enh || env_flag(REVEAL_ENH_ENV);
            create(ctx, kind, name, description, reveal)
        }
        ChangeSubcommand::WrapUp => wrap_up(ctx),
    }
}

fn env_flag(name: &str) -> bool {
    matches!(
        std::env::var(name).as_deref(),
        Ok("1") | Ok("true") | Ok("True")
    )
}

// ---------------------------------------------------------------------------
// create
// ---------------------------------------------------------------------------

fn create(
    ctx: &mut Context,
    kind: Option<ChangeKind>,
    name: Option<String>,
    description: Option<String>,
    reveal_enh: bool,
) -> anyhow::Result<Outcome> {
    let git = ctx.git()?;
    preflight(ctx, &git, "change")?;

    let out = ctx.out;
    out.blank();
    out.line("─── RDD ───");
    out.line(" Create Change");
    out.line(" > Create a timestamped work branch, initialize .rdd-docs,");
    out.line(" > and populate the workspace with templates.");
    out.line("───────────");
    out.blank();

    let description = match description {
        Some(d) => d.trim().to_string(),
        None => ctx.prompter.ask(
            "Please provide a short description of the change:\n\
             (e.g., 'Add user authentication enhancement', 'Fix login page bug')",
        )?,
    };
    if description.is_empty() {
        anyhow::bail!("change description cannot be empty");
    }
    out.info(format!("Description: {description}"));
    out.blank();

    let name = match name {
        Some(raw) => normalized_name(&raw)?,
        None => ask_name(ctx)?,
    };

    let kind = match kind {
        Some(k) => k,
        None => select_kind(ctx, reveal_enh)?,
    };

    let branch = create_change(ctx, &git, kind, &name)?;

    let session = execlog::session_id(Local::now());
    let log_path = paths::execution_log_path(&ctx.root);
    execlog::log_execution(&log_path, DESCRIPTION_ENTRY, &description, &session)
        .with_context(|| format!("failed to record description in {}", ctx.rel(&log_path)))?;
    tracing::debug!(%branch, "change description recorded");
    Ok(Outcome::Done)
}

/// Refuse to start a change unless on the default branch with an empty workspace.
pub fn preflight(ctx: &Context, git: &Git, what: &str) -> anyhow::Result<()> {
    let current = git.current_branch()?;
    let expected = ctx.default_branch(git);
    if current != expected {
        ctx.out.line(format!("Switch first with: git checkout {expected}"));
        return Err(RddError::NotOnDefaultBranch { current, expected })
            .with_context(|| format!("cannot create {what}"));
    }

    if Workspace::new(&ctx.root).state()? == WorkspaceState::Populated {
        ctx.out.line("Options:");
        ctx.out.line("  1. Complete the current change: rdd change wrap-up");
        ctx.out.line("  2. Archive the current workspace: rdd workspace archive");
        ctx.out.line("  3. Clear the workspace (discards files): rdd workspace clear");
        return Err(RddError::WorkspaceNotEmpty(paths::WORKSPACE_DIR.to_string()))
            .with_context(|| format!("cannot create {what}"));
    }
    Ok(())
}

/// Normalize and validate a name given on the command line.
pub fn normalized_name(raw: &str) -> anyhow::Result<String> {
    let name = naming::normalize(raw).ok_or_else(|| RddError::InvalidName {
        name: raw.to_string(),
        reason: "nothing left after normalization".to_string(),
    })?;
    naming::validate_name(&name)?;
    Ok(name)
}

fn ask_name(ctx: &mut Context) -> anyhow::Result<String> {
    let out = ctx.out;
    loop {
        let raw = ctx.prompter.ask(
            "Please provide a name for the change (will be normalized to kebab-case):\n\
             (e.g., 'add user auth', 'Fix Login Bug', 'update-readme')",
        )?;
        if raw.is_empty() {
            out.error("Change name cannot be empty");
            continue;
        }
        let Some(name) = naming::normalize(&raw) else {
            out.error(format!("Unable to normalize name: {raw}"));
            out.line("Please try a different name (letters, numbers, spaces, hyphens)");
            continue;
        };
        if let Err(e) = naming::validate_name(&name) {
            out.warning(format!("Normalized name doesn't meet requirements: {e}"));
            out.line("Requirements: kebab-case, max 5 words, lowercase, hyphens only");
            out.blank();
            continue;
        }
        out.success(format!("Normalized name: {name}"));
        if ctx.prompter.confirm("Use this name?")? {
            return Ok(name);
        }
        out.line("Let's try again...");
        out.blank();
    }
}

fn select_kind(ctx: &mut Context, reveal_enh: bool) -> anyhow::Result<ChangeKind> {
    let mut options = vec![ChangeKind::Fix];
    if reveal_enh {
        options.push(ChangeKind::Enh);
    }
    let labels: Vec<&str> = options.iter().map(|k| k.label()).collect();
    ctx.out.blank();
    let idx = ctx.prompter.select("Select change type", &labels)?;
    Ok(options[idx])
}

/// Branch, `.rdd-docs`, workspace: the shared tail of `change create` and `fix init`.
pub fn create_change(
    ctx: &mut Context,
    git: &Git,
    kind: ChangeKind,
    name: &str,
) -> anyhow::Result<String> {
    let full = branch::create_work_branch(ctx, git, kind, name)?;
    ctx.out.blank();

    workspace::ensure_docs(ctx)?;
    ctx.out.blank();

    workspace::init(ctx, kind.into())?;
    ctx.out.blank();

    ctx.out.success("Change created successfully!");
    ctx.out.info(format!("Branch: {full}"));
    ctx.out.info(format!("Workspace initialized in: {}", paths::WORKSPACE_DIR));
    Ok(full)
}

// ---------------------------------------------------------------------------
// wrap-up
// ---------------------------------------------------------------------------

pub fn wrap_up(ctx: &mut Context) -> anyhow::Result<Outcome> {
    let git = ctx.git()?;
    let current = git.current_branch()?;
    let default = ctx.default_branch(&git);
    let out = ctx.out;

    if !is_change_branch(&current, &default) {
        out.info("Wrap-up can only be performed on branches starting with 'enh/' or 'fix/'");
        out.line("Valid branch format examples:");
        out.line("  • enh/20241101-1234-my-enhancement");
        out.line("  • fix/20241101-1234-my-bugfix");
        return Err(RddError::NotWorkBranch(current).into());
    }

    out.banner("Wrap Up Change", Some(current.as_str()));

    out.step("Archiving workspace...");
    if !workspace::archive(ctx, &git, &current, false)? {
        anyhow::bail!("wrap-up stopped: workspace was not archived");
    }
    out.blank();

    out.step("Committing changes...");
    git.add_all().context("failed to stage changes")?;
    let message = format!("wrap up {current}");
    if git.commit(&message).context("failed to commit changes")? {
        out.success(format!("Changes committed: {message}"));
    } else {
        out.info("No uncommitted changes to commit");
    }
    out.blank();

    out.step("Pushing to remote...");
    if !ctx.skip_remote("push") {
        git.push_upstream(DEFAULT_REMOTE, &current)
            .context("failed to push branch to remote")?;
        out.success("Branch pushed to remote with upstream tracking");
    }
    out.blank();

    out.banner("Wrap Up Complete", None);
    out.success("Change wrapped up successfully!");
    out.blank();
    out.info("Next steps:");
    out.line("  1. Create a pull request");
    out.line("  2. Request code review");
    out.line("  3. Merge after approval");
    Ok(Outcome::Done)
}
