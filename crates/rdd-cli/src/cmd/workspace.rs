use super::Context;
use anyhow::Context as _;
use clap::Subcommand;
use rdd_cli::exit_codes::Outcome;
use rdd_cli::output::print_json;
use rdd_core::git::Git;
use rdd_core::journal::{Journal, StatusFilter};
use rdd_core::templates::{self, Templates};
use rdd_core::workspace::{
    read_archive_metadata, ArchiveOutcome, ArchiveProvenance, Workspace, WorkspaceKind,
    WorkspaceState,
};
use rdd_core::{execlog, naming, paths};

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum WorkspaceSubcommand {
    /// Populate the empty workspace with templates
    Init {
        /// Workspace type: change or fix
        kind: String,
    },

    /// Archive the workspace under the current branch name
    Archive {
        /// Keep workspace contents after archiving
        #[arg(long)]
        keep: bool,
    },

    /// Remove all workspace contents (asks first)
    Clear,

    /// Show workspace state and prompt progress
    Status,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(ctx: &mut Context, subcmd: WorkspaceSubcommand) -> anyhow::Result<Outcome> {
    match subcmd {
        WorkspaceSubcommand::Init { kind } => {
            let kind: WorkspaceKind = kind.parse()?;
            init(ctx, kind)?;
            Ok(Outcome::Done)
        }
        WorkspaceSubcommand::Archive { keep } => {
            let git = ctx.git()?;
            let branch = git.current_branch()?;
            if archive(ctx, &git, &branch, keep)? {
                Ok(Outcome::Done)
            } else {
                anyhow::bail!("archive cancelled: existing archive left in place")
            }
        }
        WorkspaceSubcommand::Clear => clear(ctx),
        WorkspaceSubcommand::Status => status(ctx),
    }
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

pub fn init(ctx: &Context, kind: WorkspaceKind) -> anyhow::Result<()> {
    ctx.out.step(format!("Initializing workspace for type: {kind}..."));
    let ws = Workspace::new(&ctx.root);
    let written = ws.init(kind, &Templates::new(&ctx.root))?;
    for path in &written {
        tracing::debug!(path = %path.display(), "workspace file written");
    }
    ctx.out.success(format!("Workspace initialized successfully for {kind}"));
    Ok(())
}

/// Create any missing `.rdd-docs/` core documents. When `config.json` is new,
/// ask which branch is the default and record it.
pub fn ensure_docs(ctx: &mut Context) -> anyhow::Result<()> {
    let result = templates::init_docs(&ctx.root, &Templates::new(&ctx.root))
        .context("failed to initialize .rdd-docs")?;
    if result.created.is_empty() {
        tracing::debug!(".rdd-docs already initialized");
        return Ok(());
    }
    ctx.out.step(format!(
        "Initialized {} missing template(s) in {}",
        result.created.len(),
        paths::RDD_DOCS_DIR
    ));

    if result.config_created {
        ctx.out.step("Configuring default branch...");
        let branch = select_default_branch(ctx)?;
        ctx.config()
            .initialize(&branch)
            .context("failed to write config.json")?;
        ctx.out.success(format!("Default branch configured: {branch}"));
    }
    Ok(())
}

fn select_default_branch(ctx: &mut Context) -> anyhow::Result<String> {
    let items = ["main", "dev", "Enter custom branch name"];
    let choice = ctx
        .prompter
        .select("Select default branch for RDD framework", &items)?;
    if choice < 2 {
        return Ok(items[choice].to_string());
    }
    let raw = ctx.prompter.ask("Enter branch name:")?;
    let Some(name) = naming::normalize_path(&raw) else {
        ctx.out.warning("No branch name entered. Defaulting to 'main'.");
        return Ok("main".to_string());
    };
    if name != raw {
        ctx.out.info(format!("Using normalized branch name: {name}"));
    }
    naming::validate_ref_name(&name)?;
    Ok(name)
}

// ---------------------------------------------------------------------------
// archive
// ---------------------------------------------------------------------------

/// Archive the workspace for `branch`. Returns false when the user declined
/// to overwrite an existing archive.
pub fn archive(ctx: &mut Context, git: &Git, branch: &str, keep: bool) -> anyhow::Result<bool> {
    let provenance = ArchiveProvenance {
        archived_by: git.user_identity(),
        last_commit: git.head_commit().unwrap_or_default(),
        last_commit_message: git.last_commit_subject().unwrap_or_default(),
    };

    let ws = Workspace::new(&ctx.root);
    let out = ctx.out;
    let root = ctx.root.clone();
    let prompter = &mut ctx.prompter;
    let outcome = ws.archive(branch, &provenance, keep, |existing| {
        let shown = existing.strip_prefix(&root).unwrap_or(existing);
        out.warning(format!("Archive directory already exists: {}", shown.display()));
        if let Ok(meta) = read_archive_metadata(existing) {
            out.info(format!(
                "Archived {} by {}",
                meta.archived_at.format("%Y-%m-%d %H:%M UTC"),
                meta.archived_by
            ));
        }
        prompter.confirm("Overwrite existing archive?")
    })?;

    match outcome {
        ArchiveOutcome::Archived {
            path,
            failures,
            cleared,
        } => {
            for f in &failures {
                out.warning(format!("Could not archive {}: {}", ctx.rel(&f.path), f.error));
            }
            out.success(format!("Workspace archived to: {}", ctx.rel(&path)));
            if cleared {
                out.info("Workspace directory cleared");
            } else if keep {
                out.info("Workspace directory kept as requested");
            } else {
                out.warning("Workspace kept because some entries could not be archived");
            }
            Ok(true)
        }
        ArchiveOutcome::Declined { .. } => {
            out.info("Archive cancelled by user");
            Ok(false)
        }
    }
}

// ---------------------------------------------------------------------------
// clear
// ---------------------------------------------------------------------------

fn clear(ctx: &mut Context) -> anyhow::Result<Outcome> {
    let ws = Workspace::new(&ctx.root);
    let entries = ws.entries()?;
    if entries.is_empty() {
        ctx.out.info("Workspace is already empty");
        return Ok(Outcome::NoOp);
    }

    ctx.out.warning("This will clear all workspace files.");
    ctx.out.info("Current workspace contains:");
    for name in &entries {
        ctx.out.line(format!("  - {name}"));
    }
    ctx.out.blank();

    if !ctx
        .prompter
        .confirm("Are you sure you want to clear the workspace?")?
    {
        ctx.out.info("Operation cancelled");
        anyhow::bail!("workspace clear declined");
    }
    let removed = ws.clear()?;
    ctx.out.success(format!("Workspace cleared ({removed} entries removed)"));
    Ok(Outcome::Done)
}

// ---------------------------------------------------------------------------
// status
// ---------------------------------------------------------------------------

fn status(ctx: &Context) -> anyhow::Result<Outcome> {
    let ws = Workspace::new(&ctx.root);
    let state = ws.state()?;
    let entries = ws.entries()?;
    let journal = Journal::load(&paths::journal_path(&ctx.root)).ok();
    let (total, done) = journal
        .as_ref()
        .map(|j| {
            (
                j.list(StatusFilter::All).len(),
                j.list(StatusFilter::Checked).len(),
            )
        })
        .unwrap_or((0, 0));
    let executions = execlog::read_all(&paths::execution_log_path(&ctx.root))
        .map(|records| records.len())
        .unwrap_or(0);

    if ctx.json {
        print_json(&serde_json::json!({
            "path": paths::WORKSPACE_DIR,
            "state": state,
            "entries": entries,
            "prompts": { "total": total, "completed": done },
            "executions": executions,
        }))?;
        return Ok(Outcome::Done);
    }

    let label = match state {
        WorkspaceState::Empty => "empty",
        WorkspaceState::Populated => "populated",
    };
    ctx.out.info(format!("Workspace: {} ({label})", paths::WORKSPACE_DIR));
    for name in &entries {
        ctx.out.line(format!("  - {name}"));
    }
    if journal.is_some() {
        ctx.out.info(format!("Prompts completed: {done}/{total}"));
    }
    if executions > 0 {
        ctx.out.info(format!("Executions logged: {executions}"));
    }
    Ok(Outcome::Done)
}
