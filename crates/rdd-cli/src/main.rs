mod cmd;

use clap::{ArgAction, Parser, Subcommand};
use cmd::{
    branch::BranchSubcommand, change::ChangeSubcommand, config::ConfigSubcommand,
    fix::FixSubcommand, git::GitSubcommand, prompt::PromptSubcommand,
    workspace::WorkspaceSubcommand, Context,
};
use rdd_cli::exit_codes;
use rdd_cli::output::Output;
use rdd_cli::prompt::Prompter;
use rdd_cli::{root, signal};
use rdd_core::RddError;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "rdd",
    about = "Requirements-driven development workflow: branches, workspaces, and prompt journals",
    version,
    disable_version_flag = true,
    arg_required_else_help = true
)]
struct Cli {
    /// Print version
    #[arg(short = 'v', long, action = ArgAction::Version)]
    version: Option<bool>,

    /// Repository root (default: auto-detect from .rdd-docs/ or .git/)
    #[arg(long, global = true, env = "RDD_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON where supported
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Answer yes to every confirmation
    #[arg(long, global = true, short = 'y')]
    yes: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create, delete, clean up, and list branches
    Branch {
        #[command(subcommand)]
        subcommand: BranchSubcommand,
    },

    /// Manage the working area under .rdd-docs/workspace
    Workspace {
        #[command(subcommand)]
        subcommand: WorkspaceSubcommand,
    },

    /// Start and finish changes
    Change {
        #[command(subcommand)]
        subcommand: ChangeSubcommand,
    },

    /// Start and finish fixes
    Fix {
        #[command(subcommand)]
        subcommand: FixSubcommand,
    },

    /// Compare, push, and update the current branch
    Git {
        #[command(subcommand)]
        subcommand: GitSubcommand,
    },

    /// Track prompt completion in the workspace journal
    Prompt {
        #[command(subcommand)]
        subcommand: PromptSubcommand,
    },

    /// Read and write .rdd-docs/config.json
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

impl Commands {
    fn domain(&self) -> &'static str {
        match self {
            Commands::Branch { .. } => "branch",
            Commands::Workspace { .. } => "workspace",
            Commands::Change { .. } => "change",
            Commands::Fix { .. } => "fix",
            Commands::Git { .. } => "git",
            Commands::Prompt { .. } => "prompt",
            Commands::Config { .. } => "config",
        }
    }
}

fn init_tracing() {
    let fallback = match std::env::var("DEBUG").as_deref() {
        Ok("1") | Ok("true") => "debug",
        _ => "warn",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();
    signal::install();

    let root = root::resolve_root(cli.root.as_deref());
    tracing::debug!(root = %root.display(), "resolved repository root");

    let out = Output::detect(cli.no_color);
    let mut ctx = Context {
        root,
        json: cli.json,
        out,
        prompter: Prompter::stdio(cli.yes),
    };

    let domain = cli.command.domain();
    let result = match cli.command {
        Commands::Branch { subcommand } => cmd::branch::run(&mut ctx, subcommand),
        Commands::Workspace { subcommand } => cmd::workspace::run(&mut ctx, subcommand),
        Commands::Change { subcommand } => cmd::change::run(&mut ctx, subcommand),
        Commands::Fix { subcommand } => cmd::fix::run(&mut ctx, subcommand),
        Commands::Git { subcommand } => cmd::git::run(&mut ctx, subcommand),
        Commands::Prompt { subcommand } => cmd::prompt::run(&mut ctx, subcommand),
        Commands::Config { subcommand } => cmd::config::run(&mut ctx, subcommand),
    };

    let code = match result {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => report(&out, domain, &e),
    };
    std::process::exit(code);
}

/// Print a failed command's error chain and pick its exit code.
fn report(out: &Output, domain: &str, e: &anyhow::Error) -> i32 {
    let core = e.chain().find_map(|c| c.downcast_ref::<RddError>());
    match core {
        Some(RddError::Cancelled) => {
            out.warning("Operation cancelled by user");
            exit_codes::INTERRUPTED
        }
        Some(err) if err.is_user_error() => {
            eprintln!("error: {e:#}");
            eprintln!("hint: run 'rdd {domain} --help' for usage");
            exit_codes::FAILURE
        }
        _ => {
            eprintln!("error: {e:#}");
            exit_codes::FAILURE
        }
    }
}
