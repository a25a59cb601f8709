use super::{change, Context};
use clap::Subcommand;
use rdd_cli::exit_codes::Outcome;
use rdd_core::branch::ChangeKind;

#[derive(Subcommand)]
pub enum FixSubcommand {
    /// Start a fix: `fix/` branch, .rdd-docs, and a fix workspace
    Init {
        /// Fix name; normalized to kebab-case
        name: String,
    },

    /// Archive the workspace, commit, and push the current fix branch
    WrapUp,
}

pub fn run(ctx: &mut Context, subcmd: FixSubcommand) -> anyhow::Result<Outcome> {
    match subcmd {
        FixSubcommand::Init { name } => {
            let git = ctx.git()?;
            change::preflight(ctx, &git, "fix")?;
            let name = change::normalized_name(&name)?;
            change::create_change(ctx, &git, ChangeKind::Fix, &name)?;
            Ok(Outcome::Done)
        }
        FixSubcommand::WrapUp => change::wrap_up(ctx),
    }
}
