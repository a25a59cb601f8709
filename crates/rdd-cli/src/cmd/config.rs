use super::Context;
use anyhow::Context as _;
use clap::Subcommand;
use rdd_cli::exit_codes::Outcome;
use rdd_cli::output::print_json;
use rdd_core::config::{display_value, parse_value, KNOWN_KEYS};

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the whole configuration document
    Show,

    /// Print one configuration value
    Get {
        /// Key, e.g. defaultBranch
        key: String,
    },

    /// Set one configuration value (true/false are stored as booleans)
    Set {
        key: String,
        value: String,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(ctx: &mut Context, subcmd: ConfigSubcommand) -> anyhow::Result<Outcome> {
    let store = ctx.config();
    match subcmd {
        ConfigSubcommand::Show => {
            if !store.exists() {
                ctx.out.warning(format!(
                    "Config file not found: {}",
                    ctx.rel(store.path())
                ));
                ctx.out.info("It will be created when you create your first change.");
                ctx.out.line("Known keys:");
                for (key, about) in KNOWN_KEYS {
                    ctx.out.line(format!("  {key:<14} {about}"));
                }
                anyhow::bail!("no configuration document");
            }
            if ctx.json {
                print_json(&store.document().unwrap_or_default())?;
            } else {
                let raw = std::fs::read_to_string(store.path())
                    .with_context(|| format!("failed to read {}", ctx.rel(store.path())))?;
                ctx.out.info("Current configuration:");
                ctx.out.line(raw.trim_end());
            }
            Ok(Outcome::Done)
        }

        ConfigSubcommand::Get { key } => match store.get(&key) {
            Some(value) => {
                if ctx.json {
                    print_json(&serde_json::json!({ "key": key, "value": value }))?;
                } else {
                    ctx.out.line(format!("{key}: {}", display_value(&value)));
                }
                Ok(Outcome::Done)
            }
            None => {
                ctx.out.warning(format!("Configuration key '{key}' not found"));
                anyhow::bail!("unknown configuration key '{key}'")
            }
        },

        ConfigSubcommand::Set { key, value } => {
            let parsed = parse_value(&value);
            store
                .set(&key, parsed.clone())
                .with_context(|| format!("failed to update {}", ctx.rel(store.path())))?;
            ctx.out.success(format!(
                "Configuration updated: {key} = {}",
                display_value(&parsed)
            ));
            Ok(Outcome::Done)
        }
    }
}
