//! modsync - dedicated server and workshop mod updater
//!
//! Usage:
//!   modsync                      # Menu for the Arma 3 server
//!   modsync --server reforger    # Menu for the Reforger server
//!   modsync --choice b           # Update mods once and exit

mod menu;
mod report;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use modsync_core::config::ServerKind;
use modsync_core::context::AppContext;

use crate::menu::{Menu, MenuChoice, options_hint};

#[derive(Parser)]
#[command(name = "modsync")]
#[command(about = "Dedicated server and workshop mod updater", long_about = None)]
struct Cli {
    /// Server to manage
    #[arg(long, short, value_enum, default_value = "arma3")]
    server: ServerArg,

    /// Mods list name (`<mods_list_dir>/<name>.json`); defaults to the configured list
    #[arg(long, short)]
    mods_list: Option<String>,

    /// Path to modsync.toml
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Run a single menu choice (e.g. `b`) and exit instead of prompting
    #[arg(long)]
    choice: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ServerArg {
    /// Arma 3 dedicated server with workshop mods
    Arma3,
    /// Arma Reforger dedicated server
    Reforger,
}

impl From<ServerArg> for ServerKind {
    fn from(arg: ServerArg) -> Self {
        match arg {
            ServerArg::Arma3 => ServerKind::Arma3,
            ServerArg::Reforger => ServerKind::Reforger,
        }
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "modsync=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let server = ServerKind::from(cli.server);

    let ctx = AppContext::load(cli.config)?;
    tracing::debug!(config = %ctx.config_path().display(), "configuration loaded");
    let cmd = ctx.update_command(server)?;

    match cli.choice {
        Some(letter) => {
            let choice = MenuChoice::parse(&letter, server).ok_or_else(|| {
                anyhow::anyhow!(
                    "Invalid choice '{}'. Select either {}",
                    letter,
                    options_hint(server)
                )
            })?;
            menu::dispatch(
                &cmd,
                choice,
                cli.mods_list.as_deref(),
                &mut std::io::stdout(),
            )?;
        }
        None => Menu::new(cmd, cli.mods_list).run()?,
    }

    Ok(())
}
