mod cmd;
mod output;
mod prompt;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    config::ConfigSubcommand, model::ModelSubcommand, shortcut::ShortcutSubcommand,
    watch::WatchArgs,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "coach",
    about = "Focus coach: watches the active app, asks a local model for a critique, keeps per-app shortcuts",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .coach/)
    #[arg(long, global = true, env = "COACH_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default config and create the shortcut directory
    Init,

    /// Watch the focused app and print advice whenever it changes (Ctrl-C to stop)
    Watch(WatchArgs),

    /// List, select, and download models on the model server
    Model {
        #[command(subcommand)]
        subcommand: ModelSubcommand,
    },

    /// Manage per-app keyboard shortcuts
    Shortcut {
        #[command(subcommand)]
        subcommand: ShortcutSubcommand,
    },

    /// Show or validate the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Watch(_) => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Watch(args) => cmd::watch::run(&root, args, cli.json),
        Commands::Model { subcommand } => cmd::model::run(&root, subcommand, cli.json),
        Commands::Shortcut { subcommand } => cmd::shortcut::run(&root, subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
