use crate::cmd::{model, shortcut};
use crate::output::print_json_line;
use anyhow::Context;
use chrono::Utc;
use clap::Args;
use coach_core::advice::{request_advice, Advice};
use coach_core::config::CoachConfig;
use coach_core::ollama::{ensure_server_running, OllamaClient, ServerStatus};
use coach_core::session::CoachSession;
use coach_core::shortcut::{ShortcutCollection, ShortcutStore};
use coach_core::watch::{stop_channel, FocusWatcher};
use coach_core::window::SystemWindowProvider;
use std::path::Path;
use std::time::Duration;

#[derive(Args)]
pub struct WatchArgs {
    /// Seconds between polls (default: poll_interval_secs from config)
    #[arg(long)]
    pub interval: Option<u64>,

    /// Model to ask for advice (default: the configured model)
    #[arg(long)]
    pub model: Option<String>,

    /// Pick the model from an interactive menu before watching
    #[arg(long)]
    pub choose_model: bool,

    /// Only report focus changes; never call the model server
    #[arg(long)]
    pub no_advice: bool,

    /// Do not try to start `ollama serve` when the server is down
    #[arg(long)]
    pub no_start_server: bool,
}

pub fn run(root: &Path, args: WatchArgs, json: bool) -> anyhow::Result<()> {
    if json && args.choose_model {
        anyhow::bail!("--choose-model is interactive and cannot be combined with --json");
    }
    let config = CoachConfig::load(root).context("failed to load config")?;
    let mut session = CoachSession::new(args.model.as_deref().unwrap_or(&config.model))
        .context("no usable model; pass --model or run 'coach model use <name>'")?;
    let client = OllamaClient::from_config(&config.server)?;
    let store = shortcut::open_store(root, &config);
    let interval = args
        .interval
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.poll_interval());

    if !json {
        println!("--- Starting Focus Coach ---");
    }

    if args.choose_model && !args.no_advice {
        // A failed menu keeps the current model.
        if let Err(e) = model::choose(&client, &mut session) {
            eprintln!("[Alert] {e:#}; keeping '{}'", session.model());
        }
    }

    if !args.no_advice && !args.no_start_server {
        match ensure_server_running(&client, config.server.boot_wait()) {
            Ok(ServerStatus::Started) => {
                if !json {
                    println!("[System] Model server was not running; started it.");
                }
            }
            Ok(ServerStatus::AlreadyRunning) => {}
            Err(e) => {
                tracing::warn!(error = %e, "could not start model server; advice may fail")
            }
        }
    }

    let (handle, signal) = stop_channel();
    ctrlc::set_handler(move || handle.stop()).context("failed to install Ctrl-C handler")?;

    tracing::info!(
        model = %session.model(),
        interval_secs = interval.as_secs(),
        data_dir = %store.data_dir().display(),
        "watching focus"
    );

    let changes = FocusWatcher::new().run(&SystemWindowProvider, interval, &signal, |app| {
        let advice = (!args.no_advice)
            .then(|| request_advice(&client, &session, &config.profile, app));
        let shortcuts = starred_shortcuts(&store, app);
        if json {
            report_json(app, advice.as_ref(), &shortcuts);
        } else {
            report_text(app, advice.as_ref(), &shortcuts);
        }
    });

    if !json {
        println!("\nStopped after {changes} focus change(s).");
    }
    Ok(())
}

/// Shortcut lookup must not stop the watcher; failures show as none.
fn starred_shortcuts(store: &ShortcutStore, app: &str) -> ShortcutCollection {
    store.load(app).unwrap_or_else(|e| {
        tracing::warn!(app = %app, error = %e, "could not load shortcuts");
        ShortcutCollection::new()
    })
}

fn report_text(app: &str, advice: Option<&Advice>, shortcuts: &ShortcutCollection) {
    println!("\n[Activity] Switched to: {app}");
    if let Some(advice) = advice {
        println!("[Coach] {advice}");
    }
    if !shortcuts.is_empty() {
        println!("[Shortcuts]");
        for row in shortcut::rows(shortcuts) {
            println!("  {:<16} {}", row.keys, row.description);
        }
    }
}

fn report_json(app: &str, advice: Option<&Advice>, shortcuts: &ShortcutCollection) {
    let event = serde_json::json!({
        "at": Utc::now(),
        "app": app,
        "advice": advice.map(|a| a.to_string()),
        "advice_available": advice.map(Advice::is_available),
        "shortcuts": shortcut::rows(shortcuts),
    });
    if let Err(e) = print_json_line(&event) {
        tracing::warn!(error = %e, "failed to write event");
    }
}
