use crate::output::{print_json, print_table};
use crate::prompt;
use anyhow::Context;
use clap::Subcommand;
use coach_core::config::CoachConfig;
use coach_core::ollama::OllamaClient;
use coach_core::session::{menu_entries, parse_menu_choice, CoachSession, MenuChoice};
use std::path::Path;

#[derive(Subcommand)]
pub enum ModelSubcommand {
    /// List models installed on the model server
    List,
    /// Make an installed model the default
    Use { name: String },
    /// Download a model and make it the default
    Pull { name: String },
    /// Pick a model (or download a new one) from an interactive menu; not available with --json
    Choose,
}

pub fn run(root: &Path, subcmd: ModelSubcommand, json: bool) -> anyhow::Result<()> {
    let mut config = CoachConfig::load(root).context("failed to load config")?;
    let client = OllamaClient::from_config(&config.server)?;
    let mut session = CoachSession::new(config.model.as_str())
        .context("config has no usable model; set one with 'coach model use <name>'")?;

    match subcmd {
        ModelSubcommand::List => return list(&client, &session, json),
        ModelSubcommand::Use { name } => {
            session.switch_model(name).context("invalid model name")?;
            if !json {
                println!("[System] Switched to: {}", session.model());
            }
        }
        ModelSubcommand::Pull { name } if json => {
            client
                .pull(&name, |status| tracing::info!(model = %name, status, "pull progress"))
                .with_context(|| format!("failed to download model '{name}'"))?;
            session.switch_model(name)?;
        }
        ModelSubcommand::Pull { name } => pull_with_progress(&client, &mut session, &name)?,
        ModelSubcommand::Choose if json => {
            anyhow::bail!("'model choose' is interactive and cannot be combined with --json")
        }
        ModelSubcommand::Choose => {
            if !choose(&client, &mut session)? {
                return Ok(());
            }
        }
    }

    config.model = session.model().to_string();
    config.save(root).context("failed to save config")?;
    if json {
        print_json(&serde_json::json!({ "model": config.model }))?;
    }
    Ok(())
}

fn list(client: &OllamaClient, session: &CoachSession, json: bool) -> anyhow::Result<()> {
    let models = client
        .list_models()
        .with_context(|| format!("failed to list models at {}", client.endpoint()))?;

    if json {
        print_json(&serde_json::json!({ "current": session.model(), "models": models }))?;
        return Ok(());
    }
    if models.is_empty() {
        println!("No models installed. Download one with: coach model pull <name>");
        return Ok(());
    }
    let rows = models
        .iter()
        .map(|m| {
            let current = if m == session.model() { "*" } else { "" };
            vec![current.to_string(), m.clone()]
        })
        .collect();
    print_table(&["", "MODEL"], rows);
    Ok(())
}

/// Download `name` with a live status line, then switch the session to it.
pub fn pull_with_progress(
    client: &OllamaClient,
    session: &mut CoachSession,
    name: &str,
) -> anyhow::Result<()> {
    println!("--- Initializing download for '{name}' ---");
    let result = client.pull(name, prompt::progress);
    println!();
    result.with_context(|| format!("failed to download model '{name}'"))?;

    session.switch_model(name)?;
    println!("[Success] '{}' is now active and ready for use.", session.model());
    Ok(())
}

/// Interactive model menu. Returns whether the session's model changed.
pub fn choose(client: &OllamaClient, session: &mut CoachSession) -> anyhow::Result<bool> {
    let models = client
        .list_models()
        .with_context(|| format!("failed to list models at {}", client.endpoint()))?;

    println!("\n--- Model Management ---");
    for (n, label) in menu_entries(&models) {
        println!("{n}. {label}");
    }
    let answer = prompt::ask("\nSelect an option: ")?;

    match parse_menu_choice(&answer, &models) {
        Ok(MenuChoice::PullNew) => {
            let name = prompt::ask(
                "\nEnter the name of the model to download (e.g., 'phi3', 'mistral'): ",
            )?;
            if name.is_empty() {
                println!("No name entered. Aborting.");
                return Ok(false);
            }
            pull_with_progress(client, session, &name)?;
            Ok(true)
        }
        Ok(MenuChoice::Select(name)) => {
            session.switch_model(name)?;
            println!("[System] Switched to: {}", session.model());
            Ok(true)
        }
        Err(e) => {
            println!("[Alert] {e}");
            Ok(false)
        }
    }
}
