use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use coach_core::advice::suggest_shortcuts;
use coach_core::config::CoachConfig;
use coach_core::ollama::OllamaClient;
use coach_core::shortcut::{sorted_view, ShortcutCollection, ShortcutRecord, ShortcutStore};
use serde::Serialize;
use std::path::Path;

#[derive(Subcommand)]
pub enum ShortcutSubcommand {
    /// List an app's shortcuts, starred first
    List { app: String },
    /// List apps that have stored shortcuts
    Apps,
    /// Add or replace a shortcut (unstarred ones are dropped on the next load)
    Add {
        app: String,
        keys: String,
        #[arg(required = true)]
        description: Vec<String>,
        /// Star it so it survives reloads
        #[arg(long)]
        star: bool,
    },
    /// Star a shortcut
    Star { app: String, keys: String },
    /// Unstar a shortcut (it will be dropped on the next load)
    Unstar { app: String, keys: String },
    /// Flip a shortcut's star
    Toggle { app: String, keys: String },
    /// Delete a shortcut
    Remove { app: String, keys: String },
    /// Ask the model for shortcuts and add them unstarred
    Suggest {
        app: String,
        /// Model to ask (default: the configured model)
        #[arg(long)]
        model: Option<String>,
        /// Star these suggested key combinations right away (repeatable)
        #[arg(long = "keep", value_name = "KEYS")]
        keep: Vec<String>,
    },
}

#[derive(Serialize)]
pub struct ShortcutRow<'a> {
    pub keys: &'a str,
    pub description: &'a str,
    pub starred: bool,
}

pub fn rows(collection: &ShortcutCollection) -> Vec<ShortcutRow<'_>> {
    sorted_view(collection)
        .into_iter()
        .map(|(keys, r)| ShortcutRow {
            keys,
            description: &r.description,
            starred: r.starred,
        })
        .collect()
}

pub fn print_shortcuts(collection: &ShortcutCollection) {
    let table = rows(collection)
        .into_iter()
        .map(|r| {
            vec![
                r.keys.to_string(),
                if r.starred { "*" } else { "" }.to_string(),
                r.description.to_string(),
            ]
        })
        .collect();
    print_table(&["KEYS", "STAR", "DESCRIPTION"], table);
}

pub fn open_store(root: &Path, config: &CoachConfig) -> ShortcutStore {
    ShortcutStore::new(config.data_dir_in(root))
}

pub fn run(root: &Path, subcmd: ShortcutSubcommand, json: bool) -> anyhow::Result<()> {
    let config = CoachConfig::load(root).context("failed to load config")?;
    let store = open_store(root, &config);

    match subcmd {
        ShortcutSubcommand::List { app } => list(&store, &app, json),
        ShortcutSubcommand::Apps => apps(&store, json),
        ShortcutSubcommand::Add {
            app,
            keys,
            description,
            star,
        } => add(&store, &app, &keys, &description.join(" "), star, json),
        ShortcutSubcommand::Star { app, keys } => {
            update(&store, &app, &keys, json, |c| c.set_starred(&keys, true).map(|_| true))
        }
        ShortcutSubcommand::Unstar { app, keys } => {
            update(&store, &app, &keys, json, |c| c.set_starred(&keys, false).map(|_| false))
        }
        ShortcutSubcommand::Toggle { app, keys } => {
            update(&store, &app, &keys, json, |c| c.toggle_star(&keys))
        }
        ShortcutSubcommand::Remove { app, keys } => remove(&store, &app, &keys, json),
        ShortcutSubcommand::Suggest { app, model, keep } => {
            let model = model.unwrap_or_else(|| config.model.clone());
            suggest(&config, &store, &app, &model, &keep, json)
        }
    }
}

fn load(store: &ShortcutStore, app: &str) -> anyhow::Result<ShortcutCollection> {
    store
        .load(app)
        .with_context(|| format!("failed to load shortcuts for '{app}'"))
}

fn save(store: &ShortcutStore, app: &str, collection: &ShortcutCollection) -> anyhow::Result<()> {
    store
        .save(app, collection)
        .with_context(|| format!("failed to save shortcuts for '{app}'"))
}

fn list(store: &ShortcutStore, app: &str, json: bool) -> anyhow::Result<()> {
    let collection = load(store, app)?;

    if json {
        print_json(&serde_json::json!({ "app": app, "shortcuts": rows(&collection) }))?;
        return Ok(());
    }
    if collection.is_empty() {
        println!("No starred shortcuts for {app}.");
        return Ok(());
    }
    print_shortcuts(&collection);
    Ok(())
}

fn apps(store: &ShortcutStore, json: bool) -> anyhow::Result<()> {
    let apps = store.list_apps().context("failed to list shortcut files")?;
    if json {
        print_json(&apps)?;
    } else if apps.is_empty() {
        println!("No shortcuts stored in {}.", store.data_dir().display());
    } else {
        for app in apps {
            println!("{app}");
        }
    }
    Ok(())
}

fn add(
    store: &ShortcutStore,
    app: &str,
    keys: &str,
    description: &str,
    star: bool,
    json: bool,
) -> anyhow::Result<()> {
    let mut collection = load(store, app)?;
    let replaced = collection
        .insert(keys, ShortcutRecord::new(description, star))
        .is_some();
    save(store, app, &collection)?;

    if json {
        print_json(&serde_json::json!({
            "app": app,
            "keys": keys,
            "description": description,
            "starred": star,
            "replaced": replaced,
        }))?;
    } else {
        let verb = if replaced { "Updated" } else { "Added" };
        println!("{verb} shortcut [{keys}] for {app}: {description}");
        if !star {
            println!("  not starred: dropped the next time {app}'s shortcuts are loaded");
        }
    }
    Ok(())
}

fn update(
    store: &ShortcutStore,
    app: &str,
    keys: &str,
    json: bool,
    op: impl FnOnce(&mut ShortcutCollection) -> coach_core::Result<bool>,
) -> anyhow::Result<()> {
    let mut collection = load(store, app)?;
    let starred = op(&mut collection).with_context(|| {
        format!("shortcut '{keys}' not found for {app} (unstarred shortcuts are dropped on load)")
    })?;
    save(store, app, &collection)?;

    if json {
        print_json(&serde_json::json!({ "app": app, "keys": keys, "starred": starred }))?;
    } else if starred {
        println!("Starred [{keys}] for {app}");
    } else {
        println!("Unstarred [{keys}] for {app}");
    }
    Ok(())
}

fn remove(store: &ShortcutStore, app: &str, keys: &str, json: bool) -> anyhow::Result<()> {
    let mut collection = load(store, app)?;
    collection
        .remove(keys)
        .with_context(|| format!("shortcut '{keys}' not found for {app}"))?;
    save(store, app, &collection)?;

    if json {
        print_json(&serde_json::json!({ "app": app, "keys": keys, "removed": true }))?;
    } else {
        println!("Removed [{keys}] from {app}");
    }
    Ok(())
}

fn suggest(
    config: &CoachConfig,
    store: &ShortcutStore,
    app: &str,
    model: &str,
    keep: &[String],
    json: bool,
) -> anyhow::Result<()> {
    // Reject unusable app names before calling the model.
    store.path_for(app)?;
    let client = OllamaClient::from_config(&config.server)?;
    let suggestions = suggest_shortcuts(&client, model, app)
        .with_context(|| format!("failed to get shortcut suggestions from '{model}'"))?;

    let mut collection = load(store, app)?;
    let added = collection.merge_suggestions(suggestions, keep);
    save(store, app, &collection)?;

    if json {
        print_json(&serde_json::json!({
            "app": app,
            "added": added,
            "shortcuts": rows(&collection),
        }))?;
        return Ok(());
    }
    println!("Added {added} suggested shortcut(s) for {app}:");
    print_shortcuts(&collection);
    println!(
        "\nUnstarred suggestions are dropped on the next load; \
         re-run with --keep <KEYS> to keep some."
    );
    Ok(())
}
