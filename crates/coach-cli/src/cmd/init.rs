use anyhow::Context;
use coach_core::{config::CoachConfig, io, paths};
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    println!("Initializing coach in: {}", root.display());

    let coach_dir = paths::coach_dir(root);
    io::ensure_dir(&coach_dir)
        .with_context(|| format!("failed to create {}", coach_dir.display()))?;

    let config_path = paths::config_path(root);
    let config = if config_path.exists() {
        println!("  exists:  {}", paths::CONFIG_FILE);
        CoachConfig::load(root).context("failed to load existing config")?
    } else {
        let config = CoachConfig::default();
        config.save(root).context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
        config
    };

    let data_dir = config.data_dir_in(root);
    if data_dir.is_dir() {
        println!("  exists:  {}", config.data_dir.display());
    } else {
        io::ensure_dir(&data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;
        println!("  created: {}", config.data_dir.display());
    }

    println!("\nNext: coach model list, then coach watch");
    Ok(())
}
