use crate::output::print_json;
use anyhow::Context;
use copyloom_core::{config::Config, io, paths};
use std::path::Path;

pub fn run(root: &Path, name: Option<&str>, json: bool) -> anyhow::Result<()> {
    let workspace_name = name
        .map(str::to_string)
        .or_else(|| root.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "agency".to_string());

    if !json {
        println!("Initializing copyloom in: {}", root.display());
    }

    for dir in [paths::COPYLOOM_DIR, paths::CLIENTS_DIR] {
        let p = root.join(dir);
        io::ensure_dir(&p).with_context(|| format!("failed to create {}", p.display()))?;
    }

    let config = serde_yaml::to_string(&Config::new(&workspace_name))?;
    let created = io::write_if_missing(&paths::config_path(root), config.as_bytes())
        .context("failed to write config.yaml")?;

    if json {
        print_json(&serde_json::json!({
            "root": root,
            "config_created": created,
        }))?;
    } else if created {
        println!("  created: {}", paths::CONFIG_FILE);
    } else {
        println!("  exists:  {}", paths::CONFIG_FILE);
    }
    Ok(())
}
