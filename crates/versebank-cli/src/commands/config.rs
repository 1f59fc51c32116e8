//! Config command handlers

use anyhow::{bail, Context, Result};

use versebank_core::Config;

use crate::output::{Output, OutputFormat};
use crate::ConfigCommands;

/// Show or set configuration values
pub fn handle(command: Option<ConfigCommands>, output: &Output) -> Result<()> {
    match command {
        Some(ConfigCommands::Set { key, value }) => set(&key, &value, output),
        Some(ConfigCommands::Show) | None => show(output),
    }
}

fn show(output: &Output) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            let info = serde_json::json!({
                "config_file": Config::config_file_path(),
                "data_dir": config.data_dir,
                "database": config.sqlite_path(),
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        _ => {
            println!("Config file: {}", Config::config_file_path().display());
            println!("Data dir:    {}", config.data_dir.display());
            println!("Database:    {}", config.sqlite_path().display());
        }
    }
    Ok(())
}

fn set(key: &str, value: &str, output: &Output) -> Result<()> {
    let mut config = Config::load().context("Failed to load configuration")?;

    match key {
        "data_dir" => config.data_dir = value.into(),
        other => bail!("Unknown config key: {} (expected data_dir)", other),
    }

    config.save().context("Failed to save configuration")?;
    output.success(&format!("Set {} = {}", key, value));
    Ok(())
}
