use crate::cli::Cli;
use crate::colors::Colors;
use crate::config_utils::{config_path, load_config};
use crate::output::print_config;
use anyhow::{Context, Result};
use santimpay_lib::GatewayConfig;
use std::path::PathBuf;

/// Show the effective configuration
pub fn show_command(cli: &Cli) -> Result<()> {
    let config = load_config(cli.config.as_ref())?;
    let path = config_path(cli)?;
    print_config(cli, &config, &path)
}

/// Print the configuration file path
pub fn path_command(cli: &Cli) -> Result<()> {
    println!("{}", config_path(cli)?.display());
    Ok(())
}

/// Write a configuration file with defaults and the given merchant settings
pub fn init_command(
    cli: &Cli,
    force: bool,
    merchant_id: Option<&str>,
    private_key_path: Option<&PathBuf>,
) -> Result<()> {
    let path = config_path(cli)?;
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite it.",
            path.display()
        );
    }

    let mut builder = GatewayConfig::builder();
    if let Some(id) = merchant_id {
        builder = builder.merchant_id(id);
    }
    if let Some(key) = private_key_path {
        builder = builder.private_key_path(key);
    }
    let config = builder.build()?;

    config
        .save_to(&path)
        .with_context(|| format!("Failed to write configuration to {}", path.display()))?;

    tracing::info!(path = %path.display(), "configuration written");
    if cli.should_show_output() {
        eprintln!(
            "{} {}",
            Colors::success("Wrote configuration to"),
            Colors::path(&path.display().to_string())
        );
    }
    Ok(())
}
