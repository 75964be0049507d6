//! Configuration loading utilities for the CLI

use anyhow::{Context, Result};
use santimpay_lib::{CurlTransportBuilder, GatewayClient, GatewayConfig};
use std::path::{Path, PathBuf};

use crate::cli::Cli;

/// Load configuration from CLI arguments or default location, with
/// `SANTIMPAY_*` environment overrides applied.
pub fn load_config(config_path: Option<impl AsRef<Path>>) -> Result<GatewayConfig> {
    GatewayConfig::resolve(config_path).context("Failed to load configuration")
}

/// Path of the configuration file the CLI reads and writes.
pub fn config_path(cli: &Cli) -> Result<PathBuf> {
    match cli.config {
        Some(ref path) => Ok(path.clone()),
        None => Ok(GatewayConfig::default_config_path()?),
    }
}

/// Build a curl-backed gateway client from the resolved configuration.
pub fn build_client(cli: &Cli) -> Result<GatewayClient> {
    let config = load_config(cli.config.as_ref())?;
    let transport = CurlTransportBuilder::from_config(&config)
        .verbose(cli.curl_verbose())
        .build();
    GatewayClient::with_transport(config, transport)
        .context("Failed to initialize the gateway client")
}
