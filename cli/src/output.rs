//! Output formatting and display utilities for the CLI

use anyhow::Result;
use santimpay_lib::{GatewayConfig, PaymentResult};
use serde_json::{json, Value};
use std::path::Path;

use crate::cli::{Cli, OutputFormat};
use crate::colors::Colors;

/// Print the outcome of a payment initiation.
pub fn print_payment_result(cli: &Cli, merchant_txn_id: &str, result: &PaymentResult) -> Result<()> {
    match cli.output_format.resolve() {
        OutputFormat::Json => {
            let display = json!({
                "merchant_txn_id": merchant_txn_id,
                "status_code": result.status_code,
                "url": result.url,
                "body": result.body,
            });
            println!("{}", serde_json::to_string_pretty(&display)?);
        }
        _ => {
            let status = result.status_code.to_string();
            let status = if result.is_success() {
                Colors::success(&status)
            } else {
                Colors::warning(&status)
            };
            println!("{} {merchant_txn_id}", Colors::key("Transaction:"));
            println!("{} {status}", Colors::key("Status:"));
            match result.url {
                Some(ref url) => println!("{} {}", Colors::key("Checkout URL:"), Colors::url(url)),
                None => {
                    println!("{} {}", Colors::key("Checkout URL:"), Colors::dim("(none)"));
                    if cli.is_verbose() && !result.body.is_null() {
                        println!("{}", serde_json::to_string_pretty(&result.body)?);
                    }
                }
            }
        }
    }
    Ok(())
}

/// Print a gateway transaction record.
pub fn print_transaction(cli: &Cli, record: &Value) -> Result<()> {
    match cli.output_format.resolve() {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(record)?),
        _ => match record.as_object() {
            Some(fields) => {
                for (key, value) in fields {
                    println!("{} {}", Colors::key(&format!("{key}:")), text_value(value));
                }
            }
            None => println!("{}", text_value(record)),
        },
    }
    Ok(())
}

/// Print a merchant transaction id.
pub fn print_txn_id(cli: &Cli, id: &str) -> Result<()> {
    match cli.output_format.resolve() {
        OutputFormat::Json => println!("{}", json!({ "merchant_txn_id": id })),
        _ => println!("{id}"),
    }
    Ok(())
}

/// Print the effective configuration and where it came from.
pub fn print_config(cli: &Cli, config: &GatewayConfig, config_path: &Path) -> Result<()> {
    let key_location = config
        .private_key_location()
        .ok()
        .map(|path| path.display().to_string());

    match cli.output_format.resolve() {
        OutputFormat::Json => {
            let display = json!({
                "config_path": config_path.display().to_string(),
                "config_file_exists": config_path.exists(),
                "private_key_location": key_location,
                "config": config,
            });
            println!("{}", serde_json::to_string_pretty(&display)?);
        }
        _ => {
            let source = if config_path.exists() {
                String::new()
            } else {
                format!(" {}", Colors::dim("(not found, showing defaults)"))
            };
            println!(
                "{} {}{source}",
                Colors::key("Config file:"),
                Colors::path(&config_path.display().to_string())
            );
            match key_location {
                Some(ref location) => {
                    println!("{} {}", Colors::key("Private key:"), Colors::path(location))
                }
                None => println!("{} {}", Colors::key("Private key:"), Colors::warning("not set")),
            }
            println!();
            print!("{}", toml::to_string_pretty(config)?);
        }
    }
    Ok(())
}

fn text_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}
