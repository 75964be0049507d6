//! santimpay CLI - initiate and track SantimPay gateway payments

mod cli;
mod colors;
mod config_commands;
mod config_utils;
mod errors;
mod exit_codes;
mod output;
mod payment;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, shells};
use cli::{Cli, ColorMode, Commands, ConfigCommands, Shell};
use colored::control;
use exit_codes::ExitCode;
use payment::PayArgs;
use tracing_subscriber::EnvFilter;

fn main() {
    // Low-level Ctrl+C handler so blocking gateway calls and retry sleeps can be interrupted
    ctrlc::set_handler(move || {
        eprintln!("Interrupted");
        std::process::exit(ExitCode::Interrupted.code());
    })
    .expect("Failed to set Ctrl+C handler");

    if let Err(e) = run() {
        eprintln!("{}", errors::format_error_with_suggestion(&e));
        ExitCode::from(&e).exit();
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize color support based on user preference and NO_COLOR env var
    init_color_support(&cli);
    init_tracing(&cli);

    handle_command(&cli, &cli.command)
}

/// Handle CLI subcommands
fn handle_command(cli: &Cli, command: &Commands) -> Result<()> {
    match command {
        Commands::Pay {
            amount,
            reason,
            phone,
            id,
        } => payment::pay_command(
            cli,
            PayArgs {
                amount: *amount,
                reason,
                phone: phone.as_deref(),
                id: id.as_deref(),
            },
        ),

        Commands::Status { id } => payment::status_command(cli, id),

        Commands::TxnId => payment::txn_id_command(cli),

        Commands::Config { command } => match command {
            None | Some(ConfigCommands::Show) => config_commands::show_command(cli),
            Some(ConfigCommands::Path) => config_commands::path_command(cli),
            Some(ConfigCommands::Init {
                force,
                merchant_id,
                private_key_path,
            }) => config_commands::init_command(
                cli,
                *force,
                merchant_id.as_deref(),
                private_key_path.as_ref(),
            ),
        },

        Commands::Version => show_version(),

        Commands::Completions { shell } => generate_completions(*shell),
    }
}

fn show_version() -> Result<()> {
    const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

    println!("santimpay CLI: v{CLI_VERSION}");
    println!("santimpay-lib: v{}", santimpay_lib::VERSION);

    Ok(())
}

/// Generate shell completions
fn generate_completions(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    match shell {
        Shell::Bash => generate(shells::Bash, &mut cmd, bin_name, &mut std::io::stdout()),
        Shell::Zsh => generate(shells::Zsh, &mut cmd, bin_name, &mut std::io::stdout()),
        Shell::Fish => generate(shells::Fish, &mut cmd, bin_name, &mut std::io::stdout()),
        Shell::PowerShell => generate(
            shells::PowerShell,
            &mut cmd,
            bin_name,
            &mut std::io::stdout(),
        ),
    }

    Ok(())
}

/// Initialize color support based on user preference and NO_COLOR env var
fn init_color_support(cli: &Cli) {
    use std::io::IsTerminal;
    let no_color_env = std::env::var("NO_COLOR").is_ok();

    match cli.color {
        ColorMode::Always => control::set_override(true),
        ColorMode::Never => control::set_override(false),
        ColorMode::Auto => {
            if no_color_env || !std::io::stdout().is_terminal() {
                control::set_override(false);
            }
        }
    }
}

/// Send library and CLI logs to stderr. `RUST_LOG` wins over `-v`/`-q`.
fn init_tracing(cli: &Cli) {
    use std::io::IsTerminal;
    let ansi = match cli.color {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal(),
    };
    let level = cli.log_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("santimpay={level},santimpay_lib={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(cli.verbosity_level >= 2)
        .with_ansi(ansi)
        .init();
}
