use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Custom styles for CLI help output
fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
        .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
        .literal(AnsiColor::Cyan.on_default())
        .placeholder(AnsiColor::Yellow.on_default())
}

/// Output format for CLI commands.
///
/// - `Auto`: Automatically detect based on terminal (text for TTY, JSON for pipes)
/// - `Text`: Human-readable text output
/// - `Json`: JSON output for scripting
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize, Default)]
pub enum OutputFormat {
    /// Auto-detect: JSON if piped, text if terminal
    #[default]
    Auto,
    /// Human-readable text output
    Text,
    /// JSON output for scripting
    Json,
}

impl OutputFormat {
    /// Resolve `Auto` to a concrete format based on terminal detection.
    pub fn resolve(self) -> Self {
        match self {
            OutputFormat::Auto => {
                if std::io::stdout().is_terminal() {
                    OutputFormat::Text
                } else {
                    OutputFormat::Json
                }
            }
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Parser, Debug)]
#[command(name = "santimpay")]
#[command(about = "Initiate and track SantimPay gateway payments", long_about = None)]
#[command(version)]
#[command(styles = styles())]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(
        short = 'C',
        long = "config",
        value_name = "PATH",
        env = "SANTIMPAY_CONFIG",
        global = true
    )]
    pub config: Option<PathBuf>,

    /// Verbosity level (can be used multiple times: -v, -vv, -vvv)
    #[arg(short = 'v', long = "verbosity", action = clap::ArgAction::Count, global = true)]
    pub verbosity_level: u8,

    /// Do not print anything except results and errors
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,

    /// Control color output
    #[arg(
        long = "color",
        value_enum,
        value_name = "MODE",
        default_value = "auto",
        global = true
    )]
    pub color: ColorMode,

    /// Output format
    #[arg(
        long = "output-format",
        value_enum,
        value_name = "FORMAT",
        default_value = "auto",
        global = true
    )]
    pub output_format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initiate a payment and print the checkout URL
    #[command(
        alias = "p",
        after_help = "Examples:
  santimpay pay --amount 150 --reason \"Order #1042\"
  santimpay pay --amount 150 --reason \"Order #1042\" --phone +251911000000
  santimpay pay --amount 150 --reason Tickets --id 6f1d0c1e-order-77 --output-format json"
    )]
    Pay {
        /// Amount to charge, in the merchant's currency
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        amount: u64,

        /// Payment reason shown to the payer
        #[arg(long)]
        reason: String,

        /// Payer phone number
        #[arg(long, value_name = "PHONE")]
        phone: Option<String>,

        /// Merchant transaction id (generated when omitted)
        #[arg(long, value_name = "ID")]
        id: Option<String>,
    },

    /// Look up a transaction by its merchant transaction id
    #[command(
        alias = "s",
        after_help = "Examples:
  santimpay status 6f1d0c1e-7a55-4c1e-9b9e-2f4f3c0e1a77
  santimpay status 6f1d0c1e-7a55-4c1e-9b9e-2f4f3c0e1a77 --output-format json"
    )]
    Status {
        /// Merchant transaction id
        id: String,
    },

    /// Print a fresh merchant transaction id
    #[command(name = "txn-id", alias = "id")]
    TxnId,

    /// Manage configuration
    #[command(
        alias = "c",
        after_help = "Examples:
  santimpay config
  santimpay config init --merchant-id 9e2dab64-e2bb-4837-9b85-d855dd878d2b --private-key-path keys/santimpay.pem
  santimpay config path"
    )]
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },

    /// Show version information
    #[command(alias = "v")]
    Version,

    /// Generate shell completions script
    #[command(
        alias = "com",
        after_help = "Examples:
  santimpay completions bash > ~/.local/share/bash-completion/completions/santimpay
  santimpay completions zsh > ~/.zfunc/_santimpay
  santimpay completions fish > ~/.config/fish/completions/santimpay.fish"
    )]
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration (file and environment merged)
    Show,

    /// Print the configuration file path
    Path,

    /// Write a configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,

        /// Merchant id issued by the gateway
        #[arg(long, value_name = "ID")]
        merchant_id: Option<String>,

        /// Private key file, relative paths resolve against the storage root
        #[arg(long, value_name = "PATH")]
        private_key_path: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
}

impl Cli {
    /// Check if verbose output is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbosity_level >= 1 && !self.quiet
    }

    /// Check if informational output should be shown
    pub fn should_show_output(&self) -> bool {
        !self.quiet
    }

    /// libcurl's own wire trace is only switched on at the highest verbosity.
    pub fn curl_verbose(&self) -> bool {
        self.verbosity_level >= 3 && !self.quiet
    }

    /// Default tracing directive derived from `-v`/`-q`.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbosity_level {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
