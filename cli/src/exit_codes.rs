//! Exit codes for the santimpay CLI.
//!
//! Following standard Unix conventions and providing specific codes
//! for different error categories to aid scripting and automation.

use santimpay_lib::{ConfigError, GatewayError};

/// Exit codes for the santimpay CLI.
///
/// These codes follow Unix conventions where possible:
/// - 0: Success
/// - 1: General error
/// - 2: Misuse of shell command, reported by clap before any command runs
/// - 130: Script terminated by Ctrl+C (128 + SIGINT)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Successful execution
    Success = 0,

    /// General/unknown error
    GeneralError = 1,

    /// Configuration error (missing config, missing or invalid key)
    ConfigError = 3,

    /// Network/connection error, or a 5xx from the gateway
    NetworkError = 4,

    /// Payment rejected by the gateway
    PaymentFailed = 5,

    /// Gateway refused the signed token (401/403)
    AuthError = 8,

    /// Transaction not found (404)
    NotFound = 9,

    /// Operation timed out
    Timeout = 10,

    /// Interrupted by signal (Ctrl+C)
    /// Standard Unix convention: 128 + signal number (SIGINT = 2)
    Interrupted = 130,
}

impl ExitCode {
    /// Convert to process exit code
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Exit the process with this code
    pub fn exit(self) -> ! {
        std::process::exit(self.code())
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.code()
    }
}

impl From<&anyhow::Error> for ExitCode {
    fn from(err: &anyhow::Error) -> Self {
        if let Some(gateway_err) = err.downcast_ref::<GatewayError>() {
            return ExitCode::from(gateway_err);
        }
        if let Some(config_err) = err.downcast_ref::<ConfigError>() {
            return ExitCode::from(config_err);
        }

        // Check error message for common patterns
        let msg = err.to_string().to_lowercase();

        if msg.contains("timed out") || msg.contains("timeout") {
            ExitCode::Timeout
        } else if msg.contains("connection") || msg.contains("network") {
            ExitCode::NetworkError
        } else if msg.contains("config") {
            ExitCode::ConfigError
        } else if msg.contains("not found") {
            ExitCode::NotFound
        } else {
            ExitCode::GeneralError
        }
    }
}

impl From<&GatewayError> for ExitCode {
    fn from(err: &GatewayError) -> Self {
        match err.status_code() {
            0 if err.message().to_lowercase().contains("timed out") => ExitCode::Timeout,
            0 => ExitCode::NetworkError,
            401 | 403 => ExitCode::AuthError,
            404 => ExitCode::NotFound,
            500.. => ExitCode::NetworkError,
            _ => ExitCode::PaymentFailed,
        }
    }
}

impl From<&ConfigError> for ExitCode {
    fn from(_: &ConfigError) -> Self {
        ExitCode::ConfigError
    }
}
