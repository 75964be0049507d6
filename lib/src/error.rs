//! Error types for the SantimPay client.
//!
//! Two kinds of failure are kept apart. A [`ConfigError`] means the client
//! could not be built at all (no key, unreadable config) and is not worth
//! retrying. A [`GatewayError`] is what every call against the gateway
//! returns on failure, carrying the HTTP status the gateway answered with.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Runtime failure of a gateway call.
///
/// `status_code` is the HTTP status of the failing response, or `0` when no
/// response was received at all (connection refused, timeout, signing failure).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct GatewayError {
    message: String,
    status_code: u32,
}

impl GatewayError {
    pub fn new(message: impl Into<String>, status_code: u32) -> Self {
        Self {
            message: message.into(),
            status_code,
        }
    }

    /// Create an error for a failure that never produced an HTTP response.
    pub fn no_response(message: impl Into<String>) -> Self {
        Self::new(message, 0)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status_code(&self) -> u32 {
        self.status_code
    }

    /// True when the gateway never answered.
    pub fn is_no_response(&self) -> bool {
        self.status_code == 0
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code)
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code >= 500
    }
}

/// Fatal configuration or key-loading failure raised while building a client.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("SantimPay private key path is not configured.")]
    MissingKeyPath,

    #[error("SantimPay private key not found at: {}", .0.display())]
    KeyNotFound(PathBuf),

    #[error("Failed to read SantimPay private key at {}: {source}", path.display())]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid SantimPay private key: {0}")]
    InvalidKey(String),

    #[error("Config file not found at {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to read config file at {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to write config file at {}: {source}", path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid value '{value}' for {key}: expected {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },

    #[error("{0}")]
    Invalid(String),

    #[error("Could not find config directory. Set the SANTIMPAY_CONFIG environment variable or ensure your home directory is accessible.")]
    NoConfigDir,
}

impl ConfigError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    /// True for errors about the signing key rather than the config file.
    pub fn is_key_error(&self) -> bool {
        matches!(
            self,
            Self::MissingKeyPath | Self::KeyNotFound(_) | Self::KeyRead { .. } | Self::InvalidKey(_)
        )
    }
}
