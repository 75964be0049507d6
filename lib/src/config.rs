//! Configuration management for the SantimPay client.
//!
//! Values are layered: built-in defaults, then an optional TOML file
//! (`~/.santimpay/config.toml` by default), then `SANTIMPAY_*` environment
//! variables. Empty environment values are ignored.

use crate::constants::{self, env};
use crate::error::ConfigError;
use crate::http::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

type Result<T> = std::result::Result<T, ConfigError>;

/// Gateway settings. Read once when a client is built and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayConfig {
    /// Gateway base URL
    pub api_url: String,
    /// Full URL of the payment initiation endpoint
    pub initiate_endpoint: String,
    /// Full URL of the transaction status endpoint
    pub transaction_status_endpoint: String,
    pub merchant_id: String,
    /// Private key file, resolved against `storage_root` when relative
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key_path: Option<PathBuf>,
    pub storage_root: PathBuf,
    pub success_url: String,
    pub failure_url: String,
    pub notify_url: String,
    pub cancel_redirect_url: String,
    /// Total attempts per call, first try included
    pub retry_attempts: u32,
    /// Fixed pause between attempts
    pub retry_sleep_ms: u64,
    pub timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_url: constants::DEFAULT_API_URL.to_string(),
            initiate_endpoint: constants::DEFAULT_INITIATE_ENDPOINT.to_string(),
            transaction_status_endpoint: constants::DEFAULT_TRANSACTION_STATUS_ENDPOINT
                .to_string(),
            merchant_id: String::new(),
            private_key_path: None,
            storage_root: PathBuf::from(constants::DEFAULT_STORAGE_ROOT),
            success_url: String::new(),
            failure_url: String::new(),
            notify_url: String::new(),
            cancel_redirect_url: String::new(),
            retry_attempts: constants::DEFAULT_RETRY_ATTEMPTS,
            retry_sleep_ms: constants::DEFAULT_RETRY_SLEEP_MS,
            timeout_secs: constants::DEFAULT_HTTP_TIMEOUT_SECS,
            user_agent: None,
        }
    }
}

/// Builder for creating GatewayConfig instances
///
/// # Examples
///
/// ```
/// use santimpay_lib::GatewayConfig;
///
/// let config = GatewayConfig::builder()
///     .merchant_id("9e2dab64-e2bb-4837-9b85-d855dd878d2b")
///     .private_key_path("keys/santimpay.pem")
///     .success_url("https://shop.example/pay/success")
///     .retry_attempts(5)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.retry_attempts, 5);
/// ```
#[derive(Debug, Default)]
#[must_use]
pub struct GatewayConfigBuilder {
    config: GatewayConfig,
}

macro_rules! string_setter {
    ($($name:ident),* $(,)?) => {
        $(
            pub fn $name(mut self, value: impl Into<String>) -> Self {
                self.config.$name = value.into();
                self
            }
        )*
    };
}

impl GatewayConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    string_setter!(
        api_url,
        initiate_endpoint,
        transaction_status_endpoint,
        merchant_id,
        success_url,
        failure_url,
        notify_url,
        cancel_redirect_url,
    );

    pub fn private_key_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.private_key_path = Some(path.into());
        self
    }

    pub fn storage_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.storage_root = root.into();
        self
    }

    pub fn retry_attempts(mut self, attempts: u32) -> Self {
        self.config.retry_attempts = attempts;
        self
    }

    pub fn retry_sleep_ms(mut self, millis: u64) -> Self {
        self.config.retry_sleep_ms = millis;
        self
    }

    pub fn timeout_secs(mut self, seconds: u64) -> Self {
        self.config.timeout_secs = seconds;
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = Some(ua.into());
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<GatewayConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl GatewayConfig {
    /// Create a new config builder
    pub fn builder() -> GatewayConfigBuilder {
        GatewayConfigBuilder::new()
    }

    /// Get the default config file path (~/.santimpay/config.toml)
    pub fn default_config_path() -> Result<PathBuf> {
        constants::default_config_path().ok_or(ConfigError::NoConfigDir)
    }

    /// Load config from the specified path or the default location.
    ///
    /// Fails if the file does not exist. Environment overrides are not applied.
    pub fn load_from(config_path: Option<impl AsRef<Path>>) -> Result<Self> {
        let path = Self::path_or_default(config_path)?;
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path));
        }

        let config = Self::read_file(&path)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config, returning defaults if the file doesn't exist.
    ///
    /// Errors for an unreadable or malformed file are still propagated.
    pub fn load_or_default(config_path: Option<impl AsRef<Path>>) -> Result<Self> {
        let path = Self::path_or_default(config_path)?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::read_file(&path)
    }

    /// Full resolution used by applications: file (if present), then the
    /// process environment, then validation.
    pub fn resolve(config_path: Option<impl AsRef<Path>>) -> Result<Self> {
        let config = Self::load_or_default(config_path)?.with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    /// Overlay `SANTIMPAY_*` variables from the process environment.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Overlay values returned by `lookup`, keyed by `SANTIMPAY_*` names.
    ///
    /// Missing and empty values leave the current setting in place.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let strings: [(&str, &mut String); 8] = [
            (env::API_URL, &mut self.api_url),
            (env::INITIATE_ENDPOINT, &mut self.initiate_endpoint),
            (
                env::TRANSACTION_STATUS_ENDPOINT,
                &mut self.transaction_status_endpoint,
            ),
            (env::MERCHANT_ID, &mut self.merchant_id),
            (env::SUCCESS_URL, &mut self.success_url),
            (env::FAILURE_URL, &mut self.failure_url),
            (env::NOTIFY_URL, &mut self.notify_url),
            (env::CANCEL_REDIRECT_URL, &mut self.cancel_redirect_url),
        ];
        for (key, field) in strings {
            if let Some(value) = get(key) {
                *field = value;
            }
        }

        if let Some(path) = get(env::PRIVATE_KEY_PATH) {
            self.private_key_path = Some(PathBuf::from(path));
        }
        if let Some(root) = get(env::STORAGE_ROOT) {
            self.storage_root = PathBuf::from(root);
        }
        if let Some(raw) = get(env::RETRY_ATTEMPTS) {
            self.retry_attempts = parse_number(env::RETRY_ATTEMPTS, &raw)?;
        }
        if let Some(raw) = get(env::RETRY_SLEEP_MS) {
            self.retry_sleep_ms = parse_number(env::RETRY_SLEEP_MS, &raw)?;
        }
        if let Some(raw) = get(env::TIMEOUT_SECS) {
            self.timeout_secs = parse_number(env::TIMEOUT_SECS, &raw)?;
        }

        Ok(self)
    }

    /// Validate endpoint URLs and the retry policy.
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("api_url", &self.api_url),
            ("initiate_endpoint", &self.initiate_endpoint),
            ("transaction_status_endpoint", &self.transaction_status_endpoint),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::invalid(format!(
                    "{name} must be an http(s) URL, got '{url}'"
                )));
            }
        }
        if self.retry_attempts == 0 {
            return Err(ConfigError::invalid("retry_attempts must be at least 1"));
        }
        Ok(())
    }

    /// Absolute (or storage-relative) location of the private key file.
    pub fn private_key_location(&self) -> Result<PathBuf> {
        match &self.private_key_path {
            Some(path) if !path.as_os_str().is_empty() => Ok(self.storage_root.join(path)),
            _ => Err(ConfigError::MissingKeyPath),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_attempts,
            Duration::from_millis(self.retry_sleep_ms),
        )
    }

    /// Write the config as TOML, readable by the owner only on Unix.
    ///
    /// A missing parent directory is created with mode 0700.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;
        let write_err = |source| ConfigError::FileWrite {
            path: path.to_path_buf(),
            source,
        };

        // Only a directory created here is narrowed to 0700. Existing parents keep their mode.
        if let Some(parent) = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty() && !p.exists())
        {
            std::fs::create_dir_all(parent).map_err(write_err)?;
            restrict_permissions(parent, 0o700).map_err(write_err)?;
        }

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(path).map_err(write_err)?;
        file.write_all(content.as_bytes()).map_err(write_err)?;
        restrict_permissions(path, 0o600).map_err(write_err)?;
        Ok(())
    }

    fn path_or_default(config_path: Option<impl AsRef<Path>>) -> Result<PathBuf> {
        match config_path {
            Some(path) => Ok(path.as_ref().to_path_buf()),
            None => Self::default_config_path(),
        }
    }

    fn read_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn parse_number<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
            expected: "a non-negative integer",
        })
}

#[cfg(unix)]
fn restrict_permissions(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}
