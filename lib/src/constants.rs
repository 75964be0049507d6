//! Constants used throughout the santimpay library

use std::path::PathBuf;

/// Application name, used for the home directory
pub const APP_NAME: &str = "santimpay";

/// Config file name
pub const CONFIG_FILE: &str = "config.toml";

/// Default gateway base URL
pub const DEFAULT_API_URL: &str = "https://services.santimpay.com";

/// Default payment initiation endpoint
pub const DEFAULT_INITIATE_ENDPOINT: &str =
    "https://services.santimpay.com/api/v1/gateway/initiate-payment";

/// Default transaction status endpoint
pub const DEFAULT_TRANSACTION_STATUS_ENDPOINT: &str =
    "https://services.santimpay.com/api/v1/gateway/fetch-transaction-status";

/// Directory that relative private key paths are resolved against
pub const DEFAULT_STORAGE_ROOT: &str = "storage";

/// Total attempts per gateway call (first try included)
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

/// Fixed delay between attempts, in milliseconds
pub const DEFAULT_RETRY_SLEEP_MS: u64 = 200;

/// Default HTTP request timeout in seconds (30 seconds)
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Redirect hops followed before giving up
pub const MAX_REDIRECTS: u32 = 5;

/// Content type sent with status lookups
pub const JSON_UTF8_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Environment variables that override config file values.
pub mod env {
    pub const API_URL: &str = "SANTIMPAY_API_URL";
    pub const INITIATE_ENDPOINT: &str = "SANTIMPAY_INITIATE_ENDPOINT";
    pub const TRANSACTION_STATUS_ENDPOINT: &str = "SANTIMPAY_TRANSACTION_STATUS_ENDPOINT";
    pub const MERCHANT_ID: &str = "SANTIMPAY_MERCHANT_ID";
    pub const PRIVATE_KEY_PATH: &str = "SANTIMPAY_PRIVATE_KEY_PATH";
    pub const STORAGE_ROOT: &str = "SANTIMPAY_STORAGE_ROOT";
    pub const SUCCESS_URL: &str = "SANTIMPAY_SUCCESS_URL";
    pub const FAILURE_URL: &str = "SANTIMPAY_FAILURE_URL";
    pub const NOTIFY_URL: &str = "SANTIMPAY_NOTIFY_URL";
    pub const CANCEL_REDIRECT_URL: &str = "SANTIMPAY_CANCEL_REDIRECT_URL";
    pub const RETRY_ATTEMPTS: &str = "SANTIMPAY_RETRY_ATTEMPTS";
    pub const RETRY_SLEEP_MS: &str = "SANTIMPAY_RETRY_SLEEP_MS";
    pub const TIMEOUT_SECS: &str = "SANTIMPAY_TIMEOUT_SECS";
}

/// Default User-Agent sent to the gateway
pub fn default_user_agent() -> String {
    format!("santimpay-rs/{}", crate::VERSION)
}

/// Get the santimpay home directory (`~/.santimpay/`)
///
/// Returns `None` if the home directory cannot be determined.
///
/// # Examples
///
/// ```
/// use santimpay_lib::constants::santimpay_home_dir;
///
/// if let Some(path) = santimpay_home_dir() {
///     println!("SantimPay home dir: {}", path.display());
/// }
/// ```
pub fn santimpay_home_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(format!(".{APP_NAME}")))
}

/// Get the default config file path (`~/.santimpay/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    santimpay_home_dir().map(|p| p.join(CONFIG_FILE))
}
