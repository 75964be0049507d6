//! Common test utilities for santimpay CLI tests

#![allow(dead_code)]

use std::fs;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::process::Command;
use std::thread::{self, JoinHandle};
use tempfile::TempDir;

/// Merchant key shared with the library tests
pub const TEST_KEY_PEM: &str = include_str!("../../../lib/tests/fixtures/merchant_pkcs8.pem");

pub const TEST_MERCHANT_ID: &str = "9e2dab64-e2bb-4837-9b85-d855dd878d2b";

/// Every variable the CLI reads from the environment.
const SANTIMPAY_ENV: &[&str] = &[
    "SANTIMPAY_CONFIG",
    "SANTIMPAY_API_URL",
    "SANTIMPAY_INITIATE_ENDPOINT",
    "SANTIMPAY_TRANSACTION_STATUS_ENDPOINT",
    "SANTIMPAY_MERCHANT_ID",
    "SANTIMPAY_PRIVATE_KEY_PATH",
    "SANTIMPAY_STORAGE_ROOT",
    "SANTIMPAY_SUCCESS_URL",
    "SANTIMPAY_FAILURE_URL",
    "SANTIMPAY_NOTIFY_URL",
    "SANTIMPAY_CANCEL_REDIRECT_URL",
    "SANTIMPAY_RETRY_ATTEMPTS",
    "SANTIMPAY_RETRY_SLEEP_MS",
    "SANTIMPAY_TIMEOUT_SECS",
];

/// Builder for creating test configurations under a temporary HOME
pub struct TestConfigBuilder {
    temp_dir: TempDir,
    with_key: bool,
    initiate_endpoint: Option<String>,
    status_endpoint: Option<String>,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
            with_key: true,
            initiate_endpoint: None,
            status_endpoint: None,
        }
    }

    /// Leave `private_key_path` out of the config
    pub fn without_key(mut self) -> Self {
        self.with_key = false;
        self
    }

    pub fn initiate_endpoint(mut self, url: impl Into<String>) -> Self {
        self.initiate_endpoint = Some(url.into());
        self
    }

    pub fn status_endpoint(mut self, url: impl Into<String>) -> Self {
        self.status_endpoint = Some(url.into());
        self
    }

    /// Write `~/.santimpay/config.toml` and the key under the storage root
    pub fn build(self) -> TempDir {
        let home = self.temp_dir.path();
        let app_dir = home.join(".santimpay");
        let storage = home.join("storage");
        fs::create_dir_all(&app_dir).expect("Failed to create santimpay directory");
        fs::create_dir_all(storage.join("keys")).expect("Failed to create storage directory");

        let mut config = format!(
            "merchant_id = \"{TEST_MERCHANT_ID}\"\n\
             storage_root = \"{}\"\n\
             success_url = \"https://shop.test/success\"\n\
             failure_url = \"https://shop.test/failure\"\n\
             notify_url = \"https://shop.test/notify\"\n\
             cancel_redirect_url = \"https://shop.test/cancel\"\n\
             retry_attempts = 1\n\
             retry_sleep_ms = 0\n\
             timeout_secs = 5\n",
            storage.display()
        );

        if self.with_key {
            fs::write(storage.join("keys/merchant.pem"), TEST_KEY_PEM)
                .expect("Failed to write key");
            config.push_str("private_key_path = \"keys/merchant.pem\"\n");
        }
        if let Some(url) = &self.initiate_endpoint {
            config.push_str(&format!("initiate_endpoint = \"{url}\"\n"));
        }
        if let Some(url) = &self.status_endpoint {
            config.push_str(&format!("transaction_status_endpoint = \"{url}\"\n"));
        }

        fs::write(app_dir.join("config.toml"), config).expect("Failed to write config");
        self.temp_dir
    }
}

/// Set up a test configuration with a signing key and default endpoints
pub fn setup_test_config() -> TempDir {
    TestConfigBuilder::new().build()
}

pub fn config_file(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join(".santimpay/config.toml")
}

/// Create a test command isolated from the caller's HOME and `SANTIMPAY_*` variables
pub fn test_command(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("santimpay"));
    cmd.env("HOME", temp_dir.path());
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("RUST_LOG");
    for key in SANTIMPAY_ENV {
        cmd.env_remove(key);
    }
    cmd
}

/// Accept one connection, answer it with `status_line` and `body`, and
/// hand back the raw request text.
pub fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind local listener");
    let addr = listener.local_addr().unwrap();

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept connection");
        let request = read_request(&mut stream);
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();
        request
    });

    (format!("http://{addr}/api/v1/gateway"), handle)
}

/// A local address with nothing listening on it.
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api/v1/gateway")
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let content_length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8(buf).unwrap()
}

/// JSON body of a raw HTTP request
pub fn request_body(raw: &str) -> serde_json::Value {
    let (_, body) = raw.split_once("\r\n\r\n").expect("request has a body");
    serde_json::from_str(body).expect("request body is JSON")
}
