//! Shared fixtures for santimpay-lib integration tests

#![allow(dead_code)]

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use santimpay_lib::{GatewayConfig, HttpRequest, HttpResponse, Transport, TransportError};
use std::collections::VecDeque;
use std::sync::Mutex;

pub const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");
pub const PKCS8_KEY_FILE: &str = "merchant_pkcs8.pem";
pub const SEC1_KEY_FILE: &str = "merchant_sec1.pem";
pub const PUBLIC_KEY_PEM: &str = include_str!("../fixtures/merchant_public.pem");

pub const MERCHANT_ID: &str = "9e2dab64-e2bb-4837-9b85-d855dd878d2b";
pub const INITIATE_URL: &str = "https://gateway.test/api/v1/gateway/initiate-payment";
pub const STATUS_URL: &str = "https://gateway.test/api/v1/gateway/fetch-transaction-status";

/// Config pointing at the fixture key, with no delay between retries.
pub fn test_config() -> GatewayConfig {
    GatewayConfig::builder()
        .merchant_id(MERCHANT_ID)
        .storage_root(FIXTURES_DIR)
        .private_key_path(PKCS8_KEY_FILE)
        .initiate_endpoint(INITIATE_URL)
        .transaction_status_endpoint(STATUS_URL)
        .success_url("https://shop.test/success")
        .failure_url("https://shop.test/failure")
        .cancel_redirect_url("https://shop.test/cancel")
        .notify_url("https://shop.test/notify")
        .retry_attempts(3)
        .retry_sleep_ms(0)
        .build()
        .expect("test config should be valid")
}

type Reply = Result<HttpResponse, TransportError>;

/// Transport that replays canned replies and records every request it sees.
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    repeat: Option<Reply>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    /// Reply with each entry in order, one per attempt.
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            repeat: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Reply with the same thing on every attempt.
    pub fn always(reply: Reply) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            repeat: Some(reply),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn json(status: u32, body: serde_json::Value) -> Self {
        Self::always(Ok(HttpResponse::new(status, body.to_string())))
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_json_body(&self) -> serde_json::Value {
        self.requests()
            .last()
            .expect("no request was sent")
            .json_body()
            .expect("request body should be JSON")
    }
}

impl Transport for ScriptedTransport {
    fn post(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(reply) = self.replies.lock().unwrap().pop_front() {
            return reply;
        }
        self.repeat
            .clone()
            .expect("ScriptedTransport ran out of replies")
    }
}

/// Verify `token` against the fixture public key and return its claims.
pub fn verify_token(token: &str) -> serde_json::Value {
    let key = DecodingKey::from_ec_pem(PUBLIC_KEY_PEM.as_bytes()).expect("valid public key");
    let mut validation = Validation::new(Algorithm::ES256);
    validation.required_spec_claims.clear();
    validation.validate_exp = false;

    jsonwebtoken::decode::<serde_json::Value>(token, &key, &validation)
        .expect("token should verify against the merchant public key")
        .claims
}
