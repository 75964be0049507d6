//! High-level client for the SantimPay gateway.
//!
//! [`GatewayClient`] signs each request with a fresh ES256 token, posts it
//! through a [`Transport`] with bounded retry, and turns every failure into a
//! [`GatewayError`].
//!
//! The two operations deliberately differ in how they treat non-2xx replies:
//! [`GatewayClient::initiate_payment`] hands back any response below 400 as a
//! [`PaymentResult`] for the caller to inspect, while
//! [`GatewayClient::check_transaction_status`] fails on anything outside 2xx.

use crate::config::GatewayConfig;
use crate::constants::JSON_UTF8_CONTENT_TYPE;
use crate::error::{ConfigError, GatewayError, Result};
use crate::http::{
    send_with_retry, CurlTransport, CurlTransportBuilder, HttpRequest, HttpResponse, RequestFailure, RetryPolicy,
    Transport,
};
use crate::signer::{PaymentClaims, StatusClaims, TokenSigner};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A payment to initiate.
///
/// # Example
/// ```
/// use santimpay_lib::PaymentRequest;
///
/// let request = PaymentRequest::new(2500, "Order #1042").with_phone_number("+251911000000");
/// assert_eq!(request.amount, 2500);
/// assert!(!request.merchant_txn_id.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub merchant_txn_id: String,
    /// Amount in the smallest currency unit
    pub amount: u64,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl PaymentRequest {
    /// Create a request with a freshly generated merchant transaction id.
    pub fn new(amount: u64, reason: impl Into<String>) -> Self {
        Self {
            merchant_txn_id: generate_merchant_txn_id(),
            amount,
            reason: reason.into(),
            phone_number: None,
        }
    }

    #[must_use]
    pub fn with_merchant_txn_id(mut self, id: impl Into<String>) -> Self {
        self.merchant_txn_id = id.into();
        self
    }

    #[must_use]
    pub fn with_phone_number(mut self, phone: impl Into<String>) -> Self {
        self.phone_number = Some(phone.into());
        self
    }
}

/// Outcome of a payment initiation that received a non-failing response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentResult {
    pub status_code: u32,
    /// Checkout URL returned by the gateway, when present
    pub url: Option<String>,
    /// Full decoded response body
    pub body: Value,
}

impl PaymentResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InitiatePayload<'a> {
    id: &'a str,
    amount: u64,
    reason: &'a str,
    merchant_id: &'a str,
    signed_token: String,
    success_redirect_url: &'a str,
    failure_redirect_url: &'a str,
    cancel_redirect_url: &'a str,
    notify_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone_number: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct StatusPayload<'a> {
    id: &'a str,
    merchant_id: &'a str,
    signed_token: String,
}

/// Generate a fresh merchant transaction id (UUID v4).
pub fn generate_merchant_txn_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Client for the SantimPay gateway.
///
/// The client holds only read-only state and can be shared across threads.
///
/// # Example
/// ```no_run
/// use santimpay_lib::{GatewayClient, GatewayConfig};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = GatewayConfig::builder()
///     .merchant_id("9e2dab64-e2bb-4837-9b85-d855dd878d2b")
///     .private_key_path("keys/santimpay.pem")
///     .build()?;
/// let client = GatewayClient::new(config)?;
///
/// let txn_id = client.generate_merchant_txn_id();
/// let result = client.initiate_payment(&txn_id, 1000, "Subscription", None)?;
/// println!("redirect to {:?}", result.url);
/// # Ok(())
/// # }
/// ```
pub struct GatewayClient<T: Transport = CurlTransport> {
    config: GatewayConfig,
    signer: TokenSigner,
    transport: T,
    retry: RetryPolicy,
}

impl GatewayClient<CurlTransport> {
    /// Create a client backed by curl, loading the signing key from the config.
    ///
    /// # Errors
    /// Returns a `ConfigError` if the key path is unset, the key file is
    /// missing or unreadable, or it does not hold a P-256 private key.
    pub fn new(config: GatewayConfig) -> std::result::Result<Self, ConfigError> {
        let transport = CurlTransportBuilder::from_config(&config).build();
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> GatewayClient<T> {
    /// Create a client that sends requests through `transport`.
    pub fn with_transport(
        config: GatewayConfig,
        transport: T,
    ) -> std::result::Result<Self, ConfigError> {
        let key_path = config.private_key_location()?;
        let signer = TokenSigner::from_file(&key_path)?;
        tracing::debug!(key = %key_path.display(), "loaded gateway signing key");
        Ok(Self::from_parts(config, signer, transport))
    }

    /// Assemble a client from an already-loaded signer.
    pub fn from_parts(config: GatewayConfig, signer: TokenSigner, transport: T) -> Self {
        let retry = config.retry_policy();
        Self {
            config,
            signer,
            transport,
            retry,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn generate_merchant_txn_id(&self) -> String {
        generate_merchant_txn_id()
    }

    /// Sign an arbitrary claim set with the merchant key.
    pub fn sign_token<C: Serialize>(&self, claims: &C) -> Result<String> {
        self.signer.sign(claims)
    }

    /// Token authorising a payment initiation, stamped with the current time.
    pub fn signed_payment_token(&self, amount: u64, reason: &str) -> Result<String> {
        self.sign_token(&PaymentClaims::new(amount, reason, &self.config.merchant_id))
    }

    /// Token authorising a status lookup for `id`, stamped with the current time.
    pub fn signed_status_token(&self, id: &str) -> Result<String> {
        self.sign_token(&StatusClaims::new(id, &self.config.merchant_id))
    }

    /// Start a payment and return the gateway's reply.
    ///
    /// Any response below 400 is returned as a [`PaymentResult`], including
    /// non-2xx ones; check `status_code`. Transport failures and 4xx/5xx
    /// responses are retried and, once attempts run out, returned as a
    /// [`GatewayError`]. An empty `phone_number` is treated as absent.
    pub fn initiate_payment(
        &self,
        merchant_txn_id: &str,
        amount: u64,
        reason: &str,
        phone_number: Option<&str>,
    ) -> Result<PaymentResult> {
        let payload = InitiatePayload {
            id: merchant_txn_id,
            amount,
            reason,
            merchant_id: &self.config.merchant_id,
            signed_token: self.signed_payment_token(amount, reason)?,
            success_redirect_url: &self.config.success_url,
            failure_redirect_url: &self.config.failure_url,
            cancel_redirect_url: &self.config.cancel_redirect_url,
            notify_url: &self.config.notify_url,
            phone_number: phone_number.filter(|p| !p.is_empty()),
        };
        let request = HttpRequest::json_post(&self.config.initiate_endpoint, &payload)
            .map_err(|e| GatewayError::no_response(e.to_string()))?;

        let response = self.send(&request)?;
        let body = decode_body(&response)?;
        let url = body.get("url").and_then(Value::as_str).map(str::to_string);

        tracing::info!(
            merchant_txn_id,
            status = response.status_code,
            has_url = url.is_some(),
            "payment initiated"
        );

        Ok(PaymentResult {
            status_code: response.status_code,
            url,
            body,
        })
    }

    /// Fetch the gateway's record for transaction `id`, verbatim.
    ///
    /// Unlike [`initiate_payment`](Self::initiate_payment), any non-2xx
    /// response is an error.
    pub fn check_transaction_status(&self, id: &str) -> Result<Value> {
        let payload = StatusPayload {
            id,
            merchant_id: &self.config.merchant_id,
            signed_token: self.signed_status_token(id)?,
        };
        let request = HttpRequest::json_post(&self.config.transaction_status_endpoint, &payload)
            .map_err(|e| GatewayError::no_response(e.to_string()))?
            .header("Content-Type", JSON_UTF8_CONTENT_TYPE);

        let response = self.send(&request)?;
        if !response.is_success() {
            return Err(failure_to_error(RequestFailure::Status(response)));
        }

        tracing::info!(id, status = response.status_code, "transaction status fetched");
        decode_body(&response)
    }

    /// Initiate `request` and return only the checkout URL.
    pub fn generate_payment_url(&self, request: &PaymentRequest) -> Result<Option<String>> {
        self.initiate_payment(
            &request.merchant_txn_id,
            request.amount,
            &request.reason,
            request.phone_number.as_deref(),
        )
        .map(|result| result.url)
    }

    /// Alias of [`check_transaction_status`](Self::check_transaction_status).
    pub fn get_transaction_by_id(&self, id: &str) -> Result<Value> {
        self.check_transaction_status(id)
    }

    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        send_with_retry(&self.transport, request, &self.retry).map_err(|failure| {
            let err = failure_to_error(failure);
            tracing::warn!(
                url = %request.url,
                status = err.status_code(),
                error = %err,
                "gateway request failed"
            );
            err
        })
    }
}

fn decode_body(response: &HttpResponse) -> Result<Value> {
    response.json().map_err(|e| {
        GatewayError::no_response(format!(
            "Gateway returned an invalid JSON body (HTTP {}): {e}",
            response.status_code
        ))
    })
}

/// Map a failed request to a `GatewayError`.
///
/// Message priority: the body's `message` field, then the raw body, then
/// the transport or status description.
fn failure_to_error(failure: RequestFailure) -> GatewayError {
    let status = failure.status_code();
    let message = failure
        .response()
        .and_then(|response| message_from_body(response).or_else(|| non_empty(response.body_text())))
        .unwrap_or_else(|| failure.to_string());
    GatewayError::new(message, status)
}

fn message_from_body(response: &HttpResponse) -> Option<String> {
    let body: Value = serde_json::from_slice(&response.body).ok()?;
    match body.get("message")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}
