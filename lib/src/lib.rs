//! santimpay-lib - Client library for the SantimPay payment gateway
//!
//! This library signs gateway requests with an ES256 token derived from the
//! merchant's private key, initiates payments, and looks up transaction
//! status, with bounded retry over a blocking HTTP transport.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod http;
pub mod signer;

pub use client::{generate_merchant_txn_id, GatewayClient, PaymentRequest, PaymentResult};
pub use config::{GatewayConfig, GatewayConfigBuilder};
pub use error::{ConfigError, GatewayError, Result};
pub use http::{
    CurlTransport, CurlTransportBuilder, HttpRequest, HttpResponse, RetryPolicy, Transport,
    TransportError,
};
pub use signer::{PaymentClaims, StatusClaims, TokenSigner};
