//! Integration tests for the curl transport against a local socket server

mod common;

use common::{test_config, verify_token, MERCHANT_ID};
use santimpay_lib::{
    CurlTransport, GatewayClient, GatewayConfig, GatewayError, HttpRequest, Transport,
    TransportError,
};
use serde_json::json;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};

/// Accept one connection, answer it, and hand back the raw request text.
fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
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

/// Accept one connection and answer it with a 302 pointing at `location`.
fn serve_redirect(location: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind local listener");
    let addr = listener.local_addr().unwrap();

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept connection");
        let request = read_request(&mut stream);
        let response = format!(
            "HTTP/1.1 302 Found\r\nLocation: {location}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
        );
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();
        request
    });

    (format!("http://{addr}/api/v1/gateway/initiate-payment"), handle)
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

fn request_body(raw: &str) -> serde_json::Value {
    let (_, body) = raw.split_once("\r\n\r\n").expect("request has a body");
    serde_json::from_str(body).expect("request body is JSON")
}

/// A local address with nothing listening on it.
fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api/v1/gateway")
}

fn local_config(initiate: &str, status: &str, attempts: u32) -> GatewayConfig {
    GatewayConfig {
        initiate_endpoint: initiate.to_string(),
        transaction_status_endpoint: status.to_string(),
        retry_attempts: attempts,
        timeout_secs: 5,
        ..test_config()
    }
}

#[test]
fn test_curl_transport_round_trip() {
    let (url, server) = serve_once("200 OK", r#"{"ok":true}"#);
    let transport = CurlTransport::builder()
        .timeout(5)
        .user_agent("TestAgent/1.0")
        .header("X-Custom", "value")
        .build();

    let request = HttpRequest::json_post(&url, &json!({"id": "txn-1"})).unwrap();
    let response = transport.post(&request).unwrap();

    assert_eq!(response.status_code, 200);
    assert_eq!(response.json().unwrap(), json!({"ok": true}));
    assert_eq!(
        response.get_header("Content-Type").map(String::as_str),
        Some("application/json")
    );

    let raw = server.join().unwrap();
    let head = raw.to_lowercase();
    assert!(head.starts_with("post /api/v1/gateway http/1.1"));
    assert!(head.contains("user-agent: testagent/1.0"));
    assert!(head.contains("x-custom: value"));
    assert!(head.contains("accept: application/json"));
    assert!(!head.contains("expect: 100-continue"));
    assert_eq!(request_body(&raw), json!({"id": "txn-1"}));
}

#[test]
fn test_curl_transport_connection_refused() {
    let transport = CurlTransport::builder().timeout(5).build();
    let request = HttpRequest::json_post(refused_url(), &json!({})).unwrap();

    let err = transport.post(&request).unwrap_err();
    assert!(matches!(err, TransportError::Connect(_)), "got {err:?}");
}

#[test]
fn test_client_initiates_payment_over_http() {
    let (url, server) = serve_once("200 OK", r#"{"url":"https://pay.example/x"}"#);
    let client = GatewayClient::new(local_config(&url, &url, 1)).unwrap();

    let result = client
        .initiate_payment("txn-http", 1200, "Coffee", Some("+251911000000"))
        .unwrap();
    assert_eq!(result.status_code, 200);
    assert_eq!(result.url.as_deref(), Some("https://pay.example/x"));

    let raw = server.join().unwrap();
    let body = request_body(&raw);
    assert_eq!(body["id"], "txn-http");
    assert_eq!(body["phoneNumber"], "+251911000000");
    let claims = verify_token(body["signedToken"].as_str().unwrap());
    assert_eq!(claims["merchantId"], MERCHANT_ID);
}

#[test]
fn test_client_status_error_over_http() {
    let (url, server) = serve_once("400 Bad Request", r#"{"message":"invalid amount"}"#);
    let client = GatewayClient::new(local_config(&url, &url, 1)).unwrap();

    let err = client.check_transaction_status("txn-http").unwrap_err();
    assert_eq!(err, GatewayError::new("invalid amount", 400));

    let raw = server.join().unwrap();
    assert!(raw
        .to_lowercase()
        .contains("content-type: application/json; charset=utf-8"));
}

#[test]
fn test_client_unreachable_gateway_reports_status_zero() {
    let url = refused_url();
    let client = GatewayClient::new(local_config(&url, &url, 2)).unwrap();

    let err = client.initiate_payment("txn-1", 100, "Tea", None).unwrap_err();
    assert_eq!(err.status_code(), 0);
    assert!(!err.message().is_empty());
}

#[test]
fn test_curl_transport_does_not_follow_redirects_by_default() {
    let (url, redirect) = serve_redirect("http://127.0.0.1:9/elsewhere".to_string());
    let transport = CurlTransport::builder().timeout(5).build();

    let request = HttpRequest::json_post(&url, &json!({})).unwrap();
    let response = transport.post(&request).unwrap();

    assert_eq!(response.status_code, 302);
    assert_eq!(
        response.get_header("Location").map(String::as_str),
        Some("http://127.0.0.1:9/elsewhere")
    );
    redirect.join().unwrap();
}

#[test]
fn test_client_follows_gateway_redirect() {
    let (target, final_server) = serve_once("200 OK", r#"{"url":"https://pay.example/moved"}"#);
    let (url, redirect) = serve_redirect(target);
    let client = GatewayClient::new(local_config(&url, &url, 1)).unwrap();

    let result = client.initiate_payment("txn-moved", 500, "Tea", None).unwrap();
    assert_eq!(result.status_code, 200);
    assert_eq!(result.url.as_deref(), Some("https://pay.example/moved"));

    let first = redirect.join().unwrap();
    assert!(first.to_lowercase().starts_with("post "));
    assert_eq!(request_body(&first)["id"], "txn-moved");

    // 302 after a POST is re-sent as a GET
    let second = final_server.join().unwrap();
    assert!(second.to_lowercase().starts_with("get /api/v1/gateway"));
}
