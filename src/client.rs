//! Binance USD-M futures REST client
//!
//! Every endpoint follows the same path: validate the typed arguments, build
//! a [`RequestSpec`], encode and (when required) sign it, send it through the
//! shared [`Transport`], then decode the JSON body.
//!
//! Endpoint methods live in the `market`, `trade`, `account` and `stream`
//! modules as further `impl FuturesClient` blocks.
//!
//! # Example
//!
//! ```no_run
//! use binance_fapi::{FuturesClient, Timing};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), binance_fapi::FapiError> {
//!     let client = FuturesClient::new("api_key", "api_secret")?;
//!
//!     let depth = client.depth("BTCUSDT", Some(5)).await?;
//!     println!("{}", depth);
//!
//!     let balances = client.balance(Timing::now()).await?;
//!     println!("{}", balances);
//!     Ok(())
//! }
//! ```

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::auth::Credentials;
use crate::config::ClientConfig;
use crate::error::{FapiError, Result};
use crate::request::{Host, RequestSpec, Security, Timing};
use crate::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, FORM_CONTENT_TYPE};

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "X-MBX-APIKEY";

/// Binance USD-M futures REST client
///
/// Cheap to clone; clones share the transport and its connection pool.
#[derive(Clone)]
pub struct FuturesClient {
    credentials: Credentials,
    config: ClientConfig,
    transport: Arc<dyn Transport>,
}

impl FuturesClient {
    /// Create a client for the production hosts
    ///
    /// Builds the HTTP connection pool; performs no network I/O.
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Result<Self> {
        Self::with_config(Credentials::new(api_key, api_secret), ClientConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::with_transport(credentials, config, Arc::new(transport)))
    }

    /// Create a client on top of an arbitrary transport
    pub fn with_transport(
        credentials: Credentials,
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            credentials,
            config,
            transport,
        }
    }

    /// Create a client from `BINANCE_API_KEY` / `BINANCE_API_SECRET`
    pub fn from_env() -> Result<Self> {
        Self::with_config(Credentials::from_env()?, ClientConfig::default())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn api_key(&self) -> &str {
        self.credentials.api_key()
    }

    /// Fill unset timing fields from the client defaults
    fn resolve_timing(&self, timing: Timing) -> Timing {
        let timestamp = match timing.timestamp {
            None if self.config.stamp_timestamps => Some(chrono::Utc::now().timestamp_millis()),
            ts => ts,
        };

        Timing {
            recv_window: timing.recv_window.or(self.config.default_recv_window),
            timestamp,
        }
    }

    /// Encode, sign and address a request
    ///
    /// Pure apart from the optional timestamp stamping, so the exact bytes
    /// that would go on the wire can be inspected without a transport.
    pub fn prepare(&self, spec: RequestSpec) -> Result<HttpRequest> {
        let mut params = spec.params;

        if let Some(timing) = spec.timing {
            let timing = self.resolve_timing(timing);
            timing.validate()?;
            timing.append_to(&mut params);
        }

        let mut payload = params.encode()?;

        if spec.security == Security::Signed {
            let signature = self.credentials.sign(&payload);
            if !payload.is_empty() {
                payload.push('&');
            }
            payload.push_str("signature=");
            payload.push_str(&signature);
        }

        let base = match spec.host {
            Host::Futures => &self.config.futures_base_url,
            Host::General => &self.config.general_base_url,
        };

        let mut headers = Vec::new();
        if spec.security.needs_api_key() {
            headers.push((API_KEY_HEADER.to_string(), self.credentials.api_key().to_string()));
        }

        let (url, body) = if spec.method.has_body() && !payload.is_empty() {
            headers.push(("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string()));
            (format!("{}{}", base, spec.path), Some(payload))
        } else if payload.is_empty() {
            (format!("{}{}", base, spec.path), None)
        } else {
            (format!("{}{}?{}", base, spec.path, payload), None)
        };

        Ok(HttpRequest {
            method: spec.method,
            url,
            headers,
            body,
        })
    }

    /// Dispatch a request and return the parsed JSON body
    pub async fn execute(&self, spec: RequestSpec) -> Result<Value> {
        let method = spec.method;
        let path = spec.path;
        let security = spec.security;

        let request = self.prepare(spec)?;

        debug!(method = %method, path = path, security = ?security, "Sending request");

        let response = self.transport.send(request).await?;
        decode_response(method.as_str(), path, response)
    }

    /// Dispatch a request and deserialize the body into `T`
    pub(crate) async fn execute_typed<T: DeserializeOwned>(&self, spec: RequestSpec) -> Result<T> {
        let path = spec.path;
        let value = self.execute(spec).await?;
        serde_json::from_value(value)
            .map_err(|e| FapiError::Parse(format!("unexpected {} response shape: {}", path, e)))
    }
}

fn decode_response(method: &str, path: &str, response: HttpResponse) -> Result<Value> {
    if !response.is_success() {
        let err = FapiError::from_error_response(response.status, &response.body);
        warn!(
            method = method,
            path = path,
            status = response.status,
            code = ?err.api_code(),
            "Request rejected"
        );
        return Err(err);
    }

    if response.body.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&response.body)
        .map_err(|e| FapiError::Parse(format!("invalid JSON from {}: {}", path, e)))
}

impl std::fmt::Debug for FuturesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FuturesClient")
            .field("futures_base_url", &self.config.futures_base_url)
            .field("general_base_url", &self.config.general_base_url)
            .field("api_key", &self.credentials.api_key())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::sign_request;
    use crate::request::{Method, Params};

    fn client(config: ClientConfig) -> FuturesClient {
        FuturesClient::with_config(Credentials::new("test_key", "test_secret"), config).unwrap()
    }

    #[test]
    fn test_prepare_public_get() {
        let client = client(ClientConfig::default());
        let mut params = Params::new();
        params.push("symbol", "BTCUSDT").push("limit", 500);

        let request = client
            .prepare(RequestSpec::public(Method::Get, "/fapi/v1/depth", params))
            .unwrap();

        assert_eq!(
            request.url,
            "https://fapi.binance.com/fapi/v1/depth?symbol=BTCUSDT&limit=500"
        );
        assert!(request.headers.is_empty());
        assert!(request.body.is_none());
    }

    #[test]
    fn test_prepare_signed_post_uses_form_body() {
        let client = client(ClientConfig::default());
        let mut params = Params::new();
        params.push("symbol", "BTCUSDT").push("leverage", 10);

        let request = client
            .prepare(RequestSpec::signed(Method::Post, "/fapi/v1/leverage", params, Timing::none()))
            .unwrap();

        let expected_sig = sign_request("symbol=BTCUSDT&leverage=10", "test_secret");
        assert_eq!(request.url, "https://fapi.binance.com/fapi/v1/leverage");
        assert_eq!(
            request.body.as_deref(),
            Some(format!("symbol=BTCUSDT&leverage=10&signature={}", expected_sig).as_str())
        );
        assert_eq!(request.header(API_KEY_HEADER), Some("test_key"));
        assert_eq!(request.header("Content-Type"), Some(FORM_CONTENT_TYPE));
    }

    #[test]
    fn test_prepare_signed_without_params() {
        let client = client(ClientConfig::default());
        let request = client
            .prepare(RequestSpec::signed(Method::Get, "/fapi/v2/balance", Params::new(), Timing::none()))
            .unwrap();

        let expected_sig = sign_request("", "test_secret");
        assert_eq!(request.query(), Some(format!("signature={}", expected_sig).as_str()));
    }

    #[test]
    fn test_prepare_applies_config_timing_defaults() {
        let client = client(
            ClientConfig::default()
                .with_default_recv_window(5000)
                .with_stamp_timestamps(true),
        );

        let request = client
            .prepare(RequestSpec::signed(Method::Get, "/fapi/v2/account", Params::new(), Timing::none()))
            .unwrap();

        let query = request.query().unwrap();
        assert!(query.starts_with("recvWindow=5000&timestamp="));
        assert!(query.contains("&signature="));
    }

    #[test]
    fn test_explicit_timing_wins_over_defaults() {
        let client = client(
            ClientConfig::default()
                .with_default_recv_window(5000)
                .with_stamp_timestamps(true),
        );

        let request = client
            .prepare(RequestSpec::signed(
                Method::Get,
                "/fapi/v2/account",
                Params::new(),
                Timing::at(1_000).with_recv_window(2_000),
            ))
            .unwrap();

        let payload = "recvWindow=2000&timestamp=1000";
        let expected = format!("{}&signature={}", payload, sign_request(payload, "test_secret"));
        assert_eq!(request.query(), Some(expected.as_str()));
    }

    #[test]
    fn test_prepare_general_host() {
        let client = client(ClientConfig::default());
        let request = client
            .prepare(
                RequestSpec::signed(Method::Get, "/api/v3/account", Params::new(), Timing::at(1))
                    .on_general_host(),
            )
            .unwrap();

        assert!(request.url.starts_with("https://api.binance.com/api/v3/account?timestamp=1&signature="));
    }

    #[test]
    fn test_keyed_request_has_header_but_no_signature() {
        let client = client(ClientConfig::default());
        let request = client
            .prepare(RequestSpec::keyed(Method::Post, "/fapi/v1/listenKey", Params::new()))
            .unwrap();

        assert_eq!(request.header(API_KEY_HEADER), Some("test_key"));
        assert!(request.body.is_none());
        assert!(!request.url.contains("signature"));
    }

    #[test]
    fn test_decode_response_variants() {
        let ok = decode_response("GET", "/fapi/v1/ping", HttpResponse::new(200, "{}")).unwrap();
        assert_eq!(ok, serde_json::json!({}));

        let empty = decode_response("DELETE", "/fapi/v1/listenKey", HttpResponse::new(200, "")).unwrap();
        assert!(empty.is_null());

        let err = decode_response("GET", "/fapi/v1/time", HttpResponse::new(200, "not json")).unwrap_err();
        assert!(matches!(err, FapiError::Parse(_)));

        let err = decode_response(
            "GET",
            "/fapi/v1/depth",
            HttpResponse::new(400, r#"{"code":-1121,"msg":"Invalid symbol."}"#),
        )
        .unwrap_err();
        assert!(matches!(err, FapiError::Http { status: 400, code: Some(-1121), .. }));
    }

    #[test]
    fn test_debug_omits_secret() {
        let client = client(ClientConfig::default());
        let printed = format!("{:?}", client);
        assert!(printed.contains("test_key"));
        assert!(!printed.contains("test_secret"));
    }
}
