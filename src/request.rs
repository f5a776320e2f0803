//! Request model shared by every endpoint
//!
//! An endpoint method turns its typed arguments into a [`RequestSpec`]:
//! verb, host, path, an ordered parameter list and the security level. The
//! client then encodes, signs and dispatches it.

use std::fmt;

use crate::error::{FapiError, Result};

/// HTTP verb used by an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// POST and PUT carry their parameters in a form-encoded body
    pub fn has_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which REST host serves an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Host {
    /// `fapi.binance.com`: `/fapi/*` and `/futures/data/*`
    Futures,
    /// `api.binance.com`: `/api/*` and `/sapi/*`
    General,
}

/// Authentication required by an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Security {
    /// No credentials attached
    Public,
    /// `X-MBX-APIKEY` header only
    ApiKey,
    /// `X-MBX-APIKEY` header plus `signature` parameter
    Signed,
}

impl Security {
    pub fn needs_api_key(&self) -> bool {
        !matches!(self, Security::Public)
    }
}

/// Ordered request parameters
///
/// Keys keep insertion order; that order is what gets signed and sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    pairs: Vec<(&'static str, String)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a mandatory parameter
    pub fn push(&mut self, key: &'static str, value: impl ToString) -> &mut Self {
        self.pairs.push((key, value.to_string()));
        self
    }

    /// Append an optional parameter; `None` leaves the key out entirely
    pub fn push_opt<V: ToString>(&mut self, key: &'static str, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.pairs.push((key, value.to_string()));
        }
        self
    }

    /// Append an optional string; `None` and empty strings are both omitted
    pub fn push_str_opt(&mut self, key: &'static str, value: Option<&str>) -> &mut Self {
        match value {
            Some(value) if !value.is_empty() => self.push(key, value),
            _ => self,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.pairs.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.pairs.iter().map(|(k, _)| *k)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// URL-encode into the canonical `k1=v1&k2=v2` string
    pub fn encode(&self) -> Result<String> {
        Ok(serde_urlencoded::to_string(&self.pairs)?)
    }
}

/// Trailing `recvWindow`/`timestamp` pair of a signed request
///
/// Both fields are optional; absent fields are not sent. Client-level
/// defaults from [`ClientConfig`](crate::ClientConfig) fill the gaps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timing {
    pub recv_window: Option<u64>,
    pub timestamp: Option<i64>,
}

/// Upper bound the exchange accepts for `recvWindow`
pub const MAX_RECV_WINDOW_MS: u64 = 60_000;

impl Timing {
    /// Neither field set
    pub fn none() -> Self {
        Self::default()
    }

    /// Stamped with the current wall-clock time
    pub fn now() -> Self {
        Self::at(chrono::Utc::now().timestamp_millis())
    }

    /// Stamped with an explicit millisecond timestamp
    pub fn at(timestamp_ms: i64) -> Self {
        Self {
            recv_window: None,
            timestamp: Some(timestamp_ms),
        }
    }

    pub fn with_recv_window(mut self, recv_window_ms: u64) -> Self {
        self.recv_window = Some(recv_window_ms);
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match self.recv_window {
            Some(window) if window > MAX_RECV_WINDOW_MS => Err(FapiError::validation(
                "recvWindow",
                format!("must not exceed {} ms, got {}", MAX_RECV_WINDOW_MS, window),
            )),
            _ => Ok(()),
        }
    }

    pub(crate) fn append_to(&self, params: &mut Params) {
        params
            .push_opt("recvWindow", self.recv_window)
            .push_opt("timestamp", self.timestamp);
    }
}

/// A fully described request, ready for signing and dispatch
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub host: Host,
    pub path: &'static str,
    pub params: Params,
    pub security: Security,
    /// Present on signed requests; merged with config defaults at dispatch
    pub timing: Option<Timing>,
}

impl RequestSpec {
    pub fn public(method: Method, path: &'static str, params: Params) -> Self {
        Self {
            method,
            host: Host::Futures,
            path,
            params,
            security: Security::Public,
            timing: None,
        }
    }

    pub fn keyed(method: Method, path: &'static str, params: Params) -> Self {
        Self {
            security: Security::ApiKey,
            ..Self::public(method, path, params)
        }
    }

    pub fn signed(method: Method, path: &'static str, params: Params, timing: Timing) -> Self {
        Self {
            security: Security::Signed,
            timing: Some(timing),
            ..Self::public(method, path, params)
        }
    }

    /// Route to the general host instead of the futures host
    pub fn on_general_host(mut self) -> Self {
        self.host = Host::General;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_keep_insertion_order() {
        let mut params = Params::new();
        params.push("symbol", "BTCUSDT").push("limit", 500);

        assert_eq!(params.encode().unwrap(), "symbol=BTCUSDT&limit=500");
    }

    #[test]
    fn test_optional_params_are_omitted() {
        let mut params = Params::new();
        params
            .push("symbol", "BTCUSDT")
            .push_opt::<i64>("fromId", None)
            .push_str_opt("origClientOrderId", Some(""))
            .push_str_opt("positionSide", None)
            .push_opt("limit", Some(10));

        assert_eq!(params.len(), 2);
        assert!(!params.contains("fromId"));
        assert!(!params.contains("origClientOrderId"));
        assert_eq!(params.encode().unwrap(), "symbol=BTCUSDT&limit=10");
    }

    #[test]
    fn test_encode_escapes_reserved_characters() {
        let mut params = Params::new();
        params.push("orderIdList", "[1,2]");

        assert_eq!(params.encode().unwrap(), "orderIdList=%5B1%2C2%5D");
    }

    #[test]
    fn test_empty_params_encode_to_empty_string() {
        assert_eq!(Params::new().encode().unwrap(), "");
    }

    #[test]
    fn test_timing_appends_in_wire_order() {
        let mut params = Params::new();
        params.push("symbol", "BTCUSDT");
        Timing::at(1_700_000_000_000)
            .with_recv_window(5000)
            .append_to(&mut params);

        assert_eq!(
            params.encode().unwrap(),
            "symbol=BTCUSDT&recvWindow=5000&timestamp=1700000000000"
        );
    }

    #[test]
    fn test_timing_none_appends_nothing() {
        let mut params = Params::new();
        Timing::none().append_to(&mut params);
        assert!(params.is_empty());
    }

    #[test]
    fn test_timing_rejects_oversized_recv_window() {
        assert!(Timing::none().with_recv_window(60_000).validate().is_ok());
        let err = Timing::none().with_recv_window(60_001).validate().unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_timing_now_is_recent() {
        let before = chrono::Utc::now().timestamp_millis();
        let timing = Timing::now();
        let after = chrono::Utc::now().timestamp_millis();

        let ts = timing.timestamp.unwrap();
        assert!(ts >= before && ts <= after);
        assert!(timing.recv_window.is_none());
    }

    #[test]
    fn test_spec_constructors() {
        let spec = RequestSpec::signed(Method::Get, "/fapi/v2/balance", Params::new(), Timing::none());
        assert_eq!(spec.security, Security::Signed);
        assert_eq!(spec.host, Host::Futures);
        assert!(spec.timing.is_some());

        let spec = RequestSpec::keyed(Method::Post, "/fapi/v1/listenKey", Params::new());
        assert!(spec.security.needs_api_key());
        assert!(spec.timing.is_none());

        let spec = RequestSpec::public(Method::Get, "/api/v3/account", Params::new()).on_general_host();
        assert_eq!(spec.host, Host::General);
        assert!(!spec.security.needs_api_key());
    }

    #[test]
    fn test_method_body_rules() {
        assert!(Method::Post.has_body());
        assert!(Method::Put.has_body());
        assert!(!Method::Get.has_body());
        assert!(!Method::Delete.has_body());
        assert_eq!(Method::Delete.to_string(), "DELETE");
    }
}
