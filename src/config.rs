//! Client configuration
//!
//! Hosts, transport timeout and the defaults applied to the
//! `recvWindow`/`timestamp` pair of signed requests.

use std::time::Duration;

/// Base URL for the USD-M futures REST API
pub const FUTURES_BASE_URL: &str = "https://fapi.binance.com";

/// Base URL for the general (spot/wallet) REST API
pub const GENERAL_BASE_URL: &str = "https://api.binance.com";

/// Futures testnet base URL
pub const FUTURES_TESTNET_URL: &str = "https://testnet.binancefuture.com";

/// General testnet base URL
pub const GENERAL_TESTNET_URL: &str = "https://testnet.binance.vision";

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Host serving `/fapi` and `/futures/data` paths
    pub futures_base_url: String,
    /// Host serving `/api` and `/sapi` paths
    pub general_base_url: String,
    /// Request timeout enforced by the HTTP transport
    pub timeout: Duration,
    /// Fill a missing `timestamp` with the current time on signed requests
    pub stamp_timestamps: bool,
    /// `recvWindow` used when a signed request does not set one
    pub default_recv_window: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            futures_base_url: FUTURES_BASE_URL.to_string(),
            general_base_url: GENERAL_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            stamp_timestamps: false,
            default_recv_window: None,
        }
    }
}

impl ClientConfig {
    /// Configuration pointing at the public testnets
    pub fn testnet() -> Self {
        Self {
            futures_base_url: FUTURES_TESTNET_URL.to_string(),
            general_base_url: GENERAL_TESTNET_URL.to_string(),
            ..Self::default()
        }
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the futures host (trailing slashes are dropped)
    pub fn with_futures_base_url(mut self, url: impl Into<String>) -> Self {
        self.futures_base_url = trim_base(url.into());
        self
    }

    /// Override the general host (trailing slashes are dropped)
    pub fn with_general_base_url(mut self, url: impl Into<String>) -> Self {
        self.general_base_url = trim_base(url.into());
        self
    }

    /// Stamp signed requests that carry no explicit timestamp
    pub fn with_stamp_timestamps(mut self, enabled: bool) -> Self {
        self.stamp_timestamps = enabled;
        self
    }

    /// Default `recvWindow` in milliseconds for signed requests
    pub fn with_default_recv_window(mut self, recv_window_ms: u64) -> Self {
        self.default_recv_window = Some(recv_window_ms);
        self
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.futures_base_url, "https://fapi.binance.com");
        assert_eq!(config.general_base_url, "https://api.binance.com");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(!config.stamp_timestamps);
        assert!(config.default_recv_window.is_none());
    }

    #[test]
    fn test_client_config_builder() {
        let config = ClientConfig::default()
            .with_timeout(Duration::from_secs(5))
            .with_futures_base_url("http://127.0.0.1:8080/")
            .with_general_base_url("http://127.0.0.1:8081")
            .with_stamp_timestamps(true)
            .with_default_recv_window(5000);

        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.futures_base_url, "http://127.0.0.1:8080");
        assert_eq!(config.general_base_url, "http://127.0.0.1:8081");
        assert!(config.stamp_timestamps);
        assert_eq!(config.default_recv_window, Some(5000));
    }

    #[test]
    fn test_testnet_urls() {
        let config = ClientConfig::testnet();
        assert_eq!(config.futures_base_url, FUTURES_TESTNET_URL);
        assert_eq!(config.general_base_url, GENERAL_TESTNET_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }
}
