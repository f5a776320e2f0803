//! Authentication utilities for the Binance futures API
//!
//! Signed endpoints carry `signature=<hex HMAC-SHA256>` computed over the
//! URL-encoded parameter string with the API secret as the key.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{FapiError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "BINANCE_API_KEY";

/// Environment variable holding the API secret
pub const API_SECRET_ENV: &str = "BINANCE_API_SECRET";

/// Generate the hex-encoded HMAC-SHA256 signature of a query string
///
/// # Example
///
/// ```
/// use binance_fapi::auth::sign_request;
///
/// let signature = sign_request("symbol=BTCUSDT&timestamp=1499827319559", "secret");
/// assert_eq!(signature.len(), 64);
/// ```
pub fn sign_request(payload: &str, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Check a `signature` value against the payload it was computed over
///
/// The client never verifies its own signatures. This is for callers that
/// inspect already signed requests, such as a recording [`Transport`]
/// in tests.
///
/// [`Transport`]: crate::transport::Transport
pub fn verify_signature(payload: &str, secret: &str, signature: &str) -> bool {
    let computed = sign_request(payload, secret);
    constant_time_eq(computed.as_bytes(), signature.as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// API key and secret, fixed for the lifetime of a client
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    api_secret: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    /// Load credentials from the environment
    ///
    /// A `.env` file in the working directory is honoured. Looks for
    /// `BINANCE_API_KEY` and `BINANCE_API_SECRET`.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| FapiError::Config(format!("{} is not set", API_KEY_ENV)))?;
        let api_secret = std::env::var(API_SECRET_ENV)
            .map_err(|_| FapiError::Config(format!("{} is not set", API_SECRET_ENV)))?;

        Ok(Self::new(api_key, api_secret))
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Sign a canonical query string with this secret
    pub fn sign(&self, payload: &str) -> String {
        sign_request(payload, &self.api_secret)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_known_vector() {
        // Example from the Binance signed endpoint documentation
        let secret = "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j";
        let query = "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1&recvWindow=5000&timestamp=1499827319559";

        assert_eq!(
            sign_request(query, secret),
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
    }

    #[test]
    fn test_sign_is_lowercase_hex() {
        let signature = sign_request("symbol=BTCUSDT", "test_secret");

        assert_eq!(signature.len(), 64);
        assert!(signature
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_sign_consistency() {
        let sig1 = sign_request("symbol=BTCUSDT&leverage=10", "test_secret");
        let sig2 = sign_request("symbol=BTCUSDT&leverage=10", "test_secret");
        assert_eq!(sig1, sig2);
    }

    #[test]
    fn test_different_inputs_produce_different_signatures() {
        let base = sign_request("symbol=BTCUSDT&leverage=10", "secret1");

        assert_ne!(base, sign_request("symbol=BTCUSDT&leverage=10", "secret2"));
        assert_ne!(base, sign_request("symbol=BTCUSDT&leverage=11", "secret1"));
        assert_ne!(base, sign_request("leverage=10&symbol=BTCUSDT", "secret1"));
    }

    #[test]
    fn test_verify_signature() {
        let payload = "symbol=BTCUSDT&timestamp=1234567890";
        let signature = sign_request(payload, "test_secret");

        assert!(verify_signature(payload, "test_secret", &signature));
        assert!(!verify_signature(payload, "other_secret", &signature));
        assert!(!verify_signature(payload, "test_secret", "deadbeef"));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"hello", b"hello"));
        assert!(!constant_time_eq(b"hello", b"world"));
        assert!(!constant_time_eq(b"hello", b"hell"));
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn test_credentials_sign_matches_free_function() {
        let creds = Credentials::new("my_key", "my_secret");
        assert_eq!(creds.api_key(), "my_key");
        assert_eq!(creds.sign("a=1"), sign_request("a=1", "my_secret"));
    }

    #[test]
    fn test_debug_hides_secret() {
        let creds = Credentials::new("my_key", "super_secret_value");
        let printed = format!("{:?}", creds);

        assert!(printed.contains("my_key"));
        assert!(!printed.contains("super_secret_value"));
    }
}
