//! Error types for the futures REST client

use serde::Deserialize;
use thiserror::Error;

/// Errors surfaced by [`FuturesClient`](crate::FuturesClient) operations.
#[derive(Debug, Error)]
pub enum FapiError {
    /// A parameter failed a client-side check; nothing was sent.
    #[error("Invalid parameter `{param}`: {reason}")]
    Validation {
        /// Wire name of the offending parameter.
        param: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// DNS, TLS or connection failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The transport gave up waiting for a response.
    #[error("Request timeout")]
    Timeout,

    /// The exchange answered with a non-success status.
    #[error("HTTP error {status}: {}", format_api_message(.code, .message))]
    Http {
        /// HTTP status code.
        status: u16,
        /// Exchange error code, when the body carried one.
        code: Option<i64>,
        /// Exchange message, or the raw body.
        message: String,
    },

    /// A success response whose body could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Request parameters could not be encoded.
    #[error("Encode error: {0}")]
    Encode(String),

    /// Client setup failed (missing credentials, HTTP client build).
    #[error("Config error: {0}")]
    Config(String),
}

fn format_api_message(code: &Option<i64>, message: &str) -> String {
    match code {
        Some(code) => format!("[{}] {}", code, message),
        None => message.to_string(),
    }
}

/// Error body returned by the exchange: `{"code": -1121, "msg": "Invalid symbol."}`
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: i64,
    msg: String,
}

impl FapiError {
    pub(crate) fn validation(param: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            param,
            reason: reason.into(),
        }
    }

    /// Build an HTTP error from a non-success response body.
    ///
    /// The exchange error shape is decoded when present, otherwise the raw
    /// body is kept as the message.
    pub fn from_error_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(err) => Self::Http {
                status,
                code: Some(err.code),
                message: err.msg,
            },
            Err(_) => Self::Http {
                status,
                code: None,
                message: body.to_string(),
            },
        }
    }

    /// True for client-side validation failures.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Exchange error code carried by an HTTP error, if any.
    pub fn api_code(&self) -> Option<i64> {
        match self {
            Self::Http { code, .. } => *code,
            _ => None,
        }
    }

    /// Whether a caller-side retry has a reasonable chance of succeeding.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout | Self::Transport(_) => true,
            Self::Http { status, code, .. } => {
                *status >= 500
                    || *status == 429
                    || *status == 418
                    || matches!(code, Some(-1000) | Some(-1001) | Some(-1003))
            }
            _ => false,
        }
    }
}

impl From<reqwest::Error> for FapiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_builder() {
            Self::Config(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_urlencoded::ser::Error> for FapiError {
    fn from(err: serde_urlencoded::ser::Error) -> Self {
        Self::Encode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FapiError>;
