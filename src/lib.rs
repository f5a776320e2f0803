//! Binance USD-M Futures REST client
//!
//! Async client covering market data, order management, account and
//! user-data-stream endpoints of the Binance USD-M futures API, with
//! HMAC-SHA256 request signing and client-side parameter checks.
//!
//! Responses are returned as `serde_json::Value`; callers pick out the
//! fields they need.

pub mod account;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod market;
pub mod request;
pub mod stream;
pub mod trade;
pub mod transport;
pub mod types;
pub mod validate;

pub use auth::{sign_request, Credentials};
pub use client::{FuturesClient, API_KEY_HEADER};
pub use config::ClientConfig;
pub use error::{FapiError, Result};
pub use request::{Host, Method, Params, RequestSpec, Security, Timing};
pub use trade::{ModifyOrder, NewOrder};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use types::*;
