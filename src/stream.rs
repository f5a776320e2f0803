//! User data stream listen keys
//!
//! A listen key stays valid for 60 minutes; extend it periodically while
//! the websocket is in use.

use serde_json::Value;
use tracing::info;

use crate::client::FuturesClient;
use crate::error::Result;
use crate::request::{Method, Params, RequestSpec};
use crate::types::ListenKey;
use crate::validate::require_non_empty;

fn listen_key_params(listen_key: &str) -> Result<Params> {
    require_non_empty("listenKey", listen_key)?;
    let mut params = Params::new();
    params.push("listenKey", listen_key);
    Ok(params)
}

impl FuturesClient {
    /// Start a user data stream and return its listen key
    ///
    /// POST /fapi/v1/listenKey
    pub async fn create_user_data_stream(&self) -> Result<String> {
        let response: ListenKey = self
            .execute_typed(RequestSpec::keyed(Method::Post, "/fapi/v1/listenKey", Params::new()))
            .await?;

        info!("Created user data stream");
        Ok(response.listen_key)
    }

    /// Keep a listen key alive
    ///
    /// PUT /fapi/v1/listenKey
    pub async fn extend_user_data_stream(&self, listen_key: &str) -> Result<Value> {
        let params = listen_key_params(listen_key)?;
        let response = self
            .execute(RequestSpec::keyed(Method::Put, "/fapi/v1/listenKey", params))
            .await?;

        info!("Extended user data stream");
        Ok(response)
    }

    /// Close a user data stream
    ///
    /// DELETE /fapi/v1/listenKey
    pub async fn close_user_data_stream(&self, listen_key: &str) -> Result<Value> {
        let params = listen_key_params(listen_key)?;
        let response = self
            .execute(RequestSpec::keyed(Method::Delete, "/fapi/v1/listenKey", params))
            .await?;

        info!("Closed user data stream");
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listen_key_params() {
        assert_eq!(
            listen_key_params("abc123").unwrap().encode().unwrap(),
            "listenKey=abc123"
        );
        assert!(listen_key_params("").is_err());
    }
}
