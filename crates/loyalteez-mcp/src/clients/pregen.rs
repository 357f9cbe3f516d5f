//! Wallet pregeneration client.
//!
//! Creates (or looks up) the custodial wallet bound to an OAuth account
//! before the user ever signs in.

use super::config::ServiceEndpoint;
use super::error::ClientResult;
use super::{handle_response, http_client};
use crate::domain::BrandId;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const SERVICE: &str = "Pregeneration";

/// Wallet pregeneration client.
#[derive(Clone)]
pub struct PregenClient {
    /// HTTP client instance.
    client: Client,

    /// Service endpoint configuration.
    endpoint: ServiceEndpoint,
}

impl PregenClient {
    /// Create a new pregeneration client.
    pub fn new(endpoint: ServiceEndpoint, timeout: Duration) -> ClientResult<Self> {
        Ok(Self::with_client(http_client(timeout)?, endpoint))
    }

    pub(crate) fn with_client(client: Client, endpoint: ServiceEndpoint) -> Self {
        Self { client, endpoint }
    }

    /// Pregenerate a wallet (`POST /loyalteez-api/pregenerate-user`).
    #[instrument(skip(self, params), fields(provider = %params.oauth_provider))]
    pub async fn pregenerate_user(
        &self,
        params: &PregenerateRequest,
    ) -> ClientResult<PregenerateResponse> {
        debug!("Pregenerating wallet");

        let response = self
            .client
            .post(self.endpoint.url("/loyalteez-api/pregenerate-user"))
            .json(params)
            .send()
            .await?;
        handle_response(SERVICE, response).await
    }
}

/// Pregeneration body. This API uses snake_case field names.
#[derive(Debug, Clone, Serialize)]
pub struct PregenerateRequest {
    pub brand_id: BrandId,
    pub oauth_provider: String,
    pub oauth_user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oauth_username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PregenerateResponse {
    pub wallet_address: String,
    #[serde(default)]
    pub created_new: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_is_snake_case() {
        let body = serde_json::to_value(PregenerateRequest {
            brand_id: BrandId::parse("0x1234567890123456789012345678901234567890").unwrap(),
            oauth_provider: "discord".to_string(),
            oauth_user_id: "42".to_string(),
            oauth_username: None,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "brand_id": "0x1234567890123456789012345678901234567890",
                "oauth_provider": "discord",
                "oauth_user_id": "42"
            })
        );
    }
}
