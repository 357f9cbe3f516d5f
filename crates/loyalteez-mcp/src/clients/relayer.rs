//! Gas relayer client.
//!
//! Submits gasless transactions on behalf of a user. Each call is
//! authenticated with the user's Privy access token as a bearer token.

use super::config::ServiceEndpoint;
use super::error::ClientResult;
use super::{handle_response, http_client};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

const SERVICE: &str = "Gas relayer";

/// Gas relayer client.
#[derive(Clone)]
pub struct RelayerClient {
    /// HTTP client instance.
    client: Client,

    /// Service endpoint configuration.
    endpoint: ServiceEndpoint,
}

impl RelayerClient {
    /// Create a new relayer client.
    pub fn new(endpoint: ServiceEndpoint, timeout: Duration) -> ClientResult<Self> {
        Ok(Self::with_client(http_client(timeout)?, endpoint))
    }

    pub(crate) fn with_client(client: Client, endpoint: ServiceEndpoint) -> Self {
        Self { client, endpoint }
    }

    /// Relay a transaction (`POST /relay`).
    #[instrument(skip(self, access_token, params), fields(to = %params.to))]
    pub async fn relay_transaction(
        &self,
        access_token: &str,
        params: &RelayRequest,
    ) -> ClientResult<Value> {
        debug!("Relaying transaction");

        let response = self
            .client
            .post(self.endpoint.url("/relay"))
            .bearer_auth(access_token)
            .json(params)
            .send()
            .await?;
        handle_response(SERVICE, response).await
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayRequest {
    pub to: String,
    pub data: String,
    pub user_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permit: Option<Permit>,
}

/// EIP-2612 permit signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permit {
    pub owner: String,
    pub spender: String,
    pub value: String,
    pub deadline: u64,
    pub v: u8,
    pub r: String,
    pub s: String,
}

