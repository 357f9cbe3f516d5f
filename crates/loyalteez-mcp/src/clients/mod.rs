//! Service client modules for the Loyalteez platform.
//!
//! This module provides HTTP clients for each Loyalteez service family:
//! - Event handler: event tracking, event configuration, health
//! - Shared services: streaks, leaderboards, drops, perks, achievements
//! - Pregeneration: OAuth-linked wallet creation
//! - Gas relayer: sponsored transactions
//!
//! Every client issues exactly one request per call. There is no retry.
//! [`LoyalteezClient`] bundles the four and adds the guidance fallbacks for
//! endpoints that are not verified on every deployment.

pub mod config;
pub mod error;
pub mod event_handler;
pub mod loyalteez;
pub mod pregen;
pub mod relayer;
pub mod services;

pub use config::{ConfigError, Network, ServiceConfig, ServiceEndpoint};
pub use error::{ClientError, ClientResult};
pub use event_handler::EventHandlerClient;
pub use loyalteez::LoyalteezClient;
pub use pregen::PregenClient;
pub use relayer::RelayerClient;
pub use services::ServicesClient;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::warn;

/// API version sent with every request.
pub const API_VERSION: &str = "v1";

/// Header carrying [`API_VERSION`].
pub const API_VERSION_HEADER: &str = "x-api-version";

/// Client-to-API version compatibility matrix.
pub fn api_version_compatibility() -> serde_json::Value {
    serde_json::json!({
        "1.0.0": {
            "minApiVersion": "v1",
            "maxApiVersion": "v1",
            "deprecated": false
        }
    })
}

/// Endpoints known to exist on every deployment.
pub const VERIFIED_ENDPOINTS: &[&str] = &[
    "/loyalteez-api/manual-event",
    "/loyalteez-api/bulk-events",
    "/loyalteez-api/health",
    "/loyalteez-api/debug",
    "/loyalteez-api/event-config",
    "/loyalteez-api/stripe-mint",
    "/streak/record-activity",
    "/streak/claim-milestone",
    "/streak/status",
    "/leaderboard",
    "/leaderboard/update-stats",
    "/loyalteez-api/pregenerate-user",
    "/relay",
    "/perks",
    "/perks/redeem",
    "/perks/check-eligibility",
    "/achievements",
    "/achievements/update-progress",
    "/drops/create",
    "/drops/claim",
];

/// Endpoints still awaiting backend verification.
pub const UNVERIFIED_ENDPOINTS: &[&str] = &[
    "/loyalteez-api/user-balance",
    "/loyalteez-api/check-eligibility",
    "/user-stats",
];

/// Build the shared HTTP client: JSON content type, API version header, timeout.
pub(crate) fn http_client(timeout: Duration) -> ClientResult<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));

    Ok(Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()?)
}

/// Decode a response, turning non-success statuses into [`ClientError::Api`].
pub(crate) async fn handle_response<T>(
    service: &'static str,
    response: reqwest::Response,
) -> ClientResult<T>
where
    T: DeserializeOwned,
{
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);
        warn!("{} API error ({}): {}", service, status.as_u16(), message);
        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| {
        warn!("{} returned an unexpected body: {}", service, e);
        ClientError::InvalidResponse(e.to_string())
    })
}

/// The body's `error` string, else its `message` string, else the status line.
pub(crate) fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let field = |name: &str| {
        parsed
            .as_ref()
            .and_then(|v| v.get(name))
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    field("error").or_else(|| field("message")).unwrap_or_else(|| {
        format!(
            "HTTP {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown Status")
        )
    })
}
