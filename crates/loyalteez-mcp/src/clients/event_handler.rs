//! Event handler service client.
//!
//! HTTP client for the Loyalteez event handler (`/loyalteez-api/*`): manual
//! event tracking, bulk tracking, event configuration, health, and the two
//! user endpoints that are still awaiting verification.

use super::config::ServiceEndpoint;
use super::error::{ClientError, ClientResult};
use super::{handle_response, http_client};
use crate::domain::BrandId;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::time::Duration;
use tracing::{debug, instrument};

const SERVICE: &str = "Event handler";

/// Path of the manual event endpoint, also handed out as the webhook target.
pub const MANUAL_EVENT_PATH: &str = "/loyalteez-api/manual-event";

/// Event handler client.
#[derive(Clone)]
pub struct EventHandlerClient {
    /// HTTP client instance.
    client: Client,

    /// Service endpoint configuration.
    endpoint: ServiceEndpoint,
}

impl EventHandlerClient {
    /// Create a new event handler client.
    pub fn new(endpoint: ServiceEndpoint, timeout: Duration) -> ClientResult<Self> {
        Ok(Self::with_client(http_client(timeout)?, endpoint))
    }

    pub(crate) fn with_client(client: Client, endpoint: ServiceEndpoint) -> Self {
        Self { client, endpoint }
    }

    /// Service endpoint configuration.
    pub fn endpoint(&self) -> &ServiceEndpoint {
        &self.endpoint
    }

    /// Full URL of the manual event endpoint.
    pub fn manual_event_url(&self) -> String {
        self.endpoint.url(MANUAL_EVENT_PATH)
    }

    /// Track a single event (`POST /loyalteez-api/manual-event`).
    #[instrument(skip(self, params), fields(brand_id = %params.brand_id, event_type = %params.event_type))]
    pub async fn track_event(&self, params: TrackEventRequest) -> ClientResult<Value> {
        debug!("Tracking event {}", params.event_type);

        let response = self
            .client
            .post(self.manual_event_url())
            .json(&params)
            .send()
            .await?;
        handle_response(SERVICE, response).await
    }

    /// Fetch configured events (`GET /loyalteez-api/event-config?brandId=`).
    #[instrument(skip(self), fields(brand_id = %brand_id))]
    pub async fn get_event_config(&self, brand_id: &BrandId) -> ClientResult<Value> {
        debug!("Fetching event configuration");

        let response = self
            .client
            .get(self.endpoint.url("/loyalteez-api/event-config"))
            .query(&[("brandId", brand_id.as_str())])
            .send()
            .await?;
        handle_response(SERVICE, response).await
    }

    /// Track a batch of events (`POST /loyalteez-api/bulk-events`).
    #[instrument(skip(self, params), fields(count = params.events.len()))]
    pub async fn bulk_events(&self, params: BulkEventsRequest) -> ClientResult<Value> {
        debug!("Submitting {} events", params.events.len());

        let response = self
            .client
            .post(self.endpoint.url("/loyalteez-api/bulk-events"))
            .json(&params)
            .send()
            .await?;
        handle_response(SERVICE, response).await
    }

    /// Service health (`GET /loyalteez-api/health`).
    #[instrument(skip(self))]
    pub async fn health(&self) -> ClientResult<Value> {
        debug!("Checking event handler health");

        let response = self
            .client
            .get(self.endpoint.url("/loyalteez-api/health"))
            .send()
            .await?;
        handle_response(SERVICE, response).await
    }

    /// User balance (`POST /loyalteez-api/user-balance`). Unverified.
    #[instrument(skip(self, params), fields(brand_id = %params.brand_id))]
    pub async fn user_balance(&self, params: &UserBalanceRequest) -> ClientResult<Value> {
        debug!("Fetching user balance");

        let response = self
            .client
            .post(self.endpoint.url("/loyalteez-api/user-balance"))
            .json(params)
            .send()
            .await?;
        handle_response(SERVICE, response).await
    }

    /// Event eligibility (`POST /loyalteez-api/check-eligibility`). Unverified.
    #[instrument(skip(self, params), fields(brand_id = %params.brand_id, event_type = %params.event_type))]
    pub async fn check_eligibility(
        &self,
        params: &EligibilityRequest,
    ) -> ClientResult<Value> {
        debug!("Checking eligibility for {}", params.event_type);

        let response = self
            .client
            .post(self.endpoint.url("/loyalteez-api/check-eligibility"))
            .json(params)
            .send()
            .await?;
        handle_response(SERVICE, response).await
    }
}

/// Body of a manual event.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackEventRequest {
    pub brand_id: BrandId,
    pub event_type: String,
    pub user_email: String,
    pub user_identifier: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,

    /// Discord channel the event happened in.
    #[serde(rename = "channel_id", skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
}

/// The parts of an event configuration response read locally.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventConfigResponse {
    #[serde(default)]
    pub events: Vec<ConfiguredEvent>,
}

impl EventConfigResponse {
    /// Decode the fields read locally out of a raw response.
    pub fn from_value(value: Value) -> ClientResult<Self> {
        serde_json::from_value(value).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    pub fn find(&self, event_type: &str) -> Option<&ConfiguredEvent> {
        self.events.iter().find(|e| e.event_type == event_type)
    }
}

/// An event as configured in the Partner Portal.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfiguredEvent {
    pub event_type: String,
    pub reward_amount: Option<Number>,
    pub max_claims: Option<Number>,
    pub cooldown_hours: Option<Number>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkEventsRequest {
    pub events: Vec<BulkEvent>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkEvent {
    pub brand_id: BrandId,
    pub event_type: String,
    pub user_email: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBalanceRequest {
    pub brand_id: BrandId,
    pub user_email: String,
    pub include_history: bool,
    pub history_limit: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityRequest {
    pub brand_id: BrandId,
    pub event_type: String,
    pub user_email: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn brand() -> BrandId {
        BrandId::parse("0x1234567890123456789012345678901234567890").unwrap()
    }

    #[test]
    fn test_track_event_body() {
        let body = serde_json::to_value(TrackEventRequest {
            brand_id: brand(),
            event_type: "daily_gm".to_string(),
            user_email: "discord_42@loyalteez.app".to_string(),
            user_identifier: "discord_42@loyalteez.app".to_string(),
            domain: None,
            source_url: None,
            metadata: None,
            channel_id: Some("c-1".to_string()),
        })
        .unwrap();

        assert_eq!(
            body,
            json!({
                "brandId": "0x1234567890123456789012345678901234567890",
                "eventType": "daily_gm",
                "userEmail": "discord_42@loyalteez.app",
                "userIdentifier": "discord_42@loyalteez.app",
                "channel_id": "c-1"
            })
        );
    }

    #[test]
    fn test_event_config_lookup() {
        let config = EventConfigResponse::from_value(json!({
            "success": true,
            "brandId": "0x1234567890123456789012345678901234567890",
            "events": [{
                "eventId": "evt-1",
                "eventType": "daily_checkin",
                "rewardAmount": 10,
                "maxClaims": 1,
                "cooldownHours": 24,
                "detectionMethod": "webhook",
                "isCustom": false
            }, {
                "eventType": "helpful_answer",
                "rewardAmount": 2.5
            }],
            "count": 2
        }))
        .unwrap();

        let checkin = config.find("daily_checkin").unwrap();
        assert_eq!(checkin.reward_amount, Some(Number::from(10)));
        assert_eq!(checkin.cooldown_hours, Some(Number::from(24)));

        let helpful = config.find("helpful_answer").unwrap();
        assert_eq!(helpful.reward_amount.as_ref().and_then(Number::as_f64), Some(2.5));
        assert!(helpful.max_claims.is_none());

        assert!(config.find("purchase").is_none());
    }

    #[test]
    fn test_event_config_without_events() {
        let config = EventConfigResponse::from_value(json!({"success": true})).unwrap();
        assert!(config.events.is_empty());
        assert!(EventConfigResponse::from_value(json!({"events": "none"})).is_err());
    }

    #[test]
    fn test_manual_event_url() {
        let client = EventHandlerClient::new(
            ServiceEndpoint::new("https://api.loyalteez.app/"),
            Duration::from_secs(30),
        )
        .unwrap();
        assert_eq!(
            client.manual_event_url(),
            "https://api.loyalteez.app/loyalteez-api/manual-event"
        );
    }
}
