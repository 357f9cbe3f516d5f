//! Aggregate client for all Loyalteez services.
//!
//! Three user endpoints are not verified on every deployment. When the
//! remote side reports them missing, the calls below answer with
//! [`ClientError::Unsupported`] guidance built from verified endpoints
//! instead of the bare HTTP failure.

use super::config::{Network, ServiceConfig};
use super::error::{ClientError, ClientResult};
use super::event_handler::{
    EligibilityRequest, EventConfigResponse, EventHandlerClient, UserBalanceRequest,
};
use super::http_client;
use super::pregen::PregenClient;
use super::relayer::RelayerClient;
use super::services::{leaderboard_standing, LeaderboardQuery, ServicesClient};
use crate::domain::{BrandId, Period};
use crate::resources::contracts::{CHAIN_ID, LTZ_TOKEN_ADDRESS};
use serde_json::{Number, Value};
use tracing::{debug, instrument, warn};

/// All Loyalteez service clients sharing one connection pool.
#[derive(Clone)]
pub struct LoyalteezClient {
    network: Network,
    event_handler: EventHandlerClient,
    services: ServicesClient,
    pregen: PregenClient,
    relayer: RelayerClient,
}

impl LoyalteezClient {
    /// Build every client from the service configuration.
    pub fn new(config: &ServiceConfig) -> ClientResult<Self> {
        let client = http_client(config.timeout())?;
        Ok(Self {
            network: config.network,
            event_handler: EventHandlerClient::with_client(
                client.clone(),
                config.event_handler.clone(),
            ),
            services: ServicesClient::with_client(client.clone(), config.services.clone()),
            pregen: PregenClient::with_client(client.clone(), config.pregen.clone()),
            relayer: RelayerClient::with_client(client, config.relayer.clone()),
        })
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn event_handler(&self) -> &EventHandlerClient {
        &self.event_handler
    }

    pub fn services(&self) -> &ServicesClient {
        &self.services
    }

    pub fn pregen(&self) -> &PregenClient {
        &self.pregen
    }

    pub fn relayer(&self) -> &RelayerClient {
        &self.relayer
    }

    /// User balance, with on-chain lookup guidance when the endpoint is missing.
    #[instrument(skip(self, params), fields(brand_id = %params.brand_id))]
    pub async fn get_user_balance(
        &self,
        params: &UserBalanceRequest,
    ) -> ClientResult<Value> {
        match self.event_handler.user_balance(params).await {
            Err(e) if e.is_endpoint_missing() => {
                warn!("User balance endpoint unavailable: {}", e);
                Err(ClientError::Unsupported {
                    guidance: balance_guidance(),
                })
            }
            other => other,
        }
    }

    /// Event eligibility. When the endpoint is missing, the event
    /// configuration is consulted to summarize the limits that apply.
    #[instrument(skip(self, params), fields(brand_id = %params.brand_id, event_type = %params.event_type))]
    pub async fn check_eligibility(
        &self,
        params: &EligibilityRequest,
    ) -> ClientResult<Value> {
        let err = match self.event_handler.check_eligibility(params).await {
            Err(e) if e.is_endpoint_missing() => e,
            other => return other,
        };
        warn!("Eligibility endpoint unavailable: {}", err);

        let config = self.event_handler.get_event_config(&params.brand_id).await?;
        let config = EventConfigResponse::from_value(config)?;
        let guidance = match config.find(&params.event_type) {
            None => format!(
                "Event type \"{}\" not configured. Use loyalteez_get_event_config to see available events, or create the event first.",
                params.event_type
            ),
            Some(event) => format!(
                "Eligibility endpoint unavailable. Event \"{}\" is configured with maxClaims: {}, cooldown: {}h, reward: {} LTZ. For full eligibility check, use the backend endpoint or track claim history in your system.",
                params.event_type,
                event
                    .max_claims
                    .as_ref()
                    .filter(|n| n.as_f64().is_some_and(|n| n > 0.0))
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "unlimited".to_string()),
                number_or_zero(event.cooldown_hours.as_ref()),
                number_or_zero(event.reward_amount.as_ref()),
            ),
        };
        Err(ClientError::Unsupported { guidance })
    }

    /// Aggregated user stats. When the aggregation endpoint is missing, the
    /// streak and leaderboard services are asked for partial stats.
    #[instrument(skip(self), fields(brand_id = %brand_id))]
    pub async fn get_user_stats(
        &self,
        brand_id: &BrandId,
        user_identifier: &str,
    ) -> ClientResult<Value> {
        let err = match self.services.get_user_stats(brand_id, user_identifier).await {
            Err(e) if e.is_endpoint_missing() => e,
            other => return other,
        };
        warn!("User stats endpoint unavailable: {}", err);

        let (current, longest) = match self
            .services
            .get_streak_status(brand_id, user_identifier, "daily")
            .await
        {
            Ok(status) => (
                field_or_zero(&status, "currentStreak"),
                field_or_zero(&status, "longestStreak"),
            ),
            Err(e) => {
                debug!("Streak status unavailable for partial stats: {}", e);
                ("0".to_string(), "0".to_string())
            }
        };

        let query = LeaderboardQuery {
            brand_id: brand_id.clone(),
            metric: "ltz_earned".to_string(),
            period: Period::AllTime,
            platform: None,
            limit: 10,
        };
        let (rank, earned) = match self.services.get_leaderboard(&query).await {
            Ok(board) => match leaderboard_standing(&board, user_identifier) {
                Some((position, value)) => (Some(position), number_or_zero(value.as_number())),
                None => (None, "0".to_string()),
            },
            Err(e) => {
                debug!("Leaderboard unavailable for partial stats: {}", e);
                (None, "0".to_string())
            }
        };

        let rank = rank
            .map(|r| format!("#{}", r))
            .unwrap_or_else(|| "unranked".to_string());
        Err(ClientError::Unsupported {
            guidance: format!(
                "User stats aggregation endpoint unavailable. Partial stats available: Streak: {} days (longest: {}), Rank: {}, Lifetime earned: {} LTZ. For complete stats, call individual services: loyalteez_get_streak_status, loyalteez_get_leaderboard, loyalteez_get_user_balance, and platform activity APIs.",
                current, longest, rank, earned
            ),
        })
    }
}

/// A non-zero number as written, else `0`.
fn number_or_zero(number: Option<&Number>) -> String {
    match number {
        Some(n) if n.as_f64() != Some(0.0) => n.to_string(),
        _ => "0".to_string(),
    }
}

fn field_or_zero(body: &Value, field: &str) -> String {
    number_or_zero(body.get(field).and_then(Value::as_number))
}

fn balance_guidance() -> String {
    format!(
        "User balance endpoint unavailable. To query balance: 1. Get user's wallet address via loyalteez_resolve_user or SDK getUserWallet() 2. Query LTZ contract ({}) balanceOf() method on Soneium Mainnet (Chain ID: {}). See loyalteez://contracts/ltz-token for contract details.",
        LTZ_TOKEN_ADDRESS, CHAIN_ID
    )
}
