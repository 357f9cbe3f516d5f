//! Shared services client.
//!
//! HTTP client for the Loyalteez shared gamification services: streaks,
//! leaderboards, activity rewards, drops, third-party bot integrations,
//! perks and achievements. User identifiers in paths are percent-encoded.
//! Response bodies come back as raw JSON for the tools to relay.

use super::config::ServiceEndpoint;
use super::error::ClientResult;
use super::{handle_response, http_client};
use crate::domain::{BrandId, Period};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

const SERVICE: &str = "Shared services";
const NO_QUERY: [(&str, &str); 0] = [];

/// Shared services client.
#[derive(Clone)]
pub struct ServicesClient {
    /// HTTP client instance.
    client: Client,

    /// Service endpoint configuration.
    endpoint: ServiceEndpoint,
}

impl ServicesClient {
    /// Create a new shared services client.
    pub fn new(endpoint: ServiceEndpoint, timeout: Duration) -> ClientResult<Self> {
        Ok(Self::with_client(http_client(timeout)?, endpoint))
    }

    pub(crate) fn with_client(client: Client, endpoint: ServiceEndpoint) -> Self {
        Self { client, endpoint }
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.endpoint.url(path))
            .json(body)
            .send()
            .await?;
        handle_response(SERVICE, response).await
    }

    async fn get<Q, T>(&self, path: &str, query: &Q) -> ClientResult<T>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .get(self.endpoint.url(path))
            .query(query)
            .send()
            .await?;
        handle_response(SERVICE, response).await
    }

    /// Record a streak check-in (`POST /streak/record-activity`).
    #[instrument(skip(self, params), fields(brand_id = %params.brand_id, platform = %params.platform))]
    pub async fn record_streak_activity(
        &self,
        params: &RecordActivityRequest,
    ) -> ClientResult<Value> {
        debug!("Recording streak activity");
        self.post("/streak/record-activity", params).await
    }

    /// Leaderboard (`GET /leaderboard/{brandId}`).
    #[instrument(skip(self, params), fields(brand_id = %params.brand_id, metric = %params.metric))]
    pub async fn get_leaderboard(
        &self,
        params: &LeaderboardQuery,
    ) -> ClientResult<Value> {
        debug!("Fetching leaderboard for period {}", params.period);

        let mut query = vec![
            ("metric", params.metric.clone()),
            ("period", params.period.to_string()),
        ];
        if let Some(ref platform) = params.platform {
            query.push(("platform", platform.clone()));
        }
        query.push(("limit", params.limit.to_string()));

        let path = format!("/leaderboard/{}", params.brand_id);
        self.get(&path, &query).await
    }

    /// Streak status (`GET /streak/status/{brandId}/{userIdentifier}`).
    #[instrument(skip(self), fields(brand_id = %brand_id))]
    pub async fn get_streak_status(
        &self,
        brand_id: &BrandId,
        user_identifier: &str,
        streak_type: &str,
    ) -> ClientResult<Value> {
        debug!("Fetching {} streak status", streak_type);

        let path = format!(
            "/streak/status/{}/{}",
            brand_id,
            urlencoding::encode(user_identifier)
        );
        self.get(&path, &[("streakType", streak_type)]).await
    }

    /// Claim a streak milestone (`POST /streak/claim-milestone`).
    #[instrument(skip(self, params), fields(brand_id = %params.brand_id, milestone = params.milestone_days))]
    pub async fn claim_streak_milestone(
        &self,
        params: &ClaimMilestoneRequest,
    ) -> ClientResult<Value> {
        debug!("Claiming {}-day milestone", params.milestone_days);
        self.post("/streak/claim-milestone", params).await
    }

    /// Log time- or count-based activity (`POST /activity/log`).
    #[instrument(skip(self, params), fields(brand_id = %params.brand_id))]
    pub async fn log_activity(&self, params: &LogActivityRequest) -> ClientResult<Value> {
        debug!("Logging {:?} activity", params.activity_type);
        self.post("/activity/log", params).await
    }

    /// Reward with streak and role multipliers (`POST /reward/calculate`).
    #[instrument(skip(self, params), fields(brand_id = %params.brand_id, event_type = %params.event_type))]
    pub async fn calculate_reward(
        &self,
        params: &CalculateRewardRequest,
    ) -> ClientResult<Value> {
        debug!("Calculating reward");
        self.post("/reward/calculate", params).await
    }

    /// Leaderboard stats after a reward (`POST /leaderboard/update-stats`).
    #[instrument(skip(self, params), fields(brand_id = %params.brand_id))]
    pub async fn update_leaderboard_stats(
        &self,
        params: &UpdateStatsRequest,
    ) -> ClientResult<Value> {
        debug!("Updating leaderboard stats");
        self.post("/leaderboard/update-stats", params).await
    }

    /// Create a time-limited drop (`POST /drops/create`).
    #[instrument(skip(self, params), fields(brand_id = %params.brand_id, server_id = %params.server_id))]
    pub async fn create_drop(&self, params: &CreateDropRequest) -> ClientResult<Value> {
        debug!("Creating drop for {}", params.event_type);
        self.post("/drops/create", params).await
    }

    /// Claim a drop (`POST /drops/claim`).
    #[instrument(skip(self, params), fields(drop_id = %params.drop_id))]
    pub async fn claim_drop(&self, params: &ClaimDropRequest) -> ClientResult<Value> {
        debug!("Claiming drop");
        self.post("/drops/claim", params).await
    }

    /// Reward a third-party bot event (`POST /integrations/process`).
    #[instrument(skip(self, params), fields(brand_id = %params.brand_id, source_bot = ?params.source_bot))]
    pub async fn process_third_party_event(
        &self,
        params: &ThirdPartyEventRequest,
    ) -> ClientResult<Value> {
        debug!("Processing third-party event");
        self.post("/integrations/process", params).await
    }

    /// Perks catalogue (`GET /perks/{brandId}`).
    #[instrument(skip(self, params), fields(brand_id = %params.brand_id))]
    pub async fn get_perks(&self, params: &PerksQuery) -> ClientResult<Value> {
        debug!("Listing perks");

        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(active_only) = params.active_only {
            query.push(("activeOnly", active_only.to_string()));
        }
        if let Some(category) = params.category {
            query.push(("category", category.as_str().to_string()));
        }
        if let Some(ref address) = params.user_address {
            query.push(("userAddress", address.clone()));
        }

        let path = format!("/perks/{}", params.brand_id);
        self.get(&path, &query).await
    }

    /// Perk eligibility (`POST /perks/check-eligibility`).
    #[instrument(skip(self, params), fields(brand_id = %params.brand_id, perk_id = %params.perk_id))]
    pub async fn check_perk_eligibility(
        &self,
        params: &PerkRequest,
    ) -> ClientResult<Value> {
        debug!("Checking perk eligibility");
        self.post("/perks/check-eligibility", params).await
    }

    /// Redeem a perk (`POST /perks/redeem`).
    #[instrument(skip(self, params), fields(brand_id = %params.brand_id, perk_id = %params.perk_id))]
    pub async fn redeem_perk(&self, params: &PerkRequest) -> ClientResult<Value> {
        debug!("Redeeming perk");
        self.post("/perks/redeem", params).await
    }

    /// Achievements of a user (`GET /achievements/{brandId}/{userIdentifier}`).
    #[instrument(skip(self), fields(brand_id = %brand_id))]
    pub async fn get_user_achievements(
        &self,
        brand_id: &BrandId,
        user_identifier: &str,
    ) -> ClientResult<Value> {
        debug!("Fetching achievements");

        let path = format!(
            "/achievements/{}/{}",
            brand_id,
            urlencoding::encode(user_identifier)
        );
        self.get(&path, &NO_QUERY).await
    }

    /// Achievement progress (`POST /achievements/update-progress`).
    #[instrument(skip(self, params), fields(brand_id = %params.brand_id, achievement = ?params.achievement_type))]
    pub async fn update_achievement_progress(
        &self,
        params: &UpdateAchievementRequest,
    ) -> ClientResult<Value> {
        debug!("Updating achievement progress");
        self.post("/achievements/update-progress", params).await
    }

    /// Aggregated user stats (`GET /user-stats/{brandId}/{userIdentifier}`). Unverified.
    #[instrument(skip(self), fields(brand_id = %brand_id))]
    pub async fn get_user_stats(
        &self,
        brand_id: &BrandId,
        user_identifier: &str,
    ) -> ClientResult<Value> {
        debug!("Fetching aggregated user stats");

        let path = format!(
            "/user-stats/{}/{}",
            brand_id,
            urlencoding::encode(user_identifier)
        );
        self.get(&path, &NO_QUERY).await
    }
}

// Streaks

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordActivityRequest {
    pub brand_id: BrandId,
    pub user_identifier: String,
    pub platform: String,
    pub streak_type: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimMilestoneRequest {
    pub brand_id: BrandId,
    pub user_identifier: String,
    pub platform: String,
    pub milestone_days: u32,
    pub streak_type: String,
}

// Leaderboards

#[derive(Debug, Clone)]
pub struct LeaderboardQuery {
    pub brand_id: BrandId,
    pub metric: String,
    pub period: Period,
    pub platform: Option<String>,
    pub limit: u32,
}

/// 1-based position of `user_id` in a leaderboard's `rankings`, with the
/// entry's `value`.
pub fn leaderboard_standing(board: &Value, user_id: &str) -> Option<(usize, Value)> {
    let rankings = board.get("rankings")?.as_array()?;
    let index = rankings
        .iter()
        .position(|entry| entry.get("userId").and_then(Value::as_str) == Some(user_id))?;
    let value = rankings[index].get("value").cloned().unwrap_or(Value::Null);
    Some((index + 1, value))
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatsRequest {
    pub brand_id: BrandId,
    pub user_identifier: String,
    pub platform: String,
    pub ltz_amount: serde_json::Number,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

// Activity and rewards

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Voice,
    Message,
    Reaction,
    Presence,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogActivityRequest {
    pub brand_id: BrandId,
    pub user_identifier: String,
    pub platform: String,
    pub activity_type: ActivityType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<serde_json::Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<serde_json::Number>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRewardRequest {
    pub brand_id: BrandId,
    pub user_identifier: String,
    pub platform: String,
    pub base_reward: serde_json::Number,
    pub event_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
}

// Drops

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    Reaction,
    Button,
    Command,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDropRequest {
    pub brand_id: BrandId,
    pub platform: String,
    pub server_id: String,
    pub event_type: String,
    pub reward: serde_json::Number,
    pub max_claims: u64,
    pub expires_in_seconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_type: Option<TriggerType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_emoji: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimDropRequest {
    pub drop_id: String,
    pub platform_user_id: String,
    pub platform: String,
}

// Integrations

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceBot {
    #[serde(rename = "mee6")]
    Mee6,
    #[serde(rename = "arcane")]
    Arcane,
    #[serde(rename = "tatsu")]
    Tatsu,
    #[serde(rename = "carl-bot")]
    CarlBot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThirdPartyEventType {
    LevelUp,
    Achievement,
    Streak,
    Message,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThirdPartyEventRequest {
    pub brand_id: BrandId,
    pub platform: String,
    pub source_bot: SourceBot,
    pub event_type: ThirdPartyEventType,
    pub target_user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<serde_json::Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub achievement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

// Perks

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerkCategory {
    All,
    Discount,
    Exclusive,
    Merch,
    Digital,
    Experience,
    General,
}

impl PerkCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PerkCategory::All => "all",
            PerkCategory::Discount => "discount",
            PerkCategory::Exclusive => "exclusive",
            PerkCategory::Merch => "merch",
            PerkCategory::Digital => "digital",
            PerkCategory::Experience => "experience",
            PerkCategory::General => "general",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PerksQuery {
    pub brand_id: BrandId,
    pub active_only: Option<bool>,
    pub category: Option<PerkCategory>,
    pub user_address: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerkRequest {
    pub brand_id: BrandId,
    pub user_identifier: String,
    pub platform: String,
    pub perk_id: String,
}

// Achievements

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementType {
    MessageCount,
    VoiceHours,
    StreakDays,
    EventsClaimed,
    GmCount,
    LevelReached,
    LtzEarned,
    Custom,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAchievementRequest {
    pub brand_id: BrandId,
    pub user_identifier: String,
    pub platform: String,
    pub achievement_type: AchievementType,
    pub new_value: serde_json::Number,
    pub increment: bool,
}
