//! Engagement tools
//!
//! Streaks, leaderboards, activity logging and reward multipliers, all
//! served by the shared services API.

use super::{
    brand_id_property, failure, pick, platform_property, user_id_string_property, ToolOutcome,
};
use crate::clients::services::{
    ActivityType, CalculateRewardRequest, ClaimMilestoneRequest, LeaderboardQuery,
    LogActivityRequest, RecordActivityRequest, UpdateStatsRequest,
};
use crate::domain::{platform_email, Period};
use crate::server::{McpServerResult, Tool, ToolContext};
use crate::types::{ToolDefinition, ToolResult};
use crate::validation::{parse_args, validate_positive, ValidationError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Number, Value};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Streak lengths that carry a claimable bonus.
pub const MILESTONE_DAYS: [u32; 4] = [7, 30, 100, 365];

const DEFAULT_STREAK_TYPE: &str = "daily";
const DEFAULT_LEADERBOARD_LIMIT: u32 = 10;

fn default_streak_type() -> String {
    DEFAULT_STREAK_TYPE.to_string()
}

/// Tool to record a daily streak check-in.
pub struct StreakCheckinTool;

#[async_trait]
impl Tool for StreakCheckinTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "loyalteez_streak_checkin",
            "Process a streak check-in with automatic multipliers and milestones. Tracks consecutive daily activity and applies bonus multipliers.\n\nSee also: loyalteez://docs/shared-services/streak-service",
        )
        .with_category("engagement")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "brandId": brand_id_property(),
                "userId": {
                    "type": "string",
                    "description": "Platform user ID (format: platform_userId or email)"
                },
                "platform": platform_property()
            },
            "required": ["userId", "platform"]
        }))
    }

    #[instrument(skip(self, args, context), fields(tool = "streak_checkin"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<ToolResult> {
        match streak_checkin(args, context).await {
            Ok(value) => Ok(ToolResult::json(value)),
            Err(e) => Ok(failure("processing streak check-in", e)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StreakCheckinParams {
    brand_id: Option<String>,
    user_id: String,
    platform: String,
}

/// Emails pass through; bare platform ids get the derived email.
fn checkin_identifier(user_id: &str, platform: &str) -> String {
    if user_id.contains('@') {
        user_id.to_string()
    } else {
        platform_email(platform, user_id)
    }
}

async fn streak_checkin(args: Value, context: &ToolContext) -> ToolOutcome<Value> {
    let params: StreakCheckinParams = parse_args(args)?;
    let brand_id = context.brand_id(params.brand_id.as_deref())?;
    let user_identifier = checkin_identifier(&params.user_id, &params.platform);

    let response = context
        .client()
        .services()
        .record_streak_activity(&RecordActivityRequest {
            brand_id,
            user_identifier,
            platform: params.platform,
            streak_type: default_streak_type(),
        })
        .await?;

    Ok(Value::Object(pick(
        &response,
        &[
            ("success", "success"),
            ("streak", "streak"),
            ("reward", "reward"),
            ("nextMilestone", "nextMilestone"),
        ],
    )))
}

/// Tool to read a ranked leaderboard.
pub struct GetLeaderboardTool;

#[async_trait]
impl Tool for GetLeaderboardTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "loyalteez_get_leaderboard",
            "Get ranked leaderboards by any metric. Supports multiple time periods and platform filtering.\n\nSee also: loyalteez://docs/shared-services/leaderboard-service",
        )
        .with_category("engagement")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "brandId": brand_id_property(),
                "metric": {
                    "type": "string",
                    "description": "Metric to rank by: \"ltz_earned\" | \"streak\" | \"events_completed\" | \"referrals\" | custom"
                },
                "period": {
                    "type": "string",
                    "enum": ["daily", "weekly", "monthly", "all_time"],
                    "description": "Time period: \"daily\" | \"weekly\" | \"monthly\" | \"all_time\""
                },
                "platform": {
                    "type": "string",
                    "description": "Filter by platform (optional)"
                },
                "limit": {
                    "type": "number",
                    "description": "Number of results (default: 10)"
                }
            },
            "required": ["metric", "period"]
        }))
    }

    #[instrument(skip(self, args, context), fields(tool = "get_leaderboard"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<ToolResult> {
        match get_leaderboard(args, context).await {
            Ok(value) => Ok(ToolResult::json(value)),
            Err(e) => Ok(failure("fetching leaderboard", e)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetLeaderboardParams {
    brand_id: Option<String>,
    metric: String,
    period: Period,
    platform: Option<String>,
    limit: Option<i64>,
}

fn leaderboard_limit(limit: Option<i64>) -> Result<u32, ValidationError> {
    match limit {
        None => Ok(DEFAULT_LEADERBOARD_LIMIT),
        Some(n) if n > 0 => u32::try_from(n)
            .map_err(|_| ValidationError::field("limit", "limit is too large")),
        Some(_) => Err(ValidationError::field(
            "limit",
            "limit must be a positive integer",
        )),
    }
}

async fn get_leaderboard(args: Value, context: &ToolContext) -> ToolOutcome<Value> {
    let params: GetLeaderboardParams = parse_args(args)?;
    let brand_id = context.brand_id(params.brand_id.as_deref())?;
    let limit = leaderboard_limit(params.limit)?;

    let response = context
        .client()
        .services()
        .get_leaderboard(&LeaderboardQuery {
            brand_id,
            metric: params.metric,
            period: params.period,
            platform: params.platform,
            limit,
        })
        .await?;

    Ok(Value::Object(pick(
        &response,
        &[("rankings", "rankings"), ("userRank", "userRank")],
    )))
}

/// Tool to read a user's streak.
pub struct GetStreakStatusTool;

#[async_trait]
impl Tool for GetStreakStatusTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "loyalteez_get_streak_status",
            "Get a user's current streak status including streak length, multiplier, next milestone, and whether they've checked in today.\n\nSee also: loyalteez://docs/shared-services/streak-service",
        )
        .with_category("engagement")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "brandId": brand_id_property(),
                "userIdentifier": user_id_string_property(),
                "streakType": {
                    "type": "string",
                    "description": "Type of streak (default: \"daily\")"
                }
            },
            "required": ["userIdentifier"]
        }))
    }

    #[instrument(skip(self, args, context), fields(tool = "get_streak_status"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<ToolResult> {
        match get_streak_status(args, context).await {
            Ok(value) => Ok(ToolResult::json(value)),
            Err(e) => Ok(failure("getting streak status", e)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetStreakStatusParams {
    brand_id: Option<String>,
    user_identifier: String,
    #[serde(default = "default_streak_type")]
    streak_type: String,
}

async fn get_streak_status(args: Value, context: &ToolContext) -> ToolOutcome<Value> {
    let params: GetStreakStatusParams = parse_args(args)?;
    let brand_id = context.brand_id(params.brand_id.as_deref())?;

    Ok(context
        .client()
        .services()
        .get_streak_status(&brand_id, &params.user_identifier, &params.streak_type)
        .await?)
}

/// Tool to claim a streak milestone bonus.
pub struct ClaimStreakMilestoneTool;

#[async_trait]
impl Tool for ClaimStreakMilestoneTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "loyalteez_claim_streak_milestone",
            "Claim a milestone bonus (7, 30, 100, 365 days) for a user's streak. Returns the bonus LTZ amount awarded.\n\nSee also: loyalteez://docs/shared-services/streak-service",
        )
        .with_category("engagement")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "brandId": brand_id_property(),
                "userIdentifier": user_id_string_property(),
                "platform": platform_property(),
                "milestoneDays": {
                    "type": "number",
                    "enum": MILESTONE_DAYS,
                    "description": "Milestone to claim"
                },
                "streakType": {
                    "type": "string",
                    "description": "Type of streak (default: \"daily\")"
                }
            },
            "required": ["userIdentifier", "platform", "milestoneDays"]
        }))
    }

    #[instrument(skip(self, args, context), fields(tool = "claim_streak_milestone"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<ToolResult> {
        match claim_streak_milestone(args, context).await {
            Ok(value) => Ok(ToolResult::json(value)),
            Err(e) => Ok(failure("claiming streak milestone", e)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClaimStreakMilestoneParams {
    brand_id: Option<String>,
    user_identifier: String,
    platform: String,
    milestone_days: Number,
    #[serde(default = "default_streak_type")]
    streak_type: String,
}

fn milestone_days(value: &Number) -> Result<u32, ValidationError> {
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| MILESTONE_DAYS.contains(n))
        .ok_or_else(|| {
            ValidationError::field("milestoneDays", "milestoneDays must be one of 7, 30, 100, 365")
        })
}

async fn claim_streak_milestone(args: Value, context: &ToolContext) -> ToolOutcome<Value> {
    let params: ClaimStreakMilestoneParams = parse_args(args)?;
    let brand_id = context.brand_id(params.brand_id.as_deref())?;
    let milestone_days = milestone_days(&params.milestone_days)?;
    debug!("Claiming {}-day milestone", milestone_days);

    Ok(context
        .client()
        .services()
        .claim_streak_milestone(&ClaimMilestoneRequest {
            brand_id,
            user_identifier: params.user_identifier,
            platform: params.platform,
            milestone_days,
            streak_type: params.streak_type,
        })
        .await?)
}

/// Tool to log voice time, messages and reactions.
pub struct LogActivityTool;

#[async_trait]
impl Tool for LogActivityTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "loyalteez_log_activity",
            "Track voice time, messages, reactions with daily caps. Returns reward earned, daily progress, and cap status.\n\nSee also: loyalteez://docs/shared-services/activity-service",
        )
        .with_category("engagement")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "brandId": brand_id_property(),
                "userIdentifier": user_id_string_property(),
                "platform": platform_property(),
                "activityType": {
                    "type": "string",
                    "enum": ["voice", "message", "reaction", "presence"],
                    "description": "Type of activity to log"
                },
                "durationMinutes": {
                    "type": "number",
                    "description": "Duration in minutes (for voice activity)"
                },
                "count": {
                    "type": "number",
                    "description": "Count of activities (for messages/reactions)"
                }
            },
            "required": ["userIdentifier", "platform", "activityType"]
        }))
    }

    #[instrument(skip(self, args, context), fields(tool = "log_activity"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<ToolResult> {
        match log_activity(args, context).await {
            Ok(value) => Ok(ToolResult::json(value)),
            Err(e) => Ok(failure("logging activity", e)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogActivityParams {
    brand_id: Option<String>,
    user_identifier: String,
    platform: String,
    activity_type: ActivityType,
    duration_minutes: Option<Number>,
    count: Option<Number>,
}

async fn log_activity(args: Value, context: &ToolContext) -> ToolOutcome<Value> {
    let params: LogActivityParams = parse_args(args)?;
    let brand_id = context.brand_id(params.brand_id.as_deref())?;

    Ok(context
        .client()
        .services()
        .log_activity(&LogActivityRequest {
            brand_id,
            user_identifier: params.user_identifier,
            platform: params.platform,
            activity_type: params.activity_type,
            duration_minutes: params.duration_minutes,
            count: params.count,
        })
        .await?)
}

/// Tool to apply streak and role multipliers to a base reward.
pub struct CalculateRewardTool;

#[async_trait]
impl Tool for CalculateRewardTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "loyalteez_calculate_reward",
            "Calculate final reward with role multipliers & bonuses. Returns breakdown of base reward, multipliers, and final amount.\n\nSee also: loyalteez://docs/shared-services/tier-service",
        )
        .with_category("engagement")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "brandId": brand_id_property(),
                "userIdentifier": user_id_string_property(),
                "platform": platform_property(),
                "baseReward": {
                    "type": "number",
                    "description": "Base reward amount before multipliers"
                },
                "eventType": {
                    "type": "string",
                    "description": "Event type for context"
                },
                "roles": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Platform role IDs (for role multipliers)"
                }
            },
            "required": ["userIdentifier", "platform", "baseReward", "eventType"]
        }))
    }

    #[instrument(skip(self, args, context), fields(tool = "calculate_reward"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<ToolResult> {
        match calculate_reward(args, context).await {
            Ok(value) => Ok(ToolResult::json(value)),
            Err(e) => Ok(failure("calculating reward", e)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalculateRewardParams {
    brand_id: Option<String>,
    user_identifier: String,
    platform: String,
    base_reward: Number,
    event_type: String,
    roles: Option<Vec<String>>,
}

async fn calculate_reward(args: Value, context: &ToolContext) -> ToolOutcome<Value> {
    let params: CalculateRewardParams = parse_args(args)?;
    let brand_id = context.brand_id(params.brand_id.as_deref())?;
    validate_positive(&params.base_reward, "baseReward")?;

    Ok(context
        .client()
        .services()
        .calculate_reward(&CalculateRewardRequest {
            brand_id,
            user_identifier: params.user_identifier,
            platform: params.platform,
            base_reward: params.base_reward,
            event_type: params.event_type,
            roles: params.roles,
        })
        .await?)
}

/// Tool to record earned LTZ on the leaderboard.
pub struct UpdateLeaderboardStatsTool;

#[async_trait]
impl Tool for UpdateLeaderboardStatsTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "loyalteez_update_leaderboard_stats",
            "Update user statistics after rewarding them. This keeps leaderboard data current. Call after every reward distribution.\n\nSee also: loyalteez://docs/shared-services/leaderboard-service",
        )
        .with_category("engagement")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "brandId": brand_id_property(),
                "userIdentifier": user_id_string_property(),
                "platform": platform_property(),
                "ltzAmount": {
                    "type": "number",
                    "description": "LTZ amount earned"
                },
                "claimType": {
                    "type": "string",
                    "description": "Type of claim/event (e.g., \"daily_checkin\", \"purchase\")"
                },
                "displayName": {
                    "type": "string",
                    "description": "User's display name for leaderboard"
                }
            },
            "required": ["userIdentifier", "platform", "ltzAmount"]
        }))
    }

    #[instrument(skip(self, args, context), fields(tool = "update_leaderboard_stats"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<ToolResult> {
        match update_leaderboard_stats(args, context).await {
            Ok(value) => Ok(ToolResult::json(value)),
            Err(e) => Ok(failure("updating leaderboard stats", e)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateLeaderboardStatsParams {
    brand_id: Option<String>,
    user_identifier: String,
    platform: String,
    ltz_amount: Number,
    claim_type: Option<String>,
    display_name: Option<String>,
}

async fn update_leaderboard_stats(args: Value, context: &ToolContext) -> ToolOutcome<Value> {
    let params: UpdateLeaderboardStatsParams = parse_args(args)?;
    let brand_id = context.brand_id(params.brand_id.as_deref())?;
    validate_positive(&params.ltz_amount, "ltzAmount")?;

    Ok(context
        .client()
        .services()
        .update_leaderboard_stats(&UpdateStatsRequest {
            brand_id,
            user_identifier: params.user_identifier,
            platform: params.platform,
            ltz_amount: params.ltz_amount,
            claim_type: params.claim_type,
            display_name: params.display_name,
        })
        .await?)
}

/// Get all engagement tools.
pub fn engagement_tools() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(StreakCheckinTool),
        Arc::new(GetLeaderboardTool),
        Arc::new(GetStreakStatusTool),
        Arc::new(ClaimStreakMilestoneTool),
        Arc::new(LogActivityTool),
        Arc::new(CalculateRewardTool),
        Arc::new(UpdateLeaderboardStatsTool),
    ]
}
