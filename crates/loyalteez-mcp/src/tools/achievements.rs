//! Achievement tools

use super::{
    brand_id_property, failure, platform_property, user_id_string_property, ToolOutcome,
};
use crate::clients::services::{AchievementType, UpdateAchievementRequest};
use crate::server::{McpServerResult, Tool, ToolContext};
use crate::types::{ToolDefinition, ToolResult};
use crate::validation::parse_args;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Number, Value};
use std::sync::Arc;
use tracing::instrument;

/// Tool to list a user's achievements and progress.
pub struct GetUserAchievementsTool;

#[async_trait]
impl Tool for GetUserAchievementsTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "loyalteez_get_user_achievements",
            "Get all achievements for a user, showing progress toward each and which are unlocked.\n\nSee also: loyalteez://docs/shared-services/achievement-service",
        )
        .with_category("achievements")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "brandId": brand_id_property(),
                "userIdentifier": user_id_string_property()
            },
            "required": ["userIdentifier"]
        }))
    }

    #[instrument(skip(self, args, context), fields(tool = "get_user_achievements"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<ToolResult> {
        match get_user_achievements(args, context).await {
            Ok(value) => Ok(ToolResult::json(value)),
            Err(e) => Ok(failure("getting user achievements", e)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetUserAchievementsParams {
    brand_id: Option<String>,
    user_identifier: String,
}

async fn get_user_achievements(args: Value, context: &ToolContext) -> ToolOutcome<Value> {
    let params: GetUserAchievementsParams = parse_args(args)?;
    let brand_id = context.brand_id(params.brand_id.as_deref())?;

    Ok(context
        .client()
        .services()
        .get_user_achievements(&brand_id, &params.user_identifier)
        .await?)
}

/// Tool to set or increment achievement progress.
pub struct UpdateAchievementProgressTool;

#[async_trait]
impl Tool for UpdateAchievementProgressTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "loyalteez_update_achievement_progress",
            "Update user progress toward an achievement. When progress reaches the threshold, the achievement automatically unlocks. Returns newly unlocked achievements.\n\nSee also: loyalteez://docs/shared-services/achievement-service",
        )
        .with_category("achievements")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "brandId": brand_id_property(),
                "userIdentifier": user_id_string_property(),
                "platform": platform_property(),
                "achievementType": {
                    "type": "string",
                    "enum": ["message_count", "voice_hours", "streak_days", "events_claimed", "gm_count", "level_reached", "ltz_earned", "custom"],
                    "description": "Type of achievement to update"
                },
                "newValue": {
                    "type": "number",
                    "description": "New progress value"
                },
                "increment": {
                    "type": "boolean",
                    "description": "If true, adds newValue to current progress. If false, sets progress to newValue."
                }
            },
            "required": ["userIdentifier", "platform", "achievementType", "newValue"]
        }))
    }

    #[instrument(skip(self, args, context), fields(tool = "update_achievement_progress"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<ToolResult> {
        match update_achievement_progress(args, context).await {
            Ok(value) => Ok(ToolResult::json(value)),
            Err(e) => Ok(failure("updating achievement progress", e)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateAchievementProgressParams {
    brand_id: Option<String>,
    user_identifier: String,
    platform: String,
    achievement_type: AchievementType,
    new_value: Number,
    #[serde(default)]
    increment: bool,
}

async fn update_achievement_progress(args: Value, context: &ToolContext) -> ToolOutcome<Value> {
    let params: UpdateAchievementProgressParams = parse_args(args)?;
    let brand_id = context.brand_id(params.brand_id.as_deref())?;

    Ok(context
        .client()
        .services()
        .update_achievement_progress(&UpdateAchievementRequest {
            brand_id,
            user_identifier: params.user_identifier,
            platform: params.platform,
            achievement_type: params.achievement_type,
            new_value: params.new_value,
            increment: params.increment,
        })
        .await?)
}

/// Get all achievement tools.
pub fn achievement_tools() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(GetUserAchievementsTool),
        Arc::new(UpdateAchievementProgressTool),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_defaults_to_false() {
        let params: UpdateAchievementProgressParams = parse_args(json!({
            "userIdentifier": "discord_1@loyalteez.app",
            "platform": "discord",
            "achievementType": "gm_count",
            "newValue": 3
        }))
        .unwrap();
        assert!(!params.increment);
        assert_eq!(params.achievement_type, AchievementType::GmCount);
    }

    #[test]
    fn test_rejects_unknown_achievement() {
        let parsed = parse_args::<UpdateAchievementProgressParams>(json!({
            "userIdentifier": "discord_1@loyalteez.app",
            "platform": "discord",
            "achievementType": "karma",
            "newValue": 3
        }));
        assert!(parsed.is_err());
    }
}
