//! Drop tools
//!
//! Time-limited reward drops: reaction drops, claim buttons and commands.

use super::{brand_id_property, failure, platform_property, ToolOutcome};
use crate::clients::services::{ClaimDropRequest, CreateDropRequest, TriggerType};
use crate::server::{McpServerResult, Tool, ToolContext};
use crate::types::{ToolDefinition, ToolResult};
use crate::validation::{parse_args, validate_positive, ValidationError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Number, Value};
use std::sync::Arc;
use tracing::instrument;

/// Tool to create a drop.
pub struct CreateDropTool;

#[async_trait]
impl Tool for CreateDropTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "loyalteez_create_drop",
            "Create time-limited reward drops (reaction drops, claim buttons). Returns drop ID, claim URL, and embed data for posting.\n\nSee also: loyalteez://docs/shared-services/drops-service",
        )
        .with_category("drops")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "brandId": brand_id_property(),
                "platform": platform_property(),
                "serverId": {
                    "type": "string",
                    "description": "Server/community ID (for Discord/Telegram)"
                },
                "eventType": {
                    "type": "string",
                    "description": "Event type to trigger when claimed"
                },
                "reward": { "type": "number", "description": "LTZ reward amount" },
                "maxClaims": { "type": "number", "description": "Maximum number of claims" },
                "expiresInSeconds": {
                    "type": "number",
                    "description": "Time until drop expires (in seconds)"
                },
                "triggerType": {
                    "type": "string",
                    "enum": ["reaction", "button", "command"],
                    "description": "How users claim the drop"
                },
                "triggerEmoji": {
                    "type": "string",
                    "description": "Emoji for reaction-based drops"
                },
                "metadata": {
                    "type": "object",
                    "description": "Additional drop configuration"
                }
            },
            "required": ["platform", "serverId", "eventType", "reward", "maxClaims", "expiresInSeconds"]
        }))
    }

    #[instrument(skip(self, args, context), fields(tool = "create_drop"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<ToolResult> {
        match create_drop(args, context).await {
            Ok(value) => Ok(ToolResult::json(value)),
            Err(e) => Ok(failure("creating drop", e)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateDropParams {
    brand_id: Option<String>,
    platform: String,
    server_id: String,
    event_type: String,
    reward: Number,
    max_claims: Number,
    expires_in_seconds: Number,
    trigger_type: Option<TriggerType>,
    trigger_emoji: Option<String>,
    metadata: Option<Map<String, Value>>,
}

fn positive_count(value: &Number, field: &'static str) -> Result<u64, ValidationError> {
    value
        .as_u64()
        .filter(|n| *n > 0)
        .ok_or_else(|| ValidationError::field(field, format!("{} must be a positive integer", field)))
}

async fn create_drop(args: Value, context: &ToolContext) -> ToolOutcome<Value> {
    let params: CreateDropParams = parse_args(args)?;
    let brand_id = context.brand_id(params.brand_id.as_deref())?;
    validate_positive(&params.reward, "reward")?;
    let max_claims = positive_count(&params.max_claims, "maxClaims")?;
    let expires_in_seconds = positive_count(&params.expires_in_seconds, "expiresInSeconds")?;

    Ok(context
        .client()
        .services()
        .create_drop(&CreateDropRequest {
            brand_id,
            platform: params.platform,
            server_id: params.server_id,
            event_type: params.event_type,
            reward: params.reward,
            max_claims,
            expires_in_seconds,
            trigger_type: params.trigger_type,
            trigger_emoji: params.trigger_emoji,
            metadata: params.metadata,
        })
        .await?)
}

/// Tool to claim a drop for a user.
pub struct ClaimDropTool;

#[async_trait]
impl Tool for ClaimDropTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "loyalteez_claim_drop",
            "Process a drop claim from a user. Returns success status, reward amount, position, and remaining claims.\n\nSee also: loyalteez://docs/shared-services/drops-service",
        )
        .with_category("drops")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "dropId": {
                    "type": "string",
                    "description": "Drop ID from create_drop response"
                },
                "platformUserId": {
                    "type": "string",
                    "description": "Platform-specific user ID"
                },
                "platform": platform_property()
            },
            "required": ["dropId", "platformUserId", "platform"]
        }))
    }

    #[instrument(skip(self, args, context), fields(tool = "claim_drop"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<ToolResult> {
        match claim_drop(args, context).await {
            Ok(value) => Ok(ToolResult::json(value)),
            Err(e) => Ok(failure("claiming drop", e)),
        }
    }
}

async fn claim_drop(args: Value, context: &ToolContext) -> ToolOutcome<Value> {
    let params: ClaimDropRequest = parse_args(args)?;
    Ok(context.client().services().claim_drop(&params).await?)
}

/// Get all drop tools.
pub fn drop_tools() -> Vec<Arc<dyn Tool>> {
    vec![Arc::new(CreateDropTool), Arc::new(ClaimDropTool)]
}
