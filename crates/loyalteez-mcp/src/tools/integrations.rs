//! Integration tools

use super::{brand_id_property, failure, ToolOutcome};
use crate::clients::services::{SourceBot, ThirdPartyEventRequest, ThirdPartyEventType};
use crate::server::{McpServerResult, Tool, ToolContext};
use crate::types::{ToolDefinition, ToolResult};
use crate::validation::parse_args;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Number, Value};
use std::sync::Arc;
use tracing::instrument;

/// Tool to reward an event reported by a leveling bot.
pub struct ProcessThirdPartyEventTool;

#[async_trait]
impl Tool for ProcessThirdPartyEventTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "loyalteez_process_third_party_event",
            "Handle events from Mee6, Arcane, Tatsu, etc. Parses bot messages and converts to Loyalteez events. Use this to integrate with existing Discord leveling bots.\n\nSee also: loyalteez://docs/integrations/third-party",
        )
        .with_category("integrations")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "brandId": brand_id_property(),
                "platform": {
                    "type": "string",
                    "description": "Platform: \"discord\" | \"telegram\" | etc."
                },
                "sourceBot": {
                    "type": "string",
                    "enum": ["mee6", "arcane", "tatsu", "carl-bot"],
                    "description": "Source bot that generated the event"
                },
                "eventType": {
                    "type": "string",
                    "enum": ["level_up", "achievement", "streak", "message"],
                    "description": "Type of event from the bot"
                },
                "targetUserId": {
                    "type": "string",
                    "description": "Target user ID (platform format)"
                },
                "level": {
                    "type": "number",
                    "description": "Level reached (for level_up events)"
                },
                "achievement": {
                    "type": "string",
                    "description": "Achievement name (for achievement events)"
                },
                "rawMessage": {
                    "type": "string",
                    "description": "Raw bot message for parsing"
                },
                "metadata": {
                    "type": "object",
                    "description": "Additional event data"
                }
            },
            "required": ["platform", "sourceBot", "eventType", "targetUserId"]
        }))
    }

    #[instrument(skip(self, args, context), fields(tool = "process_third_party_event"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<ToolResult> {
        match process_third_party_event(args, context).await {
            Ok(value) => Ok(ToolResult::json(value)),
            Err(e) => Ok(failure("processing third-party event", e)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProcessThirdPartyEventParams {
    brand_id: Option<String>,
    platform: String,
    source_bot: SourceBot,
    event_type: ThirdPartyEventType,
    target_user_id: String,
    level: Option<Number>,
    achievement: Option<String>,
    raw_message: Option<String>,
    metadata: Option<Map<String, Value>>,
}

async fn process_third_party_event(args: Value, context: &ToolContext) -> ToolOutcome<Value> {
    let params: ProcessThirdPartyEventParams = parse_args(args)?;
    let brand_id = context.brand_id(params.brand_id.as_deref())?;

    Ok(context
        .client()
        .services()
        .process_third_party_event(&ThirdPartyEventRequest {
            brand_id,
            platform: params.platform,
            source_bot: params.source_bot,
            event_type: params.event_type,
            target_user_id: params.target_user_id,
            level: params.level,
            achievement: params.achievement,
            raw_message: params.raw_message,
            metadata: params.metadata,
        })
        .await?)
}

/// Get all integration tools.
pub fn integration_tools() -> Vec<Arc<dyn Tool>> {
    vec![Arc::new(ProcessThirdPartyEventTool)]
}
