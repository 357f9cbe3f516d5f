//! Event tools
//!
//! Define custom reward events and fire them. Definitions are validated and
//! echoed back with tracking code; tracking goes to the event handler.

use super::{
    brand_id_property, failure, pick, unix_millis, user_identifier_property, ToolOutcome,
};
use crate::clients::event_handler::{BulkEvent, BulkEventsRequest, TrackEventRequest};
use crate::codegen::batch;
use crate::domain::UserIdentifier;
use crate::server::{McpServerResult, Tool, ToolContext};
use crate::types::{ToolDefinition, ToolResult};
use crate::validation::{
    parse_args, validate_brand_id, validate_email, validate_event_definition,
    validate_event_type, validate_user_identifier, ValidationError,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Largest batch accepted by `bulk_events`.
pub const MAX_BULK_EVENTS: usize = 100;

/// Tool to define a custom event.
///
/// Any string can be an event type. The definition is validated and handed
/// back with a tracking snippet; nothing is sent to the platform.
pub struct CreateEventTool;

#[async_trait]
impl Tool for CreateEventTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "loyalteez_create_event",
            "Create a custom event for your loyalty program. Events are infinitely flexible - any string can be an event type. Once created, the backend handles: fire event → check auth → reward from balance.\n\nSee also: loyalteez://docs/guides/custom-events",
        )
        .with_category("events")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "brandId": brand_id_property(),
                "event": {
                    "type": "object",
                    "description": "Event configuration",
                    "properties": {
                        "name": {
                            "type": "string",
                            "description": "Human-readable event name (e.g., \"Helpful Answer\")"
                        },
                        "eventType": {
                            "type": "string",
                            "description": "Unique identifier (auto-generated if not provided). Format: alphanumeric + underscore, max 50 chars"
                        },
                        "description": {
                            "type": "string",
                            "description": "What triggers this event"
                        },
                        "category": {
                            "type": "string",
                            "description": "Event category: \"engagement\" | \"quality\" | \"growth\" | \"commerce\" | custom"
                        },
                        "defaultReward": { "type": "number", "description": "LTZ reward amount" },
                        "maxClaimsPerUser": {
                            "type": "number",
                            "description": "Maximum times a user can claim (1 for one-time, higher for repeatable)"
                        },
                        "cooldownHours": {
                            "type": "number",
                            "description": "Hours between claims (0 = no cooldown)"
                        },
                        "requiresEmail": {
                            "type": "boolean",
                            "description": "Whether event requires email (usually true)"
                        },
                        "detectionMethods": {
                            "type": "array",
                            "description": "How event is triggered",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "method": {
                                        "type": "string",
                                        "enum": ["webhook", "discord_interaction", "url_pattern", "form_submission", "css_selector"]
                                    },
                                    "config": {
                                        "type": "object",
                                        "description": "Detection method configuration"
                                    }
                                }
                            }
                        },
                        "metadata": {
                            "type": "object",
                            "description": "Additional event configuration"
                        }
                    },
                    "required": ["name", "description", "defaultReward", "maxClaimsPerUser"]
                }
            },
            "required": ["event"]
        }))
    }

    #[instrument(skip(self, args, context), fields(tool = "create_event"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<ToolResult> {
        match create_event(args, context) {
            Ok(value) => Ok(ToolResult::json(value)),
            Err(e) => Ok(failure("creating event", e)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateEventParams {
    brand_id: Option<String>,
    event: Value,
}

fn create_event(args: Value, context: &ToolContext) -> ToolOutcome<Value> {
    let params: CreateEventParams = parse_args(args)?;
    let brand_id = context.brand_id(params.brand_id.as_deref())?;
    let event = validate_event_definition(params.event)?;

    let millis = unix_millis();
    let brand = brand_id.as_str();
    let event_type = event
        .event_type
        .clone()
        .unwrap_or_else(|| format!("custom_{}_{}", &brand[2..10], millis));
    debug!("Defining event {}", event_type);

    let mut described = match serde_json::to_value(&event)? {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    described.insert("id".to_string(), json!(format!("custom_{}_{}", brand, millis)));
    described.insert("eventType".to_string(), json!(event_type));

    Ok(json!({
        "success": true,
        "event": described,
        "trackingCode": format!(
            "// Track this event:\nawait loyalteez_track_event({{\n  brandId: \"{}\",\n  eventType: \"{}\",\n  userIdentifier: {{ email: \"user@example.com\" }}\n}});",
            brand, event_type
        ),
        "webhookEndpoint": context.client().event_handler().manual_event_url(),
    }))
}

/// Tool to define several events for one platform.
pub struct CreateEventsBatchTool;

#[async_trait]
impl Tool for CreateEventsBatchTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "loyalteez_create_events_batch",
            "Create multiple events at once. Perfect for setting up entire programs. Returns all created events plus platform-specific implementation code.\n\nSee also: loyalteez://docs/guides/custom-events",
        )
        .with_category("events")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "brandId": brand_id_property(),
                "platform": {
                    "type": "string",
                    "description": "Platform: \"discord\" | \"telegram\" | \"web\" | \"shopify\" | etc."
                },
                "events": {
                    "type": "array",
                    "description": "Array of event definitions",
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "reward": { "type": "number" },
                            "maxClaims": { "type": "number" },
                            "cooldownHours": { "type": "number" },
                            "description": { "type": "string" }
                        },
                        "required": ["name", "reward", "maxClaims"]
                    }
                }
            },
            "required": ["platform", "events"]
        }))
    }

    #[instrument(skip(self, args, context), fields(tool = "create_events_batch"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<ToolResult> {
        match create_events_batch(args, context) {
            Ok(value) => Ok(ToolResult::json(value)),
            Err(e) => Ok(failure("creating events batch", e)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateEventsBatchParams {
    brand_id: Option<String>,
    platform: String,
    events: Vec<BatchEvent>,
}

#[derive(Debug, Deserialize)]
struct BatchEvent {
    name: String,
    reward: serde_json::Number,
}

/// `{platform}_{name lowercased, whitespace runs as _}_{millis}`.
fn batch_event_type(platform: &str, name: &str, millis: i64) -> String {
    let slug = name
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    format!("{}_{}_{}", platform, slug, millis)
}

fn create_events_batch(args: Value, context: &ToolContext) -> ToolOutcome<Value> {
    let params: CreateEventsBatchParams = parse_args(args)?;
    let brand_id = context.brand_id(params.brand_id.as_deref())?;

    let mut created = Vec::new();
    let mut failed = Vec::new();
    for event in &params.events {
        if event.name.trim().is_empty() {
            failed.push(json!({ "event": event.name, "error": "Event name is required" }));
            continue;
        }
        created.push(json!({
            "eventType": batch_event_type(&params.platform, &event.name, unix_millis()),
            "name": event.name,
            "reward": event.reward,
        }));
    }
    debug!("Defined {} events for {}", created.len(), params.platform);

    let first_event_type = created
        .first()
        .and_then(|e| e["eventType"].as_str())
        .map(str::to_string);
    let implementation_code = batch::implementation_code(
        &params.platform,
        brand_id.as_str(),
        first_event_type.as_deref(),
        &context.client().event_handler().manual_event_url(),
    );

    Ok(json!({
        "created": created,
        "failed": failed,
        "implementationCode": implementation_code,
    }))
}

/// Tool to fire an event for a user.
pub struct TrackEventTool;

#[async_trait]
impl Tool for TrackEventTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "loyalteez_track_event",
            "Fire any event. Works for ANY event type - predefined or custom. The backend handles: check auth (brandId) → check eligibility → reward from balance.\n\nSee also: loyalteez://docs/api/rest-api",
        )
        .with_category("events")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "brandId": brand_id_property(),
                "eventType": {
                    "type": "string",
                    "description": "Event type (any string - predefined or custom)"
                },
                "userIdentifier": user_identifier_property(),
                "metadata": {
                    "type": "object",
                    "description": "Additional event data"
                },
                "domain": {
                    "type": "string",
                    "description": "Domain the event happened on"
                },
                "sourceUrl": {
                    "type": "string",
                    "description": "Page URL the event happened on"
                },
                "channelId": {
                    "type": "string",
                    "description": "Discord channel ID, for channel-restricted events"
                }
            },
            "required": ["eventType", "userIdentifier"]
        }))
    }

    #[instrument(skip(self, args, context), fields(tool = "track_event"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<ToolResult> {
        match track_event(args, context).await {
            Ok(value) => Ok(ToolResult::json(value)),
            Err(e) => Ok(failure("tracking event", e)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackEventParams {
    brand_id: Option<String>,
    event_type: String,
    user_identifier: UserIdentifier,
    metadata: Option<Map<String, Value>>,
    domain: Option<String>,
    source_url: Option<String>,
    channel_id: Option<String>,
}

async fn track_event(args: Value, context: &ToolContext) -> ToolOutcome<Value> {
    let params: TrackEventParams = parse_args(args)?;
    let brand_id = context.brand_id(params.brand_id.as_deref())?;
    let event_type = validate_event_type(&params.event_type)?;
    let user = validate_user_identifier(params.user_identifier)?;
    let user_email = user
        .resolved_email()
        .ok_or(ValidationError::UserIdentifier)?;

    let response = context
        .client()
        .event_handler()
        .track_event(TrackEventRequest {
            brand_id,
            event_type,
            user_email: user_email.clone(),
            user_identifier: user_email,
            domain: params.domain,
            source_url: params.source_url,
            metadata: params.metadata,
            channel_id: params.channel_id,
        })
        .await?;

    let mut summary = pick(
        &response,
        &[
            ("success", "success"),
            ("rewardAmount", "reward"),
            ("eventId", "eventId"),
            ("walletAddress", "walletAddress"),
            ("transactionHash", "transactionHash"),
        ],
    );
    summary.insert("newBalance".to_string(), json!(0));
    Ok(Value::Object(summary))
}

/// Tool to list the events configured for a brand.
pub struct GetEventConfigTool;

#[async_trait]
impl Tool for GetEventConfigTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "loyalteez_get_event_config",
            "Get the events configured for a brand in the Partner Portal, with rewards, claim limits, cooldowns and detection methods.\n\nSee also: loyalteez://events/standard",
        )
        .with_category("events")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "brandId": brand_id_property()
            }
        }))
    }

    #[instrument(skip(self, args, context), fields(tool = "get_event_config"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<ToolResult> {
        match get_event_config(args, context).await {
            Ok(value) => Ok(ToolResult::json(value)),
            Err(e) => Ok(failure("getting event config", e)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetEventConfigParams {
    brand_id: Option<String>,
}

async fn get_event_config(args: Value, context: &ToolContext) -> ToolOutcome<Value> {
    let params: GetEventConfigParams = parse_args(args)?;
    let brand_id = context.brand_id(params.brand_id.as_deref())?;

    Ok(context
        .client()
        .event_handler()
        .get_event_config(&brand_id)
        .await?)
}

/// Tool to fire up to 100 events in one request.
pub struct BulkEventsTool;

#[async_trait]
impl Tool for BulkEventsTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "loyalteez_bulk_events",
            "Track up to 100 events in a single request. Each event may name its own brand; events without one use the default brand.\n\nSee also: loyalteez://docs/api/rest-api",
        )
        .with_category("events")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "brandId": brand_id_property(),
                "events": {
                    "type": "array",
                    "description": "Events to track (max 100)",
                    "maxItems": MAX_BULK_EVENTS,
                    "items": {
                        "type": "object",
                        "properties": {
                            "brandId": { "type": "string" },
                            "eventType": { "type": "string" },
                            "userEmail": { "type": "string" },
                            "domain": { "type": "string" },
                            "sourceUrl": { "type": "string" },
                            "metadata": { "type": "object" }
                        },
                        "required": ["eventType", "userEmail"]
                    }
                }
            },
            "required": ["events"]
        }))
    }

    #[instrument(skip(self, args, context), fields(tool = "bulk_events"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<ToolResult> {
        match bulk_events(args, context).await {
            Ok(value) => Ok(ToolResult::json(value)),
            Err(e) => Ok(failure("tracking bulk events", e)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BulkEventsParams {
    brand_id: Option<String>,
    events: Vec<BulkEventParams>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BulkEventParams {
    brand_id: Option<String>,
    event_type: String,
    user_email: String,
    domain: Option<String>,
    source_url: Option<String>,
    metadata: Option<Map<String, Value>>,
}

async fn bulk_events(args: Value, context: &ToolContext) -> ToolOutcome<Value> {
    let params: BulkEventsParams = parse_args(args)?;

    if params.events.is_empty() {
        return Err(ValidationError::field("events", "At least one event is required").into());
    }
    if params.events.len() > MAX_BULK_EVENTS {
        return Err(ValidationError::field(
            "events",
            format!("A maximum of {} events can be tracked per request", MAX_BULK_EVENTS),
        )
        .into());
    }

    let events = params
        .events
        .into_iter()
        .map(|event| {
            let brand_id = match event.brand_id.as_deref() {
                Some(candidate) => validate_brand_id(candidate)?,
                None => context.brand_id(params.brand_id.as_deref())?,
            };
            Ok(BulkEvent {
                brand_id,
                event_type: validate_event_type(&event.event_type)?,
                user_email: validate_email(&event.user_email)?,
                domain: event.domain,
                source_url: event.source_url,
                metadata: event.metadata,
            })
        })
        .collect::<Result<Vec<_>, ValidationError>>()?;

    Ok(context
        .client()
        .event_handler()
        .bulk_events(BulkEventsRequest { events })
        .await?)
}

/// Get all event tools.
pub fn event_tools() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(CreateEventTool),
        Arc::new(CreateEventsBatchTool),
        Arc::new(TrackEventTool),
        Arc::new(GetEventConfigTool),
        Arc::new(BulkEventsTool),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ServiceConfig;

    const BRAND: &str = "0x1234567890123456789012345678901234567890";

    fn context() -> ToolContext {
        ToolContext::new(&ServiceConfig::default())
            .unwrap()
            .with_default_brand_id(Some(BRAND.to_string()))
    }

    #[test]
    fn test_event_tools_count() {
        assert_eq!(event_tools().len(), 5);
    }

    #[test]
    fn test_batch_event_type() {
        assert_eq!(
            batch_event_type("discord", "Daily  GM\tPost", 1700000000000),
            "discord_daily_gm_post_1700000000000"
        );
    }

    #[tokio::test]
    async fn test_create_event_generates_event_type() {
        let result = CreateEventTool
            .execute(
                json!({
                    "event": {
                        "name": "Helpful Answer",
                        "description": "Recognized for helping another member",
                        "defaultReward": 50,
                        "maxClaimsPerUser": 100
                    }
                }),
                &context(),
            )
            .await
            .unwrap();

        assert!(!result.is_error);
        let body: Value = serde_json::from_str(&result.text_content()).unwrap();
        assert_eq!(body["success"], true);
        let event_type = body["event"]["eventType"].as_str().unwrap();
        assert!(event_type.starts_with("custom_12345678_"), "{}", event_type);
        assert!(body["event"]["id"]
            .as_str()
            .unwrap()
            .starts_with(&format!("custom_{}_", BRAND)));
        assert_eq!(body["event"]["defaultReward"], 50);
        assert_eq!(
            body["webhookEndpoint"],
            "https://api.loyalteez.app/loyalteez-api/manual-event"
        );
        assert!(body["trackingCode"].as_str().unwrap().contains(event_type));
    }

    #[tokio::test]
    async fn test_create_event_keeps_explicit_event_type() {
        let result = CreateEventTool
            .execute(
                json!({
                    "event": {
                        "name": "Daily GM",
                        "eventType": "daily_gm",
                        "description": "Say good morning in the server",
                        "defaultReward": 5,
                        "maxClaimsPerUser": 1,
                        "cooldownHours": 24
                    }
                }),
                &context(),
            )
            .await
            .unwrap();

        let body: Value = serde_json::from_str(&result.text_content()).unwrap();
        assert_eq!(body["event"]["eventType"], "daily_gm");
        assert_eq!(body["event"]["cooldownHours"], 24);
    }

    #[tokio::test]
    async fn test_create_event_rejects_short_name() {
        let result = CreateEventTool
            .execute(
                json!({
                    "event": {
                        "name": "ab",
                        "description": "A long enough description",
                        "defaultReward": 5,
                        "maxClaimsPerUser": 1
                    }
                }),
                &context(),
            )
            .await
            .unwrap();

        assert!(result.is_error);
        assert_eq!(
            result.text_content(),
            "Error creating event: Event name must be at least 3 characters"
        );
    }

    #[tokio::test]
    async fn test_create_event_requires_brand() {
        let context = context().with_default_brand_id(None);
        let result = CreateEventTool
            .execute(json!({"event": {}}), &context)
            .await
            .unwrap();

        assert!(result.is_error);
        assert!(result
            .text_content()
            .starts_with("Error creating event: BrandId is required"));
    }

    #[tokio::test]
    async fn test_create_events_batch_returns_code() {
        let result = CreateEventsBatchTool
            .execute(
                json!({
                    "platform": "telegram",
                    "events": [
                        {"name": "Daily Check In", "reward": 10, "maxClaims": 1},
                        {"name": "Invite Friend", "reward": 100, "maxClaims": 5}
                    ]
                }),
                &context(),
            )
            .await
            .unwrap();

        let body: Value = serde_json::from_str(&result.text_content()).unwrap();
        let created = body["created"].as_array().unwrap();
        assert_eq!(created.len(), 2);
        assert_eq!(body["failed"].as_array().unwrap().len(), 0);
        let first = created[0]["eventType"].as_str().unwrap();
        assert!(first.starts_with("telegram_daily_check_in_"));
        assert_eq!(created[1]["reward"], 100);

        let code = body["implementationCode"].as_str().unwrap();
        assert!(code.contains("Telegraf"));
        assert!(code.contains(first));
        assert!(code.contains(BRAND));
    }

    #[tokio::test]
    async fn test_bulk_events_limits() {
        let result = BulkEventsTool
            .execute(json!({"events": []}), &context())
            .await
            .unwrap();
        assert!(result.is_error);

        let events: Vec<Value> = (0..101)
            .map(|_| json!({"eventType": "daily_checkin", "userEmail": "user@example.com"}))
            .collect();
        let result = BulkEventsTool
            .execute(json!({ "events": events }), &context())
            .await
            .unwrap();
        assert!(result.is_error);
        assert!(result.text_content().contains("maximum of 100"));
    }

    #[tokio::test]
    async fn test_bulk_events_validates_each_event() {
        let result = BulkEventsTool
            .execute(
                json!({"events": [{"eventType": "daily_checkin", "userEmail": "not-an-email"}]}),
                &context(),
            )
            .await
            .unwrap();
        assert!(result.is_error);
        assert_eq!(
            result.text_content(),
            "Error tracking bulk events: Invalid email format"
        );
    }

    #[tokio::test]
    async fn test_track_event_requires_identifier() {
        let result = TrackEventTool
            .execute(
                json!({"eventType": "daily_checkin", "userIdentifier": {}}),
                &context(),
            )
            .await
            .unwrap();
        assert!(result.is_error);
        assert_eq!(
            result.text_content(),
            "Error tracking event: Either email or platform+platformUserId must be provided"
        );
    }
}
