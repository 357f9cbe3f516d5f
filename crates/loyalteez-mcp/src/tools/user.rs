//! User tools
//!
//! Balance, eligibility and aggregated stats. These endpoints are not live
//! on every deployment; failures come back as JSON with a note on how to
//! reconstruct the answer from verified calls.

use super::{
    brand_id_property, platform_property, user_id_string_property, ToolError, ToolOutcome,
};
use crate::clients::event_handler::{EligibilityRequest, UserBalanceRequest};
use crate::server::{McpServerResult, Tool, ToolContext};
use crate::types::{ToolDefinition, ToolResult};
use crate::validation::{parse_args, validate_email, ValidationError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, instrument};

pub const MAX_HISTORY_LIMIT: u32 = 50;
const DEFAULT_HISTORY_LIMIT: u32 = 10;

const VERIFY_NOTE: &str =
    "This endpoint may need backend verification. See ENDPOINT-STATUS.md for details.";

/// How a user tool explains a failure.
struct FailureReport {
    error: &'static str,
    note: &'static str,
    suggestion: &'static str,
}

impl FailureReport {
    /// JSON error body. The note and suggestion are only added when the
    /// endpoint itself is missing.
    fn render(&self, err: ToolError) -> ToolResult {
        error!("{}: {}", self.error, err);
        let mut body = json!({
            "error": self.error,
            "message": err.to_string(),
        });
        if err.is_endpoint_gap() {
            body["note"] = json!(self.note);
            body["suggestion"] = json!(self.suggestion);
        }
        ToolResult::json_error(body)
    }
}

const BALANCE_FAILURE: FailureReport = FailureReport {
    error: "Error getting user balance",
    note: VERIFY_NOTE,
    suggestion: "The endpoint may require blockchain query or aggregation from multiple services.",
};

const ELIGIBILITY_FAILURE: FailureReport = FailureReport {
    error: "Error checking eligibility",
    note: VERIFY_NOTE,
    suggestion: "The endpoint may need to aggregate data from event configuration and user history.",
};

const STATS_FAILURE: FailureReport = FailureReport {
    error: "Error getting user stats",
    note: "This endpoint aggregates data from multiple services. See ENDPOINT-STATUS.md for details.",
    suggestion: "The endpoint may need to be implemented as a composite endpoint or multiple service calls.",
};

/// Tool to read a user's LTZ balance.
pub struct GetUserBalanceTool;

#[async_trait]
impl Tool for GetUserBalanceTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "loyalteez_get_user_balance",
            "Get a user's current LTZ balance and recent transaction history. Use this to display balance in your app or verify rewards were distributed.\n\n**Implementation Note**: LTZ balances are stored on-chain. If the API endpoint is unavailable:\n1. Get the user's wallet address via `loyalteez_resolve_user` or SDK `getUserWallet()`\n2. Query the LTZ token contract (`0x5242b6DB88A72752ac5a54cFe6A7DB8244d743c9`) using `balanceOf(address)` on Soneium Mainnet (Chain ID: 1868)\n\nSee also: loyalteez://docs/api/rest-api, loyalteez://contracts/ltz-token",
        )
        .with_category("user")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "brandId": brand_id_property(),
                "userEmail": {
                    "type": "string",
                    "format": "email",
                    "description": "User's email address"
                },
                "includeHistory": {
                    "type": "boolean",
                    "description": "Include recent transactions (default: false)"
                },
                "historyLimit": {
                    "type": "number",
                    "description": "Max transactions to return (default: 10, max: 50)"
                }
            },
            "required": ["userEmail"]
        }))
    }

    #[instrument(skip(self, args, context), fields(tool = "get_user_balance"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<ToolResult> {
        match get_user_balance(args, context).await {
            Ok(value) => Ok(ToolResult::json(value)),
            Err(e) => Ok(BALANCE_FAILURE.render(e)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetUserBalanceParams {
    brand_id: Option<String>,
    user_email: String,
    #[serde(default)]
    include_history: bool,
    history_limit: Option<i64>,
}

fn history_limit(limit: Option<i64>) -> Result<u32, ValidationError> {
    match limit {
        None => Ok(DEFAULT_HISTORY_LIMIT),
        Some(n) if (1..=i64::from(MAX_HISTORY_LIMIT)).contains(&n) => Ok(n as u32),
        Some(_) => Err(ValidationError::field(
            "historyLimit",
            "historyLimit must be between 1 and 50",
        )),
    }
}

async fn get_user_balance(args: Value, context: &ToolContext) -> ToolOutcome<Value> {
    let params: GetUserBalanceParams = parse_args(args)?;
    let brand_id = context.brand_id(params.brand_id.as_deref())?;
    let user_email = validate_email(&params.user_email)?;
    let history_limit = history_limit(params.history_limit)?;

    Ok(context
        .client()
        .get_user_balance(&UserBalanceRequest {
            brand_id,
            user_email,
            include_history: params.include_history,
            history_limit,
        })
        .await?)
}

/// Tool to check whether a user can still claim an event.
pub struct CheckEligibilityTool;

#[async_trait]
impl Tool for CheckEligibilityTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "loyalteez_check_eligibility",
            "Check if a user is eligible to receive a reward for a specific event. Returns eligibility status, cooldown info, and claim history. Use this BEFORE tracking an event to validate the user can receive the reward.\n\n**Implementation Note**: Eligibility checking requires event configuration (maxClaims, cooldown, reward) and user claim history. If the endpoint is unavailable, eligibility can be determined by:\n1. Calling `loyalteez_get_event_config` to get event settings\n2. Checking user's claim count against maxClaims\n3. Verifying cooldown period has elapsed\n\nSee also: loyalteez://docs/api/rest-api",
        )
        .with_category("user")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "brandId": brand_id_property(),
                "eventType": {
                    "type": "string",
                    "description": "Event type to check eligibility for"
                },
                "userEmail": {
                    "type": "string",
                    "format": "email",
                    "description": "User's email address"
                }
            },
            "required": ["eventType", "userEmail"]
        }))
    }

    #[instrument(skip(self, args, context), fields(tool = "check_eligibility"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<ToolResult> {
        match check_eligibility(args, context).await {
            Ok(value) => Ok(ToolResult::json(value)),
            Err(e) => Ok(ELIGIBILITY_FAILURE.render(e)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckEligibilityParams {
    brand_id: Option<String>,
    event_type: String,
    user_email: String,
}

async fn check_eligibility(args: Value, context: &ToolContext) -> ToolOutcome<Value> {
    let params: CheckEligibilityParams = parse_args(args)?;
    let brand_id = context.brand_id(params.brand_id.as_deref())?;
    let user_email = validate_email(&params.user_email)?;

    Ok(context
        .client()
        .check_eligibility(&EligibilityRequest {
            brand_id,
            event_type: params.event_type,
            user_email,
        })
        .await?)
}

/// Tool to read a user's aggregated stats.
pub struct GetUserStatsTool;

#[async_trait]
impl Tool for GetUserStatsTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "loyalteez_get_user_stats",
            "Get comprehensive stats for a single user including balance, lifetime earnings, streak, activity, and rank.\n\n**Implementation Note**: User stats aggregate data from multiple services. If the aggregation endpoint is unavailable, stats can be obtained by calling:\n- `loyalteez_get_streak_status` for streak data\n- `loyalteez_get_leaderboard` for rank and lifetime earnings\n- `loyalteez_get_user_balance` for balance\n- Platform-specific APIs for activity (messages, voice, reactions)\n\nSee also: loyalteez://docs/shared-services/leaderboard-service",
        )
        .with_category("user")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "brandId": brand_id_property(),
                "userIdentifier": user_id_string_property(),
                "platform": platform_property()
            },
            "required": ["userIdentifier", "platform"]
        }))
    }

    #[instrument(skip(self, args, context), fields(tool = "get_user_stats"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<ToolResult> {
        match get_user_stats(args, context).await {
            Ok(value) => Ok(ToolResult::json(value)),
            Err(e) => Ok(STATS_FAILURE.render(e)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetUserStatsParams {
    brand_id: Option<String>,
    user_identifier: String,
}

async fn get_user_stats(args: Value, context: &ToolContext) -> ToolOutcome<Value> {
    let params: GetUserStatsParams = parse_args(args)?;
    let brand_id = context.brand_id(params.brand_id.as_deref())?;

    Ok(context
        .client()
        .get_user_stats(&brand_id, &params.user_identifier)
        .await?)
}

/// Get all user tools.
pub fn user_tools() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(GetUserBalanceTool),
        Arc::new(CheckEligibilityTool),
        Arc::new(GetUserStatsTool),
    ]
}
