//! Loyalteez MCP tools
//!
//! One module per tool family. Every tool validates its arguments, resolves
//! the brand through the [`ToolContext`](crate::server::ToolContext), makes
//! at most one call to the Loyalteez APIs and relays the answer as JSON.
//! Failures never escape a tool: they become `isError` results.

pub mod achievements;
pub mod diagnostics;
pub mod drops;
pub mod engagement;
pub mod events;
pub mod identity;
pub mod integrations;
pub mod perks;
pub mod program_design;
pub mod transactions;
pub mod user;
pub mod webhooks;

pub use achievements::achievement_tools;
pub use diagnostics::diagnostic_tools;
pub use drops::drop_tools;
pub use engagement::engagement_tools;
pub use events::event_tools;
pub use identity::identity_tools;
pub use integrations::integration_tools;
pub use perks::perk_tools;
pub use program_design::program_design_tools;
pub use transactions::transaction_tools;
pub use user::user_tools;
pub use webhooks::webhook_tools;

use crate::clients::ClientError;
use crate::server::Tool;
use crate::types::ToolResult;
use crate::validation::ValidationError;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

/// Why a tool call failed.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The arguments were rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The remote call failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// A response could not be serialized back to JSON.
    #[error("Failed to serialize response: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ToolError {
    /// Whether the remote side lacks the endpoint (guidance or HTTP 404).
    pub fn is_endpoint_gap(&self) -> bool {
        match self {
            ToolError::Client(e) => e.is_unsupported() || e.status() == Some(404),
            _ => false,
        }
    }
}

/// Result type for tool bodies.
pub type ToolOutcome<T> = Result<T, ToolError>;

/// Render a failure as `Error <action>: <message>`.
pub(crate) fn failure(action: &str, err: ToolError) -> ToolResult {
    error!("Error {}: {}", action, err);
    ToolResult::error(format!("Error {}: {}", action, err))
}

/// Copy selected response fields under new names. Fields the response
/// lacks are left out.
pub(crate) fn pick(response: &Value, fields: &[(&str, &str)]) -> Map<String, Value> {
    fields
        .iter()
        .filter_map(|(from, to)| response.get(*from).map(|v| ((*to).to_string(), v.clone())))
        .collect()
}

/// Schema for the optional `brandId` argument.
pub(crate) fn brand_id_property() -> serde_json::Value {
    serde_json::json!({
        "type": "string",
        "description": "Your brand wallet address. If not provided, uses LOYALTEEZ_BRAND_ID environment variable."
    })
}

/// Schema for a `userIdentifier` object argument.
pub(crate) fn user_identifier_property() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "description": "User identification",
        "properties": {
            "email": {
                "type": "string",
                "description": "User email address"
            },
            "platform": {
                "type": "string",
                "description": "Platform: \"discord\" | \"telegram\" | etc."
            },
            "platformUserId": {
                "type": "string",
                "description": "Platform-specific user ID"
            }
        }
    })
}

/// Schema for a `userIdentifier` passed as a single string.
pub(crate) fn user_id_string_property() -> serde_json::Value {
    serde_json::json!({
        "type": "string",
        "description": "User identifier (platform_userId@loyalteez.app or email)"
    })
}

pub(crate) fn platform_property() -> serde_json::Value {
    serde_json::json!({
        "type": "string",
        "description": "Platform: \"discord\" | \"telegram\" | \"web\" | etc."
    })
}

/// Milliseconds since the Unix epoch, used to stamp generated identifiers.
pub(crate) fn unix_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Get all available MCP tools.
///
/// # Example
///
/// ```rust,no_run
/// use loyalteez_mcp::tools::all_tools;
///
/// let tools = all_tools();
/// println!("Available tools: {}", tools.len());
/// ```
pub fn all_tools() -> Vec<Arc<dyn Tool>> {
    let mut tools = Vec::new();

    tools.extend(event_tools());
    tools.extend(identity_tools());
    tools.extend(engagement_tools());
    tools.extend(user_tools());
    tools.extend(transaction_tools());
    tools.extend(drop_tools());
    tools.extend(integration_tools());
    tools.extend(perk_tools());
    tools.extend(achievement_tools());
    tools.extend(program_design_tools());
    tools.extend(diagnostic_tools());
    tools.extend(webhook_tools());

    tools
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_tools_count() {
        let tools = all_tools();
        assert_eq!(tools.len(), 29, "Expected 29 total tools");
    }

    #[test]
    fn test_all_tools_unique_names() {
        let tools = all_tools();
        let mut names = std::collections::HashSet::new();

        for tool in tools {
            let def = tool.definition();
            assert!(
                names.insert(def.name.clone()),
                "Duplicate tool name: {}",
                def.name
            );
        }
    }

    #[test]
    fn test_all_tools_prefixed_and_categorized() {
        for tool in all_tools() {
            let def = tool.definition();
            assert!(def.name.starts_with("loyalteez_"), "{}", def.name);
            assert!(def.category.is_some(), "{} has no category", def.name);
            assert_eq!(def.input_schema["type"], "object", "{}", def.name);
        }
    }

    #[test]
    fn test_tool_categories() {
        assert_eq!(event_tools().len(), 5, "Expected 5 event tools");
        assert_eq!(identity_tools().len(), 1);
        assert_eq!(engagement_tools().len(), 7, "Expected 7 engagement tools");
        assert_eq!(user_tools().len(), 3);
        assert_eq!(transaction_tools().len(), 1);
        assert_eq!(drop_tools().len(), 2);
        assert_eq!(integration_tools().len(), 1);
        assert_eq!(perk_tools().len(), 3);
        assert_eq!(achievement_tools().len(), 2);
        assert_eq!(program_design_tools().len(), 1);
        assert_eq!(diagnostic_tools().len(), 1);
        assert_eq!(webhook_tools().len(), 2);
    }

    #[test]
    fn test_failure_prefixes_action() {
        let result = failure(
            "tracking event",
            ToolError::Validation(ValidationError::UserIdentifier),
        );
        assert!(result.is_error);
        assert_eq!(
            result.text_content(),
            "Error tracking event: Either email or platform+platformUserId must be provided"
        );
    }

    #[test]
    fn test_endpoint_gap() {
        let missing = ToolError::Client(ClientError::Api {
            status: 404,
            message: "Not found".to_string(),
        });
        assert!(missing.is_endpoint_gap());

        let guidance = ToolError::Client(ClientError::Unsupported {
            guidance: "use the contract".to_string(),
        });
        assert!(guidance.is_endpoint_gap());

        let conflict = ToolError::Client(ClientError::Api {
            status: 409,
            message: "Duplicate event".to_string(),
        });
        assert!(!conflict.is_endpoint_gap());
    }

    #[test]
    fn test_pick_renames_present_fields() {
        let response = serde_json::json!({"success": true, "rewardAmount": 12.5, "extra": 1});
        let picked = pick(&response, &[("success", "success"), ("rewardAmount", "reward"), ("eventId", "eventId")]);
        assert_eq!(
            Value::Object(picked),
            serde_json::json!({"success": true, "reward": 12.5})
        );
    }
}
