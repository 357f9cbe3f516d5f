//! Identity tools

use super::{brand_id_property, failure, ToolOutcome};
use crate::clients::pregen::PregenerateRequest;
use crate::domain::{platform_email, Platform};
use crate::server::{McpServerResult, Tool, ToolContext};
use crate::types::{ToolDefinition, ToolResult};
use crate::validation::{parse_args, ValidationError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{instrument, warn};

/// Platforms an identity can be resolved for.
pub const IDENTITY_PLATFORMS: [Platform; 7] = [
    Platform::Discord,
    Platform::Telegram,
    Platform::Twitter,
    Platform::Farcaster,
    Platform::Github,
    Platform::Google,
    Platform::Email,
];

/// Placeholder wallet for users whose wallet is created on first event.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Tool to map a platform account onto a Loyalteez wallet.
pub struct ResolveUserTool;

#[async_trait]
impl Tool for ResolveUserTool {
    fn definition(&self) -> ToolDefinition {
        let platforms: Vec<&str> = IDENTITY_PLATFORMS.iter().map(Platform::as_str).collect();
        ToolDefinition::new(
            "loyalteez_resolve_user",
            "Convert any platform identity to a Loyalteez wallet. Creates wallet if needed. Uses deterministic email pattern: {platform}_{userId}@loyalteez.app.\n\nSee also: loyalteez://docs/architecture",
        )
        .with_category("identity")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "brandId": brand_id_property(),
                "platform": {
                    "type": "string",
                    "description": "Platform: \"discord\" | \"telegram\" | \"twitter\" | \"farcaster\" | \"github\" | \"google\" | \"email\"",
                    "enum": platforms
                },
                "platformUserId": {
                    "type": "string",
                    "description": "Platform-specific user ID"
                },
                "platformUsername": {
                    "type": "string",
                    "description": "Platform username (for display)"
                }
            },
            "required": ["platform", "platformUserId"]
        }))
    }

    #[instrument(skip(self, args, context), fields(tool = "resolve_user"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<ToolResult> {
        match resolve_user(args, context).await {
            Ok(value) => Ok(ToolResult::json(value)),
            Err(e) => Ok(failure("resolving user", e)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResolveUserParams {
    brand_id: Option<String>,
    platform: Platform,
    platform_user_id: String,
    platform_username: Option<String>,
}

async fn resolve_user(args: Value, context: &ToolContext) -> ToolOutcome<Value> {
    let params: ResolveUserParams = parse_args(args)?;
    let brand_id = context.brand_id(params.brand_id.as_deref())?;
    if !IDENTITY_PLATFORMS.contains(&params.platform) {
        return Err(ValidationError::field(
            "platform",
            format!("Unsupported platform: {}", params.platform),
        )
        .into());
    }

    let loyalteez_email = platform_email(params.platform.as_str(), &params.platform_user_id);

    let (wallet_address, is_new) = if params.platform == Platform::Email {
        (ZERO_ADDRESS.to_string(), true)
    } else {
        let request = PregenerateRequest {
            brand_id,
            oauth_provider: params.platform.to_string(),
            oauth_user_id: params.platform_user_id,
            oauth_username: params.platform_username,
        };
        // The wallet is created on first event when pregeneration fails.
        match context.client().pregen().pregenerate_user(&request).await {
            Ok(wallet) => (wallet.wallet_address, wallet.created_new),
            Err(e) => {
                warn!("Wallet pregeneration failed: {}", e);
                (ZERO_ADDRESS.to_string(), true)
            }
        }
    };

    Ok(json!({
        "loyalteezEmail": loyalteez_email,
        "walletAddress": wallet_address,
        "isNew": is_new,
        "balance": 0,
    }))
}

/// Get all identity tools.
pub fn identity_tools() -> Vec<Arc<dyn Tool>> {
    vec![Arc::new(ResolveUserTool)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ServiceConfig;

    fn context() -> ToolContext {
        ToolContext::new(&ServiceConfig::default())
            .unwrap()
            .with_default_brand_id(Some(
                "0x1234567890123456789012345678901234567890".to_string(),
            ))
    }

    #[tokio::test]
    async fn test_email_platform_skips_pregeneration() {
        let result = ResolveUserTool
            .execute(
                json!({"platform": "email", "platformUserId": "jane"}),
                &context(),
            )
            .await
            .unwrap();

        let body: Value = serde_json::from_str(&result.text_content()).unwrap();
        assert_eq!(body["loyalteezEmail"], "email_jane@loyalteez.app");
        assert_eq!(body["walletAddress"], ZERO_ADDRESS);
        assert_eq!(body["isNew"], true);
        assert_eq!(body["balance"], 0);
    }

    #[tokio::test]
    async fn test_rejects_platform_without_identity() {
        let result = ResolveUserTool
            .execute(
                json!({"platform": "shopify", "platformUserId": "1"}),
                &context(),
            )
            .await
            .unwrap();
        assert!(result.is_error);
        assert_eq!(
            result.text_content(),
            "Error resolving user: Unsupported platform: shopify"
        );

        let result = ResolveUserTool
            .execute(
                json!({"platform": "myspace", "platformUserId": "1"}),
                &context(),
            )
            .await
            .unwrap();
        assert!(result.is_error);
    }
}
