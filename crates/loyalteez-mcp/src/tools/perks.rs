//! Perk tools
//!
//! Perks are NFT rewards users buy with LTZ. Listing, eligibility and
//! redemption all go to the perks service.

use super::{
    brand_id_property, failure, platform_property, user_id_string_property, ToolOutcome,
};
use crate::clients::services::{PerkCategory, PerkRequest, PerksQuery};
use crate::server::{McpServerResult, Tool, ToolContext};
use crate::types::{ToolDefinition, ToolResult};
use crate::validation::parse_args;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::instrument;

/// Tool to list a brand's perks.
pub struct ListPerksTool;

#[async_trait]
impl Tool for ListPerksTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "loyalteez_list_perks",
            "Get all available perks (NFT rewards) that users can claim with their LTZ balance. Returns perk details, pricing, and availability.\n\nSee also: loyalteez://docs/shared-services/perks-service",
        )
        .with_category("perks")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "brandId": brand_id_property(),
                "activeOnly": {
                    "type": "boolean",
                    "description": "Only return active perks (default: true)"
                },
                "category": {
                    "type": "string",
                    "enum": ["all", "discount", "exclusive", "merch", "digital", "experience", "general"],
                    "description": "Filter perks by category"
                },
                "userAddress": {
                    "type": "string",
                    "description": "Include user's eligibility and claim count for each perk"
                }
            },
            "required": []
        }))
    }

    #[instrument(skip(self, args, context), fields(tool = "list_perks"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<ToolResult> {
        match list_perks(args, context).await {
            Ok(value) => Ok(ToolResult::json(value)),
            Err(e) => Ok(failure("listing perks", e)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListPerksParams {
    brand_id: Option<String>,
    #[serde(default = "default_active_only")]
    active_only: bool,
    category: Option<PerkCategory>,
    user_address: Option<String>,
}

fn default_active_only() -> bool {
    true
}

async fn list_perks(args: Value, context: &ToolContext) -> ToolOutcome<Value> {
    let params: ListPerksParams = parse_args(args)?;
    let brand_id = context.brand_id(params.brand_id.as_deref())?;

    Ok(context
        .client()
        .services()
        .get_perks(&PerksQuery {
            brand_id,
            active_only: Some(params.active_only),
            category: params.category,
            user_address: params.user_address,
        })
        .await?)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PerkParams {
    brand_id: Option<String>,
    user_identifier: String,
    platform: String,
    perk_id: String,
}

impl PerkParams {
    fn into_request(self, context: &ToolContext) -> ToolOutcome<PerkRequest> {
        Ok(PerkRequest {
            brand_id: context.brand_id(self.brand_id.as_deref())?,
            user_identifier: self.user_identifier,
            platform: self.platform,
            perk_id: self.perk_id,
        })
    }
}

fn perk_schema(perk_description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "brandId": brand_id_property(),
            "userIdentifier": user_id_string_property(),
            "platform": platform_property(),
            "perkId": {
                "type": "string",
                "description": perk_description
            }
        },
        "required": ["userIdentifier", "platform", "perkId"]
    })
}

/// Tool to check whether a user can afford and claim a perk.
pub struct CheckPerkEligibilityTool;

#[async_trait]
impl Tool for CheckPerkEligibilityTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "loyalteez_check_perk_eligibility",
            "Check if user can claim a specific perk. Returns eligibility status, balance check, cost, and missing amount.\n\nSee also: loyalteez://docs/shared-services/perks-service",
        )
        .with_category("perks")
        .with_schema(perk_schema("UUID of the perk to check"))
    }

    #[instrument(skip(self, args, context), fields(tool = "check_perk_eligibility"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<ToolResult> {
        match check_perk_eligibility(args, context).await {
            Ok(value) => Ok(ToolResult::json(value)),
            Err(e) => Ok(failure("checking perk eligibility", e)),
        }
    }
}

async fn check_perk_eligibility(args: Value, context: &ToolContext) -> ToolOutcome<Value> {
    let request = parse_args::<PerkParams>(args)?.into_request(context)?;
    Ok(context
        .client()
        .services()
        .check_perk_eligibility(&request)
        .await?)
}

/// Tool to redeem a perk.
pub struct RedeemPerkTool;

#[async_trait]
impl Tool for RedeemPerkTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "loyalteez_redeem_perk",
            "Redeem a perk for a user. Creates a redemption record and returns confirmation code. Note: You must separately deduct LTZ from the user's balance.\n\nSee also: loyalteez://docs/shared-services/perks-service",
        )
        .with_category("perks")
        .with_schema(perk_schema("UUID of the perk to redeem"))
    }

    #[instrument(skip(self, args, context), fields(tool = "redeem_perk"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<ToolResult> {
        match redeem_perk(args, context).await {
            Ok(value) => Ok(ToolResult::json(value)),
            Err(e) => Ok(failure("redeeming perk", e)),
        }
    }
}

async fn redeem_perk(args: Value, context: &ToolContext) -> ToolOutcome<Value> {
    let request = parse_args::<PerkParams>(args)?.into_request(context)?;
    Ok(context.client().services().redeem_perk(&request).await?)
}

/// Get all perk tools.
pub fn perk_tools() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(ListPerksTool),
        Arc::new(CheckPerkEligibilityTool),
        Arc::new(RedeemPerkTool),
    ]
}
