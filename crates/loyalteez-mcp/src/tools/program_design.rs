//! Program design tool
//!
//! Turns a description of an app or community into an illustrative loyalty
//! program: events, tiers, streak settings and starter code per platform.
//! The design is returned to the caller and never submitted anywhere.

use super::{brand_id_property, failure, ToolOutcome};
use crate::codegen::program::{self, ProgramTemplate};
use crate::domain::{
    Budget, DetectionKind, DetectionMethod, EventDefinition, ProgramContext,
};
use crate::server::{McpServerResult, Tool, ToolContext};
use crate::types::{ToolDefinition, ToolResult};
use crate::validation::{parse_args, validate_program_context};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Number of documentation pages suggested with a design.
pub const RELEVANT_DOCS: usize = 5;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tier {
    pub name: &'static str,
    pub min_points: u64,
    pub benefits: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StreakMultiplier {
    pub days: u32,
    pub multiplier: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakConfig {
    pub base_reward: u64,
    pub multipliers: Vec<StreakMultiplier>,
    pub grace_period: u32,
}

/// A generated program.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramDesign {
    pub name: String,
    pub philosophy: String,
    pub events: Vec<EventDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiers: Option<Vec<Tier>>,
    pub streak_config: StreakConfig,
    pub estimated_budget: Budget,
}

/// Generated source per platform.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Implementation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discord: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web: Option<String>,
    pub webhooks: String,
}

fn reward(budget: &Budget, factor: f64) -> u64 {
    (budget.avg_reward as f64 * factor).floor() as u64
}

fn event(
    name: &str,
    description: &str,
    category: &str,
    default_reward: u64,
    max_claims_per_user: u64,
    cooldown_hours: u64,
    requires_email: bool,
) -> EventDefinition {
    EventDefinition {
        name: name.to_string(),
        event_type: None,
        description: description.to_string(),
        category: Some(category.to_string()),
        default_reward,
        max_claims_per_user,
        cooldown_hours: Some(cooldown_hours),
        requires_email,
        detection_methods: None,
        metadata: None,
    }
}

fn design_events(context: &ProgramContext, budget: &Budget) -> Vec<EventDefinition> {
    let app_type = context.app_type.to_lowercase();
    let mut events = Vec::new();

    if context.has_goal("engagement") {
        events.push(event(
            "Daily Check-in",
            "Daily check-in reward",
            "engagement",
            reward(budget, 0.4),
            1,
            24,
            true,
        ));
    }

    if context.has_platform("discord") && context.has_goal("quality") {
        let mut config = Map::new();
        config.insert("command".to_string(), json!("/reward helpful_answer"));
        let mut helpful = event(
            "Helpful Answer",
            "Recognized for helping another member",
            "quality",
            reward(budget, 2.0),
            100,
            1,
            false,
        );
        helpful.detection_methods = Some(vec![DetectionMethod {
            method: DetectionKind::DiscordInteraction,
            config,
        }]);
        events.push(helpful);
    }

    if context.has_platform("telegram") {
        events.push(event(
            "Daily Check-in",
            "Daily /checkin command",
            "engagement",
            reward(budget, 0.4),
            1,
            24,
            false,
        ));
    }

    if (app_type.contains("ecommerce") || context.has_platform("shopify"))
        && context.has_goal("purchase")
    {
        events.push(event(
            "First Purchase",
            "Customer's first order",
            "commerce",
            reward(budget, 8.0),
            1,
            0,
            true,
        ));
    }

    if app_type.contains("gaming") {
        events.push(event(
            "Daily Quest",
            "Completed daily quest",
            "engagement",
            reward(budget, 0.6),
            3,
            24,
            false,
        ));
    }

    events
}

fn program_name(context: &ProgramContext) -> String {
    if let Some(audience) = context.audience.as_deref().filter(|a| !a.is_empty()) {
        let mut chars = audience.chars();
        let capitalized: String = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        return format!("{} Loyalty Program", capitalized);
    }

    let app_type = context.app_type.to_lowercase();
    let name = if app_type.contains("discord") {
        "Community Loyalty Program"
    } else if app_type.contains("telegram") {
        "Telegram Rewards Program"
    } else if app_type.contains("ecommerce") {
        "Customer Loyalty Program"
    } else if app_type.contains("gaming") {
        "Gaming Rewards Program"
    } else {
        "Loyalty Program"
    };
    name.to_string()
}

fn philosophy(context: &ProgramContext) -> String {
    let mut parts = Vec::new();
    if context.has_goal("quality") {
        parts.push("Rewarding quality contributions and helpful behavior");
    }
    if context.has_goal("engagement") {
        parts.push("Encouraging daily engagement and participation");
    }
    if context.has_goal("purchase") {
        parts.push("Incentivizing purchases and customer loyalty");
    }

    if parts.is_empty() {
        "Building a loyal and engaged community".to_string()
    } else {
        parts.join(". ")
    }
}

fn tiers(context: &ProgramContext) -> Option<Vec<Tier>> {
    if !context.has_goal("tier") && !context.has_goal("progression") {
        return None;
    }
    Some(vec![
        Tier {
            name: "Bronze",
            min_points: 0,
            benefits: vec!["Access to basic perks", "Entry-level rewards"],
        },
        Tier {
            name: "Silver",
            min_points: 1000,
            benefits: vec!["Exclusive perks", "Priority support", "Bonus multipliers"],
        },
        Tier {
            name: "Gold",
            min_points: 5000,
            benefits: vec!["Premium perks", "VIP access", "Highest multipliers"],
        },
    ])
}

fn streak_config(budget: &Budget) -> StreakConfig {
    StreakConfig {
        base_reward: reward(budget, 0.4),
        multipliers: vec![
            StreakMultiplier { days: 7, multiplier: 1.25 },
            StreakMultiplier { days: 14, multiplier: 1.5 },
            StreakMultiplier { days: 30, multiplier: 2.0 },
        ],
        grace_period: 1,
    }
}

/// Apply the design rules to a validated context.
pub fn design(context: &ProgramContext) -> ProgramDesign {
    let budget = context.budget_or_default();
    ProgramDesign {
        name: program_name(context),
        philosophy: philosophy(context),
        events: design_events(context, &budget),
        tiers: tiers(context),
        streak_config: streak_config(&budget),
        estimated_budget: budget,
    }
}

/// Starter code for every platform the context targets.
pub fn implementation(
    context: &ProgramContext,
    design: &ProgramDesign,
    endpoint: &str,
) -> Implementation {
    let template = ProgramTemplate {
        name: &design.name,
        events: &design.events,
        endpoint,
    };

    Implementation {
        discord: context
            .has_platform("discord")
            .then(|| program::discord_bot(&template)),
        telegram: context
            .has_platform("telegram")
            .then(|| program::telegram_bot(&template)),
        web: (context.has_platform("web") || context.has_platform("shopify"))
            .then(|| program::web_sdk(&template)),
        webhooks: program::webhook_handler(&template),
    }
}

/// Tool to design a complete loyalty program.
pub struct DesignProgramTool;

#[async_trait]
impl Tool for DesignProgramTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "loyalteez_design_program",
            "Design a complete loyalty program from context. AI analyzes your app/community and generates optimal event structure, tiers, streaks, and implementation code.\n\nUses documentation context to generate platform-specific implementations and best practices.\n\nSee also: \n- loyalteez://docs/architecture\n- loyalteez://docs/integrations/discord\n- loyalteez://docs/integrations/telegram\n- loyalteez://docs/guides/custom-events",
        )
        .with_category("program-design")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "brandId": brand_id_property(),
                "context": {
                    "type": "object",
                    "description": "Program context and requirements",
                    "properties": {
                        "appType": {
                            "type": "string",
                            "description": "Application type: \"discord_community\" | \"telegram_group\" | \"ecommerce\" | \"gaming\" | \"saas\""
                        },
                        "goals": {
                            "type": "array",
                            "description": "Program goals: [\"increase_engagement\", \"drive_purchases\", \"reward_quality\", etc.]",
                            "items": { "type": "string" }
                        },
                        "platforms": {
                            "type": "array",
                            "description": "Target platforms: [\"discord\", \"telegram\", \"web\", etc.]",
                            "items": { "type": "string" }
                        },
                        "budget": {
                            "type": "object",
                            "description": "Budget constraints",
                            "properties": {
                                "monthly_ltz": { "type": "number" },
                                "avg_reward": { "type": "number" }
                            }
                        },
                        "audience": {
                            "type": "string",
                            "description": "Target audience: \"developers\" | \"gamers\" | \"shoppers\" | etc."
                        },
                        "existingEvents": {
                            "type": "array",
                            "description": "Events you already have (optional)",
                            "items": { "type": "string" }
                        }
                    },
                    "required": ["appType", "goals", "platforms"]
                }
            },
            "required": ["context"]
        }))
    }

    #[instrument(skip(self, args, context), fields(tool = "design_program"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<ToolResult> {
        match design_program(args, context).await {
            Ok(value) => Ok(ToolResult::json(value)),
            Err(e) => Ok(failure("designing program", e)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DesignProgramParams {
    brand_id: Option<String>,
    context: Value,
}

async fn design_program(args: Value, context: &ToolContext) -> ToolOutcome<Value> {
    let params: DesignProgramParams = parse_args(args)?;
    context.brand_id(params.brand_id.as_deref())?;
    let program_context = validate_program_context(params.context)?;

    let design = design(&program_context);
    debug!("Designed {} with {} events", design.name, design.events.len());
    let implementation = implementation(
        &program_context,
        &design,
        &context.client().event_handler().manual_event_url(),
    );

    let relevant: Vec<Value> = context
        .docs()
        .search(&program_context.app_type)
        .await
        .into_iter()
        .take(RELEVANT_DOCS)
        .map(|doc| json!({ "uri": doc.uri, "title": doc.title }))
        .collect();

    Ok(json!({
        "program": design,
        "implementation": implementation,
        "documentation": { "relevant": relevant },
    }))
}

/// Get all program design tools.
pub fn program_design_tools() -> Vec<Arc<dyn Tool>> {
    vec![Arc::new(DesignProgramTool)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program_context(app_type: &str, goals: &[&str], platforms: &[&str]) -> ProgramContext {
        ProgramContext {
            app_type: app_type.to_string(),
            goals: goals.iter().map(|g| g.to_string()).collect(),
            platforms: platforms.iter().map(|p| p.to_string()).collect(),
            budget: None,
            audience: None,
            existing_events: None,
        }
    }

    #[test]
    fn test_discord_community_design() {
        let context = program_context(
            "discord_community",
            &["increase_engagement", "reward_quality"],
            &["discord"],
        );
        let design = design(&context);

        assert_eq!(design.name, "Community Loyalty Program");
        assert_eq!(
            design.philosophy,
            "Rewarding quality contributions and helpful behavior. Encouraging daily engagement and participation"
        );
        let names: Vec<&str> = design.events.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Daily Check-in", "Helpful Answer"]);
        assert_eq!(design.events[0].default_reward, 10);
        assert_eq!(design.events[1].default_reward, 50);
        assert_eq!(
            design.events[1].detection_methods.as_ref().map(|m| m[0].method),
            Some(DetectionKind::DiscordInteraction)
        );
        assert!(design.tiers.is_none());
        assert_eq!(design.streak_config.base_reward, 10);
        assert_eq!(design.estimated_budget, Budget::default());
    }

    #[test]
    fn test_rewards_scale_with_budget() {
        let mut context = program_context("ecommerce", &["drive_purchases"], &["shopify"]);
        context.budget = Some(Budget {
            monthly_ltz: 100_000,
            avg_reward: 33,
        });
        let design = design(&context);

        assert_eq!(design.name, "Customer Loyalty Program");
        assert_eq!(design.events.len(), 1);
        assert_eq!(design.events[0].name, "First Purchase");
        assert_eq!(design.events[0].default_reward, 264);
        assert_eq!(design.streak_config.base_reward, 13);
        assert_eq!(design.philosophy, "Incentivizing purchases and customer loyalty");
    }

    #[test]
    fn test_gaming_with_tiers_and_audience() {
        let mut context = program_context("gaming", &["progression"], &["web"]);
        context.audience = Some("gamers".to_string());
        let design = design(&context);

        assert_eq!(design.name, "Gamers Loyalty Program");
        assert_eq!(design.events[0].name, "Daily Quest");
        assert_eq!(design.events[0].default_reward, 15);
        let tiers = design.tiers.as_ref().unwrap();
        assert_eq!(tiers.len(), 3);
        assert_eq!(tiers[2].min_points, 5000);
        assert_eq!(design.philosophy, "Building a loyal and engaged community");
    }

    #[test]
    fn test_implementation_follows_platforms() {
        let context = program_context("discord_community", &["engagement"], &["discord", "web"]);
        let design = design(&context);
        let code = implementation(&context, &design, "https://api.loyalteez.app/loyalteez-api/manual-event");

        assert!(code.discord.as_deref().unwrap().contains("interface"));
        assert!(code.telegram.is_none());
        assert!(code.web.as_deref().unwrap().contains("LoyalteezAutomation.init"));
        assert!(code.webhooks.contains("verifyWebhookSignature"));

        let wire = serde_json::to_value(&code).unwrap();
        assert!(wire.get("telegram").is_none());
    }

    #[test]
    fn test_design_serializes_camel_case() {
        let context = program_context("saas", &["tiers"], &["web"]);
        let wire = serde_json::to_value(design(&context)).unwrap();
        assert_eq!(wire["streakConfig"]["gracePeriod"], 1);
        assert_eq!(wire["streakConfig"]["multipliers"][2]["days"], 30);
        assert_eq!(wire["estimatedBudget"]["monthly_ltz"], 50000);
        assert_eq!(wire["tiers"][1]["minPoints"], 1000);
        assert_eq!(wire["events"], json!([]));
    }
}
