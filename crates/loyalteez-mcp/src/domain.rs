//! Typed data model shared by tools and clients.
//!
//! Nothing here is persisted. These are the request shapes the tools accept
//! after validation and the values the clients put on the wire.

use crate::validation::{self, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Domain used for synthetic user emails derived from platform ids.
pub const USER_EMAIL_DOMAIN: &str = "loyalteez.app";

/// Derive the synthetic email for a platform user, e.g. `discord_42@loyalteez.app`.
pub fn platform_email(platform: &str, platform_user_id: &str) -> String {
    format!("{}_{}@{}", platform, platform_user_id, USER_EMAIL_DOMAIN)
}

/// Brand (tenant) identifier: a lowercase 20-byte hex address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BrandId(String);

impl BrandId {
    /// Validate and normalize a brand id.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        validation::validate_brand_id(input)
    }

    pub(crate) fn from_normalized(value: String) -> Self {
        Self(value)
    }

    /// The normalized address.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BrandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BrandId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A user, named either by email or by a platform account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentifier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_user_id: Option<String>,
}

impl UserIdentifier {
    /// Identifier for a real email address.
    pub fn email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Self::default()
        }
    }

    /// Identifier for a platform account.
    pub fn platform(platform: impl Into<String>, platform_user_id: impl Into<String>) -> Self {
        Self {
            email: None,
            platform: Some(platform.into()),
            platform_user_id: Some(platform_user_id.into()),
        }
    }

    /// The email the remote platform knows this user by.
    ///
    /// A real email wins over the derived platform email.
    pub fn resolved_email(&self) -> Option<String> {
        if let Some(email) = self.email.as_deref().filter(|e| !e.is_empty()) {
            return Some(email.to_string());
        }
        match (self.platform.as_deref(), self.platform_user_id.as_deref()) {
            (Some(platform), Some(id)) if !platform.is_empty() && !id.is_empty() => {
                Some(platform_email(platform, id))
            }
            _ => None,
        }
    }
}

/// How an event is detected by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionKind {
    Webhook,
    DiscordInteraction,
    UrlPattern,
    FormSubmission,
    CssSelector,
}

/// A detection method with its free-form configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionMethod {
    pub method: DetectionKind,
    pub config: serde_json::Map<String, serde_json::Value>,
}

/// A validated reward event definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDefinition {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,

    pub description: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    pub default_reward: u64,

    pub max_claims_per_user: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooldown_hours: Option<u64>,

    pub requires_email: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection_methods: Option<Vec<DetectionMethod>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Monthly budget used to scale generated rewards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub monthly_ltz: u64,
    pub avg_reward: u64,
}

impl Default for Budget {
    fn default() -> Self {
        Self {
            monthly_ltz: 50_000,
            avg_reward: 25,
        }
    }
}

/// Description of the application a loyalty program is designed for.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramContext {
    pub app_type: String,
    pub goals: Vec<String>,
    pub platforms: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<Budget>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_events: Option<Vec<String>>,
}

impl ProgramContext {
    pub fn has_platform(&self, platform: &str) -> bool {
        self.platforms.iter().any(|p| p.eq_ignore_ascii_case(platform))
    }

    /// Whether any goal mentions `needle` (case-insensitive substring).
    pub fn has_goal(&self, needle: &str) -> bool {
        let needle = needle.to_ascii_lowercase();
        self.goals
            .iter()
            .any(|g| g.to_ascii_lowercase().contains(&needle))
    }

    pub fn budget_or_default(&self) -> Budget {
        self.budget.unwrap_or_default()
    }
}

/// Platforms a user or integration can live on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Discord,
    Telegram,
    Twitter,
    Farcaster,
    Github,
    Google,
    Email,
    Web,
    Shopify,
    Gaming,
}

impl Platform {
    pub const ALL: [Platform; 10] = [
        Platform::Discord,
        Platform::Telegram,
        Platform::Twitter,
        Platform::Farcaster,
        Platform::Github,
        Platform::Google,
        Platform::Email,
        Platform::Web,
        Platform::Shopify,
        Platform::Gaming,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Discord => "discord",
            Platform::Telegram => "telegram",
            Platform::Twitter => "twitter",
            Platform::Farcaster => "farcaster",
            Platform::Github => "github",
            Platform::Google => "google",
            Platform::Email => "email",
            Platform::Web => "web",
            Platform::Shopify => "shopify",
            Platform::Gaming => "gaming",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leaderboard time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
    #[default]
    AllTime,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
            Period::AllTime => "all_time",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
