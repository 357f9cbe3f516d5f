//! Input validation.
//!
//! Every validator takes loosely typed input and either returns the
//! normalized value or a [`ValidationError`] naming the violated constraint.
//! There is no I/O here.

use crate::domain::{
    BrandId, Budget, DetectionMethod, EventDefinition, ProgramContext, UserIdentifier,
};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::LazyLock;
use thiserror::Error;

pub const MAX_EVENT_TYPE_LEN: usize = 50;
pub const MAX_EMAIL_LEN: usize = 254;

static BRAND_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[a-fA-F0-9]{40}$").expect("valid brand id regex"));
static EVENT_TYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("valid event type regex"));
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z0-9_'+\-.]*[a-z0-9_+\-]@([a-z0-9][a-z0-9\-]*\.)+[a-z]{2,}$")
        .expect("valid email regex")
});

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Malformed brand id.
    #[error("Brand ID must be a valid Ethereum address (42 characters, starting with 0x)")]
    BrandId,

    /// A brand id was supplied by the caller but is malformed.
    #[error(
        "Invalid brandId provided: {0}. BrandId must be a valid Ethereum address (42 characters, starting with 0x). If not providing brandId, ensure LOYALTEEZ_BRAND_ID environment variable is set."
    )]
    InvalidBrandIdInput(String),

    /// The configured default brand id is malformed.
    #[error(
        "Invalid LOYALTEEZ_BRAND_ID environment variable: {0}. BrandId must be a valid Ethereum address (42 characters, starting with 0x)."
    )]
    InvalidDefaultBrandId(String),

    /// Neither the caller nor the configuration named a brand.
    #[error(
        "BrandId is required but not provided. Either:\n  1. Provide brandId as a tool parameter, or\n  2. Set LOYALTEEZ_BRAND_ID environment variable\n\nExample: export LOYALTEEZ_BRAND_ID=0x47511fc1c6664c9598974cb112965f8b198e0c725e"
    )]
    BrandIdRequired,

    /// Malformed event type.
    #[error("{0}")]
    EventType(&'static str),

    /// Malformed email.
    #[error("{0}")]
    Email(&'static str),

    /// Neither an email nor a complete platform account.
    #[error("Either email or platform+platformUserId must be provided")]
    UserIdentifier,

    /// A field outside its bounds.
    #[error("{message}")]
    Field {
        /// Offending field.
        field: &'static str,
        /// Constraint description.
        message: String,
    },

    /// Arguments that do not have the expected shape at all.
    #[error("Invalid arguments: {0}")]
    Arguments(String),
}

impl ValidationError {
    pub(crate) fn field(field: &'static str, message: impl Into<String>) -> Self {
        Self::Field {
            field,
            message: message.into(),
        }
    }
}

/// Deserialize tool arguments into their params struct.
pub fn parse_args<T: DeserializeOwned>(args: serde_json::Value) -> Result<T, ValidationError> {
    serde_json::from_value(args).map_err(|e| ValidationError::Arguments(e.to_string()))
}

/// Validate a brand id, returning it lowercased.
pub fn validate_brand_id(input: &str) -> Result<BrandId, ValidationError> {
    if !BRAND_ID_RE.is_match(input) {
        return Err(ValidationError::BrandId);
    }
    Ok(BrandId::from_normalized(input.to_ascii_lowercase()))
}

pub fn validate_event_type(input: &str) -> Result<String, ValidationError> {
    if !EVENT_TYPE_RE.is_match(input) {
        return Err(ValidationError::EventType(
            "Event type must contain only alphanumeric characters and underscores",
        ));
    }
    if input.chars().count() > MAX_EVENT_TYPE_LEN {
        return Err(ValidationError::EventType(
            "Event type must be 50 characters or less",
        ));
    }
    Ok(input.to_string())
}

pub fn validate_email(input: &str) -> Result<String, ValidationError> {
    if input.starts_with('.') || input.contains("..") || !EMAIL_RE.is_match(input) {
        return Err(ValidationError::Email("Invalid email format"));
    }
    if input.chars().count() > MAX_EMAIL_LEN {
        return Err(ValidationError::Email(
            "Email must be 254 characters or less",
        ));
    }
    Ok(input.to_string())
}

/// Validate a user identifier.
///
/// A present email must be well formed. The identifier must carry either an
/// email or both `platform` and `platformUserId`. The supplied fields are
/// returned untouched.
pub fn validate_user_identifier(
    identifier: UserIdentifier,
) -> Result<UserIdentifier, ValidationError> {
    if let Some(email) = identifier.email.as_deref() {
        validate_email(email)?;
    }
    let has_email = identifier.email.as_deref().is_some_and(|e| !e.is_empty());
    let has_platform = identifier.platform.as_deref().is_some_and(|p| !p.is_empty())
        && identifier
            .platform_user_id
            .as_deref()
            .is_some_and(|id| !id.is_empty());
    if !has_email && !has_platform {
        return Err(ValidationError::UserIdentifier);
    }
    Ok(identifier)
}

/// Require a strictly positive amount.
pub fn validate_positive(
    value: &serde_json::Number,
    field: &'static str,
) -> Result<(), ValidationError> {
    match value.as_f64() {
        Some(v) if v > 0.0 => Ok(()),
        _ => Err(ValidationError::field(
            field,
            format!("{} must be a positive number", field),
        )),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEventDefinition {
    name: String,
    event_type: Option<String>,
    description: String,
    category: Option<String>,
    default_reward: f64,
    max_claims_per_user: f64,
    cooldown_hours: Option<f64>,
    requires_email: Option<bool>,
    detection_methods: Option<Vec<DetectionMethod>>,
    metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

fn whole(value: f64) -> Option<u64> {
    (value.is_finite() && value.fract() == 0.0 && value >= 0.0).then_some(value as u64)
}

fn positive_int(
    value: f64,
    field: &'static str,
    message: &'static str,
) -> Result<u64, ValidationError> {
    match whole(value) {
        Some(n) if n > 0 => Ok(n),
        _ => Err(ValidationError::field(field, message)),
    }
}

pub fn validate_event_definition(
    input: serde_json::Value,
) -> Result<EventDefinition, ValidationError> {
    let raw: RawEventDefinition = parse_args(input)?;

    if raw.name.chars().count() < 3 {
        return Err(ValidationError::field(
            "name",
            "Event name must be at least 3 characters",
        ));
    }
    if raw.description.chars().count() < 10 {
        return Err(ValidationError::field(
            "description",
            "Description must be at least 10 characters",
        ));
    }
    let event_type = raw
        .event_type
        .as_deref()
        .map(validate_event_type)
        .transpose()?;
    let default_reward = positive_int(
        raw.default_reward,
        "defaultReward",
        "Reward must be a positive integer",
    )?;
    let max_claims_per_user = positive_int(
        raw.max_claims_per_user,
        "maxClaimsPerUser",
        "Max claims must be a positive integer",
    )?;
    let cooldown_hours = raw
        .cooldown_hours
        .map(|h| {
            whole(h).ok_or_else(|| {
                ValidationError::field("cooldownHours", "Cooldown must be a non-negative integer")
            })
        })
        .transpose()?;

    Ok(EventDefinition {
        name: raw.name,
        event_type,
        description: raw.description,
        category: raw.category,
        default_reward,
        max_claims_per_user,
        cooldown_hours,
        requires_email: raw.requires_email.unwrap_or(true),
        detection_methods: raw.detection_methods,
        metadata: raw.metadata,
    })
}

#[derive(Debug, Deserialize)]
struct RawBudget {
    monthly_ltz: f64,
    avg_reward: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProgramContext {
    app_type: String,
    goals: Vec<String>,
    platforms: Vec<String>,
    budget: Option<RawBudget>,
    audience: Option<String>,
    existing_events: Option<Vec<String>>,
}

pub fn validate_program_context(
    input: serde_json::Value,
) -> Result<ProgramContext, ValidationError> {
    let raw: RawProgramContext = parse_args(input)?;

    if raw.goals.is_empty() {
        return Err(ValidationError::field(
            "goals",
            "At least one goal must be specified",
        ));
    }
    if raw.platforms.is_empty() {
        return Err(ValidationError::field(
            "platforms",
            "At least one platform must be specified",
        ));
    }
    let budget = match raw.budget {
        Some(b) => Some(Budget {
            monthly_ltz: positive_int(
                b.monthly_ltz,
                "budget.monthly_ltz",
                "Monthly budget must be a positive integer",
            )?,
            avg_reward: positive_int(
                b.avg_reward,
                "budget.avg_reward",
                "Average reward must be a positive integer",
            )?,
        }),
        None => None,
    };

    Ok(ProgramContext {
        app_type: raw.app_type,
        goals: raw.goals,
        platforms: raw.platforms,
        budget,
        audience: raw.audience,
        existing_events: raw.existing_events,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_brand_id_lowercases() {
        let brand = validate_brand_id("0x1234567890ABCDEF1234567890abcdef12345678").unwrap();
        assert_eq!(brand.as_str(), "0x1234567890abcdef1234567890abcdef12345678");
    }

    #[test]
    fn test_validate_brand_id_rejects_malformed() {
        for bad in [
            "",
            "invalid",
            "0x123",
            "1234567890123456789012345678901234567890",
            "0x123456789012345678901234567890123456789g",
            "0x12345678901234567890123456789012345678901",
        ] {
            assert_eq!(validate_brand_id(bad), Err(ValidationError::BrandId), "{bad}");
        }
    }

    #[test]
    fn test_validate_event_type() {
        assert_eq!(validate_event_type("daily_checkin").unwrap(), "daily_checkin");
        assert_eq!(validate_event_type("custom_event_123").unwrap(), "custom_event_123");
        assert!(validate_event_type(&"a".repeat(50)).is_ok());

        assert!(validate_event_type("event with spaces").is_err());
        assert!(validate_event_type("event-with-dashes").is_err());
        assert!(validate_event_type("").is_err());
        assert_eq!(
            validate_event_type(&"a".repeat(51)).unwrap_err().to_string(),
            "Event type must be 50 characters or less"
        );
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("test.user+tag@example.co.uk").is_ok());
        assert!(validate_email("discord_42@loyalteez.app").is_ok());

        for bad in ["invalid", "@example.com", "user@", "", "a..b@example.com"] {
            assert_eq!(
                validate_email(bad),
                Err(ValidationError::Email("Invalid email format")),
                "{bad}"
            );
        }

        let long = format!("{}@example.com", "a".repeat(250));
        assert_eq!(
            validate_email(&long).unwrap_err().to_string(),
            "Email must be 254 characters or less"
        );
    }

    #[test]
    fn test_validate_user_identifier() {
        let email = validate_user_identifier(UserIdentifier::email("user@example.com")).unwrap();
        assert_eq!(email.email.as_deref(), Some("user@example.com"));

        let platform =
            validate_user_identifier(UserIdentifier::platform("discord", "123456789")).unwrap();
        assert_eq!(platform.platform.as_deref(), Some("discord"));
        assert_eq!(platform.platform_user_id.as_deref(), Some("123456789"));
    }

    #[test]
    fn test_validate_user_identifier_rejects_incomplete() {
        assert_eq!(
            validate_user_identifier(UserIdentifier::default()),
            Err(ValidationError::UserIdentifier)
        );
        assert!(validate_user_identifier(UserIdentifier::email("")).is_err());

        let half = UserIdentifier {
            platform: Some("discord".to_string()),
            ..UserIdentifier::default()
        };
        assert_eq!(
            validate_user_identifier(half),
            Err(ValidationError::UserIdentifier)
        );
    }

    #[test]
    fn test_validate_event_definition() {
        let event = validate_event_definition(json!({
            "name": "Daily Check-in",
            "description": "User checks in daily",
            "defaultReward": 50,
            "maxClaimsPerUser": 1
        }))
        .unwrap();
        assert_eq!(event.default_reward, 50);
        assert!(event.requires_email);
        assert_eq!(event.cooldown_hours, None);
    }

    #[test]
    fn test_validate_event_definition_bounds() {
        assert!(validate_event_definition(json!({})).is_err());

        let short_name = validate_event_definition(json!({
            "name": "ab",
            "description": "A long enough description",
            "defaultReward": 10,
            "maxClaimsPerUser": 1
        }));
        assert_eq!(
            short_name.unwrap_err().to_string(),
            "Event name must be at least 3 characters"
        );

        let short_description = validate_event_definition(json!({
            "name": "Test",
            "description": "short",
            "defaultReward": 10,
            "maxClaimsPerUser": 1
        }));
        assert_eq!(
            short_description.unwrap_err().to_string(),
            "Description must be at least 10 characters"
        );

        let fractional = validate_event_definition(json!({
            "name": "Test event",
            "description": "A long enough description",
            "defaultReward": 2.5,
            "maxClaimsPerUser": 1
        }));
        assert_eq!(
            fractional.unwrap_err().to_string(),
            "Reward must be a positive integer"
        );

        let negative_cooldown = validate_event_definition(json!({
            "name": "Test event",
            "description": "A long enough description",
            "defaultReward": 5,
            "maxClaimsPerUser": 1,
            "cooldownHours": -1
        }));
        assert_eq!(
            negative_cooldown.unwrap_err().to_string(),
            "Cooldown must be a non-negative integer"
        );
    }

    #[test]
    fn test_validate_event_definition_detection_methods() {
        let event = validate_event_definition(json!({
            "name": "Helpful Answer",
            "description": "Recognized for helping another member",
            "defaultReward": 50,
            "maxClaimsPerUser": 100,
            "detectionMethods": [
                {"method": "discord_interaction", "config": {"command": "/reward"}}
            ]
        }))
        .unwrap();
        assert_eq!(event.detection_methods.map(|m| m.len()), Some(1));

        let unknown = validate_event_definition(json!({
            "name": "Helpful Answer",
            "description": "Recognized for helping another member",
            "defaultReward": 50,
            "maxClaimsPerUser": 100,
            "detectionMethods": [{"method": "telepathy", "config": {}}]
        }));
        assert!(matches!(unknown, Err(ValidationError::Arguments(_))));
    }

    #[test]
    fn test_validate_program_context() {
        let context = validate_program_context(json!({
            "appType": "discord_community",
            "goals": ["increase_engagement"],
            "platforms": ["discord"]
        }))
        .unwrap();
        assert_eq!(context.app_type, "discord_community");
        assert!(context.budget.is_none());
    }

    #[test]
    fn test_validate_program_context_rejects_empty_lists() {
        assert!(validate_program_context(json!({})).is_err());
        assert!(validate_program_context(json!({"appType": "discord"})).is_err());

        let empty_goals = validate_program_context(json!({
            "appType": "discord",
            "goals": [],
            "platforms": ["discord"]
        }));
        assert_eq!(
            empty_goals.unwrap_err().to_string(),
            "At least one goal must be specified"
        );

        let empty_platforms = validate_program_context(json!({
            "appType": "discord",
            "goals": ["engagement"],
            "platforms": []
        }));
        assert_eq!(
            empty_platforms.unwrap_err().to_string(),
            "At least one platform must be specified"
        );
    }

    #[test]
    fn test_validate_program_context_budget() {
        let context = validate_program_context(json!({
            "appType": "gaming",
            "goals": ["retention"],
            "platforms": ["web"],
            "budget": {"monthly_ltz": 100000, "avg_reward": 40}
        }))
        .unwrap();
        assert_eq!(context.budget.map(|b| b.avg_reward), Some(40));

        let zero = validate_program_context(json!({
            "appType": "gaming",
            "goals": ["retention"],
            "platforms": ["web"],
            "budget": {"monthly_ltz": 0, "avg_reward": 40}
        }));
        assert!(zero.is_err());
    }

    #[test]
    fn test_validate_positive() {
        let ok: serde_json::Number = serde_json::from_str("2.5").unwrap();
        assert!(validate_positive(&ok, "baseReward").is_ok());

        let zero: serde_json::Number = serde_json::from_str("0").unwrap();
        let err = validate_positive(&zero, "baseReward").unwrap_err();
        assert_eq!(err.to_string(), "baseReward must be a positive number");
    }
}
