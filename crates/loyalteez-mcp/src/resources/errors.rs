//! HTTP error codes and handling patterns

use super::contracts::RELAYABLE_CONTRACTS;
use super::rate_limits::{PREGEN_MINUTE_LIMIT, RELAYER_HOURLY_LIMIT};
use super::{StaticProvider, StaticResource};
use serde_json::{json, Value};

const OAUTH_PROVIDERS: [&str; 8] = [
    "discord", "twitter", "github", "google", "telegram", "spotify", "instagram", "tiktok",
];

fn handling_patterns() -> Value {
    json!({
        "detectAndHandle": include_str!("../../data/snippets/detect_and_handle.js"),
        "retryWithBackoff": include_str!("../../data/snippets/retry_with_backoff.js")
    })
}

fn codes() -> Value {
    json!({
        "httpStatusCodes": {
            "200": { "name": "OK", "description": "Request succeeded" },
            "400": { "name": "Bad Request", "description": "Invalid input data" },
            "401": { "name": "Unauthorized", "description": "Missing/invalid auth token" },
            "403": { "name": "Forbidden", "description": "Access denied (automation disabled, contract not whitelisted)" },
            "404": { "name": "Not Found", "description": "Endpoint does not exist" },
            "409": { "name": "Conflict", "description": "Duplicate event detected (same event + user within 60 seconds)" },
            "429": { "name": "Too Many Requests", "description": "Rate limit exceeded" },
            "500": { "name": "Internal Server Error", "description": "Server error (contact support)" },
            "503": { "name": "Service Unavailable", "description": "Service temporarily down" }
        },
        "eventHandlerErrors": {
            "invalidEventData": {
                "status": 400,
                "error": "Invalid event data",
                "commonCauses": ["Missing required fields", "Invalid data format", "Validation errors"],
                "solution": "Ensure all required fields are present and properly formatted",
                "example": {
                    "wrong": { "brandId": "abc123" },
                    "correct": { "brandId": "0x...", "eventType": "account_creation", "userEmail": "user@example.com" }
                }
            },
            "missingRequiredFields": {
                "status": 400,
                "error": "Missing required fields",
                "requiredFields": ["brandId", "eventType", "userEmail"],
                "solution": "Validate all required fields before sending request"
            },
            "eventTypeNotConfigured": {
                "status": 400,
                "error": "Event type not configured",
                "solution": "Use a supported event type or configure custom event in Partner Portal",
                "supportedTypes": ["account_creation", "complete_survey", "newsletter_subscribe", "rate_experience", "subscribe_renewal", "form_submit"]
            },
            "automationDisabled": {
                "status": 403,
                "error": "Automation disabled",
                "solution": "Enable automation in Partner Portal → Automation → Enable Automation",
                "handling": "Check response status and show user-friendly message"
            },
            "domainNotAuthorized": {
                "status": 403,
                "error": "Domain not authorized",
                "solution": "Add your domain in Partner Portal → Settings → Domain Configuration"
            },
            "duplicateEvent": {
                "status": 409,
                "error": "Duplicate event detected",
                "description": "Same event type + user email within last 60 seconds",
                "solution": "Implement client-side deduplication or wait 60 seconds"
            },
            "rateLimitExceeded": {
                "status": 429,
                "error": "Rate limit exceeded",
                "description": "User has already received reward for this event type today",
                "solution": "Implement rate limit checking and user messaging"
            }
        },
        "gasRelayerErrors": {
            "unauthorized": {
                "status": 401,
                "error": "Invalid or expired Privy token",
                "solution": "Get fresh access token using Privy SDK getAccessToken()"
            },
            "contractNotWhitelisted": {
                "status": 403,
                "error": "Transaction validation failed: Contract not whitelisted",
                "whitelistedContracts": RELAYABLE_CONTRACTS,
                "solution": "Use one of the whitelisted contract addresses"
            },
            "rateLimitExceeded": {
                "status": 429,
                "error": format!("Rate limit exceeded. Max {} transactions per hour.", RELAYER_HOURLY_LIMIT),
                "solution": "Track transaction count and show user when limit is reached"
            }
        },
        "pregenerationErrors": {
            "missingFields": {
                "status": 400,
                "error": "Missing required fields",
                "requiredFields": ["brand_id", "oauth_provider", "oauth_user_id"]
            },
            "invalidProvider": {
                "status": 400,
                "error": "Invalid OAuth provider",
                "validProviders": OAUTH_PROVIDERS
            },
            "invalidDiscordId": {
                "status": 400,
                "error": "Invalid Discord user ID",
                "description": "Discord user IDs must be 17-20 digit numeric strings (snowflake IDs)"
            },
            "rateLimitExceeded": {
                "status": 429,
                "error": "Rate limit exceeded",
                "description": format!("Maximum {} requests per minute per brand", PREGEN_MINUTE_LIMIT),
                "solution": "Implement rate limiting or batch requests"
            }
        },
        "errorHandlingPatterns": handling_patterns()
    })
}

fn handling() -> Value {
    json!({
        "patterns": handling_patterns(),
        "bestPractices": [
            "Always check response status before parsing JSON",
            "Implement retry logic for transient errors (429, 500, 503)",
            "Show user-friendly error messages",
            "Log errors for debugging",
            "Handle network errors separately from API errors"
        ]
    })
}

pub fn provider() -> StaticProvider {
    StaticProvider::new(
        "loyalteez://errors/",
        vec![
            StaticResource::json(
                "loyalteez://errors/codes",
                "Error Codes Reference",
                "Complete reference for HTTP status codes and error responses",
                codes,
            ),
            StaticResource::json(
                "loyalteez://errors/handling",
                "Error Handling Patterns",
                "Best practices and code examples for handling errors",
                handling,
            ),
        ],
    )
}
