//! Rate limits and how to live with them

use super::{StaticProvider, StaticResource};
use crate::tools::events::MAX_BULK_EVENTS;
use crate::tools::transactions::MAX_GAS_LIMIT;
use serde_json::{json, Value};

/// Gasless transactions per wallet per hour.
pub const RELAYER_HOURLY_LIMIT: u32 = 35;

/// Pregeneration requests per brand per minute.
pub const PREGEN_MINUTE_LIMIT: u32 = 100;

fn endpoints() -> Value {
    json!({
        "eventHandler": {
            "endpoints": [
                {
                    "endpoint": "/loyalteez-api/manual-event",
                    "limit": "1 per event type",
                    "scope": "Per user email",
                    "resetPeriod": "Daily (24 hours)",
                    "description": "Each user can receive each reward type once per day"
                },
                {
                    "endpoint": "/loyalteez-api/bulk-events",
                    "limit": format!("{} events per request", MAX_BULK_EVENTS),
                    "scope": "Per request",
                    "resetPeriod": "N/A",
                    "description": format!("Maximum {} events in a single bulk request", MAX_BULK_EVENTS)
                },
                {
                    "endpoint": "/loyalteez-api/health",
                    "limit": "Unlimited",
                    "scope": "N/A",
                    "resetPeriod": "N/A",
                    "description": "Health check endpoint has no rate limits"
                }
            ],
            "duplicateDetection": {
                "window": "60 seconds",
                "behavior": "Returns 409 Conflict if same event + user within window"
            },
            "cooldown": {
                "default": "24 hours",
                "configurable": true,
                "description": "Based on cooldownHours in event rule configuration"
            }
        },
        "gasRelayer": {
            "transactions": {
                "limit": RELAYER_HOURLY_LIMIT,
                "scope": "Per wallet address",
                "resetPeriod": "Per hour",
                "description": format!("Users can make {} gasless transactions per hour", RELAYER_HOURLY_LIMIT)
            },
            "gasLimit": {
                "max": MAX_GAS_LIMIT,
                "description": "Maximum gas limit per transaction"
            },
            "gasPrice": {
                "max": "100 Gwei",
                "description": "Maximum gas price per transaction"
            }
        },
        "pregeneration": {
            "requests": {
                "limit": PREGEN_MINUTE_LIMIT,
                "scope": "Per brand",
                "resetPeriod": "Per minute",
                "description": format!("Maximum {} pregeneration requests per brand per minute", PREGEN_MINUTE_LIMIT)
            },
            "idempotent": true,
            "description": "Same OAuth ID returns same wallet (not counted as new request)"
        },
        "headers": {
            "description": "Rate limit information is provided in response headers",
            "headers": [
                { "name": "X-RateLimit-Limit", "description": "Maximum requests allowed", "example": "35" },
                { "name": "X-RateLimit-Remaining", "description": "Requests left in current window", "example": "32" },
                { "name": "X-RateLimit-Reset", "description": "Unix timestamp when limit resets", "example": "1699999999" },
                { "name": "Retry-After", "description": "Seconds to wait before retrying (429 responses)", "example": "60" }
            ]
        }
    })
}

fn strategies() -> Value {
    json!({
        "strategies": {
            "detectRateLimits": include_str!("../../data/snippets/detect_rate_limits.js"),
            "clientSideDeduplication": include_str!("../../data/snippets/client_side_deduplication.js"),
            "exponentialBackoff": include_str!("../../data/snippets/exponential_backoff.js"),
            "trackTransactionCount": include_str!("../../data/snippets/track_transaction_count.js")
        },
        "bestPractices": [
            "Cache locally to prevent duplicate requests",
            "Implement exponential backoff for retries",
            "Track rate limit headers to inform users",
            "Queue failed requests for later retry",
            "Monitor usage to avoid hitting limits",
            "Use bulk endpoints when possible to reduce request count"
        ]
    })
}

pub fn provider() -> StaticProvider {
    StaticProvider::new(
        "loyalteez://rate-limits/",
        vec![
            StaticResource::json(
                "loyalteez://rate-limits/endpoints",
                "Rate Limits by Endpoint",
                "Complete rate limit reference for all API endpoints",
                endpoints,
            ),
            StaticResource::json(
                "loyalteez://rate-limits/strategies",
                "Rate Limit Handling Strategies",
                "Code examples and best practices for handling rate limits",
                strategies,
            ),
        ],
    )
}
