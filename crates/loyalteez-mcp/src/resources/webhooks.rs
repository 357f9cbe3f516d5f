//! Webhook event catalogue

use super::{StaticProvider, StaticResource};
use serde_json::{json, Value};

/// Header carrying the HMAC-SHA256 signature.
pub const SIGNATURE_HEADER: &str = "X-Loyalteez-Signature";

fn events() -> Value {
    json!({
        "eventTypes": [
            {
                "type": "reward.distributed",
                "description": "Fired when LTZ is distributed to a user",
                "data": {
                    "userEmail": "string",
                    "amount": "number",
                    "eventType": "string",
                    "transactionHash": "string",
                    "timestamp": "string"
                },
                "example": {
                    "id": "evt_1234567890",
                    "type": "reward.distributed",
                    "created": "2026-01-15T10:30:00Z",
                    "data": {
                        "userEmail": "user@example.com",
                        "amount": 100,
                        "eventType": "account_creation",
                        "transactionHash": "0x1234...5678",
                        "timestamp": "2026-01-15T10:30:00Z"
                    }
                }
            },
            {
                "type": "perk.redeemed",
                "description": "Fired when a user redeems a perk",
                "data": {
                    "userEmail": "string",
                    "perkId": "string",
                    "perkName": "string",
                    "redemptionCode": "string",
                    "timestamp": "string"
                },
                "example": {
                    "id": "evt_1234567891",
                    "type": "perk.redeemed",
                    "created": "2026-01-15T10:35:00Z",
                    "data": {
                        "userEmail": "user@example.com",
                        "perkId": "perk_abc123",
                        "perkName": "10% Discount Code",
                        "redemptionCode": "SAVE10",
                        "timestamp": "2026-01-15T10:35:00Z"
                    }
                }
            },
            {
                "type": "streak.milestone",
                "description": "Fired when a user reaches a streak milestone",
                "data": {
                    "userEmail": "string",
                    "milestoneDays": "number",
                    "bonusAmount": "number",
                    "timestamp": "string"
                },
                "example": {
                    "id": "evt_1234567892",
                    "type": "streak.milestone",
                    "created": "2026-01-15T10:40:00Z",
                    "data": {
                        "userEmail": "user@example.com",
                        "milestoneDays": 7,
                        "bonusAmount": 100,
                        "timestamp": "2026-01-15T10:40:00Z"
                    }
                }
            },
            {
                "type": "achievement.unlocked",
                "description": "Fired when a user unlocks an achievement",
                "data": {
                    "userEmail": "string",
                    "achievementId": "string",
                    "achievementName": "string",
                    "timestamp": "string"
                },
                "example": {
                    "id": "evt_1234567893",
                    "type": "achievement.unlocked",
                    "created": "2026-01-15T10:45:00Z",
                    "data": {
                        "userEmail": "user@example.com",
                        "achievementId": "ach_xyz789",
                        "achievementName": "First Purchase",
                        "timestamp": "2026-01-15T10:45:00Z"
                    }
                }
            }
        ],
        "signatureVerification": {
            "algorithm": "HMAC-SHA256",
            "header": SIGNATURE_HEADER,
            "description": format!("All webhooks include a signature in the {} header. Always verify this signature before processing events.", SIGNATURE_HEADER),
            "example": {
                "header": format!("{}: abc123def456...", SIGNATURE_HEADER),
                "verification": "HMAC-SHA256(webhook_secret, raw_body)"
            }
        },
        "bestPractices": [
            "Always verify webhook signatures",
            "Use HTTPS for webhook endpoints",
            "Implement idempotency (store processed webhook IDs)",
            "Add rate limiting to webhook endpoints",
            "Validate webhook payload structure",
            "Handle errors gracefully",
            "Log all webhook events for debugging"
        ]
    })
}

pub fn provider() -> StaticProvider {
    StaticProvider::new(
        "loyalteez://webhooks/",
        vec![StaticResource::json(
            "loyalteez://webhooks/events",
            "Webhook Event Types",
            "Complete reference of webhook event types and their payloads",
            events,
        )],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_types() {
        let body = events();
        let types: Vec<&str> = body["eventTypes"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|e| e["type"].as_str())
            .collect();
        assert_eq!(
            types,
            ["reward.distributed", "perk.redeemed", "streak.milestone", "achievement.unlocked"]
        );
        assert_eq!(body["signatureVerification"]["header"], "X-Loyalteez-Signature");
    }
}
