//! Standard event types and the custom event format

use super::{StaticProvider, StaticResource};
use serde_json::{json, Value};

/// (type, description, typical reward, frequency)
const STANDARD_EVENTS: [(&str, &str, &str, &str); 8] = [
    ("account_creation", "User creates an account", "100-500 LTZ", "once_per_user"),
    ("email_verification", "User verifies email address", "50-200 LTZ", "once_per_user"),
    ("purchase", "User completes a purchase", "1-10 LTZ per dollar", "per_transaction"),
    ("referral", "User refers a friend who signs up", "500-2000 LTZ", "per_referral"),
    ("newsletter_subscribe", "User subscribes to newsletter", "25-100 LTZ", "once_per_user"),
    ("review_submission", "User submits a product review", "50-200 LTZ", "per_review"),
    ("profile_completion", "User completes their profile", "100-300 LTZ", "once_per_user"),
    ("form_submit", "Generic form submission", "10-50 LTZ", "configurable"),
];

fn standard() -> Value {
    let events: Vec<Value> = STANDARD_EVENTS
        .iter()
        .map(|(event_type, description, reward, frequency)| {
            json!({
                "type": event_type,
                "description": description,
                "typicalReward": reward,
                "frequency": frequency
            })
        })
        .collect();

    json!({
        "standardEvents": events,
        "customEvents": {
            "description": "Create custom events in Partner Portal with any name and reward amount",
            "idFormat": "custom_{randomId}_{timestamp}",
            "detectionMethods": ["url_pattern", "css_selector", "form_submit", "webhook"]
        }
    })
}

pub fn provider() -> StaticProvider {
    StaticProvider::new(
        "loyalteez://events/",
        vec![StaticResource::json(
            "loyalteez://events/standard",
            "Standard Event Types",
            "Pre-defined event types and their typical reward amounts",
            standard,
        )],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_events() {
        let body = standard();
        assert_eq!(body["standardEvents"].as_array().unwrap().len(), 8);
        assert_eq!(body["standardEvents"][2]["frequency"], "per_transaction");
        assert_eq!(body["customEvents"]["idFormat"], "custom_{randomId}_{timestamp}");
    }
}
