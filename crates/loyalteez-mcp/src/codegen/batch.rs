//! Starter code returned with a batch of newly created events.

use super::render;

const DISCORD: &str = include_str!("../../templates/batch/discord.js");
const TELEGRAM: &str = include_str!("../../templates/batch/telegram.js");
const WEB: &str = include_str!("../../templates/batch/web.html");
const GENERIC: &str = include_str!("../../templates/batch/generic.js");

/// Integration snippet for `platform`, wired to the first created event.
///
/// `web` and `shopify` share the browser SDK snippet. Unknown platforms get
/// the plain REST example.
pub fn implementation_code(
    platform: &str,
    brand_id: &str,
    first_event_type: Option<&str>,
    endpoint: &str,
) -> String {
    let (template, fallback_event) = match platform.to_ascii_lowercase().as_str() {
        "discord" => (DISCORD, "daily_checkin"),
        "telegram" => (TELEGRAM, "daily_checkin"),
        "web" | "shopify" => (WEB, "newsletter_subscribe"),
        _ => (GENERIC, "custom_event"),
    };

    render(
        template,
        &[
            ("brand_id", brand_id),
            ("event_type", first_event_type.unwrap_or(fallback_event)),
            ("endpoint", endpoint),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const BRAND: &str = "0x1234567890123456789012345678901234567890";
    const ENDPOINT: &str = "https://api.loyalteez.app/loyalteez-api/manual-event";

    #[test]
    fn test_discord_uses_first_event() {
        let code = implementation_code("Discord", BRAND, Some("discord_gm_1"), ENDPOINT);
        assert!(code.contains("discord.js"));
        assert!(code.contains("'discord_gm_1'"));
        assert!(code.contains(BRAND));
        assert!(code.contains(ENDPOINT));
        assert!(!code.contains("{{"));
    }

    #[test]
    fn test_fallback_event_types() {
        assert!(implementation_code("telegram", BRAND, None, ENDPOINT).contains("'daily_checkin'"));
        assert!(implementation_code("shopify", BRAND, None, ENDPOINT).contains("'newsletter_subscribe'"));
        assert!(implementation_code("web", BRAND, None, ENDPOINT).contains("LoyalteezAutomation.init"));
        assert!(implementation_code("slack", BRAND, None, ENDPOINT).contains("'custom_event'"));
    }
}
