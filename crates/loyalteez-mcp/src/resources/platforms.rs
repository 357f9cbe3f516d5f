//! OAuth provider user id formats

use super::{StaticProvider, StaticResource};
use serde_json::{json, Map, Value};

/// (provider, id format, example, where the id comes from)
const PROVIDERS: [(&str, &str, &str, &str); 8] = [
    ("discord", "17-20 digit numeric string (snowflake)", "123456789012345678", "user.id from Discord API"),
    ("twitter", "numeric string", "987654321", "user.id_str from Twitter API"),
    ("github", "numeric string", "45678901", "user.id from GitHub API"),
    ("google", "long numeric string", "108012345678901234567", "sub claim from OAuth token"),
    ("telegram", "numeric", "123456789", "user.id from Telegram Bot API"),
    ("spotify", "alphanumeric string", "abc123xyz", "user.id from Spotify API"),
    ("instagram", "numeric string", "123456789", "user.id from Instagram Graph API"),
    ("tiktok", "alphanumeric string", "abc123", "open_id from TikTok API"),
];

fn mappings() -> Value {
    let providers: Map<String, Value> = PROVIDERS
        .iter()
        .map(|(name, id_format, example, how_to_get)| {
            (
                name.to_string(),
                json!({
                    "idFormat": id_format,
                    "example": example,
                    "howToGet": how_to_get
                }),
            )
        })
        .collect();
    json!({ "providers": providers })
}

pub fn provider() -> StaticProvider {
    StaticProvider::new(
        "loyalteez://platforms/",
        vec![StaticResource::json(
            "loyalteez://platforms/mappings",
            "OAuth Provider ID Formats",
            "User ID formats for each supported OAuth provider",
            mappings,
        )],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mappings_cover_providers() {
        let body = mappings();
        let providers = body["providers"].as_object().unwrap();
        assert_eq!(providers.len(), 8);
        assert_eq!(providers["google"]["howToGet"], "sub claim from OAuth token");
    }
}
