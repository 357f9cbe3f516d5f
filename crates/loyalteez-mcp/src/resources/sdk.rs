//! SDK guides

use super::{StaticProvider, StaticResource};

const JAVASCRIPT: &str = include_str!("../../data/sdk-javascript.md");
const MOBILE: &str = include_str!("../../data/sdk-mobile.md");

pub fn provider() -> StaticProvider {
    StaticProvider::new(
        "loyalteez://sdk/",
        vec![
            StaticResource::markdown(
                "loyalteez://sdk/javascript",
                "JavaScript SDK Reference",
                "Complete JavaScript SDK method reference with examples",
                JAVASCRIPT,
            ),
            StaticResource::markdown(
                "loyalteez://sdk/mobile",
                "Mobile SDK Examples",
                "Mobile integration examples for React Native, iOS, Android, and Flutter",
                MOBILE,
            ),
        ],
    )
}
