//! Webhook receiver examples per web framework.

use super::render;
use serde::{Deserialize, Serialize};

/// Default path a receiver listens on.
pub const DEFAULT_ENDPOINT: &str = "/webhooks/loyalteez";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    Express,
    Nextjs,
    Flask,
    Rails,
    Php,
    Generic,
}

impl Framework {
    fn template(&self) -> &'static str {
        match self {
            Framework::Express => include_str!("../../templates/receivers/express.js"),
            Framework::Nextjs => include_str!("../../templates/receivers/nextjs.ts"),
            Framework::Flask => include_str!("../../templates/receivers/flask.py"),
            Framework::Rails => include_str!("../../templates/receivers/rails.rb"),
            Framework::Php => include_str!("../../templates/receivers/php.php"),
            Framework::Generic => include_str!("../../templates/receivers/generic.txt"),
        }
    }
}

/// Receiver source listening on `endpoint`.
pub fn webhook_receiver(framework: Framework, endpoint: &str) -> String {
    render(framework.template(), &[("endpoint", endpoint)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_express_receiver() {
        let code = webhook_receiver(Framework::Express, DEFAULT_ENDPOINT);
        assert!(code.contains("express"));
        assert!(code.contains("/webhooks/loyalteez"));
        assert!(code.contains("verifyWebhookSignature"));
    }

    #[test]
    fn test_framework_markers() {
        let cases = [
            (Framework::Nextjs, &["Next.js", "API Route"][..]),
            (Framework::Flask, &["Flask", "Python"][..]),
            (Framework::Rails, &["Rails", "Ruby"][..]),
            (Framework::Php, &["PHP"][..]),
            (Framework::Generic, &["Generic"][..]),
        ];
        for (framework, needles) in cases {
            let code = webhook_receiver(framework, "/hooks/ltz");
            for needle in needles {
                assert!(code.contains(needle), "{:?} missing {}", framework, needle);
            }
            assert!(code.contains("/hooks/ltz"), "{:?} ignores the endpoint", framework);
        }
    }

    #[test]
    fn test_framework_names() {
        let parsed: Framework = serde_json::from_value(serde_json::json!("nextjs")).unwrap();
        assert_eq!(parsed, Framework::Nextjs);
        assert!(serde_json::from_value::<Framework>(serde_json::json!("django")).is_err());
    }
}
