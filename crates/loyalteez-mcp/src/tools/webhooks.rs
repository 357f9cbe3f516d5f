//! Webhook tools
//!
//! Signature checks for incoming Loyalteez webhooks and receiver code for
//! common web frameworks. Neither tool talks to the network.

use super::{failure, ToolError, ToolOutcome};
use crate::codegen::receivers::{webhook_receiver, Framework, DEFAULT_ENDPOINT};
use crate::server::{McpServerResult, Tool, ToolContext};
use crate::types::{ToolDefinition, ToolResult};
use crate::validation::parse_args;
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::Sha256;
use std::sync::Arc;
use tracing::{debug, error, instrument};

type HmacSha256 = Hmac<Sha256>;

/// Optional prefix on signatures copied from the partner portal.
pub const SIGNATURE_PREFIX: &str = "whsec_";

/// Outcome of a signature check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureCheck {
    pub valid: bool,
    /// Hex HMAC-SHA256 of the payload.
    pub expected: String,
}

/// Verify `signature` against the HMAC-SHA256 of `payload` keyed by `secret`.
///
/// Malformed hex or a digest of the wrong length is invalid, not an error.
pub fn verify_signature(payload: &str, signature: &str, secret: &str) -> SignatureCheck {
    // HMAC accepts keys of any length.
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => {
            return SignatureCheck {
                valid: false,
                expected: String::new(),
            }
        }
    };
    mac.update(payload.as_bytes());
    let expected = hex::encode(mac.clone().finalize().into_bytes());

    let received = signature.strip_prefix(SIGNATURE_PREFIX).unwrap_or(signature);
    let valid = !received.is_empty()
        && hex::decode(received)
            .map(|bytes| mac.verify_slice(&bytes).is_ok())
            .unwrap_or(false);

    SignatureCheck { valid, expected }
}

/// Tool to validate a webhook signature.
pub struct ValidateWebhookTool;

#[async_trait]
impl Tool for ValidateWebhookTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "loyalteez_validate_webhook",
            "Validate a webhook signature to ensure the request is from Loyalteez. Use this to verify webhook authenticity before processing events.\n\nWebhook signatures use HMAC-SHA256. Always verify signatures to prevent unauthorized requests.\n\nSee also: loyalteez://docs/guides/webhooks",
        )
        .with_category("webhooks")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "payload": {
                    "type": "string",
                    "description": "Raw webhook payload (request body as string)"
                },
                "signature": {
                    "type": "string",
                    "description": "Webhook signature from X-Loyalteez-Signature header"
                },
                "secret": {
                    "type": "string",
                    "description": "Your webhook secret (configured in Partner Portal)"
                }
            },
            "required": ["payload", "signature", "secret"]
        }))
    }

    #[instrument(skip(self, args, _context), fields(tool = "validate_webhook"))]
    async fn execute(&self, args: Value, _context: &ToolContext) -> McpServerResult<ToolResult> {
        match validate_webhook(args) {
            Ok(value) => Ok(ToolResult::json(value)),
            Err(e) => {
                error!("Error validating webhook: {}", e);
                Ok(ToolResult::json_error(json!({
                    "error": "Error validating webhook",
                    "message": e.to_string(),
                })))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ValidateWebhookParams {
    payload: String,
    signature: String,
    secret: String,
}

fn validate_webhook(args: Value) -> Result<Value, ToolError> {
    let params: ValidateWebhookParams = parse_args(args)?;
    let check = verify_signature(&params.payload, &params.signature, &params.secret);
    debug!("Webhook signature valid: {}", check.valid);

    let message = if check.valid {
        "Webhook signature is valid"
    } else {
        "Webhook signature is invalid - request may not be from Loyalteez"
    };
    Ok(json!({
        "valid": check.valid,
        "message": message,
        "expectedSignature": check.expected,
        "receivedSignature": params.signature,
    }))
}

/// Tool to generate webhook receiver code.
pub struct WebhookExampleTool;

#[async_trait]
impl Tool for WebhookExampleTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "loyalteez_webhook_example",
            "Generate complete webhook receiver code for your framework. Returns ready-to-use code with signature verification, error handling, and event processing.\n\nSupports: Node.js/Express, Next.js API routes, Python/Flask, Ruby/Rails, PHP.\n\nSee also: loyalteez://docs/guides/webhooks",
        )
        .with_category("webhooks")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "framework": {
                    "type": "string",
                    "enum": ["express", "nextjs", "flask", "rails", "php", "generic"],
                    "description": "Framework for code generation"
                },
                "endpoint": {
                    "type": "string",
                    "description": "Your webhook endpoint URL (e.g., /webhooks/loyalteez)"
                }
            },
            "required": ["framework"]
        }))
    }

    #[instrument(skip(self, args, _context), fields(tool = "webhook_example"))]
    async fn execute(&self, args: Value, _context: &ToolContext) -> McpServerResult<ToolResult> {
        match webhook_example(args) {
            Ok(code) => Ok(ToolResult::text(code)),
            Err(e) => Ok(failure("generating webhook code", e)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WebhookExampleParams {
    framework: Framework,
    endpoint: Option<String>,
}

fn webhook_example(args: Value) -> ToolOutcome<String> {
    let params: WebhookExampleParams = parse_args(args)?;
    let endpoint = params
        .endpoint
        .as_deref()
        .filter(|e| !e.is_empty())
        .unwrap_or(DEFAULT_ENDPOINT);
    Ok(webhook_receiver(params.framework, endpoint))
}

/// Get all webhook tools.
pub fn webhook_tools() -> Vec<Arc<dyn Tool>> {
    vec![Arc::new(ValidateWebhookTool), Arc::new(WebhookExampleTool)]
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = "The quick brown fox jumps over the lazy dog";
    const DIGEST: &str = "f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8";

    #[test]
    fn test_verify_signature() {
        let check = verify_signature(PAYLOAD, DIGEST, "key");
        assert!(check.valid);
        assert_eq!(check.expected, DIGEST);
    }

    #[test]
    fn test_verify_prefixed_signature() {
        let prefixed = format!("whsec_{}", DIGEST);
        assert!(verify_signature(PAYLOAD, &prefixed, "key").valid);
    }

    #[test]
    fn test_rejects_bad_signatures() {
        assert!(!verify_signature(PAYLOAD, DIGEST, "other").valid);
        assert!(!verify_signature(PAYLOAD, "", "key").valid);
        assert!(!verify_signature(PAYLOAD, "not-hex", "key").valid);
        assert!(!verify_signature(PAYLOAD, &DIGEST[..32], "key").valid);
    }

    #[test]
    fn test_validate_webhook_echoes_signature() {
        let body = validate_webhook(json!({
            "payload": PAYLOAD,
            "signature": "deadbeef",
            "secret": "key"
        }))
        .unwrap();
        assert_eq!(body["valid"], false);
        assert_eq!(body["receivedSignature"], "deadbeef");
        assert_eq!(body["expectedSignature"], DIGEST);
        assert_eq!(
            body["message"],
            "Webhook signature is invalid - request may not be from Loyalteez"
        );
    }

    #[test]
    fn test_validate_webhook_missing_field() {
        assert!(validate_webhook(json!({"payload": "{}"})).is_err());
    }

    #[test]
    fn test_webhook_example_default_endpoint() {
        let code = webhook_example(json!({"framework": "express"})).unwrap();
        assert!(code.contains(DEFAULT_ENDPOINT));

        let code = webhook_example(json!({"framework": "flask", "endpoint": "/hooks/ltz"})).unwrap();
        assert!(code.contains("/hooks/ltz"));
    }

    #[test]
    fn test_webhook_example_unknown_framework() {
        assert!(webhook_example(json!({"framework": "django"})).is_err());
    }
}
