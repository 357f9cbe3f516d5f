//! Diagnostic tools

use crate::clients::{api_version_compatibility, ClientResult, API_VERSION};
use crate::server::{McpServerResult, Tool, ToolContext};
use crate::types::{ToolDefinition, ToolResult};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Tool to check Loyalteez API health.
pub struct HealthCheckTool;

#[async_trait]
impl Tool for HealthCheckTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "loyalteez_health_check",
            "Check the health status of Loyalteez APIs. Verifies that the Event Handler, database, blockchain, and Privy services are operational. Useful for diagnostics and verifying API availability before making calls.\n\nSee also: loyalteez://docs/api/rest-api",
        )
        .with_category("diagnostics")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "brandId": {
                    "type": "string",
                    "description": "Your brand wallet address. Optional - health check works without brandId."
                }
            },
            "required": []
        }))
    }

    #[instrument(skip(self, _args, context), fields(tool = "health_check"))]
    async fn execute(&self, _args: Value, context: &ToolContext) -> McpServerResult<ToolResult> {
        Ok(health_report(context.client().event_handler().health().await))
    }
}

fn health_report(outcome: ClientResult<Value>) -> ToolResult {
    match outcome {
        Ok(health) => {
            let status = health.get("status").cloned().unwrap_or(Value::Null);
            info!("Health status: {}", status);
            let message = if status == "healthy" {
                "All services are operational"
            } else {
                "Some services may be experiencing issues"
            };
            ToolResult::json(json!({
                "success": true,
                "status": status,
                "timestamp": health.get("timestamp"),
                "services": health.get("services"),
                "message": message,
                "apiVersion": {
                    "clientVersion": API_VERSION,
                    "compatibility": api_version_compatibility(),
                },
            }))
        }
        Err(e) => {
            error!("Health check failed: {}", e);
            ToolResult::json_error(json!({
                "success": false,
                "error": "Health check failed",
                "message": e.to_string(),
                "suggestion": "The API may be temporarily unavailable. Please try again later.",
            }))
        }
    }
}

/// Get all diagnostic tools.
pub fn diagnostic_tools() -> Vec<Arc<dyn Tool>> {
    vec![Arc::new(HealthCheckTool)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ClientError;

    fn health(status: &str) -> Value {
        json!({
            "status": status,
            "timestamp": "2026-01-01T00:00:00Z",
            "services": {"database": "ok"}
        })
    }

    fn body(result: &ToolResult) -> Value {
        serde_json::from_str(&result.text_content()).unwrap()
    }

    #[test]
    fn test_healthy_report() {
        let result = health_report(Ok(health("healthy")));
        assert!(!result.is_error);
        let body = body(&result);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "All services are operational");
        assert_eq!(body["apiVersion"]["clientVersion"], "v1");
    }

    #[test]
    fn test_degraded_report() {
        let body = body(&health_report(Ok(health("degraded"))));
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["message"], "Some services may be experiencing issues");
        assert_eq!(body["services"]["database"], "ok");
    }

    #[test]
    fn test_report_without_status() {
        let result = health_report(Ok(json!({"uptime": 12})));
        assert!(!result.is_error);
        let body = body(&result);
        assert_eq!(body["status"], Value::Null);
        assert_eq!(body["message"], "Some services may be experiencing issues");
    }

    #[test]
    fn test_failed_report() {
        let result = health_report(Err(ClientError::Api {
            status: 503,
            message: "unavailable".to_string(),
        }));
        assert!(result.is_error);
        let body = body(&result);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Health check failed");
    }
}
