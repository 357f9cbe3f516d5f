//! Transaction tools
//!
//! Gasless transactions through the relayer, limited to the Loyalteez
//! contracts.

use super::{failure, ToolOutcome};
use crate::clients::relayer::{Permit, RelayRequest};
use crate::resources::contracts::RELAYABLE_CONTRACTS;
use crate::server::{McpServerResult, Tool, ToolContext};
use crate::types::{ToolDefinition, ToolResult};
use crate::validation::{parse_args, ValidationError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::instrument;

pub const MAX_GAS_LIMIT: u64 = 1_000_000;

/// Tool to relay a gasless transaction.
pub struct RelayTransactionTool;

#[async_trait]
impl Tool for RelayTransactionTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "loyalteez_relay_transaction",
            "Execute a gasless blockchain transaction. Users can claim perks, transfer LTZ, or interact with Loyalteez contracts without needing ETH for gas. Requires Privy authentication.\n\nSee also: loyalteez://docs/api/gas-relayer",
        )
        .with_category("transactions")
        .with_schema(json!({
            "type": "object",
            "properties": {
                "privyAccessToken": {
                    "type": "string",
                    "description": "Privy access token from getAccessToken()"
                },
                "to": {
                    "type": "string",
                    "description": "Contract address to call (must be whitelisted)",
                    "enum": RELAYABLE_CONTRACTS
                },
                "data": {
                    "type": "string",
                    "description": "Encoded function call data (hex string)"
                },
                "userAddress": {
                    "type": "string",
                    "description": "User's wallet address"
                },
                "gasLimit": {
                    "type": "number",
                    "description": "Maximum gas limit (default: auto-estimate, max: 1000000)"
                },
                "permit": {
                    "type": "object",
                    "description": "EIP-2612 permit for gasless approval (optional)",
                    "properties": {
                        "owner": { "type": "string" },
                        "spender": { "type": "string" },
                        "value": { "type": "string" },
                        "deadline": { "type": "number" },
                        "v": { "type": "number" },
                        "r": { "type": "string" },
                        "s": { "type": "string" }
                    }
                }
            },
            "required": ["privyAccessToken", "to", "data", "userAddress"]
        }))
    }

    #[instrument(skip(self, args, context), fields(tool = "relay_transaction"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<ToolResult> {
        match relay_transaction(args, context).await {
            Ok(value) => Ok(ToolResult::json(value)),
            Err(e) => Ok(failure("relaying transaction", e)),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelayTransactionParams {
    privy_access_token: String,
    to: String,
    data: String,
    user_address: String,
    gas_limit: Option<i64>,
    permit: Option<Permit>,
}

fn check_target(to: &str) -> Result<(), ValidationError> {
    if RELAYABLE_CONTRACTS.contains(&to) {
        Ok(())
    } else {
        Err(ValidationError::field(
            "to",
            format!(
                "Contract {} is not whitelisted. Expected one of: {}",
                to,
                RELAYABLE_CONTRACTS.join(", ")
            ),
        ))
    }
}

fn gas_limit(limit: Option<i64>) -> Result<Option<u64>, ValidationError> {
    match limit {
        None => Ok(None),
        Some(n) if n >= 1 && n as u64 <= MAX_GAS_LIMIT => Ok(Some(n as u64)),
        Some(_) => Err(ValidationError::field(
            "gasLimit",
            "gasLimit must be between 1 and 1000000",
        )),
    }
}

async fn relay_transaction(args: Value, context: &ToolContext) -> ToolOutcome<Value> {
    let params: RelayTransactionParams = parse_args(args)?;
    check_target(&params.to)?;
    let gas_limit = gas_limit(params.gas_limit)?;

    Ok(context
        .client()
        .relayer()
        .relay_transaction(
            &params.privy_access_token,
            &RelayRequest {
                to: params.to,
                data: params.data,
                user_address: params.user_address,
                gas_limit,
                permit: params.permit,
            },
        )
        .await?)
}

/// Get all transaction tools.
pub fn transaction_tools() -> Vec<Arc<dyn Tool>> {
    vec![Arc::new(RelayTransactionTool)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::contracts::LTZ_TOKEN_ADDRESS;

    #[test]
    fn test_check_target() {
        assert!(check_target(LTZ_TOKEN_ADDRESS).is_ok());
        let err = check_target("0x0000000000000000000000000000000000000001").unwrap_err();
        assert!(err.to_string().contains("not whitelisted"));
    }

    #[test]
    fn test_gas_limit_bounds() {
        assert_eq!(gas_limit(None).unwrap(), None);
        assert_eq!(gas_limit(Some(1)).unwrap(), Some(1));
        assert_eq!(gas_limit(Some(1_000_000)).unwrap(), Some(1_000_000));
        assert!(gas_limit(Some(0)).is_err());
        assert!(gas_limit(Some(1_000_001)).is_err());
        assert!(gas_limit(Some(-5)).is_err());
    }
}
