//! Chain connection details

use super::contracts::{CHAIN_ID, NETWORK_NAME};
use super::{StaticProvider, StaticResource};
use serde_json::{json, Value};

fn config() -> Value {
    json!({
        "chainId": CHAIN_ID,
        "chainName": NETWORK_NAME,
        "rpcUrls": ["https://rpc.soneium.org"],
        "blockExplorer": "https://soneium.blockscout.com",
        "nativeCurrency": {
            "name": "Ethereum",
            "symbol": "ETH",
            "decimals": 18
        }
    })
}

pub fn provider() -> StaticProvider {
    StaticProvider::new(
        "loyalteez://network/",
        vec![StaticResource::json(
            "loyalteez://network/config",
            "Soneium Network Configuration",
            "Network details for connecting to Soneium Mainnet",
            config,
        )],
    )
}
