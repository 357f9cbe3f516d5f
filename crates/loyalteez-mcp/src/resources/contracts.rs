//! Contract addresses on Soneium Mainnet

use super::{StaticProvider, StaticResource};
use serde_json::{json, Value};

pub const CHAIN_ID: u64 = 1868;
pub const NETWORK_NAME: &str = "Soneium Mainnet";

pub const LTZ_TOKEN_ADDRESS: &str = "0x5242b6DB88A72752ac5a54cFe6A7DB8244d743c9";
pub const PERK_NFT_ADDRESS: &str = "0x6ae30d6Dcf3e75456B6582b057f1Bf98A90F2CA0";
pub const POINTS_SALE_ADDRESS: &str = "0x5269B83F6A4E31bEdFDf5329DC052FBb661e3c72";

/// Contracts the gas relayer will forward transactions to.
pub const RELAYABLE_CONTRACTS: [&str; 3] =
    [LTZ_TOKEN_ADDRESS, PERK_NFT_ADDRESS, POINTS_SALE_ADDRESS];

fn ltz_token() -> Value {
    json!({
        "address": LTZ_TOKEN_ADDRESS,
        "name": "Loyalteez Token",
        "symbol": "LTZ",
        "decimals": 0,
        "description": "ERC-20 loyalty token with EIP-2612 permit support"
    })
}

fn perk_nft() -> Value {
    json!({
        "address": PERK_NFT_ADDRESS,
        "name": "PerkNFT",
        "description": "ERC-1155 NFT contract for redeemable perks"
    })
}

fn points_sale() -> Value {
    json!({
        "address": POINTS_SALE_ADDRESS,
        "name": "PointsSale",
        "description": "Contract for purchasing LTZ with ETH/USDC"
    })
}

fn all() -> Value {
    json!({
        "network": NETWORK_NAME,
        "chainId": CHAIN_ID,
        "contracts": {
            "LTZ_TOKEN": ltz_token(),
            "PERK_NFT": perk_nft(),
            "POINTS_SALE": points_sale()
        }
    })
}

pub fn provider() -> StaticProvider {
    StaticProvider::new(
        "loyalteez://contracts/",
        vec![
            StaticResource::json(
                "loyalteez://contracts/ltz-token",
                "LTZ Token Contract",
                "ERC-20 token contract address on Soneium",
                ltz_token,
            ),
            StaticResource::json(
                "loyalteez://contracts/perk-nft",
                "Perk NFT Contract",
                "ERC-1155 perk NFT contract",
                perk_nft,
            ),
            StaticResource::json(
                "loyalteez://contracts/points-sale",
                "PointsSale Contract",
                "Contract for purchasing LTZ",
                points_sale,
            ),
            StaticResource::json(
                "loyalteez://contracts/all",
                "All Contracts",
                "All Loyalteez contract addresses",
                all,
            ),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::ResourceProvider;

    #[tokio::test]
    async fn test_ltz_token_has_no_decimals() {
        let contents = provider()
            .read("loyalteez://contracts/ltz-token")
            .await
            .unwrap();
        let body: Value = serde_json::from_str(&contents.text).unwrap();
        assert_eq!(body["decimals"], 0);
        assert_eq!(body["address"], LTZ_TOKEN_ADDRESS);
    }

    #[test]
    fn test_all_contracts() {
        let body = all();
        assert_eq!(body["chainId"], 1868);
        assert_eq!(body["contracts"]["POINTS_SALE"]["address"], POINTS_SALE_ADDRESS);
    }
}
