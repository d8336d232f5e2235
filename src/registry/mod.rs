/*
 * Address registry: chain id to swap pool and token addresses
 */

use ethers::types::{Address, H160};
use serde::Serialize;
use tracing::warn;

use crate::models::{TokenInfo, TokenSymbol};

pub const BASE_SEPOLIA_CHAIN_ID: u64 = 84532;
pub const LOCALHOST_CHAIN_ID: u64 = 31337;

/// Address standing in for the chain's native token (ETH) in pool calls.
pub const NATIVE_TOKEN_SENTINEL: Address = address("0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE");

pub const SWAP_POOL_BASE_SEPOLIA: Address = address("0xA9f2C892DB67585ce6B3BC519F1B69c6B42B2937");
pub const USDC_BASE_SEPOLIA: Address = address("0x036CbD53842c5426634e7929541eC2318f3dCF7e");
pub const SWAP_POOL_LOCALHOST: Address = address("0x5FbDB2315678afecb367f032d93F642f64180aa3");

pub const USDC_DECIMALS: u8 = 6;
pub const ETH_DECIMALS: u8 = 18;

const USDC: TokenInfo = TokenInfo {
    symbol: TokenSymbol::Usdc,
    address: USDC_BASE_SEPOLIA,
    decimals: USDC_DECIMALS,
};

const ETH: TokenInfo = TokenInfo {
    symbol: TokenSymbol::Eth,
    address: NATIVE_TOKEN_SENTINEL,
    decimals: ETH_DECIMALS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NetworkDescriptor {
    pub chain_id: u64,
    pub name: &'static str,
    pub contract_address: Address,
    pub usdc: TokenInfo,
    pub eth: TokenInfo,
}

impl NetworkDescriptor {
    #[must_use]
    pub fn token(&self, symbol: TokenSymbol) -> &TokenInfo {
        match symbol {
            TokenSymbol::Usdc => &self.usdc,
            TokenSymbol::Eth => &self.eth,
        }
    }
}

pub const BASE_SEPOLIA: NetworkDescriptor = NetworkDescriptor {
    chain_id: BASE_SEPOLIA_CHAIN_ID,
    name: "Base Sepolia",
    contract_address: SWAP_POOL_BASE_SEPOLIA,
    usdc: USDC,
    eth: ETH,
};

// Local dev chains reuse the Base Sepolia token addresses.
pub const LOCALHOST: NetworkDescriptor = NetworkDescriptor {
    chain_id: LOCALHOST_CHAIN_ID,
    name: "Localhost",
    contract_address: SWAP_POOL_LOCALHOST,
    usdc: USDC,
    eth: ETH,
};

const NETWORKS: &[NetworkDescriptor] = &[BASE_SEPOLIA, LOCALHOST];

/// Descriptor used for every chain id without a deployment.
pub const FALLBACK: NetworkDescriptor = BASE_SEPOLIA;

#[must_use]
pub fn lookup(chain_id: u64) -> Option<NetworkDescriptor> {
    NETWORKS.iter().copied().find(|n| n.chain_id == chain_id)
}

#[must_use]
pub fn is_supported(chain_id: u64) -> bool {
    lookup(chain_id).is_some()
}

/// Resolves a chain id to its network descriptor.
///
/// Never fails: chain ids without a deployment resolve to [`FALLBACK`], the Base
/// Sepolia test-network addresses. Callers running against anything other than a
/// test network should check [`is_supported`] first, since calls against the
/// fallback addresses on another chain will hit unrelated contracts.
#[must_use]
pub fn resolve(chain_id: u64) -> NetworkDescriptor {
    lookup(chain_id).unwrap_or_else(|| {
        warn!(
            "No swap pool deployment for chain {}, falling back to {} addresses",
            chain_id, FALLBACK.name
        );
        FALLBACK
    })
}

/// Parses a `0x`-prefixed 40 digit hex literal at compile time.
pub const fn address(literal: &str) -> Address {
    let bytes = literal.as_bytes();
    assert!(
        bytes.len() == 42 && bytes[0] == b'0' && bytes[1] == b'x',
        "address literal must be 0x followed by 40 hex digits"
    );
    let mut out = [0u8; 20];
    let mut i = 0;
    while i < 20 {
        out[i] = (hex_digit(bytes[2 + 2 * i]) << 4) | hex_digit(bytes[3 + 2 * i]);
        i += 1;
    }
    H160(out)
}

const fn hex_digit(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => panic!("invalid hex digit in address literal"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn base_sepolia_resolves_to_documented_addresses() {
        let network = resolve(84532);
        assert_eq!(network.chain_id, 84532);
        assert_eq!(
            network.contract_address,
            Address::from_str("0xA9f2C892DB67585ce6B3BC519F1B69c6B42B2937").unwrap()
        );
        assert_eq!(
            network.token(TokenSymbol::Usdc).address,
            Address::from_str("0x036CbD53842c5426634e7929541eC2318f3dCF7e").unwrap()
        );
        assert_eq!(
            network.token(TokenSymbol::Eth).address,
            Address::from_str("0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE").unwrap()
        );
    }

    #[test]
    fn unknown_chain_falls_back() {
        assert_eq!(lookup(999_999), None);
        assert_eq!(resolve(999_999), FALLBACK);
        assert!(!is_supported(1));
        assert_eq!(resolve(1), BASE_SEPOLIA);
    }

    #[test]
    fn resolve_is_total() {
        for chain_id in [0, 1, 10, 8453, 11_155_111, 84532, 31337, u64::MAX] {
            let network = resolve(chain_id);
            assert!(!network.contract_address.is_zero());
        }
    }

    #[test]
    fn localhost_uses_local_deployment() {
        let network = resolve(LOCALHOST_CHAIN_ID);
        assert_eq!(network.contract_address, SWAP_POOL_LOCALHOST);
        assert_eq!(network.usdc.address, USDC_BASE_SEPOLIA);
    }

    #[test]
    fn token_decimals_match_assets() {
        assert_eq!(BASE_SEPOLIA.usdc.decimals, 6);
        assert_eq!(BASE_SEPOLIA.eth.decimals, 18);
        assert!(BASE_SEPOLIA.eth.is_native());
        assert!(!BASE_SEPOLIA.usdc.is_native());
    }
}
