/*
 * Typed ABI schema for the swap pool contract and the ERC-20 token
 */

mod erc20;
mod swap_pool;

pub use erc20::{Approve, BalanceOf};
pub use swap_pool::{AddLiquidity, CollectedFees, GetQuote, Pools, SwapTokens};

use ethers::{
    abi::{decode, encode, ParamType, Token},
    types::{Address, Bytes, U256},
    utils::keccak256,
};

use crate::models::{BaseSwapError, Result};

/// One contract function: its canonical signature, argument encoding and
/// output decoding.
pub trait ContractCall: Send + Sync {
    type Output: Send;

    /// Canonical signature, e.g. `pools(address,address)`.
    const SIGNATURE: &'static str;

    fn arguments(&self) -> Vec<Token>;

    fn output_types() -> Vec<ParamType>;

    fn decode_output(tokens: Vec<Token>) -> Result<Self::Output>;

    fn name() -> &'static str {
        Self::SIGNATURE
            .split_once('(')
            .map_or(Self::SIGNATURE, |(name, _)| name)
    }

    fn selector() -> [u8; 4] {
        let hash = keccak256(Self::SIGNATURE.as_bytes());
        [hash[0], hash[1], hash[2], hash[3]]
    }

    fn calldata(&self) -> Bytes {
        let mut data = Self::selector().to_vec();
        data.extend_from_slice(&encode(&self.arguments()));
        Bytes::from(data)
    }

    fn decode_return(raw: &[u8]) -> Result<Self::Output> {
        let tokens = decode(&Self::output_types(), raw).map_err(|e| {
            BaseSwapError::ContractError(format!("Failed to decode {} output: {e}", Self::name()))
        })?;
        Self::decode_output(tokens)
    }
}

/// Functions that only read state and are executed with `eth_call`.
pub trait ViewCall: ContractCall {}

/// Functions that change state and need a signed transaction.
pub trait WriteCall: ContractCall {
    const PAYABLE: bool;
}

pub(crate) fn next_uint(tokens: &mut std::vec::IntoIter<Token>, what: &str) -> Result<U256> {
    tokens
        .next()
        .and_then(Token::into_uint)
        .ok_or_else(|| BaseSwapError::ContractError(format!("Expected uint256 for {what}")))
}

pub(crate) fn next_bool(tokens: &mut std::vec::IntoIter<Token>, what: &str) -> Result<bool> {
    tokens
        .next()
        .and_then(Token::into_bool)
        .ok_or_else(|| BaseSwapError::ContractError(format!("Expected bool for {what}")))
}

pub(crate) fn address_token(address: Address) -> Token {
    Token::Address(address)
}
