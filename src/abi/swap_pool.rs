/*
 * Swap pool contract functions
 */

use ethers::{
    abi::{ParamType, Token},
    types::{Address, U256},
};

use super::{address_token, next_bool, next_uint, ContractCall, ViewCall, WriteCall};
use crate::models::{PoolState, Result};

/// `pools(tokenA, tokenB) -> (rate, feeBasisPoints, enabled)`
#[derive(Debug, Clone, Copy)]
pub struct Pools {
    pub token_a: Address,
    pub token_b: Address,
}

impl ContractCall for Pools {
    type Output = PoolState;
    const SIGNATURE: &'static str = "pools(address,address)";

    fn arguments(&self) -> Vec<Token> {
        vec![address_token(self.token_a), address_token(self.token_b)]
    }

    fn output_types() -> Vec<ParamType> {
        vec![ParamType::Uint(256), ParamType::Uint(256), ParamType::Bool]
    }

    fn decode_output(tokens: Vec<Token>) -> Result<PoolState> {
        let mut tokens = tokens.into_iter();
        Ok(PoolState {
            rate: next_uint(&mut tokens, "rate")?,
            fee_basis_points: next_uint(&mut tokens, "feeBasisPoints")?,
            enabled: next_bool(&mut tokens, "enabled")?,
        })
    }
}

impl ViewCall for Pools {}

/// `collectedFees(token) -> uint256`
#[derive(Debug, Clone, Copy)]
pub struct CollectedFees {
    pub token: Address,
}

impl ContractCall for CollectedFees {
    type Output = U256;
    const SIGNATURE: &'static str = "collectedFees(address)";

    fn arguments(&self) -> Vec<Token> {
        vec![address_token(self.token)]
    }

    fn output_types() -> Vec<ParamType> {
        vec![ParamType::Uint(256)]
    }

    fn decode_output(tokens: Vec<Token>) -> Result<U256> {
        next_uint(&mut tokens.into_iter(), "collectedFees")
    }
}

impl ViewCall for CollectedFees {}

/// `getQuote(tokenIn, tokenOut, amountIn) -> amountOut`
#[derive(Debug, Clone, Copy)]
pub struct GetQuote {
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: U256,
}

impl ContractCall for GetQuote {
    type Output = U256;
    const SIGNATURE: &'static str = "getQuote(address,address,uint256)";

    fn arguments(&self) -> Vec<Token> {
        vec![
            address_token(self.token_in),
            address_token(self.token_out),
            Token::Uint(self.amount_in),
        ]
    }

    fn output_types() -> Vec<ParamType> {
        vec![ParamType::Uint(256)]
    }

    fn decode_output(tokens: Vec<Token>) -> Result<U256> {
        next_uint(&mut tokens.into_iter(), "amountOut")
    }
}

impl ViewCall for GetQuote {}

/// `swapTokens(tokenIn, tokenOut, amountIn, minAmountOut)`, payable for native input.
#[derive(Debug, Clone, Copy)]
pub struct SwapTokens {
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: U256,
    pub min_amount_out: U256,
}

impl ContractCall for SwapTokens {
    type Output = ();
    const SIGNATURE: &'static str = "swapTokens(address,address,uint256,uint256)";

    fn arguments(&self) -> Vec<Token> {
        vec![
            address_token(self.token_in),
            address_token(self.token_out),
            Token::Uint(self.amount_in),
            Token::Uint(self.min_amount_out),
        ]
    }

    fn output_types() -> Vec<ParamType> {
        Vec::new()
    }

    fn decode_output(_tokens: Vec<Token>) -> Result<()> {
        Ok(())
    }
}

impl WriteCall for SwapTokens {
    const PAYABLE: bool = true;
}

/// `addLiquidity(tokenA, tokenB, amountA, amountB)`, payable for the native amount.
#[derive(Debug, Clone, Copy)]
pub struct AddLiquidity {
    pub token_a: Address,
    pub token_b: Address,
    pub amount_a: U256,
    pub amount_b: U256,
}

impl ContractCall for AddLiquidity {
    type Output = ();
    const SIGNATURE: &'static str = "addLiquidity(address,address,uint256,uint256)";

    fn arguments(&self) -> Vec<Token> {
        vec![
            address_token(self.token_a),
            address_token(self.token_b),
            Token::Uint(self.amount_a),
            Token::Uint(self.amount_b),
        ]
    }

    fn output_types() -> Vec<ParamType> {
        Vec::new()
    }

    fn decode_output(_tokens: Vec<Token>) -> Result<()> {
        Ok(())
    }
}

impl WriteCall for AddLiquidity {
    const PAYABLE: bool = true;
}
