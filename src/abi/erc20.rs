/*
 * ERC-20 token functions used by the client
 */

use ethers::{
    abi::{ParamType, Token},
    types::{Address, U256},
};

use super::{address_token, next_bool, next_uint, ContractCall, ViewCall, WriteCall};
use crate::models::Result;

/// `approve(spender, amount) -> bool`
#[derive(Debug, Clone, Copy)]
pub struct Approve {
    pub spender: Address,
    pub amount: U256,
}

impl ContractCall for Approve {
    type Output = bool;
    const SIGNATURE: &'static str = "approve(address,uint256)";

    fn arguments(&self) -> Vec<Token> {
        vec![address_token(self.spender), Token::Uint(self.amount)]
    }

    fn output_types() -> Vec<ParamType> {
        vec![ParamType::Bool]
    }

    fn decode_output(tokens: Vec<Token>) -> Result<bool> {
        next_bool(&mut tokens.into_iter(), "approve")
    }
}

impl WriteCall for Approve {
    const PAYABLE: bool = false;
}

/// `balanceOf(account) -> uint256`
#[derive(Debug, Clone, Copy)]
pub struct BalanceOf {
    pub account: Address,
}

impl ContractCall for BalanceOf {
    type Output = U256;
    const SIGNATURE: &'static str = "balanceOf(address)";

    fn arguments(&self) -> Vec<Token> {
        vec![address_token(self.account)]
    }

    fn output_types() -> Vec<ParamType> {
        vec![ParamType::Uint(256)]
    }

    fn decode_output(tokens: Vec<Token>) -> Result<U256> {
        next_uint(&mut tokens.into_iter(), "balanceOf")
    }
}

impl ViewCall for BalanceOf {}
