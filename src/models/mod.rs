/*
 * Data models, error taxonomy and shared types for the BaseSwap client
 */

use chrono::{DateTime, Utc};
use ethers::types::{Address, H256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::units;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenSymbol {
    Usdc,
    Eth,
}

impl fmt::Display for TokenSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenSymbol::Usdc => write!(f, "USDC"),
            TokenSymbol::Eth => write!(f, "ETH"),
        }
    }
}

impl std::str::FromStr for TokenSymbol {
    type Err = BaseSwapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "usdc" => Ok(TokenSymbol::Usdc),
            "eth" => Ok(TokenSymbol::Eth),
            _ => Err(BaseSwapError::ConfigError(format!("Unknown token symbol: {s}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenInfo {
    pub symbol: TokenSymbol,
    pub address: Address,
    pub decimals: u8,
}

impl TokenInfo {
    #[must_use]
    pub fn is_native(&self) -> bool {
        self.address == crate::registry::NATIVE_TOKEN_SENTINEL
    }
}

/// An on-chain amount together with the decimal count needed to display it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAmount {
    pub raw: U256,
    pub decimals: u8,
}

impl TokenAmount {
    #[must_use]
    pub fn new(raw: U256, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    #[must_use]
    pub fn zero(decimals: u8) -> Self {
        Self::new(U256::zero(), decimals)
    }

    pub fn parse(amount: &str, decimals: u8) -> Result<Self> {
        Ok(Self::new(units::to_base_units(amount, decimals)?, decimals))
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    #[must_use]
    pub fn display(&self, places: u8) -> String {
        units::format_fixed(self.raw, self.decimals, places)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", units::from_base_units(self.raw, self.decimals))
    }
}

/// Fixed-point scale of the pool's exchange rate.
pub const RATE_SCALE_DECIMALS: u8 = 18;

/// Pool configuration as returned by `pools(tokenA, tokenB)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolState {
    pub rate: U256,
    pub fee_basis_points: U256,
    pub enabled: bool,
}

impl PoolState {
    /// Rate usable for pricing: zero whenever the pool is disabled.
    #[must_use]
    pub fn effective_rate(&self) -> U256 {
        if self.enabled {
            self.rate
        } else {
            U256::zero()
        }
    }

    #[must_use]
    pub fn is_tradable(&self) -> bool {
        !self.effective_rate().is_zero()
    }

    /// Local output estimate from the pool rate (USDC priced in ETH, scaled by 1e18).
    ///
    /// USDC -> ETH is `amount * rate / 1e18`, ETH -> USDC is `amount / rate`, both
    /// carried out in base units of the respective tokens. Returns `None` when the
    /// pool is not tradable or the arithmetic overflows.
    #[must_use]
    pub fn estimate_output(
        &self,
        direction: SwapDirection,
        amount_in: U256,
        decimals_in: u8,
        decimals_out: u8,
    ) -> Option<U256> {
        let rate = self.effective_rate();
        if rate.is_zero() {
            return None;
        }
        let scale_in = checked_exp10(decimals_in)?;
        let scale_out = checked_exp10(decimals_out)?;
        let one = checked_exp10(RATE_SCALE_DECIMALS)?;

        match direction {
            SwapDirection::UsdcToEth => {
                let numerator = amount_in.checked_mul(rate)?.checked_mul(scale_out)?;
                let denominator = one.checked_mul(scale_in)?;
                numerator.checked_div(denominator)
            }
            SwapDirection::EthToUsdc => {
                let numerator = amount_in.checked_mul(one)?.checked_mul(scale_out)?;
                let denominator = rate.checked_mul(scale_in)?;
                numerator.checked_div(denominator)
            }
        }
    }
}

fn checked_exp10(n: u8) -> Option<U256> {
    U256::from(10u8).checked_pow(U256::from(n))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SwapDirection {
    UsdcToEth,
    EthToUsdc,
}

impl SwapDirection {
    #[must_use]
    pub fn input(self) -> TokenSymbol {
        match self {
            SwapDirection::UsdcToEth => TokenSymbol::Usdc,
            SwapDirection::EthToUsdc => TokenSymbol::Eth,
        }
    }

    #[must_use]
    pub fn output(self) -> TokenSymbol {
        match self {
            SwapDirection::UsdcToEth => TokenSymbol::Eth,
            SwapDirection::EthToUsdc => TokenSymbol::Usdc,
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            SwapDirection::UsdcToEth => SwapDirection::EthToUsdc,
            SwapDirection::EthToUsdc => SwapDirection::UsdcToEth,
        }
    }
}

impl std::str::FromStr for SwapDirection {
    type Err = BaseSwapError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "usdcToEth" | "usdc_to_eth" => Ok(SwapDirection::UsdcToEth),
            "ethToUsdc" | "eth_to_usdc" => Ok(SwapDirection::EthToUsdc),
            _ => Err(BaseSwapError::InvalidAmount(format!("Unknown swap direction: {s}"))),
        }
    }
}

/// Contract quote for one `(direction, amount_in)` pair at one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapQuote {
    pub direction: SwapDirection,
    pub amount_in: U256,
    pub amount_out: U256,
    pub block: u64,
}

impl SwapQuote {
    #[must_use]
    pub fn is_valid_for(&self, direction: SwapDirection, amount_in: U256, block: u64) -> bool {
        self.direction == direction && self.amount_in == amount_in && self.block == block
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Idle,
    Pending,
    Confirmed,
    Failed,
}

impl TxStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, TxStatus::Confirmed | TxStatus::Failed)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TxView {
    pub hash: Option<H256>,
    pub status: TxStatus,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum BaseSwapError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("No wallet session: connect a wallet before sending transactions")]
    NoWalletSession,

    #[error("Transport failure: {0}")]
    TransportFailure(String),

    #[error("User rejected the request")]
    UserRejected,

    #[error("Wrong network: the pool is deployed on chain {expected}, the wallet is on {actual:?}")]
    WrongNetwork { expected: u64, actual: Option<u64> },

    #[error("Contract interaction error: {0}")]
    ContractError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BaseSwapError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(rate: U256, enabled: bool) -> PoolState {
        PoolState {
            rate,
            fee_basis_points: U256::from(30),
            enabled,
        }
    }

    #[test]
    fn disabled_pool_has_no_rate() {
        let state = pool(U256::exp10(15), false);
        assert!(state.effective_rate().is_zero());
        assert!(!state.is_tradable());
        assert_eq!(
            state.estimate_output(SwapDirection::UsdcToEth, U256::from(1_000_000), 6, 18),
            None
        );
    }

    #[test]
    fn usdc_to_eth_estimate_follows_rate() {
        // 1 USDC = 0.0004 ETH
        let state = pool(U256::from(400_000_000_000_000u64), true);
        let out = state
            .estimate_output(SwapDirection::UsdcToEth, U256::from(2_500_000_000u64), 6, 18)
            .unwrap();
        // 2500 USDC -> 1 ETH
        assert_eq!(out, U256::exp10(18));
    }

    #[test]
    fn eth_to_usdc_estimate_is_inverse_rate() {
        let state = pool(U256::from(400_000_000_000_000u64), true);
        let out = state
            .estimate_output(SwapDirection::EthToUsdc, U256::exp10(18), 18, 6)
            .unwrap();
        assert_eq!(out, U256::from(2_500_000_000u64));
    }

    #[test]
    fn quote_is_scoped_to_inputs_and_block() {
        let quote = SwapQuote {
            direction: SwapDirection::UsdcToEth,
            amount_in: U256::from(10),
            amount_out: U256::from(4),
            block: 7,
        };
        assert!(quote.is_valid_for(SwapDirection::UsdcToEth, U256::from(10), 7));
        assert!(!quote.is_valid_for(SwapDirection::EthToUsdc, U256::from(10), 7));
        assert!(!quote.is_valid_for(SwapDirection::UsdcToEth, U256::from(11), 7));
        assert!(!quote.is_valid_for(SwapDirection::UsdcToEth, U256::from(10), 8));
    }

    #[test]
    fn direction_round_trips_through_toggle() {
        let d = SwapDirection::UsdcToEth;
        assert_eq!(d.toggled().toggled(), d);
        assert_eq!(d.input(), TokenSymbol::Usdc);
        assert_eq!(d.toggled().input(), TokenSymbol::Eth);
        assert_eq!("ethToUsdc".parse::<SwapDirection>().unwrap(), SwapDirection::EthToUsdc);
    }
}
