/*
 * Headless view models for the swap, pool, liquidity and wallet panels
 */

pub mod liquidity;
pub mod pool;
pub mod swap;
pub mod wallet;

pub use liquidity::{AddLiquidityPanel, LiquidityPhase, LiquidityStage, LiquidityView};
pub use pool::{PoolPanel, PoolTab, PoolView};
pub use swap::{SwapPanel, SwapView, SLIPPAGE_PRESETS};

use ethers::types::U256;
use serde::Serialize;
use tracing::warn;

use crate::abi::BalanceOf;
use crate::contract::ContractAdapter;
use crate::models::{BaseSwapError, PoolState, Result, TokenSymbol};
use crate::refresh::LatestByBlock;
use crate::registry::NetworkDescriptor;
use crate::session::SessionContext;
use crate::units;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PanelStatus {
    Disconnected,
    WrongNetwork { expected: u64, actual: Option<u64> },
    Ready,
}

#[must_use]
pub fn panel_status(ctx: &SessionContext) -> PanelStatus {
    if !ctx.is_connected() {
        PanelStatus::Disconnected
    } else if !ctx.on_expected_network() {
        PanelStatus::WrongNetwork {
            expected: ctx.network.chain_id,
            actual: ctx.chain_id,
        }
    } else {
        PanelStatus::Ready
    }
}

/// Fails unless the session may send transactions to the resolved deployment.
pub(crate) fn ensure_ready(ctx: &SessionContext) -> Result<()> {
    match panel_status(ctx) {
        PanelStatus::Ready => Ok(()),
        PanelStatus::Disconnected => Err(BaseSwapError::NoWalletSession),
        PanelStatus::WrongNetwork { expected, actual } => {
            Err(BaseSwapError::WrongNetwork { expected, actual })
        }
    }
}

/// Display places used for each token's balances.
#[must_use]
pub fn balance_places(symbol: TokenSymbol) -> u8 {
    match symbol {
        TokenSymbol::Usdc => 2,
        TokenSymbol::Eth => 4,
    }
}

/// `1 USDC = x ETH` with the pool rate, zero when the pool is disabled.
#[must_use]
pub fn rate_line(pool: Option<&PoolState>, places: u8) -> String {
    let rate = pool.map(PoolState::effective_rate).unwrap_or_default();
    format!(
        "1 USDC = {} ETH",
        units::format_fixed(rate, crate::models::RATE_SCALE_DECIMALS, places)
    )
}

/// Wallet balances of both traded tokens, scoped to the block they were read at.
#[derive(Debug, Default, Clone)]
pub(crate) struct Balances {
    usdc: LatestByBlock<U256>,
    eth: LatestByBlock<U256>,
}

impl Balances {
    pub(crate) async fn refresh(
        &mut self,
        ctx: &SessionContext,
        adapter: &ContractAdapter,
        block: u64,
    ) {
        let Some(account) = ctx.account else {
            return;
        };
        let reader = adapter.reader();
        let usdc_call = BalanceOf { account };
        let (usdc, eth) = tokio::join!(
            adapter.read(ctx.network.usdc.address, &usdc_call),
            reader.native_balance(account),
        );

        if let Some(usdc) = usdc {
            self.usdc.apply(block, usdc);
        }
        match eth {
            Ok(eth) => {
                self.eth.apply(block, eth);
            }
            Err(e) => warn!("Native balance read for {:?} failed: {}", account, e),
        }
    }

    pub(crate) fn get(&self, symbol: TokenSymbol) -> U256 {
        let slot = match symbol {
            TokenSymbol::Usdc => &self.usdc,
            TokenSymbol::Eth => &self.eth,
        };
        slot.get().copied().unwrap_or_default()
    }

    pub(crate) fn display(&self, symbol: TokenSymbol, network: &NetworkDescriptor) -> String {
        units::format_fixed(
            self.get(symbol),
            network.token(symbol).decimals,
            balance_places(symbol),
        )
    }

    pub(crate) fn max_input(&self, symbol: TokenSymbol, network: &NetworkDescriptor) -> String {
        units::from_base_units(self.get(symbol), network.token(symbol).decimals)
    }

    pub(crate) fn clear(&mut self) {
        self.usdc.clear();
        self.eth.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_line_hides_disabled_pool_rate() {
        let enabled = PoolState {
            rate: U256::from(400_000_000_000_000u64),
            fee_basis_points: U256::from(30),
            enabled: true,
        };
        let disabled = PoolState {
            enabled: false,
            ..enabled
        };
        assert_eq!(rate_line(Some(&enabled), 6), "1 USDC = 0.000400 ETH");
        assert_eq!(rate_line(Some(&disabled), 6), "1 USDC = 0.000000 ETH");
        assert_eq!(rate_line(None, 8), "1 USDC = 0.00000000 ETH");
    }
}
