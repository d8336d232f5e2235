/*
 * Pool panel: pool status, rate, fee and collected fees, plus the add-liquidity tab
 */

use ethers::types::U256;
use serde::{Deserialize, Serialize};

use super::{panel_status, rate_line, AddLiquidityPanel, LiquidityView, PanelStatus};
use crate::abi::{CollectedFees, Pools};
use crate::contract::ContractAdapter;
use crate::models::{BaseSwapError, PoolState, Result};
use crate::refresh::LatestByBlock;
use crate::session::SessionContext;
use crate::units;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PoolTab {
    #[default]
    MyLiquidity,
    PoolInfo,
    AddLiquidity,
}

impl std::str::FromStr for PoolTab {
    type Err = BaseSwapError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "myLiquidity" | "myPools" => Ok(PoolTab::MyLiquidity),
            "poolInfo" | "allPools" => Ok(PoolTab::PoolInfo),
            "addLiquidity" => Ok(PoolTab::AddLiquidity),
            _ => Err(BaseSwapError::ConfigError(format!("Unknown pool tab: {s}"))),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PoolView {
    pub status: PanelStatus,
    pub tab: PoolTab,
    pub enabled: bool,
    pub pool_status: &'static str,
    pub rate: String,
    pub rate_detailed: String,
    pub trading_fee: String,
    pub usdc_fees: String,
    pub eth_fees: String,
    pub contract_address: String,
    pub network: &'static str,
    pub chain_id: u64,
    pub block: Option<u64>,
    pub hint: Option<&'static str>,
    pub liquidity: Option<LiquidityView>,
}

#[derive(Debug, Default)]
pub struct PoolPanel {
    tab: PoolTab,
    block: Option<u64>,
    pool: LatestByBlock<PoolState>,
    usdc_fees: LatestByBlock<U256>,
    eth_fees: LatestByBlock<U256>,
    liquidity: AddLiquidityPanel,
}

impl PoolPanel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn tab(&self) -> PoolTab {
        self.tab
    }

    pub fn select_tab(&mut self, tab: PoolTab) {
        self.tab = tab;
    }

    #[must_use]
    pub fn liquidity(&self) -> &AddLiquidityPanel {
        &self.liquidity
    }

    pub fn liquidity_mut(&mut self) -> &mut AddLiquidityPanel {
        &mut self.liquidity
    }

    /// Pool state read at the latest block, or the all-zero disabled state.
    #[must_use]
    pub fn pool_state(&self) -> PoolState {
        self.block
            .and_then(|b| self.pool.at(b))
            .copied()
            .unwrap_or_default()
    }

    pub async fn refresh(&mut self, ctx: &SessionContext, adapter: &ContractAdapter, block: u64) {
        if !ctx.is_connected() {
            return;
        }
        self.block = Some(block.max(self.block.unwrap_or_default()));

        let network = ctx.network;
        let pools = Pools {
            token_a: network.usdc.address,
            token_b: network.eth.address,
        };
        let usdc_fees = CollectedFees {
            token: network.usdc.address,
        };
        let eth_fees = CollectedFees {
            token: network.eth.address,
        };
        let (pool, usdc, eth, ()) = tokio::join!(
            adapter.read(network.contract_address, &pools),
            adapter.read(network.contract_address, &usdc_fees),
            adapter.read(network.contract_address, &eth_fees),
            self.liquidity.refresh(ctx, adapter, block),
        );

        if let Some(pool) = pool {
            self.pool.apply(block, pool);
        }
        if let Some(usdc) = usdc {
            self.usdc_fees.apply(block, usdc);
        }
        if let Some(eth) = eth {
            self.eth_fees.apply(block, eth);
        }

        if self.liquidity.phase().in_flight() {
            self.liquidity.advance(ctx, adapter).await;
        }
    }

    pub fn reset_reads(&mut self) {
        self.pool.clear();
        self.usdc_fees.clear();
        self.eth_fees.clear();
        self.block = None;
        self.liquidity.reset_reads();
    }

    #[must_use]
    pub fn render(&self, ctx: &SessionContext) -> PoolView {
        let network = ctx.network;
        let pool = self.pool_state();
        let fees = |slot: &LatestByBlock<U256>| slot.get().copied().unwrap_or_default();

        PoolView {
            status: panel_status(ctx),
            tab: self.tab,
            enabled: pool.enabled,
            pool_status: if pool.enabled { "Active" } else { "Inactive" },
            rate: rate_line(Some(&pool), 6),
            rate_detailed: rate_line(Some(&pool), 8),
            trading_fee: units::format_basis_points(pool.fee_basis_points),
            usdc_fees: units::format_fixed(fees(&self.usdc_fees), network.usdc.decimals, 4),
            eth_fees: units::format_fixed(fees(&self.eth_fees), network.eth.decimals, 6),
            contract_address: units::truncate_address(&network.contract_address, 6),
            network: network.name,
            chain_id: network.chain_id,
            block: self.block,
            hint: (!pool.enabled).then_some("Add liquidity to the pool to enable swapping"),
            liquidity: (self.tab == PoolTab::AddLiquidity).then(|| self.liquidity.render(ctx)),
        }
    }
}
