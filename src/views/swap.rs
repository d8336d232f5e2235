/*
 * Swap panel: direction, amounts, slippage, quote and swap submission
 */

use ethers::types::U256;
use serde::Serialize;
use tracing::{debug, info};

use super::{ensure_ready, panel_status, Balances, PanelStatus};
use crate::abi::{GetQuote, Pools, SwapTokens};
use crate::contract::ContractAdapter;
use crate::models::{
    BaseSwapError, PoolState, Result, SwapDirection, SwapQuote, TokenSymbol, TxStatus, TxView,
    RATE_SCALE_DECIMALS,
};
use crate::refresh::LatestByBlock;
use crate::registry::NetworkDescriptor;
use crate::session::SessionContext;
use crate::tx::{self, TransactionHandle};
use crate::units;

pub const SLIPPAGE_PRESETS: [&str; 3] = ["0.5", "1.0", "3.0"];

#[derive(Debug)]
pub struct SwapPanel {
    direction: SwapDirection,
    from_amount: String,
    slippage: String,
    slippage_bps: u32,
    block: Option<u64>,
    pool: LatestByBlock<PoolState>,
    balances: Balances,
    quote: Option<SwapQuote>,
    last_tx: Option<TransactionHandle>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SwapView {
    pub status: PanelStatus,
    pub direction: SwapDirection,
    pub from_token: TokenSymbol,
    pub to_token: TokenSymbol,
    pub from_amount: String,
    pub to_amount: String,
    pub from_balance: String,
    pub to_balance: String,
    pub exchange_rate: String,
    pub rate_line: String,
    pub pool_status: Option<&'static str>,
    pub slippage: String,
    pub slippage_presets: [&'static str; 3],
    pub min_amount_out: Option<String>,
    pub can_swap: bool,
    pub button_label: String,
    pub block: Option<u64>,
    pub transaction: TxView,
}

impl SwapPanel {
    pub fn new(default_slippage: &str) -> Result<Self> {
        let slippage_bps = units::parse_slippage_bps(default_slippage)?;
        Ok(Self {
            direction: SwapDirection::UsdcToEth,
            from_amount: String::new(),
            slippage: default_slippage.to_string(),
            slippage_bps,
            block: None,
            pool: LatestByBlock::new(),
            balances: Balances::default(),
            quote: None,
            last_tx: None,
        })
    }

    #[must_use]
    pub fn direction(&self) -> SwapDirection {
        self.direction
    }

    #[must_use]
    pub fn from_amount(&self) -> &str {
        &self.from_amount
    }

    #[must_use]
    pub fn pool(&self) -> Option<&PoolState> {
        self.block.and_then(|b| self.pool.at(b))
    }

    #[must_use]
    pub fn last_transaction(&self) -> Option<&TransactionHandle> {
        self.last_tx.as_ref()
    }

    pub fn set_from_amount(&mut self, value: &str) {
        let value = value.trim();
        if self.from_amount != value {
            self.from_amount = value.to_string();
            self.quote = None;
        }
    }

    /// Flips the direction and clears the entered amount.
    pub fn toggle_direction(&mut self) {
        self.direction = self.direction.toggled();
        self.from_amount.clear();
        self.quote = None;
    }

    pub fn set_direction(&mut self, direction: SwapDirection) {
        if self.direction != direction {
            self.toggle_direction();
        }
    }

    pub fn set_slippage(&mut self, percent: &str) -> Result<()> {
        self.slippage_bps = units::parse_slippage_bps(percent)?;
        self.slippage = percent.trim().to_string();
        Ok(())
    }

    /// Fills the input with the whole balance of the input token.
    pub fn set_max(&mut self, network: &NetworkDescriptor) {
        let max = self.balances.max_input(self.direction.input(), network);
        self.set_from_amount(&max);
    }

    /// The entered amount in base units; `None` while the input is empty.
    pub fn amount_in(&self, network: &NetworkDescriptor) -> Result<Option<U256>> {
        if self.from_amount.is_empty() {
            return Ok(None);
        }
        let decimals = network.token(self.direction.input()).decimals;
        units::to_base_units(&self.from_amount, decimals).map(Some)
    }

    fn positive_amount_in(&self, network: &NetworkDescriptor) -> Option<U256> {
        self.amount_in(network).ok().flatten().filter(|a| !a.is_zero())
    }

    /// Re-reads pool state, balances and the quote for a new block.
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
        let (pool, ()) = tokio::join!(
            adapter.read(network.contract_address, &pools),
            self.balances.refresh(ctx, adapter, block),
        );
        if let Some(pool) = pool {
            self.pool.apply(block, pool);
        }

        self.refresh_quote(ctx, adapter, block).await;
    }

    /// Asks the contract for a quote of the current input at `block`.
    pub async fn refresh_quote(&mut self, ctx: &SessionContext, adapter: &ContractAdapter, block: u64) {
        let network = ctx.network;
        let Some(amount_in) = self.positive_amount_in(&network) else {
            self.quote = None;
            return;
        };
        let direction = self.direction;
        let call = GetQuote {
            token_in: network.token(direction.input()).address,
            token_out: network.token(direction.output()).address,
            amount_in,
        };
        match adapter.read(network.contract_address, &call).await {
            Some(amount_out) => {
                debug!("Quote {:?} {} -> {} at block {}", direction, amount_in, amount_out, block);
                let newer_held = self
                    .quote
                    .is_some_and(|q| q.block > block && q.is_valid_for(direction, amount_in, q.block));
                if !newer_held {
                    self.quote = Some(SwapQuote {
                        direction,
                        amount_in,
                        amount_out,
                        block,
                    });
                }
            }
            None => self.quote = None,
        }
    }

    /// Expected output in base units: the contract quote when it matches the
    /// current input and block, otherwise the estimate from the pool rate.
    #[must_use]
    pub fn expected_output(&self, network: &NetworkDescriptor) -> Option<U256> {
        let amount_in = self.positive_amount_in(network)?;
        let block = self.block?;
        let pool = self.pool.at(block)?;
        if !pool.is_tradable() {
            return None;
        }
        if let Some(quote) = self.quote.filter(|q| q.is_valid_for(self.direction, amount_in, block)) {
            return Some(quote.amount_out);
        }
        pool.estimate_output(
            self.direction,
            amount_in,
            network.token(self.direction.input()).decimals,
            network.token(self.direction.output()).decimals,
        )
    }

    #[must_use]
    pub fn min_amount_out(&self, network: &NetworkDescriptor) -> Option<U256> {
        self.expected_output(network)
            .map(|out| units::apply_slippage(out, self.slippage_bps))
    }

    /// Pool rate with 8 places, `"0"` when the pool is disabled or unknown.
    #[must_use]
    pub fn exchange_rate(&self) -> String {
        match self.pool().filter(|p| p.is_tradable()) {
            Some(pool) => units::format_fixed(pool.rate, RATE_SCALE_DECIMALS, 8),
            None => "0".to_string(),
        }
    }

    fn rate_line(&self) -> String {
        let rate = self.pool().map(PoolState::effective_rate).unwrap_or_default();
        match self.direction {
            SwapDirection::UsdcToEth => format!("1 USDC = {} ETH", self.exchange_rate()),
            SwapDirection::EthToUsdc if rate.is_zero() => "1 ETH = 0 USDC".to_string(),
            SwapDirection::EthToUsdc => {
                let one = U256::exp10(usize::from(RATE_SCALE_DECIMALS));
                let inverse = one
                    .checked_mul(one)
                    .map(|scaled| scaled / rate)
                    .unwrap_or_default();
                format!(
                    "1 ETH = {} USDC",
                    units::format_fixed(inverse, RATE_SCALE_DECIMALS, 2)
                )
            }
        }
    }

    fn tx_pending(&self) -> bool {
        self.last_tx
            .as_ref()
            .is_some_and(|t| t.status() == TxStatus::Pending)
    }

    #[must_use]
    pub fn can_swap(&self, ctx: &SessionContext) -> bool {
        panel_status(ctx) == PanelStatus::Ready
            && !self.tx_pending()
            && self.expected_output(&ctx.network).is_some()
    }

    /// Submits `swapTokens` with the slippage-adjusted minimum output.
    pub async fn swap(&mut self, ctx: &SessionContext, adapter: &ContractAdapter) -> Result<TxView> {
        ensure_ready(ctx)?;
        if self.tx_pending() {
            return Err(BaseSwapError::ContractError(
                "a swap is already pending".to_string(),
            ));
        }
        let network = ctx.network;
        let amount_in = self
            .amount_in(&network)?
            .filter(|a| !a.is_zero())
            .ok_or_else(|| BaseSwapError::InvalidAmount("enter an amount to swap".to_string()))?;
        let min_amount_out = self
            .min_amount_out(&network)
            .ok_or_else(|| BaseSwapError::ContractError("pool inactive".to_string()))?;

        let token_in = network.token(self.direction.input());
        let token_out = network.token(self.direction.output());
        let call = SwapTokens {
            token_in: token_in.address,
            token_out: token_out.address,
            amount_in,
            min_amount_out,
        };
        let value = token_in.is_native().then_some(amount_in);

        info!(
            "Swapping {} {} for at least {} {}",
            units::from_base_units(amount_in, token_in.decimals),
            token_in.symbol,
            units::from_base_units(min_amount_out, token_out.decimals),
            token_out.symbol
        );
        let handle = adapter
            .submit(ctx, network.contract_address, &call, value)
            .await?;
        let view = handle.view();
        self.last_tx = Some(handle);
        Ok(view)
    }

    /// Advances the last swap transaction, if one is pending.
    pub async fn poll_transaction(&mut self) {
        if let Some(handle) = self.last_tx.as_mut() {
            handle.poll().await;
        }
    }

    /// Drops everything read for the previous session.
    pub fn reset_reads(&mut self) {
        self.pool.clear();
        self.balances.clear();
        self.quote = None;
        self.block = None;
    }

    #[must_use]
    pub fn render(&self, ctx: &SessionContext) -> SwapView {
        let network = ctx.network;
        let from = self.direction.input();
        let to = self.direction.output();
        let can_swap = self.can_swap(ctx);
        let exchange_rate = self.exchange_rate();

        let button_label = if self.tx_pending() {
            "Swapping...".to_string()
        } else if exchange_rate == "0" {
            "Pool Inactive".to_string()
        } else {
            format!("Swap {from} to {to}")
        };

        SwapView {
            status: panel_status(ctx),
            direction: self.direction,
            from_token: from,
            to_token: to,
            from_amount: self.from_amount.clone(),
            to_amount: self
                .expected_output(&network)
                .map(|out| units::from_base_units(out, network.token(to).decimals))
                .unwrap_or_default(),
            from_balance: self.balances.display(from, &network),
            to_balance: self.balances.display(to, &network),
            rate_line: self.rate_line(),
            exchange_rate,
            pool_status: self
                .pool()
                .map(|p| if p.enabled { "Active" } else { "Inactive" }),
            slippage: self.slippage.clone(),
            slippage_presets: SLIPPAGE_PRESETS,
            min_amount_out: self
                .min_amount_out(&network)
                .map(|out| units::from_base_units(out, network.token(to).decimals)),
            can_swap,
            button_label,
            block: self.block,
            transaction: tx::slot_view(self.last_tx.as_ref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::BASE_SEPOLIA;

    #[test]
    fn toggling_clears_the_input() {
        let mut panel = SwapPanel::new("0.5").unwrap();
        panel.set_from_amount("10");
        panel.toggle_direction();
        assert_eq!(panel.direction(), SwapDirection::EthToUsdc);
        assert_eq!(panel.from_amount(), "");
    }

    #[test]
    fn amount_uses_input_token_decimals() {
        let mut panel = SwapPanel::new("0.5").unwrap();
        panel.set_from_amount("1.5");
        assert_eq!(panel.amount_in(&BASE_SEPOLIA).unwrap(), Some(U256::from(1_500_000)));
        panel.set_direction(SwapDirection::EthToUsdc);
        panel.set_from_amount("1.5");
        assert_eq!(
            panel.amount_in(&BASE_SEPOLIA).unwrap(),
            Some(U256::from(1_500_000_000_000_000_000u128))
        );
    }

    #[test]
    fn over_precise_input_is_invalid() {
        let mut panel = SwapPanel::new("0.5").unwrap();
        panel.set_from_amount("1.0000001");
        assert!(matches!(
            panel.amount_in(&BASE_SEPOLIA),
            Err(BaseSwapError::InvalidAmount(_))
        ));
        assert_eq!(panel.expected_output(&BASE_SEPOLIA), None);
    }

    #[test]
    fn padded_input_keeps_the_quote() {
        let mut panel = SwapPanel::new("0.5").unwrap();
        panel.set_from_amount("10");
        let quote = SwapQuote {
            direction: SwapDirection::UsdcToEth,
            amount_in: U256::from(10_000_000),
            amount_out: U256::from(4_000_000_000_000_000u64),
            block: 7,
        };
        panel.quote = Some(quote);

        panel.set_from_amount(" 10 ");
        assert_eq!(panel.from_amount(), "10");
        assert_eq!(panel.quote, Some(quote));

        panel.set_from_amount("11");
        assert_eq!(panel.quote, None);
    }

    #[test]
    fn unknown_pool_shows_zero_rate() {
        let panel = SwapPanel::new("0.5").unwrap();
        assert_eq!(panel.exchange_rate(), "0");
    }

    #[test]
    fn slippage_must_parse() {
        let mut panel = SwapPanel::new("0.5").unwrap();
        assert!(panel.set_slippage("3.0").is_ok());
        assert!(panel.set_slippage("oops").is_err());
        assert!(SwapPanel::new("150").is_err());
    }
}
