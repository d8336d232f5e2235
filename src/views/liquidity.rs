/*
 * Add-liquidity panel with an explicit approve-then-deposit protocol
 */

use ethers::types::{H256, U256};
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info, warn};

use super::{ensure_ready, panel_status, rate_line, Balances, PanelStatus};
use crate::abi::{AddLiquidity, Approve, Pools};
use crate::contract::ContractAdapter;
use crate::models::{BaseSwapError, PoolState, Result, TokenSymbol, TxStatus, TxView};
use crate::refresh::LatestByBlock;
use crate::registry::NetworkDescriptor;
use crate::session::SessionContext;
use crate::tx::TransactionHandle;
use crate::units;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LiquidityStage {
    Approval,
    Deposit,
}

/// Progress of one liquidity provision.
///
/// The deposit is only submitted once the USDC approval is confirmed. A failed
/// deposit leaves the approval in place; nothing is rolled back.
#[derive(Debug, Clone)]
pub enum LiquidityPhase {
    Idle,
    AwaitingApproval {
        approval: TransactionHandle,
        usdc: U256,
        eth: U256,
    },
    Depositing {
        approval: H256,
        deposit: TransactionHandle,
    },
    Completed {
        approval: H256,
        deposit: H256,
    },
    Failed {
        stage: LiquidityStage,
        reason: String,
    },
}

impl LiquidityPhase {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            LiquidityPhase::Idle => "idle",
            LiquidityPhase::AwaitingApproval { .. } => "awaitingApproval",
            LiquidityPhase::Depositing { .. } => "depositing",
            LiquidityPhase::Completed { .. } => "completed",
            LiquidityPhase::Failed { .. } => "failed",
        }
    }

    #[must_use]
    pub fn in_flight(&self) -> bool {
        matches!(
            self,
            LiquidityPhase::AwaitingApproval { .. } | LiquidityPhase::Depositing { .. }
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PhaseView {
    pub kind: &'static str,
    pub approval: Option<TxView>,
    pub deposit: Option<TxView>,
    pub failed_stage: Option<LiquidityStage>,
    pub failure: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LiquidityView {
    pub status: PanelStatus,
    pub usdc_amount: String,
    pub eth_amount: String,
    pub usdc_balance: String,
    pub eth_balance: String,
    pub current_ratio: Option<String>,
    pub phase: PhaseView,
    pub can_submit: bool,
    pub button_label: &'static str,
}

#[derive(Debug)]
pub struct AddLiquidityPanel {
    usdc_amount: String,
    eth_amount: String,
    phase: LiquidityPhase,
    pool: LatestByBlock<PoolState>,
    balances: Balances,
}

impl Default for AddLiquidityPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl AddLiquidityPanel {
    #[must_use]
    pub fn new() -> Self {
        Self {
            usdc_amount: String::new(),
            eth_amount: String::new(),
            phase: LiquidityPhase::Idle,
            pool: LatestByBlock::new(),
            balances: Balances::default(),
        }
    }

    #[must_use]
    pub fn phase(&self) -> &LiquidityPhase {
        &self.phase
    }

    pub fn set_usdc_amount(&mut self, value: &str) {
        self.usdc_amount = value.trim().to_string();
    }

    pub fn set_eth_amount(&mut self, value: &str) {
        self.eth_amount = value.trim().to_string();
    }

    pub fn set_max_usdc(&mut self, network: &NetworkDescriptor) {
        self.usdc_amount = self.balances.max_input(TokenSymbol::Usdc, network);
    }

    pub fn set_max_eth(&mut self, network: &NetworkDescriptor) {
        self.eth_amount = self.balances.max_input(TokenSymbol::Eth, network);
    }

    fn amounts(&self, network: &NetworkDescriptor) -> Result<(U256, U256)> {
        let usdc = units::to_base_units(&self.usdc_amount, network.usdc.decimals)?;
        let eth = units::to_base_units(&self.eth_amount, network.eth.decimals)?;
        if usdc.is_zero() || eth.is_zero() {
            return Err(BaseSwapError::InvalidAmount(
                "both amounts must be greater than zero".to_string(),
            ));
        }
        Ok((usdc, eth))
    }

    #[must_use]
    pub fn can_submit(&self, ctx: &SessionContext) -> bool {
        panel_status(ctx) == PanelStatus::Ready
            && !self.phase.in_flight()
            && self.amounts(&ctx.network).is_ok()
    }

    pub async fn refresh(&mut self, ctx: &SessionContext, adapter: &ContractAdapter, block: u64) {
        if !ctx.is_connected() {
            return;
        }
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
    }

    /// Starts the protocol by submitting the USDC approval for the pool contract.
    pub async fn submit(&mut self, ctx: &SessionContext, adapter: &ContractAdapter) -> Result<()> {
        ensure_ready(ctx)?;
        if self.phase.in_flight() {
            return Err(BaseSwapError::ContractError(
                "a liquidity deposit is already in progress".to_string(),
            ));
        }
        let network = ctx.network;
        let (usdc, eth) = self.amounts(&network)?;

        let approve = Approve {
            spender: network.contract_address,
            amount: usdc,
        };
        match adapter.submit(ctx, network.usdc.address, &approve, None).await {
            Ok(approval) => {
                info!(
                    "Approval {:?} submitted for {} USDC",
                    approval.hash(),
                    units::from_base_units(usdc, network.usdc.decimals)
                );
                self.phase = LiquidityPhase::AwaitingApproval { approval, usdc, eth };
                Ok(())
            }
            Err(e) => {
                error!("USDC approval failed: {}", e);
                self.phase = LiquidityPhase::Failed {
                    stage: LiquidityStage::Approval,
                    reason: e.to_string(),
                };
                Err(e)
            }
        }
    }

    /// Moves the protocol forward by at most one step.
    pub async fn advance(&mut self, ctx: &SessionContext, adapter: &ContractAdapter) -> &LiquidityPhase {
        let phase = std::mem::replace(&mut self.phase, LiquidityPhase::Idle);
        self.phase = match phase {
            LiquidityPhase::AwaitingApproval {
                mut approval,
                usdc,
                eth,
            } => match approval.poll().await {
                TxStatus::Confirmed => self.deposit(ctx, adapter, approval.hash(), usdc, eth).await,
                TxStatus::Failed => {
                    warn!("Approval {:?} reverted, deposit not sent", approval.hash());
                    LiquidityPhase::Failed {
                        stage: LiquidityStage::Approval,
                        reason: "approval transaction reverted".to_string(),
                    }
                }
                TxStatus::Pending | TxStatus::Idle => {
                    LiquidityPhase::AwaitingApproval { approval, usdc, eth }
                }
            },
            LiquidityPhase::Depositing {
                approval,
                mut deposit,
            } => match deposit.poll().await {
                TxStatus::Confirmed => {
                    info!("Liquidity added in {:?}", deposit.hash());
                    self.usdc_amount.clear();
                    self.eth_amount.clear();
                    LiquidityPhase::Completed {
                        approval,
                        deposit: deposit.hash(),
                    }
                }
                TxStatus::Failed => {
                    warn!("Deposit {:?} reverted; USDC allowance stays approved", deposit.hash());
                    LiquidityPhase::Failed {
                        stage: LiquidityStage::Deposit,
                        reason: "deposit transaction reverted; the USDC approval remains in place"
                            .to_string(),
                    }
                }
                TxStatus::Pending | TxStatus::Idle => LiquidityPhase::Depositing { approval, deposit },
            },
            other => other,
        };
        &self.phase
    }

    async fn deposit(
        &self,
        ctx: &SessionContext,
        adapter: &ContractAdapter,
        approval: H256,
        usdc: U256,
        eth: U256,
    ) -> LiquidityPhase {
        let network = ctx.network;
        let call = AddLiquidity {
            token_a: network.usdc.address,
            token_b: network.eth.address,
            amount_a: usdc,
            amount_b: eth,
        };
        match adapter
            .submit(ctx, network.contract_address, &call, Some(eth))
            .await
        {
            Ok(deposit) => LiquidityPhase::Depositing { approval, deposit },
            Err(e) => {
                error!("Deposit submission failed after approval {:?}: {}", approval, e);
                LiquidityPhase::Failed {
                    stage: LiquidityStage::Deposit,
                    reason: format!("{e}; the USDC approval remains in place"),
                }
            }
        }
    }

    /// Drives the protocol until it completes or fails.
    pub async fn run(
        &mut self,
        ctx: &SessionContext,
        adapter: &ContractAdapter,
        poll_interval: Duration,
    ) -> &LiquidityPhase {
        while self.phase.in_flight() {
            if !self.advance(ctx, adapter).await.in_flight() {
                break;
            }
            tokio::time::sleep(poll_interval).await;
        }
        &self.phase
    }

    /// Returns a finished protocol to idle so a new deposit can start.
    pub fn reset(&mut self) {
        if !self.phase.in_flight() {
            self.phase = LiquidityPhase::Idle;
        }
    }

    pub fn reset_reads(&mut self) {
        self.pool.clear();
        self.balances.clear();
    }

    fn phase_view(&self) -> PhaseView {
        let mut view = PhaseView {
            kind: self.phase.kind(),
            approval: None,
            deposit: None,
            failed_stage: None,
            failure: None,
        };
        match &self.phase {
            LiquidityPhase::Idle => {}
            LiquidityPhase::AwaitingApproval { approval, .. } => view.approval = Some(approval.view()),
            LiquidityPhase::Depositing { approval, deposit } => {
                view.approval = Some(confirmed_view(*approval));
                view.deposit = Some(deposit.view());
            }
            LiquidityPhase::Completed { approval, deposit } => {
                view.approval = Some(confirmed_view(*approval));
                view.deposit = Some(confirmed_view(*deposit));
            }
            LiquidityPhase::Failed { stage, reason } => {
                view.failed_stage = Some(*stage);
                view.failure = Some(reason.clone());
            }
        }
        view
    }

    #[must_use]
    pub fn render(&self, ctx: &SessionContext) -> LiquidityView {
        let network = ctx.network;
        LiquidityView {
            status: panel_status(ctx),
            usdc_amount: self.usdc_amount.clone(),
            eth_amount: self.eth_amount.clone(),
            usdc_balance: self.balances.display(TokenSymbol::Usdc, &network),
            eth_balance: self.balances.display(TokenSymbol::Eth, &network),
            current_ratio: self.pool.get().map(|p| rate_line(Some(p), 6)),
            phase: self.phase_view(),
            can_submit: self.can_submit(ctx),
            button_label: if self.phase.in_flight() {
                "Adding Liquidity..."
            } else {
                "Add Liquidity"
            },
        }
    }
}

fn confirmed_view(hash: H256) -> TxView {
    TxView {
        hash: Some(hash),
        status: TxStatus::Confirmed,
        updated_at: chrono::Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::BASE_SEPOLIA;

    #[test]
    fn both_amounts_are_required() {
        let mut panel = AddLiquidityPanel::new();
        panel.set_usdc_amount("100");
        assert!(panel.amounts(&BASE_SEPOLIA).is_err());
        panel.set_eth_amount("0");
        assert!(panel.amounts(&BASE_SEPOLIA).is_err());
        panel.set_eth_amount("0.05");
        let (usdc, eth) = panel.amounts(&BASE_SEPOLIA).unwrap();
        assert_eq!(usdc, U256::from(100_000_000u64));
        assert_eq!(eth, U256::from(50_000_000_000_000_000u64));
    }

    #[test]
    fn reset_only_leaves_terminal_phases() {
        let mut panel = AddLiquidityPanel::new();
        panel.phase = LiquidityPhase::Failed {
            stage: LiquidityStage::Approval,
            reason: "reverted".to_string(),
        };
        panel.reset();
        assert_eq!(panel.phase().kind(), "idle");
    }
}
