/*
 * Application shell: tab navigation and composition of session, adapter and panels
 */

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::{
    config::Config,
    contract::ContractAdapter,
    models::{BaseSwapError, Result},
    refresh::BlockWatcher,
    registry::{self, NetworkDescriptor},
    rpc::{ChainReader, RpcClient},
    session::{LocalWalletConnector, SessionContext, WalletConnector, WalletSession},
    views::{PoolPanel, SwapPanel},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Swap,
    Pool,
}

impl std::str::FromStr for Tab {
    type Err = BaseSwapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "swap" => Ok(Tab::Swap),
            "pool" => Ok(Tab::Pool),
            _ => Err(BaseSwapError::ConfigError(format!("Unknown tab: {s}"))),
        }
    }
}

pub struct SwapApp {
    session: WalletSession,
    adapter: ContractAdapter,
    active_tab: Tab,
    block: Option<u64>,
    swap: SwapPanel,
    pool: PoolPanel,
}

impl SwapApp {
    /// Connects to the configured RPC endpoint and builds the shell around it.
    pub async fn new(config: &Config) -> Result<(Self, BlockWatcher)> {
        info!("Initializing BaseSwap client");

        let rpc = Arc::new(RpcClient::new(&config.chain.rpc_url, config.chain.chain_id).await?);
        info!("Connected to RPC for chain {}", config.chain.chain_id);

        let connector: Arc<dyn WalletConnector> = Arc::new(LocalWalletConnector::new(
            rpc.clone(),
            config.wallet.private_key.clone(),
        ));
        let reader: Arc<dyn ChainReader> = rpc;
        let watcher = BlockWatcher::new(reader.clone(), config.chain.block_poll_interval());

        let app = Self::with_parts(
            reader,
            connector,
            registry::resolve(config.chain.chain_id),
            &config.trading.default_slippage,
        )?;
        Ok((app, watcher))
    }

    pub fn with_parts(
        reader: Arc<dyn ChainReader>,
        connector: Arc<dyn WalletConnector>,
        network: NetworkDescriptor,
        default_slippage: &str,
    ) -> Result<Self> {
        Ok(Self {
            session: WalletSession::new(connector, network),
            adapter: ContractAdapter::new(reader),
            active_tab: Tab::default(),
            block: None,
            swap: SwapPanel::new(default_slippage)?,
            pool: PoolPanel::new(),
        })
    }

    #[must_use]
    pub fn session(&self) -> &WalletSession {
        &self.session
    }

    #[must_use]
    pub fn context(&self) -> SessionContext {
        self.session.context()
    }

    #[must_use]
    pub fn adapter(&self) -> &ContractAdapter {
        &self.adapter
    }

    #[must_use]
    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    #[must_use]
    pub fn block(&self) -> Option<u64> {
        self.block
    }

    #[must_use]
    pub fn swap(&self) -> &SwapPanel {
        &self.swap
    }

    pub fn swap_mut(&mut self) -> &mut SwapPanel {
        &mut self.swap
    }

    #[must_use]
    pub fn pool(&self) -> &PoolPanel {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut PoolPanel {
        &mut self.pool
    }

    /// Switches tabs and refreshes the newly shown panel at the current block.
    pub async fn select_tab(&mut self, tab: Tab) {
        if self.active_tab == tab {
            return;
        }
        self.active_tab = tab;
        if let Some(block) = self.block {
            self.refresh_active(block).await;
        }
    }

    pub async fn connect(&mut self) -> Result<SessionContext> {
        let ctx = self.session.connect().await?;
        if let Some(block) = self.block {
            self.refresh_active(block).await;
        }
        Ok(ctx)
    }

    pub fn disconnect(&mut self) -> bool {
        let closed = self.session.disconnect();
        if closed {
            self.swap.reset_reads();
            self.pool.reset_reads();
        }
        closed
    }

    /// Handles a new block height: reissue every read of the active tab and
    /// advance submitted transactions.
    pub async fn on_block(&mut self, block: u64) {
        if self.block.is_some_and(|b| b >= block) {
            return;
        }
        self.block = Some(block);
        debug!("Refreshing {:?} tab at block {}", self.active_tab, block);
        self.refresh_active(block).await;
        self.swap.poll_transaction().await;

        // the pool tab advances its own deposit while shown
        if self.active_tab == Tab::Swap && self.pool.liquidity().phase().in_flight() {
            let ctx = self.session.context();
            self.pool.liquidity_mut().advance(&ctx, &self.adapter).await;
        }
    }

    async fn refresh_active(&mut self, block: u64) {
        let ctx = self.session.context();
        match self.active_tab {
            Tab::Swap => self.swap.refresh(&ctx, &self.adapter, block).await,
            Tab::Pool => self.pool.refresh(&ctx, &self.adapter, block).await,
        }
    }

    /// Re-quotes the swap input at the current block after the input changed.
    pub async fn requote(&mut self) {
        if let Some(block) = self.block {
            let ctx = self.session.context();
            self.swap.refresh_quote(&ctx, &self.adapter, block).await;
        }
    }
}

/// Feeds every new block height from the watcher into the app.
pub async fn run_refresh_loop(app: Arc<RwLock<SwapApp>>, watcher: BlockWatcher) {
    let mut heights = watcher.subscribe();
    tokio::spawn(watcher.run());

    while heights.changed().await.is_ok() {
        let height = *heights.borrow_and_update();
        if let Some(block) = height {
            app.write().await.on_block(block).await;
        }
    }
    info!("Block watcher stopped, refresh loop exiting");
}
