/*
 * Wallet session: connection state, current account and reported network
 */

use async_trait::async_trait;
use ethers::types::Address;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::models::{BaseSwapError, Result};
use crate::registry::{self, NetworkDescriptor};
use crate::rpc::{LocalSigner, RpcClient, TransactionSigner};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Obtains a signer for the user, e.g. by prompting a wallet.
#[async_trait]
pub trait WalletConnector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn TransactionSigner>>;
}

/// Connects with a private key from the configuration.
pub struct LocalWalletConnector {
    rpc: Arc<RpcClient>,
    private_key: Option<String>,
}

impl LocalWalletConnector {
    #[must_use]
    pub fn new(rpc: Arc<RpcClient>, private_key: Option<String>) -> Self {
        Self { rpc, private_key }
    }
}

#[async_trait]
impl WalletConnector for LocalWalletConnector {
    async fn connect(&self) -> Result<Arc<dyn TransactionSigner>> {
        let key = self
            .private_key
            .as_deref()
            .ok_or_else(|| BaseSwapError::ConfigError("WALLET_PRIVATE_KEY not set".to_string()))?;
        Ok(Arc::new(LocalSigner::new(&self.rpc, key)?))
    }
}

/// Session state handed explicitly to views and the contract adapter.
#[derive(Clone)]
pub struct SessionContext {
    pub state: SessionState,
    pub account: Option<Address>,
    pub chain_id: Option<u64>,
    pub network: NetworkDescriptor,
    signer: Option<Arc<dyn TransactionSigner>>,
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("state", &self.state)
            .field("account", &self.account)
            .field("chain_id", &self.chain_id)
            .field("network", &self.network.name)
            .finish()
    }
}

impl SessionContext {
    #[must_use]
    pub fn disconnected(network: NetworkDescriptor) -> Self {
        Self {
            state: SessionState::Disconnected,
            account: None,
            chain_id: None,
            network,
            signer: None,
        }
    }

    #[must_use]
    pub fn connected(signer: Arc<dyn TransactionSigner>) -> Self {
        let chain_id = signer.chain_id();
        Self {
            state: SessionState::Connected,
            account: Some(signer.address()),
            chain_id: Some(chain_id),
            network: registry::resolve(chain_id),
            signer: Some(signer),
        }
    }

    #[must_use]
    pub fn signer(&self) -> Option<&Arc<dyn TransactionSigner>> {
        match self.state {
            SessionState::Connected => self.signer.as_ref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }

    /// True when the wallet reports the chain the resolved addresses belong to.
    #[must_use]
    pub fn on_expected_network(&self) -> bool {
        self.chain_id == Some(self.network.chain_id)
    }

    #[must_use]
    pub fn view(&self) -> SessionView {
        SessionView {
            state: self.state,
            account: self.account,
            chain_id: self.chain_id,
            network: self.network.name,
            wallet_label: crate::views::wallet::wallet_label(self),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub state: SessionState,
    pub account: Option<Address>,
    pub chain_id: Option<u64>,
    pub network: &'static str,
    pub wallet_label: String,
}

/// Owns the session state machine. Only `connect` and `disconnect` mutate it.
pub struct WalletSession {
    connector: Arc<dyn WalletConnector>,
    default_network: NetworkDescriptor,
    state: watch::Sender<SessionContext>,
}

impl WalletSession {
    #[must_use]
    pub fn new(connector: Arc<dyn WalletConnector>, default_network: NetworkDescriptor) -> Self {
        let (state, _) = watch::channel(SessionContext::disconnected(default_network));
        Self {
            connector,
            default_network,
            state,
        }
    }

    #[must_use]
    pub fn context(&self) -> SessionContext {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().state
    }

    #[must_use]
    pub fn account(&self) -> Option<Address> {
        self.state.borrow().account
    }

    #[must_use]
    pub fn chain_id(&self) -> Option<u64> {
        self.state.borrow().chain_id
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionContext> {
        self.state.subscribe()
    }

    /// disconnected -> connecting -> connected, or back to disconnected when the
    /// connector fails or the user declines. Calls while already connecting or
    /// connected return the current context unchanged.
    pub async fn connect(&self) -> Result<SessionContext> {
        let mut started = false;
        self.state.send_if_modified(|ctx| {
            if ctx.state == SessionState::Disconnected {
                ctx.state = SessionState::Connecting;
                started = true;
            }
            started
        });
        if !started {
            debug!("Connect requested while {:?}, ignoring", self.state());
            return Ok(self.context());
        }

        info!("Connecting wallet");
        match self.connector.connect().await {
            Ok(signer) => {
                let ctx = SessionContext::connected(signer);
                info!(
                    "Wallet connected: {:?} on chain {:?} ({})",
                    ctx.account, ctx.chain_id, ctx.network.name
                );
                if !ctx.on_expected_network() {
                    warn!("Wallet chain {:?} has no swap pool deployment", ctx.chain_id);
                }
                self.state.send_replace(ctx.clone());
                Ok(ctx)
            }
            Err(e) => {
                warn!("Wallet connection failed: {}", e);
                self.state
                    .send_replace(SessionContext::disconnected(self.default_network));
                Err(e)
            }
        }
    }

    /// connected -> disconnected. Returns whether a session was closed.
    pub fn disconnect(&self) -> bool {
        let default_network = self.default_network;
        let closed = self.state.send_if_modified(|ctx| {
            if ctx.state == SessionState::Connected {
                *ctx = SessionContext::disconnected(default_network);
                true
            } else {
                false
            }
        });
        if closed {
            info!("Wallet disconnected");
        }
        closed
    }
}
