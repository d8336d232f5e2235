/*
 * Transaction signing for write calls
 */

use async_trait::async_trait;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, Bytes, TransactionRequest, H256, U256};
use tracing::info;

use super::RpcClient;
use crate::models::{BaseSwapError, Result};

/// Write side of the chain: submits signed transactions for one account.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    fn address(&self) -> Address;

    fn chain_id(&self) -> u64;

    /// Signs and broadcasts a call. Returns as soon as the node accepted it.
    async fn send_transaction(&self, to: Address, data: Bytes, value: Option<U256>) -> Result<H256>;
}

/// Signs with a private key held in memory.
pub struct LocalSigner {
    client: SignerMiddleware<Provider<Http>, LocalWallet>,
    chain_id: u64,
}

impl LocalSigner {
    pub fn new(rpc: &RpcClient, private_key: &str) -> Result<Self> {
        let chain_id = rpc.configured_chain_id();
        let wallet = private_key
            .trim()
            .parse::<LocalWallet>()
            .map_err(|e| BaseSwapError::ConfigError(format!("Invalid wallet private key: {e}")))?
            .with_chain_id(chain_id);

        let provider: Provider<Http> = rpc.provider().as_ref().clone();
        info!("Local signer ready for {:?} on chain {}", wallet.address(), chain_id);

        Ok(Self {
            client: SignerMiddleware::new(provider, wallet),
            chain_id,
        })
    }
}

#[async_trait]
impl TransactionSigner for LocalSigner {
    fn address(&self) -> Address {
        self.client.address()
    }

    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn send_transaction(&self, to: Address, data: Bytes, value: Option<U256>) -> Result<H256> {
        let mut tx = TransactionRequest::new()
            .from(self.client.address())
            .to(to)
            .data(data);
        if let Some(value) = value {
            tx = tx.value(value);
        }

        let pending = self
            .client
            .send_transaction(tx, None)
            .await
            .map_err(|e| BaseSwapError::TransportFailure(format!("Failed to send transaction: {e}")))?;

        Ok(pending.tx_hash())
    }
}
