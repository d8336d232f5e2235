/*
 * RPC client module for reading chain state over JSON-RPC
 */

mod signer;

pub use signer::{LocalSigner, TransactionSigner};

use async_trait::async_trait;
use ethers::providers::{Http, Middleware, Provider};
use ethers::types::{Address, Bytes, TransactionRequest, H256, U256};
use std::sync::Arc;
use tracing::debug;

use crate::models::{BaseSwapError, Result, TxStatus};

/// Read side of the chain: everything that does not need a signature.
#[async_trait]
pub trait ChainReader: Send + Sync {
    async fn chain_id(&self) -> Result<u64>;

    async fn block_number(&self) -> Result<u64>;

    async fn native_balance(&self, account: Address) -> Result<U256>;

    /// Executes `eth_call` against the latest block.
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes>;

    /// Pending while no receipt exists, then confirmed or failed from the receipt status.
    async fn transaction_status(&self, hash: H256) -> Result<TxStatus>;
}

pub struct RpcClient {
    provider: Arc<Provider<Http>>,
    chain_id: u64,
}

impl RpcClient {
    pub async fn new(rpc_url: &str, chain_id: u64) -> Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| BaseSwapError::ConfigError(format!("Failed to create provider: {e}")))?;

        let chain = provider
            .get_chainid()
            .await
            .map_err(|e| BaseSwapError::TransportFailure(format!("Failed to get chain ID: {e}")))?;

        if chain.as_u64() != chain_id {
            return Err(BaseSwapError::ConfigError(format!(
                "Chain ID mismatch: expected {}, got {}",
                chain_id,
                chain.as_u64()
            )));
        }

        Ok(Self {
            provider: Arc::new(provider),
            chain_id,
        })
    }

    #[must_use]
    pub fn provider(&self) -> Arc<Provider<Http>> {
        self.provider.clone()
    }

    #[must_use]
    pub fn configured_chain_id(&self) -> u64 {
        self.chain_id
    }
}

#[async_trait]
impl ChainReader for RpcClient {
    async fn chain_id(&self) -> Result<u64> {
        let chain = self
            .provider
            .get_chainid()
            .await
            .map_err(|e| BaseSwapError::TransportFailure(format!("Failed to get chain ID: {e}")))?;
        Ok(chain.as_u64())
    }

    async fn block_number(&self) -> Result<u64> {
        let block = self
            .provider
            .get_block_number()
            .await
            .map_err(|e| BaseSwapError::TransportFailure(format!("Failed to get block number: {e}")))?;
        Ok(block.as_u64())
    }

    async fn native_balance(&self, account: Address) -> Result<U256> {
        self.provider
            .get_balance(account, None)
            .await
            .map_err(|e| BaseSwapError::TransportFailure(format!("Failed to get balance: {e}")))
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        debug!("eth_call to {:?} ({} bytes)", to, data.len());
        let tx = TransactionRequest::new().to(to).data(data);
        self.provider
            .call(&tx.into(), None)
            .await
            .map_err(|e| BaseSwapError::TransportFailure(format!("eth_call failed: {e}")))
    }

    async fn transaction_status(&self, hash: H256) -> Result<TxStatus> {
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(|e| BaseSwapError::TransportFailure(format!("Failed to get receipt: {e}")))?;

        Ok(match receipt {
            None => TxStatus::Pending,
            Some(receipt) if receipt.status.map(|s| s.as_u64()) == Some(1) => TxStatus::Confirmed,
            Some(_) => TxStatus::Failed,
        })
    }
}
