/*
 * Contract call adapter: read path over eth_call, write path over the session signer
 */

use ethers::types::{Address, U256};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::abi::{ViewCall, WriteCall};
use crate::models::{BaseSwapError, Result};
use crate::rpc::ChainReader;
use crate::session::SessionContext;
use crate::tx::TransactionHandle;

#[derive(Clone)]
pub struct ContractAdapter {
    reader: Arc<dyn ChainReader>,
}

impl ContractAdapter {
    #[must_use]
    pub fn new(reader: Arc<dyn ChainReader>) -> Self {
        Self { reader }
    }

    #[must_use]
    pub fn reader(&self) -> Arc<dyn ChainReader> {
        self.reader.clone()
    }

    /// Runs a view call and decodes its output.
    pub async fn read_checked<C: ViewCall>(&self, address: Address, call: &C) -> Result<C::Output> {
        let raw = self.reader.call(address, call.calldata()).await?;
        C::decode_return(&raw)
    }

    /// Runs a view call; any failure is logged and reported as `None`.
    ///
    /// Callers cannot tell an empty result from a failed call here; use
    /// [`ContractAdapter::read_checked`] when that matters.
    pub async fn read<C: ViewCall>(&self, address: Address, call: &C) -> Option<C::Output> {
        match self.read_checked(address, call).await {
            Ok(output) => Some(output),
            Err(e) => {
                warn!("Read {} on {:?} failed: {}", C::name(), address, e);
                None
            }
        }
    }

    /// Signs and broadcasts a write call without waiting for it to be mined.
    pub async fn submit<C: WriteCall>(
        &self,
        session: &SessionContext,
        address: Address,
        call: &C,
        value: Option<U256>,
    ) -> Result<TransactionHandle> {
        let signer = session.signer().ok_or(BaseSwapError::NoWalletSession)?;

        if !session.on_expected_network() {
            return Err(BaseSwapError::WrongNetwork {
                expected: session.network.chain_id,
                actual: session.chain_id,
            });
        }

        if !C::PAYABLE && value.is_some_and(|v| !v.is_zero()) {
            return Err(BaseSwapError::ContractError(format!(
                "{} is not payable but a value was attached",
                C::name()
            )));
        }

        let hash = signer
            .send_transaction(address, call.calldata(), value)
            .await?;
        info!("Submitted {} to {:?}: {:?}", C::name(), address, hash);

        Ok(TransactionHandle::new(hash, C::name(), self.reader.clone()))
    }

    /// Like [`ContractAdapter::submit`], but logs failures and returns `None`.
    pub async fn write<C: WriteCall>(
        &self,
        session: &SessionContext,
        address: Address,
        call: &C,
        value: Option<U256>,
    ) -> Option<TransactionHandle> {
        match self.submit(session, address, call, value).await {
            Ok(handle) => Some(handle),
            Err(e) => {
                error!("Write {} on {:?} failed: {}", C::name(), address, e);
                None
            }
        }
    }
}
