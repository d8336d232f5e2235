/*
 * Transaction lifecycle: submitted -> confirmed | failed
 */

use chrono::{DateTime, Utc};
use ethers::types::H256;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::models::{TxStatus, TxView};
use crate::rpc::ChainReader;

/// A submitted transaction that callers can poll or await.
#[derive(Clone)]
pub struct TransactionHandle {
    hash: H256,
    label: &'static str,
    status: TxStatus,
    updated_at: DateTime<Utc>,
    reader: Arc<dyn ChainReader>,
}

impl fmt::Debug for TransactionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionHandle")
            .field("hash", &self.hash)
            .field("label", &self.label)
            .field("status", &self.status)
            .finish()
    }
}

impl TransactionHandle {
    #[must_use]
    pub fn new(hash: H256, label: &'static str, reader: Arc<dyn ChainReader>) -> Self {
        Self {
            hash,
            label,
            status: TxStatus::Pending,
            updated_at: Utc::now(),
            reader,
        }
    }

    #[must_use]
    pub fn hash(&self) -> H256 {
        self.hash
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        self.label
    }

    #[must_use]
    pub fn status(&self) -> TxStatus {
        self.status
    }

    /// Checks the receipt once. A failed lookup keeps the transaction pending.
    pub async fn poll(&mut self) -> TxStatus {
        if self.status.is_terminal() {
            return self.status;
        }

        match self.reader.transaction_status(self.hash).await {
            Ok(status) if status != self.status => {
                info!("{} transaction {:?} is now {:?}", self.label, self.hash, status);
                self.status = status;
                self.updated_at = Utc::now();
            }
            Ok(_) => {}
            Err(e) => warn!("Could not check {} transaction {:?}: {}", self.label, self.hash, e),
        }
        self.status
    }

    /// Polls until the transaction is confirmed or failed.
    pub async fn wait(&mut self, poll_interval: Duration) -> TxStatus {
        loop {
            let status = self.poll().await;
            if status.is_terminal() {
                return status;
            }
            tokio::time::sleep(poll_interval).await;
        }
    }

    #[must_use]
    pub fn view(&self) -> TxView {
        TxView {
            hash: Some(self.hash),
            status: self.status,
            updated_at: self.updated_at,
        }
    }
}

/// View of an optional transaction slot: idle until something was submitted.
#[must_use]
pub fn slot_view(handle: Option<&TransactionHandle>) -> TxView {
    handle.map_or_else(
        || TxView {
            hash: None,
            status: TxStatus::Idle,
            updated_at: Utc::now(),
        },
        TransactionHandle::view,
    )
}
