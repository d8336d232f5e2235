#![allow(dead_code)]

use async_trait::async_trait;
use baseswap::abi::ContractCall;
use baseswap::rpc::{ChainReader, TransactionSigner};
use baseswap::session::WalletConnector;
use baseswap::{BaseSwapError, Result, TxStatus};
use ethers::abi::{encode, Token};
use ethers::types::{Address, Bytes, H256, U256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

pub fn account() -> Address {
    Address::repeat_byte(0xab)
}

#[derive(Debug, Clone)]
pub struct SentTx {
    pub to: Address,
    pub data: Bytes,
    pub value: Option<U256>,
    pub hash: H256,
}

impl SentTx {
    pub fn selector(&self) -> [u8; 4] {
        [self.data[0], self.data[1], self.data[2], self.data[3]]
    }
}

/// In-memory chain that answers reads by function selector and records every
/// signed transaction.
pub struct MockChain {
    chain_id: u64,
    block: AtomicU64,
    native_balance: Mutex<U256>,
    responses: Mutex<HashMap<[u8; 4], Bytes>>,
    statuses: Mutex<HashMap<H256, TxStatus>>,
    sent: Mutex<Vec<SentTx>>,
    fail_reads: AtomicBool,
    reject_sends: AtomicBool,
}

impl MockChain {
    pub fn new(chain_id: u64) -> Arc<Self> {
        Arc::new(Self {
            chain_id,
            block: AtomicU64::new(1),
            native_balance: Mutex::new(U256::zero()),
            responses: Mutex::new(HashMap::new()),
            statuses: Mutex::new(HashMap::new()),
            sent: Mutex::new(Vec::new()),
            fail_reads: AtomicBool::new(false),
            reject_sends: AtomicBool::new(false),
        })
    }

    pub fn set_block(&self, block: u64) {
        self.block.store(block, Ordering::SeqCst);
    }

    pub fn set_native_balance(&self, balance: U256) {
        *self.native_balance.lock().unwrap() = balance;
    }

    pub fn respond<C: ContractCall>(&self, tokens: &[Token]) {
        self.responses
            .lock()
            .unwrap()
            .insert(C::selector(), Bytes::from(encode(tokens)));
    }

    pub fn respond_pool(&self, rate: U256, fee_bps: u64, enabled: bool) {
        self.respond::<baseswap::abi::Pools>(&[
            Token::Uint(rate),
            Token::Uint(U256::from(fee_bps)),
            Token::Bool(enabled),
        ]);
    }

    pub fn respond_uint<C: ContractCall>(&self, value: U256) {
        self.respond::<C>(&[Token::Uint(value)]);
    }

    pub fn set_status(&self, hash: H256, status: TxStatus) {
        self.statuses.lock().unwrap().insert(hash, status);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn reject_sends(&self, reject: bool) {
        self.reject_sends.store(reject, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentTx> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainReader for MockChain {
    async fn chain_id(&self) -> Result<u64> {
        Ok(self.chain_id)
    }

    async fn block_number(&self) -> Result<u64> {
        Ok(self.block.load(Ordering::SeqCst))
    }

    async fn native_balance(&self, _account: Address) -> Result<U256> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(BaseSwapError::TransportFailure("node unreachable".to_string()));
        }
        Ok(*self.native_balance.lock().unwrap())
    }

    async fn call(&self, _to: Address, data: Bytes) -> Result<Bytes> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(BaseSwapError::TransportFailure("node unreachable".to_string()));
        }
        let selector = [data[0], data[1], data[2], data[3]];
        self.responses
            .lock()
            .unwrap()
            .get(&selector)
            .cloned()
            .ok_or_else(|| BaseSwapError::ContractError("execution reverted".to_string()))
    }

    async fn transaction_status(&self, hash: H256) -> Result<TxStatus> {
        Ok(self
            .statuses
            .lock()
            .unwrap()
            .get(&hash)
            .copied()
            .unwrap_or(TxStatus::Pending))
    }
}

#[async_trait]
impl TransactionSigner for MockChain {
    fn address(&self) -> Address {
        account()
    }

    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn send_transaction(&self, to: Address, data: Bytes, value: Option<U256>) -> Result<H256> {
        if self.reject_sends.load(Ordering::SeqCst) {
            return Err(BaseSwapError::UserRejected);
        }
        let mut sent = self.sent.lock().unwrap();
        let hash = H256::from_low_u64_be(sent.len() as u64 + 1);
        sent.push(SentTx {
            to,
            data,
            value,
            hash,
        });
        Ok(hash)
    }
}

/// Connector that hands out the mock chain as the signer, or declines.
pub struct MockConnector {
    chain: Arc<MockChain>,
    decline: AtomicBool,
}

impl MockConnector {
    pub fn new(chain: Arc<MockChain>) -> Arc<Self> {
        Arc::new(Self {
            chain,
            decline: AtomicBool::new(false),
        })
    }

    pub fn decline(&self, decline: bool) {
        self.decline.store(decline, Ordering::SeqCst);
    }
}

#[async_trait]
impl WalletConnector for MockConnector {
    async fn connect(&self) -> Result<Arc<dyn TransactionSigner>> {
        if self.decline.load(Ordering::SeqCst) {
            return Err(BaseSwapError::UserRejected);
        }
        Ok(self.chain.clone())
    }
}

pub fn ether(whole: u64) -> U256 {
    U256::from(whole) * U256::exp10(18)
}

pub fn usdc(whole: u64) -> U256 {
    U256::from(whole) * U256::exp10(6)
}
