/*
 * Block-driven refresh: new block heights invalidate every pool, balance and fee read
 */

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::models::Result;
use crate::rpc::ChainReader;

/// A value together with the block height its read was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockScoped<T> {
    pub block: u64,
    pub value: T,
}

/// Holds the newest value per block height.
///
/// Reads issued for successive blocks may resolve out of order; a response
/// issued for an older block than the stored one is dropped instead of
/// overwriting newer data.
#[derive(Debug, Clone)]
pub struct LatestByBlock<T> {
    current: Option<BlockScoped<T>>,
}

impl<T> Default for LatestByBlock<T> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<T> LatestByBlock<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` unless a newer block's value is already held.
    pub fn apply(&mut self, block: u64, value: T) -> bool {
        if self.current.as_ref().is_some_and(|c| c.block > block) {
            debug!("Dropping stale response for block {}", block);
            return false;
        }
        self.current = Some(BlockScoped { block, value });
        true
    }

    #[must_use]
    pub fn get(&self) -> Option<&T> {
        self.current.as_ref().map(|c| &c.value)
    }

    #[must_use]
    pub fn block(&self) -> Option<u64> {
        self.current.as_ref().map(|c| c.block)
    }

    /// The value, only if it was read at `block`.
    #[must_use]
    pub fn at(&self, block: u64) -> Option<&T> {
        self.current
            .as_ref()
            .filter(|c| c.block == block)
            .map(|c| &c.value)
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

/// Polls the chain head and publishes each new height.
pub struct BlockWatcher {
    reader: Arc<dyn ChainReader>,
    interval: Duration,
    height: watch::Sender<Option<u64>>,
}

impl BlockWatcher {
    #[must_use]
    pub fn new(reader: Arc<dyn ChainReader>, interval: Duration) -> Self {
        let (height, _) = watch::channel(None);
        Self {
            reader,
            interval,
            height,
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<u64>> {
        self.height.subscribe()
    }

    #[must_use]
    pub fn latest(&self) -> Option<u64> {
        *self.height.borrow()
    }

    /// Reads the head once. Returns the height if it advanced.
    pub async fn poll_once(&self) -> Result<Option<u64>> {
        let block = self.reader.block_number().await?;
        let advanced = self.height.send_if_modified(|current| {
            if current.map_or(true, |c| block > c) {
                *current = Some(block);
                true
            } else {
                false
            }
        });
        Ok(advanced.then_some(block))
    }

    /// Polls forever; transport errors are logged and the next tick retries.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match self.poll_once().await {
                Ok(Some(block)) => debug!("New block {}", block),
                Ok(None) => {}
                Err(e) => warn!("Block poll failed: {}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_block_replaces_value() {
        let mut latest = LatestByBlock::new();
        assert!(latest.apply(10, "a"));
        assert!(latest.apply(11, "b"));
        assert_eq!(latest.get(), Some(&"b"));
        assert_eq!(latest.block(), Some(11));
    }

    #[test]
    fn stale_response_does_not_overwrite() {
        let mut latest = LatestByBlock::new();
        assert!(latest.apply(12, "new"));
        assert!(!latest.apply(11, "old"));
        assert_eq!(latest.get(), Some(&"new"));
    }

    #[test]
    fn same_block_response_wins() {
        let mut latest = LatestByBlock::new();
        latest.apply(5, 1);
        assert!(latest.apply(5, 2));
        assert_eq!(latest.get(), Some(&2));
    }

    #[test]
    fn value_is_only_current_at_its_block() {
        let mut latest = LatestByBlock::new();
        latest.apply(7, 42);
        assert_eq!(latest.at(7), Some(&42));
        assert_eq!(latest.at(8), None);
        latest.clear();
        assert_eq!(latest.get(), None);
    }
}
