//! Per-block serialization
//!
//! Operations that read a block, decide, then write back (collision
//! resolution when adding a file) hold the block's lock for the whole
//! sequence. Operations on different blocks proceed independently.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

pub struct BlockLockManager {
    /// Map from block id to that block's async lock
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl BlockLockManager {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn block_lock(&self, block_id: &str) -> Arc<AsyncMutex<()>> {
        let mut map = self.locks.lock();
        map.entry(block_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Wait for exclusive access to `block_id`. Released when the guard drops.
    pub async fn lock(&self, block_id: &str) -> OwnedMutexGuard<()> {
        self.block_lock(block_id).lock_owned().await
    }

    /// Drop locks nobody is holding or waiting on.
    pub fn cleanup_unused(&self) {
        let mut map = self.locks.lock();
        map.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    pub fn lock_count(&self) -> usize {
        self.locks.lock().len()
    }
}

impl Default for BlockLockManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_block_is_serialized() {
        let manager = Arc::new(BlockLockManager::new());
        let guard = manager.lock("abc123").await;

        let contender = {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move {
                let _guard = manager.lock("abc123").await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn different_blocks_do_not_block() {
        let manager = BlockLockManager::new();
        let _first = manager.lock("abc123").await;
        let _second = manager.lock("xyz789").await;
        assert_eq!(manager.lock_count(), 2);
    }

    #[tokio::test]
    async fn cleanup_keeps_held_locks() {
        let manager = BlockLockManager::new();
        let held = manager.lock("abc123").await;
        drop(manager.lock("xyz789").await);

        manager.cleanup_unused();
        assert_eq!(manager.lock_count(), 1);
        drop(held);
        manager.cleanup_unused();
        assert_eq!(manager.lock_count(), 0);
    }
}
