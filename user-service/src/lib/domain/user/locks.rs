use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use tokio::sync::Mutex as AsyncMutex;
use tokio::sync::OwnedMutexGuard;

/// Per-identity async mutexes.
///
/// Serializes the read, decide and write steps on one credential record while
/// leaving different identities independent. Entries nobody holds are pruned
/// on the next acquisition.
#[derive(Default)]
pub struct IdentityLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl IdentityLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `identity`.
    pub async fn acquire(&self, identity: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(
                locks
                    .entry(identity.to_string())
                    .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
            )
        };

        lock.lock_owned().await
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_same_identity_is_exclusive() {
        let locks = Arc::new(IdentityLocks::new());
        let guard = locks.acquire("a@x.com").await;

        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.acquire("a@x.com").await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn test_different_identities_do_not_contend() {
        let locks = IdentityLocks::new();
        let _first = locks.acquire("a@x.com").await;

        let second = tokio::time::timeout(Duration::from_millis(50), locks.acquire("b@x.com")).await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn test_released_entries_are_pruned() {
        let locks = IdentityLocks::new();
        drop(locks.acquire("a@x.com").await);
        drop(locks.acquire("b@x.com").await);

        // Acquiring prunes the released "a" and "b" entries
        let _guard = locks.acquire("c@x.com").await;
        assert_eq!(locks.tracked(), 1);
    }
}
