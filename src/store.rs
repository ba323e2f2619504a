use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::RwLock;

/// A stored entry. Only `String` is populated today; the remaining variants
/// reserve the tags the protocol will eventually need. Read sites match
/// exhaustively, so adding a variant forces every reader to handle it.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    String(Bytes),
    Hash,
    List,
    Set,
    SortedSet,
    HyperLogLog,
    PubSub,
    Transaction,
}

/// The Store manages the key-value pairs shared by every connection. It is
/// created once at startup and cloned cheaply (reference counted) into each
/// connection task; all access goes through `get`/`set`/`insert`, which
/// enforce the locking discipline.
///
/// tokio's `RwLock` uses a fair, write-preferring policy: a writer waiting
/// for the lock blocks later readers, so a continuous stream of GETs cannot
/// starve a SET.
#[derive(Clone)]
pub struct Store {
    keys: Arc<RwLock<HashMap<String, Value>>>,
}

impl Store {
    pub fn new() -> Store {
        Store {
            keys: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns a copy of the value stored at `key`, if any. Runs under the
    /// shared lock: concurrent with other reads, excluded against writes.
    pub async fn get(&self, key: &str) -> Option<Value> {
        self.keys.read().await.get(key).cloned()
    }

    /// Stores `data` at `key` as a string, fully replacing any existing
    /// entry regardless of its tag. Once this returns, every subsequent
    /// `get` from any connection observes the new value.
    pub async fn set(&self, key: String, data: Bytes) {
        self.keys.write().await.insert(key, Value::String(data));
    }

    /// Stores an arbitrary tagged value. Entry point for the container
    /// types that don't have commands yet.
    pub async fn insert(&self, key: String, value: Value) {
        self.keys.write().await.insert(key, value);
    }

    pub async fn size(&self) -> usize {
        self.keys.read().await.len()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_missing_key() {
        let store = Store::new();
        assert_eq!(store.get("missing").await, None);
    }

    #[tokio::test]
    async fn set_then_get() {
        let store = Store::new();
        store.set("key1".to_string(), Bytes::from("value1")).await;

        assert_eq!(
            store.get("key1").await,
            Some(Value::String(Bytes::from("value1")))
        );
    }

    #[tokio::test]
    async fn last_set_wins() {
        let store = Store::new();
        store.set("key1".to_string(), Bytes::from("v1")).await;
        store.set("key1".to_string(), Bytes::from("v2")).await;

        assert_eq!(
            store.get("key1").await,
            Some(Value::String(Bytes::from("v2")))
        );
    }

    #[tokio::test]
    async fn set_replaces_other_tags() {
        let store = Store::new();
        store.insert("key1".to_string(), Value::List).await;
        store.set("key1".to_string(), Bytes::from("v")).await;

        assert_eq!(
            store.get("key1").await,
            Some(Value::String(Bytes::from("v")))
        );
    }

    #[tokio::test]
    async fn concurrent_writers_never_tear() {
        let store = Store::new();
        let writers = 32;

        let handles: Vec<_> = (0..writers)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .set("contended".to_string(), Bytes::from(format!("value-{}", i)))
                        .await;
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        // Whichever writer acquired the lock last wins; the result must be
        // one of the written values, intact.
        let value = store.get("contended").await.unwrap();
        let expected: Vec<Value> = (0..writers)
            .map(|i| Value::String(Bytes::from(format!("value-{}", i))))
            .collect();
        assert!(expected.contains(&value));
    }
}
