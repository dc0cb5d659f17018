use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

/// Handle to one symbol's computation lock.
pub type SymbolLock = Arc<tokio::sync::Mutex<()>>;

/// One async mutex per symbol, created on demand.
///
/// The registry holds only weak references: a symbol's mutex lives as long
/// as some task holds its handle (or an owned guard). Dead entries are
/// pruned whenever the map grows past the configured threshold, so the map
/// stays bounded by the number of symbols with live handles.
#[derive(Debug)]
pub struct LockRegistry {
    inner: Mutex<HashMap<String, Weak<tokio::sync::Mutex<()>>>>,
    prune_threshold: usize,
}

impl Default for LockRegistry {
    fn default() -> Self {
        Self::new(256)
    }
}

impl LockRegistry {
    /// Create a registry that prunes dead entries above `prune_threshold`.
    #[must_use]
    pub fn new(prune_threshold: usize) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            prune_threshold,
        }
    }

    /// The lock for `symbol`. Concurrent callers get the same mutex.
    pub fn handle(&self, symbol: &str) -> SymbolLock {
        let mut map = self.inner.lock().expect("lock registry poisoned");
        if let Some(existing) = map.get(symbol).and_then(Weak::upgrade) {
            return existing;
        }
        let lock = Arc::new(tokio::sync::Mutex::new(()));
        map.insert(symbol.to_string(), Arc::downgrade(&lock));
        if map.len() > self.prune_threshold {
            map.retain(|_, w| w.strong_count() > 0);
        }
        lock
    }

    /// Whether some task currently holds `symbol`'s lock.
    #[must_use]
    pub fn is_held(&self, symbol: &str) -> bool {
        let lock = {
            let map = self.inner.lock().expect("lock registry poisoned");
            map.get(symbol).and_then(Weak::upgrade)
        };
        lock.is_some_and(|l| l.try_lock().is_err())
    }

    /// Number of entries currently in the map, live or not yet pruned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().expect("lock registry poisoned").len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
