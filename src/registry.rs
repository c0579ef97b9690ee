//! Concurrent identity → logger map.
//!
//! # Responsibilities
//! - Memoize one `LoggerHandle` per `LoggerIdentity`
//! - Guarantee a single construction per identity under concurrent first use
//! - Enumerate handles for configuration refreshes
//!
//! # Design Decisions
//! - Lookups hit a read path first; only misses take the shard's entry lock
//! - Construction runs inside the vacant entry, so racing first callers wait
//!   for and then share the one handle instead of building their own
//! - Entries are never removed; growth is bounded by the identities a
//!   deployment actually uses

use std::sync::Arc;

use dashmap::DashMap;

use crate::handle::LoggerHandle;
use crate::identity::LoggerIdentity;

/// Registry of every logger handed out.
#[derive(Debug, Default)]
pub struct LoggerRegistry {
    handles: DashMap<LoggerIdentity, Arc<LoggerHandle>>,
}

impl LoggerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing handle for `identity`, if any.
    pub fn get(&self, identity: &LoggerIdentity) -> Option<Arc<LoggerHandle>> {
        self.handles.get(identity).map(|r| Arc::clone(r.value()))
    }

    /// Return the handle for `identity`, building it with `create` on first use.
    ///
    /// `create` runs at most once per identity and must not call back into
    /// this registry. It runs under the shard's write lock, so lookups of
    /// other identities hashed to the same shard wait until it returns,
    /// including any file the sink factory opens.
    pub fn get_or_create<F>(&self, identity: LoggerIdentity, create: F) -> Arc<LoggerHandle>
    where
        F: FnOnce(&LoggerIdentity) -> LoggerHandle,
    {
        if let Some(handle) = self.get(&identity) {
            return handle;
        }

        let key = identity.clone();
        let entry = self
            .handles
            .entry(identity)
            .or_insert_with(|| Arc::new(create(&key)));
        Arc::clone(entry.value())
    }

    /// Visit every registered handle.
    ///
    /// Works on a snapshot so no map lock is held while `f` runs. Handles
    /// inserted after the snapshot are not visited.
    pub fn range_all<F>(&self, mut f: F)
    where
        F: FnMut(&Arc<LoggerHandle>),
    {
        for handle in self.snapshot() {
            f(&handle);
        }
    }

    /// Every handle currently registered, in no particular order.
    pub fn snapshot(&self) -> Vec<Arc<LoggerHandle>> {
        self.handles.iter().map(|r| Arc::clone(r.value())).collect()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
