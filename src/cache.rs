use crate::messaging::MessageHandle;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

/// Remembers the last rendered movie list in each channel so list mutations
/// can refresh it in place.
#[derive(Clone)]
pub struct ListMessageCache {
    cache: Arc<Mutex<LruCache<u64, MessageHandle>>>,
}

impl ListMessageCache {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Arc::new(Mutex::new(LruCache::new(cap))),
        }
    }

    pub fn remember(&self, handle: MessageHandle) {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.put(handle.channel_id, handle);
    }

    pub fn get(&self, channel_id: u64) -> Option<MessageHandle> {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.get(&channel_id).copied()
    }

    pub fn forget(&self, channel_id: u64) {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.pop(&channel_id);
    }
}
