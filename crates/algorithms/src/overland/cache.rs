//! LRU cache of subbasin flow planes

use super::flow_plane::SubbasinFlowPlane;
use hydrodiv_core::Comid;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

/// Default number of cached subbasins
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Flow planes keyed by subbasin outlet, shared across worker threads.
pub struct FlowPlaneCache {
    inner: Mutex<LruCache<Comid, SubbasinFlowPlane>>,
}

impl FlowPlaneCache {
    /// Create a new cache holding up to `capacity` subbasins.
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(cap)),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<Comid, SubbasinFlowPlane>> {
        // entries are only ever replaced whole
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(&self, outlet: Comid) -> Option<SubbasinFlowPlane> {
        self.lock().get(&outlet).cloned()
    }

    pub fn insert(&self, plane: SubbasinFlowPlane) {
        self.lock().put(plane.outlet, plane);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl Default for FlowPlaneCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl std::fmt::Debug for FlowPlaneCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowPlaneCache").field("len", &self.len()).finish()
    }
}
