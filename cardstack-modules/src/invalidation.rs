//! Fire-and-forget cache invalidation.
//!
//! Dispatched only after a mutation has committed. Inside a Tokio runtime
//! the call moves to the blocking pool and is never awaited; without one it
//! runs inline. Either way a failure is logged and dropped.

use cardstack_storage::CacheInvalidator;
use std::sync::Arc;
use tracing::{debug, warn};

pub(crate) fn dispatch(cache: &Arc<dyn CacheInvalidator>, handle: &str) {
    let cache = Arc::clone(cache);
    let handle = handle.to_string();
    match tokio::runtime::Handle::try_current() {
        Ok(runtime) => {
            drop(runtime.spawn_blocking(move || invalidate(cache.as_ref(), &handle)));
        }
        Err(_) => invalidate(cache.as_ref(), &handle),
    }
}

fn invalidate(cache: &dyn CacheInvalidator, handle: &str) {
    match cache.invalidate(handle) {
        Ok(()) => debug!("Invalidated cache for {}", handle),
        Err(e) => warn!("Cache invalidation for {} failed: {}", handle, e),
    }
}
