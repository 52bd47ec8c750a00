use crate::error::StoreResult;

/// Invalidates cached renderings of a card by its external handle.
///
/// Callers treat this as best-effort: a failure is logged and never changes
/// the outcome of the mutation that triggered it.
pub trait CacheInvalidator: Send + Sync {
    fn invalidate(&self, handle: &str) -> StoreResult<()>;
}
