use crate::error::StoreResult;
use cardstack_types::MediaId;

/// Media bookkeeping. Physical deletion of unreferenced media is not part
/// of this contract.
pub trait MediaLibrary: Send + Sync {
    /// Fails with [`StoreError::UnknownMedia`](crate::StoreError::UnknownMedia)
    /// listing every id that does not resolve.
    fn check_medias(&self, ids: &[MediaId]) -> StoreResult<()>;

    /// Applies one reference-count transition: each id in `added` gains a
    /// reference, each id in `removed` loses one. Either side may be empty.
    fn reference_medias(&self, added: &[MediaId], removed: &[MediaId]) -> StoreResult<()>;
}
