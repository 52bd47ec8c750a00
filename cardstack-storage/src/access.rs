use crate::error::StoreResult;
use cardstack_model::Role;
use cardstack_types::{CardId, ProfileId};

/// Resolves the role a profile holds on a card.
pub trait PermissionResolver: Send + Sync {
    /// Returns `None` when the profile has no role on the card.
    fn role(&self, profile: ProfileId, card_id: CardId) -> StoreResult<Option<Role>>;
}

/// Answers whether a card owner is on an active paid plan.
pub trait SubscriptionLookup: Send + Sync {
    fn has_active_subscription(&self, owner: ProfileId) -> StoreResult<bool>;
}
