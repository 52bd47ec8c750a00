use crate::config::EngineConfig;
use crate::error::{ModuleError, ModuleResult};
use crate::invalidation;
use cardstack_model::{Caller, Card, CardSnapshot, ModuleKind, Role};
use cardstack_storage::{
    CacheInvalidator, MediaLibrary, ModuleStore, PermissionResolver, SubscriptionLookup,
};
use cardstack_types::CardId;
use std::sync::Arc;

/// The external services a [`ModuleEngine`] runs against.
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn ModuleStore>,
    pub media: Arc<dyn MediaLibrary>,
    pub permissions: Arc<dyn PermissionResolver>,
    pub subscriptions: Arc<dyn SubscriptionLookup>,
    pub cache: Arc<dyn CacheInvalidator>,
}

impl Collaborators {
    /// Wires every collaborator to one backend, so module writes and
    /// reference counts share its transactions.
    pub fn shared<B>(backend: Arc<B>) -> Self
    where
        B: ModuleStore
            + MediaLibrary
            + PermissionResolver
            + SubscriptionLookup
            + CacheInvalidator
            + 'static,
    {
        Self {
            store: backend.clone(),
            media: backend.clone(),
            permissions: backend.clone(),
            subscriptions: backend.clone(),
            cache: backend,
        }
    }
}

/// Orchestrates every change to a card's modules.
///
/// Calls are sequential per request; the engine holds no locks of its own
/// and relies on [`ModuleStore::transaction`] for atomicity and isolation.
pub struct ModuleEngine {
    pub(crate) store: Arc<dyn ModuleStore>,
    pub(crate) media: Arc<dyn MediaLibrary>,
    permissions: Arc<dyn PermissionResolver>,
    subscriptions: Arc<dyn SubscriptionLookup>,
    cache: Arc<dyn CacheInvalidator>,
    config: EngineConfig,
}

impl ModuleEngine {
    /// Creates an engine over the given collaborators.
    pub fn new(collaborators: Collaborators, config: EngineConfig) -> Self {
        Self {
            store: collaborators.store,
            media: collaborators.media,
            permissions: collaborators.permissions,
            subscriptions: collaborators.subscriptions,
            cache: collaborators.cache,
            config,
        }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns a card with the modules `caller` may see.
    ///
    /// Editors see hidden modules too. Viewers, and anyone when the card is
    /// published, see visible modules only.
    pub fn list_modules(&self, caller: &Caller, card_id: CardId) -> ModuleResult<CardSnapshot> {
        let card = self.load_card(card_id)?;
        let role = self.role_of(caller, card_id)?;

        let show_hidden = match role {
            Some(role) if role.can_edit() => true,
            Some(_) => false,
            None if card.published => false,
            None if caller.profile().is_none() => return Err(ModuleError::Unauthorized),
            None => {
                return Err(ModuleError::Forbidden(format!(
                    "card {card_id} is not published"
                )));
            }
        };

        let mut modules = self
            .store
            .card_modules(card_id)
            .map_err(|e| ModuleError::internal("load modules", e))?;
        if !show_hidden {
            modules.retain(|m| m.visible);
        }
        Ok(CardSnapshot { card, modules })
    }

    // ── Shared steps ─────────────────────────────────────────────

    fn role_of(&self, caller: &Caller, card_id: CardId) -> ModuleResult<Option<Role>> {
        match caller.profile() {
            Some(profile) => self
                .permissions
                .role(profile, card_id)
                .map_err(|e| ModuleError::internal("resolve role", e)),
            None => Ok(None),
        }
    }

    /// Requires an editor-or-higher role on the card.
    pub(crate) fn authorize(&self, caller: &Caller, card_id: CardId) -> ModuleResult<Role> {
        if caller.profile().is_none() {
            return Err(ModuleError::Unauthorized);
        }
        match self.role_of(caller, card_id)? {
            Some(role) if role.can_edit() => Ok(role),
            _ => Err(ModuleError::Forbidden(format!(
                "editor right required on card {card_id}"
            ))),
        }
    }

    pub(crate) fn load_card(&self, card_id: CardId) -> ModuleResult<Card> {
        self.store
            .card(card_id)
            .map_err(|e| ModuleError::internal("load card", e))?
            .ok_or_else(|| ModuleError::InvalidRequest(format!("card {card_id} not found")))
    }

    /// Checks the card's prospective module kinds against the gating
    /// thresholds and, if they are exceeded, the owner's plan.
    pub(crate) fn ensure_plan(&self, card: &Card, kinds: &[ModuleKind]) -> ModuleResult<()> {
        let Some(reason) = self.config.gating.requires_subscription(kinds) else {
            return Ok(());
        };
        let active = self
            .subscriptions
            .has_active_subscription(card.owner)
            .map_err(|e| ModuleError::internal("check subscription", e))?;
        if active {
            Ok(())
        } else {
            Err(ModuleError::SubscriptionRequired(reason))
        }
    }

    /// Reloads the card after a committed change and invalidates its cache.
    pub(crate) fn finish(&self, card_id: CardId) -> ModuleResult<CardSnapshot> {
        let card = self.load_card(card_id)?;
        let modules = self
            .store
            .card_modules(card_id)
            .map_err(|e| ModuleError::internal("reload modules", e))?;
        if let Some(handle) = &card.handle {
            invalidation::dispatch(&self.cache, handle);
        }
        Ok(CardSnapshot { card, modules })
    }
}
