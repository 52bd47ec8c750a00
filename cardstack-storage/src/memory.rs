//! In-memory implementation of every storage collaborator.
//!
//! All collaborators share one [`State`], so a transaction that snapshots it
//! covers module writes and reference counts alike. Transactions on
//! different threads are serialized; a transaction re-entered from the
//! thread that owns it joins the outer unit of work.

use crate::access::{PermissionResolver, SubscriptionLookup};
use crate::cache::CacheInvalidator;
use crate::error::{StoreError, StoreResult};
use crate::media::MediaLibrary;
use crate::store::ModuleStore;
use cardstack_model::{Card, CardStyle, Module, NewModule, Role, Template};
use cardstack_types::{CardId, MediaId, ModuleId, ProfileId, TemplateId};
use chrono::Utc;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::thread::{self, ThreadId};
use tracing::debug;

/// A recorded [`MediaLibrary::reference_medias`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceCall {
    pub added: Vec<MediaId>,
    pub removed: Vec<MediaId>,
}

#[derive(Debug, Clone, Default)]
struct State {
    cards: HashMap<CardId, Card>,
    templates: HashMap<TemplateId, Template>,
    modules: BTreeMap<ModuleId, Module>,
    /// Known media and their reference counts.
    media: HashMap<MediaId, u32>,
    roles: HashMap<(ProfileId, CardId), Role>,
    subscribers: HashSet<ProfileId>,
}

/// Process-local backend used by tests and embedders without a database.
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
    tx_gate: Mutex<()>,
    tx_owner: Mutex<Option<ThreadId>>,
    fail_next_write: AtomicBool,
    fail_invalidations: AtomicBool,
    writes: AtomicUsize,
    reference_calls: Mutex<Vec<ReferenceCall>>,
    invalidations: Mutex<Vec<String>>,
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Backend("memory backend lock poisoned".to_string())
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> StoreResult<MutexGuard<'_, State>> {
        self.state.lock().map_err(poisoned)
    }

    /// Counts a module write and trips the injected failure, if armed.
    fn begin_write(&self) -> StoreResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_next_write.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Backend("injected write failure".to_string()));
        }
        Ok(())
    }

    // ── Seeding ──────────────────────────────────────────────────

    /// Stores a card as-is.
    pub fn insert_card(&self, card: Card) -> StoreResult<CardId> {
        let id = card.id;
        self.state()?.cards.insert(id, card);
        Ok(id)
    }

    /// Stores a template as-is.
    pub fn insert_template(&self, template: Template) -> StoreResult<TemplateId> {
        let id = template.id;
        self.state()?.templates.insert(id, template);
        Ok(id)
    }

    /// Stores a module directly, bypassing write accounting.
    pub fn insert_module(&self, module: NewModule) -> StoreResult<Module> {
        let module = Module {
            id: ModuleId::new(),
            card_id: module.card_id,
            kind: module.kind,
            variant: module.variant,
            data: module.data,
            position: module.position,
            visible: module.visible,
        };
        self.state()?.modules.insert(module.id, module.clone());
        Ok(module)
    }

    /// Registers a media asset with the given reference count.
    pub fn insert_media(&self, id: MediaId, references: u32) -> StoreResult<()> {
        self.state()?.media.insert(id, references);
        Ok(())
    }

    /// Grants `role` on `card_id` to `profile`.
    pub fn grant(&self, profile: ProfileId, card_id: CardId, role: Role) -> StoreResult<()> {
        self.state()?.roles.insert((profile, card_id), role);
        Ok(())
    }

    /// Marks `profile` as holding an active subscription.
    pub fn subscribe(&self, profile: ProfileId) -> StoreResult<()> {
        self.state()?.subscribers.insert(profile);
        Ok(())
    }

    // ── Inspection and fault injection ───────────────────────────

    /// Current reference count of a media asset, `None` if unknown.
    pub fn media_references(&self, id: MediaId) -> StoreResult<Option<u32>> {
        Ok(self.state()?.media.get(&id).copied())
    }

    /// Every `reference_medias` call received, committed or not.
    pub fn reference_calls(&self) -> StoreResult<Vec<ReferenceCall>> {
        Ok(self.reference_calls.lock().map_err(poisoned)?.clone())
    }

    /// Handles passed to `invalidate`, in call order.
    pub fn invalidations(&self) -> StoreResult<Vec<String>> {
        Ok(self.invalidations.lock().map_err(poisoned)?.clone())
    }

    /// Number of module/card write calls received.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Makes the next module/card write fail with a backend error.
    pub fn fail_next_write(&self) {
        self.fail_next_write.store(true, Ordering::SeqCst);
    }

    /// Makes every `invalidate` call fail after being recorded.
    pub fn fail_invalidations(&self, fail: bool) {
        self.fail_invalidations.store(fail, Ordering::SeqCst);
    }
}

// ── ModuleStore ──────────────────────────────────────────────────

impl ModuleStore for MemoryBackend {
    fn card(&self, id: CardId) -> StoreResult<Option<Card>> {
        Ok(self.state()?.cards.get(&id).cloned())
    }

    fn template(&self, id: TemplateId) -> StoreResult<Option<Template>> {
        Ok(self.state()?.templates.get(&id).cloned())
    }

    fn module(&self, id: ModuleId) -> StoreResult<Option<Module>> {
        Ok(self.state()?.modules.get(&id).cloned())
    }

    fn modules(&self, ids: &[ModuleId]) -> StoreResult<Vec<Module>> {
        let state = self.state()?;
        Ok(ids
            .iter()
            .filter_map(|id| state.modules.get(id).cloned())
            .collect())
    }

    fn card_modules(&self, card_id: CardId) -> StoreResult<Vec<Module>> {
        let state = self.state()?;
        let mut modules: Vec<Module> = state
            .modules
            .values()
            .filter(|m| m.card_id == card_id)
            .cloned()
            .collect();
        modules.sort_by_key(|m| (m.position, m.id));
        Ok(modules)
    }

    fn next_position(&self, card_id: CardId) -> StoreResult<u32> {
        let state = self.state()?;
        Ok(state
            .modules
            .values()
            .filter(|m| m.card_id == card_id)
            .map(|m| m.position + 1)
            .max()
            .unwrap_or(0))
    }

    fn create_module(&self, module: NewModule) -> StoreResult<Module> {
        self.begin_write()?;
        let mut state = self.state()?;
        if !state.cards.contains_key(&module.card_id) {
            return Err(StoreError::NotFound(format!("card {}", module.card_id)));
        }
        let module = Module {
            id: ModuleId::new(),
            card_id: module.card_id,
            kind: module.kind,
            variant: module.variant,
            data: module.data,
            position: module.position,
            visible: module.visible,
        };
        state.modules.insert(module.id, module.clone());
        Ok(module)
    }

    fn update_module(
        &self,
        id: ModuleId,
        data: &serde_json::Value,
        variant: Option<&str>,
    ) -> StoreResult<()> {
        self.begin_write()?;
        let mut state = self.state()?;
        let module = state
            .modules
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("module {id}")))?;
        module.data = data.clone();
        module.variant = variant.map(str::to_string);
        Ok(())
    }

    fn remove_modules(&self, ids: &[ModuleId]) -> StoreResult<()> {
        self.begin_write()?;
        let mut state = self.state()?;
        for id in ids {
            state.modules.remove(id);
        }
        Ok(())
    }

    fn assign_positions(&self, positions: &[(ModuleId, u32)]) -> StoreResult<()> {
        self.begin_write()?;
        let mut state = self.state()?;
        for (id, position) in positions {
            let module = state
                .modules
                .get_mut(id)
                .ok_or_else(|| StoreError::NotFound(format!("module {id}")))?;
            module.position = *position;
        }
        Ok(())
    }

    fn set_visibility(&self, ids: &[ModuleId], visible: bool) -> StoreResult<()> {
        self.begin_write()?;
        let mut state = self.state()?;
        for id in ids {
            if let Some(module) = state.modules.get_mut(id) {
                module.visible = visible;
            }
        }
        Ok(())
    }

    fn apply_card_style(&self, card_id: CardId, style: &CardStyle) -> StoreResult<()> {
        self.begin_write()?;
        let mut state = self.state()?;
        let card = state
            .cards
            .get_mut(&card_id)
            .ok_or_else(|| StoreError::NotFound(format!("card {card_id}")))?;
        card.style = style.clone();
        card.updated_at = Utc::now();
        Ok(())
    }

    fn transaction(&self, work: &mut dyn FnMut() -> StoreResult<()>) -> StoreResult<()> {
        let current = thread::current().id();
        let nested = *self.tx_owner.lock().map_err(poisoned)? == Some(current);
        if nested {
            return work();
        }

        let _gate = self.tx_gate.lock().map_err(poisoned)?;
        let snapshot = self.state()?.clone();
        *self.tx_owner.lock().map_err(poisoned)? = Some(current);

        let result = work();

        *self.tx_owner.lock().map_err(poisoned)? = None;
        if result.is_err() {
            *self.state()? = snapshot;
            debug!("Rolled back in-memory unit of work");
        }
        result
    }
}

// ── MediaLibrary ─────────────────────────────────────────────────

impl MediaLibrary for MemoryBackend {
    fn check_medias(&self, ids: &[MediaId]) -> StoreResult<()> {
        let state = self.state()?;
        let unknown: Vec<MediaId> = ids
            .iter()
            .filter(|id| !state.media.contains_key(id))
            .copied()
            .collect();
        if unknown.is_empty() {
            Ok(())
        } else {
            Err(StoreError::UnknownMedia(unknown))
        }
    }

    fn reference_medias(&self, added: &[MediaId], removed: &[MediaId]) -> StoreResult<()> {
        self.reference_calls
            .lock()
            .map_err(poisoned)?
            .push(ReferenceCall {
                added: added.to_vec(),
                removed: removed.to_vec(),
            });

        let mut state = self.state()?;
        let unknown: Vec<MediaId> = added
            .iter()
            .filter(|id| !state.media.contains_key(id))
            .copied()
            .collect();
        if !unknown.is_empty() {
            return Err(StoreError::UnknownMedia(unknown));
        }
        for id in added {
            if let Some(count) = state.media.get_mut(id) {
                *count += 1;
            }
        }
        // Releasing media that is already gone is not an error.
        for id in removed {
            if let Some(count) = state.media.get_mut(id) {
                *count = count.saturating_sub(1);
            }
        }
        Ok(())
    }
}

// ── Access ───────────────────────────────────────────────────────

impl PermissionResolver for MemoryBackend {
    fn role(&self, profile: ProfileId, card_id: CardId) -> StoreResult<Option<Role>> {
        let state = self.state()?;
        let owns = state
            .cards
            .get(&card_id)
            .is_some_and(|card| card.owner == profile);
        if owns {
            return Ok(Some(Role::Owner));
        }
        Ok(state.roles.get(&(profile, card_id)).copied())
    }
}

impl SubscriptionLookup for MemoryBackend {
    fn has_active_subscription(&self, owner: ProfileId) -> StoreResult<bool> {
        Ok(self.state()?.subscribers.contains(&owner))
    }
}

// ── Cache ────────────────────────────────────────────────────────

impl CacheInvalidator for MemoryBackend {
    fn invalidate(&self, handle: &str) -> StoreResult<()> {
        self.invalidations
            .lock()
            .map_err(poisoned)?
            .push(handle.to_string());
        if self.fail_invalidations.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected invalidation failure".to_string()));
        }
        Ok(())
    }
}
