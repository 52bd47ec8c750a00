//! Operations over a set of modules on one card.

use crate::engine::ModuleEngine;
use crate::error::{ModuleError, ModuleResult};
use crate::positions;
use crate::transition::MediaTransition;
use cardstack_model::{Caller, CardSnapshot, Module, NewModule, registry};
use cardstack_types::{CardId, ModuleId};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// Result of [`ModuleEngine::duplicate_modules`].
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateOutcome {
    pub snapshot: CardSnapshot,
    /// Original module id → id of its copy.
    pub mapping: BTreeMap<ModuleId, ModuleId>,
}

/// A validated id set: every id exists, appears once, and all share a card.
struct Batch {
    card_id: CardId,
    /// In request order.
    modules: Vec<Module>,
}

impl ModuleEngine {
    fn resolve_batch(&self, caller: &Caller, ids: &[ModuleId]) -> ModuleResult<Batch> {
        if ids.is_empty() {
            return Err(ModuleError::InvalidRequest("no module ids given".to_string()));
        }
        let mut seen = HashSet::with_capacity(ids.len());
        for id in ids {
            if !seen.insert(*id) {
                return Err(ModuleError::InvalidRequest(format!("module {id} listed twice")));
            }
        }

        let mut found: HashMap<ModuleId, Module> = self
            .store
            .modules(ids)
            .map_err(|e| ModuleError::internal("load modules", e))?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();
        let modules = ids
            .iter()
            .map(|id| {
                found
                    .remove(id)
                    .ok_or_else(|| ModuleError::InvalidRequest(format!("module {id} not found")))
            })
            .collect::<ModuleResult<Vec<_>>>()?;

        let Some(card_id) = modules.first().map(|m| m.card_id) else {
            return Err(ModuleError::InvalidRequest("no module ids given".to_string()));
        };
        if modules.iter().any(|m| m.card_id != card_id) {
            return Err(ModuleError::InvalidRequest(
                "modules span more than one card".to_string(),
            ));
        }

        self.authorize(caller, card_id)?;
        Ok(Batch { card_id, modules })
    }

    /// Deletes modules, releases their media and re-packs the card.
    pub fn delete_modules(&self, caller: &Caller, ids: &[ModuleId]) -> ModuleResult<CardSnapshot> {
        let Batch { card_id, modules } = self.resolve_batch(caller, ids)?;
        let released = MediaTransition::release(
            modules.iter().map(|m| registry::media_of(m.kind, &m.data)),
        );

        let store = self.store.as_ref();
        let media = self.media.as_ref();
        store
            .transaction(&mut || {
                store.remove_modules(ids)?;
                released.apply(media)?;
                positions::repack(store, card_id)
            })
            .map_err(|e| ModuleError::internal("delete modules", e))?;

        debug!("Deleted {} module(s) from card {}", ids.len(), card_id);
        self.finish(card_id)
    }

    /// Moves each listed module to its index in `ordered`, then re-packs.
    pub fn reorder_modules(
        &self,
        caller: &Caller,
        ordered: &[ModuleId],
    ) -> ModuleResult<CardSnapshot> {
        let Batch { card_id, .. } = self.resolve_batch(caller, ordered)?;

        let store = self.store.as_ref();
        store
            .transaction(&mut || {
                let plan = positions::reorder(&store.card_modules(card_id)?, ordered);
                if plan.is_empty() {
                    return Ok(());
                }
                store.assign_positions(&plan)
            })
            .map_err(|e| ModuleError::internal("reorder modules", e))?;

        debug!("Reordered {} module(s) on card {}", ordered.len(), card_id);
        self.finish(card_id)
    }

    /// Copies modules to the end of the card, keeping the originals'
    /// relative order. Copies are visible and reference the same media.
    pub fn duplicate_modules(
        &self,
        caller: &Caller,
        ids: &[ModuleId],
    ) -> ModuleResult<DuplicateOutcome> {
        let Batch {
            card_id,
            mut modules,
        } = self.resolve_batch(caller, ids)?;

        let card = self.load_card(card_id)?;
        if card.published {
            let mut kinds: Vec<_> = self
                .store
                .card_modules(card_id)
                .map_err(|e| ModuleError::internal("load modules", e))?
                .iter()
                .map(|m| m.kind)
                .collect();
            kinds.extend(modules.iter().map(|m| m.kind));
            self.ensure_plan(&card, &kinds)?;
        }

        modules.sort_by_key(|m| (m.position, m.id));
        let acquired = MediaTransition::acquire(
            modules.iter().map(|m| registry::media_of(m.kind, &m.data)),
        );

        let store = self.store.as_ref();
        let media = self.media.as_ref();
        let mut mapping = BTreeMap::new();
        store
            .transaction(&mut || {
                mapping.clear();
                let mut position = store.next_position(card_id)?;
                for original in &modules {
                    let copy = store.create_module(NewModule {
                        card_id,
                        kind: original.kind,
                        variant: original.variant.clone(),
                        data: original.data.clone(),
                        position,
                        visible: true,
                    })?;
                    mapping.insert(original.id, copy.id);
                    position += 1;
                }
                acquired.apply(media)
            })
            .map_err(|e| ModuleError::internal("duplicate modules", e))?;

        debug!("Duplicated {} module(s) on card {}", mapping.len(), card_id);
        Ok(DuplicateOutcome {
            snapshot: self.finish(card_id)?,
            mapping,
        })
    }

    /// Shows or hides modules. Positions are untouched.
    pub fn set_modules_visibility(
        &self,
        caller: &Caller,
        ids: &[ModuleId],
        visible: bool,
    ) -> ModuleResult<CardSnapshot> {
        let Batch { card_id, .. } = self.resolve_batch(caller, ids)?;

        let store = self.store.as_ref();
        store
            .transaction(&mut || store.set_visibility(ids, visible))
            .map_err(|e| ModuleError::internal("set module visibility", e))?;

        debug!(
            "Set visible={} on {} module(s) of card {}",
            visible,
            ids.len(),
            card_id
        );
        self.finish(card_id)
    }
}
