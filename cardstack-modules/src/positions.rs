//! Position planning.
//!
//! Re-packing is a full re-linearization of a card's modules into `0..N-1`,
//! not an in-place gap fix. The planners are pure and return only the
//! writes that change something.

use cardstack_model::Module;
use cardstack_storage::{ModuleStore, StoreResult};
use cardstack_types::{CardId, ModuleId};
use std::collections::HashMap;

/// Positions that make `modules` contiguous while keeping their order.
/// Ties on position are broken by id, i.e. creation order.
pub fn linearize(modules: &[Module]) -> Vec<(ModuleId, u32)> {
    let mut ordered: Vec<&Module> = modules.iter().collect();
    ordered.sort_by_key(|m| (m.position, m.id));
    changed(ordered.iter().map(|m| (m.id, m.position)))
}

/// Positions for a reorder request.
///
/// Each id in `ordered` is placed at its index; modules not listed keep
/// their prior position. Listed modules win ties, then prior position
/// decides, and the result is re-linearized.
pub fn reorder(modules: &[Module], ordered: &[ModuleId]) -> Vec<(ModuleId, u32)> {
    let requested: HashMap<ModuleId, u32> = ordered
        .iter()
        .enumerate()
        .map(|(index, id)| (*id, index as u32))
        .collect();

    let mut slots: Vec<(u32, bool, u32, ModuleId)> = modules
        .iter()
        .map(|m| match requested.get(&m.id) {
            Some(index) => (*index, false, m.position, m.id),
            None => (m.position, true, m.position, m.id),
        })
        .collect();
    slots.sort();
    changed(slots.into_iter().map(|(_, _, prior, id)| (id, prior)))
}

fn changed(ordered: impl Iterator<Item = (ModuleId, u32)>) -> Vec<(ModuleId, u32)> {
    ordered
        .enumerate()
        .filter_map(|(index, (id, prior))| {
            let position = index as u32;
            (prior != position).then_some((id, position))
        })
        .collect()
}

/// Reloads a card's modules and writes whatever positions re-linearize them.
pub(crate) fn repack(store: &dyn ModuleStore, card_id: CardId) -> StoreResult<()> {
    let plan = linearize(&store.card_modules(card_id)?);
    if plan.is_empty() {
        return Ok(());
    }
    store.assign_positions(&plan)
}
