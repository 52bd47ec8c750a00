use crate::engine::ModuleEngine;
use crate::error::{ModuleError, ModuleResult};
use crate::transition::MediaTransition;
use cardstack_model::{Caller, CardSnapshot, ModuleKind, NewModule, registry};
use cardstack_types::{CardId, MediaId, ModuleId};
use std::collections::BTreeSet;
use tracing::debug;

/// A create-or-update request for a single module.
///
/// With `module_id` set this updates that module's payload and variant;
/// otherwise it appends a new visible module to the card.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveModule {
    pub kind: ModuleKind,
    pub card_id: CardId,
    pub module_id: Option<ModuleId>,
    pub variant: Option<String>,
    pub data: serde_json::Value,
}

impl SaveModule {
    /// Request to append a new module.
    pub fn create(kind: ModuleKind, card_id: CardId, data: serde_json::Value) -> Self {
        Self {
            kind,
            card_id,
            module_id: None,
            variant: None,
            data,
        }
    }

    /// Request to update an existing module. `kind` must match the module's.
    pub fn update(
        kind: ModuleKind,
        card_id: CardId,
        module_id: ModuleId,
        data: serde_json::Value,
    ) -> Self {
        Self {
            module_id: Some(module_id),
            ..Self::create(kind, card_id, data)
        }
    }

    /// Sets the sub-style variant.
    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }
}

impl ModuleEngine {
    /// Creates or updates one module and returns the refreshed card.
    ///
    /// The reference-count transition between the module's previous and new
    /// media sets commits in the same unit of work as the module write.
    pub fn save_module(&self, caller: &Caller, request: SaveModule) -> ModuleResult<CardSnapshot> {
        let SaveModule {
            kind,
            card_id,
            module_id,
            variant,
            data,
        } = request;

        self.authorize(caller, card_id)?;
        let card = self.load_card(card_id)?;

        // Only published cards are gated on this path.
        if card.published {
            let mut kinds: Vec<ModuleKind> = self
                .store
                .card_modules(card_id)
                .map_err(|e| ModuleError::internal("load modules", e))?
                .iter()
                .map(|m| m.kind)
                .collect();
            if module_id.is_none() {
                kinds.push(kind);
            }
            self.ensure_plan(&card, &kinds)?;
        }

        let descriptor = registry::lookup(kind);
        if let Some(descriptor) = descriptor {
            descriptor.validate(&data).map_err(|reason| {
                ModuleError::InvalidRequest(format!("invalid {kind} payload: {reason}"))
            })?;
        }

        let prior_media = match module_id {
            Some(id) => {
                let existing = self
                    .store
                    .module(id)
                    .map_err(|e| ModuleError::internal("load module", e))?
                    .ok_or_else(|| ModuleError::InvalidRequest(format!("module {id} not found")))?;
                if existing.card_id != card_id {
                    return Err(ModuleError::InvalidRequest(format!(
                        "module {id} belongs to another card"
                    )));
                }
                if existing.kind != kind {
                    return Err(ModuleError::InvalidRequest(format!(
                        "module {id} is a {} module and cannot become {kind}",
                        existing.kind
                    )));
                }
                descriptor
                    .map(|d| d.media(&existing.data))
                    .unwrap_or_default()
            }
            None => BTreeSet::new(),
        };

        let next_media = descriptor.map(|d| d.media(&data)).unwrap_or_default();
        if !next_media.is_empty() {
            let ids: Vec<MediaId> = next_media.iter().copied().collect();
            self.media
                .check_medias(&ids)
                .map_err(|e| ModuleError::internal("check media", e))?;
        }

        let transition = MediaTransition::between(&prior_media, &next_media);
        let store = self.store.as_ref();
        let media = self.media.as_ref();
        store
            .transaction(&mut || {
                transition.apply(media)?;
                match module_id {
                    Some(id) => store.update_module(id, &data, variant.as_deref()),
                    None => {
                        let position = store.next_position(card_id)?;
                        store
                            .create_module(NewModule {
                                card_id,
                                kind,
                                variant: variant.clone(),
                                data: data.clone(),
                                position,
                                visible: true,
                            })
                            .map(|_| ())
                    }
                }
            })
            .map_err(|e| ModuleError::internal("save module", e))?;

        debug!(
            "Saved {} module on card {} (+{} / -{} media refs)",
            kind,
            card_id,
            transition.added.len(),
            transition.removed.len()
        );
        self.finish(card_id)
    }
}
