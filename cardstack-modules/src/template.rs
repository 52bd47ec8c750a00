use crate::engine::ModuleEngine;
use crate::error::{ModuleError, ModuleResult};
use crate::transition::MediaTransition;
use cardstack_model::{Caller, CardSnapshot, ModuleKind, NewModule, registry};
use cardstack_types::{CardId, MediaId, ModuleId, TemplateId};
use std::collections::BTreeSet;
use tracing::debug;

impl ModuleEngine {
    /// Replaces a card's entire module set and style with a template's.
    ///
    /// The reference-count change is computed once, by comparing how many
    /// modules embed each media id before and after.
    /// Removal, creation, style and counts commit as one unit of work.
    pub fn apply_template(
        &self,
        caller: &Caller,
        card_id: CardId,
        template_id: TemplateId,
    ) -> ModuleResult<CardSnapshot> {
        self.authorize(caller, card_id)?;

        let template = self
            .store
            .template(template_id)
            .map_err(|e| ModuleError::internal("load template", e))?
            .ok_or_else(|| {
                ModuleError::InvalidRequest(format!("template {template_id} not found"))
            })?;
        if !template.enabled {
            return Err(ModuleError::InvalidRequest(format!(
                "template {template_id} is disabled"
            )));
        }
        let card = self.load_card(card_id)?;

        // Gated on the full template set whether or not the card is published.
        let kinds: Vec<ModuleKind> = template.modules.iter().map(|m| m.kind).collect();
        self.ensure_plan(&card, &kinds)?;

        for (index, blueprint) in template.modules.iter().enumerate() {
            registry::validate(blueprint.kind, &blueprint.data).map_err(|reason| {
                ModuleError::InvalidRequest(format!(
                    "template module {index} ({}) is invalid: {reason}",
                    blueprint.kind
                ))
            })?;
        }

        let template_media: BTreeSet<MediaId> = template
            .modules
            .iter()
            .flat_map(|m| registry::media_of(m.kind, &m.data))
            .collect();
        if !template_media.is_empty() {
            let ids: Vec<MediaId> = template_media.iter().copied().collect();
            self.media
                .check_medias(&ids)
                .map_err(|e| ModuleError::internal("check media", e))?;
        }

        let store = self.store.as_ref();
        let media = self.media.as_ref();
        let mut replaced = 0;
        store
            .transaction(&mut || {
                let current = store.card_modules(card_id)?;
                MediaTransition::replace(
                    current.iter().map(|m| registry::media_of(m.kind, &m.data)),
                    template.modules.iter().map(|m| registry::media_of(m.kind, &m.data)),
                )
                .apply(media)?;

                let current_ids: Vec<ModuleId> = current.iter().map(|m| m.id).collect();
                store.remove_modules(&current_ids)?;
                for (position, blueprint) in template.modules.iter().enumerate() {
                    store.create_module(NewModule {
                        card_id,
                        kind: blueprint.kind,
                        variant: blueprint.variant.clone(),
                        data: blueprint.data.clone(),
                        position: position as u32,
                        visible: blueprint.visible,
                    })?;
                }
                store.apply_card_style(card_id, &template.style)?;
                replaced = current_ids.len();
                Ok(())
            })
            .map_err(|e| ModuleError::internal("apply template", e))?;

        debug!(
            "Applied template {} to card {}: {} module(s) replaced by {}",
            template_id,
            card_id,
            replaced,
            template.modules.len()
        );
        self.finish(card_id)
    }
}
