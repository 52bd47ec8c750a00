use crate::error::StoreResult;
use cardstack_model::{Card, CardStyle, Module, NewModule, Template};
use cardstack_types::{CardId, ModuleId, TemplateId};

/// Persistence for cards, modules and templates.
pub trait ModuleStore: Send + Sync {
    /// Loads a card.
    fn card(&self, id: CardId) -> StoreResult<Option<Card>>;

    /// Loads a template.
    fn template(&self, id: TemplateId) -> StoreResult<Option<Template>>;

    /// Loads a single module.
    fn module(&self, id: ModuleId) -> StoreResult<Option<Module>>;

    /// Loads the modules among `ids` that exist. Order is unspecified.
    fn modules(&self, ids: &[ModuleId]) -> StoreResult<Vec<Module>>;

    /// Loads every module of a card, hidden ones included, ordered by
    /// position and then by id.
    fn card_modules(&self, card_id: CardId) -> StoreResult<Vec<Module>>;

    /// Position a module appended to the card would take.
    fn next_position(&self, card_id: CardId) -> StoreResult<u32>;

    /// Persists a new module and returns it with its assigned id.
    fn create_module(&self, module: NewModule) -> StoreResult<Module>;

    /// Replaces a module's payload and variant.
    fn update_module(
        &self,
        id: ModuleId,
        data: &serde_json::Value,
        variant: Option<&str>,
    ) -> StoreResult<()>;

    /// Removes modules. Unknown ids are ignored.
    fn remove_modules(&self, ids: &[ModuleId]) -> StoreResult<()>;

    /// Writes the given positions.
    fn assign_positions(&self, positions: &[(ModuleId, u32)]) -> StoreResult<()>;

    /// Sets the `visible` flag on every module in `ids`.
    fn set_visibility(&self, ids: &[ModuleId], visible: bool) -> StoreResult<()>;

    /// Overwrites a card's style and bumps its update timestamp.
    fn apply_card_style(&self, card_id: CardId, style: &CardStyle) -> StoreResult<()>;

    /// Runs `work` as one unit of work. All writes made inside commit
    /// together or not at all; a nested call joins the enclosing unit.
    fn transaction(&self, work: &mut dyn FnMut() -> StoreResult<()>) -> StoreResult<()>;
}
