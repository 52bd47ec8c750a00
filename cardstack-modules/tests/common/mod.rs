//! Shared fixtures for engine tests.

#![allow(dead_code)]

use cardstack_model::{Caller, Card, Module, ModuleKind, NewModule, Role};
use cardstack_modules::{Collaborators, EngineConfig, ModuleEngine};
use cardstack_storage::{MemoryBackend, ModuleStore};
use cardstack_types::{CardId, MediaId, ModuleId, ProfileId};
use serde_json::{Value, json};
use std::sync::Arc;

pub const HANDLE: &str = "biz1";

/// An engine over a fresh in-memory backend holding one card owned by `owner`.
pub struct Fixture {
    pub backend: Arc<MemoryBackend>,
    pub engine: ModuleEngine,
    pub owner: ProfileId,
    pub caller: Caller,
    pub card: CardId,
}

impl Fixture {
    pub fn new() -> Self {
        Self::build(EngineConfig::default(), false)
    }

    pub fn published() -> Self {
        Self::build(EngineConfig::default(), true)
    }

    pub fn build(config: EngineConfig, published: bool) -> Self {
        let backend = Arc::new(MemoryBackend::new());
        let owner = ProfileId::new();
        let mut card = Card::new(owner).with_handle(HANDLE);
        card.published = published;
        let card = backend.insert_card(card).unwrap();
        let engine = ModuleEngine::new(Collaborators::shared(backend.clone()), config);
        Self {
            backend,
            engine,
            owner,
            caller: Caller::Profile(owner),
            card,
        }
    }

    /// A caller holding `role` on the fixture card.
    pub fn caller_with(&self, role: Role) -> Caller {
        let profile = ProfileId::new();
        self.backend.grant(profile, self.card, role).unwrap();
        Caller::Profile(profile)
    }

    /// Another card owned by the same profile.
    pub fn second_card(&self) -> CardId {
        self.backend.insert_card(Card::new(self.owner)).unwrap()
    }

    /// Registers a media asset with `references` existing references.
    pub fn media(&self, references: u32) -> MediaId {
        let id = MediaId::new();
        self.backend.insert_media(id, references).unwrap();
        id
    }

    pub fn refs(&self, id: MediaId) -> u32 {
        self.backend.media_references(id).unwrap().unwrap()
    }

    /// Seeds a module at the card's next position without going through the engine.
    pub fn seed(&self, kind: ModuleKind, data: Value) -> Module {
        self.seed_on(self.card, kind, data)
    }

    pub fn seed_on(&self, card_id: CardId, kind: ModuleKind, data: Value) -> Module {
        let position = self.backend.next_position(card_id).unwrap();
        self.seed_at(card_id, kind, data, position)
    }

    pub fn seed_at(&self, card_id: CardId, kind: ModuleKind, data: Value, position: u32) -> Module {
        self.backend
            .insert_module(NewModule {
                card_id,
                kind,
                variant: None,
                data,
                position,
                visible: true,
            })
            .unwrap()
    }

    pub fn module(&self, id: ModuleId) -> Module {
        self.backend.module(id).unwrap().unwrap()
    }

    /// `(id, position)` of every module on the fixture card, in order.
    pub fn layout(&self) -> Vec<(ModuleId, u32)> {
        self.backend
            .card_modules(self.card)
            .unwrap()
            .iter()
            .map(|m| (m.id, m.position))
            .collect()
    }
}

pub fn text_data(content: &str) -> Value {
    json!({ "content": content })
}

pub fn photo_data(image: MediaId) -> Value {
    json!({ "image": image })
}

pub fn carousel_data(images: &[MediaId]) -> Value {
    let images: Vec<Value> = images.iter().map(|id| json!({ "media": id })).collect();
    json!({ "images": images })
}

/// Routes engine logs to the test harness. Honors `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
