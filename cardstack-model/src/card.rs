use crate::Module;
use cardstack_types::{CardId, ModuleId, ProfileId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A visual card composed of an ordered list of modules.
///
/// Modules are stored separately and keyed by `card_id`; see
/// [`CardSnapshot`] for a card together with its modules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub owner: ProfileId,
    /// External-facing handle (e.g. a public slug). Cache entries are keyed by it.
    pub handle: Option<String>,
    pub published: bool,
    pub style: CardStyle,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    /// Creates an unpublished card with default style.
    pub fn new(owner: ProfileId) -> Self {
        let now = Utc::now();
        Self {
            id: CardId::new(),
            owner,
            handle: None,
            published: false,
            style: CardStyle::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the external handle.
    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = Some(handle.into());
        self
    }

    /// Marks the card as published.
    pub fn published(mut self) -> Self {
        self.published = true;
        self
    }
}

/// Presentation fields of a card. Templates carry one and overwrite the
/// card's on application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardStyle {
    pub theme: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
}

impl Default for CardStyle {
    fn default() -> Self {
        Self {
            theme: "default".to_string(),
            font: None,
            background_color: None,
            accent_color: None,
            layout: None,
        }
    }
}

/// A card as seen right after a read or a committed mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSnapshot {
    pub card: Card,
    /// Modules in ascending position order.
    pub modules: Vec<Module>,
}

impl CardSnapshot {
    /// Looks up a module of this card by id.
    pub fn module(&self, id: ModuleId) -> Option<&Module> {
        self.modules.iter().find(|m| m.id == id)
    }

    /// Returns the module ids in position order.
    pub fn module_ids(&self) -> Vec<ModuleId> {
        self.modules.iter().map(|m| m.id).collect()
    }
}
