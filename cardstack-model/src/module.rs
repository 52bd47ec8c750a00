use crate::ModuleKind;
use cardstack_types::{CardId, ModuleId};
use serde::{Deserialize, Serialize};

/// One ordered content block on a card.
///
/// `id`, `card_id` and `kind` never change after creation. `data` is the
/// kind-specific payload; its shape is checked by the kind's descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub id: ModuleId,
    pub card_id: CardId,
    pub kind: ModuleKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    pub data: serde_json::Value,
    /// Zero-based, contiguous per card.
    pub position: u32,
    pub visible: bool,
}

impl Module {
    /// Extract a string value from `data` using a JSON pointer (e.g., "/content").
    pub fn get_str(&self, pointer: &str) -> Option<&str> {
        self.data.pointer(pointer).and_then(|v| v.as_str())
    }
}

/// A module that has not been persisted yet. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewModule {
    pub card_id: CardId,
    pub kind: ModuleKind,
    pub variant: Option<String>,
    pub data: serde_json::Value,
    pub position: u32,
    pub visible: bool,
}
