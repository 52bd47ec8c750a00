use crate::{CardStyle, ModuleKind};
use cardstack_types::TemplateId;
use serde::{Deserialize, Serialize};

/// A reusable card layout: a style plus a full, ordered module list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    pub label: String,
    pub enabled: bool,
    pub style: CardStyle,
    pub modules: Vec<TemplateModule>,
}

/// A module blueprint inside a template. Its position is its index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateModule {
    pub kind: ModuleKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    pub data: serde_json::Value,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

impl TemplateModule {
    /// Creates a visible blueprint with no variant.
    pub fn new(kind: ModuleKind, data: serde_json::Value) -> Self {
        Self {
            kind,
            variant: None,
            data,
            visible: true,
        }
    }
}
