//! Core card model for Cardstack.
//!
//! Defines the types every module operation works with:
//! - [`Card`]: the owner of an ordered module list (handle, published flag, style)
//! - [`Module`]: one content block: kind tag, optional variant, JSON payload, position
//! - [`ModuleKind`]: the closed set of supported content blocks
//! - [`Template`]: a reusable style plus module list applied wholesale to a card
//! - [`Role`] / [`Caller`]: who is acting and with what right on a card
//! - [`registry`]: the kind → {validator, media extractor} lookup table
//!
//! Payloads stay JSON (`serde_json::Value`). The kind tag selects the
//! descriptor that knows the payload's shape and where media ids live in it.

mod access;
mod card;
mod kind;
mod module;
mod payload;
pub mod registry;
mod template;

pub use access::{Caller, Role};
pub use card::{Card, CardSnapshot, CardStyle};
pub use kind::{ModuleKind, UnknownKind};
pub use module::{Module, NewModule};
pub use registry::{MediaExtractor, ModuleKindDescriptor, Validator};
pub use template::{Template, TemplateModule};
