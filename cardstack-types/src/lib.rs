//! Core type definitions for Cardstack.
//!
//! This crate defines the identifiers every other crate in the workspace
//! passes around:
//! - Card, module, media, template and profile identifiers (UUID v7)
//!
//! All identifiers here are already-resolved internal ids. Decoding
//! externally-facing handles is the caller's concern.

mod ids;

pub use ids::{CardId, MediaId, ModuleId, ProfileId, TemplateId};
