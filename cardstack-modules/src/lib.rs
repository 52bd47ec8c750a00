//! Module persistence engine for Cardstack.
//!
//! [`ModuleEngine`] is the only entry point that changes a card's modules.
//! It keeps these invariants across every operation:
//! - positions of a card's modules are always `0..N-1`, no gaps or duplicates
//! - a module's card and kind never change after creation
//! - payloads pass their kind's validator before they are written
//! - every media id a module embeds is counted in the reference ledger, and
//!   the count changes in the same unit of work as the module write
//!
//! # Operations
//!
//! - [`ModuleEngine::save_module`]: create or update one module
//! - [`ModuleEngine::delete_modules`], [`ModuleEngine::reorder_modules`],
//!   [`ModuleEngine::duplicate_modules`], [`ModuleEngine::set_modules_visibility`]
//! - [`ModuleEngine::apply_template`]: replace a card's whole module set
//! - [`ModuleEngine::list_modules`]: read a card's modules as the caller may see them
//!
//! Input and authorization failures are detected before any write. Every
//! collaborator failure is logged and surfaces as [`ModuleError::Internal`].
//! Cache invalidation runs after commit and never affects the outcome.

mod batch;
mod config;
mod engine;
mod error;
mod invalidation;
pub mod positions;
mod save;
mod template;
mod transition;

pub use batch::DuplicateOutcome;
pub use config::{ConfigError, EngineConfig, GatingConfig};
pub use engine::{Collaborators, ModuleEngine};
pub use error::{ModuleError, ModuleResult};
pub use save::SaveModule;
