//! Storage layer for Cardstack modules.
//!
//! Defines the collaborators the module engine depends on and never
//! implements itself:
//! - [`ModuleStore`]: card/module/template persistence plus the
//!   `transaction` unit-of-work primitive
//! - [`MediaLibrary`]: media existence checks and reference-count transitions
//! - [`PermissionResolver`] / [`SubscriptionLookup`]: role and plan lookups
//! - [`CacheInvalidator`]: best-effort invalidation by card handle
//!
//! # Transactions
//!
//! Every write the engine issues runs inside [`ModuleStore::transaction`].
//! Implementations must make the unit of work all-or-nothing, including any
//! reference-count changes made through a [`MediaLibrary`] that shares the
//! same backend, and must let nested calls join the outer unit of work.
//! Isolation between concurrent units of work is the backend's own.
//!
//! [`MemoryBackend`] implements every trait over one in-process state and is
//! what the engine's tests run against.

mod access;
mod cache;
mod error;
mod media;
mod memory;
mod store;

pub use access::{PermissionResolver, SubscriptionLookup};
pub use cache::CacheInvalidator;
pub use error::{StoreError, StoreResult};
pub use media::MediaLibrary;
pub use memory::{MemoryBackend, ReferenceCall};
pub use store::ModuleStore;
