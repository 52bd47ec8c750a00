//! Identifier types used throughout the Cardstack core.
//!
//! Uses UUID v7 for time-ordered, globally unique identifiers. Ordering an
//! id set therefore orders it by creation time, which the storage layer
//! relies on to break position ties deterministically.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new identifier with the current timestamp.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an identifier from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> Uuid {
                self.0
            }

            /// Parses an identifier from a string.
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

define_id! {
    /// Unique identifier for a card.
    CardId
}

define_id! {
    /// Unique identifier for a module (content block) on a card.
    ModuleId
}

define_id! {
    /// Unique identifier for a content-addressed media asset.
    ///
    /// Media is never owned by a module; modules only reference it and the
    /// reference-count ledger tracks how many do.
    MediaId
}

define_id! {
    /// Unique identifier for a card template.
    TemplateId
}

define_id! {
    /// Unique identifier for a user profile acting on cards.
    ProfileId
}
