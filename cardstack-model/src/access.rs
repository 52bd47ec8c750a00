use cardstack_types::ProfileId;
use serde::{Deserialize, Serialize};

/// Permission level a profile holds on a card.
///
/// Variants are declared in ascending order so `>=` comparisons express
/// "at least this right".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Viewer,
    Editor,
    Admin,
    Owner,
}

impl Role {
    /// Whether this role may change a card's modules.
    pub fn can_edit(self) -> bool {
        self >= Role::Editor
    }
}

/// The identity an operation runs on behalf of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    /// No resolved session.
    Anonymous,
    /// A resolved profile.
    Profile(ProfileId),
}

impl Caller {
    /// Returns the profile id, if any.
    pub fn profile(&self) -> Option<ProfileId> {
        match self {
            Self::Anonymous => None,
            Self::Profile(id) => Some(*id),
        }
    }
}
