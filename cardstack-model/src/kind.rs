use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of module kinds a card can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    Text,
    Heading,
    Photo,
    Carousel,
    Button,
    Divider,
    SocialLinks,
    Video,
    Contact,
}

impl ModuleKind {
    /// Every kind, in declaration order.
    pub const ALL: [ModuleKind; 9] = [
        Self::Text,
        Self::Heading,
        Self::Photo,
        Self::Carousel,
        Self::Button,
        Self::Divider,
        Self::SocialLinks,
        Self::Video,
        Self::Contact,
    ];

    /// Returns the wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Heading => "heading",
            Self::Photo => "photo",
            Self::Carousel => "carousel",
            Self::Button => "button",
            Self::Divider => "divider",
            Self::SocialLinks => "social_links",
            Self::Video => "video",
            Self::Contact => "contact",
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing a kind name that is not in [`ModuleKind::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown module kind: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for ModuleKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}
