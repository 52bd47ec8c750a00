//! The module kind registry.
//!
//! A static table mapping each [`ModuleKind`] to an optional descriptor
//! holding its payload validator and media extractor. Kinds without payload
//! constraints or embedded media (a divider) have no entry.
//!
//! Adding a kind means adding one variant to [`ModuleKind`] and, if it needs
//! one, one row to the table below.

use crate::ModuleKind;
use crate::payload;
use cardstack_types::MediaId;
use serde_json::Value;
use std::collections::BTreeSet;

/// Accepts or rejects a payload. `Err` carries a human-readable reason.
pub type Validator = fn(&Value) -> Result<(), String>;

/// Lists the media ids embedded in a payload.
pub type MediaExtractor = fn(&Value) -> Vec<MediaId>;

/// Behavior bundle for one module kind.
#[derive(Debug, Clone, Copy)]
pub struct ModuleKindDescriptor {
    pub kind: ModuleKind,
    pub validator: Validator,
    /// `None` for kinds whose payload never embeds media.
    pub media_extractor: Option<MediaExtractor>,
}

impl ModuleKindDescriptor {
    /// Runs the validator over `data`.
    pub fn validate(&self, data: &Value) -> Result<(), String> {
        (self.validator)(data)
    }

    /// Returns the distinct media ids embedded in `data`.
    pub fn media(&self, data: &Value) -> BTreeSet<MediaId> {
        self.media_extractor
            .map(|extract| extract(data).into_iter().collect())
            .unwrap_or_default()
    }
}

static DESCRIPTORS: [ModuleKindDescriptor; 8] = [
    ModuleKindDescriptor {
        kind: ModuleKind::Text,
        validator: payload::validate_text,
        media_extractor: None,
    },
    ModuleKindDescriptor {
        kind: ModuleKind::Heading,
        validator: payload::validate_heading,
        media_extractor: None,
    },
    ModuleKindDescriptor {
        kind: ModuleKind::Photo,
        validator: payload::validate_photo,
        media_extractor: Some(payload::photo_media),
    },
    ModuleKindDescriptor {
        kind: ModuleKind::Carousel,
        validator: payload::validate_carousel,
        media_extractor: Some(payload::carousel_media),
    },
    ModuleKindDescriptor {
        kind: ModuleKind::Button,
        validator: payload::validate_button,
        media_extractor: None,
    },
    ModuleKindDescriptor {
        kind: ModuleKind::SocialLinks,
        validator: payload::validate_social_links,
        media_extractor: None,
    },
    ModuleKindDescriptor {
        kind: ModuleKind::Video,
        validator: payload::validate_video,
        media_extractor: Some(payload::video_media),
    },
    ModuleKindDescriptor {
        kind: ModuleKind::Contact,
        validator: payload::validate_contact,
        media_extractor: Some(payload::contact_media),
    },
];

/// Returns the descriptor registered for `kind`, if any.
pub fn lookup(kind: ModuleKind) -> Option<&'static ModuleKindDescriptor> {
    DESCRIPTORS.iter().find(|d| d.kind == kind)
}

/// Validates `data` for `kind`. Kinds without a descriptor accept anything.
pub fn validate(kind: ModuleKind, data: &Value) -> Result<(), String> {
    lookup(kind).map_or(Ok(()), |d| d.validate(data))
}

/// Returns the distinct media ids `data` embeds for `kind`; empty when the
/// kind has no descriptor.
pub fn media_of(kind: ModuleKind, data: &Value) -> BTreeSet<MediaId> {
    lookup(kind).map(|d| d.media(data)).unwrap_or_default()
}
