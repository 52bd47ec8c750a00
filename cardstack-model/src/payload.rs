//! Per-kind payload validators and media extractors.
//!
//! Validators are strict: they run before anything is persisted. Extractors
//! are lenient: they also run over payloads written before a rule existed,
//! so an id that does not parse is skipped rather than reported.

use cardstack_types::MediaId;
use serde_json::{Map, Value};

const MAX_TEXT_CHARS: usize = 10_000;
const MAX_TITLE_CHARS: usize = 200;
const MAX_LABEL_CHARS: usize = 80;
const MAX_CAROUSEL_IMAGES: usize = 20;
const LINK_SCHEMES: [&str; 4] = ["http://", "https://", "mailto:", "tel:"];

// ── Field helpers ────────────────────────────────────────────────

fn object(data: &Value) -> Result<&Map<String, Value>, String> {
    data.as_object()
        .ok_or_else(|| "payload must be a JSON object".to_string())
}

fn required_str<'a>(obj: &'a Map<String, Value>, field: &str) -> Result<&'a str, String> {
    match obj.get(field) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(format!("`{field}` must be a string")),
        None => Err(format!("`{field}` is required")),
    }
}

fn optional_str<'a>(obj: &'a Map<String, Value>, field: &str) -> Result<Option<&'a str>, String> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(format!("`{field}` must be a string")),
    }
}

fn non_empty<'a>(field: &str, value: &'a str) -> Result<&'a str, String> {
    if value.trim().is_empty() {
        return Err(format!("`{field}` must not be empty"));
    }
    Ok(value)
}

fn max_chars(field: &str, value: &str, max: usize) -> Result<(), String> {
    if value.chars().count() > max {
        return Err(format!("`{field}` exceeds {max} characters"));
    }
    Ok(())
}

fn media_ref(obj: &Map<String, Value>, field: &str) -> Result<Option<MediaId>, String> {
    match optional_str(obj, field)? {
        None => Ok(None),
        Some(raw) => MediaId::parse(raw)
            .map(Some)
            .map_err(|_| format!("`{field}` is not a valid media id")),
    }
}

fn array<'a>(obj: &'a Map<String, Value>, field: &str) -> Result<&'a Vec<Value>, String> {
    match obj.get(field) {
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(format!("`{field}` must be an array")),
        None => Err(format!("`{field}` is required")),
    }
}

fn link(field: &str, value: &str) -> Result<(), String> {
    if !LINK_SCHEMES.iter().any(|scheme| value.starts_with(scheme)) {
        return Err(format!("`{field}` must be an http(s), mailto or tel link"));
    }
    Ok(())
}

fn media_at(data: &Value, pointer: &str) -> Option<MediaId> {
    data.pointer(pointer)
        .and_then(Value::as_str)
        .and_then(|raw| MediaId::parse(raw).ok())
}

// ── text ─────────────────────────────────────────────────────────

pub(crate) fn validate_text(data: &Value) -> Result<(), String> {
    let obj = object(data)?;
    let content = required_str(obj, "content")?;
    max_chars("content", content, MAX_TEXT_CHARS)
}

// ── heading ──────────────────────────────────────────────────────

pub(crate) fn validate_heading(data: &Value) -> Result<(), String> {
    let obj = object(data)?;
    let title = non_empty("title", required_str(obj, "title")?)?;
    max_chars("title", title, MAX_TITLE_CHARS)?;
    if let Some(subtitle) = optional_str(obj, "subtitle")? {
        max_chars("subtitle", subtitle, MAX_TITLE_CHARS)?;
    }
    Ok(())
}

// ── photo ────────────────────────────────────────────────────────

pub(crate) fn validate_photo(data: &Value) -> Result<(), String> {
    let obj = object(data)?;
    if media_ref(obj, "image")?.is_none() {
        return Err("`image` is required".to_string());
    }
    optional_str(obj, "alt")?;
    if let Some(target) = optional_str(obj, "link")? {
        link("link", target)?;
    }
    Ok(())
}

pub(crate) fn photo_media(data: &Value) -> Vec<MediaId> {
    media_at(data, "/image").into_iter().collect()
}

// ── carousel ─────────────────────────────────────────────────────

pub(crate) fn validate_carousel(data: &Value) -> Result<(), String> {
    let obj = object(data)?;
    let images = array(obj, "images")?;
    if images.is_empty() {
        return Err("`images` must contain at least one image".to_string());
    }
    if images.len() > MAX_CAROUSEL_IMAGES {
        return Err(format!("`images` holds at most {MAX_CAROUSEL_IMAGES} images"));
    }
    for (i, image) in images.iter().enumerate() {
        let image = image
            .as_object()
            .ok_or_else(|| format!("`images[{i}]` must be an object"))?;
        if media_ref(image, "media")?.is_none() {
            return Err(format!("`images[{i}].media` is required"));
        }
        optional_str(image, "caption")?;
    }
    Ok(())
}

pub(crate) fn carousel_media(data: &Value) -> Vec<MediaId> {
    data.get("images")
        .and_then(Value::as_array)
        .map(|images| {
            images
                .iter()
                .filter_map(|image| media_at(image, "/media"))
                .collect()
        })
        .unwrap_or_default()
}

// ── button ───────────────────────────────────────────────────────

pub(crate) fn validate_button(data: &Value) -> Result<(), String> {
    let obj = object(data)?;
    let label = non_empty("label", required_str(obj, "label")?)?;
    max_chars("label", label, MAX_LABEL_CHARS)?;
    link("url", required_str(obj, "url")?)
}

// ── social_links ─────────────────────────────────────────────────

pub(crate) fn validate_social_links(data: &Value) -> Result<(), String> {
    let obj = object(data)?;
    for (i, entry) in array(obj, "links")?.iter().enumerate() {
        let entry = entry
            .as_object()
            .ok_or_else(|| format!("`links[{i}]` must be an object"))?;
        non_empty("network", required_str(entry, "network")?)?;
        non_empty("url", required_str(entry, "url")?)?;
    }
    Ok(())
}

// ── video ────────────────────────────────────────────────────────

pub(crate) fn validate_video(data: &Value) -> Result<(), String> {
    let obj = object(data)?;
    let url = non_empty("url", required_str(obj, "url")?)?;
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err("`url` must be an http(s) link".to_string());
    }
    media_ref(obj, "thumbnail")?;
    Ok(())
}

pub(crate) fn video_media(data: &Value) -> Vec<MediaId> {
    media_at(data, "/thumbnail").into_iter().collect()
}

// ── contact ──────────────────────────────────────────────────────

pub(crate) fn validate_contact(data: &Value) -> Result<(), String> {
    let obj = object(data)?;
    let email = optional_str(obj, "email")?.filter(|s| !s.trim().is_empty());
    let phone = optional_str(obj, "phone")?.filter(|s| !s.trim().is_empty());
    if email.is_none() && phone.is_none() {
        return Err("one of `email` or `phone` is required".to_string());
    }
    media_ref(obj, "avatar")?;
    Ok(())
}

pub(crate) fn contact_media(data: &Value) -> Vec<MediaId> {
    media_at(data, "/avatar").into_iter().collect()
}
