mod common;

use cardstack_model::{CardStyle, ModuleKind, Role, Template, TemplateModule};
use cardstack_modules::{EngineConfig, ModuleError, SaveModule};
use cardstack_storage::{ModuleStore, ReferenceCall};
use cardstack_types::{CardId, MediaId, TemplateId};
use common::{Fixture, HANDLE, photo_data, text_data};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn sunset_style() -> CardStyle {
    CardStyle {
        theme: "sunset".to_string(),
        font: Some("Inter".to_string()),
        background_color: Some("#1d1d1f".to_string()),
        accent_color: Some("#ff6f3c".to_string()),
        layout: Some("centered".to_string()),
    }
}

fn insert_template(fx: &Fixture, modules: Vec<TemplateModule>) -> TemplateId {
    fx.backend
        .insert_template(Template {
            id: TemplateId::new(),
            label: "Sunset".to_string(),
            enabled: true,
            style: sunset_style(),
            modules,
        })
        .unwrap()
}

fn kinds_and_data(fx: &Fixture) -> Vec<(ModuleKind, Value)> {
    fx.backend
        .card_modules(fx.card)
        .unwrap()
        .into_iter()
        .map(|m| (m.kind, m.data))
        .collect()
}

fn card_style(fx: &Fixture, card: CardId) -> CardStyle {
    fx.backend.card(card).unwrap().unwrap().style
}

// ── Replacement ──────────────────────────────────────────────────

#[test]
fn template_replaces_modules_with_one_media_transition() {
    let fx = Fixture::new();
    let (m1, m2, m3) = (fx.media(1), fx.media(1), fx.media(0));
    fx.seed(ModuleKind::Photo, photo_data(m1));
    fx.seed(ModuleKind::Photo, photo_data(m2));
    let template = insert_template(
        &fx,
        vec![
            TemplateModule::new(ModuleKind::Photo, photo_data(m2)),
            TemplateModule::new(ModuleKind::Photo, photo_data(m3)),
        ],
    );

    let snapshot = fx.engine.apply_template(&fx.caller, fx.card, template).unwrap();

    assert_eq!(
        fx.backend.reference_calls().unwrap(),
        vec![ReferenceCall { added: vec![m3], removed: vec![m1] }]
    );
    assert_eq!((fx.refs(m1), fx.refs(m2), fx.refs(m3)), (0, 1, 1));
    assert_eq!(
        snapshot.modules.iter().map(|m| m.position).collect::<Vec<_>>(),
        vec![0, 1]
    );
    assert_eq!(
        kinds_and_data(&fx),
        vec![
            (ModuleKind::Photo, photo_data(m2)),
            (ModuleKind::Photo, photo_data(m3)),
        ]
    );
    assert_eq!(snapshot.card.style, sunset_style());
    assert_eq!(card_style(&fx, fx.card), sunset_style());
}

#[test]
fn template_with_same_media_makes_no_reference_call() {
    let fx = Fixture::new();
    let m = fx.media(1);
    let old = fx.seed(ModuleKind::Photo, photo_data(m));
    let template = insert_template(
        &fx,
        vec![
            TemplateModule::new(ModuleKind::Text, text_data("welcome")),
            TemplateModule::new(ModuleKind::Photo, photo_data(m)),
        ],
    );

    let snapshot = fx.engine.apply_template(&fx.caller, fx.card, template).unwrap();

    assert!(fx.backend.reference_calls().unwrap().is_empty());
    assert_eq!(fx.refs(m), 1);
    assert!(snapshot.module(old.id).is_none());
    assert_eq!(snapshot.modules.len(), 2);
}

#[test]
fn template_counts_one_reference_per_embedding_module() {
    let fx = Fixture::new();
    let m = fx.media(0);
    let template = insert_template(
        &fx,
        vec![
            TemplateModule::new(ModuleKind::Photo, photo_data(m)),
            TemplateModule::new(ModuleKind::Photo, photo_data(m)),
        ],
    );

    let snapshot = fx.engine.apply_template(&fx.caller, fx.card, template).unwrap();
    assert_eq!(fx.refs(m), 2);
    assert_eq!(
        fx.backend.reference_calls().unwrap(),
        vec![ReferenceCall { added: vec![m, m], removed: vec![] }]
    );

    // The survivor still embeds the media, so it stays referenced.
    let first = snapshot.modules[0].id;
    let rest = fx.engine.delete_modules(&fx.caller, &[first]).unwrap();
    assert_eq!(rest.modules[0].get_str("/image"), Some(m.to_string().as_str()));
    assert_eq!(fx.refs(m), 1);
}

#[test]
fn template_releases_every_reference_of_replaced_modules() {
    let fx = Fixture::new();
    let m = fx.media(0);
    for _ in 0..2 {
        fx.engine
            .save_module(
                &fx.caller,
                SaveModule::create(ModuleKind::Photo, fx.card, photo_data(m)),
            )
            .unwrap();
    }
    assert_eq!(fx.refs(m), 2);
    let template = insert_template(
        &fx,
        vec![TemplateModule::new(ModuleKind::Text, text_data("fresh"))],
    );

    fx.engine.apply_template(&fx.caller, fx.card, template).unwrap();

    assert_eq!(fx.refs(m), 0);
    assert_eq!(
        fx.backend.reference_calls().unwrap().last(),
        Some(&ReferenceCall { added: vec![], removed: vec![m, m] })
    );
}

#[test]
fn template_adjusts_only_the_count_difference() {
    let fx = Fixture::new();
    let (shared, gone) = (fx.media(1), fx.media(1));
    fx.seed(ModuleKind::Photo, photo_data(shared));
    fx.seed(ModuleKind::Photo, photo_data(gone));
    let template = insert_template(
        &fx,
        vec![
            TemplateModule::new(ModuleKind::Photo, photo_data(shared)),
            TemplateModule::new(ModuleKind::Photo, photo_data(shared)),
            TemplateModule::new(ModuleKind::Photo, photo_data(shared)),
        ],
    );

    fx.engine.apply_template(&fx.caller, fx.card, template).unwrap();

    assert_eq!(
        fx.backend.reference_calls().unwrap(),
        vec![ReferenceCall { added: vec![shared, shared], removed: vec![gone] }]
    );
    assert_eq!((fx.refs(shared), fx.refs(gone)), (3, 0));
}

#[test]
fn template_replaces_hidden_modules_too() {
    let fx = Fixture::new();
    let m = fx.media(1);
    let hidden = fx.seed(ModuleKind::Photo, photo_data(m));
    fx.engine
        .set_modules_visibility(&fx.caller, &[hidden.id], false)
        .unwrap();
    let template = insert_template(
        &fx,
        vec![TemplateModule::new(ModuleKind::Text, text_data("only"))],
    );

    fx.engine.apply_template(&fx.caller, fx.card, template).unwrap();

    assert_eq!(fx.refs(m), 0);
    assert_eq!(kinds_and_data(&fx), vec![(ModuleKind::Text, text_data("only"))]);
}

#[test]
fn template_keeps_blueprint_visibility_and_variant() {
    let fx = Fixture::new();
    let mut hidden = TemplateModule::new(ModuleKind::Text, text_data("draft"));
    hidden.visible = false;
    let mut styled = TemplateModule::new(ModuleKind::Heading, json!({"title": "Hi"}));
    styled.variant = Some("large".to_string());
    let template = insert_template(&fx, vec![styled, hidden]);

    let snapshot = fx.engine.apply_template(&fx.caller, fx.card, template).unwrap();

    assert_eq!(snapshot.modules[0].variant.as_deref(), Some("large"));
    assert!(snapshot.modules[0].visible);
    assert!(!snapshot.modules[1].visible);
}

#[test]
fn empty_template_clears_card() {
    let fx = Fixture::new();
    fx.seed(ModuleKind::Text, text_data("a"));
    let template = insert_template(&fx, vec![]);

    let snapshot = fx.engine.apply_template(&fx.caller, fx.card, template).unwrap();

    assert!(snapshot.modules.is_empty());
    assert_eq!(snapshot.card.style, sunset_style());
}

// ── Rejections ───────────────────────────────────────────────────

#[test]
fn missing_or_disabled_template_is_invalid() {
    let fx = Fixture::new();
    let err = fx
        .engine
        .apply_template(&fx.caller, fx.card, TemplateId::new())
        .unwrap_err();
    assert!(matches!(err, ModuleError::InvalidRequest(_)));

    let disabled = fx
        .backend
        .insert_template(Template {
            id: TemplateId::new(),
            label: "Retired".to_string(),
            enabled: false,
            style: sunset_style(),
            modules: vec![],
        })
        .unwrap();
    let err = fx.engine.apply_template(&fx.caller, fx.card, disabled).unwrap_err();
    assert!(matches!(err, ModuleError::InvalidRequest(msg) if msg.contains("disabled")));
}

#[test]
fn viewer_cannot_apply_template() {
    let fx = Fixture::new();
    let template = insert_template(&fx, vec![]);
    let viewer = fx.caller_with(Role::Viewer);

    let err = fx.engine.apply_template(&viewer, fx.card, template).unwrap_err();

    assert!(matches!(err, ModuleError::Forbidden(_)));
    assert_eq!(card_style(&fx, fx.card), CardStyle::default());
}

#[test]
fn template_is_gated_even_on_unpublished_cards() {
    let fx = Fixture::new();
    let template = insert_template(
        &fx,
        vec![TemplateModule::new(
            ModuleKind::Video,
            json!({"url": "https://video.example/intro"}),
        )],
    );

    let err = fx.engine.apply_template(&fx.caller, fx.card, template).unwrap_err();
    assert!(matches!(err, ModuleError::SubscriptionRequired(_)));

    fx.backend.subscribe(fx.owner).unwrap();
    let snapshot = fx.engine.apply_template(&fx.caller, fx.card, template).unwrap();
    assert_eq!(snapshot.modules[0].kind, ModuleKind::Video);
}

#[test]
fn template_gating_counts_template_modules_only() {
    let mut config = EngineConfig::default();
    config.gating.free_modules = 2;
    let fx = Fixture::build(config, false);
    for i in 0..4 {
        fx.seed(ModuleKind::Text, text_data(&format!("old {i}")));
    }
    let template = insert_template(
        &fx,
        vec![
            TemplateModule::new(ModuleKind::Text, text_data("a")),
            TemplateModule::new(ModuleKind::Text, text_data("b")),
        ],
    );

    let snapshot = fx.engine.apply_template(&fx.caller, fx.card, template).unwrap();
    assert_eq!(snapshot.modules.len(), 2);
}

#[test]
fn invalid_blueprint_rejects_whole_template() {
    let fx = Fixture::new();
    let existing = fx.seed(ModuleKind::Text, text_data("keep"));
    let template = insert_template(
        &fx,
        vec![
            TemplateModule::new(ModuleKind::Text, text_data("fine")),
            TemplateModule::new(ModuleKind::Heading, json!({"title": ""})),
        ],
    );

    let err = fx.engine.apply_template(&fx.caller, fx.card, template).unwrap_err();

    assert!(matches!(err, ModuleError::InvalidRequest(msg) if msg.contains("template module 1")));
    assert_eq!(fx.layout(), vec![(existing.id, 0)]);
    assert_eq!(fx.backend.write_count(), 0);
}

#[test]
fn unknown_template_media_is_internal() {
    let fx = Fixture::new();
    let template = insert_template(
        &fx,
        vec![TemplateModule::new(
            ModuleKind::Photo,
            photo_data(MediaId::new()),
        )],
    );

    let err = fx.engine.apply_template(&fx.caller, fx.card, template).unwrap_err();

    assert!(matches!(err, ModuleError::Internal(_)));
    assert_eq!(fx.backend.write_count(), 0);
}

#[test]
fn granted_role_on_missing_card_is_invalid() {
    let fx = Fixture::new();
    let template = insert_template(&fx, vec![]);
    let missing = CardId::new();
    fx.backend.grant(fx.owner, missing, Role::Editor).unwrap();

    let err = fx
        .engine
        .apply_template(&fx.caller, missing, template)
        .unwrap_err();

    assert!(matches!(err, ModuleError::InvalidRequest(msg) if msg.contains("not found")));
    assert_eq!(fx.backend.write_count(), 0);
}

#[test]
fn unknown_card_is_forbidden() {
    let fx = Fixture::new();
    let template = insert_template(&fx, vec![]);

    let err = fx
        .engine
        .apply_template(&fx.caller, CardId::new(), template)
        .unwrap_err();

    assert!(matches!(err, ModuleError::Forbidden(_)));
}

// ── Atomicity ────────────────────────────────────────────────────

#[test]
fn failed_template_rolls_back_modules_style_and_counts() {
    let fx = Fixture::new();
    let (m1, m2) = (fx.media(1), fx.media(0));
    let old = fx.seed(ModuleKind::Photo, photo_data(m1));
    let template = insert_template(
        &fx,
        vec![TemplateModule::new(ModuleKind::Photo, photo_data(m2))],
    );
    fx.backend.fail_next_write();

    let err = fx.engine.apply_template(&fx.caller, fx.card, template).unwrap_err();

    assert!(matches!(err, ModuleError::Internal(_)));
    assert_eq!(fx.layout(), vec![(old.id, 0)]);
    assert_eq!((fx.refs(m1), fx.refs(m2)), (1, 0));
    assert_eq!(card_style(&fx, fx.card), CardStyle::default());
    assert!(fx.backend.invalidations().unwrap().is_empty());
}

#[test]
fn applied_template_invalidates_card_cache() {
    let fx = Fixture::new();
    let template = insert_template(&fx, vec![]);

    fx.engine.apply_template(&fx.caller, fx.card, template).unwrap();

    assert_eq!(fx.backend.invalidations().unwrap(), vec![HANDLE.to_string()]);
}
