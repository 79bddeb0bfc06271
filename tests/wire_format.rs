//! Wire format conformance tests
//!
//! Validates that routing outcomes serialize to the committed JSON fixtures
//! in tests/fixtures/. The entry point decodes exactly this shape.
//!
//! ## Fixture regeneration
//!
//! To regenerate fixtures after an intentional wire format change:
//! ```bash
//! REGENERATE_FIXTURES=1 cargo test --test wire_format
//! ```

use serde_json::Value;
use share_router::share::model::keys::{EXTRA_STREAM, EXTRA_TEXT};
use share_router::{ContentRef, ExtraValue, InboundRequest, RoutingOutcome, ShareAction, ShareRouter};
use std::path::PathBuf;

/// Fixture directory resolved via CARGO_MANIFEST_DIR.
fn fixtures_dir() -> PathBuf {
    let fixtures = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    assert!(
        fixtures.exists(),
        "Fixture directory does not exist at {}",
        fixtures.display()
    );
    fixtures
}

/// Load a committed fixture by name (without .json extension).
fn load_fixture(name: &str) -> Value {
    let path = fixtures_dir().join(format!("{name}.json"));
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {e}", path.display()));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {e}", path.display()))
}

/// Write a fixture to disk (for regeneration mode).
fn write_fixture(name: &str, value: &Value) {
    let path = fixtures_dir().join(format!("{name}.json"));
    let content = serde_json::to_string_pretty(value).unwrap();
    std::fs::write(&path, format!("{content}\n"))
        .unwrap_or_else(|e| panic!("Failed to write fixture {}: {e}", path.display()));
    eprintln!("Regenerated fixture: {}", path.display());
}

/// Inbound request whose routing outcome the fixture records.
fn inbound_for(fixture_name: &str) -> InboundRequest {
    match fixture_name {
        "text-share" => InboundRequest::new(ShareAction::Send)
            .with_content_type("text/plain")
            .with_extra(EXTRA_TEXT, "hello")
            .with_raw_extra("com.example.thread_id", ExtraValue::Int(17)),
        "single-image" => {
            let image = ContentRef::from("content://media/external/images/42");
            InboundRequest::new(ShareAction::Send)
                .with_content_type("image/jpeg")
                .with_primary_data(image.clone())
                .with_clip_item(image.clone())
                .with_extra(EXTRA_STREAM, ExtraValue::Uri(image))
        }
        "multiple-images" => InboundRequest::new(ShareAction::SendMultiple)
            .with_content_type("image/png")
            .with_clip_item("content://media/a")
            .with_clip_item("content://media/b")
            .with_clip_item("content://media/c"),
        "relaunch-ignored" => InboundRequest::new(ShareAction::Main),
        other => panic!("Unknown fixture: {other}"),
    }
}

const FIXTURES: &[&str] = &[
    "text-share",
    "single-image",
    "multiple-images",
    "relaunch-ignored",
];

/// Fields every forwarded fixture must carry, even when empty.
const REQUIRED_FORWARD_FIELDS: &[&str] = &[
    "action",
    "content_type",
    "data",
    "clip_items",
    "extras",
    "flags",
];

#[test]
fn routing_outcomes_match_committed_fixtures() {
    let regenerate = std::env::var("REGENERATE_FIXTURES").is_ok();
    let router = ShareRouter::default();

    for name in FIXTURES {
        let outcome = router.classify(&inbound_for(name));
        let actual = serde_json::to_value(&outcome).unwrap();

        if regenerate {
            write_fixture(name, &actual);
        } else {
            assert_eq!(
                actual,
                load_fixture(name),
                "Wire format mismatch for fixture '{name}'. \
                 If intentional, run: REGENERATE_FIXTURES=1 cargo test --test wire_format"
            );
        }
    }
}

#[test]
fn fixtures_decode_to_the_routed_outcome() {
    let router = ShareRouter::default();

    for name in FIXTURES {
        let decoded: RoutingOutcome = serde_json::from_value(load_fixture(name))
            .unwrap_or_else(|e| panic!("Fixture '{name}' does not decode: {e}"));
        assert_eq!(decoded, router.classify(&inbound_for(name)), "fixture '{name}'");
    }
}

#[test]
fn forward_fixtures_have_required_fields() {
    for name in FIXTURES {
        let fixture = load_fixture(name);
        if fixture["outcome"] != "forward" {
            continue;
        }

        let obj = fixture.as_object().unwrap();
        for field in REQUIRED_FORWARD_FIELDS {
            assert!(
                obj.contains_key(*field),
                "Fixture '{name}' missing required field '{field}'"
            );
        }
    }
}

/// The image list key is always written, never left out for empty shares.
#[test]
fn empty_multiple_image_share_writes_empty_list() {
    let router = ShareRouter::default();
    let request = InboundRequest::new(ShareAction::SendMultiple).with_content_type("image/jpeg");

    let json = serde_json::to_value(router.classify(&request)).unwrap();

    assert_eq!(json["clip_items"], serde_json::json!([]));
    assert_eq!(
        json["extras"]["share.images"],
        serde_json::json!({"type": "string_list", "value": []})
    );
}
