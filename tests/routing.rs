//! End-to-end routing scenarios through the public API

use async_trait::async_trait;
use share_router::dispatch::{ReaderSource, WriterSink};
use share_router::share::model::keys::EXTRA_TEXT;
use share_router::{
    ContentRef, DispatchSink, ExtraValue, ForwardFlags, ForwardRequest, IgnoreReason,
    InboundRequest, RouterError, RoutingOutcome, ShareAction, ShareRouter,
};

fn forward(outcome: RoutingOutcome) -> ForwardRequest {
    outcome
        .forward_request()
        .cloned()
        .unwrap_or_else(|| panic!("expected a forward request, got {outcome:?}"))
}

#[test]
fn scenario_text_share() {
    let router = ShareRouter::default();
    let request = InboundRequest::new(ShareAction::Send)
        .with_content_type("text/plain")
        .with_extra("text", "hello")
        .with_extra(EXTRA_TEXT, "hello");

    let forwarded = forward(router.classify(&request));

    assert_eq!(forwarded.action, ShareAction::Send);
    assert_eq!(forwarded.content_type.as_deref(), Some("text/plain"));
    assert_eq!(forwarded.extras.get("text"), Some(&ExtraValue::from("hello")));
    assert_eq!(forwarded.extras.get("share.text"), Some(&ExtraValue::from("hello")));
    assert_eq!(
        forwarded.flags,
        ForwardFlags::NEW_TASK | ForwardFlags::CLEAR_TOP | ForwardFlags::SINGLE_TOP | ForwardFlags::GRANT_READ
    );
}

#[test]
fn scenario_empty_multiple_image_share_is_forwarded() {
    let router = ShareRouter::default();
    let request = InboundRequest::new(ShareAction::SendMultiple).with_content_type("image/jpeg");

    let forwarded = forward(router.classify(&request));

    assert!(forwarded.clip_items.is_empty());
    assert_eq!(
        forwarded.extras.get("share.images"),
        Some(&ExtraValue::StringList(Vec::new()))
    );
}

#[test]
fn scenario_bare_relaunch_is_ignored() {
    let router = ShareRouter::default();
    let outcome = router.classify(&InboundRequest::new(ShareAction::Main));

    assert_eq!(outcome, RoutingOutcome::ignore(IgnoreReason::RelaunchWithoutPayload));
    if let RoutingOutcome::Ignore { reason } = outcome {
        assert_eq!(reason.to_string(), "relaunch without share payload");
    }
}

#[test]
fn explicit_text_beats_conflicting_raw_value() {
    let router = ShareRouter::default();
    let request = InboundRequest::new(ShareAction::Send)
        .with_content_type("text/plain")
        .with_raw_extra("share.text", "left over from a previous share")
        .with_extra(EXTRA_TEXT, "T");

    let forwarded = forward(router.classify(&request));

    assert_eq!(forwarded.extras.get("share.text"), Some(&ExtraValue::from("T")));
}

#[test]
fn single_image_data_and_mirror_agree() {
    let router = ShareRouter::default();
    let image = ContentRef::from("content://media/external/images/7");
    let request = InboundRequest::new(ShareAction::Send)
        .with_content_type("image/jpeg")
        .with_primary_data(image.clone());

    let forwarded = forward(router.classify(&request));

    assert_eq!(forwarded.data.as_ref(), Some(&image));
    assert_eq!(
        forwarded.extras.get("share.image"),
        Some(&ExtraValue::Text(image.to_string()))
    );
}

#[test]
fn outgoing_clip_never_longer_than_inbound() {
    let router = ShareRouter::default();
    let requests = [
        InboundRequest::new(ShareAction::SendMultiple)
            .with_content_type("image/png")
            .with_clip_item("content://a")
            .with_clip_item("content://b"),
        InboundRequest::new(ShareAction::SendMultiple).with_content_type("image/png").with_extra(
            "android.intent.extra.STREAM",
            ExtraValue::UriList(vec![ContentRef::from("content://x")]),
        ),
        InboundRequest::new(ShareAction::Send)
            .with_content_type("text/plain")
            .with_clip_item("content://c"),
    ];

    for request in &requests {
        let forwarded = forward(router.classify(request));
        assert!(forwarded.clip_items.len() <= request.clip_items.len());
        assert_eq!(forwarded.clip_items, request.clip_items);
    }
}

#[test]
fn unknown_action_without_content_type_is_forwarded() {
    let router = ShareRouter::default();
    let request = InboundRequest::new("android.intent.action.VIEW")
        .with_primary_data("https://example.com/article")
        .with_raw_extra("referrer", "browser");

    let forwarded = forward(router.classify(&request));

    assert_eq!(String::from(forwarded.action), "android.intent.action.VIEW");
    assert!(forwarded.content_type.is_none());
    assert_eq!(forwarded.data, request.primary_data);
    assert_eq!(forwarded.extras, request.raw_extras);
}

#[test]
fn classifying_twice_is_structurally_equal() {
    let router = ShareRouter::default();
    let request = InboundRequest::new(ShareAction::Send)
        .with_content_type("image/webp")
        .with_primary_data("content://media/1")
        .with_raw_extra("k", ExtraValue::Bool(false));

    assert_eq!(router.classify(&request), router.classify(&request));
}

struct UnreachableEntryPoint;

#[async_trait]
impl DispatchSink for UnreachableEntryPoint {
    async fn dispatch(&self, request: &ForwardRequest) -> Result<(), RouterError> {
        Err(RouterError::dispatch_failed(
            request.action.as_str(),
            "no activity resolves the forward request",
        ))
    }
}

#[test]
fn dispatch_failure_is_reported_not_retried() {
    let router = ShareRouter::default();
    let mut source = Some(
        InboundRequest::new(ShareAction::Send)
            .with_content_type("text/plain")
            .with_extra(EXTRA_TEXT, "hello"),
    );

    let err = tokio_test::block_on(router.route(&mut source, &UnreachableEntryPoint)).unwrap_err();

    assert!(err.to_string().contains("android.intent.action.SEND"));
    assert!(source.is_none(), "source must be read exactly once");
}

#[test]
fn stdin_to_stdout_round_trip() {
    let router = ShareRouter::default();
    let input = r#"{
        "action": "android.intent.action.SEND",
        "content_type": "text/plain",
        "extras": {"android.intent.extra.TEXT": {"type": "text", "value": "from stdin"}},
        "raw_extras": {
            "android.intent.extra.TEXT": {"type": "text", "value": "from stdin"},
            "com.example.draft": {"type": "bool", "value": true}
        }
    }"#;
    let mut source = ReaderSource::new(input.as_bytes());
    let sink = WriterSink::new(Vec::new());

    let outcome = tokio_test::block_on(router.route(&mut source, &sink)).unwrap();
    assert!(!outcome.is_ignored());

    let output = String::from_utf8(sink.into_inner()).unwrap();
    let forwarded: ForwardRequest = serde_json::from_str(output.trim()).unwrap();
    assert_eq!(forwarded.extras.get("share.text"), Some(&ExtraValue::from("from stdin")));
    assert_eq!(forwarded.extras.get("com.example.draft"), Some(&ExtraValue::Bool(true)));
}

#[test]
fn malformed_stdin_is_ignored() {
    let router = ShareRouter::default();
    let mut source = ReaderSource::new("[1, 2, 3]".as_bytes());
    let sink = WriterSink::new(Vec::new());

    let outcome = tokio_test::block_on(router.route(&mut source, &sink)).unwrap();

    assert_eq!(outcome, RoutingOutcome::ignore(IgnoreReason::NoInboundRequest));
    assert!(sink.into_inner().is_empty());
}
