//! Share request data model
//!
//! In-process value objects exchanged between host adapters and the router.
//! Everything here is created fresh per delivery and dropped after dispatch.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Well-known inbound extras keys
pub mod keys {
    /// Text-bearing extra
    pub const EXTRA_TEXT: &str = "android.intent.extra.TEXT";
    /// Stream extra: a single URI for SEND, a URI list for SEND_MULTIPLE
    pub const EXTRA_STREAM: &str = "android.intent.extra.STREAM";
}

/// Inbound action
///
/// Recognized actions use the Android action strings on the wire. Anything
/// else is kept verbatim as `Other` so it can be forwarded unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ShareAction {
    Send,
    SendMultiple,
    Main,
    Other(String),
}

impl ShareAction {
    pub const SEND: &'static str = "android.intent.action.SEND";
    pub const SEND_MULTIPLE: &'static str = "android.intent.action.SEND_MULTIPLE";
    pub const MAIN: &'static str = "android.intent.action.MAIN";

    pub fn as_str(&self) -> &str {
        match self {
            Self::Send => Self::SEND,
            Self::SendMultiple => Self::SEND_MULTIPLE,
            Self::Main => Self::MAIN,
            Self::Other(raw) => raw,
        }
    }

    /// Static label for metrics; unknown actions collapse to "other"
    pub fn label(&self) -> &'static str {
        match self {
            Self::Send => "send",
            Self::SendMultiple => "send_multiple",
            Self::Main => "main",
            Self::Other(_) => "other",
        }
    }
}

impl From<String> for ShareAction {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            Self::SEND => Self::Send,
            Self::SEND_MULTIPLE => Self::SendMultiple,
            Self::MAIN => Self::Main,
            _ => Self::Other(raw),
        }
    }
}

impl From<&str> for ShareAction {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl From<ShareAction> for String {
    fn from(action: ShareAction) -> Self {
        match action {
            ShareAction::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ShareAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque content reference (a URI in practice). Never parsed or rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentRef(String);

impl ContentRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ContentRef {
    fn from(reference: &str) -> Self {
        Self::new(reference)
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Value held in an extras bag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ExtraValue {
    Text(String),
    Uri(ContentRef),
    UriList(Vec<ContentRef>),
    StringList(Vec<String>),
    Bool(bool),
    Int(i64),
    Null,
}

impl ExtraValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_uri(&self) -> Option<&ContentRef> {
        match self {
            Self::Uri(uri) => Some(uri),
            _ => None,
        }
    }

    pub fn as_uri_list(&self) -> Option<&[ContentRef]> {
        match self {
            Self::UriList(uris) => Some(uris),
            _ => None,
        }
    }
}

impl From<&str> for ExtraValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for ExtraValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Extras bag: one value per key, deterministic iteration order
pub type Extras = BTreeMap<String, ExtraValue>;

/// Share request as delivered by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundRequest {
    pub action: ShareAction,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub primary_data: Option<ContentRef>,
    #[serde(default)]
    pub clip_items: Vec<ContentRef>,
    /// Extras as decoded by the host; the router reads explicit fields here
    #[serde(default)]
    pub extras: Extras,
    /// Untouched original bag, seeded into the forward request as-is
    #[serde(default)]
    pub raw_extras: Extras,
}

impl InboundRequest {
    pub fn new(action: impl Into<ShareAction>) -> Self {
        Self {
            action: action.into(),
            content_type: None,
            primary_data: None,
            clip_items: Vec::new(),
            extras: Extras::new(),
            raw_extras: Extras::new(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_primary_data(mut self, data: impl Into<ContentRef>) -> Self {
        self.primary_data = Some(data.into());
        self
    }

    pub fn with_clip_item(mut self, item: impl Into<ContentRef>) -> Self {
        self.clip_items.push(item.into());
        self
    }

    /// Add an extra to both the decoded view and the raw bag, as a host
    /// copying one native bundle would.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<ExtraValue>) -> Self {
        let key = key.into();
        let value = value.into();
        self.raw_extras.insert(key.clone(), value.clone());
        self.extras.insert(key, value);
        self
    }

    /// Add an extra to the raw bag only
    pub fn with_raw_extra(mut self, key: impl Into<String>, value: impl Into<ExtraValue>) -> Self {
        self.raw_extras.insert(key.into(), value.into());
        self
    }

    /// Text-bearing extra. Present means the key holds text, even `""`.
    pub fn text_extra(&self) -> Option<&str> {
        self.extras.get(keys::EXTRA_TEXT).and_then(ExtraValue::as_text)
    }

    pub fn stream_extra(&self) -> Option<&ExtraValue> {
        self.extras.get(keys::EXTRA_STREAM)
    }

    /// True when the request carries anything worth forwarding on its own
    pub fn has_share_payload(&self) -> bool {
        self.primary_data.is_some() || !self.clip_items.is_empty() || self.text_extra().is_some()
    }
}

bitflags! {
    /// Forwarding-semantics markers interpreted by the dispatch collaborator
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ForwardFlags: u8 {
        const NEW_TASK = 1 << 0;
        const CLEAR_TOP = 1 << 1;
        const SINGLE_TOP = 1 << 2;
        const GRANT_READ = 1 << 3;
    }
}

impl ForwardFlags {
    /// The set every forward request carries
    pub fn forwarding() -> Self {
        Self::NEW_TASK | Self::CLEAR_TOP | Self::SINGLE_TOP | Self::GRANT_READ
    }
}

impl Serialize for ForwardFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter_names().map(|(name, _)| name))
    }
}

impl<'de> Deserialize<'de> for ForwardFlags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        names.iter().try_fold(Self::empty(), |flags, name| {
            Self::from_name(name)
                .map(|flag| flags | flag)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown forward flag '{name}'")))
        })
    }
}

/// Normalized request addressed to the app entry point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardRequest {
    pub action: ShareAction,
    pub content_type: Option<String>,
    pub data: Option<ContentRef>,
    pub clip_items: Vec<ContentRef>,
    pub extras: Extras,
    pub flags: ForwardFlags,
}

/// Why a delivery produced no forward request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// MAIN relaunch with nothing to share
    RelaunchWithoutPayload,
    /// Host delivered nothing, or nothing decodable
    NoInboundRequest,
}

impl IgnoreReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RelaunchWithoutPayload => "relaunch without share payload",
            Self::NoInboundRequest => "no inbound request",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::RelaunchWithoutPayload => "relaunch",
            Self::NoInboundRequest => "no_inbound",
        }
    }
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying one delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RoutingOutcome {
    Forward(ForwardRequest),
    Ignore { reason: IgnoreReason },
}

impl RoutingOutcome {
    pub fn ignore(reason: IgnoreReason) -> Self {
        Self::Ignore { reason }
    }

    pub fn forward_request(&self) -> Option<&ForwardRequest> {
        match self {
            Self::Forward(request) => Some(request),
            Self::Ignore { .. } => None,
        }
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignore { .. })
    }
}
