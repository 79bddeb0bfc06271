//! Share classification
//!
//! Decides from action, content type and populated fields which canonical
//! payload to build for the entry point, and merges the extras bag.

use crate::config::RouterConfig;
use crate::share::model::{
    ContentRef, ExtraValue, ForwardFlags, ForwardRequest, IgnoreReason, InboundRequest,
    RoutingOutcome, ShareAction,
};
use tracing::debug;

/// Exact content type the text branch accepts
pub const PLAIN_TEXT: &str = "text/plain";

/// Content type prefix the image branches accept
pub const IMAGE_PREFIX: &str = "image/";

/// Which override branch a request falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareKind {
    Text,
    SingleImage,
    MultipleImages,
    PassThrough,
}

impl ShareKind {
    /// Select the branch. An absent content type always passes through.
    pub fn of(action: &ShareAction, content_type: Option<&str>) -> Self {
        let Some(content_type) = content_type else {
            return Self::PassThrough;
        };

        match action {
            ShareAction::Send if content_type == PLAIN_TEXT => Self::Text,
            ShareAction::Send if content_type.starts_with(IMAGE_PREFIX) => Self::SingleImage,
            ShareAction::SendMultiple if content_type.starts_with(IMAGE_PREFIX) => {
                Self::MultipleImages
            }
            _ => Self::PassThrough,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::SingleImage => "single_image",
            Self::MultipleImages => "multiple_images",
            Self::PassThrough => "pass_through",
        }
    }
}

/// Stateless share router
#[derive(Debug, Clone, Default)]
pub struct ShareRouter {
    config: RouterConfig,
}

impl ShareRouter {
    pub fn new(config: RouterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Classify one inbound request into exactly one outcome
    pub fn classify(&self, request: &InboundRequest) -> RoutingOutcome {
        if request.action == ShareAction::Main && !request.has_share_payload() {
            debug!("MAIN relaunch without share payload");
            return RoutingOutcome::ignore(IgnoreReason::RelaunchWithoutPayload);
        }

        let kind = ShareKind::of(&request.action, request.content_type.as_deref());

        let mut forward = ForwardRequest {
            action: request.action.clone(),
            content_type: request.content_type.clone(),
            data: request.primary_data.clone(),
            clip_items: request.clip_items.clone(),
            extras: request.raw_extras.clone(),
            flags: ForwardFlags::forwarding(),
        };

        match kind {
            ShareKind::Text => self.apply_text(request, &mut forward),
            ShareKind::SingleImage => self.apply_single_image(request, &mut forward),
            ShareKind::MultipleImages => self.apply_multiple_images(request, &mut forward),
            ShareKind::PassThrough => {}
        }

        debug!(
            action = %forward.action,
            content_type = forward.content_type.as_deref().unwrap_or(""),
            kind = kind.label(),
            clip_items = forward.clip_items.len(),
            extras = forward.extras.len(),
            "Share classified"
        );

        RoutingOutcome::Forward(forward)
    }

    fn apply_text(&self, request: &InboundRequest, forward: &mut ForwardRequest) {
        if let Some(text) = request.text_extra() {
            forward
                .extras
                .insert(self.config.text_key.clone(), ExtraValue::Text(text.to_string()));
        }
    }

    fn apply_single_image(&self, request: &InboundRequest, forward: &mut ForwardRequest) {
        let image = request
            .primary_data
            .as_ref()
            .or_else(|| request.stream_extra().and_then(ExtraValue::as_uri));

        if let Some(image) = image {
            forward.data = Some(image.clone());
            forward
                .extras
                .insert(self.config.image_key.clone(), ExtraValue::Text(image.to_string()));
        }
    }

    fn apply_multiple_images(&self, request: &InboundRequest, forward: &mut ForwardRequest) {
        let images: &[ContentRef] = if request.clip_items.is_empty() {
            request
                .stream_extra()
                .and_then(ExtraValue::as_uri_list)
                .unwrap_or_default()
        } else {
            &request.clip_items
        };

        let rendered = images.iter().map(ToString::to_string).collect();
        forward
            .extras
            .insert(self.config.images_key.clone(), ExtraValue::StringList(rendered));
    }
}
