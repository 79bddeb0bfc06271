//! Router configuration module
//!
//! Handles loading configuration from environment variables.

use crate::error::RouterError;
use std::env;

/// Canonical extras keys written by the router
pub mod canonical {
    pub const TEXT: &str = "share.text";
    pub const IMAGE: &str = "share.image";
    pub const IMAGES: &str = "share.images";
}

/// Canonical keys the entry point reads instead of inspecting the raw bag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    pub text_key: String,
    pub image_key: String,
    pub images_key: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            text_key: canonical::TEXT.to_string(),
            image_key: canonical::IMAGE.to_string(),
            images_key: canonical::IMAGES.to_string(),
        }
    }
}

/// Service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// NATS server URL(s) - comma-separated for multiple servers.
    /// None runs one delivery from stdin to stdout.
    pub nats_url: Option<String>,

    /// Subject inbound share requests arrive on
    pub inbound_subject: String,

    /// JetStream subject forward requests are published to
    pub forward_subject: String,

    /// Health/metrics HTTP port
    pub http_port: u16,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    pub router: RouterConfig,
}

impl ServiceConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, RouterError> {
        dotenvy::dotenv().ok();

        let nats_url = env::var("NATS_URL").ok().filter(|url| !url.trim().is_empty());

        let inbound_subject = subject_var("INBOUND_SUBJECT", "share.inbound")?;
        let forward_subject = subject_var("FORWARD_SUBJECT", "share.forward")?;

        if inbound_subject == forward_subject {
            return Err(RouterError::Config(format!(
                "INBOUND_SUBJECT and FORWARD_SUBJECT must differ (both '{inbound_subject}')"
            )));
        }

        let http_port = http_port(|name| env::var(name).ok())?;

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let defaults = RouterConfig::default();
        let router = RouterConfig {
            text_key: key_var("SHARE_TEXT_KEY", defaults.text_key)?,
            image_key: key_var("SHARE_IMAGE_KEY", defaults.image_key)?,
            images_key: key_var("SHARE_IMAGES_KEY", defaults.images_key)?,
        };

        Ok(Self {
            nats_url,
            inbound_subject,
            forward_subject,
            http_port,
            log_level,
            router,
        })
    }
}

fn subject_var(name: &str, default: &str) -> Result<String, RouterError> {
    let subject = env::var(name).unwrap_or_else(|_| default.to_string());
    validate_subject(&subject).map_err(|reason| RouterError::Config(format!("{name} {reason}")))?;
    Ok(subject)
}

fn http_port(lookup: impl Fn(&str) -> Option<String>) -> Result<u16, RouterError> {
    lookup("HTTP_PORT")
        .unwrap_or_else(|| "9090".to_string())
        .parse()
        .map_err(|e| RouterError::Config(format!("HTTP_PORT must be a valid port number: {e}")))
}

fn key_var(name: &str, default: String) -> Result<String, RouterError> {
    match env::var(name) {
        Ok(key) if key.trim().is_empty() => {
            Err(RouterError::Config(format!("{name} must not be empty")))
        }
        Ok(key) => Ok(key),
        Err(_) => Ok(default),
    }
}

/// NATS subjects: non-empty dot-separated tokens, no whitespace
fn validate_subject(subject: &str) -> Result<(), &'static str> {
    if subject.is_empty() {
        return Err("must not be empty");
    }
    if subject.chars().any(char::is_whitespace) {
        return Err("must not contain whitespace");
    }
    if subject.split('.').any(str::is_empty) {
        return Err("must not contain empty tokens");
    }
    Ok(())
}
