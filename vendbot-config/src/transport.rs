//! Transport selector: long polling unless `WEBHOOK_URL` is set.

use url::Url;
use vendbot_core::SecretString;

use crate::failure::{Selection, ValidationFailure};
use crate::keys;
use crate::raw::RawSettings;
use crate::stage::DeploymentStage;

pub const DEFAULT_WEBHOOK_PATH: &str = "/webhook";

/// How the bot receives updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportMode {
    Polling,
    Webhook {
        /// Absolute http(s) URL with a host.
        public_url: Url,
        /// Route the update handler is mounted on; starts with `/`.
        path: String,
        /// WEBHOOK_SECRET, sent back by the Bot API in `X-Telegram-Bot-Api-Secret-Token`.
        secret: Option<SecretString>,
    },
}

impl TransportMode {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Polling => "polling",
            Self::Webhook { .. } => "webhook",
        }
    }

    pub fn is_webhook(&self) -> bool {
        matches!(self, Self::Webhook { .. })
    }

    /// Full URL to register with the Bot API: the public URL with `path` appended to its path
    /// unless it already ends with it. Query and fragment are kept.
    pub fn endpoint(&self) -> Option<String> {
        let Self::Webhook {
            public_url, path, ..
        } = self
        else {
            return None;
        };
        let base = public_url.path().trim_end_matches('/');
        let full = if base.ends_with(path.as_str()) {
            base.to_string()
        } else {
            format!("{}{}", base, path)
        };
        let mut url = public_url.clone();
        url.set_path(&full);
        Some(url.to_string())
    }
}

/// Checks that `value` is an absolute http(s) URL with a host.
pub(crate) fn parse_public_url(value: &str) -> Option<Url> {
    let url = Url::parse(value.trim()).ok()?;
    let has_host = url.host_str().map_or(false, |h| !h.is_empty());
    (matches!(url.scheme(), "http" | "https") && has_host).then_some(url)
}

/// Selects the transport. Whether polling is acceptable for the stage is decided by the
/// validator, so the same logic serves every stage.
pub fn select_transport(raw: &RawSettings, _stage: DeploymentStage) -> Selection<TransportMode> {
    let Some(value) = raw.get(keys::WEBHOOK_URL) else {
        return Selection::Chosen(TransportMode::Polling);
    };

    let mut failures = Vec::new();
    let public_url = parse_public_url(value);
    if public_url.is_none() {
        failures.push(ValidationFailure::new(
            keys::WEBHOOK_URL,
            "must be an absolute http(s) URL with a host",
        ));
    }

    let path = raw
        .get(keys::WEBHOOK_PATH)
        .map(str::trim)
        .unwrap_or(DEFAULT_WEBHOOK_PATH);
    if !path.starts_with('/') {
        failures.push(ValidationFailure::new(keys::WEBHOOK_PATH, "must start with '/'"));
    }

    match public_url {
        Some(public_url) if failures.is_empty() => Selection::Chosen(TransportMode::Webhook {
            public_url,
            path: path.to_string(),
            secret: raw.get(keys::WEBHOOK_SECRET).map(SecretString::from),
        }),
        _ => Selection::Incomplete(failures),
    }
}
