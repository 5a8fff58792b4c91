//! State backend selector: in-memory FSM storage unless `REDIS_URL` is set.

use std::fmt;

use url::Url;

use crate::database::redact_url_password;
use crate::failure::{Selection, ValidationFailure};
use crate::keys;
use crate::raw::RawSettings;
use crate::stage::DeploymentStage;

/// Where conversation state lives between updates.
#[derive(Clone, PartialEq, Eq)]
pub enum StateBackend {
    Memory,
    Redis { url: Url },
}

impl StateBackend {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Redis { .. } => "redis",
        }
    }

    /// URL safe for logs (password masked).
    pub fn redacted_url(&self) -> Option<String> {
        match self {
            Self::Memory => None,
            Self::Redis { url } => Some(redact_url_password(url.as_str())),
        }
    }
}

impl fmt::Debug for StateBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => f.write_str("Memory"),
            Self::Redis { .. } => f
                .debug_struct("Redis")
                .field("url", &self.redacted_url().unwrap_or_default())
                .finish(),
        }
    }
}

pub fn select_state(raw: &RawSettings, _stage: DeploymentStage) -> Selection<StateBackend> {
    let Some(value) = raw.get(keys::REDIS_URL) else {
        return Selection::Chosen(StateBackend::Memory);
    };
    match Url::parse(value.trim()) {
        Ok(url) if matches!(url.scheme(), "redis" | "rediss") && url.host_str().is_some() => {
            Selection::Chosen(StateBackend::Redis { url })
        }
        _ => Selection::Incomplete(vec![ValidationFailure::new(
            keys::REDIS_URL,
            "must be a redis:// or rediss:// URL with a host",
        )]),
    }
}
