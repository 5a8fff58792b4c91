//! Secrets guard: presence and shape checks for tokens and keys.
//!
//! Failures carry the field name and a reason code only. The checked value never reaches an
//! error message or a log line.

use serde::Serialize;
use thiserror::Error;

use crate::failure::ValidationFailure;
use crate::stage::StagePolicy;

/// Template defaults an operator may have left unedited (compared case-insensitively).
pub const PLACEHOLDERS: &[&str] = &[
    "your_bot_token_here",
    "your_real_bot_token_here",
    "your-secret-key-here",
    "dev-jwt-secret-key",
    "changeme",
    "change-me",
    "secret",
];

const MIN_SIGNING_KEY_LEN: usize = 32;
const MIN_SIGNING_KEY_DISTINCT: usize = 10;
const MIN_BOT_TOKEN_SECRET_LEN: usize = 30;
const MAX_WEBHOOK_SECRET_LEN: usize = 256;

/// Why a secret was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretReason {
    Missing,
    Placeholder,
    TooShort,
    LowEntropy,
    BadFormat,
    BadCharset,
}

impl SecretReason {
    pub fn describe(self) -> &'static str {
        match self {
            Self::Missing => "is required but not set",
            Self::Placeholder => "still holds the template placeholder",
            Self::TooShort => "is too short",
            Self::LowEntropy => "has too few distinct characters",
            Self::BadFormat => "does not look like a bot token (<digits>:<token>)",
            Self::BadCharset => "may only contain A-Z, a-z, 0-9, '_' and '-' (1-256 chars)",
        }
    }
}

/// A refused secret: field name plus reason code, never the value.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{field} {}", reason.describe())]
pub struct SecretFailure {
    pub field: &'static str,
    pub reason: SecretReason,
}

impl From<SecretFailure> for ValidationFailure {
    fn from(failure: SecretFailure) -> Self {
        ValidationFailure::new(failure.field, failure.reason.describe())
    }
}

/// What kind of secret is being checked; selects the shape heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKind {
    /// Bot platform token, `<bot id>:<secret>`.
    BotToken,
    /// Application signing key.
    SigningKey,
    /// Webhook secret token echoed back by the Bot API in a header.
    WebhookSecret,
}

/// Checks secrets against the active stage. Presence and placeholder rules always apply; the
/// length/charset heuristic only under stages with `strict_secrets`. Webhook secrets always
/// get the charset check because the Bot API rejects anything else.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecretsGuard {
    strict: bool,
}

impl SecretsGuard {
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    pub fn for_policy(policy: &StagePolicy) -> Self {
        Self::new(policy.strict_secrets)
    }

    pub fn check(
        &self,
        field: &'static str,
        value: Option<&str>,
        kind: SecretKind,
    ) -> Result<(), SecretFailure> {
        let fail = |reason| Err(SecretFailure { field, reason });

        let value = match value.map(str::trim) {
            Some(v) if !v.is_empty() => v,
            _ => return fail(SecretReason::Missing),
        };
        if is_placeholder(value) {
            return fail(SecretReason::Placeholder);
        }

        match kind {
            SecretKind::WebhookSecret => {
                if value.len() > MAX_WEBHOOK_SECRET_LEN || !value.chars().all(is_token_char) {
                    return fail(SecretReason::BadCharset);
                }
            }
            SecretKind::BotToken if self.strict => {
                if !looks_like_bot_token(value) {
                    return fail(SecretReason::BadFormat);
                }
            }
            SecretKind::SigningKey if self.strict => {
                if value.chars().count() < MIN_SIGNING_KEY_LEN {
                    return fail(SecretReason::TooShort);
                }
                if distinct_chars(value) < MIN_SIGNING_KEY_DISTINCT {
                    return fail(SecretReason::LowEntropy);
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// True for template defaults, including any `your_..._here` style value.
pub fn is_placeholder(value: &str) -> bool {
    let lower = value.trim().to_ascii_lowercase();
    PLACEHOLDERS.contains(&lower.as_str()) || (lower.starts_with("your") && lower.ends_with("here"))
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn looks_like_bot_token(value: &str) -> bool {
    let Some((id, secret)) = value.split_once(':') else {
        return false;
    };
    !id.is_empty()
        && id.chars().all(|c| c.is_ascii_digit())
        && secret.len() >= MIN_BOT_TOKEN_SECRET_LEN
        && secret.chars().all(is_token_char)
}

fn distinct_chars(value: &str) -> usize {
    let mut chars: Vec<char> = value.chars().collect();
    chars.sort_unstable();
    chars.dedup();
    chars.len()
}
