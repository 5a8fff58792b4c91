//! Secret detection and redaction.
//!
//! Secret-bearing settings are carried as [`SecretString`], which never prints its value through
//! `Debug` or `Display`.

use serde::{Serialize, Serializer};

/// The redacted placeholder string.
pub const REDACTED: &str = "[REDACTED]";

/// Checks if a settings key likely refers to a secret (token, key, password, DSN with credentials).
pub fn is_secret_key(key: &str) -> bool {
    let key = key.to_ascii_uppercase();
    key.contains("TOKEN")
        || key.contains("SECRET")
        || key.contains("PASSWORD")
        || key.contains("KEY")
        || key.contains("CREDENTIAL")
        || key.ends_with("_DSN")
        || key == "CLOUDINARY_URL"
        || key == "DATABASE_URL"
        || key == "REDIS_URL"
}

/// Masks a secret for operator output: `****` followed by the last four characters when the
/// value is long enough that the tail does not give it away, otherwise `****` alone.
pub fn mask_secret(value: &str) -> String {
    let count = value.chars().count();
    if count < 12 {
        return "****".to_string();
    }
    let tail: String = value.chars().skip(count - 4).collect();
    format!("****{}", tail)
}

/// A secret string wrapper that redacts on Display/Debug/Serialize.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SecretString(Box<str>);

impl SecretString {
    pub fn new(value: impl Into<Box<str>>) -> Self {
        Self(value.into())
    }

    /// Borrow the underlying secret. Callers must not log the result.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// `****` plus the last four characters; see [`mask_secret`].
    pub fn masked(&self) -> String {
        mask_secret(&self.0)
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(REDACTED)
    }
}

impl std::fmt::Display for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(REDACTED)
    }
}

impl Serialize for SecretString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(REDACTED)
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self(value.into_boxed_str())
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self(value.into())
    }
}
