//! Raw settings loader: one immutable string snapshot of the environment and an optional
//! dotenv-format override file.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::Path;

use tracing::debug;
use vendbot_core::{is_secret_key, REDACTED};

use crate::error::ConfigSourceError;
use crate::keys;

/// Untyped key/value snapshot taken once at startup. Empty (or whitespace-only) values are
/// dropped at load time, so "absent" and "empty" are the same thing downstream.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RawSettings {
    values: BTreeMap<String, String>,
}

impl RawSettings {
    /// Builds a snapshot from `lookup` (queried for every known key) and an optional override
    /// file. A non-empty value from `lookup` wins; the file fills keys `lookup` leaves unset.
    /// A missing file is skipped; an unreadable or unparsable one is an error.
    pub fn load<F>(lookup: F, override_file: Option<&Path>) -> Result<Self, ConfigSourceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut values = match override_file {
            Some(path) => read_override_file(path)?,
            None => BTreeMap::new(),
        };

        for key in keys::ALL {
            if let Some(value) = lookup(*key).filter(|v| !v.trim().is_empty()) {
                values.insert((*key).to_string(), value);
            }
        }

        debug!(keys = values.len(), "Raw settings loaded");
        Ok(Self { values })
    }

    /// Loads from the process environment (read-only; the environment is never modified).
    pub fn from_env(override_file: Option<&Path>) -> Result<Self, ConfigSourceError> {
        Self::load(|key| std::env::var(key).ok(), override_file)
    }

    /// Snapshot from literal pairs; empty values are dropped like in [`RawSettings::load`].
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        pairs.into_iter().collect()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// First present value among `keys` (primary key first, then aliases).
    pub fn get_any(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.get(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawSettings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let values = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(_, v)| !v.trim().is_empty())
            .collect();
        Self { values }
    }
}

impl fmt::Debug for RawSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (key, value) in &self.values {
            if is_secret_key(key) {
                map.entry(key, &REDACTED);
            } else {
                map.entry(key, value);
            }
        }
        map.finish()
    }
}

fn read_override_file(path: &Path) -> Result<BTreeMap<String, String>, ConfigSourceError> {
    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(dotenvy::Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "Config override file not found, skipping");
            return Ok(BTreeMap::new());
        }
        Err(e) => return Err(source_error(path, &e)),
    };

    let mut values = BTreeMap::new();
    for item in iter {
        let (key, value) = item.map_err(|e| source_error(path, &e))?;
        if !value.trim().is_empty() {
            values.insert(key, value);
        }
    }
    debug!(path = %path.display(), keys = values.len(), "Config override file read");
    Ok(values)
}

/// dotenvy's parse errors quote the offending line, which may hold a secret; only the
/// position is kept.
fn source_error(path: &Path, error: &dotenvy::Error) -> ConfigSourceError {
    let reason = match error {
        dotenvy::Error::Io(e) => e.to_string(),
        dotenvy::Error::LineParse(_, index) => format!("invalid dotenv syntax at position {}", index),
        _ => "invalid dotenv content".to_string(),
    };
    ConfigSourceError {
        path: path.to_path_buf(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;
    use std::env;
    use std::fs;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_values_are_treated_as_absent() {
        let raw = RawSettings::load(
            lookup_from(&[("BOT_TOKEN", ""), ("SECRET_KEY", "   "), ("STORAGE_TYPE", "s3")]),
            None,
        )
        .unwrap();

        assert_eq!(raw.get("BOT_TOKEN"), None);
        assert_eq!(raw.get("SECRET_KEY"), None);
        assert_eq!(raw.get("STORAGE_TYPE"), Some("s3"));
        assert_eq!(raw.len(), 1);
    }

    #[test]
    fn only_known_keys_are_queried() {
        let raw = RawSettings::load(lookup_from(&[("HOME", "/root"), ("LOG_LEVEL", "DEBUG")]), None)
            .unwrap();

        assert!(!raw.contains("HOME"));
        assert_eq!(raw.get("LOG_LEVEL"), Some("DEBUG"));
    }

    #[test]
    fn missing_override_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.env");

        let raw = RawSettings::load(lookup_from(&[]), Some(&path)).unwrap();

        assert!(raw.is_empty());
    }

    #[test]
    fn environment_wins_over_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(
            &path,
            "BOT_TOKEN=from_file\nSTORAGE_TYPE=cloudinary\nWEBHOOK_URL=\nEXTRA_KEY=kept\n",
        )
        .unwrap();

        let raw = RawSettings::load(
            lookup_from(&[("BOT_TOKEN", "from_env"), ("STORAGE_TYPE", "")]),
            Some(&path),
        )
        .unwrap();

        assert_eq!(raw.get("BOT_TOKEN"), Some("from_env"));
        assert_eq!(raw.get("STORAGE_TYPE"), Some("cloudinary"));
        assert_eq!(raw.get("WEBHOOK_URL"), None);
        assert_eq!(raw.get("EXTRA_KEY"), Some("kept"));
    }

    #[test]
    fn unreadable_override_file_is_a_source_error() {
        let dir = tempfile::tempdir().unwrap();

        let err = RawSettings::load(lookup_from(&[]), Some(dir.path())).unwrap_err();

        assert_eq!(err.path, dir.path());
    }

    #[test]
    fn parse_error_does_not_echo_the_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "BOT_TOKEN=ok\nbroken line super-secret-value=1\n").unwrap();

        let err = RawSettings::load(lookup_from(&[]), Some(&path)).unwrap_err();

        assert!(!err.to_string().contains("super-secret-value"));
    }

    #[test]
    fn debug_output_redacts_secret_keys() {
        let raw = RawSettings::from_pairs([("BOT_TOKEN", "123:abc"), ("STORAGE_TYPE", "local")]);

        let rendered = format!("{:?}", raw);

        assert!(!rendered.contains("123:abc"));
        assert!(rendered.contains("local"));
    }

    #[test]
    fn get_any_prefers_primary_key() {
        let raw = RawSettings::from_pairs([("TELEGRAM_BOT_TOKEN", "alias"), ("BOT_TOKEN", "primary")]);
        assert_eq!(raw.get_any(&["BOT_TOKEN", "TELEGRAM_BOT_TOKEN"]), Some("primary"));

        let raw = RawSettings::from_pairs([("TELEGRAM_BOT_TOKEN", "alias")]);
        assert_eq!(raw.get_any(&["BOT_TOKEN", "TELEGRAM_BOT_TOKEN"]), Some("alias"));
    }

    #[test]
    #[serial]
    fn from_env_reads_process_environment() {
        env::remove_var("DEPLOYMENT_STAGE");
        env::set_var("DEPLOYMENT_STAGE", "cloud");
        env::remove_var("WEBHOOK_URL");
        env::set_var("WEBHOOK_URL", "");

        let raw = RawSettings::from_env(None).unwrap();

        assert_eq!(raw.get("DEPLOYMENT_STAGE"), Some("cloud"));
        assert_eq!(raw.get("WEBHOOK_URL"), None);

        env::remove_var("DEPLOYMENT_STAGE");
        env::remove_var("WEBHOOK_URL");
    }
}
