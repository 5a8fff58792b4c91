//! Database selector: SQLite when `DATABASE_URL` is unset, PostgreSQL for an accepted async DSN.

use std::fmt;
use std::path::PathBuf;

use url::Url;

use crate::error::SelectionError;
use crate::keys;
use crate::raw::RawSettings;
use crate::stage::DeploymentStage;

/// DSN prefixes that select PostgreSQL. Anything else is rejected, not guessed at.
pub const ACCEPTED_POSTGRES_SCHEMES: &[&str] = &["postgresql+asyncpg://", "postgresql+psycopg://"];

pub const DEFAULT_SQLITE_PATH: &str = "./vendbot.db";

/// Chosen database engine.
#[derive(Clone, PartialEq, Eq)]
pub enum DatabaseBackend {
    Sqlite { path: PathBuf },
    /// `dsn` is the configured `DATABASE_URL` with surrounding whitespace removed.
    Postgres { dsn: String },
}

impl DatabaseBackend {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Sqlite { .. } => "sqlite",
            Self::Postgres { .. } => "postgres",
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self, Self::Postgres { .. })
    }

    /// DSN / path safe for logs: the password part of a PostgreSQL DSN is replaced by `***`.
    pub fn redacted_dsn(&self) -> String {
        match self {
            Self::Sqlite { path } => format!("sqlite://{}", path.display()),
            Self::Postgres { dsn } => redact_url_password(dsn),
        }
    }

    /// Default pool size for the engine: a single writer for SQLite, 20 for PostgreSQL.
    pub fn default_pool_size(&self) -> u32 {
        match self {
            Self::Sqlite { .. } => 1,
            Self::Postgres { .. } => 20,
        }
    }
}

impl fmt::Debug for DatabaseBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sqlite { path } => f.debug_struct("Sqlite").field("path", path).finish(),
            Self::Postgres { .. } => f
                .debug_struct("Postgres")
                .field("dsn", &self.redacted_dsn())
                .finish(),
        }
    }
}

/// Selects the database backend. Fails only on malformed input; whether SQLite is acceptable
/// for the stage is decided by the validator.
pub fn select_database(
    raw: &RawSettings,
    _stage: DeploymentStage,
) -> Result<DatabaseBackend, SelectionError> {
    let Some(dsn) = raw.get(keys::DATABASE_URL).map(str::trim) else {
        let path = raw.get(keys::SQLITE_PATH).unwrap_or(DEFAULT_SQLITE_PATH);
        return Ok(DatabaseBackend::Sqlite {
            path: PathBuf::from(path),
        });
    };

    if !ACCEPTED_POSTGRES_SCHEMES.iter().any(|p| dsn.starts_with(p)) {
        return Err(SelectionError::UnsupportedScheme {
            field: keys::DATABASE_URL,
            scheme: scheme_of(dsn),
            accepted: ACCEPTED_POSTGRES_SCHEMES
                .iter()
                .map(|p| p.trim_end_matches("://"))
                .collect::<Vec<_>>()
                .join(", "),
        });
    }

    let url = Url::parse(dsn).map_err(|_| SelectionError::MalformedDsn {
        field: keys::DATABASE_URL,
        reason: "not a valid URL",
    })?;
    if url.host_str().map_or(true, str::is_empty) {
        return Err(SelectionError::MalformedDsn {
            field: keys::DATABASE_URL,
            reason: "missing host",
        });
    }

    Ok(DatabaseBackend::Postgres {
        dsn: dsn.to_string(),
    })
}

/// Scheme part of a DSN for error messages; `<none>` when there is no `://`.
fn scheme_of(dsn: &str) -> String {
    match dsn.split_once("://") {
        Some((scheme, _)) if !scheme.is_empty() && !scheme.contains(&['@', '/', ' '][..]) => {
            scheme.to_string()
        }
        _ => "<none>".to_string(),
    }
}

/// Replaces the password of a URL-shaped string with `***`; unparsable input is fully masked.
pub(crate) fn redact_url_password(value: &str) -> String {
    match Url::parse(value) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some("***"));
            }
            url.to_string()
        }
        Err(_) => "****".to_string(),
    }
}
