//! Backend handle factory: turns a [`ResolvedConfig`] into the typed handles the bot runs on.
//! Nothing here opens a connection; pools are created lazily and the storage layout is only
//! touched by [`StorageHandle::ensure_layout`].

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use teloxide::Bot;
use tracing::{info, instrument};
use url::Url;
use vendbot_config::{
    parse_cloudinary_url, DatabaseBackend, ResolvedConfig, StateBackend, StorageBackend,
};
use vendbot_core::SecretString;

/// Database connection settings plus pool size; `connect_lazy` builds the pool.
#[derive(Clone)]
pub enum DatabaseHandle {
    Sqlite {
        options: SqliteConnectOptions,
        path: PathBuf,
        max_connections: u32,
    },
    Postgres {
        options: PgConnectOptions,
        /// DSN with the password masked, for logs.
        redacted_dsn: String,
        max_connections: u32,
    },
}

/// A pool that has not necessarily connected yet.
#[derive(Debug, Clone)]
pub enum DatabasePool {
    Sqlite(SqlitePool),
    Postgres(PgPool),
}

impl DatabaseHandle {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Sqlite { .. } => "sqlite",
            Self::Postgres { .. } => "postgres",
        }
    }

    pub fn max_connections(&self) -> u32 {
        match self {
            Self::Sqlite {
                max_connections, ..
            }
            | Self::Postgres {
                max_connections, ..
            } => *max_connections,
        }
    }

    /// Creates the parent directory of a SQLite file so `create_if_missing` can succeed.
    pub async fn ensure_parent_dir(&self) -> Result<()> {
        let Self::Sqlite { path, .. } = self else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create database directory {}", parent.display()))?;
        }
        Ok(())
    }

    /// Builds the pool without connecting. Must be called inside a tokio runtime.
    pub fn connect_lazy(&self) -> DatabasePool {
        match self {
            Self::Sqlite {
                options,
                max_connections,
                ..
            } => DatabasePool::Sqlite(
                SqlitePoolOptions::new()
                    .max_connections(*max_connections)
                    .connect_lazy_with(options.clone()),
            ),
            Self::Postgres {
                options,
                max_connections,
                ..
            } => DatabasePool::Postgres(
                PgPoolOptions::new()
                    .max_connections(*max_connections)
                    .connect_lazy_with(options.clone()),
            ),
        }
    }
}

impl fmt::Debug for DatabaseHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sqlite {
                path,
                max_connections,
                ..
            } => f
                .debug_struct("Sqlite")
                .field("path", path)
                .field("max_connections", max_connections)
                .finish(),
            Self::Postgres {
                redacted_dsn,
                max_connections,
                ..
            } => f
                .debug_struct("Postgres")
                .field("dsn", redacted_dsn)
                .field("max_connections", max_connections)
                .finish(),
        }
    }
}

/// Strips the async driver suffix (`postgresql+asyncpg://` → `postgresql://`) so sqlx accepts
/// the DSN.
fn driver_neutral_dsn(dsn: &str) -> String {
    match dsn.split_once("://") {
        Some((scheme, rest)) => {
            let scheme = scheme.split_once('+').map_or(scheme, |(base, _)| base);
            format!("{}://{}", scheme, rest)
        }
        None => dsn.to_string(),
    }
}

/// Subdirectories of a local upload root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageArea {
    Photos,
    Reports,
    Temp,
}

impl StorageArea {
    pub const ALL: [StorageArea; 3] = [Self::Photos, Self::Reports, Self::Temp];

    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Photos => "photos",
            Self::Reports => "reports",
            Self::Temp => "temp",
        }
    }
}

/// Where uploaded files go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageHandle {
    Local {
        root: PathBuf,
    },
    Cloudinary {
        cloud_name: String,
        api_key: String,
        api_secret: SecretString,
    },
    S3 {
        bucket: String,
        region: String,
        access_key: SecretString,
        secret_key: SecretString,
    },
}

impl StorageHandle {
    /// Directory for `area` on local disk; `None` for remote storage.
    pub fn area_dir(&self, area: StorageArea) -> Option<PathBuf> {
        match self {
            Self::Local { root } => Some(root.join(area.dir_name())),
            _ => None,
        }
    }

    /// Creates the root and every area directory for local storage. Remote storage needs no
    /// layout; returns the directories that now exist.
    pub async fn ensure_layout(&self) -> Result<Vec<PathBuf>> {
        let Self::Local { root } = self else {
            return Ok(Vec::new());
        };
        let mut created = Vec::with_capacity(StorageArea::ALL.len());
        for area in StorageArea::ALL {
            let dir = root.join(area.dir_name());
            tokio::fs::create_dir_all(&dir)
                .await
                .with_context(|| format!("create storage directory {}", dir.display()))?;
            created.push(dir);
        }
        info!(root = %root.display(), "Local storage layout ready");
        Ok(created)
    }
}

/// Conversation state store.
#[derive(Clone, PartialEq, Eq)]
pub enum StateHandle {
    Memory,
    Redis { url: Url },
}

impl fmt::Debug for StateHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => f.write_str("Memory"),
            Self::Redis { url } => f
                .debug_struct("Redis")
                .field("host", &url.host_str().unwrap_or_default())
                .field("port", &url.port_or_known_default())
                .finish(),
        }
    }
}

/// Everything the bot runtime needs besides the config itself.
pub struct BackendHandles {
    pub database: DatabaseHandle,
    pub storage: StorageHandle,
    pub state: StateHandle,
    pub bot: Bot,
}

#[instrument(skip(backend))]
fn database_handle(backend: &DatabaseBackend, pool_size: u32) -> Result<DatabaseHandle> {
    match backend {
        DatabaseBackend::Sqlite { path } => {
            info!(db_path = %path.display(), max_connections = pool_size, "Using SQLite database");
            Ok(DatabaseHandle::Sqlite {
                options: SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true),
                path: path.clone(),
                max_connections: pool_size,
            })
        }
        DatabaseBackend::Postgres { dsn } => {
            let redacted_dsn = backend.redacted_dsn();
            info!(dsn = %redacted_dsn, max_connections = pool_size, "Using PostgreSQL database");
            let options = PgConnectOptions::from_str(&driver_neutral_dsn(dsn))
                .map_err(|_| anyhow::anyhow!("DATABASE_URL is not a valid PostgreSQL DSN"))?;
            Ok(DatabaseHandle::Postgres {
                options,
                redacted_dsn,
                max_connections: pool_size,
            })
        }
    }
}

fn storage_handle(backend: &StorageBackend) -> Result<StorageHandle> {
    let handle = match backend {
        StorageBackend::LocalDisk { root_dir } => {
            info!(root = %root_dir.display(), "Using local disk storage");
            StorageHandle::Local {
                root: root_dir.clone(),
            }
        }
        StorageBackend::Cloudinary { url } => {
            let credentials = parse_cloudinary_url(url.expose())
                .context("CLOUDINARY_URL must look like cloudinary://<api_key>:<api_secret>@<cloud_name>")?;
            info!(cloud_name = %credentials.cloud_name, "Using Cloudinary storage");
            StorageHandle::Cloudinary {
                cloud_name: credentials.cloud_name,
                api_key: credentials.api_key,
                api_secret: credentials.api_secret,
            }
        }
        StorageBackend::S3 {
            access_key,
            secret_key,
            bucket,
            region,
        } => {
            info!(bucket = %bucket, region = %region, "Using S3 storage");
            StorageHandle::S3 {
                bucket: bucket.clone(),
                region: region.clone(),
                access_key: access_key.clone(),
                secret_key: secret_key.clone(),
            }
        }
    };
    Ok(handle)
}

fn state_handle(backend: &StateBackend) -> StateHandle {
    match backend {
        StateBackend::Memory => {
            info!("Using in-memory state storage");
            StateHandle::Memory
        }
        StateBackend::Redis { url } => {
            info!(url = %backend.redacted_url().unwrap_or_default(), "Using Redis state storage");
            StateHandle::Redis { url: url.clone() }
        }
    }
}

/// Builds the Telegram client; a configured local Bot API server replaces the default URL.
pub fn build_bot(token: &SecretString, api_url: Option<&Url>) -> Bot {
    let bot = Bot::new(token.expose());
    match api_url {
        Some(url) => {
            info!(api_url = %url, "Using custom Bot API server");
            bot.set_api_url(url.clone())
        }
        None => bot,
    }
}

/// Constructs every backend handle for `config`. No network or disk I/O happens here.
#[instrument(skip(config), fields(stage = %config.stage))]
pub fn build_backend_handles(config: &ResolvedConfig) -> Result<BackendHandles> {
    Ok(BackendHandles {
        database: database_handle(&config.database, config.database_pool_size)?,
        storage: storage_handle(&config.storage)?,
        state: state_handle(&config.state),
        bot: build_bot(&config.bot_token, config.telegram_api_url.as_ref()),
    })
}
