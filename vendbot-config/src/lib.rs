//! # vendbot-config
//!
//! Stage-aware configuration bootstrap. One run turns the process environment into either a
//! [`ResolvedConfig`] or the complete list of reasons it cannot start:
//!
//! 1. [`RawSettings`]: environment snapshot plus optional dotenv override file
//! 2. [`resolve_stage`]: `local` / `cloud` / `production` and its [`StagePolicy`]
//! 3. selectors for database, storage, transport and state backends
//! 4. [`validate`]: stage policy and [`SecretsGuard`] checks, failures collected
//!
//! ```no_run
//! use std::path::Path;
//!
//! match vendbot_config::resolve_from_env(Some(Path::new(".env"))) {
//!     Ok(config) => println!("{}", config.summary()),
//!     Err(err) => eprintln!("{}", err),
//! }
//! ```

pub mod bootstrap;
pub mod database;
pub mod error;
pub mod failure;
pub mod keys;
pub mod raw;
pub mod resolved;
pub mod secrets;
pub mod stage;
pub mod state;
pub mod storage;
pub mod summary;
pub mod transport;
pub mod validate;

pub use bootstrap::{resolve, resolve_from_env, select_backends, Phase, Pipeline};
pub use database::{select_database, DatabaseBackend, ACCEPTED_POSTGRES_SCHEMES, DEFAULT_SQLITE_PATH};
pub use error::{BootstrapError, ConfigSourceError, SelectionError};
pub use failure::{FailureList, Selection, ValidationFailure};
pub use raw::RawSettings;
pub use resolved::ResolvedConfig;
pub use secrets::{SecretFailure, SecretKind, SecretReason, SecretsGuard};
pub use stage::{resolve_stage, unrecognized_stage, DeploymentStage, StagePolicy};
pub use state::{select_state, StateBackend};
pub use storage::{
    parse_cloudinary_url, select_storage, CloudinaryCredentials, StorageBackend, StorageKind,
    DEFAULT_UPLOAD_DIR,
};
pub use summary::ConfigSummary;
pub use transport::{select_transport, TransportMode, DEFAULT_WEBHOOK_PATH};
pub use validate::{validate, SelectedBackends};

#[cfg(test)]
mod tests;
