//! # VendBot application
//!
//! Wires the resolved configuration into backend handles (database, storage, state, Telegram
//! client) and exposes the `vendbot` CLI. Configuration resolution lives in vendbot-config;
//! tracing and secret redaction in vendbot-core.

pub mod cli;
pub mod components;
pub mod runner;

pub use cli::{execute, exit_code, Cli, Commands};
pub use components::{
    build_backend_handles, build_bot, BackendHandles, DatabaseHandle, DatabasePool, StateHandle,
    StorageArea, StorageHandle,
};
pub use runner::{assemble, bootstrap, Bootstrapped};
