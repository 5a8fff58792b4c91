//! # vendbot-core
//!
//! Shared building blocks for the VendBot workspace: tracing initialization ([`init_tracing`],
//! [`LogSettings`], [`LogLevel`]) and secret redaction ([`SecretString`], [`mask_secret`]).
//! Used by vendbot-config and the vendbot application crate.

pub mod logger;
pub mod redaction;

pub use logger::{init_tracing, LogLevel, LogSettings};
pub use redaction::{is_secret_key, mask_secret, SecretString, REDACTED};
