//! # gymstore configuration
//!
//! Deployment-environment classification, database settings and credential
//! resolution for the gymstore connection manager.
//!
//! ## Features
//!
//! - **Environment classification**: `APP_ENV` is mapped onto a closed set of
//!   deployment labels (`local`, `staging`, `prod`)
//! - **Typed environment lookups**: trimmed values, documented defaults, and
//!   warn-and-default behaviour for malformed optional values
//! - **Secrets management**: a pluggable [`SecretProvider`](settings::secrets::SecretProvider)
//!   with a time-bounded cache and an AWS Secrets Manager backend
//!
//! ## Module Organization
//!
//! - [`settings`]: environment, database settings and secrets

pub mod settings;

pub use settings::{DatabaseSettings, Env, Environment, EnvironmentError, ResolvedEnvironment};
