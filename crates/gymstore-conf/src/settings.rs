//! # Settings Module
//!
//! Process configuration consumed by the connection manager.

pub mod database;
pub mod env;
pub mod environment;
pub mod secrets;

pub use database::{
	DatabaseSettings, LocalDatabaseSettings, SECRET_NAME_PROD, SECRET_NAME_STAGING,
	select_secret_name,
};
pub use env::Env;
pub use environment::{Environment, EnvironmentError, ResolvedEnvironment};
