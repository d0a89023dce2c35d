//! # gymstore
//!
//! Database connection management for the gym platform.
//!
//! The deployment environment (`APP_ENV`) decides where credentials come from:
//! local `POSTGRES_*` variables, or a credential bundle stored in AWS Secrets
//! Manager for staging and production. Credentials are cached for a bounded
//! time, the pool is opened with configured limits and validated with retries,
//! and the resulting handle exposes a bounded health check.
//!
//! ## Feature Flags
//!
//! - `aws-secrets` (default) - AWS Secrets Manager provider and [`open`]
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! # async fn example() -> gymstore::DbResult<()> {
//! let db = gymstore::open().await?;
//! db.health_check().await?;
//! db.close().await;
//! # Ok(())
//! # }
//! ```
//!
//! Tests and callers with their own secret backend inject a provider instead:
//!
//! ```rust
//! use gymstore::conf::settings::secrets::CachedSecretProvider;
//! use gymstore::conf::settings::secrets::providers::memory::MemorySecretSource;
//! use gymstore::{ConnectionManager, DatabaseSettings, PoolConfig};
//! use gymstore::db::pool::PostgresOpener;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let provider = Arc::new(CachedSecretProvider::new(
//!     MemorySecretSource::new(),
//!     Duration::from_secs(300),
//! ));
//! let manager = ConnectionManager::new(
//!     DatabaseSettings::default().with_app_env("local"),
//!     provider,
//!     PostgresOpener::new(PoolConfig::default()),
//! );
//! assert_eq!(manager.settings().app_env, "local");
//! ```

// Member crates
pub use gymstore_conf as conf;
pub use gymstore_db as db;

// Re-export settings
pub use gymstore_conf::{DatabaseSettings, Env, Environment, EnvironmentError, ResolvedEnvironment};

// Re-export connection management
#[cfg(feature = "aws-secrets")]
pub use gymstore_db::open;
pub use gymstore_db::{
	ConnectionManager, Database, DbError, DbResult, PoolConfig, RetryPolicy, open_with_provider,
};

/// Re-export commonly used types
pub mod prelude {
	pub use gymstore_conf::settings::secrets::{
		CachedSecretProvider, DatabaseCredentials, SecretError, SecretProvider, SecretSource,
	};
	pub use gymstore_conf::{DatabaseSettings, Env, Environment};
	pub use gymstore_db::{ConnectionManager, Database, DbError, DbResult, PoolConfig};
}
