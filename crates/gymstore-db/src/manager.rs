//! Connection manager
//!
//! Ties the pieces together: classify `APP_ENV`, build the DSN (resolving a
//! secret when not local), then open and validate a pool with retries, all
//! under one connect timeout.

use crate::dsn::resolve_dsn;
use crate::errors::{DbError, DbResult};
use crate::pool::{ConnectionOpener, PoolConfig, PostgresOpener, Probe, RetryPolicy, open_with_retry};
use gymstore_conf::settings::secrets::SecretProvider;
use gymstore_conf::{DatabaseSettings, Env, Environment, ResolvedEnvironment};
use sqlx::postgres::PgPool;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

/// Fixed bound on [`Database::health_check`], independent of caller deadlines
pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(2);

const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens the application database
///
/// Holds the secret provider, and with it the credential cache, for its whole
/// lifetime. Reuse one manager to benefit from cached credentials across
/// opens.
pub struct ConnectionManager<O = PostgresOpener> {
	settings: DatabaseSettings,
	provider: Arc<dyn SecretProvider>,
	opener: O,
	retry: RetryPolicy,
}

impl ConnectionManager<PostgresOpener> {
	/// Manager configured from the process environment with the AWS Secrets
	/// Manager provider
	#[cfg(feature = "aws-secrets")]
	pub fn from_env() -> Self {
		use gymstore_conf::settings::secrets::providers::aws::AwsSecretsSource;

		let env = Env::new();
		let settings = DatabaseSettings::from_env(&env);
		let provider = Arc::new(AwsSecretsSource::provider(&settings));
		Self::new(settings, provider, PostgresOpener::new(PoolConfig::from_env(&env)))
	}

	/// Manager configured from the process environment with a caller-supplied
	/// provider
	pub fn from_env_with_provider(provider: Arc<dyn SecretProvider>) -> Self {
		let env = Env::new();
		Self::new(
			DatabaseSettings::from_env(&env),
			provider,
			PostgresOpener::new(PoolConfig::from_env(&env)),
		)
	}
}

impl<O: ConnectionOpener> ConnectionManager<O> {
	pub fn new(settings: DatabaseSettings, provider: Arc<dyn SecretProvider>, opener: O) -> Self {
		Self {
			settings,
			provider,
			opener,
			retry: RetryPolicy::default(),
		}
	}

	pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
		self.retry = retry;
		self
	}

	pub fn settings(&self) -> &DatabaseSettings {
		&self.settings
	}

	pub fn provider(&self) -> &Arc<dyn SecretProvider> {
		&self.provider
	}

	pub fn opener(&self) -> &O {
		&self.opener
	}

	/// Open and validate the database
	///
	/// The whole sequence, secret resolution and retries included, is bounded
	/// by the configured connect timeout.
	pub async fn open(&self) -> DbResult<Database<O::Handle>> {
		let timeout = self.settings.connect_timeout;
		match tokio::time::timeout(timeout, self.open_unbounded()).await {
			Ok(result) => result,
			Err(_) => {
				tracing::warn!(timeout = ?timeout, "database connect timed out");
				Err(DbError::Timeout(timeout))
			}
		}
	}

	async fn open_unbounded(&self) -> DbResult<Database<O::Handle>> {
		let env = ResolvedEnvironment::resolve(&self.settings.app_env)?;
		let dsn = resolve_dsn(env.label, &self.settings, self.provider.as_ref()).await?;
		tracing::debug!(dsn = %dsn.masked(), "resolved database dsn");

		let handle = open_with_retry(&self.opener, &dsn, &self.retry).await?;

		tracing::info!(
			env = %env.label,
			secret = dsn.source(),
			app_env = %env.raw,
			"connected to database"
		);

		Ok(Database {
			handle,
			env: env.label,
			source: dsn.source().to_string(),
		})
	}
}

/// Open the database using the process environment and AWS Secrets Manager
#[cfg(feature = "aws-secrets")]
pub async fn open() -> DbResult<Database> {
	ConnectionManager::from_env().open().await
}

/// Open the database using the process environment and `provider`
pub async fn open_with_provider(provider: Arc<dyn SecretProvider>) -> DbResult<Database> {
	ConnectionManager::from_env_with_provider(provider)
		.open()
		.await
}

/// A validated database handle
///
/// Derefs to the driver pool, which is safe for concurrent use. Created once
/// at startup and released by the owner with [`Database::close`].
pub struct Database<H = PgPool> {
	handle: H,
	env: Environment,
	source: String,
}

impl<H: Probe> Database<H> {
	/// Probe the database, giving up after [`HEALTH_CHECK_TIMEOUT`]
	pub async fn health_check(&self) -> DbResult<()> {
		match tokio::time::timeout(HEALTH_CHECK_TIMEOUT, self.handle.ping()).await {
			Ok(result) => result.map_err(DbError::HealthCheck),
			Err(_) => Err(DbError::HealthCheckTimeout(HEALTH_CHECK_TIMEOUT)),
		}
	}

	/// Close the pool, waiting a bounded time for checked-out connections
	pub async fn close(self) {
		if tokio::time::timeout(CLOSE_TIMEOUT, self.handle.close())
			.await
			.is_err()
		{
			tracing::warn!(
				timeout = ?CLOSE_TIMEOUT,
				"database close timed out, dropping remaining connections"
			);
		}
	}
}

impl<H> Database<H> {
	/// Environment the handle was opened for
	pub fn environment(&self) -> Environment {
		self.env
	}

	/// `local-env-vars` or the secret the credentials came from
	pub fn credential_source(&self) -> &str {
		&self.source
	}

	pub fn into_inner(self) -> H {
		self.handle
	}
}

impl<H> Deref for Database<H> {
	type Target = H;

	fn deref(&self) -> &H {
		&self.handle
	}
}
