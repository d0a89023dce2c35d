//! Driver seam for opening and probing handles

use super::config::PoolConfig;
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{ConnectOptions, Connection};

/// A pooled handle that can be probed for liveness and released
#[async_trait]
pub trait Probe: Send + Sync {
	/// Check that the database answers
	async fn ping(&self) -> Result<(), sqlx::Error>;

	/// Validate a freshly opened handle
	///
	/// Runs once per open attempt and must fail fast with the driver's own
	/// error when the server is unreachable.
	async fn verify(&self) -> Result<(), sqlx::Error> {
		self.ping().await
	}

	/// Release the handle and its connections
	async fn close(&self);
}

/// Opens driver handles from a DSN
///
/// `open` may succeed without touching the network; the connector always
/// follows it with [`Probe::verify`].
#[async_trait]
pub trait ConnectionOpener: Send + Sync {
	type Handle: Probe;

	async fn open(&self, dsn: &str) -> Result<Self::Handle, sqlx::Error>;
}

#[async_trait]
impl Probe for PgPool {
	async fn ping(&self) -> Result<(), sqlx::Error> {
		let mut conn = self.acquire().await?;
		conn.ping().await
	}

	/// Connect once outside the pool
	///
	/// Pool acquisition retries refused connections until the acquire timeout
	/// and then reports only `PoolTimedOut`. A direct connection surfaces the
	/// refusal at once, bounded by the same timeout.
	async fn verify(&self) -> Result<(), sqlx::Error> {
		let options = self.connect_options();
		let bound = self.options().get_acquire_timeout();
		let mut conn = tokio::time::timeout(bound, options.connect())
			.await
			.map_err(|_| sqlx::Error::PoolTimedOut)??;
		conn.ping().await?;
		conn.close().await
	}

	async fn close(&self) {
		sqlx::Pool::close(self).await;
	}
}

/// Opens PostgreSQL pools with the configured limits
#[derive(Debug, Clone, Default)]
pub struct PostgresOpener {
	pool: PoolConfig,
}

impl PostgresOpener {
	pub fn new(pool: PoolConfig) -> Self {
		Self { pool }
	}

	pub fn pool_config(&self) -> &PoolConfig {
		&self.pool
	}
}

#[async_trait]
impl ConnectionOpener for PostgresOpener {
	type Handle = PgPool;

	async fn open(&self, dsn: &str) -> Result<PgPool, sqlx::Error> {
		let config = self.pool.normalized();
		tracing::debug!(
			max_open = config.max_open,
			max_idle = config.max_idle,
			max_lifetime = ?config.max_lifetime,
			acquire_timeout = ?config.acquire_timeout,
			"opening postgres pool"
		);
		self.pool.apply(PgPoolOptions::new()).connect_lazy(dsn)
	}
}
