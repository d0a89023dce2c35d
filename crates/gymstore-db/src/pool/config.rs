//! Pool configuration

use gymstore_conf::Env;
use sqlx::pool::PoolOptions;
use std::time::Duration;

const DEFAULT_MAX_OPEN: u32 = 10;
const DEFAULT_MAX_IDLE: u32 = 5;
const DEFAULT_MAX_LIFETIME: Duration = Duration::from_secs(30 * 60);
const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(2);

/// Pool limits applied to every handle the connector opens
///
/// `max_idle` is an upper limit only. `sqlx` has no idle cap of its own and
/// its `min_connections` would open connections eagerly, so the pool is left
/// to grow on demand and `max_idle` is kept as the clamped, logged limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
	pub max_open: u32,
	pub max_idle: u32,
	/// `None` disables age-based recycling
	pub max_lifetime: Option<Duration>,
	/// Bound on a single connection attempt, probes included
	///
	/// Must stay well under the connect timeout so every retry attempt fits.
	pub acquire_timeout: Duration,
}

impl Default for PoolConfig {
	fn default() -> Self {
		Self {
			max_open: DEFAULT_MAX_OPEN,
			max_idle: DEFAULT_MAX_IDLE,
			max_lifetime: Some(DEFAULT_MAX_LIFETIME),
			acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
		}
	}
}

impl PoolConfig {
	/// Create a new pool configuration with default values
	///
	/// # Examples
	///
	/// ```rust
	/// use gymstore_db::pool::PoolConfig;
	///
	/// let config = PoolConfig::new();
	/// assert_eq!(config.max_open, 10);
	/// assert_eq!(config.max_idle, 5);
	/// ```
	pub fn new() -> Self {
		Self::default()
	}

	/// Read `DB_MAX_OPEN_CONNS`, `DB_MAX_IDLE_CONNS`, `DB_CONN_MAX_LIFETIME`
	/// and `DB_ACQUIRE_TIMEOUT`
	///
	/// A zero open limit or acquire timeout falls back to the default; a zero
	/// lifetime disables age-based recycling.
	pub fn from_env(env: &Env) -> Self {
		let mut max_open = env.u32_or("DB_MAX_OPEN_CONNS", DEFAULT_MAX_OPEN);
		if max_open == 0 {
			tracing::warn!(
				key = "DB_MAX_OPEN_CONNS",
				default = DEFAULT_MAX_OPEN,
				"zero open connection limit, using default"
			);
			max_open = DEFAULT_MAX_OPEN;
		}

		let max_lifetime = env.duration_or("DB_CONN_MAX_LIFETIME", DEFAULT_MAX_LIFETIME);

		let mut acquire_timeout = env.duration_or("DB_ACQUIRE_TIMEOUT", DEFAULT_ACQUIRE_TIMEOUT);
		if acquire_timeout.is_zero() {
			tracing::warn!(
				key = "DB_ACQUIRE_TIMEOUT",
				default = ?DEFAULT_ACQUIRE_TIMEOUT,
				"zero acquire timeout, using default"
			);
			acquire_timeout = DEFAULT_ACQUIRE_TIMEOUT;
		}

		Self {
			max_open,
			max_idle: env.u32_or("DB_MAX_IDLE_CONNS", DEFAULT_MAX_IDLE),
			max_lifetime: (!max_lifetime.is_zero()).then_some(max_lifetime),
			acquire_timeout,
		}
	}

	pub fn with_max_open(mut self, max: u32) -> Self {
		self.max_open = max;
		self
	}

	pub fn with_max_idle(mut self, max: u32) -> Self {
		self.max_idle = max;
		self
	}

	pub fn with_max_lifetime(mut self, lifetime: Option<Duration>) -> Self {
		self.max_lifetime = lifetime;
		self
	}

	pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
		self.acquire_timeout = timeout;
		self
	}

	/// The limits actually applied: idle clamped to open, open at least one
	pub fn normalized(&self) -> Self {
		let max_open = self.max_open.max(1);
		Self {
			max_open,
			max_idle: self.max_idle.min(max_open),
			max_lifetime: self.max_lifetime,
			acquire_timeout: self.acquire_timeout,
		}
	}

	/// Apply the normalized limits to driver pool options
	///
	/// Never raises `min_connections`, so opening a pool does not start
	/// background connection attempts.
	pub fn apply<DB: sqlx::Database>(&self, options: PoolOptions<DB>) -> PoolOptions<DB> {
		let config = self.normalized();
		options
			.max_connections(config.max_open)
			.max_lifetime(config.max_lifetime)
			.acquire_timeout(config.acquire_timeout)
	}
}
