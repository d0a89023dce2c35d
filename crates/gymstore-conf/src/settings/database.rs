//! Database settings
//!
//! Everything the connection manager reads from the environment, collected
//! once into [`DatabaseSettings`]. Pool limits live with the pool in
//! `gymstore-db`.

use super::env::Env;
use super::environment::{Environment, EnvironmentError};
use std::time::Duration;

/// Secret holding production credentials
pub const SECRET_NAME_PROD: &str = "prod/gym/postgresql";
/// Secret holding staging credentials
pub const SECRET_NAME_STAGING: &str = "stagging/gym/postgresql";

/// Region used when `AWS_REGION` is unset
pub const DEFAULT_AWS_REGION: &str = "ap-south-1";

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_SECRET_CACHE_TTL: Duration = Duration::from_secs(5 * 60);
const DEFAULT_LOCAL_SSL_MODE: &str = "disable";
const DEFAULT_REMOTE_SSL_MODE: &str = "require";

/// Connection fields for the local environment
///
/// These values are trusted and are formatted into the DSN verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalDatabaseSettings {
	pub host: String,
	pub port: String,
	pub user: String,
	pub password: String,
	pub database: String,
	pub ssl_mode: String,
}

impl Default for LocalDatabaseSettings {
	fn default() -> Self {
		Self {
			host: "localhost".to_string(),
			port: "5432".to_string(),
			user: "postgres".to_string(),
			password: "postgres".to_string(),
			database: "postgres".to_string(),
			ssl_mode: DEFAULT_LOCAL_SSL_MODE.to_string(),
		}
	}
}

impl LocalDatabaseSettings {
	/// Read `POSTGRES_*` and `DB_SSL_MODE`, each independently defaulted
	pub fn from_env(env: &Env) -> Self {
		let defaults = Self::default();
		Self {
			host: env.str_or("POSTGRES_HOST", &defaults.host),
			port: env.str_or("POSTGRES_PORT", &defaults.port),
			user: env.str_or("POSTGRES_USER", &defaults.user),
			password: env.str_or("POSTGRES_PASSWORD", &defaults.password),
			database: env.str_or("POSTGRES_DB", &defaults.database),
			ssl_mode: env.str_or("DB_SSL_MODE", &defaults.ssl_mode),
		}
	}
}

/// Settings for credential resolution and connection establishment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
	/// Raw `APP_ENV`, classified by the connection manager
	pub app_env: String,

	/// `DB_SECRET_NAME`; wins over the per-environment default
	pub secret_name_override: Option<String>,

	/// SSL mode for secret-sourced connections
	pub remote_ssl_mode: String,

	/// Bound on the whole open sequence, retries included
	pub connect_timeout: Duration,

	/// How long a fetched credential bundle stays cached
	pub secret_cache_ttl: Duration,

	/// Region of the secret store
	pub aws_region: String,

	/// Fields used when the environment is local
	pub local: LocalDatabaseSettings,
}

impl Default for DatabaseSettings {
	fn default() -> Self {
		Self {
			app_env: String::new(),
			secret_name_override: None,
			remote_ssl_mode: DEFAULT_REMOTE_SSL_MODE.to_string(),
			connect_timeout: DEFAULT_CONNECT_TIMEOUT,
			secret_cache_ttl: DEFAULT_SECRET_CACHE_TTL,
			aws_region: DEFAULT_AWS_REGION.to_string(),
			local: LocalDatabaseSettings::default(),
		}
	}
}

impl DatabaseSettings {
	/// Read all settings from the given reader
	///
	/// # Examples
	///
	/// ```
	/// use gymstore_conf::{DatabaseSettings, Env};
	/// use std::time::Duration;
	///
	/// let env = Env::from_pairs([("APP_ENV", "prod"), ("DB_SECRET_CACHE_TTL", "1m")]);
	/// let settings = DatabaseSettings::from_env(&env);
	///
	/// assert_eq!(settings.app_env, "prod");
	/// assert_eq!(settings.remote_ssl_mode, "require");
	/// assert_eq!(settings.local.ssl_mode, "disable");
	/// assert_eq!(settings.secret_cache_ttl, Duration::from_secs(60));
	/// ```
	pub fn from_env(env: &Env) -> Self {
		let defaults = Self::default();
		Self {
			app_env: env.var(super::environment::APP_ENV_VAR).unwrap_or_default(),
			secret_name_override: env.var("DB_SECRET_NAME"),
			remote_ssl_mode: env.str_or("DB_SSL_MODE", &defaults.remote_ssl_mode),
			connect_timeout: env.duration_or("DB_CONNECT_TIMEOUT", defaults.connect_timeout),
			secret_cache_ttl: env.duration_or("DB_SECRET_CACHE_TTL", defaults.secret_cache_ttl),
			aws_region: env.str_or("AWS_REGION", &defaults.aws_region),
			local: LocalDatabaseSettings::from_env(env),
		}
	}

	pub fn with_app_env(mut self, app_env: impl Into<String>) -> Self {
		self.app_env = app_env.into();
		self
	}

	pub fn with_secret_name(mut self, name: impl Into<String>) -> Self {
		self.secret_name_override = Some(name.into());
		self
	}

	pub fn with_remote_ssl_mode(mut self, mode: impl Into<String>) -> Self {
		self.remote_ssl_mode = mode.into();
		self
	}

	pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
		self.connect_timeout = timeout;
		self
	}

	pub fn with_secret_cache_ttl(mut self, ttl: Duration) -> Self {
		self.secret_cache_ttl = ttl;
		self
	}

	pub fn with_local(mut self, local: LocalDatabaseSettings) -> Self {
		self.local = local;
		self
	}

	/// Secret to resolve for a non-local environment
	pub fn secret_name(&self, env: Environment) -> Result<String, EnvironmentError> {
		select_secret_name(env, self.secret_name_override.as_deref())
	}
}

/// Pick the secret holding credentials for `env`
///
/// An override always wins. Without one, staging and production map to their
/// fixed secrets and any other label has no secret configured.
///
/// # Examples
///
/// ```
/// use gymstore_conf::Environment;
/// use gymstore_conf::settings::{SECRET_NAME_PROD, select_secret_name};
///
/// assert_eq!(select_secret_name(Environment::Prod, None).unwrap(), SECRET_NAME_PROD);
/// assert_eq!(select_secret_name(Environment::Prod, Some("custom/db")).unwrap(), "custom/db");
/// assert!(select_secret_name(Environment::Local, None).is_err());
/// ```
pub fn select_secret_name(
	env: Environment,
	override_name: Option<&str>,
) -> Result<String, EnvironmentError> {
	if let Some(name) = override_name.map(str::trim).filter(|name| !name.is_empty()) {
		return Ok(name.to_string());
	}

	match env {
		Environment::Staging => Ok(SECRET_NAME_STAGING.to_string()),
		Environment::Prod => Ok(SECRET_NAME_PROD.to_string()),
		Environment::Local => Err(EnvironmentError::NoSecretConfigured(env)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(Environment::Staging, SECRET_NAME_STAGING)]
	#[case(Environment::Prod, SECRET_NAME_PROD)]
	fn test_select_secret_name_defaults(#[case] env: Environment, #[case] expected: &str) {
		assert_eq!(select_secret_name(env, None).unwrap(), expected);
	}

	#[rstest]
	#[case(Environment::Staging)]
	#[case(Environment::Prod)]
	#[case(Environment::Local)]
	fn test_select_secret_name_override_wins(#[case] env: Environment) {
		assert_eq!(
			select_secret_name(env, Some("team/override")).unwrap(),
			"team/override"
		);
	}

	#[rstest]
	fn test_select_secret_name_blank_override_is_ignored() {
		assert_eq!(
			select_secret_name(Environment::Prod, Some("   ")).unwrap(),
			SECRET_NAME_PROD
		);
	}

	#[rstest]
	fn test_select_secret_name_local_without_override_fails() {
		let err = select_secret_name(Environment::Local, None).unwrap_err();

		assert_eq!(err, EnvironmentError::NoSecretConfigured(Environment::Local));
		assert_eq!(err.to_string(), "no secret name configured for env: local");
	}

	#[rstest]
	fn test_defaults_when_environment_is_empty() {
		let settings = DatabaseSettings::from_env(&Env::from_pairs(Vec::<(String, String)>::new()));

		assert_eq!(settings, DatabaseSettings::default());
		assert_eq!(settings.connect_timeout, Duration::from_secs(10));
		assert_eq!(settings.secret_cache_ttl, Duration::from_secs(300));
		assert_eq!(settings.aws_region, "ap-south-1");
		assert_eq!(settings.local.host, "localhost");
		assert_eq!(settings.local.port, "5432");
		assert_eq!(settings.local.ssl_mode, "disable");
	}

	#[rstest]
	fn test_ssl_mode_override_applies_to_both_paths() {
		let env = Env::from_pairs([("DB_SSL_MODE", "verify-full")]);

		let settings = DatabaseSettings::from_env(&env);

		assert_eq!(settings.remote_ssl_mode, "verify-full");
		assert_eq!(settings.local.ssl_mode, "verify-full");
	}

	#[rstest]
	fn test_local_fields_are_read_independently() {
		let env = Env::from_pairs([("POSTGRES_HOST", "db.internal"), ("POSTGRES_DB", "gym")]);

		let local = LocalDatabaseSettings::from_env(&env);

		assert_eq!(local.host, "db.internal");
		assert_eq!(local.database, "gym");
		assert_eq!(local.user, "postgres");
		assert_eq!(local.password, "postgres");
	}

	#[rstest]
	fn test_malformed_durations_fall_back_to_defaults() {
		let env = Env::from_pairs([
			("DB_CONNECT_TIMEOUT", "forever"),
			("DB_SECRET_CACHE_TTL", "-5m"),
		]);

		let settings = DatabaseSettings::from_env(&env);

		assert_eq!(settings.connect_timeout, Duration::from_secs(10));
		assert_eq!(settings.secret_cache_ttl, Duration::from_secs(300));
	}
}
