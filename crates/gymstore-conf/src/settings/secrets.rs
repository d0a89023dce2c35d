//! Secrets management
//!
//! Database credentials are resolved by a [`SecretProvider`]. The production
//! provider is a [`CachedSecretProvider`] layered over a remote
//! [`SecretSource`]: it serves fresh entries from a [`SecretCache`] and only
//! reaches the source on a miss or after expiry.
//!
//! ```text
//! get_secret(name)
//!   ├─ cache hit (unexpired) ──────────────────────────────► credentials
//!   └─ miss/expired ─► source.fetch (lazy client init once)
//!                       ├─ no payload ─► SecretError::MissingPayload
//!                       └─ payload ─► decode JSON ─► cache.insert ─► credentials
//! ```

pub mod cache;
pub mod cached;
pub mod once;
pub mod providers;

pub use cache::SecretCache;
pub use cached::CachedSecretProvider;
pub use once::InitOnce;

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use zeroize::Zeroize;

/// Result type for secret operations
pub type SecretResult<T> = Result<T, SecretError>;

/// Boxed backend error kept as the source of a [`SecretError`]
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A string whose contents are redacted from `Debug` and wiped on drop
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SecretString(String);

impl SecretString {
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Access the underlying value
	pub fn expose_secret(&self) -> &str {
		&self.0
	}
}

impl fmt::Debug for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("SecretString(***)")
	}
}

impl Drop for SecretString {
	fn drop(&mut self) {
		self.0.zeroize();
	}
}

/// Credential bundle stored in the secret store
///
/// The payload shape is
/// `{"host": "...", "port": "...", "dbname": "...", "username": "...", "password": "..."}`.
/// Absent fields decode as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseCredentials {
	pub host: String,
	pub port: String,
	#[serde(rename = "dbname")]
	pub database: String,
	pub username: String,
	pub password: SecretString,
}

impl DatabaseCredentials {
	/// Decode a secret payload
	///
	/// # Examples
	///
	/// ```
	/// use gymstore_conf::settings::secrets::DatabaseCredentials;
	///
	/// let creds = DatabaseCredentials::from_json(
	///     r#"{"host":"db.example","port":"5432","dbname":"gym","username":"u","password":"p@ss"}"#,
	/// )
	/// .unwrap();
	///
	/// assert_eq!(creds.database, "gym");
	/// assert_eq!(creds.password.expose_secret(), "p@ss");
	/// assert!(!format!("{:?}", creds).contains("p@ss"));
	/// ```
	pub fn from_json(payload: &str) -> SecretResult<Self> {
		serde_json::from_str(payload).map_err(SecretError::Decode)
	}
}

/// Secret resolution errors
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
	/// The remote client could not be configured. Cached for the lifetime of
	/// the provider, so the cause is shared between callers.
	#[error("load secret store config: {0}")]
	Init(#[source] Arc<dyn std::error::Error + Send + Sync>),

	#[error("get secret value for '{name}': {source}")]
	Fetch {
		name: String,
		#[source]
		source: BoxError,
	},

	#[error("secret '{name}' value missing string payload")]
	MissingPayload { name: String },

	#[error("decode secret json: {0}")]
	Decode(#[source] serde_json::Error),
}

/// Resolves credential bundles by secret name
#[async_trait]
pub trait SecretProvider: Send + Sync {
	/// Resolve the credentials stored under `name`
	async fn get_secret(&self, name: &str) -> SecretResult<DatabaseCredentials>;

	/// Identifier used in logs
	fn name(&self) -> &str;
}

/// Remote store returning raw secret payloads
#[async_trait]
pub trait SecretSource: Send + Sync {
	/// Fetch the current version of `name`
	///
	/// `Ok(None)` means the secret exists but carries no string payload.
	async fn fetch_secret_string(&self, name: &str) -> SecretResult<Option<String>>;

	/// Identifier used in logs
	fn name(&self) -> &str;
}
