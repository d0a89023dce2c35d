//! Caching secret provider

use super::{
	DatabaseCredentials, SecretCache, SecretError, SecretProvider, SecretResult, SecretSource,
};
use async_trait::async_trait;
use std::time::Duration;

/// [`SecretProvider`] that memoizes decoded credentials from a [`SecretSource`]
///
/// Two callers missing the cache for the same name at the same time both
/// fetch from the source; fetches are idempotent reads and the later insert
/// wins.
///
/// # Examples
///
/// ```
/// use gymstore_conf::settings::secrets::providers::memory::MemorySecretSource;
/// use gymstore_conf::settings::secrets::{CachedSecretProvider, SecretProvider};
/// use std::time::Duration;
///
/// # async fn example() {
/// let source = MemorySecretSource::new();
/// source.insert(
///     "prod/gym/postgresql",
///     r#"{"host":"db.example","port":"5432","dbname":"gym","username":"u","password":"p"}"#,
/// );
///
/// let provider = CachedSecretProvider::new(source, Duration::from_secs(300));
/// let creds = provider.get_secret("prod/gym/postgresql").await.unwrap();
/// assert_eq!(creds.host, "db.example");
///
/// // Served from the cache
/// provider.get_secret("prod/gym/postgresql").await.unwrap();
/// assert_eq!(provider.source().fetch_count(), 1);
/// # }
/// # tokio::runtime::Runtime::new().unwrap().block_on(example());
/// ```
pub struct CachedSecretProvider<S> {
	source: S,
	cache: SecretCache,
}

impl<S: SecretSource> CachedSecretProvider<S> {
	pub fn new(source: S, ttl: Duration) -> Self {
		Self {
			source,
			cache: SecretCache::new(ttl),
		}
	}

	pub fn source(&self) -> &S {
		&self.source
	}

	pub fn cache(&self) -> &SecretCache {
		&self.cache
	}
}

#[async_trait]
impl<S: SecretSource> SecretProvider for CachedSecretProvider<S> {
	async fn get_secret(&self, name: &str) -> SecretResult<DatabaseCredentials> {
		if let Some(credentials) = self.cache.get(name) {
			tracing::debug!(secret = name, "secret cache hit");
			return Ok(credentials);
		}

		tracing::debug!(secret = name, source = self.source.name(), "fetching secret");
		let payload = self
			.source
			.fetch_secret_string(name)
			.await?
			.ok_or_else(|| SecretError::MissingPayload {
				name: name.to_string(),
			})?;

		let credentials = DatabaseCredentials::from_json(&payload)?;
		self.cache.insert(name, credentials.clone());

		Ok(credentials)
	}

	fn name(&self) -> &str {
		self.source.name()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::settings::secrets::providers::memory::MemorySecretSource;
	use rstest::{fixture, rstest};

	const NAME: &str = "prod/gym/postgresql";
	const PAYLOAD: &str =
		r#"{"host":"db.example","port":"5432","dbname":"gym","username":"u","password":"p@ss"}"#;

	#[fixture]
	fn provider() -> CachedSecretProvider<MemorySecretSource> {
		let source = MemorySecretSource::new();
		source.insert(NAME, PAYLOAD);
		CachedSecretProvider::new(source, Duration::from_secs(300))
	}

	#[rstest]
	#[tokio::test(start_paused = true)]
	async fn test_hit_within_ttl_skips_source(provider: CachedSecretProvider<MemorySecretSource>) {
		let first = provider.get_secret(NAME).await.unwrap();
		tokio::time::advance(Duration::from_secs(120)).await;
		let second = provider.get_secret(NAME).await.unwrap();

		assert_eq!(first, second);
		assert_eq!(provider.source().fetch_count(), 1);
	}

	#[rstest]
	#[tokio::test(start_paused = true)]
	async fn test_rotation_observed_after_expiry(provider: CachedSecretProvider<MemorySecretSource>) {
		provider.get_secret(NAME).await.unwrap();

		provider.source().insert(
			NAME,
			r#"{"host":"db.example","port":"5432","dbname":"gym","username":"u","password":"rotated"}"#,
		);
		let cached = provider.get_secret(NAME).await.unwrap();
		assert_eq!(cached.password.expose_secret(), "p@ss");

		tokio::time::advance(Duration::from_secs(300)).await;
		let refreshed = provider.get_secret(NAME).await.unwrap();

		assert_eq!(refreshed.password.expose_secret(), "rotated");
		assert_eq!(provider.source().fetch_count(), 2);
	}

	#[rstest]
	#[tokio::test]
	async fn test_missing_payload_is_an_error_and_not_cached() {
		let source = MemorySecretSource::new();
		source.insert_without_payload(NAME);
		let provider = CachedSecretProvider::new(source, Duration::from_secs(300));

		let err = provider.get_secret(NAME).await.unwrap_err();

		assert!(matches!(err, SecretError::MissingPayload { ref name } if name == NAME));
		assert!(provider.cache().is_empty());
	}

	#[rstest]
	#[tokio::test]
	async fn test_malformed_payload_is_a_decode_error() {
		let source = MemorySecretSource::new();
		source.insert(NAME, "{not json");
		let provider = CachedSecretProvider::new(source, Duration::from_secs(300));

		let err = provider.get_secret(NAME).await.unwrap_err();

		assert!(matches!(err, SecretError::Decode(_)));
		assert!(provider.cache().is_empty());
	}

	#[rstest]
	#[tokio::test]
	async fn test_source_errors_propagate(provider: CachedSecretProvider<MemorySecretSource>) {
		let err = provider.get_secret("unknown/secret").await.unwrap_err();

		assert!(matches!(err, SecretError::Fetch { ref name, .. } if name == "unknown/secret"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_invalidate_forces_refetch(provider: CachedSecretProvider<MemorySecretSource>) {
		provider.get_secret(NAME).await.unwrap();
		provider.cache().invalidate(NAME);
		provider.get_secret(NAME).await.unwrap();

		assert_eq!(provider.source().fetch_count(), 2);
		assert_eq!(provider.name(), "memory");
	}
}
