//! AWS Secrets Manager source
//!
//! Fetches the `AWSCURRENT` version of a secret. The SDK client is built
//! lazily on the first fetch, exactly once per source.

use crate::settings::DatabaseSettings;
use crate::settings::secrets::{
	CachedSecretProvider, InitOnce, SecretError, SecretResult, SecretSource,
};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_secretsmanager::Client;
use aws_sdk_secretsmanager::error::DisplayErrorContext;

/// Version stage requested for every fetch
pub const CURRENT_VERSION_STAGE: &str = "AWSCURRENT";

/// Cached AWS-backed provider used outside the local environment
pub type AwsSecretProvider = CachedSecretProvider<AwsSecretsSource>;

/// AWS Secrets Manager source
///
/// # Example
///
/// ```no_run
/// use gymstore_conf::DatabaseSettings;
/// use gymstore_conf::settings::secrets::SecretProvider;
/// use gymstore_conf::settings::secrets::providers::aws::AwsSecretsSource;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = AwsSecretsSource::provider(&DatabaseSettings::default());
/// let creds = provider.get_secret("prod/gym/postgresql").await?;
/// # Ok(())
/// # }
/// ```
pub struct AwsSecretsSource {
	region: String,
	endpoint_url: Option<String>,
	client: InitOnce<Client>,
}

impl AwsSecretsSource {
	/// Create a source for `region`; no AWS configuration is loaded yet
	pub fn new(region: impl Into<String>) -> Self {
		Self {
			region: region.into(),
			endpoint_url: None,
			client: InitOnce::new(),
		}
	}

	/// Use a custom endpoint (for LocalStack testing)
	pub fn with_endpoint(mut self, endpoint_url: impl Into<String>) -> Self {
		self.endpoint_url = Some(endpoint_url.into());
		self
	}

	/// Cached provider configured from `settings`
	pub fn provider(settings: &DatabaseSettings) -> AwsSecretProvider {
		CachedSecretProvider::new(
			Self::new(settings.aws_region.clone()),
			settings.secret_cache_ttl,
		)
	}

	pub fn region(&self) -> &str {
		&self.region
	}

	/// Whether the SDK client initialization has run
	pub fn is_initialized(&self) -> bool {
		self.client.is_initialized()
	}

	async fn client(&self) -> SecretResult<&Client> {
		self.client
			.get_or_init(|| async {
				tracing::debug!(region = %self.region, "loading AWS configuration");
				let config = aws_config::defaults(BehaviorVersion::latest())
					.region(Region::new(self.region.clone()))
					.load()
					.await;

				if config.credentials_provider().is_none() {
					return Err("no AWS credentials provider configured".into());
				}

				let mut builder = aws_sdk_secretsmanager::config::Builder::from(&config);
				if let Some(endpoint_url) = &self.endpoint_url {
					builder = builder.endpoint_url(endpoint_url);
				}
				Ok(Client::from_conf(builder.build()))
			})
			.await
	}
}

#[async_trait]
impl SecretSource for AwsSecretsSource {
	async fn fetch_secret_string(&self, name: &str) -> SecretResult<Option<String>> {
		let client = self.client().await?;

		let output = client
			.get_secret_value()
			.secret_id(name)
			.version_stage(CURRENT_VERSION_STAGE)
			.send()
			.await
			.map_err(|err| {
				tracing::debug!(secret = name, error = %DisplayErrorContext(&err), "secret fetch failed");
				SecretError::Fetch {
					name: name.to_string(),
					source: Box::new(err),
				}
			})?;

		Ok(output.secret_string().map(str::to_string))
	}

	fn name(&self) -> &str {
		"aws-secrets-manager"
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::time::Duration;

	#[rstest]
	fn test_source_is_lazy() {
		let source = AwsSecretsSource::new("eu-west-1").with_endpoint("http://localhost:4566");

		assert!(!source.is_initialized());
		assert_eq!(source.region(), "eu-west-1");
		assert_eq!(source.name(), "aws-secrets-manager");
	}

	#[rstest]
	fn test_provider_uses_settings() {
		let settings = DatabaseSettings::default().with_secret_cache_ttl(Duration::from_secs(30));

		let provider = AwsSecretsSource::provider(&settings);

		assert_eq!(provider.source().region(), "ap-south-1");
		assert_eq!(provider.cache().ttl(), Duration::from_secs(30));
		assert!(!provider.source().is_initialized());
	}
}
