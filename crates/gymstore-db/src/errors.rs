//! Connection manager errors

use gymstore_conf::EnvironmentError;
use gymstore_conf::settings::secrets::SecretError;
use std::time::Duration;

/// Result type for connection manager operations
pub type DbResult<T> = Result<T, DbError>;

/// Errors raised while opening or probing the database
///
/// Each variant names the stage that failed and keeps the underlying error
/// as its source.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
	/// `APP_ENV` is unrecognized or has no secret configured
	#[error("database configuration: {0}")]
	Environment(#[from] EnvironmentError),

	#[error("failed to load database secret: {0}")]
	Secret(#[from] SecretError),

	/// Every open attempt failed; carries the last failure
	#[error("failed to open database after retries: {0}")]
	Connect(#[source] sqlx::Error),

	#[error("database connect timed out after {0:?}")]
	Timeout(Duration),

	#[error("database health check failed: {0}")]
	HealthCheck(#[source] sqlx::Error),

	#[error("database health check timed out after {0:?}")]
	HealthCheckTimeout(Duration),
}

#[cfg(test)]
mod tests {
	use super::*;
	use gymstore_conf::Environment;
	use rstest::rstest;
	use std::error::Error;

	#[rstest]
	fn test_stage_context_keeps_source() {
		let err = DbError::from(SecretError::MissingPayload {
			name: "prod/gym/postgresql".to_string(),
		});

		assert_eq!(
			err.to_string(),
			"failed to load database secret: secret 'prod/gym/postgresql' value missing string payload"
		);
		assert!(err.source().is_some());
	}

	#[rstest]
	fn test_secret_fetch_cause_reachable_through_chain() {
		let backend = std::io::Error::new(std::io::ErrorKind::TimedOut, "endpoint unreachable");
		let err = DbError::from(SecretError::Fetch {
			name: "prod/gym/postgresql".to_string(),
			source: Box::new(backend),
		});

		let secret = err.source().unwrap();
		let cause = secret.source().unwrap();

		assert_eq!(cause.to_string(), "endpoint unreachable");
		assert!(cause.downcast_ref::<std::io::Error>().is_some());
	}

	#[rstest]
	fn test_connect_error_cites_last_failure() {
		let err = DbError::Connect(sqlx::Error::Protocol("connection refused".to_string()));

		assert!(
			err.to_string()
				.starts_with("failed to open database after retries:")
		);
		assert!(err.to_string().contains("connection refused"));
		assert!(err.source().is_some());
	}

	#[rstest]
	fn test_environment_error_is_fatal_config_error() {
		let err = DbError::from(EnvironmentError::NoSecretConfigured(Environment::Local));

		assert_eq!(
			err.to_string(),
			"database configuration: no secret name configured for env: local"
		);
	}
}
