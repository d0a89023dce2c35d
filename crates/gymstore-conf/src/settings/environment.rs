//! Deployment environment classification
//!
//! `APP_ENV` is mapped onto a closed set of labels. The mapping is a
//! case-insensitive prefix match so `Production`, `prod-eu` and `PROD` all
//! select [`Environment::Prod`]. An empty value selects [`Environment::Local`].
//! Anything else is a configuration error and is never coerced.

use super::env::Env;
use std::fmt;

/// Environment variable holding the raw deployment label
pub const APP_ENV_VAR: &str = "APP_ENV";

/// Deployment environment label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Environment {
	/// Developer machine; credentials come from local variables
	Local,
	/// Staging deployment; credentials come from the secret store
	Staging,
	/// Production deployment; credentials come from the secret store
	Prod,
}

impl Environment {
	/// Classify a raw label
	///
	/// # Examples
	///
	/// ```
	/// use gymstore_conf::Environment;
	///
	/// assert_eq!(Environment::classify("").unwrap(), Environment::Local);
	/// assert_eq!(Environment::classify("Staging").unwrap(), Environment::Staging);
	/// assert_eq!(Environment::classify("PRODUCTION").unwrap(), Environment::Prod);
	/// assert!(Environment::classify("qa").is_err());
	/// ```
	pub fn classify(raw: &str) -> Result<Self, EnvironmentError> {
		let normalized = raw.trim().to_lowercase();

		if normalized.is_empty() || normalized.starts_with("loc") {
			Ok(Self::Local)
		} else if normalized.starts_with("stag") {
			Ok(Self::Staging)
		} else if normalized.starts_with("prod") {
			Ok(Self::Prod)
		} else {
			Err(EnvironmentError::Unknown {
				raw: raw.trim().to_string(),
			})
		}
	}

	/// Canonical label
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Local => "local",
			Self::Staging => "staging",
			Self::Prod => "prod",
		}
	}

	/// Whether credentials come from local configuration
	pub fn is_local(&self) -> bool {
		matches!(self, Self::Local)
	}
}

impl fmt::Display for Environment {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Classified environment together with the value it was derived from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEnvironment {
	pub label: Environment,
	/// Trimmed `APP_ENV` value as supplied, empty when unset
	pub raw: String,
}

impl ResolvedEnvironment {
	/// Classify a raw value, keeping it for logging
	pub fn resolve(raw: &str) -> Result<Self, EnvironmentError> {
		let label = Environment::classify(raw)?;
		Ok(Self {
			label,
			raw: raw.trim().to_string(),
		})
	}

	/// Classify `APP_ENV` from the given reader
	pub fn from_env(env: &Env) -> Result<Self, EnvironmentError> {
		Self::resolve(&env.var(APP_ENV_VAR).unwrap_or_default())
	}
}

/// Environment classification errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvironmentError {
	#[error("unknown APP_ENV value {raw:?} (expected local|staging|prod)")]
	Unknown { raw: String },

	#[error("no secret name configured for env: {0}")]
	NoSecretConfigured(Environment),
}
