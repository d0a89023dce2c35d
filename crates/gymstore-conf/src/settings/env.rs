//! Environment variable handling module
//!
//! Typed lookups over process environment variables. Values are trimmed and an
//! empty value is treated the same as an unset one. Optional numeric and
//! duration values that fail to parse are logged and replaced by their
//! default instead of failing startup.

use std::collections::HashMap;
use std::env;
use std::fmt::Display;
use std::time::Duration;

/// Environment variable reader
///
/// Reads from the process environment by default. [`Env::from_pairs`] builds a
/// reader over a fixed set of variables, which keeps tests independent of
/// process-global state.
///
/// # Examples
///
/// ```
/// use gymstore_conf::Env;
/// use std::time::Duration;
///
/// let env = Env::from_pairs([("DB_CONNECT_TIMEOUT", "30s"), ("DB_MAX_OPEN_CONNS", " 20 ")]);
///
/// assert_eq!(env.duration_or("DB_CONNECT_TIMEOUT", Duration::from_secs(10)), Duration::from_secs(30));
/// assert_eq!(env.u32_or("DB_MAX_OPEN_CONNS", 10), 20);
/// assert_eq!(env.str_or("POSTGRES_HOST", "localhost"), "localhost");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Env {
	/// Fixed variables; `None` reads the process environment
	vars: Option<HashMap<String, String>>,
}

impl Env {
	/// Create a reader over the process environment
	pub fn new() -> Self {
		Self { vars: None }
	}

	/// Create a reader over a fixed set of variables
	pub fn from_pairs<I, K, V>(pairs: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		Self {
			vars: Some(
				pairs
					.into_iter()
					.map(|(k, v)| (k.into(), v.into()))
					.collect(),
			),
		}
	}

	/// Read a trimmed value, treating empty as unset
	pub fn var(&self, key: &str) -> Option<String> {
		let raw = match &self.vars {
			Some(vars) => vars.get(key).cloned(),
			None => env::var(key).ok(),
		}?;

		let trimmed = raw.trim();
		if trimmed.is_empty() {
			None
		} else {
			Some(trimmed.to_string())
		}
	}

	/// Read a string value with a default
	pub fn str_or(&self, key: &str, default: &str) -> String {
		self.var(key).unwrap_or_else(|| default.to_string())
	}

	/// Read an unsigned integer with a default
	///
	/// Malformed values (including negative numbers) are logged as warnings
	/// and replaced by `default`.
	pub fn u32_or(&self, key: &str, default: u32) -> u32 {
		self.parse_or(key, default, |raw| raw.parse::<u32>())
	}

	/// Read a duration such as `10s`, `5m` or `1h 30m` with a default
	///
	/// Malformed values are logged as warnings and replaced by `default`.
	pub fn duration_or(&self, key: &str, default: Duration) -> Duration {
		self.parse_or(key, default, humantime::parse_duration)
	}

	fn parse_or<T, E, F>(&self, key: &str, default: T, parse: F) -> T
	where
		T: Copy + std::fmt::Debug,
		E: Display,
		F: FnOnce(&str) -> Result<T, E>,
	{
		let Some(raw) = self.var(key) else {
			return default;
		};

		match parse(&raw) {
			Ok(value) => value,
			Err(err) => {
				tracing::warn!(
					key,
					value = %raw,
					default = ?default,
					error = %err,
					"invalid environment value, using default"
				);
				default
			}
		}
	}
}
