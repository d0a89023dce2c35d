//! In-memory secret source for testing

use crate::settings::secrets::{SecretError, SecretResult, SecretSource};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory secret source (for development/testing only)
///
/// Stores raw payloads by name and counts every fetch, so tests can assert
/// whether a lookup reached the source.
pub struct MemorySecretSource {
	/// `None` models a secret that exists without a string payload
	secrets: RwLock<HashMap<String, Option<String>>>,
	fetches: AtomicUsize,
}

impl MemorySecretSource {
	pub fn new() -> Self {
		Self {
			secrets: RwLock::new(HashMap::new()),
			fetches: AtomicUsize::new(0),
		}
	}

	/// Store or replace the payload for `name`
	pub fn insert(&self, name: impl Into<String>, payload: impl Into<String>) {
		self.secrets
			.write()
			.insert(name.into(), Some(payload.into()));
	}

	/// Store a secret that has no string payload
	pub fn insert_without_payload(&self, name: impl Into<String>) {
		self.secrets.write().insert(name.into(), None);
	}

	/// Number of fetches served so far, failed ones included
	pub fn fetch_count(&self) -> usize {
		self.fetches.load(Ordering::SeqCst)
	}
}

impl Default for MemorySecretSource {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl SecretSource for MemorySecretSource {
	async fn fetch_secret_string(&self, name: &str) -> SecretResult<Option<String>> {
		self.fetches.fetch_add(1, Ordering::SeqCst);
		self.secrets
			.read()
			.get(name)
			.cloned()
			.ok_or_else(|| SecretError::Fetch {
				name: name.to_string(),
				source: "secret not found".into(),
			})
	}

	fn name(&self) -> &str {
		"memory"
	}
}
