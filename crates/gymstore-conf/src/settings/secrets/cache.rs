//! Time-bounded credential cache

use super::DatabaseCredentials;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Cached secret entry with expiration
#[derive(Debug, Clone)]
struct CachedSecret {
	credentials: DatabaseCredentials,
	expires_at: Instant,
}

impl CachedSecret {
	fn is_valid(&self, now: Instant) -> bool {
		now < self.expires_at
	}
}

/// Credential cache keyed by secret name
///
/// An entry stored at `T` is served for any lookup in `[T, T + ttl)`. The
/// first lookup at or after `T + ttl` evicts it; nothing sweeps expired
/// entries in the background.
///
/// Lookups share a read lock. Inserts and evictions take the write lock.
/// Locks are never held across an await point.
#[derive(Debug)]
pub struct SecretCache {
	entries: RwLock<HashMap<String, CachedSecret>>,
	ttl: Duration,
}

impl SecretCache {
	pub fn new(ttl: Duration) -> Self {
		Self {
			entries: RwLock::new(HashMap::new()),
			ttl,
		}
	}

	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	/// Return the cached credentials for `name` if they have not expired
	pub fn get(&self, name: &str) -> Option<DatabaseCredentials> {
		let now = Instant::now();
		{
			let entries = self.entries.read();
			match entries.get(name) {
				None => return None,
				Some(entry) if entry.is_valid(now) => return Some(entry.credentials.clone()),
				Some(_) => {}
			}
		}

		// Expired; re-check under the write lock since a concurrent insert
		// may have replaced the entry in between
		let mut entries = self.entries.write();
		if entries.get(name).is_some_and(|entry| !entry.is_valid(now)) {
			entries.remove(name);
			tracing::debug!(secret = name, "evicted expired secret cache entry");
		}
		None
	}

	/// Store credentials, replacing any previous entry for `name`
	pub fn insert(&self, name: &str, credentials: DatabaseCredentials) {
		let entry = CachedSecret {
			credentials,
			expires_at: Instant::now() + self.ttl,
		};
		self.entries.write().insert(name.to_string(), entry);
	}

	/// Drop the entry for `name` so the next lookup goes to the source
	///
	/// Returns whether an entry was present.
	pub fn invalidate(&self, name: &str) -> bool {
		self.entries.write().remove(name).is_some()
	}

	/// Number of stored entries, expired ones included
	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}
}
