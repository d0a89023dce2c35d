//! Retrying connector
//!
//! Opening a handle is modeled as a small state machine:
//!
//! ```text
//! Attempting(n) ──ok──► Succeeded
//!      │
//!     err ──► n + 1 < max ──► Backoff(n, base * 2^n) ──sleep──► Attempting(n + 1)
//!      │
//!      └────► otherwise ──► Exhausted
//! ```
//!
//! Transitions are pure; only [`open_with_retry`] sleeps, on the tokio clock.

use super::connector::{ConnectionOpener, Probe};
use crate::dsn::ResolvedDsn;
use crate::errors::{DbError, DbResult};
use std::time::Duration;

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Attempt budget and backoff for opening a handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
	max_attempts: u32,
	base_delay: Duration,
}

impl Default for RetryPolicy {
	fn default() -> Self {
		Self {
			max_attempts: DEFAULT_MAX_ATTEMPTS,
			base_delay: DEFAULT_BASE_DELAY,
		}
	}
}

impl RetryPolicy {
	/// Create a policy; at least one attempt is always made
	pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
		Self {
			max_attempts: max_attempts.max(1),
			base_delay,
		}
	}

	pub fn max_attempts(&self) -> u32 {
		self.max_attempts
	}

	/// Delay after the failed zero-based `attempt`: `base * 2^attempt`
	///
	/// # Examples
	///
	/// ```
	/// use gymstore_db::pool::RetryPolicy;
	/// use std::time::Duration;
	///
	/// let policy = RetryPolicy::default();
	/// assert_eq!(policy.backoff(0), Duration::from_secs(1));
	/// assert_eq!(policy.backoff(1), Duration::from_secs(2));
	/// ```
	pub fn backoff(&self, attempt: u32) -> Duration {
		let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
		self.base_delay.saturating_mul(factor)
	}
}

/// Position in the open sequence; attempts are zero-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
	Attempting { attempt: u32 },
	Backoff { attempt: u32, delay: Duration },
	Succeeded { attempts: u32 },
	Exhausted { attempts: u32 },
}

impl RetryState {
	pub fn start() -> Self {
		Self::Attempting { attempt: 0 }
	}

	pub fn on_success(self) -> Self {
		match self {
			Self::Attempting { attempt } => Self::Succeeded {
				attempts: attempt + 1,
			},
			other => other,
		}
	}

	pub fn on_failure(self, policy: &RetryPolicy) -> Self {
		match self {
			Self::Attempting { attempt } if attempt + 1 < policy.max_attempts => Self::Backoff {
				attempt,
				delay: policy.backoff(attempt),
			},
			Self::Attempting { attempt } => Self::Exhausted {
				attempts: attempt + 1,
			},
			other => other,
		}
	}

	pub fn after_backoff(self) -> Self {
		match self {
			Self::Backoff { attempt, .. } => Self::Attempting {
				attempt: attempt + 1,
			},
			other => other,
		}
	}

	pub fn is_terminal(&self) -> bool {
		matches!(self, Self::Succeeded { .. } | Self::Exhausted { .. })
	}
}

/// Open a handle and validate it, retrying with exponential backoff
///
/// A handle whose probe fails is closed before the next attempt. After the
/// last attempt fails, the error wraps that attempt's cause. There is no
/// sleep after the last attempt.
pub async fn open_with_retry<O>(
	opener: &O,
	dsn: &ResolvedDsn,
	policy: &RetryPolicy,
) -> DbResult<O::Handle>
where
	O: ConnectionOpener + ?Sized,
{
	let mut state = RetryState::start();
	let mut last_error = None;

	loop {
		state = match state {
			RetryState::Attempting { attempt } => match open_and_probe(opener, dsn.as_str()).await {
				Ok(handle) => {
					tracing::debug!(
						attempts = attempt + 1,
						source = dsn.source(),
						"database handle validated"
					);
					return Ok(handle);
				}
				Err(err) => {
					tracing::warn!(
						attempt = attempt + 1,
						max_attempts = policy.max_attempts,
						source = dsn.source(),
						error = %err,
						"database open attempt failed"
					);
					last_error = Some(err);
					state.on_failure(policy)
				}
			},
			RetryState::Backoff { delay, .. } => {
				tokio::time::sleep(delay).await;
				state.after_backoff()
			}
			RetryState::Succeeded { .. } | RetryState::Exhausted { .. } => break,
		};
	}

	Err(DbError::Connect(last_error.unwrap_or(sqlx::Error::PoolClosed)))
}

async fn open_and_probe<O>(opener: &O, dsn: &str) -> Result<O::Handle, sqlx::Error>
where
	O: ConnectionOpener + ?Sized,
{
	let handle = opener.open(dsn).await?;
	if let Err(err) = handle.verify().await {
		handle.close().await;
		return Err(err);
	}
	Ok(handle)
}
