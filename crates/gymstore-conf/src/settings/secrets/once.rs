//! Run-once initialization gate for remote clients

use super::{BoxError, SecretError, SecretResult};
use std::error::Error;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Lazily initialized value whose initialization outcome is remembered
///
/// The first caller runs the initializer; concurrent callers wait for it and
/// then observe the same outcome. A failed initialization is cached as well:
/// every later call returns [`SecretError::Init`] with the original cause
/// and the initializer never runs again.
///
/// # Examples
///
/// ```
/// use gymstore_conf::settings::secrets::InitOnce;
///
/// # async fn example() {
/// let gate: InitOnce<u32> = InitOnce::new();
///
/// assert_eq!(*gate.get_or_init(|| async { Ok(7) }).await.unwrap(), 7);
/// // Later initializers are ignored
/// assert_eq!(*gate.get_or_init(|| async { Ok(8) }).await.unwrap(), 7);
/// # }
/// # tokio::runtime::Runtime::new().unwrap().block_on(example());
/// ```
#[derive(Debug)]
pub struct InitOnce<T> {
	cell: OnceCell<Result<T, Arc<dyn Error + Send + Sync>>>,
}

impl<T> InitOnce<T> {
	pub const fn new() -> Self {
		Self {
			cell: OnceCell::const_new(),
		}
	}

	/// Return the value, running `init` if no caller has completed it yet
	pub async fn get_or_init<F, Fut>(&self, init: F) -> SecretResult<&T>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<T, BoxError>>,
	{
		let outcome = self
			.cell
			.get_or_init(|| async move { init().await.map_err(Arc::from) })
			.await;
		match outcome {
			Ok(value) => Ok(value),
			Err(cause) => Err(SecretError::Init(Arc::clone(cause))),
		}
	}

	/// Whether an initialization outcome has been recorded
	pub fn is_initialized(&self) -> bool {
		self.cell.initialized()
	}
}

impl<T> Default for InitOnce<T> {
	fn default() -> Self {
		Self::new()
	}
}
