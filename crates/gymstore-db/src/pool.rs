//! Connection pooling
//!
//! Pool limits, the retrying connector and the seam between them and the
//! driver.

pub mod config;
pub mod connector;
pub mod retry;

pub use config::PoolConfig;
pub use connector::{ConnectionOpener, PostgresOpener, Probe};
pub use retry::{RetryPolicy, RetryState, open_with_retry};
