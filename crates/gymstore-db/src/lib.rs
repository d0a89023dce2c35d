//! # gymstore database
//!
//! Turns the deployment environment into a live, validated PostgreSQL pool.
//!
//! ## Open sequence
//!
//! 1. Classify `APP_ENV` into `local`, `staging` or `prod`
//! 2. Build the DSN: from `POSTGRES_*` variables locally, otherwise from a
//!    credential bundle resolved (and cached) through a
//!    [`SecretProvider`](gymstore_conf::settings::secrets::SecretProvider)
//! 3. Open the pool with the configured limits and probe it, retrying with
//!    exponential backoff
//!
//! The whole sequence is bounded by `DB_CONNECT_TIMEOUT`.
//!
//! ## Example
//!
//! ```no_run
//! # async fn example() -> gymstore_db::DbResult<()> {
//! let db = gymstore_db::open().await?;
//! db.health_check().await?;
//!
//! let row: (i32,) = sqlx::query_as("SELECT 1").fetch_one(&*db).await.unwrap();
//! assert_eq!(row.0, 1);
//!
//! db.close().await;
//! # Ok(())
//! # }
//! ```

pub mod dsn;
pub mod errors;
pub mod manager;
pub mod pool;

pub use dsn::{ResolvedDsn, mask_dsn_password};
pub use errors::{DbError, DbResult};
#[cfg(feature = "aws-secrets")]
pub use manager::open;
pub use manager::{ConnectionManager, Database, HEALTH_CHECK_TIMEOUT, open_with_provider};
pub use pool::{PoolConfig, RetryPolicy};
