//! Identity Manager Storage
//!
//! `SQLite` persistence for users, groups and their memberships.
//!
//! # Architecture
//!
//! - **Executor**: renders core predicates into bound SQL statements
//! - **Vertical Slicing**: groups, users, bindings and passwords each own
//!   their queries and integrity checks
//! - **Soft Deletes**: users and groups flip to `deleted`, bindings are removed
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use im_core::{IdentityManager, PasswordHasher};
//! use im_core::types::CreateGroupRequest;
//! use im_storage::{create_pool, run_migrations, SqliteIdentityStore};
//!
//! # async fn example(hasher: Arc<dyn PasswordHasher>) -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://im.db", 5).await?;
//! run_migrations(&pool).await?;
//!
//! let store = SqliteIdentityStore::new(pool, hasher);
//! let created = store
//!     .create_group(CreateGroupRequest {
//!         group_name: "engineering".into(),
//!         ..Default::default()
//!     })
//!     .await?;
//! println!("created {}", created.group_id);
//! # Ok(())
//! # }
//! ```

mod context;
mod error;
pub mod executor;

// Vertical slices
pub mod bindings;
pub mod groups;
pub mod passwords;
pub mod users;

pub use context::SqliteIdentityStore;
pub use error::StorageError;

use std::str::FromStr;
use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// Call once at startup before serving requests.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), StorageError> {
    MIGRATOR.run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}

/// Create a new `SQLite` pool
///
/// The database file is created if missing and opened in WAL mode with a
/// 30 second busy timeout.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool, StorageError> {
    debug!(database_url, max_connections, "Creating SQLite pool");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    info!(database_url, "SQLite pool ready");
    Ok(pool)
}
