//! Vestry DB - Profile storage
//!
//! Repository abstraction over the `users` profile store, with a
//! PostgreSQL implementation and an in-memory one for tests and local runs.
//!
//! # Example
//!
//! ```rust,ignore
//! use vestry_db::{create_pool, PgProfileRepository, ProfileRepository};
//!
//! let pool = create_pool("postgres://localhost/vestry").await?;
//! let profiles = PgProfileRepository::new(pool);
//!
//! let profile = profiles.find_by_uid(&uid).await?;
//! ```

pub mod error;
pub mod memory;
pub mod models;
pub mod pg;
pub mod pool;
pub mod repo;

pub use error::{DbError, DbResult};
pub use memory::MemoryProfileRepository;
pub use models::ProfileRow;
pub use pg::PgProfileRepository;
pub use pool::{create_pool, DbPool};
pub use repo::*;
