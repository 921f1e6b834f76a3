//! PostgreSQL repository implementations

mod profile;

pub use profile::PgProfileRepository;
