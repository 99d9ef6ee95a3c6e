//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod record_repo;
pub mod rule_repo;

pub use record_repo::RecordRepo;
pub use rule_repo::RuleRepo;
