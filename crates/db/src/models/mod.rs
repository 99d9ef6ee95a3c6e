//! Row structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - Conversions into the `datarules-core` domain types
//! - `Deserialize` DTOs for partial updates where the API needs them

pub mod record;
pub mod rule;
