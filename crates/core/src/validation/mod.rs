//! Record validation.
//!
//! Schema checks per entity kind, header classification, and the lenient
//! list / phase parsers they share. Everything here is pure; callers keep
//! ownership of the records they pass in.

pub mod headers;
pub mod parsing;
pub mod schema;

pub use headers::classify_headers;
pub use parsing::{parse_comma_separated, parse_phases, PhaseList};
pub use schema::{validate, validate_entity_type};
