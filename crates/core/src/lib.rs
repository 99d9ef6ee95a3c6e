//! Pure domain logic for the datarules service.
//!
//! Record and rule types, nested-path access, per-kind validation, and the
//! rule engine planner. Nothing in this crate touches the database or does
//! any I/O; persistence and orchestration live in `datarules-db` and
//! `datarules-pipeline`.

pub mod entity;
pub mod error;
pub mod path;
pub mod record;
pub mod rules;
pub mod types;
pub mod validation;
