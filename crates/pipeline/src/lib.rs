//! Rule application orchestration.
//!
//! Reads a kind's snapshot through a [`RecordStore`], hands it to the pure
//! planner in `datarules_core::rules::engine`, and submits the resulting
//! batch as one bulk write.

pub mod error;
pub mod memory;
pub mod runner;
pub mod store;

pub use error::{PipelineError, StoreError};
pub use memory::MemoryStore;
pub use runner::{ApplySummary, KindReport, RuleRunner};
pub use store::{PgRecordStore, RecordStore};
