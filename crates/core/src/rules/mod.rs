//! Conditional rules over records.
//!
//! Provides the rule document types, a pure-logic condition evaluator and
//! action executor, and the engine planner that turns a record snapshot
//! into bulk operations, all without database dependencies.

pub mod action;
pub mod condition;
pub mod engine;
pub mod export;
pub mod model;

pub use engine::{plan_kind, BulkOperation, BulkWriteResult, KindPlan};
pub use model::{Action, Condition, Operator, Rule, RuleScope};
