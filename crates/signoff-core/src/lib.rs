//! # signoff-core
//!
//! Run materialization and the approval state machine.
//!
//! This crate provides:
//! - The trait seams (`TemplateStore`, `RunStore`, `StatementSelector`,
//!   `ApproverMatcher`, `SubjectRecord`, `Requestable`)
//! - The `ApprovalEngine` that materializes runs and drives them through
//!   `submit` / `reject` / `rollback` to a terminal outcome
//!
//! ## Usage
//!
//! ```rust,ignore
//! use signoff_core::{ApprovalEngine, JsonSubject};
//!
//! let engine = ApprovalEngine::new(templates, runs, selector, config);
//! let run = engine.submit(&purchase_order, "u1")?;
//! ```

pub mod engine;
pub mod machine;
pub mod subject;
pub mod traits;

pub use engine::ApprovalEngine;
pub use machine::Progress;
pub use subject::JsonSubject;

// ── Tests ─────────────────────────────────────────────────────────────────────
