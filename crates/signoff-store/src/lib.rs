//! # signoff-store
//!
//! Reference persistence for the signoff approval engine.
//!
//! ## Overview
//!
//! [`InMemoryStore`] implements both
//! [`TemplateStore`](signoff_core::traits::TemplateStore) and
//! [`RunStore`](signoff_core::traits::RunStore). Clones share state, so one
//! store can back both seams of an engine. [`GroupMatcher`] lets group
//! approvables stand in for their members.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use signoff_store::{GroupMatcher, InMemoryStore};
//!
//! let store = InMemoryStore::with_templates(templates)?;
//! let engine = ApprovalEngine::new(
//!     Box::new(store.clone()),
//!     Box::new(store.clone()),
//!     Box::new(ConditionalSelector),
//!     EngineConfig::default(),
//! )
//! .with_matcher(Box::new(GroupMatcher::new(store.clone(), "user")));
//!
//! let run = store.transaction(|_| engine.submit(&order, "u-manager"))?;
//! ```

pub mod matcher;
pub mod memory;

pub use matcher::GroupMatcher;
pub use memory::InMemoryStore;

// ── Tests ─────────────────────────────────────────────────────────────────────
