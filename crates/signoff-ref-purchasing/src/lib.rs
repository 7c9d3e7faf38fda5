//! # signoff-ref-purchasing
//!
//! Purchasing reference runtime for the signoff approval engine.
//!
//! Demonstrates the engine on purchase orders and travel requests using mock
//! data and the catalog in `catalogs/purchasing.toml`:
//!
//! 1. **Single level**: one AND step waits for both approvers; one OR step
//!    completes on the first.
//! 2. **Multi level**: a sequential run advances level by level, with a
//!    finance group acting as one approver.
//! 3. **Rejection**: one rejection terminates the whole run and cancels
//!    every open step.
//! 4. **Rollback**: a reviewer sends the run back to level 0.
//! 5. **Branch selection**: statement conditions route each order, and
//!    excluded subject types are refused.
//!
//! All data is hardcoded and fictional.

pub mod mock_data;
pub mod runtime;
pub mod scenarios;

pub use runtime::Runtime;
