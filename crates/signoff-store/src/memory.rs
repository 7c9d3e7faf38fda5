//! In-memory implementation of `TemplateStore` and `RunStore`.
//!
//! `InMemoryStore` is the reference store. All records sit behind one
//! `Mutex`; the handle is a cheap `Clone` over an `Arc`, so the engine's
//! template and run seams can each hold a clone of the same store.
//!
//! Run creation is insert-if-absent under the state lock, which closes the
//! materialize race. Whole operations are serialized and made all-or-nothing
//! by wrapping them in `transaction`.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};

use signoff_contracts::{
    error::{SignoffError, SignoffResult},
    ids::{ApprovalId, GroupId, RunComponentId, RunId, StatementId, SubjectRef},
    run::{Run, RunComponent, RunContributor},
    template::{Approval, Component, Statement, Templates},
};
use signoff_core::traits::{RunStore, TemplateStore};

// ── Internal mutable state ────────────────────────────────────────────────────

/// Run-scoped records, kept in insertion order.
#[derive(Debug, Clone, Default)]
pub(crate) struct RunRecords {
    pub(crate) runs: Vec<Run>,
    pub(crate) components: Vec<RunComponent>,
    pub(crate) contributors: Vec<RunContributor>,
}

#[derive(Debug, Default)]
pub(crate) struct StoreState {
    pub(crate) templates: Templates,
    pub(crate) records: RunRecords,
}

// ── Public store ──────────────────────────────────────────────────────────────

/// A thread-safe in-memory store.
///
/// # Thread safety
///
/// Every trait method takes the state lock for the duration of one lookup
/// or write. `transaction` additionally holds a separate gate for the whole
/// closure, so two transactions never interleave. Transactions do not nest.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    pub(crate) state: Arc<Mutex<StoreState>>,
    gate: Arc<Mutex<()>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store seeded with `templates`.
    pub fn with_templates(templates: Templates) -> SignoffResult<Self> {
        let store = Self::new();
        store.seed(templates)?;
        Ok(store)
    }

    /// Replace all template entities. Existing runs are untouched: they only
    /// ever read their own run-scoped copies.
    pub fn seed(&self, templates: Templates) -> SignoffResult<()> {
        let mut state = self.lock()?;
        info!(
            flows = templates.flows.len(),
            approvals = templates.approvals.len(),
            statements = templates.statements.len(),
            "store seeded with templates"
        );
        state.templates = templates;
        Ok(())
    }

    /// Run `f` as one all-or-nothing unit.
    ///
    /// Callers are serialized on the transaction gate. If `f` returns `Err`,
    /// every run record is restored to its state before `f` ran and the error
    /// is returned unchanged.
    pub fn transaction<T>(&self, f: impl FnOnce(&Self) -> SignoffResult<T>) -> SignoffResult<T> {
        let _gate = self.gate.lock().map_err(|e| SignoffError::Store {
            reason: format!("transaction gate poisoned: {}", e),
        })?;

        let checkpoint = self.lock()?.records.clone();

        match f(self) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(error = %e, "transaction failed; restoring run records");
                self.lock()?.records = checkpoint;
                Err(e)
            }
        }
    }

    /// Number of runs materialized so far.
    pub fn run_count(&self) -> SignoffResult<usize> {
        Ok(self.lock()?.records.runs.len())
    }

    fn lock(&self) -> SignoffResult<MutexGuard<'_, StoreState>> {
        self.state.lock().map_err(|e| SignoffError::Store {
            reason: format!("store state lock poisoned: {}", e),
        })
    }
}

// ── TemplateStore impl ────────────────────────────────────────────────────────

impl TemplateStore for InMemoryStore {
    /// The first approval of the first flow (in seed order) binding
    /// `subject_type`.
    fn find_approval_for(&self, subject_type: &str) -> SignoffResult<Option<Approval>> {
        let state = self.lock()?;
        let templates = &state.templates;

        let approval = templates
            .flows
            .iter()
            .filter(|flow| flow.binds(subject_type))
            .find_map(|flow| templates.approvals.iter().find(|a| a.flow_id == flow.id))
            .cloned();

        debug!(
            subject_type,
            approval_id = ?approval.as_ref().map(|a| a.id.as_str()),
            "approval lookup"
        );
        Ok(approval)
    }

    fn list_statements(&self, approval_id: &ApprovalId) -> SignoffResult<Vec<Statement>> {
        let state = self.lock()?;
        Ok(state
            .templates
            .statements
            .iter()
            .filter(|s| &s.approval_id == approval_id)
            .cloned()
            .collect())
    }

    fn list_components(&self, statement_id: &StatementId) -> SignoffResult<Vec<Component>> {
        let state = self.lock()?;
        Ok(state
            .templates
            .components
            .iter()
            .filter(|c| &c.statement_id == statement_id)
            .cloned()
            .collect())
    }

    fn group_members(&self, group_id: &GroupId) -> SignoffResult<Vec<String>> {
        let state = self.lock()?;
        Ok(state
            .templates
            .groups
            .iter()
            .find(|g| &g.id == group_id)
            .map(|g| g.members.clone())
            .unwrap_or_default())
    }
}

// ── RunStore impl ─────────────────────────────────────────────────────────────

impl RunStore for InMemoryStore {
    fn find_run(&self, subject: &SubjectRef) -> SignoffResult<Option<Run>> {
        let state = self.lock()?;
        Ok(state.records.runs.iter().find(|r| &r.subject == subject).cloned())
    }

    fn create_run(&self, run: Run) -> SignoffResult<Run> {
        let mut state = self.lock()?;
        if let Some(existing) = state.records.runs.iter().find(|r| r.subject == run.subject) {
            debug!(run_id = %existing.id, subject = %run.subject, "run already exists; insert skipped");
            return Ok(existing.clone());
        }
        state.records.runs.push(run.clone());
        Ok(run)
    }

    fn save_run(&self, run: &Run) -> SignoffResult<()> {
        let mut state = self.lock()?;
        let slot = state
            .records
            .runs
            .iter_mut()
            .find(|r| r.id == run.id)
            .ok_or_else(|| SignoffError::store(format!("run '{}' does not exist", run.id)))?;
        *slot = run.clone();
        Ok(())
    }

    fn list_run_components(&self, run_id: &RunId) -> SignoffResult<Vec<RunComponent>> {
        let state = self.lock()?;
        Ok(state
            .records
            .components
            .iter()
            .filter(|c| &c.run_id == run_id)
            .cloned()
            .collect())
    }

    fn create_run_component(&self, component: RunComponent) -> SignoffResult<()> {
        self.lock()?.records.components.push(component);
        Ok(())
    }

    fn save_run_component(&self, component: &RunComponent) -> SignoffResult<()> {
        let mut state = self.lock()?;
        let slot = state
            .records
            .components
            .iter_mut()
            .find(|c| c.id == component.id)
            .ok_or_else(|| {
                SignoffError::store(format!("run component '{}' does not exist", component.id))
            })?;
        *slot = component.clone();
        Ok(())
    }

    fn list_run_contributors(
        &self,
        run_component_id: &RunComponentId,
    ) -> SignoffResult<Vec<RunContributor>> {
        let state = self.lock()?;
        Ok(state
            .records
            .contributors
            .iter()
            .filter(|c| &c.run_component_id == run_component_id)
            .cloned()
            .collect())
    }

    fn create_run_contributor(&self, contributor: RunContributor) -> SignoffResult<()> {
        self.lock()?.records.contributors.push(contributor);
        Ok(())
    }

    fn save_run_contributor(&self, contributor: &RunContributor) -> SignoffResult<()> {
        self.save_run_contributors(std::slice::from_ref(contributor))
    }

    /// Writes every row under a single lock acquisition.
    fn save_run_contributors(&self, contributors: &[RunContributor]) -> SignoffResult<()> {
        let mut state = self.lock()?;
        for contributor in contributors {
            let slot = state
                .records
                .contributors
                .iter_mut()
                .find(|c| c.id == contributor.id)
                .ok_or_else(|| {
                    SignoffError::store(format!("run contributor '{}' does not exist", contributor.id))
                })?;
            *slot = contributor.clone();
        }
        Ok(())
    }
}
