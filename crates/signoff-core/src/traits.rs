//! Trait seams of the approval engine.
//!
//! - `SubjectRecord` / `Requestable`: the entity that needs sign-off
//! - `TemplateStore`: read-only access to administrator templates
//! - `RunStore`: the run-scoped records the state machine mutates
//! - `StatementSelector`: picks the branch that governs a new run
//! - `ApproverMatcher`: decides whether a principal stands behind an approvable
//!
//! The engine never embeds storage concerns in its decision logic; it only
//! reaches the store through these contracts.

use serde_json::Value;

use signoff_contracts::{
    error::SignoffResult,
    ids::{
        ApprovalId, GroupId, PrincipalRef, RunComponentId, RunId, StatementId, SubjectRef,
    },
    run::{Run, RunComponent, RunContributor},
    template::{Approval, Component, Statement},
};

/// Read access to a subject's fields for condition evaluation.
///
/// Lookups mirror an ORM record: a plain attribute, then a loaded relation,
/// then a computed accessor. Anything none of them know about is unknown,
/// and unknown fields never match.
pub trait SubjectRecord {
    /// A stored attribute, looked up by its exact name.
    fn attribute(&self, field: &str) -> Option<Value>;

    /// A loaded relation, looked up by its camelCase name.
    fn relation(&self, _name: &str) -> Option<Value> {
        None
    }

    /// A computed accessor, looked up by its camelCase name.
    fn accessor(&self, _name: &str) -> Option<Value> {
        None
    }
}

/// A subject that can be put through approval.
pub trait Requestable: SubjectRecord {
    fn subject_ref(&self) -> SubjectRef;
}

/// Template lookups. Implementations must return statements in creation
/// order: statement selection is order-dependent.
pub trait TemplateStore: Send + Sync {
    /// The Approval whose Flow binds `subject_type`, if any.
    fn find_approval_for(&self, subject_type: &str) -> SignoffResult<Option<Approval>>;

    /// Statements of `approval_id` in creation order, with their conditions.
    fn list_statements(&self, approval_id: &ApprovalId) -> SignoffResult<Vec<Statement>>;

    /// Components of `statement_id`, each with its contributors.
    fn list_components(&self, statement_id: &StatementId) -> SignoffResult<Vec<Component>>;

    /// Member principal ids of a group approvable. Unknown groups have no members.
    fn group_members(&self, _group_id: &GroupId) -> SignoffResult<Vec<String>> {
        Ok(Vec::new())
    }
}

/// Run-scoped persistence.
///
/// The caller wraps each engine operation in a transaction boundary the
/// store provides; the engine itself performs no locking.
pub trait RunStore: Send + Sync {
    fn find_run(&self, subject: &SubjectRef) -> SignoffResult<Option<Run>>;

    /// Insert `run` unless a run for the same subject already exists.
    ///
    /// Returns the stored run: `run` itself when inserted, otherwise the
    /// existing one. Implementations must make this atomic.
    fn create_run(&self, run: Run) -> SignoffResult<Run>;

    fn save_run(&self, run: &Run) -> SignoffResult<()>;

    fn list_run_components(&self, run_id: &RunId) -> SignoffResult<Vec<RunComponent>>;

    fn create_run_component(&self, component: RunComponent) -> SignoffResult<()>;

    fn save_run_component(&self, component: &RunComponent) -> SignoffResult<()>;

    fn list_run_contributors(
        &self,
        run_component_id: &RunComponentId,
    ) -> SignoffResult<Vec<RunContributor>>;

    fn create_run_contributor(&self, contributor: RunContributor) -> SignoffResult<()>;

    fn save_run_contributor(&self, contributor: &RunContributor) -> SignoffResult<()>;

    /// Bulk update. The default writes rows one at a time.
    fn save_run_contributors(&self, contributors: &[RunContributor]) -> SignoffResult<()> {
        for contributor in contributors {
            self.save_run_contributor(contributor)?;
        }
        Ok(())
    }
}

/// Chooses the Statement that governs a new run.
pub trait StatementSelector: Send + Sync {
    /// Pick one statement from `statements` (in creation order) for `record`.
    ///
    /// Returns `SignoffError::Configuration` when nothing applies and no
    /// default is configured.
    fn select<'a>(
        &self,
        statements: &'a [Statement],
        record: &dyn SubjectRecord,
    ) -> SignoffResult<&'a Statement>;
}

/// Decides whether an acting principal is represented by an approvable.
///
/// A lookup failure is an error, not a non-match.
pub trait ApproverMatcher: Send + Sync {
    fn matches(&self, principal: &PrincipalRef, approvable: &PrincipalRef) -> SignoffResult<bool>;
}

/// Matches on exact (kind, id) equality.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectMatcher;

impl ApproverMatcher for DirectMatcher {
    fn matches(&self, principal: &PrincipalRef, approvable: &PrincipalRef) -> SignoffResult<bool> {
        Ok(principal == approvable)
    }
}
