//! Template entities edited by administrators.
//!
//! Templates are shared across runs and are never mutated by the engine.
//! Materialization copies what a run needs into run-scoped records, so later
//! template edits do not reach existing runs.

use serde::{Deserialize, Serialize};

use crate::ids::{
    ApprovalId, ComponentId, ContributorId, FlowId, GroupId, PrincipalRef, StatementId,
};

/// How the levels of a run become actionable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelMode {
    /// Every level is actionable at once.
    #[default]
    Parallel,
    /// Only the run's current level is actionable.
    Sequential,
}

/// How a step aggregates its contributors' actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContributorMode {
    /// Every contributor must approve.
    #[default]
    And,
    /// Any one contributor suffices.
    Or,
}

/// A binding that makes a subject type subject to a Flow's approvals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowBinding {
    pub name: String,
    pub subject_type: String,
}

/// A named grouping of subject-type bindings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flow {
    pub id: FlowId,
    pub name: String,
    pub bindings: Vec<FlowBinding>,
}

impl Flow {
    /// Return true if this flow governs `subject_type`.
    pub fn binds(&self, subject_type: &str) -> bool {
        self.bindings.iter().any(|b| b.subject_type == subject_type)
    }
}

/// One approval ruleset bound to a Flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    pub id: ApprovalId,
    pub name: String,
    pub flow_id: FlowId,
    pub level_mode: LevelMode,
}

/// A single field/operator/literal predicate.
///
/// `value` is kept as the raw literal string; for `in` / `not in` it holds a
/// JSON-encoded array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: String,
    pub value: String,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }
}

/// A named branch of an Approval.
///
/// Statements of one Approval are ordered by creation sequence; selection
/// depends on that order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub id: StatementId,
    pub approval_id: ApprovalId,
    pub name: String,
    pub is_default: bool,
    pub conditions: Vec<Condition>,
}

/// A template reference to a principal allowed to act at a Component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    pub id: ContributorId,
    pub approvable: PrincipalRef,
    /// Auxiliary condition payload. Stored and carried, never evaluated.
    pub conditions: Option<serde_json::Value>,
}

/// An ordered step within a Statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub id: ComponentId,
    pub statement_id: StatementId,
    pub level: u32,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub mode: ContributorMode,
    pub contributors: Vec<Contributor>,
}

/// A named set of principal ids that a group approvable stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub members: Vec<String>,
}

/// All template entities of one catalog, ready to be installed in a store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Templates {
    pub flows: Vec<Flow>,
    pub approvals: Vec<Approval>,
    /// In creation order; the order is the statement selection contract.
    pub statements: Vec<Statement>,
    pub components: Vec<Component>,
    pub groups: Vec<Group>,
}
