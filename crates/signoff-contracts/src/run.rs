//! Run-scoped entities.
//!
//! A `Run` is created once per subject and then mutated exclusively by the
//! state machine. It owns its `RunComponent`s, each of which owns its
//! `RunContributor`s.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    ids::{
        ApprovalId, ComponentId, ContributorId, PrincipalRef, RunComponentId, RunContributorId,
        RunId, StatementId, SubjectRef,
    },
    template::{Component, Contributor, ContributorMode, LevelMode},
};

/// The four independent disposition timestamps carried by runs, run
/// components and run contributors.
///
/// Not an enum: nothing at the data level prevents two of them being set at
/// once, and OR-mode component recomputation sets each one independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispositions {
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub canceled_at: Option<DateTime<Utc>>,
    pub rollback_at: Option<DateTime<Utc>>,
}

impl Dispositions {
    /// True when none of the four timestamps is set.
    pub fn is_pending(&self) -> bool {
        self.approved_at.is_none()
            && self.rejected_at.is_none()
            && self.canceled_at.is_none()
            && self.rollback_at.is_none()
    }

    /// True when an approval, rejection or cancellation is recorded.
    /// A rollback stamp alone does not close anything.
    pub fn is_closed(&self) -> bool {
        self.approved_at.is_some() || self.rejected_at.is_some() || self.canceled_at.is_some()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Display projection onto a single tag.
    ///
    /// Priority follows run outcome resolution: rejected, canceled,
    /// rolled back, approved.
    pub fn state(&self) -> Disposition {
        if self.rejected_at.is_some() {
            Disposition::Rejected
        } else if self.canceled_at.is_some() {
            Disposition::Canceled
        } else if self.rollback_at.is_some() {
            Disposition::RolledBack
        } else if self.approved_at.is_some() {
            Disposition::Approved
        } else {
            Disposition::Pending
        }
    }
}

/// Tagged view of `Dispositions` for API consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Disposition {
    Pending,
    Approved,
    Rejected,
    Canceled,
    RolledBack,
}

/// Lifecycle status of a Run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunStatus {
    #[default]
    Draft,
    Approved,
    Rejected,
    Rollback,
}

/// A live, per-subject instance of a selected Statement's steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub id: RunId,
    pub subject: SubjectRef,
    pub approval_id: ApprovalId,
    /// The branch selected at materialization. Never re-evaluated.
    pub statement_id: StatementId,
    /// Copied from the Approval when the run is created.
    pub level_mode: LevelMode,
    /// The currently active level.
    pub level: u32,
    pub status: RunStatus,
    pub dispositions: Dispositions,
    pub created_at: DateTime<Utc>,
}

impl Run {
    /// A fresh DRAFT run at level 0.
    pub fn draft(
        subject: SubjectRef,
        approval_id: ApprovalId,
        statement_id: StatementId,
        level_mode: LevelMode,
    ) -> Self {
        Self {
            id: RunId::new(),
            subject,
            approval_id,
            statement_id,
            level_mode,
            level: 0,
            status: RunStatus::Draft,
            dispositions: Dispositions::default(),
            created_at: Utc::now(),
        }
    }
}

/// A run-scoped copy of a Component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunComponent {
    pub id: RunComponentId,
    pub run_id: RunId,
    pub component_id: ComponentId,
    pub level: u32,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub mode: ContributorMode,
    pub dispositions: Dispositions,
}

impl RunComponent {
    /// Copy the immutable parts of `template` into a new record for `run_id`.
    pub fn from_template(run_id: RunId, template: &Component) -> Self {
        Self {
            id: RunComponentId::new(),
            run_id,
            component_id: template.id.clone(),
            level: template.level,
            name: template.name.clone(),
            description: template.description.clone(),
            color: template.color.clone(),
            mode: template.mode,
            dispositions: Dispositions::default(),
        }
    }
}

/// A run-scoped copy of a Contributor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunContributor {
    pub id: RunContributorId,
    pub run_component_id: RunComponentId,
    pub contributor_id: ContributorId,
    pub approvable: PrincipalRef,
    pub dispositions: Dispositions,
}

impl RunContributor {
    pub fn from_template(run_component_id: RunComponentId, template: &Contributor) -> Self {
        Self {
            id: RunContributorId::new(),
            run_component_id,
            contributor_id: template.id.clone(),
            approvable: template.approvable.clone(),
            dispositions: Dispositions::default(),
        }
    }
}

/// A read-only view of a Run with everything it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub run: Run,
    /// Ordered by level.
    pub components: Vec<ComponentSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentSnapshot {
    pub component: RunComponent,
    pub contributors: Vec<RunContributor>,
}

impl RunSnapshot {
    /// Every run contributor across all components.
    pub fn contributors(&self) -> impl Iterator<Item = &RunContributor> {
        self.components.iter().flat_map(|c| c.contributors.iter())
    }

    /// The components at `level`.
    pub fn at_level(&self, level: u32) -> impl Iterator<Item = &ComponentSnapshot> {
        self.components.iter().filter(move |c| c.component.level == level)
    }
}
