//! The approval state machine: `can_act`, `submit`, `reject`, `rollback`.
//!
//! Every transition operates on the run snapshot (run, run components, run
//! contributors) and never touches templates.
//!
//! Submit pipeline:
//!
//!   Record action → Recompute component → Derive run progress
//!
//! Reject and rollback are kill-switches that bypass aggregation entirely:
//! one contributor's rejection ends the whole run, one contributor's rollback
//! restarts it from level 0.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use signoff_contracts::{
    error::{SignoffError, SignoffResult},
    ids::{PrincipalRef, RunContributorId, SubjectRef},
    run::{Dispositions, Run, RunComponent, RunContributor, RunStatus},
    template::{ContributorMode, LevelMode},
};

use crate::{engine::ApprovalEngine, traits::Requestable};

/// What `submit` did to the run after recomputing the active component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// A component at or below the current level is still undisposed.
    Incomplete,
    /// Every component up to the current level is disposed, but not all
    /// components of the current level approved.
    Stalled,
    /// The run moved on to the next level.
    Advanced { from: u32, to: u32 },
    /// The run reached a terminal outcome at its highest level.
    Concluded(RunStatus),
}

impl ApprovalEngine {
    /// May `principal` act on the run of `subject` right now?
    ///
    /// Never raises: an absent principal, a missing run, an excluded subject
    /// type or a store failure (including a failed group lookup) all answer
    /// `false`. Every other operation surfaces those errors.
    pub fn can_act(&self, subject: &SubjectRef, principal: Option<&str>) -> bool {
        let Some(principal) = principal else {
            return false;
        };
        let principal = self.config.principal(principal);

        match self.check_can_act(subject, &principal) {
            Ok(answer) => answer,
            Err(e) => {
                debug!(subject = %subject, principal = %principal, error = %e, "can_act resolved to false");
                false
            }
        }
    }

    fn check_can_act(&self, subject: &SubjectRef, principal: &PrincipalRef) -> SignoffResult<bool> {
        let run = self.existing_run(subject)?;

        // A rollback stamp alone leaves the run actionable.
        if run.dispositions.is_closed() {
            return Ok(false);
        }

        let candidates: Vec<RunComponent> = self
            .runs
            .list_run_components(&run.id)?
            .into_iter()
            .filter(|c| run.level_mode == LevelMode::Parallel || c.level == run.level)
            .collect();

        if candidates.is_empty() {
            return Ok(false);
        }

        for component in &candidates {
            if !component.dispositions.is_pending() {
                continue;
            }
            if !level_gate(run.level_mode, component.level, run.level) {
                continue;
            }

            let contributors = self.runs.list_run_contributors(&component.id)?;
            if contributors.is_empty() {
                // A step with no contributors is open to anyone.
                return Ok(true);
            }

            // One undisposed slot is enough in both modes.
            let mut actionable = false;
            for rc in contributors.iter().filter(|rc| rc.dispositions.is_pending()) {
                if self.matcher.matches(principal, &rc.approvable)? {
                    actionable = true;
                    break;
                }
            }
            if actionable {
                debug!(
                    run_id = %run.id,
                    component = %component.name,
                    level = component.level,
                    principal = %principal,
                    "principal may act"
                );
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Record `principal`'s approval on the active step and advance the run.
    ///
    /// Materializes the run if needed. The active step is always the first
    /// component at `run.level`, whatever the level mode: a parallel run only
    /// ever takes submissions on its current level. A run without a component
    /// at its current level is approved outright.
    pub fn submit<S: Requestable>(&self, subject: &S, principal: &str) -> SignoffResult<Run> {
        let mut run = self.materialize(subject)?;
        let principal = self.config.principal(principal);
        let now = Utc::now();

        let mut components = self.runs.list_run_components(&run.id)?;
        let Some(active_idx) = components.iter().position(|c| c.level == run.level) else {
            run.status = RunStatus::Approved;
            run.dispositions.approved_at = Some(now);
            self.runs.save_run(&run)?;
            info!(run_id = %run.id, level = run.level, "no component at current level; run approved");
            return Ok(run);
        };

        let mut contributors = self.runs.list_run_contributors(&components[active_idx].id)?;
        let held = self.held_slots(&principal, &contributors)?;
        let active = &mut components[active_idx];

        // ── Step 1: record the principal's action ────────────────────────────
        let stamped = record_approval(active.mode, &mut contributors, now, |rc| held.contains(&rc.id));
        if stamped.is_empty() {
            debug!(
                run_id = %run.id,
                component = %active.name,
                principal = %principal,
                "principal holds no slot on the active component"
            );
        }

        // ── Step 2: recompute the component from all its contributors ────────
        let canceled = recompute_component(active, &mut contributors, now);

        let touched: Vec<RunContributor> = stamped
            .iter()
            .chain(canceled.iter())
            .map(|&i| contributors[i].clone())
            .collect();
        self.runs.save_run_contributors(&touched)?;
        self.runs.save_run_component(active)?;

        debug!(
            run_id = %run.id,
            component = %active.name,
            level = active.level,
            approved = active.dispositions.approved_at.is_some(),
            rejected = active.dispositions.rejected_at.is_some(),
            "component recomputed"
        );

        // ── Step 3: derive run progress ──────────────────────────────────────
        match derive_progress(&mut run, &components, now) {
            Progress::Incomplete | Progress::Stalled => {}
            Progress::Advanced { from, to } => {
                self.runs.save_run(&run)?;
                info!(run_id = %run.id, from, to, "run advanced to next level");
            }
            Progress::Concluded(status) => {
                self.runs.save_run(&run)?;
                info!(run_id = %run.id, status = ?status, "run concluded");
            }
        }

        Ok(run)
    }

    /// Reject the run on behalf of `principal`.
    ///
    /// Bypasses aggregation: a single rejection terminates the whole run in
    /// either contributor mode. Every undisposed contributor and component of
    /// the run is force-canceled.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the subject has no run
    /// - `Precondition` if the run is already approved, rejected or canceled,
    ///   has no component at its current level, or `principal` is not a
    ///   contributor of that component
    pub fn reject(&self, subject: &SubjectRef, principal: &str) -> SignoffResult<Run> {
        let mut run = self.existing_run(subject)?;
        let principal = self.config.principal(principal);

        if run.dispositions.is_closed() {
            warn!(run_id = %run.id, status = ?run.status, "reject on a closed run");
            return Err(SignoffError::precondition(format!(
                "approval run for '{}' cannot be rejected because it is already processed",
                subject
            )));
        }

        let (mut components, active_idx) = self.active_component(&run)?;
        let mut contributors = self.runs.list_run_contributors(&components[active_idx].id)?;
        let slot = self.contributor_slot(&run, &principal, &contributors)?;

        let now = Utc::now();

        contributors[slot].dispositions.rejected_at = Some(now);
        components[active_idx].dispositions.rejected_at = Some(now);
        run.status = RunStatus::Rejected;
        run.dispositions.rejected_at = Some(now);

        self.runs.save_run_contributor(&contributors[slot])?;
        self.runs.save_run_component(&components[active_idx])?;
        self.runs.save_run(&run)?;

        // Cascade: nothing left pending anywhere in the run.
        let mut canceled_components = 0usize;
        let mut canceled_contributors = 0usize;
        for (idx, component) in components.iter_mut().enumerate() {
            let mut rows = if idx == active_idx {
                std::mem::take(&mut contributors)
            } else {
                self.runs.list_run_contributors(&component.id)?
            };
            let pending: Vec<RunContributor> = rows
                .iter_mut()
                .filter(|rc| rc.dispositions.is_pending())
                .map(|rc| {
                    rc.dispositions.canceled_at = Some(now);
                    rc.clone()
                })
                .collect();
            canceled_contributors += pending.len();
            self.runs.save_run_contributors(&pending)?;

            if component.dispositions.is_pending() {
                component.dispositions.canceled_at = Some(now);
                self.runs.save_run_component(component)?;
                canceled_components += 1;
            }
        }

        info!(
            run_id = %run.id,
            principal = %principal,
            level = run.level,
            canceled_components,
            canceled_contributors,
            "run rejected"
        );

        Ok(run)
    }

    /// Restart the run from level 0 on behalf of `principal`.
    ///
    /// Clears every disposition on the run, its components and contributors,
    /// then stamps `rollback_at` on the run and on the initiating contributor's
    /// own row. Rejected and canceled runs can be rolled back; approved runs
    /// cannot.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the subject has no run
    /// - `Precondition` if the run is approved, has no component at its
    ///   current level, or `principal` is not a contributor of that component
    pub fn rollback(&self, subject: &SubjectRef, principal: &str) -> SignoffResult<Run> {
        let mut run = self.existing_run(subject)?;
        let principal = self.config.principal(principal);

        if run.dispositions.approved_at.is_some() {
            warn!(run_id = %run.id, "rollback on an approved run");
            return Err(SignoffError::precondition(format!(
                "approval run for '{}' cannot be rolled back because it is already approved",
                subject
            )));
        }

        let (mut components, active_idx) = self.active_component(&run)?;
        let active_contributors = self.runs.list_run_contributors(&components[active_idx].id)?;
        let slot = self.contributor_slot(&run, &principal, &active_contributors)?;
        let initiator = active_contributors[slot].id;

        let now = Utc::now();
        let from_level = run.level;

        run.status = RunStatus::Draft;
        run.level = 0;
        run.dispositions.clear();
        run.dispositions.rollback_at = Some(now);
        self.runs.save_run(&run)?;

        for component in components.iter_mut() {
            component.dispositions.clear();
            self.runs.save_run_component(component)?;

            let mut rows = self.runs.list_run_contributors(&component.id)?;
            for rc in rows.iter_mut() {
                rc.dispositions.clear();
                // Provenance marker that survives the bulk reset.
                if rc.id == initiator {
                    rc.dispositions.rollback_at = Some(now);
                }
            }
            self.runs.save_run_contributors(&rows)?;
        }

        info!(
            run_id = %run.id,
            principal = %principal,
            from_level,
            "run rolled back to level 0"
        );

        Ok(run)
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    /// All components of `run` plus the index of the first one at `run.level`.
    fn active_component(&self, run: &Run) -> SignoffResult<(Vec<RunComponent>, usize)> {
        let components = self.runs.list_run_components(&run.id)?;
        match components.iter().position(|c| c.level == run.level) {
            Some(idx) => Ok((components, idx)),
            None => {
                warn!(run_id = %run.id, level = run.level, "no active component");
                Err(SignoffError::precondition(format!(
                    "no active component found for run '{}' at level {}",
                    run.id, run.level
                )))
            }
        }
    }

    /// Ids of the contributor rows `principal` stands behind.
    fn held_slots(
        &self,
        principal: &PrincipalRef,
        contributors: &[RunContributor],
    ) -> SignoffResult<Vec<RunContributorId>> {
        let mut held = Vec::new();
        for rc in contributors {
            if self.matcher.matches(principal, &rc.approvable)? {
                held.push(rc.id);
            }
        }
        Ok(held)
    }

    /// Index of the first contributor row `principal` stands behind.
    fn contributor_slot(
        &self,
        run: &Run,
        principal: &PrincipalRef,
        contributors: &[RunContributor],
    ) -> SignoffResult<usize> {
        for (idx, rc) in contributors.iter().enumerate() {
            if self.matcher.matches(principal, &rc.approvable)? {
                return Ok(idx);
            }
        }
        warn!(run_id = %run.id, principal = %principal, "principal is not a contributor");
        Err(SignoffError::precondition(format!(
            "principal '{}' is not a contributor of the active component at level {}",
            principal, run.level
        )))
    }
}

// ── Aggregation rules ─────────────────────────────────────────────────────────

/// Whether a component at `component_level` is reachable when the run is at
/// `run_level`.
pub fn level_gate(mode: LevelMode, component_level: u32, run_level: u32) -> bool {
    match mode {
        LevelMode::Parallel => true,
        LevelMode::Sequential => component_level == run_level,
    }
}

/// Stamp `approved_at` on the rows selected by `is_principal`.
///
/// OR mode stamps every matching row; AND mode stamps only the first.
/// Returns the indices stamped.
pub fn record_approval(
    mode: ContributorMode,
    contributors: &mut [RunContributor],
    now: DateTime<Utc>,
    is_principal: impl Fn(&RunContributor) -> bool,
) -> Vec<usize> {
    let matching: Vec<usize> = contributors
        .iter()
        .enumerate()
        .filter(|(_, rc)| is_principal(rc))
        .map(|(i, _)| i)
        .collect();

    let stamped: Vec<usize> = match mode {
        ContributorMode::Or => matching,
        ContributorMode::And => matching.into_iter().take(1).collect(),
    };

    for &i in &stamped {
        contributors[i].dispositions.approved_at = Some(now);
    }
    stamped
}

/// Recompute a component's dispositions from all of its contributors.
///
/// Flags that are already set keep their first timestamp. In AND mode a
/// rejection force-cancels every sibling still undisposed; the indices of
/// those siblings are returned so the caller can persist them.
pub fn recompute_component(
    component: &mut RunComponent,
    contributors: &mut [RunContributor],
    now: DateTime<Utc>,
) -> Vec<usize> {
    let approved = contributors.iter().filter(|rc| rc.dispositions.approved_at.is_some()).count();
    let rejected = any_row(contributors, |d| d.rejected_at.is_some());

    let d = &mut component.dispositions;
    let mut canceled = Vec::new();

    match component.mode {
        ContributorMode::Or => {
            if approved > 0 {
                d.approved_at.get_or_insert(now);
            }
            if rejected {
                d.rejected_at.get_or_insert(now);
            }
        }
        ContributorMode::And => {
            if approved == contributors.len() {
                d.approved_at.get_or_insert(now);
            }
            if rejected {
                d.rejected_at.get_or_insert(now);
                for (i, rc) in contributors.iter_mut().enumerate() {
                    if rc.dispositions.is_pending() {
                        rc.dispositions.canceled_at = Some(now);
                        canceled.push(i);
                    }
                }
            }
        }
    }

    // Both modes mirror "any contributor has this disposition".
    if any_row(contributors, |d| d.canceled_at.is_some()) {
        d.canceled_at.get_or_insert(now);
    }
    if any_row(contributors, |d| d.rollback_at.is_some()) {
        d.rollback_at.get_or_insert(now);
    }

    canceled
}

fn any_row(rows: &[RunContributor], pick: impl Fn(&Dispositions) -> bool) -> bool {
    rows.iter().any(|rc| pick(&rc.dispositions))
}

/// Re-derive run-level progress after a component changed.
///
/// Only components up to the current level are required to be disposed.
/// At the highest level the outcome is resolved with priority
/// rejected > canceled > rollback > approved. Below it, the run advances by
/// exactly one level when every component of the current level is approved.
pub fn derive_progress(run: &mut Run, components: &[RunComponent], now: DateTime<Utc>) -> Progress {
    let level = run.level;
    if components.iter().any(|c| c.level <= level && c.dispositions.is_pending()) {
        return Progress::Incomplete;
    }

    let Some(max_level) = components.iter().map(|c| c.level).max() else {
        return Progress::Incomplete;
    };

    if run.level == max_level {
        let any = |pick: fn(&Dispositions) -> bool| components.iter().any(|c| pick(&c.dispositions));
        let status = if any(|d| d.rejected_at.is_some()) {
            run.dispositions.rejected_at = Some(now);
            RunStatus::Rejected
        } else if any(|d| d.canceled_at.is_some()) {
            run.dispositions.canceled_at = Some(now);
            RunStatus::Rollback
        } else if any(|d| d.rollback_at.is_some()) {
            run.dispositions.rollback_at = Some(now);
            RunStatus::Rollback
        } else {
            run.dispositions.approved_at = Some(now);
            RunStatus::Approved
        };
        run.status = status;
        return Progress::Concluded(status);
    }

    let current_approved = components
        .iter()
        .filter(|c| c.level == run.level)
        .all(|c| c.dispositions.approved_at.is_some());
    if !current_approved {
        return Progress::Stalled;
    }

    // Levels are not skipped: a gap in the numbering becomes a level with no
    // component, which the next submit approves outright.
    let from = run.level;
    let to = from + 1;
    run.level = to;
    Progress::Advanced { from, to }
}
