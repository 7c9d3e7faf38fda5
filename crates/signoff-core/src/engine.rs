//! The approval engine: run materialization and inspection.
//!
//! The engine wires the trait seams together:
//!
//!   Subject → TemplateStore → StatementSelector → RunStore (materialize)
//!   Principal action → ApprovalStateMachine → RunStore (see `machine.rs`)
//!
//! The engine is request-scoped and stateless between calls: every durable
//! fact lives in the run records behind `RunStore`. Callers provide the
//! transaction boundary around each public operation.

use tracing::{debug, info, warn};

use signoff_contracts::{
    config::EngineConfig,
    error::{SignoffError, SignoffResult},
    ids::SubjectRef,
    run::{ComponentSnapshot, Run, RunComponent, RunContributor, RunSnapshot},
};

use crate::traits::{
    ApproverMatcher, DirectMatcher, Requestable, RunStore, StatementSelector, TemplateStore,
};

/// Drives subjects through their approval runs.
///
/// Construct one engine per store; it holds no per-run state.
pub struct ApprovalEngine {
    pub(crate) templates: Box<dyn TemplateStore>,
    pub(crate) runs: Box<dyn RunStore>,
    pub(crate) selector: Box<dyn StatementSelector>,
    pub(crate) matcher: Box<dyn ApproverMatcher>,
    pub(crate) config: EngineConfig,
}

impl ApprovalEngine {
    /// Create an engine that matches principals to approvables by exact
    /// (kind, id). Use `with_matcher` to resolve groups or other kinds.
    pub fn new(
        templates: Box<dyn TemplateStore>,
        runs: Box<dyn RunStore>,
        selector: Box<dyn StatementSelector>,
        config: EngineConfig,
    ) -> Self {
        Self {
            templates,
            runs,
            selector,
            matcher: Box::new(DirectMatcher),
            config,
        }
    }

    pub fn with_matcher(mut self, matcher: Box<dyn ApproverMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Return the run for `subject`, creating it on first use.
    ///
    /// An existing run is returned unchanged: branch selection is never
    /// re-evaluated once a run exists. Otherwise the Approval bound to the
    /// subject type is resolved, a Statement is selected, and the Statement's
    /// components and contributors are copied into run-scoped records.
    ///
    /// # Errors
    ///
    /// - `Precondition` if the subject type is excluded from approval
    /// - `Configuration` if no Approval is bound to the subject type, or no
    ///   Statement applies and none is default
    pub fn materialize<S: Requestable>(&self, subject: &S) -> SignoffResult<Run> {
        let subject_ref = subject.subject_ref();
        self.ensure_allowed(&subject_ref)?;

        if let Some(run) = self.runs.find_run(&subject_ref)? {
            debug!(run_id = %run.id, subject = %subject_ref, "run already materialized");
            return Ok(run);
        }

        let approval = self
            .templates
            .find_approval_for(&subject_ref.subject_type)?
            .ok_or_else(|| {
                SignoffError::configuration(format!(
                    "subject type '{}' is not bound to any approval flow",
                    subject_ref.subject_type
                ))
            })?;

        let statements = self.templates.list_statements(&approval.id)?;
        let statement = self.selector.select(&statements, subject).map_err(|e| match e {
            SignoffError::Configuration { reason } => SignoffError::Configuration {
                reason: format!("approval '{}' for '{}': {}", approval.id, subject_ref, reason),
            },
            other => other,
        })?;

        let candidate = Run::draft(
            subject_ref.clone(),
            approval.id.clone(),
            statement.id.clone(),
            approval.level_mode,
        );
        let candidate_id = candidate.id;
        let run = self.runs.create_run(candidate)?;

        if run.id != candidate_id {
            // Another caller created the run between our lookup and insert.
            debug!(run_id = %run.id, subject = %subject_ref, "lost materialization race");
            return Ok(run);
        }

        let components = self.templates.list_components(&statement.id)?;
        let mut contributor_count = 0usize;
        for template in &components {
            let component = RunComponent::from_template(run.id, template);
            let component_id = component.id;
            self.runs.create_run_component(component)?;

            for contributor in &template.contributors {
                self.runs
                    .create_run_contributor(RunContributor::from_template(component_id, contributor))?;
                contributor_count += 1;
            }
        }

        info!(
            run_id = %run.id,
            subject = %subject_ref,
            approval_id = %approval.id,
            statement_id = %statement.id,
            components = components.len(),
            contributors = contributor_count,
            "run materialized"
        );

        Ok(run)
    }

    /// The run for `subject`, if one has been materialized.
    pub fn find_run(&self, subject: &SubjectRef) -> SignoffResult<Option<Run>> {
        self.runs.find_run(subject)
    }

    /// The run for `subject` with all of its components (ordered by level)
    /// and their contributors.
    ///
    /// Returns `NotFound` if no run exists.
    pub fn snapshot(&self, subject: &SubjectRef) -> SignoffResult<RunSnapshot> {
        let run = self.runs.find_run(subject)?.ok_or_else(|| missing_run(subject))?;

        let mut components = self.runs.list_run_components(&run.id)?;
        components.sort_by_key(|c| c.level);

        let components = components
            .into_iter()
            .map(|component| -> SignoffResult<ComponentSnapshot> {
                let contributors = self.runs.list_run_contributors(&component.id)?;
                Ok(ComponentSnapshot { component, contributors })
            })
            .collect::<SignoffResult<Vec<_>>>()?;

        Ok(RunSnapshot { run, components })
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    pub(crate) fn ensure_allowed(&self, subject: &SubjectRef) -> SignoffResult<()> {
        if self.config.is_excluded(&subject.subject_type) {
            warn!(subject = %subject, "subject type is excluded from approval");
            return Err(SignoffError::precondition(format!(
                "subject type '{}' is not allowed to be approved",
                subject.subject_type
            )));
        }
        Ok(())
    }

    /// The run for `subject`, which must already exist and be allowed.
    pub(crate) fn existing_run(&self, subject: &SubjectRef) -> SignoffResult<Run> {
        let run = self.runs.find_run(subject)?.ok_or_else(|| missing_run(subject))?;
        self.ensure_allowed(subject)?;
        Ok(run)
    }
}

fn missing_run(subject: &SubjectRef) -> SignoffError {
    SignoffError::not_found(format!("no approval run exists for '{}'", subject))
}
