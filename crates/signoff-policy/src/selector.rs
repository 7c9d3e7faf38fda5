//! Condition-driven statement selection.
//!
//! Algorithm:
//!
//! 1. Walk statements in creation order, remembering the last one flagged
//!    `is_default`. Default statements are never evaluated.
//! 2. A non-default statement with no conditions never matches.
//! 3. The first non-default statement whose conditions all hold wins.
//! 4. Without a match the default statement is used; without a default the
//!    approval is misconfigured.

use tracing::{debug, warn};

use signoff_contracts::{
    error::{SignoffError, SignoffResult},
    template::Statement,
};
use signoff_core::traits::{StatementSelector, SubjectRecord};

use crate::condition::evaluate_condition;

/// The `StatementSelector` used in production: ANDed attribute-mode
/// conditions, first match wins, default as fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionalSelector;

impl ConditionalSelector {
    pub fn new() -> Self {
        Self
    }
}

impl StatementSelector for ConditionalSelector {
    fn select<'a>(
        &self,
        statements: &'a [Statement],
        record: &dyn SubjectRecord,
    ) -> SignoffResult<&'a Statement> {
        let mut default: Option<&'a Statement> = None;

        for statement in statements {
            if statement.is_default {
                if let Some(previous) = default {
                    warn!(
                        approval_id = %statement.approval_id,
                        previous = %previous.id,
                        statement_id = %statement.id,
                        "more than one default statement; the later one wins"
                    );
                }
                default = Some(statement);
                continue;
            }

            if statement.conditions.is_empty() {
                debug!(statement_id = %statement.id, "statement has no conditions; skipped");
                continue;
            }

            let failed = statement
                .conditions
                .iter()
                .find(|condition| !evaluate_condition(condition, record));

            match failed {
                None => {
                    debug!(statement_id = %statement.id, "statement matched");
                    return Ok(statement);
                }
                Some(condition) => {
                    debug!(
                        statement_id = %statement.id,
                        field = %condition.field,
                        operator = %condition.operator,
                        value = %condition.value,
                        "statement condition did not hold"
                    );
                }
            }
        }

        match default {
            Some(statement) => {
                debug!(statement_id = %statement.id, "no statement matched; using default");
                Ok(statement)
            }
            None => Err(SignoffError::configuration(
                "no applicable approval statement found and no default statement configured",
            )),
        }
    }
}
