//! Purchasing reference scenarios.
//!
//! Each scenario builds its own `Runtime`, drives one or more subjects
//! through the engine inside store transactions, and prints what happened.

pub mod branch_selection;
pub mod multi_level;
pub mod rejection;
pub mod rollback;
pub mod single_level;

use signoff_contracts::run::{Run, RunSnapshot};

/// One line per run: subject, status, level and the set disposition stamps.
pub(crate) fn print_run(label: &str, run: &Run) {
    println!(
        "  {:<28} {}  status={:?} level={} disposition={:?}",
        label,
        run.subject,
        run.status,
        run.level,
        run.dispositions.state()
    );
}

/// Every component (by level) and contributor of a run.
pub(crate) fn print_snapshot(snapshot: &RunSnapshot) {
    println!(
        "  Run {} via statement '{}'",
        snapshot.run.subject, snapshot.run.statement_id
    );
    for entry in &snapshot.components {
        let component = &entry.component;
        println!(
            "    L{} {:<30} {:?}/{:?}",
            component.level,
            component.name,
            component.mode,
            component.dispositions.state()
        );
        for contributor in &entry.contributors {
            println!(
                "         - {:<24} {:?}",
                contributor.approvable.to_string(),
                contributor.dispositions.state()
            );
        }
    }
}
