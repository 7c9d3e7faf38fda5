//! Scenario 4: Rollback
//!
//! Purchase order po-1002 reaches the IT review. The IT lead approves, but
//! security sends the order back. Rollback restarts the whole run from
//! level 0: every stamp on every step is cleared, and only security's own
//! slot keeps a rollback marker. The manager then has to approve again.

use signoff_contracts::{
    config::EngineConfig,
    error::SignoffResult,
    run::{Run, RunSnapshot},
};

use crate::{
    mock_data::{purchase_order, purchase_order_ref, IT_LEAD, MANAGER, SECURITY},
    runtime::Runtime,
    scenarios::{print_run, print_snapshot},
};

struct Outcome {
    before: Run,
    rolled_back: Run,
    snapshot: RunSnapshot,
    manager_can_act: bool,
    resubmitted: Run,
}

fn walk(rt: &Runtime) -> SignoffResult<Outcome> {
    let po = purchase_order("po-1002");
    let po_ref = purchase_order_ref("po-1002");

    rt.store.transaction(|_| rt.engine.submit(&po, MANAGER))?;
    let before = rt.store.transaction(|_| rt.engine.submit(&po, IT_LEAD))?;
    let rolled_back = rt.store.transaction(|_| rt.engine.rollback(&po_ref, SECURITY))?;
    let snapshot = rt.engine.snapshot(&po_ref)?;
    let manager_can_act = rt.engine.can_act(&po_ref, Some(MANAGER));
    let resubmitted = rt.store.transaction(|_| rt.engine.submit(&po, MANAGER))?;

    Ok(Outcome {
        before,
        rolled_back,
        snapshot,
        manager_can_act,
        resubmitted,
    })
}

pub fn run_scenario() -> SignoffResult<()> {
    println!("=== Scenario 4: Rollback ===");
    println!();

    let rt = Runtime::new(EngineConfig::default())?;
    let outcome = walk(&rt)?;

    print_run("after IT lead approval:", &outcome.before);
    print_run("rollback by security:", &outcome.rolled_back);
    print_snapshot(&outcome.snapshot);
    println!("  Manager may act again: {}", outcome.manager_can_act);
    print_run("manager re-approves:", &outcome.resubmitted);
    println!();

    println!("  Scenario 4 complete.");
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use signoff_contracts::run::RunStatus;

    use super::*;

    #[test]
    fn test_rollback_resets_run_and_marks_initiator() {
        let rt = Runtime::new(EngineConfig::default()).unwrap();
        let outcome = walk(&rt).unwrap();

        assert_eq!(outcome.before.level, 1);
        assert_eq!(outcome.rolled_back.level, 0);
        assert_eq!(outcome.rolled_back.status, RunStatus::Draft);
        assert!(outcome.rolled_back.dispositions.rollback_at.is_some());

        assert!(outcome
            .snapshot
            .components
            .iter()
            .all(|c| c.component.dispositions.is_pending()));
        for rc in outcome.snapshot.contributors() {
            if rc.approvable.id == SECURITY {
                assert!(rc.dispositions.rollback_at.is_some());
            } else {
                assert!(rc.dispositions.is_pending());
            }
        }

        assert!(outcome.manager_can_act);
        assert_eq!(outcome.resubmitted.level, 1);
    }

    #[test]
    fn test_scenario_runs() {
        assert!(run_scenario().is_ok());
    }
}
