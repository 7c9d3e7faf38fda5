//! Scenario 3: Rejection
//!
//! Purchase order po-1002 (server rack, IT hardware) runs through three
//! levels. The manager approves, then security rejects at the IT review.
//! The rejection ends the run outright: the IT lead's open slot and the
//! whole finance level are canceled, and nobody can act any more.
//!
//! A second reject attempt is refused because the run is already processed.

use signoff_contracts::{
    config::EngineConfig,
    error::{SignoffError, SignoffResult},
    run::{Run, RunSnapshot},
};

use crate::{
    mock_data::{purchase_order, purchase_order_ref, FINANCE_ANA, IT_LEAD, MANAGER, SECURITY},
    runtime::Runtime,
    scenarios::{print_run, print_snapshot},
};

struct Outcome {
    rejected: Run,
    snapshot: RunSnapshot,
    finance_can_act: bool,
    second_reject: SignoffResult<Run>,
}

fn walk(rt: &Runtime) -> SignoffResult<Outcome> {
    let po = purchase_order("po-1002");
    let po_ref = purchase_order_ref("po-1002");

    rt.store.transaction(|_| rt.engine.submit(&po, MANAGER))?;
    let rejected = rt.store.transaction(|_| rt.engine.reject(&po_ref, SECURITY))?;

    Ok(Outcome {
        rejected,
        snapshot: rt.engine.snapshot(&po_ref)?,
        finance_can_act: rt.engine.can_act(&po_ref, Some(FINANCE_ANA)),
        second_reject: rt.store.transaction(|_| rt.engine.reject(&po_ref, IT_LEAD)),
    })
}

pub fn run_scenario() -> SignoffResult<()> {
    println!("=== Scenario 3: Rejection ===");
    println!();

    let rt = Runtime::new(EngineConfig::default())?;
    let outcome = walk(&rt)?;

    print_run("reject by security:", &outcome.rejected);
    print_snapshot(&outcome.snapshot);
    println!("  Finance may act afterwards: {}", outcome.finance_can_act);

    match &outcome.second_reject {
        Err(SignoffError::Precondition { reason }) => {
            println!("  Second reject refused: {}", reason);
            println!("  RESULT: Precondition (expected)");
        }
        Err(e) => println!("  Unexpected error: {}", e),
        Ok(_) => println!("  Unexpectedly rejected twice"),
    }
    println!();

    println!("  Scenario 3 complete.");
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use signoff_contracts::run::RunStatus;

    use super::*;

    #[test]
    fn test_rejection_cancels_every_open_step() {
        let rt = Runtime::new(EngineConfig::default()).unwrap();
        let outcome = walk(&rt).unwrap();

        assert_eq!(outcome.rejected.status, RunStatus::Rejected);
        assert!(outcome.rejected.dispositions.rejected_at.is_some());
        assert!(outcome.rejected.dispositions.approved_at.is_none());

        let finance = outcome.snapshot.at_level(2).next().unwrap();
        assert!(finance.component.dispositions.canceled_at.is_some());
        assert!(outcome.snapshot.contributors().all(|rc| !rc.dispositions.is_pending()));

        let lead = outcome
            .snapshot
            .contributors()
            .find(|rc| rc.approvable.id == IT_LEAD)
            .unwrap();
        assert!(lead.dispositions.canceled_at.is_some());

        assert!(!outcome.finance_can_act);
        match outcome.second_reject {
            Err(SignoffError::Precondition { reason }) => {
                assert!(reason.contains("already processed"), "unexpected reason: {reason}");
            }
            other => panic!("expected Precondition, got {:?}", other),
        }
    }

    #[test]
    fn test_scenario_runs() {
        assert!(run_scenario().is_ok());
    }
}
