//! Scenario 1: Single-level approval
//!
//! Part A: a standard purchase order has one AND step held by the manager
//! and the deputy. The manager's approval alone leaves the step open; the
//! deputy's approval completes it and, as the only level, approves the run.
//!
//! Part B: a travel request has one OR step held by the same two people.
//! The first approval completes the run; a later approval changes nothing.

use signoff_contracts::{config::EngineConfig, error::SignoffResult, run::Run};

use crate::{
    mock_data::{purchase_order, purchase_order_ref, travel_request, DEPUTY, MANAGER},
    runtime::Runtime,
    scenarios::{print_run, print_snapshot},
};

/// Part A: (after manager, after deputy).
fn and_step(rt: &Runtime) -> SignoffResult<(Run, Run)> {
    let po = purchase_order("po-1001");
    let after_manager = rt.store.transaction(|_| rt.engine.submit(&po, MANAGER))?;
    let after_deputy = rt.store.transaction(|_| rt.engine.submit(&po, DEPUTY))?;
    Ok((after_manager, after_deputy))
}

/// Part B: (after manager, after deputy).
fn or_step(rt: &Runtime) -> SignoffResult<(Run, Run)> {
    let trip = travel_request("tr-0042");
    let after_manager = rt.store.transaction(|_| rt.engine.submit(&trip, MANAGER))?;
    let after_deputy = rt.store.transaction(|_| rt.engine.submit(&trip, DEPUTY))?;
    Ok((after_manager, after_deputy))
}

pub fn run_scenario() -> SignoffResult<()> {
    println!("=== Scenario 1: Single-level approval ===");
    println!();

    let rt = Runtime::new(EngineConfig::default())?;

    println!("  Part A: AND step (manager + deputy), purchase order po-1001");
    let (after_manager, after_deputy) = and_step(&rt)?;
    print_run("submit by manager:", &after_manager);
    print_run("submit by deputy:", &after_deputy);
    print_snapshot(&rt.engine.snapshot(&purchase_order_ref("po-1001"))?);
    println!();

    println!("  Part B: OR step (manager or deputy), travel request tr-0042");
    let (after_manager, after_deputy) = or_step(&rt)?;
    print_run("submit by manager:", &after_manager);
    print_run("submit by deputy:", &after_deputy);
    println!();

    println!("  Scenario 1 complete.");
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use signoff_contracts::run::RunStatus;

    use super::*;

    #[test]
    fn test_and_step_needs_both_approvers() {
        let rt = Runtime::new(EngineConfig::default()).unwrap();
        let (after_manager, after_deputy) = and_step(&rt).unwrap();

        assert_eq!(after_manager.status, RunStatus::Draft);
        assert_eq!(after_manager.statement_id.as_str(), "po-standard");
        assert_eq!(after_deputy.status, RunStatus::Approved);
    }

    #[test]
    fn test_or_step_completes_on_first_approval() {
        let rt = Runtime::new(EngineConfig::default()).unwrap();
        let (after_manager, after_deputy) = or_step(&rt).unwrap();

        assert_eq!(after_manager.status, RunStatus::Approved);
        assert_eq!(after_deputy.status, RunStatus::Approved);
        assert_eq!(after_manager.id, after_deputy.id);
    }

    #[test]
    fn test_scenario_runs() {
        assert!(run_scenario().is_ok());
    }
}
