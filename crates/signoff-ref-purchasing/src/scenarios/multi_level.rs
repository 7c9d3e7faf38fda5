//! Scenario 2: Multi-level sequential approval
//!
//! Purchase order po-1003 (24 000.00, legal) selects the "Large orders"
//! branch: the department manager at level 0, then the finance group at
//! level 1. The run is sequential, so finance cannot act until the manager
//! has approved. Any finance controller acts for the group.

use signoff_contracts::{config::EngineConfig, error::SignoffResult, run::Run};

use crate::{
    mock_data::{purchase_order, purchase_order_ref, FINANCE_ANA, FINANCE_BEN, MANAGER, OUTSIDER},
    runtime::Runtime,
    scenarios::{print_run, print_snapshot},
};

/// Who may act at each point of the walk.
#[derive(Debug, Default)]
struct Gates {
    finance_before_manager: bool,
    finance_after_manager: bool,
    outsider_after_manager: bool,
}

fn walk(rt: &Runtime) -> SignoffResult<(Gates, Run, Run)> {
    let po = purchase_order("po-1003");
    let po_ref = purchase_order_ref("po-1003");
    let mut gates = Gates::default();

    rt.store.transaction(|_| rt.engine.materialize(&po))?;
    gates.finance_before_manager = rt.engine.can_act(&po_ref, Some(FINANCE_ANA));

    let after_manager = rt.store.transaction(|_| rt.engine.submit(&po, MANAGER))?;
    gates.finance_after_manager = rt.engine.can_act(&po_ref, Some(FINANCE_ANA));
    gates.outsider_after_manager = rt.engine.can_act(&po_ref, Some(OUTSIDER));

    let after_finance = rt.store.transaction(|_| rt.engine.submit(&po, FINANCE_BEN))?;
    Ok((gates, after_manager, after_finance))
}

pub fn run_scenario() -> SignoffResult<()> {
    println!("=== Scenario 2: Multi-level sequential approval ===");
    println!();

    let rt = Runtime::new(EngineConfig::default())?;
    let (gates, after_manager, after_finance) = walk(&rt)?;

    println!("  Finance may act before manager:  {}", gates.finance_before_manager);
    print_run("submit by manager:", &after_manager);
    println!("  Finance may act after manager:   {}", gates.finance_after_manager);
    println!("  Intern may act after manager:    {}", gates.outsider_after_manager);
    print_run("submit by finance (group):", &after_finance);
    print_snapshot(&rt.engine.snapshot(&purchase_order_ref("po-1003"))?);
    println!();

    println!("  Scenario 2 complete.");
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use signoff_contracts::run::RunStatus;

    use super::*;

    #[test]
    fn test_finance_gated_behind_manager() {
        let rt = Runtime::new(EngineConfig::default()).unwrap();
        let (gates, after_manager, after_finance) = walk(&rt).unwrap();

        assert!(!gates.finance_before_manager);
        assert!(gates.finance_after_manager);
        assert!(!gates.outsider_after_manager);

        assert_eq!(after_manager.statement_id.as_str(), "po-large");
        assert_eq!(after_manager.level, 1);
        assert_eq!(after_manager.status, RunStatus::Draft);
        assert_eq!(after_finance.status, RunStatus::Approved);
    }

    #[test]
    fn test_scenario_runs() {
        assert!(run_scenario().is_ok());
    }
}
