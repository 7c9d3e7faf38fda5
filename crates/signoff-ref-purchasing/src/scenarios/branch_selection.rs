//! Scenario 5: Branch selection
//!
//! Four purchase orders are materialized against the same approval. Each is
//! routed to the first statement whose conditions all hold, falling back to
//! the default statement:
//!
//!   po-1001  ops, 840          → po-standard (default)
//!   po-1002  it/hardware, 7450 → po-it-hardware
//!   po-1003  legal, 24000      → po-large
//!   po-1004  it/peripherals    → po-it-hardware (declared before po-large)
//!
//! The engine is configured from TOML to refuse travel requests, and a
//! supplier webhook is screened with a payload condition.

use signoff_contracts::{
    config::EngineConfig,
    error::{SignoffError, SignoffResult},
};
use signoff_policy::{evaluate_payload, PayloadCondition};

use crate::{
    mock_data::{price_change_payload, purchase_order, travel_request, MANAGER},
    runtime::Runtime,
};

const ENGINE_CONFIG: &str = r#"
principal_kind = "user"
excluded_subject_types = ["travel_request"]
"#;

/// Price changes above this share of the line need a fresh approval.
const REAPPROVAL_RULE: &str = r#"
field = "order.delta_percent"
operator = ">="
value = 5.0
"#;

const ORDERS: [&str; 4] = ["po-1001", "po-1002", "po-1003", "po-1004"];

/// (order id, selected statement id) per order, in `ORDERS` order.
fn route_orders(rt: &Runtime) -> SignoffResult<Vec<(String, String)>> {
    ORDERS
        .iter()
        .map(|id| -> SignoffResult<(String, String)> {
            let run = rt.store.transaction(|_| rt.engine.materialize(&purchase_order(id)))?;
            Ok((id.to_string(), run.statement_id.to_string()))
        })
        .collect()
}

fn reapproval_rule() -> SignoffResult<PayloadCondition> {
    toml::from_str(REAPPROVAL_RULE).map_err(|e| SignoffError::Configuration {
        reason: format!("failed to parse payload condition TOML: {}", e),
    })
}

pub fn run_scenario() -> SignoffResult<()> {
    println!("=== Scenario 5: Branch selection ===");
    println!();

    let rt = Runtime::new(EngineConfig::from_toml_str(ENGINE_CONFIG)?)?;

    for (order, statement) in route_orders(&rt)? {
        println!("  {:<10} → {}", order, statement);
    }
    println!();

    println!("  Travel requests are excluded by configuration");
    match rt.store.transaction(|_| rt.engine.submit(&travel_request("tr-0042"), MANAGER)) {
        Err(SignoffError::Precondition { reason }) => {
            println!("  Submit refused: {}", reason);
            println!("  RESULT: Precondition (expected)");
        }
        Err(e) => println!("  Unexpected error: {}", e),
        Ok(run) => println!("  Unexpectedly materialized run {}", run.id),
    }
    println!();

    let rule = reapproval_rule()?;
    let payload = price_change_payload();
    println!(
        "  Webhook '{}' needs re-approval ({} {} {}): {}",
        payload["event"].as_str().unwrap_or("unknown"),
        rule.field,
        rule.operator,
        rule.value,
        evaluate_payload(Some(&rule), &payload)
    );
    println!();

    println!("  Scenario 5 complete.");
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_orders_route_to_first_matching_statement() {
        let rt = Runtime::new(EngineConfig::default()).unwrap();
        let routes = route_orders(&rt).unwrap();

        let statements: Vec<&str> = routes.iter().map(|(_, s)| s.as_str()).collect();
        assert_eq!(
            statements,
            vec!["po-standard", "po-it-hardware", "po-large", "po-it-hardware"]
        );
    }

    #[test]
    fn test_excluded_subject_type_is_refused() {
        let rt = Runtime::new(EngineConfig::from_toml_str(ENGINE_CONFIG).unwrap()).unwrap();

        match rt.engine.submit(&travel_request("tr-0042"), MANAGER) {
            Err(SignoffError::Precondition { reason }) => {
                assert!(reason.contains("travel_request"), "unexpected reason: {reason}");
            }
            other => panic!("expected Precondition, got {:?}", other),
        }
        assert_eq!(rt.store.run_count().unwrap(), 0);
    }

    #[test]
    fn test_reapproval_rule_screens_price_changes() {
        let rule = reapproval_rule().unwrap();

        assert!(evaluate_payload(Some(&rule), &price_change_payload()));
        assert!(!evaluate_payload(
            Some(&rule),
            &json!({ "order": { "delta_percent": 1.2 } })
        ));
    }

    #[test]
    fn test_scenario_runs() {
        assert!(run_scenario().is_ok());
    }
}
