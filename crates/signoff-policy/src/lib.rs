//! # signoff-policy
//!
//! Decides which branch of an approval governs a subject.
//!
//! ## Overview
//!
//! - [`ConditionalSelector`] implements
//!   [`StatementSelector`](signoff_core::traits::StatementSelector): statements
//!   are tried in creation order, the first whose conditions all hold wins,
//!   and the default statement is the fallback.
//! - [`evaluate_condition`] and [`evaluate_payload`] are the two condition
//!   evaluators, built on the loose comparison rules in [`compare`].
//! - [`Catalog`] loads administrator templates from TOML.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use signoff_policy::{Catalog, ConditionalSelector};
//!
//! let templates = Catalog::from_file(Path::new("catalogs/purchasing.toml"))?.into_templates()?;
//! // Seed a store with `templates`, then pass `ConditionalSelector` to
//! // `signoff_core::ApprovalEngine::new(...)`.
//! ```

pub mod catalog;
pub mod compare;
pub mod condition;
pub mod selector;

pub use catalog::Catalog;
pub use condition::{evaluate_condition, evaluate_payload, Operator, PayloadCondition};
pub use selector::ConditionalSelector;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use signoff_contracts::{
        error::SignoffError,
        ids::{ApprovalId, StatementId, SubjectRef},
        template::{Condition, ContributorMode, LevelMode, Statement},
    };
    use signoff_core::{traits::StatementSelector, JsonSubject};

    use crate::{
        condition::camel_case, evaluate_condition, evaluate_payload, Catalog, ConditionalSelector,
        PayloadCondition,
    };

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn order(attributes: serde_json::Value) -> JsonSubject {
        JsonSubject::new(SubjectRef::new("purchase_order", "po-1"), attributes)
    }

    fn statement(id: &str, is_default: bool, conditions: Vec<Condition>) -> Statement {
        Statement {
            id: StatementId::new(id),
            approval_id: ApprovalId::new("a1"),
            name: id.to_string(),
            is_default,
            conditions,
        }
    }

    fn holds(field: &str, operator: &str, value: &str, subject: &JsonSubject) -> bool {
        evaluate_condition(&Condition::new(field, operator, value), subject)
    }

    // ── 1. attribute-mode conditions ──────────────────────────────────────────

    #[test]
    fn test_scalar_operators_use_loose_comparison() {
        let po = order(json!({ "amount": 12500, "status": "open" }));

        assert!(holds("amount", "=", "12500", &po));
        assert!(holds("amount", "==", "12500.0", &po));
        assert!(holds("amount", ">", "10000", &po));
        assert!(holds("amount", ">=", "12500", &po));
        assert!(holds("amount", "<", "20000", &po));
        assert!(holds("amount", "<=", "12500", &po));
        assert!(holds("status", "!=", "closed", &po));
        assert!(holds("status", "<>", "closed", &po));
        assert!(!holds("amount", "<", "10000", &po));
    }

    #[test]
    fn test_unknown_operator_is_false() {
        let po = order(json!({ "amount": 12500 }));
        assert!(!holds("amount", "~=", "12500", &po));
        assert!(!holds("amount", "between", "[1, 2]", &po));
    }

    #[test]
    fn test_unknown_field_fails_closed_for_every_operator() {
        let po = order(json!({ "amount": 12500, "vendor": null }));
        assert!(!holds("currency", "!=", "USD", &po));
        assert!(!holds("currency", "not in", "[\"USD\"]", &po));
        // A null attribute reads as unset.
        assert!(!holds("vendor", "!=", "acme", &po));
    }

    #[test]
    fn test_membership_requires_json_array_literal() {
        let po = order(json!({ "department": "it", "priority": 2 }));

        assert!(holds("department", "in", r#"["it", "ops"]"#, &po));
        assert!(!holds("department", "not in", r#"["it", "ops"]"#, &po));
        assert!(holds("priority", "in", r#"["1", "2"]"#, &po));
        assert!(holds("department", "not in", r#"["hr"]"#, &po));

        // Not an array: both operators are false.
        assert!(!holds("department", "in", "it", &po));
        assert!(!holds("department", "not in", "it", &po));
    }

    #[test]
    fn test_relations_and_accessors_use_camel_case_names() {
        let po = order(json!({}))
            .with_relation("costCenter", json!("cc-100"))
            .with_accessor("lineCount", json!(7));

        assert!(holds("cost_center", "=", "cc-100", &po));
        assert!(holds("line_count", ">", "5", &po));
        assert_eq!(camel_case("total-net amount"), "totalNetAmount");
    }

    // ── 2. payload-mode conditions ────────────────────────────────────────────

    #[test]
    fn test_payload_condition_none_is_vacuously_true() {
        assert!(evaluate_payload(None, &json!({})));
    }

    #[test]
    fn test_payload_condition_walks_dotted_paths() {
        let payload = json!({ "order": { "total": 7200, "lines": [{ "sku": "A-1" }] } });
        let cond = |field: &str, operator: &str, value| PayloadCondition {
            field: field.to_string(),
            operator: operator.to_string(),
            value,
        };

        assert!(evaluate_payload(Some(&cond("order.total", ">=", json!(5000))), &payload));
        assert!(evaluate_payload(Some(&cond("order.lines.0.sku", "=", json!("A-1"))), &payload));
        assert!(!evaluate_payload(Some(&cond("order.total", "<", json!(5000))), &payload));

        // Absent paths satisfy only `!=`.
        assert!(evaluate_payload(Some(&cond("order.vendor", "!=", json!("acme"))), &payload));
        assert!(!evaluate_payload(Some(&cond("order.vendor", "=", json!("acme"))), &payload));

        // Membership operators are not part of payload mode.
        assert!(!evaluate_payload(Some(&cond("order.total", "in", json!([7200]))), &payload));
    }

    // ── 3. statement selection ────────────────────────────────────────────────

    #[test]
    fn test_first_matching_statement_wins() {
        let statements = vec![
            statement("fallback", true, vec![]),
            statement("large", false, vec![Condition::new("amount", ">=", "10000")]),
            statement("any", false, vec![Condition::new("amount", ">", "0")]),
        ];

        let selected = ConditionalSelector
            .select(&statements, &order(json!({ "amount": 25000 })))
            .unwrap();
        assert_eq!(selected.id.as_str(), "large");
    }

    #[test]
    fn test_all_conditions_must_hold() {
        let statements = vec![
            statement(
                "it-large",
                false,
                vec![
                    Condition::new("department", "=", "it"),
                    Condition::new("amount", ">=", "10000"),
                ],
            ),
            statement("fallback", true, vec![]),
        ];

        let selected = ConditionalSelector
            .select(&statements, &order(json!({ "department": "it", "amount": 500 })))
            .unwrap();
        assert_eq!(selected.id.as_str(), "fallback");
    }

    #[test]
    fn test_empty_non_default_statement_never_matches() {
        let statements = vec![statement("empty", false, vec![]), statement("fallback", true, vec![])];

        let selected = ConditionalSelector.select(&statements, &order(json!({}))).unwrap();
        assert_eq!(selected.id.as_str(), "fallback");
    }

    #[test]
    fn test_default_statement_conditions_are_not_evaluated() {
        let statements = vec![statement(
            "fallback",
            true,
            vec![Condition::new("amount", ">", "1000000")],
        )];

        let selected = ConditionalSelector
            .select(&statements, &order(json!({ "amount": 1 })))
            .unwrap();
        assert_eq!(selected.id.as_str(), "fallback");
    }

    #[test]
    fn test_no_match_and_no_default_is_configuration_error() {
        let statements = vec![statement("large", false, vec![Condition::new("amount", ">", "10")])];

        match ConditionalSelector.select(&statements, &order(json!({ "amount": 1 }))) {
            Err(SignoffError::Configuration { reason }) => {
                assert!(reason.contains("no default"), "unexpected reason: {reason}");
            }
            other => panic!("expected Configuration error, got {:?}", other),
        }
    }

    // ── 4. catalogs ───────────────────────────────────────────────────────────

    const CATALOG: &str = r##"
        [[flows]]
        id = "procurement"
        name = "Procurement"
        bindings = [{ name = "Purchase orders", subject_type = "purchase_order" }]

        [[groups]]
        id = "finance"
        name = "Finance"
        members = ["u-fin-1", "u-fin-2"]

        [[approvals]]
        id = "po-approval"
        name = "Purchase order approval"
        flow = "procurement"
        level_mode = "sequential"

        [[approvals.statements]]
        id = "large"
        name = "Large orders"
        conditions = [{ field = "amount", operator = ">=", value = "10000" }]

        [[approvals.statements.components]]
        id = "large-manager"
        level = 0
        name = "Manager"
        mode = "and"
        contributors = [{ approvable = "u-manager" }]

        [[approvals.statements.components]]
        id = "large-finance"
        level = 1
        name = "Finance"
        color = "#2f855a"
        mode = "or"
        contributors = [{ kind = "group", approvable = "finance", conditions = { max = 50000 } }]

        [[approvals.statements]]
        id = "standard"
        name = "Standard orders"
        is_default = true
    "##;

    #[test]
    fn test_catalog_flattens_in_declaration_order() {
        let templates = Catalog::from_toml_str(CATALOG).unwrap().into_templates().unwrap();

        assert_eq!(templates.flows.len(), 1);
        assert!(templates.flows[0].binds("purchase_order"));
        assert_eq!(templates.approvals[0].level_mode, LevelMode::Sequential);

        let order: Vec<&str> = templates.statements.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(order, vec!["large", "standard"]);
        assert!(templates.statements[1].is_default);

        let finance = &templates.components[1];
        assert_eq!(finance.mode, ContributorMode::Or);
        assert_eq!(finance.color.as_deref(), Some("#2f855a"));
        assert!(finance.contributors[0].approvable.is_group());
        assert_eq!(finance.contributors[0].id.as_str(), "large-finance#0");
        assert_eq!(finance.contributors[0].conditions, Some(json!({ "max": 50000 })));
        assert_eq!(templates.components[0].contributors[0].approvable.kind, "user");
    }

    #[test]
    fn test_catalog_rejects_unknown_flow() {
        let toml = r#"
            [[approvals]]
            id = "orphan"
            name = "Orphan"
            flow = "missing"
        "#;

        match Catalog::from_toml_str(toml).unwrap().into_templates() {
            Err(SignoffError::Configuration { reason }) => {
                assert!(reason.contains("unknown flow"), "unexpected reason: {reason}");
            }
            other => panic!("expected Configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_catalog_rejects_duplicate_ids() {
        let toml = r#"
            [[flows]]
            id = "procurement"
            name = "One"

            [[flows]]
            id = "procurement"
            name = "Two"
        "#;

        match Catalog::from_toml_str(toml).unwrap().into_templates() {
            Err(SignoffError::Configuration { reason }) => {
                assert!(reason.contains("duplicate flow id"), "unexpected reason: {reason}");
            }
            other => panic!("expected Configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_catalog_rejects_unknown_group() {
        let toml = r#"
            [[flows]]
            id = "f"
            name = "F"

            [[approvals]]
            id = "a"
            name = "A"
            flow = "f"

            [[approvals.statements]]
            id = "s"
            name = "S"
            is_default = true

            [[approvals.statements.components]]
            id = "c"
            level = 0
            name = "C"
            contributors = [{ kind = "group", approvable = "nobody" }]
        "#;

        match Catalog::from_toml_str(toml).unwrap().into_templates() {
            Err(SignoffError::Configuration { reason }) => {
                assert!(reason.contains("unknown group"), "unexpected reason: {reason}");
            }
            other => panic!("expected Configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_catalog_is_configuration_error() {
        match Catalog::from_toml_str("[[flows]]\nid = 42") {
            Err(SignoffError::Configuration { reason }) => {
                assert!(reason.contains("catalog TOML"), "unexpected reason: {reason}");
            }
            other => panic!("expected Configuration error, got {:?}", other),
        }
    }
}
