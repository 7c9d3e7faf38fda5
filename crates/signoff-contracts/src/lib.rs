//! # signoff-contracts
//!
//! Shared types for the signoff approval engine.
//!
//! All crates in the workspace import from here. No decision logic lives in
//! this crate: only identifiers, template and run entities, configuration,
//! and error types.

pub mod config;
pub mod error;
pub mod ids;
pub mod run;
pub mod template;

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use config::EngineConfig;
    use error::SignoffError;
    use ids::{PrincipalRef, RunId, SubjectRef};
    use run::{Disposition, Dispositions, RunStatus};
    use template::{ContributorMode, LevelMode};

    // ── Dispositions ─────────────────────────────────────────────────────────

    #[test]
    fn test_dispositions_default_is_pending() {
        let d = Dispositions::default();
        assert!(d.is_pending());
        assert!(!d.is_closed());
        assert_eq!(d.state(), Disposition::Pending);
    }

    #[test]
    fn test_rollback_alone_is_not_closed() {
        let d = Dispositions {
            rollback_at: Some(Utc::now()),
            ..Dispositions::default()
        };
        assert!(!d.is_pending());
        assert!(!d.is_closed());
        assert_eq!(d.state(), Disposition::RolledBack);
    }

    #[test]
    fn test_simultaneous_flags_project_by_priority() {
        let now = Utc::now();
        let mut d = Dispositions {
            approved_at: Some(now),
            rejected_at: Some(now),
            ..Dispositions::default()
        };
        // Both stay set; the projection picks rejection.
        assert!(d.approved_at.is_some());
        assert_eq!(d.state(), Disposition::Rejected);

        d.rejected_at = None;
        d.canceled_at = Some(now);
        assert_eq!(d.state(), Disposition::Canceled);

        d.clear();
        assert!(d.is_pending());
    }

    // ── Serde names ──────────────────────────────────────────────────────────

    #[test]
    fn test_mode_names_are_lowercase() {
        assert_eq!(serde_json::to_string(&LevelMode::Sequential).unwrap(), "\"sequential\"");
        assert_eq!(serde_json::to_string(&ContributorMode::Or).unwrap(), "\"or\"");
        assert_eq!(serde_json::to_string(&RunStatus::Rollback).unwrap(), "\"ROLLBACK\"");
    }

    // ── Identifiers ──────────────────────────────────────────────────────────

    #[test]
    fn test_run_ids_are_unique() {
        let ids: std::collections::HashSet<RunId> = (0..100).map(|_| RunId::new()).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn test_refs_display_as_pairs() {
        assert_eq!(SubjectRef::new("purchase_order", "po-7").to_string(), "purchase_order/po-7");
        assert_eq!(PrincipalRef::new("user", "u1").to_string(), "user:u1");
    }

    // ── EngineConfig ─────────────────────────────────────────────────────────

    #[test]
    fn test_config_defaults_apply_to_empty_document() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.principal("u1"), PrincipalRef::new("user", "u1"));
    }

    #[test]
    fn test_config_reads_exclusions() {
        let config = EngineConfig::from_toml_str(
            r#"
            principal_kind = "employee"
            excluded_subject_types = ["archived_invoice"]
            "#,
        )
        .unwrap();

        assert!(config.is_excluded("archived_invoice"));
        assert!(!config.is_excluded("purchase_order"));
        assert_eq!(config.principal("e9").kind, "employee");
    }

    #[test]
    fn test_config_parse_error_is_configuration() {
        match EngineConfig::from_toml_str("principal_kind = [") {
            Err(SignoffError::Configuration { reason }) => {
                assert!(reason.contains("engine config"), "unexpected reason: {reason}");
            }
            other => panic!("expected Configuration error, got {:?}", other),
        }
    }

    // ── Error display ────────────────────────────────────────────────────────

    #[test]
    fn test_error_messages_carry_reason() {
        let msg = SignoffError::precondition("run already approved").to_string();
        assert!(msg.contains("precondition failed"));
        assert!(msg.contains("run already approved"));

        let msg = SignoffError::not_found("no run for po/1").to_string();
        assert!(msg.contains("not found"));

        let msg = SignoffError::store("lock poisoned").to_string();
        assert!(msg.contains("store error"));
    }
}
