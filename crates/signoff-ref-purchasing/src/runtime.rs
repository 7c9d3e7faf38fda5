//! Engine wiring shared by every scenario.

use tracing::info;

use signoff_contracts::{config::EngineConfig, error::SignoffResult};
use signoff_core::ApprovalEngine;
use signoff_policy::{Catalog, ConditionalSelector};
use signoff_store::{GroupMatcher, InMemoryStore};

/// The purchasing catalog, embedded at compile time.
pub const PURCHASING_CATALOG: &str = include_str!("../catalogs/purchasing.toml");

/// A store seeded with the purchasing catalog and an engine over it.
pub struct Runtime {
    pub store: InMemoryStore,
    pub engine: ApprovalEngine,
}

impl Runtime {
    pub fn new(config: EngineConfig) -> SignoffResult<Self> {
        let templates = Catalog::from_toml_str(PURCHASING_CATALOG)?.into_templates()?;
        let store = InMemoryStore::with_templates(templates)?;
        let member_kind = config.principal_kind.clone();

        let engine = ApprovalEngine::new(
            Box::new(store.clone()),
            Box::new(store.clone()),
            Box::new(ConditionalSelector::new()),
            config,
        )
        .with_matcher(Box::new(GroupMatcher::new(store.clone(), member_kind)));

        info!(
            principal_kind = %engine.config().principal_kind,
            excluded = ?engine.config().excluded_subject_types,
            "purchasing runtime ready"
        );
        Ok(Self { store, engine })
    }
}
