//! TOML template catalogs.
//!
//! A catalog declares everything an administrator edits: flows and their
//! subject bindings, approvals with their statements, components and
//! contributors, and approver groups. Statements are nested under their
//! approval and keep declaration order, which becomes the selection order.
//!
//! Example:
//! ```toml
//! [[flows]]
//! id = "procurement"
//! name = "Procurement"
//! bindings = [{ name = "Purchase orders", subject_type = "purchase_order" }]
//!
//! [[approvals]]
//! id = "po-approval"
//! name = "Purchase order approval"
//! flow = "procurement"
//! level_mode = "sequential"
//!
//! [[approvals.statements]]
//! id = "standard"
//! name = "Standard orders"
//! is_default = true
//!
//! [[approvals.statements.components]]
//! id = "standard-manager"
//! level = 0
//! name = "Manager"
//! mode = "or"
//! contributors = [{ approvable = "u-manager" }]
//! ```

use std::{collections::HashSet, path::Path};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use signoff_contracts::{
    error::{SignoffError, SignoffResult},
    ids::{
        ApprovalId, ComponentId, ContributorId, FlowId, GroupId, PrincipalRef, StatementId,
    },
    template::{
        Approval, Component, Condition, Contributor, ContributorMode, Flow, FlowBinding, Group,
        LevelMode, Statement, Templates,
    },
};

// ── Catalog schema ────────────────────────────────────────────────────────────

/// Top-level catalog document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub flows: Vec<FlowEntry>,
    #[serde(default)]
    pub approvals: Vec<ApprovalEntry>,
    #[serde(default)]
    pub groups: Vec<GroupEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub bindings: Vec<FlowBinding>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalEntry {
    pub id: String,
    pub name: String,
    /// Id of the flow this approval belongs to.
    pub flow: String,
    #[serde(default)]
    pub level_mode: LevelMode,
    #[serde(default)]
    pub statements: Vec<StatementEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub components: Vec<ComponentEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentEntry {
    pub id: String,
    pub level: u32,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    #[serde(default)]
    pub mode: ContributorMode,
    #[serde(default)]
    pub contributors: Vec<ContributorEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributorEntry {
    /// Defaults to `<component id>#<position>`.
    pub id: Option<String>,
    /// Principal kind of the approvable; `"group"` refers to a catalog group.
    #[serde(default = "default_kind")]
    pub kind: String,
    /// Id of the approvable.
    pub approvable: String,
    /// Reserved payload, carried through untouched.
    pub conditions: Option<serde_json::Value>,
}

fn default_kind() -> String {
    "user".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub members: Vec<String>,
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl Catalog {
    /// Parse a catalog from a TOML string.
    ///
    /// Returns `SignoffError::Configuration` if the TOML is malformed or does
    /// not match the catalog schema. Cross-references are checked later by
    /// `into_templates`.
    pub fn from_toml_str(s: &str) -> SignoffResult<Self> {
        toml::from_str(s).map_err(|e| SignoffError::Configuration {
            reason: format!("failed to parse catalog TOML: {}", e),
        })
    }

    pub fn from_file(path: &Path) -> SignoffResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| SignoffError::Configuration {
            reason: format!("failed to read catalog file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Validate the catalog and flatten it into template entities.
    ///
    /// Fails with `SignoffError::Configuration` on duplicate ids of any entity
    /// kind, an approval naming an unknown flow, or a group contributor naming
    /// an unknown group.
    pub fn into_templates(self) -> SignoffResult<Templates> {
        let mut templates = Templates::default();

        let mut flow_ids = Ids::new("flow");
        for entry in self.flows {
            flow_ids.insert(&entry.id)?;
            templates.flows.push(Flow {
                id: FlowId::new(entry.id),
                name: entry.name,
                bindings: entry.bindings,
            });
        }

        let mut group_ids = Ids::new("group");
        for entry in self.groups {
            group_ids.insert(&entry.id)?;
            templates.groups.push(Group {
                id: GroupId::new(entry.id),
                name: entry.name,
                members: entry.members,
            });
        }

        let mut approval_ids = Ids::new("approval");
        let mut statement_ids = Ids::new("statement");
        let mut component_ids = Ids::new("component");
        let mut contributor_ids = Ids::new("contributor");

        for entry in self.approvals {
            approval_ids.insert(&entry.id)?;
            if !flow_ids.contains(&entry.flow) {
                return Err(SignoffError::configuration(format!(
                    "approval '{}' refers to unknown flow '{}'",
                    entry.id, entry.flow
                )));
            }

            let approval_id = ApprovalId::new(entry.id);
            let defaults = entry.statements.iter().filter(|s| s.is_default).count();
            if defaults > 1 {
                warn!(approval_id = %approval_id, defaults, "approval declares more than one default statement");
            }

            for statement in entry.statements {
                statement_ids.insert(&statement.id)?;
                let statement_id = StatementId::new(statement.id);

                for component in statement.components {
                    component_ids.insert(&component.id)?;

                    let mut contributors = Vec::with_capacity(component.contributors.len());
                    for (position, contributor) in component.contributors.into_iter().enumerate() {
                        let id = contributor
                            .id
                            .unwrap_or_else(|| format!("{}#{}", component.id, position));
                        contributor_ids.insert(&id)?;

                        let approvable = PrincipalRef::new(contributor.kind, contributor.approvable);
                        if approvable.is_group() && !group_ids.contains(&approvable.id) {
                            return Err(SignoffError::configuration(format!(
                                "contributor '{}' refers to unknown group '{}'",
                                id, approvable.id
                            )));
                        }

                        contributors.push(Contributor {
                            id: ContributorId::new(id),
                            approvable,
                            conditions: contributor.conditions,
                        });
                    }

                    templates.components.push(Component {
                        id: ComponentId::new(component.id),
                        statement_id: statement_id.clone(),
                        level: component.level,
                        name: component.name,
                        description: component.description,
                        color: component.color,
                        mode: component.mode,
                        contributors,
                    });
                }

                templates.statements.push(Statement {
                    id: statement_id,
                    approval_id: approval_id.clone(),
                    name: statement.name,
                    is_default: statement.is_default,
                    conditions: statement.conditions,
                });
            }

            templates.approvals.push(Approval {
                id: approval_id,
                name: entry.name,
                flow_id: FlowId::new(entry.flow),
                level_mode: entry.level_mode,
            });
        }

        debug!(
            flows = templates.flows.len(),
            approvals = templates.approvals.len(),
            statements = templates.statements.len(),
            components = templates.components.len(),
            groups = templates.groups.len(),
            "catalog validated"
        );

        Ok(templates)
    }
}

/// Seen-set for one id namespace.
struct Ids {
    kind: &'static str,
    seen: HashSet<String>,
}

impl Ids {
    fn new(kind: &'static str) -> Self {
        Self {
            kind,
            seen: HashSet::new(),
        }
    }

    fn insert(&mut self, id: &str) -> SignoffResult<()> {
        if !self.seen.insert(id.to_string()) {
            return Err(SignoffError::configuration(format!(
                "duplicate {} id '{}' in catalog",
                self.kind, id
            )));
        }
        Ok(())
    }

    fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }
}
