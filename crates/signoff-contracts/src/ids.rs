//! Identifiers and polymorphic references.
//!
//! Template entities are keyed by administrator-chosen string ids (they are
//! declared in catalogs and referenced by name). Run-scoped entities are keyed
//! by UUIDs minted at materialization time.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub uuid::Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

string_id!(
    /// Identifier of a Flow template.
    FlowId
);
string_id!(
    /// Identifier of an Approval ruleset.
    ApprovalId
);
string_id!(
    /// Identifier of a Statement (branch) within an Approval.
    StatementId
);
string_id!(
    /// Identifier of a Component (step) template.
    ComponentId
);
string_id!(
    /// Identifier of a Contributor template.
    ContributorId
);
string_id!(
    /// Identifier of an approver group.
    GroupId
);

uuid_id!(
    /// Identifier of a Run (one per subject).
    RunId
);
uuid_id!(
    /// Identifier of a run-scoped copy of a Component.
    RunComponentId
);
uuid_id!(
    /// Identifier of a run-scoped copy of a Contributor.
    RunContributorId
);

/// The entity that requires sign-off, addressed as a (type, id) pair.
///
/// Example: `SubjectRef::new("purchase_order", "po-1042")`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubjectRef {
    pub subject_type: String,
    pub subject_id: String,
}

impl SubjectRef {
    pub fn new(subject_type: impl Into<String>, subject_id: impl Into<String>) -> Self {
        Self {
            subject_type: subject_type.into(),
            subject_id: subject_id.into(),
        }
    }
}

impl fmt::Display for SubjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.subject_type, self.subject_id)
    }
}

/// A principal-capable entity: a single identity, a group, or any other kind
/// the hosting application registers. Matching is on the full (kind, id) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PrincipalRef {
    pub kind: String,
    pub id: String,
}

impl PrincipalRef {
    /// Kind tag of a group approvable; its id is a `GroupId`.
    pub const GROUP_KIND: &'static str = "group";

    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }

    pub fn group(id: impl Into<String>) -> Self {
        Self::new(Self::GROUP_KIND, id)
    }

    pub fn is_group(&self) -> bool {
        self.kind == Self::GROUP_KIND
    }
}

impl fmt::Display for PrincipalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}
