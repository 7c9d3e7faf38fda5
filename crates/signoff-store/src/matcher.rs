//! Group-aware approver matching.

use tracing::debug;

use signoff_contracts::{
    error::SignoffResult,
    ids::{GroupId, PrincipalRef},
};
use signoff_core::traits::{ApproverMatcher, TemplateStore};

/// Matches a principal to an approvable directly, or through membership of
/// a group approvable.
///
/// Group members are bare principal ids of `member_kind`; a principal of any
/// other kind never matches through a group. Membership is looked up in the
/// template store on every call, so re-seeding a store changes who may act on
/// existing runs.
pub struct GroupMatcher<T: TemplateStore> {
    templates: T,
    member_kind: String,
}

impl<T: TemplateStore> GroupMatcher<T> {
    /// `member_kind` is normally the engine's `principal_kind`.
    pub fn new(templates: T, member_kind: impl Into<String>) -> Self {
        Self {
            templates,
            member_kind: member_kind.into(),
        }
    }
}

impl<T: TemplateStore> ApproverMatcher for GroupMatcher<T> {
    fn matches(&self, principal: &PrincipalRef, approvable: &PrincipalRef) -> SignoffResult<bool> {
        if principal == approvable {
            return Ok(true);
        }
        if !approvable.is_group() || principal.kind != self.member_kind {
            return Ok(false);
        }

        let members = self.templates.group_members(&GroupId::new(approvable.id.as_str()))?;
        let member = members.iter().any(|m| m == &principal.id);
        debug!(group = %approvable.id, principal = %principal, member, "group membership checked");
        Ok(member)
    }
}
