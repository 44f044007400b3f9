use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{ResourceKind, Role, UserId};

/// what a caller wants to do with a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessAction {
    Read,
    Write,
}

/// authenticated caller identity, resolved by the surrounding layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }
}

/// per-kind rule: which role writes, and whether reads are open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRule {
    pub writer: Role,
    /// open reads let any authenticated user view the resource;
    /// otherwise reads are owner-only
    pub open_read: bool,
}

/// authorization policy as a lookup table over the closed resource set
///
/// admins pass every check; everyone else is matched against the rule
/// for the resource kind plus an ownership comparison. a kind with no
/// rule is denied outright.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    rules: HashMap<ResourceKind, AccessRule>,
}

impl AccessPolicy {
    pub fn new(rules: impl IntoIterator<Item = (ResourceKind, AccessRule)>) -> Self {
        Self {
            rules: rules.into_iter().collect(),
        }
    }

    /// platform defaults: personnel curate the catalog (publicly
    /// readable), providers hold funds, customers hold loans and their
    /// amortization entries
    pub fn standard() -> Self {
        Self::new([
            (
                ResourceKind::FundType,
                AccessRule {
                    writer: Role::Personnel,
                    open_read: true,
                },
            ),
            (
                ResourceKind::LoanType,
                AccessRule {
                    writer: Role::Personnel,
                    open_read: true,
                },
            ),
            (
                ResourceKind::Fund,
                AccessRule {
                    writer: Role::Provider,
                    open_read: false,
                },
            ),
            (
                ResourceKind::Loan,
                AccessRule {
                    writer: Role::Customer,
                    open_read: false,
                },
            ),
            (
                ResourceKind::Entry,
                AccessRule {
                    writer: Role::Customer,
                    open_read: false,
                },
            ),
        ])
    }

    pub fn rule(&self, kind: ResourceKind) -> Option<AccessRule> {
        self.rules.get(&kind).copied()
    }

    /// policy decision for one actor/resource pair; `owner` is the
    /// stored owner of the resource (the actor itself at creation time)
    pub fn allows(
        &self,
        actor: &Actor,
        action: AccessAction,
        kind: ResourceKind,
        owner: UserId,
    ) -> bool {
        if actor.role == Role::Admin {
            return true;
        }

        let rule = match self.rule(kind) {
            Some(rule) => rule,
            None => return false,
        };

        match action {
            AccessAction::Read => rule.open_read || actor.user_id == owner,
            AccessAction::Write => actor.role == rule.writer && actor.user_id == owner,
        }
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::standard()
    }
}
