//! Access-control predicates attached to table actions.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The caller of an admin request, as established by whatever sits in front
/// of the engine (reverse proxy, session middleware, …).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Principal {
    pub user: Option<String>,
    pub roles: BTreeSet<String>,
}

impl Principal {
    /// A caller with no identity and no roles.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

/// Predicate deciding whether a [`Principal`] may perform an action.
///
/// An empty role set admits everyone; otherwise the principal needs at least
/// one of the listed roles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRule {
    #[serde(default)]
    pub any_of: BTreeSet<String>,
}

impl AccessRule {
    /// Rule admitting every caller.
    #[must_use]
    pub fn public() -> Self {
        Self::default()
    }

    /// Rule requiring one of the given roles.
    #[must_use]
    pub fn roles<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            any_of: roles.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn permits(&self, principal: &Principal) -> bool {
        self.any_of.is_empty() || self.any_of.iter().any(|role| principal.has_role(role))
    }
}
