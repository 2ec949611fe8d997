//! Admin actions a table may permit.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An operation the admin surface can perform on a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    List,
    Detail,
    Create,
    Edit,
    Delete,
    Export,
}

impl Action {
    /// Every action, in display order.
    pub const ALL: [Self; 6] = [
        Self::List,
        Self::Detail,
        Self::Create,
        Self::Edit,
        Self::Delete,
        Self::Export,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Detail => "detail",
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::Export => "export",
        }
    }

    /// Whether the action changes stored data.
    #[must_use]
    pub fn is_write(self) -> bool {
        matches!(self, Self::Create | Self::Edit | Self::Delete)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown action name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action {0:?}")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}
