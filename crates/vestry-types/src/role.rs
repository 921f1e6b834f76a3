//! Role types and the privilege hierarchy

use serde::{Deserialize, Serialize};

/// Membership role, ordered from highest to lowest privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Platform operator; bypasses church scoping
    SystemAdmin,
    /// Administrator of a single church
    ChurchAdmin,
    /// Ministry or small-group leader
    Leader,
    /// Paid or volunteer staff
    Staff,
    /// Registered member
    Member,
    /// Guest with minimal access
    Visitor,
}

impl Role {
    /// Privilege order table, highest first. Index is the rank.
    pub const HIERARCHY: [Role; 6] = [
        Self::SystemAdmin,
        Self::ChurchAdmin,
        Self::Leader,
        Self::Staff,
        Self::Member,
        Self::Visitor,
    ];

    /// Position in [`Role::HIERARCHY`]; lower is more privileged.
    pub const fn rank(&self) -> usize {
        match self {
            Self::SystemAdmin => 0,
            Self::ChurchAdmin => 1,
            Self::Leader => 2,
            Self::Staff => 3,
            Self::Member => 4,
            Self::Visitor => 5,
        }
    }

    /// Whether this role grants at least the privileges of `required`.
    pub const fn satisfies(&self, required: Role) -> bool {
        self.rank() <= required.rank()
    }

    /// Whether this role skips church scoping checks.
    pub const fn bypasses_tenant_scope(&self) -> bool {
        matches!(self, Self::SystemAdmin)
    }

    /// Wire name of the role
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SystemAdmin => "system_admin",
            Self::ChurchAdmin => "church_admin",
            Self::Leader => "leader",
            Self::Staff => "staff",
            Self::Member => "member",
            Self::Visitor => "visitor",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::HIERARCHY
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| RoleParseError(s.to_string()))
    }
}

/// Error parsing a role string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid role: {0}")]
pub struct RoleParseError(pub String);
