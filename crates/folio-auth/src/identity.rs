//! The authenticated principal and its capability set.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Role carried in tokens and sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full control over the portfolio content.
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// A single capability on portfolio resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "read:projects")]
    ReadProjects,
    #[serde(rename = "write:projects")]
    WriteProjects,
    #[serde(rename = "delete:projects")]
    DeleteProjects,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ReadProjects => "read:projects",
            Permission::WriteProjects => "write:projects",
            Permission::DeleteProjects => "delete:projects",
        }
    }
}

/// Fixed capability set attached to an identity once, at session creation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(Vec<Permission>);

impl PermissionSet {
    /// Builds a set, dropping duplicates and keeping a stable order.
    pub fn new(permissions: impl IntoIterator<Item = Permission>) -> Self {
        let mut permissions: Vec<Permission> = permissions.into_iter().collect();
        permissions.sort();
        permissions.dedup();
        Self(permissions)
    }

    /// Every capability the admin role grants.
    pub fn admin() -> Self {
        Self::new([
            Permission::ReadProjects,
            Permission::WriteProjects,
            Permission::DeleteProjects,
        ])
    }

    pub fn contains(&self, permission: Permission) -> bool {
        self.0.contains(&permission)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable identity id (`"admin"` for the built-in account).
    pub id: String,
    pub email: String,
    pub role: Role,
    pub permissions: PermissionSet,
}
