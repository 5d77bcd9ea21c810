//! Capability checks for gymdesk.
//!
//! Each role holds a fixed set of named capabilities. The table is compiled
//! in and cannot change at runtime. Lookups are fail-closed: an unknown role
//! or capability name never grants anything.

use std::fmt;
use std::str::FromStr;

use crate::db::Role;

/// Named capability checked independently of coarse role equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Read the audit log.
    ViewLogs,
    /// Export application data.
    ExportData,
    /// Create and manage accounts of any role.
    ManageUsers,
    /// Manage the professor's students.
    ManageStudents,
    /// Create and assign training plans.
    ManagePlans,
    /// View one's own assigned plans and progress.
    ViewOwnPlans,
}

impl Capability {
    /// Every known capability.
    pub const ALL: [Capability; 6] = [
        Capability::ViewLogs,
        Capability::ExportData,
        Capability::ManageUsers,
        Capability::ManageStudents,
        Capability::ManagePlans,
        Capability::ViewOwnPlans,
    ];

    /// Capability name as used by clients and configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ViewLogs => "canViewLogs",
            Capability::ExportData => "canExportData",
            Capability::ManageUsers => "canManageUsers",
            Capability::ManageStudents => "canManageStudents",
            Capability::ManagePlans => "canManagePlans",
            Capability::ViewOwnPlans => "canViewOwnPlans",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = ();

    /// Capability names are matched exactly.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .into_iter()
            .find(|cap| cap.as_str() == s)
            .ok_or(())
    }
}

/// Capabilities held by a role.
pub fn role_capabilities(role: Role) -> &'static [Capability] {
    match role {
        Role::Admin => &[
            Capability::ViewLogs,
            Capability::ExportData,
            Capability::ManageUsers,
        ],
        Role::Professor => &[Capability::ManageStudents, Capability::ManagePlans],
        Role::Student => &[Capability::ViewOwnPlans],
    }
}

impl Role {
    /// Whether this role holds `capability`.
    pub fn has(&self, capability: Capability) -> bool {
        role_capabilities(*self).contains(&capability)
    }
}

/// Whether the role named `role` holds the capability named `capability`.
///
/// # Examples
///
/// ```
/// use gymdesk::has_permission;
///
/// assert!(has_permission("ADMIN", "canViewLogs"));
/// assert!(!has_permission("PROFESSOR", "canExportData"));
/// assert!(!has_permission("JANITOR", "canViewLogs"));
/// assert!(!has_permission("ADMIN", "canLaunchRockets"));
/// ```
pub fn has_permission(role: &str, capability: &str) -> bool {
    let (Ok(role), Ok(capability)) = (role.parse::<Role>(), capability.parse::<Capability>())
    else {
        return false;
    };
    role.has(capability)
}
