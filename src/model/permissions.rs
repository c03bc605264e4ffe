//! The flat capability map that gates every mutating operation, and how it is resolved for a
//! (possibly absent) user.
//!
//! Stored permission records are never trusted as typed: each flag is coerced to a boolean when
//! read, with absent or falsy values becoming `false`.

use crate::model::User;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One capability flag.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    ViewProjects,
    AddProjects,
    EditProjects,
    DeleteProjects,
    ViewTransactions,
    AddTransactions,
    EditTransactions,
    DeleteTransactions,
    ManageUsers,
}

serde_plain::derive_display_from_serialize!(Capability);
serde_plain::derive_fromstr_from_deserialize!(Capability);

/// The capability flags of one user.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    #[serde(default, deserialize_with = "truthy")]
    pub view_projects: bool,
    #[serde(default, deserialize_with = "truthy")]
    pub add_projects: bool,
    #[serde(default, deserialize_with = "truthy")]
    pub edit_projects: bool,
    #[serde(default, deserialize_with = "truthy")]
    pub delete_projects: bool,
    #[serde(default, deserialize_with = "truthy")]
    pub view_transactions: bool,
    #[serde(default, deserialize_with = "truthy")]
    pub add_transactions: bool,
    #[serde(default, deserialize_with = "truthy")]
    pub edit_transactions: bool,
    #[serde(default, deserialize_with = "truthy")]
    pub delete_transactions: bool,
    #[serde(default, deserialize_with = "truthy")]
    pub manage_users: bool,
}

impl Permissions {
    /// Every capability.
    pub const FULL: Permissions = Permissions {
        view_projects: true,
        add_projects: true,
        edit_projects: true,
        delete_projects: true,
        view_transactions: true,
        add_transactions: true,
        edit_transactions: true,
        delete_transactions: true,
        manage_users: true,
    };

    /// May look at projects and transactions, may change nothing.
    pub const READ_ONLY: Permissions = Permissions {
        view_projects: true,
        add_projects: false,
        edit_projects: false,
        delete_projects: false,
        view_transactions: true,
        add_transactions: false,
        edit_transactions: false,
        delete_transactions: false,
        manage_users: false,
    };

    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::ViewProjects => self.view_projects,
            Capability::AddProjects => self.add_projects,
            Capability::EditProjects => self.edit_projects,
            Capability::DeleteProjects => self.delete_projects,
            Capability::ViewTransactions => self.view_transactions,
            Capability::AddTransactions => self.add_transactions,
            Capability::EditTransactions => self.edit_transactions,
            Capability::DeleteTransactions => self.delete_transactions,
            Capability::ManageUsers => self.manage_users,
        }
    }

    /// The granted capabilities, in declaration order.
    pub fn granted(&self) -> Vec<Capability> {
        ALL_CAPABILITIES
            .iter()
            .copied()
            .filter(|c| self.allows(*c))
            .collect()
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Permissions::READ_ONLY
    }
}

const ALL_CAPABILITIES: [Capability; 9] = [
    Capability::ViewProjects,
    Capability::AddProjects,
    Capability::EditProjects,
    Capability::DeleteProjects,
    Capability::ViewTransactions,
    Capability::AddTransactions,
    Capability::EditTransactions,
    Capability::DeleteTransactions,
    Capability::ManageUsers,
];

/// Resolves the effective permissions of `user`. No user, or a user without a permissions
/// record, gets [`Permissions::READ_ONLY`].
pub fn resolve(user: Option<&User>) -> Permissions {
    user.and_then(|u| u.permissions)
        .unwrap_or(Permissions::READ_ONLY)
}

/// The access-level presets offered when creating an account.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
pub enum PermissionPreset {
    Administrator,
    Manager,
    #[default]
    Staff,
    Auditor,
}

serde_plain::derive_display_from_serialize!(PermissionPreset);
serde_plain::derive_fromstr_from_deserialize!(PermissionPreset);

impl PermissionPreset {
    pub fn permissions(&self) -> Permissions {
        match self {
            PermissionPreset::Administrator => Permissions::FULL,
            PermissionPreset::Manager => Permissions {
                delete_projects: false,
                delete_transactions: false,
                manage_users: false,
                ..Permissions::FULL
            },
            PermissionPreset::Staff => Permissions {
                add_transactions: true,
                ..Permissions::READ_ONLY
            },
            PermissionPreset::Auditor => Permissions::READ_ONLY,
        }
    }
}

/// Reads any JSON value and reduces it to a boolean the way a loosely typed client would:
/// `null`, `false`, `0`, `NaN` and `""` are false, everything else is true.
fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(is_truthy(&value))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Deserializes an optional permissions record, treating anything that is not an object as
/// absent rather than failing the enclosing record.
pub(crate) fn lenient<'de, D>(deserializer: D) -> Result<Option<Permissions>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Object(_) => Ok(Permissions::deserialize(value).ok()),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UserRole;

    fn user_with(permissions: Option<Permissions>) -> User {
        User {
            permissions,
            ..User::new("u1", "maria", UserRole::Staff)
        }
    }

    #[test]
    fn test_resolve_no_user_is_read_only() {
        assert_eq!(resolve(None), Permissions::READ_ONLY);
    }

    #[test]
    fn test_resolve_null_permissions_is_read_only() {
        let json = r#"{"id":"2","username":"maria","role":"STAFF","permissions":null,"createdAt":"2024-01-01T00:00:00Z"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        let perms = resolve(Some(&user));
        assert!(perms.view_projects);
        assert!(perms.view_transactions);
        assert_eq!(
            perms.granted(),
            vec![Capability::ViewProjects, Capability::ViewTransactions]
        );
    }

    #[test]
    fn test_resolve_uses_stored_permissions() {
        let user = user_with(Some(Permissions::FULL));
        assert_eq!(resolve(Some(&user)), Permissions::FULL);
    }

    #[test]
    fn test_flags_are_coerced() {
        let json = r#"{"viewProjects":"yes","addProjects":1,"editProjects":0,"deleteProjects":"",
            "viewTransactions":[],"addTransactions":null,"manageUsers":{"x":1}}"#;
        let perms: Permissions = serde_json::from_str(json).unwrap();
        assert!(perms.view_projects);
        assert!(perms.add_projects);
        assert!(!perms.edit_projects);
        assert!(!perms.delete_projects);
        assert!(perms.view_transactions);
        assert!(!perms.add_transactions);
        assert!(!perms.edit_transactions);
        assert!(!perms.delete_transactions);
        assert!(perms.manage_users);
    }

    #[test]
    fn test_non_object_permissions_are_absent() {
        let json = r#"{"id":"2","username":"maria","permissions":"admin","createdAt":"2024-01-01T00:00:00Z"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(user.permissions.is_none());
        assert_eq!(resolve(Some(&user)), Permissions::READ_ONLY);
    }

    #[test]
    fn test_presets() {
        assert_eq!(
            PermissionPreset::Administrator.permissions(),
            Permissions::FULL
        );
        let manager = PermissionPreset::Manager.permissions();
        assert!(manager.edit_projects && !manager.delete_projects && !manager.manage_users);
        let staff = PermissionPreset::Staff.permissions();
        assert_eq!(
            staff.granted(),
            vec![
                Capability::ViewProjects,
                Capability::ViewTransactions,
                Capability::AddTransactions
            ]
        );
        assert_eq!(
            PermissionPreset::Auditor.permissions(),
            Permissions::READ_ONLY
        );
    }

    #[test]
    fn test_capability_names() {
        assert_eq!(Capability::DeleteTransactions.to_string(), "deleteTransactions");
        assert_eq!(Capability::ManageUsers.to_string(), "manageUsers");
    }
}
