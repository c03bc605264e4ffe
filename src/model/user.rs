use crate::model::{permissions, Item, Items, PermissionPreset, Permissions};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The users collection.
pub type Users = Items<User>;

/// The id of the bootstrap administrator.
pub const BOOTSTRAP_ADMIN_ID: &str = "1";
/// The username of the bootstrap administrator.
pub const BOOTSTRAP_ADMIN_USERNAME: &str = "admin";
/// The password of the bootstrap administrator, and the password accepted for any account that
/// has no password of its own.
pub const DEFAULT_PASSWORD: &str = "password123";

#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Admin,
    Staff,
    #[default]
    Viewer,
}

serde_plain::derive_display_from_serialize!(UserRole);
serde_plain::derive_fromstr_from_deserialize!(UserRole);

/// An account. Passwords are stored as given; this is a local mock of authentication, not a
/// security boundary.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    #[serde(
        default,
        deserialize_with = "permissions::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub permissions: Option<Permissions>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl User {
    /// A user created now, with no password and no permissions record.
    pub fn new(id: impl Into<String>, username: impl Into<String>, role: UserRole) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            password: None,
            role,
            permissions: None,
            created_at: Utc::now(),
            email: None,
            full_name: None,
            token: None,
        }
    }

    /// A new account with a fresh id and the flags of `preset`. Presets that can manage users
    /// make an `ADMIN`, all others a `STAFF` account.
    pub fn from_preset(username: impl Into<String>, preset: PermissionPreset) -> Self {
        let permissions = preset.permissions();
        let role = if permissions.manage_users {
            UserRole::Admin
        } else {
            UserRole::Staff
        };
        Self {
            permissions: Some(permissions),
            ..User::new(generate_id(), username, role)
        }
    }

    /// The administrator that exists when no users have been stored.
    pub fn bootstrap_admin() -> Self {
        Self {
            password: Some(DEFAULT_PASSWORD.to_string()),
            permissions: Some(Permissions::FULL),
            full_name: Some("Master Admin".to_string()),
            ..User::new(BOOTSTRAP_ADMIN_ID, BOOTSTRAP_ADMIN_USERNAME, UserRole::Admin)
        }
    }

    /// Case-insensitive username comparison.
    pub fn has_username(&self, username: &str) -> bool {
        self.username.to_lowercase() == username.to_lowercase()
    }

    /// The name to greet the user by.
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.username)
    }
}

impl Item for User {
    const KIND: &'static str = "user";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Generates a short random id for a new record.
pub(crate) fn generate_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(12);
    id
}
