use crate::model::{permissions, Permissions, Theme, User};
use crate::store::{Store, AUTH_KEY, THEME_KEY};
use crate::Result;
use tracing::debug;
use uuid::Uuid;

/// The currently authenticated user, if any, the permissions derived from that user, and the
/// theme preference.
///
/// The permissions are recomputed every time the user changes and are never read from storage on
/// their own.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Session {
    user: Option<User>,
    permissions: Permissions,
    theme: Theme,
}

impl Session {
    /// Restores the session and theme. A missing, malformed or nameless session record means
    /// nobody is logged in; a missing or unknown theme means the default theme.
    pub fn load(store: &Store) -> Self {
        let user = store
            .load(AUTH_KEY, || None::<User>)
            .filter(|u| !u.username.trim().is_empty());
        let theme = store.load(THEME_KEY, Theme::default);
        debug!(
            "Restored session for {}",
            user.as_ref().map(|u| u.username.as_str()).unwrap_or("nobody")
        );
        Self {
            permissions: permissions::resolve(user.as_ref()),
            user,
            theme,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn permissions(&self) -> Permissions {
        self.permissions
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub(crate) fn set_user(&mut self, store: &mut Store, user: User) -> Result<()> {
        store.save(AUTH_KEY, &user)?;
        self.permissions = permissions::resolve(Some(&user));
        self.user = Some(user);
        Ok(())
    }

    pub(crate) fn clear(&mut self, store: &mut Store) -> Result<()> {
        store.remove(AUTH_KEY)?;
        self.user = None;
        self.permissions = permissions::resolve(None);
        Ok(())
    }

    pub(crate) fn set_theme(&mut self, store: &mut Store, theme: Theme) -> Result<()> {
        store.save(THEME_KEY, &theme)?;
        self.theme = theme;
        Ok(())
    }
}

/// A fresh opaque session token.
pub(crate) fn generate_token() -> String {
    format!("session_{}", Uuid::new_v4().simple())
}
