//! Session command handlers.
//!
//! - `hotelflow login` - Start a session
//! - `hotelflow logout` - End it
//! - `hotelflow whoami` - Describe it

use crate::commands::Out;
use crate::model::{Capability, Theme, User};
use crate::{Config, Result};
use serde::Serialize;

/// What `whoami` reports.
#[derive(Debug, Clone, Serialize)]
pub struct WhoAmI {
    pub user: Option<User>,
    pub permissions: Vec<Capability>,
    pub theme: Theme,
}

/// Handles `hotelflow login`. On success the session is stored so that later commands run as
/// this user.
///
/// # Errors
/// Returns the same vague error for an unknown username and a wrong password.
pub async fn login(config: Config, username: &str, password: &str) -> Result<Out<User>> {
    let mut app = config.open()?;
    let mut user = app.login(username, password).await?;
    user.password = None;
    Ok(Out::new(
        format!("Welcome, {}", user.display_name()),
        user,
    ))
}

/// Handles `hotelflow logout`.
pub async fn logout(config: Config) -> Result<Out<()>> {
    let mut app = config.open()?;
    let was = app.user().map(|u| u.username.clone());
    app.logout()?;
    Ok(match was {
        Some(username) => format!("Logged out '{username}'").into(),
        None => "Nobody was logged in".into(),
    })
}

/// Handles `hotelflow whoami`.
pub async fn whoami(config: Config) -> Result<Out<WhoAmI>> {
    let app = config.open()?;
    let mut user = app.user().cloned();
    if let Some(u) = user.as_mut() {
        u.password = None;
    }
    let permissions = app.permissions().granted();
    let message = match &user {
        Some(u) => format!(
            "Logged in as '{}' ({}) with {}",
            u.username,
            u.role,
            permissions
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ),
        None => "Not logged in".to_string(),
    };
    Ok(Out::new(
        message,
        WhoAmI {
            user,
            permissions,
            theme: app.theme(),
        },
    ))
}
