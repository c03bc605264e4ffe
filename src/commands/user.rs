//! User management command handlers. All of them require `manageUsers`.

use crate::args::{AddUserArgs, UpdateUserArgs};
use crate::commands::{count, Out};
use crate::model::{Capability, User};
use crate::{Config, Result};
use anyhow::bail;

/// Handles `hotelflow user list`. Passwords and tokens are left out of the output.
pub async fn list_users(config: Config) -> Result<Out<Vec<User>>> {
    let app = config.open()?;
    app.require(Capability::ManageUsers)?;
    let users: Vec<User> = app.users().iter().cloned().map(redact).collect();
    let mut message = count(users.len(), "user");
    for u in &users {
        message.push_str(&format!(
            "\n{}  {}  {}  {}",
            u.id,
            u.username,
            u.role,
            u.display_name()
        ));
    }
    Ok(Out::new(message, users))
}

/// Handles `hotelflow user add`.
///
/// # Errors
/// - Returns an error if the username is empty or taken in any letter case.
pub async fn add_user(config: Config, args: AddUserArgs) -> Result<Out<User>> {
    let mut app = config.open()?;
    let mut user = User::from_preset(args.username().trim(), args.preset());
    user.password = args.password().map(str::to_string);
    user.full_name = args.full_name().map(str::to_string);
    user.email = args.email().map(str::to_string);
    app.add_user(user.clone())?;
    Ok(Out::new(
        format!(
            "Added {} '{}' with id {}",
            args.preset(),
            user.username,
            user.id
        ),
        redact(user),
    ))
}

/// Handles `hotelflow user update`. A preset replaces all permission flags and sets the role the
/// same way `user add` does, unless a role is also given.
///
/// # Errors
/// - Returns an error if there is no user with the given id or the new username is taken.
pub async fn update_user(config: Config, args: UpdateUserArgs) -> Result<Out<User>> {
    let mut app = config.open()?;
    let mut user = match app.users().get(args.id()) {
        Some(u) => u.clone(),
        None => bail!("User not found: {}", args.id()),
    };
    if let Some(username) = args.username() {
        user.username = username.trim().to_string();
    }
    if let Some(preset) = args.preset() {
        let template = User::from_preset(user.username.clone(), preset);
        user.permissions = template.permissions;
        user.role = template.role;
    }
    if let Some(role) = args.role() {
        user.role = role;
    }
    if let Some(password) = args.password() {
        user.password = Some(password.to_string());
    }
    if let Some(full_name) = args.full_name() {
        user.full_name = Some(full_name.to_string()).filter(|s| !s.is_empty());
    }
    if let Some(email) = args.email() {
        user.email = Some(email.to_string()).filter(|s| !s.is_empty());
    }
    let _ = app.update_user(user.clone())?;
    Ok(Out::new(format!("Updated user {}", user.id), redact(user)))
}

/// Handles `hotelflow user delete`. The user's projects and transactions are kept.
pub async fn delete_user(config: Config, id: &str) -> Result<Out<User>> {
    let mut app = config.open()?;
    match app.delete_user(id)? {
        Some(u) => Ok(Out::new(
            format!("Deleted user '{}'", u.username),
            redact(u),
        )),
        None => bail!("User not found: {id}"),
    }
}

fn redact(mut user: User) -> User {
    user.password = None;
    user.token = None;
    user
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::login;
    use crate::model::{PermissionPreset, Permissions, UserRole};
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_add_list_and_login() {
        let env = TestEnv::new().await;
        let _ = env.login_admin().await;
        let args = AddUserArgs::new("maria", PermissionPreset::Manager)
            .with_password("pw")
            .with_full_name("Maria Costa");
        let out = add_user(env.config(), args).await.unwrap();
        let added = out.structure().unwrap();
        assert_eq!(added.role, UserRole::Staff);
        assert!(added.password.is_none());

        let out = list_users(env.config()).await.unwrap();
        assert!(out.message().starts_with("2 users"));
        assert!(out.message().contains("Maria Costa"));

        let out = login(env.config(), "Maria", "pw").await.unwrap();
        assert_eq!(out.message(), "Welcome, Maria Costa");
    }

    #[tokio::test]
    async fn test_add_duplicate_username() {
        let env = TestEnv::new().await;
        let _ = env.login_admin().await;
        let err = add_user(env.config(), AddUserArgs::new("ADMIN", PermissionPreset::Staff))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already taken"));
    }

    #[tokio::test]
    async fn test_update_preset() {
        let env = TestEnv::new().await;
        let _ = env.login_admin().await;
        let out = add_user(env.config(), AddUserArgs::new("joao", PermissionPreset::Auditor))
            .await
            .unwrap();
        let id = out.structure().unwrap().id.clone();

        let args = UpdateUserArgs::new(&id)
            .with_preset(PermissionPreset::Administrator)
            .with_email("joao@example.com");
        let _ = update_user(env.config(), args).await.unwrap();
        let stored = env.app().users().get(&id).unwrap().clone();
        assert_eq!(stored.role, UserRole::Admin);
        assert_eq!(stored.permissions, Some(Permissions::FULL));
        assert_eq!(stored.email.as_deref(), Some("joao@example.com"));
    }

    #[tokio::test]
    async fn test_delete() {
        let env = TestEnv::new().await;
        env.seed().await;
        let out = add_user(env.config(), AddUserArgs::new("temp", PermissionPreset::Staff))
            .await
            .unwrap();
        let id = out.structure().unwrap().id.clone();
        let out = delete_user(env.config(), &id).await.unwrap();
        assert_eq!(out.message(), "Deleted user 'temp'");
        assert_eq!(env.app().transactions().len(), 2);

        let err = delete_user(env.config(), "1").await.unwrap_err();
        assert!(err.to_string().contains("own account"));
    }

    #[tokio::test]
    async fn test_requires_manage_users() {
        let env = TestEnv::new().await;
        let _ = env.login_admin().await;
        let _ = add_user(env.config(), AddUserArgs::new("clerk", PermissionPreset::Staff))
            .await
            .unwrap();
        let _ = login(env.config(), "clerk", "password123").await.unwrap();
        let err = list_users(env.config()).await.unwrap_err();
        assert!(err.to_string().contains("manageUsers"));
    }
}
