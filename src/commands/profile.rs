//! Handlers for changing your own account.

use crate::args::{PasswordArgs, UpdateProfileArgs};
use crate::commands::Out;
use crate::model::User;
use crate::{Config, Result};
use anyhow::ensure;

/// Handles `hotelflow profile update`. Only needs a login.
pub async fn update_profile(config: Config, args: UpdateProfileArgs) -> Result<Out<User>> {
    ensure!(
        args.full_name().is_some() || args.email().is_some(),
        "Nothing to update, pass --full-name or --email"
    );
    let mut app = config.open()?;
    let mut user = app.update_profile(
        args.full_name().map(str::to_string),
        args.email().map(str::to_string),
    )?;
    user.password = None;
    Ok(Out::new("Profile updated", user))
}

/// Handles `hotelflow profile password`.
///
/// # Errors
/// - Returns `Passwords do not match.` when the confirmation differs.
pub async fn change_password(config: Config, args: PasswordArgs) -> Result<Out<()>> {
    let mut app = config.open()?;
    let _ = app.change_password(args.password(), args.confirm())?;
    Ok("Password changed".into())
}
