use crate::commands::Out;
use crate::model::Theme;
use crate::{Config, Result};

/// Handles `hotelflow theme get`.
pub async fn get_theme(config: Config) -> Result<Out<Theme>> {
    let theme = config.open()?.theme();
    Ok(Out::new(format!("The theme is {}", theme.label()), theme))
}

/// Handles `hotelflow theme set`. No login is needed.
pub async fn set_theme(config: Config, theme: Theme) -> Result<Out<Theme>> {
    let mut app = config.open()?;
    app.set_theme(theme)?;
    Ok(Out::new(
        format!("Switched the theme to {}", theme.label()),
        theme,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_theme_round_trip() {
        let env = TestEnv::new().await;
        let out = get_theme(env.config()).await.unwrap();
        assert_eq!(out.structure(), Some(&Theme::Emerald));

        let _ = set_theme(env.config(), Theme::Gold).await.unwrap();
        let out = get_theme(env.config()).await.unwrap();
        assert_eq!(out.structure(), Some(&Theme::Gold));
    }
}
