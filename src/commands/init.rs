use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Creates the data directory, an initial `config.json` with default settings, and the storage
/// directory.
///
/// # Arguments
/// - `hotelflow_home` - The directory that will be the root of data directory, e.g.
///   `$HOME/hotelflow`
///
/// # Errors
/// - Returns an error if the directory has already been initialized or any file operation fails.
pub async fn init(hotelflow_home: &Path) -> Result<Out<PathBuf>> {
    let config = Config::create(hotelflow_home)
        .await
        .context("Unable to create the data directory and configs")?;
    Ok(Out::new(
        format!(
            "Successfully created the hotelflow directory at {}",
            config.root().display()
        ),
        config.root().to_path_buf(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("hf");
        let out = init(&home).await.unwrap();
        assert!(out.message().contains("Successfully created"));
        assert!(home.join("config.json").is_file());
        assert!(home.join("storage").is_dir());

        assert!(init(&home).await.is_err());
    }
}
