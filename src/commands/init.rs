use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Creates the kakeibo home directory along with:
/// - an initial `config.json` with default settings
/// - an empty store document
///
/// # Arguments
/// - `kakeibo_home` - The directory that will be the root of the data directory, e.g.
///   `$HOME/kakeibo`
///
/// # Errors
/// - Returns an error if any file operations fail.
pub async fn init(kakeibo_home: &Path) -> Result<Out<PathBuf>> {
    let config = Config::create(kakeibo_home)
        .await
        .context("Unable to create the data directory and configs")?;
    Ok(Out::new(
        format!(
            "Successfully created the kakeibo directory at {}",
            config.root().display()
        ),
        config.store_path(),
    ))
}
