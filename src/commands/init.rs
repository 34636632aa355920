use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the home directory, its backups subdirectory and an initial `config.json` file with
/// default settings.
///
/// # Arguments
/// - `home` - The directory that will be the root of the data directory, e.g. `$HOME/verbrauch`
///
/// # Errors
/// - Returns an error if any file operations fail.
pub async fn init(home: &Path) -> Result<Out<()>> {
    let config = Config::create(home)
        .await
        .context("Unable to create the data directory and config")?;
    Ok(format!(
        "Successfully created the verbrauch directory at {}",
        config.root().display()
    )
    .into())
}
