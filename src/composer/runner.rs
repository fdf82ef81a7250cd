//! Running Composer and PHP scripts with a resolved interpreter

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::process::Command;
use tracing::{debug, info};

use crate::composer::error::ComposerError;
use crate::config::{COMPOSER_PHAR, DOWNLOADS_DIR};
use crate::php::downloader::Downloader;

/// Make sure `composer.phar` exists in `data_dir`, downloading it if needed
pub async fn ensure_composer(
    downloader: &dyn Downloader,
    url: &str,
    data_dir: &Path,
) -> Result<PathBuf, ComposerError> {
    let phar = data_dir.join(COMPOSER_PHAR);
    if phar.is_file() {
        debug!(?phar, "Composer already present");
        return Ok(phar);
    }

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let staged = data_dir
        .join(DOWNLOADS_DIR)
        .join(format!("{COMPOSER_PHAR}-{}-{nanos}", std::process::id()));

    info!(%url, "Downloading Composer");
    downloader.fetch(url, &staged).await?;

    if let Err(e) = std::fs::rename(&staged, &phar) {
        let _ = std::fs::remove_file(&staged);
        if !phar.is_file() {
            return Err(e.into());
        }
    }

    Ok(phar)
}

/// `php composer.phar install --no-interaction` inside `workspace`
pub async fn composer_install(
    php: &Path,
    composer_phar: &Path,
    workspace: &Path,
) -> Result<(), ComposerError> {
    info!(?workspace, "Installing dependencies with Composer");

    let status = Command::new(php)
        .arg(composer_phar)
        .args(["install", "--no-interaction"])
        .current_dir(workspace)
        .stdin(Stdio::null())
        .status()
        .await
        .map_err(|source| ComposerError::Spawn {
            program: php.to_path_buf(),
            source,
        })?;

    if !status.success() {
        return Err(ComposerError::Failed {
            command: "composer install".to_string(),
            code: status.code(),
        });
    }

    Ok(())
}

/// Path of a Composer bin script installed in `workspace`
pub fn bin_script(workspace: &Path, name: &str) -> Result<PathBuf, ComposerError> {
    let script = workspace.join("vendor").join("bin").join(name);
    if script.is_file() {
        Ok(script)
    } else {
        Err(ComposerError::ScriptNotFound(script))
    }
}

/// Run `script` with `php`, inheriting stdio, and return its exit code
pub async fn run_php(php: &Path, script: &Path, args: &[String]) -> Result<i32, ComposerError> {
    debug!(?php, ?script, ?args, "Running PHP script");

    let status = Command::new(php)
        .arg(script)
        .args(args)
        .status()
        .await
        .map_err(|source| ComposerError::Spawn {
            program: php.to_path_buf(),
            source,
        })?;

    // terminated by a signal
    Ok(status.code().unwrap_or(1))
}
