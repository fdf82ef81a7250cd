//! Versioned cache of PHP binaries.
//!
//! Layout under the cache root:
//!
//! ```text
//! ~/.pocus/
//! ├── downloads/
//! │   └── 8.2.27-4242-1718000000000/   # staging, removed when done
//! │       ├── php-8.2.27-cli-linux-x86_64.tar.gz
//! │       └── extract/
//! ├── 8.2.27/
//! │   └── php                          # ready binary
//! └── 8.3.15/
//!     └── php
//! ```
//!
//! The filesystem is the only record of state. A version is ready once its
//! directory holds an executable binary; that directory only ever appears
//! through a rename of a fully extracted staging tree, so an interrupted
//! download never looks ready.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info, warn};

use crate::config::DOWNLOADS_DIR;
use crate::php::downloader::Downloader;
use crate::php::error::{AcquireError, CacheError};
use crate::php::extract::{self, ArchiveKind};
use crate::platform::Platform;
use crate::version::catalog::{Catalog, CatalogEntry};
use crate::version::semver::SemVersion;

/// State of a version in the cache, derived from the filesystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Missing,
    /// A staging directory exists, possibly from another process
    Downloading,
    Ready,
}

pub struct BinaryCache {
    root: PathBuf,
    platform: Platform,
    catalog: Catalog,
    downloader: Arc<dyn Downloader>,
}

impl BinaryCache {
    pub fn new(
        root: PathBuf,
        platform: Platform,
        catalog: Catalog,
        downloader: Arc<dyn Downloader>,
    ) -> Self {
        Self {
            root,
            platform,
            catalog,
            downloader,
        }
    }

    pub fn version_dir(&self, version: &SemVersion) -> PathBuf {
        self.root.join(version.to_string())
    }

    pub fn binary_path(&self, version: &SemVersion) -> PathBuf {
        self.version_dir(version)
            .join(self.platform.php_binary_name())
    }

    fn downloads_dir(&self) -> PathBuf {
        self.root.join(DOWNLOADS_DIR)
    }

    pub fn state(&self, version: &SemVersion) -> CacheState {
        if extract::is_executable(&self.binary_path(version)) {
            return CacheState::Ready;
        }

        let prefix = format!("{version}-");
        let staging_exists = std::fs::read_dir(self.downloads_dir())
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .any(|e| e.file_name().to_string_lossy().starts_with(&prefix))
            })
            .unwrap_or(false);

        if staging_exists {
            CacheState::Downloading
        } else {
            CacheState::Missing
        }
    }

    /// Ready versions on disk, lowest first
    pub fn list(&self) -> Vec<SemVersion> {
        let Ok(entries) = std::fs::read_dir(&self.root) else {
            return Vec::new();
        };

        let mut versions: Vec<SemVersion> = entries
            .filter_map(|e| e.ok())
            .filter_map(|e| SemVersion::parse(&e.file_name().to_string_lossy()).ok())
            .filter(|v| self.state(v) == CacheState::Ready)
            .collect();

        versions.sort();
        versions
    }

    /// Return the path of a ready binary for `version`, downloading it on a miss.
    ///
    /// Repeated calls return the same path without touching the network.
    /// On failure the staging directory is removed and the version stays
    /// missing, so a later call starts over.
    pub async fn ensure(&self, version: &SemVersion) -> Result<PathBuf, CacheError> {
        let binary = self.binary_path(version);
        if extract::is_executable(&binary) {
            debug!(%version, ?binary, "Cache hit");
            return Ok(binary);
        }

        let entry = self
            .catalog
            .find(version, self.platform)
            .ok_or(CacheError::Unavailable {
                version: *version,
                platform: self.platform,
            })?;

        info!(%version, url = %entry.url, "Downloading PHP");

        let failed = |source: AcquireError| CacheError::AcquisitionFailed {
            version: *version,
            source,
        };

        let staging =
            StagingDir::create(&self.downloads_dir(), version).map_err(|e| failed(e.into()))?;
        self.acquire(entry, staging.path()).await.map_err(failed)?;

        info!(%version, ?binary, "PHP ready");
        Ok(binary)
    }

    async fn acquire(&self, entry: &CatalogEntry, staging: &Path) -> Result<(), AcquireError> {
        let binary_name = self.platform.php_binary_name();
        let archive = staging.join(archive_file_name(&entry.url));
        self.downloader.fetch(&entry.url, &archive).await?;

        let extract_dir = staging.join("extract");
        extract::extract(
            &archive,
            ArchiveKind::from_url(&entry.url),
            &extract_dir,
            binary_name,
        )?;

        let found = extract::find_binary(&extract_dir, binary_name)?;
        let target = extract_dir.join(binary_name);
        if found != target {
            std::fs::rename(&found, &target)?;
        }
        extract::make_executable(&target)?;

        self.promote(&extract_dir, &entry.version)
    }

    /// Move a fully extracted tree into its versioned directory.
    ///
    /// Whatever sits at the destination is replaced, never merged into.
    fn promote(&self, extract_dir: &Path, version: &SemVersion) -> Result<(), AcquireError> {
        let dest = self.version_dir(version);

        if dest.exists() {
            debug!(?dest, "Replacing existing version directory");
            std::fs::remove_dir_all(&dest)?;
        }

        match std::fs::rename(extract_dir, &dest) {
            Ok(()) => Ok(()),
            // Another process promoted the same version in between
            Err(e) if extract::is_executable(&self.binary_path(version)) => {
                debug!(error = %e, ?dest, "Version promoted concurrently");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Per-attempt staging directory, removed on drop
struct StagingDir {
    path: PathBuf,
}

impl StagingDir {
    fn create(downloads_dir: &Path, version: &SemVersion) -> std::io::Result<Self> {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let path = downloads_dir.join(format!("{version}-{}-{nanos}", std::process::id()));

        std::fs::create_dir_all(&path)?;
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            warn!(path = ?self.path, error = %e, "Failed to remove staging directory");
        }
    }
}

fn archive_file_name(url: &str) -> String {
    url.split(['?', '#'])
        .next()
        .and_then(|path| path.rsplit('/').next())
        .filter(|name| !name.is_empty())
        .unwrap_or("php-download")
        .to_string()
}
