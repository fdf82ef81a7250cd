//! End-to-end flows behind the CLI commands
//!
//! Each package gets a private workspace under the data dir, keyed by a hash
//! of the package argument. The workspace holds the composer.json that
//! decides which PHP version is resolved and the `vendor/` tree Composer
//! installs into.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::composer::github::{self, PackageSource};
use crate::composer::manifest::ComposerManifest;
use crate::composer::packagist::PackagistRegistry;
use crate::composer::runner;
use crate::config::{DEFAULT_PHP_REQUIREMENT, PocusConfig};
use crate::php::cache::{BinaryCache, CacheState};
use crate::php::downloader::{Downloader, HttpDownloader};
use crate::platform::Platform;
use crate::version::catalog::Catalog;
use crate::version::constraint::VersionConstraint;
use crate::version::resolver::VersionResolver;
use crate::version::semver::SemVersion;

/// Hex characters of the package hash used as workspace directory name
const WORKSPACE_KEY_LEN: usize = 32;

/// A package whose dependencies have been installed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installation {
    pub workspace: PathBuf,
    pub version: SemVersion,
    pub php: PathBuf,
}

pub struct Pocus {
    data_dir: PathBuf,
    config: PocusConfig,
    platform: Platform,
    resolver: VersionResolver,
    cache: BinaryCache,
    downloader: Arc<dyn Downloader>,
    packagist: PackagistRegistry,
}

impl Pocus {
    pub fn new(
        data_dir: PathBuf,
        config: PocusConfig,
        platform: Platform,
        catalog: Catalog,
        downloader: Arc<dyn Downloader>,
    ) -> anyhow::Result<Self> {
        let packagist = PackagistRegistry::new(&config.packagist_url)?;
        let cache = BinaryCache::new(
            data_dir.clone(),
            platform,
            catalog.clone(),
            Arc::clone(&downloader),
        );

        Ok(Self {
            data_dir,
            config,
            platform,
            resolver: VersionResolver::new(catalog),
            cache,
            downloader,
            packagist,
        })
    }

    /// Production wiring: config from `data_dir`, host platform, builtin catalog
    pub fn from_data_dir(data_dir: PathBuf) -> anyhow::Result<Self> {
        let config = PocusConfig::load(&data_dir)?;
        let platform = Platform::current()?;
        let downloader = Arc::new(HttpDownloader::new()?);

        Self::new(data_dir, config, platform, Catalog::builtin(), downloader)
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn workspace_dir(&self, package: &str) -> PathBuf {
        self.data_dir.join(workspace_key(package))
    }

    /// Resolve a constraint expression without touching the cache
    pub fn resolve(&self, constraint: &str) -> anyhow::Result<SemVersion> {
        let constraint = VersionConstraint::parse(constraint)?;
        Ok(self.resolver.resolve(&constraint, self.platform)?)
    }

    pub fn state(&self, version: &SemVersion) -> CacheState {
        self.cache.state(version)
    }

    pub fn installed_versions(&self) -> Vec<SemVersion> {
        self.cache.list()
    }

    /// Resolve `constraint` and make sure the matching binary is cached
    pub async fn php_for(&self, constraint: &str) -> anyhow::Result<(SemVersion, PathBuf)> {
        let version = self.resolve(constraint)?;
        let php = self.cache.ensure(&version).await?;
        Ok((version, php))
    }

    /// Set up the workspace for `package`, install its dependencies with
    /// Composer on the resolved PHP, and return where everything landed.
    pub async fn install(&self, package: &str) -> anyhow::Result<Installation> {
        let workspace = self.prepare_workspace(package).await?;
        let constraint = php_requirement(&workspace)?;
        info!(package, %constraint, "Resolving PHP for package");

        let (version, php) = self.php_for(&constraint).await?;
        let composer = runner::ensure_composer(
            self.downloader.as_ref(),
            &self.config.composer_url,
            &self.data_dir,
        )
        .await?;
        runner::composer_install(&php, &composer, &workspace)
            .await
            .with_context(|| format!("Failed to install {package}"))?;

        info!(package, %version, "Package installed");
        Ok(Installation {
            workspace,
            version,
            php,
        })
    }

    /// Run a bin script of `package`, installing the package first when the
    /// script is not in the workspace yet.
    ///
    /// `script` defaults to the package's own name.
    pub async fn run(
        &self,
        package: &str,
        script: Option<&str>,
        args: &[String],
    ) -> anyhow::Result<i32> {
        let source = PackageSource::parse(package)?;
        let workspace = self.workspace_dir(package);

        let script_name = script.unwrap_or_else(|| default_script_name(&source));

        // a leftover vendor/ from an interrupted install does not count
        let php = if runner::bin_script(&workspace, script_name).is_ok() {
            let constraint = php_requirement(&workspace)?;
            self.php_for(&constraint).await?.1
        } else {
            self.install(package).await?.php
        };

        let script = runner::bin_script(&workspace, script_name)?;
        Ok(runner::run_php(&php, &script, args).await?)
    }

    /// Run a PHP file with the newest version satisfying `constraint`
    pub async fn run_file(
        &self,
        constraint: &str,
        file: &Path,
        args: &[String],
    ) -> anyhow::Result<i32> {
        let (_, php) = self.php_for(constraint).await?;
        Ok(runner::run_php(&php, file, args).await?)
    }

    /// Create the workspace and put the package's composer.json in it
    async fn prepare_workspace(&self, package: &str) -> anyhow::Result<PathBuf> {
        let workspace = self.workspace_dir(package);
        std::fs::create_dir_all(&workspace)
            .with_context(|| format!("Failed to create workspace {workspace:?}"))?;
        let manifest_path = workspace.join("composer.json");

        match PackageSource::parse(package)? {
            PackageSource::GitHub { owner, repo } => {
                github::fetch_composer_json(
                    self.downloader.as_ref(),
                    &self.config.github_raw_url,
                    &owner,
                    &repo,
                    &manifest_path,
                )
                .await?;
            }
            PackageSource::Packagist(name) => {
                let release = self.packagist.latest_stable(&name).await?;
                info!(package = %name, version = %release.version, "Latest stable release");
                let php = release
                    .php_requirement
                    .as_deref()
                    .unwrap_or(DEFAULT_PHP_REQUIREMENT);
                ComposerManifest::for_package(&name, &release.version, php)
                    .write(&manifest_path)?;
            }
        }

        Ok(workspace)
    }
}

/// Directory name of a package's workspace: a prefix of its SHA-256
pub fn workspace_key(package: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(package.as_bytes()));
    digest[..WORKSPACE_KEY_LEN].to_string()
}

fn default_script_name(source: &PackageSource) -> &str {
    match source {
        PackageSource::GitHub { repo, .. } => repo,
        PackageSource::Packagist(name) => name.rsplit('/').next().unwrap_or(name),
    }
}

/// The workspace's `require.php`, or the default when undeclared
fn php_requirement(workspace: &Path) -> anyhow::Result<String> {
    let manifest = ComposerManifest::read(&workspace.join("composer.json"))?;
    Ok(manifest
        .php_requirement()
        .unwrap_or(DEFAULT_PHP_REQUIREMENT)
        .to_string())
}
