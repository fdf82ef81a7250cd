//! Packages given as GitHub repository URLs

use std::path::Path;

use tracing::debug;

use crate::composer::error::RegistryError;
use crate::php::downloader::Downloader;

const GITHUB_PREFIXES: [&str; 2] = ["https://github.com/", "http://github.com/"];

/// Where a package argument points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageSource {
    /// `https://github.com/<owner>/<repo>`
    GitHub { owner: String, repo: String },
    /// `vendor/name` resolved through Packagist
    Packagist(String),
}

impl PackageSource {
    pub fn parse(package: &str) -> Result<Self, RegistryError> {
        let Some(path) = GITHUB_PREFIXES
            .iter()
            .find_map(|prefix| package.strip_prefix(*prefix))
        else {
            return Ok(Self::Packagist(package.to_string()));
        };

        let mut segments = path.trim_end_matches('/').split('/');
        match (segments.next(), segments.next()) {
            (Some(owner), Some(repo)) if !owner.is_empty() && !repo.is_empty() => {
                Ok(Self::GitHub {
                    owner: owner.to_string(),
                    repo: repo.trim_end_matches(".git").to_string(),
                })
            }
            _ => Err(RegistryError::InvalidGitHubUrl(package.to_string())),
        }
    }
}

/// URL of the repository's composer.json on the default branch
pub fn raw_composer_url(raw_base_url: &str, owner: &str, repo: &str) -> String {
    format!(
        "{}/{}/{}/HEAD/composer.json",
        raw_base_url.trim_end_matches('/'),
        owner,
        repo
    )
}

/// Download the repository's composer.json into `dest`
pub async fn fetch_composer_json(
    downloader: &dyn Downloader,
    raw_base_url: &str,
    owner: &str,
    repo: &str,
    dest: &Path,
) -> Result<(), RegistryError> {
    let url = raw_composer_url(raw_base_url, owner, repo);
    debug!(%url, ?dest, "Fetching composer.json from GitHub");
    downloader.fetch(&url, dest).await?;
    Ok(())
}
