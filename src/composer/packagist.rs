//! Packagist API client

use std::collections::HashMap;

use semver::Version;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::composer::error::RegistryError;
use crate::config::USER_AGENT;
use crate::version::semver::parse_release;

/// Markers that exclude a release name from "latest stable"
const UNSTABLE_MARKERS: [&str; 4] = ["dev", "alpha", "beta", "RC"];

#[derive(Debug, Deserialize)]
struct PackagistResponse {
    package: PackagistPackage,
}

#[derive(Debug, Deserialize)]
struct PackagistPackage {
    #[serde(default)]
    versions: HashMap<String, PackagistVersion>,
}

#[derive(Debug, Deserialize)]
struct PackagistVersion {
    #[serde(default)]
    require: serde_json::Value,
}

/// The newest stable release of a package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRelease {
    /// Release name exactly as published, e.g. `v2.3.1`
    pub version: String,
    /// The release's `require.php`, if declared
    pub php_requirement: Option<String>,
}

pub struct PackagistRegistry {
    client: reqwest::Client,
    base_url: String,
}

impl PackagistRegistry {
    pub fn new(base_url: &str) -> Result<Self, RegistryError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the package metadata and pick the highest stable release
    pub async fn latest_stable(&self, package_name: &str) -> Result<PackageRelease, RegistryError> {
        let url = format!("{}/packages/{}.json", self.base_url, package_name);
        debug!(%url, "Querying Packagist");

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(package_name.to_string()));
        }

        if !status.is_success() {
            warn!("Packagist returned status {}: {}", status, url);
            return Err(RegistryError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        let body: PackagistResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse Packagist response: {}", e);
            RegistryError::InvalidResponse(e.to_string())
        })?;

        select_latest_stable(body.package.versions)
            .ok_or_else(|| RegistryError::NoStableRelease(package_name.to_string()))
    }
}

fn is_stable_name(name: &str) -> bool {
    !UNSTABLE_MARKERS.iter().any(|marker| name.contains(marker))
}

/// Ordering key of a release name: its semver core plus the optional fourth
/// component Composer allows (`1.2.3.4`)
fn release_key(name: &str) -> Option<(Version, u64)> {
    if let Some(version) = parse_release(name) {
        return Some((version, 0));
    }

    let core = name.strip_prefix('v').unwrap_or(name);
    let parts = core
        .split('.')
        .map(|part| part.parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()?;
    match parts[..] {
        [major, minor, patch, build] => Some((Version::new(major, minor, patch), build)),
        _ => None,
    }
}

fn select_latest_stable(versions: HashMap<String, PackagistVersion>) -> Option<PackageRelease> {
    versions
        .into_iter()
        .filter(|(name, _)| is_stable_name(name))
        .filter_map(|(name, info)| match release_key(&name) {
            Some(key) => key.0.pre.is_empty().then_some((key, name, info)),
            None => {
                debug!(release = %name, "Skipping unparseable release name");
                None
            }
        })
        .max_by(|(a, _, _), (b, _, _)| a.cmp(b))
        .map(|(_, name, info)| PackageRelease {
            version: name,
            php_requirement: info
                .require
                .get("php")
                .and_then(|php| php.as_str())
                .map(str::to_string),
        })
}
