//! Best-match version selection against a catalog

use tracing::debug;

use crate::platform::Platform;
use crate::version::catalog::Catalog;
use crate::version::constraint::VersionConstraint;
use crate::version::error::ResolveError;
use crate::version::semver::SemVersion;

/// Picks the newest catalog version satisfying a constraint.
pub struct VersionResolver {
    catalog: Catalog,
}

impl VersionResolver {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    /// Resolve `constraint` to the highest matching version published for `platform`.
    ///
    /// The result depends only on the set of entries, never on their order.
    pub fn resolve(
        &self,
        constraint: &VersionConstraint,
        platform: Platform,
    ) -> Result<SemVersion, ResolveError> {
        let resolved = self
            .catalog
            .for_platform(platform)
            .map(|entry| entry.version)
            .filter(|version| constraint.matches(version))
            .max()
            .ok_or_else(|| ResolveError::NoMatchingVersion {
                constraint: constraint.to_string(),
                platform,
            })?;

        debug!(%constraint, %platform, %resolved, "Resolved PHP version");
        Ok(resolved)
    }
}
