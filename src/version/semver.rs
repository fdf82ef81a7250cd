use std::fmt;
use std::str::FromStr;

use semver::Version;

use crate::version::error::ConstraintError;

/// A dotted numeric PHP version: `major.minor.patch`.
///
/// Ordering is lexicographic on the three components, so the derived
/// `Ord` (fields in declaration order) is the total order used by the
/// resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SemVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl SemVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a dotted version, padding missing trailing components with zero.
    ///
    /// Examples:
    /// - "8" -> 8.0.0
    /// - "8.2" -> 8.2.0
    /// - "v8.2.1" -> 8.2.1
    pub fn parse(version: &str) -> Result<Self, ConstraintError> {
        let trimmed = version.trim();
        let digits = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);

        if digits.is_empty() {
            return Err(ConstraintError::malformed(version, "missing version"));
        }

        let parts: Vec<&str> = digits.split('.').collect();
        if parts.len() > 3 {
            return Err(ConstraintError::malformed(
                version,
                "more than three version components",
            ));
        }

        let mut components = [0u64; 3];
        for (slot, part) in components.iter_mut().zip(&parts) {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ConstraintError::malformed(
                    version,
                    format!("invalid version component '{part}'"),
                ));
            }
            *slot = part.parse().map_err(|_| {
                ConstraintError::malformed(version, format!("component '{part}' is too large"))
            })?;
        }

        Ok(Self::new(components[0], components[1], components[2]))
    }
}

impl fmt::Display for SemVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SemVersion {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Parse a release name into a semver::Version, normalizing partial versions.
///
/// Used for package release names, which may carry pre-release tags
/// (`2.0.0-beta1`) that `SemVersion` deliberately rejects. Strips a
/// leading 'v' and pads "1" / "1.2" with zeros.
pub fn parse_release(version: &str) -> Option<Version> {
    let version = version.strip_prefix('v').unwrap_or(version);
    let (core, rest) = match version.find(['-', '+']) {
        Some(idx) => version.split_at(idx),
        None => (version, ""),
    };
    let parts: Vec<&str> = core.split('.').collect();
    let normalized = match parts.len() {
        1 => format!("{}.0.0{}", parts[0], rest),
        2 => format!("{}.{}.0{}", parts[0], parts[1], rest),
        _ => version.to_string(),
    };
    Version::parse(&normalized).ok()
}
