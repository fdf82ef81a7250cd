//! Composer collaborators: package metadata, manifests and process execution
//!
//! - [`github`]: GitHub repository URLs as package sources
//! - [`packagist`]: Latest stable release lookup on Packagist
//! - [`manifest`]: composer.json reading and generation
//! - [`runner`]: Composer download, `composer install` and PHP script runs

pub mod error;
pub mod github;
pub mod manifest;
pub mod packagist;
pub mod runner;

pub use error::{ComposerError, ManifestError, RegistryError};
pub use github::PackageSource;
pub use manifest::ComposerManifest;
pub use packagist::{PackageRelease, PackagistRegistry};
