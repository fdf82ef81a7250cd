//! Version layer: parsing PHP constraints and choosing a build
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │  Constraint  │────▶│   Resolver   │◀────│   Catalog    │
//! │   (parse)    │     │ (best match) │     │ (builds/url) │
//! └──────────────┘     └──────────────┘     └──────────────┘
//!                             │
//!                             ▼
//!                       SemVersion ──▶ php::cache
//! ```
//!
//! # Modules
//!
//! - [`catalog`]: Compiled-in table of downloadable builds per platform
//! - [`constraint`]: Constraint tokenizer and atom/group matching
//! - [`error`]: Error types for parsing and resolution
//! - [`resolver`]: Highest-matching version selection
//! - [`semver`]: Dotted numeric versions and release-name parsing

pub mod catalog;
pub mod constraint;
pub mod error;
pub mod resolver;
pub mod semver;

pub use catalog::{Catalog, CatalogEntry};
pub use constraint::{Atom, Op, RequirementGroup, VersionConstraint};
pub use error::{ConstraintError, ResolveError};
pub use resolver::VersionResolver;
pub use semver::SemVersion;
