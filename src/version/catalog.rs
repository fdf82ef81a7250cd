//! Table of downloadable PHP builds
//!
//! The built-in table lists the static CLI builds published by
//! static-php-cli. It is compiled in: supporting a new version or platform
//! is a code change. Tests construct their own catalogs with
//! [`Catalog::new`].

use crate::platform::{Arch, Os, Platform};
use crate::version::semver::SemVersion;

const STATIC_PHP_BASE_URL: &str = "https://dl.static-php.dev/static-php-cli";

/// PHP versions with static builds for every supported platform
const BUILTIN_VERSIONS: &[SemVersion] = &[
    SemVersion::new(7, 4, 33),
    SemVersion::new(8, 0, 30),
    SemVersion::new(8, 1, 31),
    SemVersion::new(8, 2, 27),
    SemVersion::new(8, 3, 15),
    SemVersion::new(8, 4, 2),
];

const BUILTIN_PLATFORMS: &[Platform] = &[
    Platform::new(Os::Linux, Arch::X86_64),
    Platform::new(Os::Linux, Arch::Arm64),
    Platform::new(Os::Macos, Arch::X86_64),
    Platform::new(Os::Macos, Arch::Arm64),
    Platform::new(Os::Windows, Arch::X86_64),
];

/// A single downloadable build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub version: SemVersion,
    pub platform: Platform,
    pub url: String,
}

impl CatalogEntry {
    pub fn new(version: SemVersion, platform: Platform, url: impl Into<String>) -> Self {
        Self {
            version,
            platform,
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// The compiled-in table of static-php-cli builds
    pub fn builtin() -> Self {
        let entries = BUILTIN_PLATFORMS
            .iter()
            .flat_map(|platform| {
                BUILTIN_VERSIONS.iter().map(move |version| {
                    CatalogEntry::new(*version, *platform, static_php_url(*version, *platform))
                })
            })
            .collect();

        Self::new(entries)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Entries published for `platform`, in table order
    pub fn for_platform(&self, platform: Platform) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(move |e| e.platform == platform)
    }

    pub fn find(&self, version: &SemVersion, platform: Platform) -> Option<&CatalogEntry> {
        self.for_platform(platform).find(|e| e.version == *version)
    }
}

fn static_php_url(version: SemVersion, platform: Platform) -> String {
    match platform.os {
        Os::Windows => format!("{STATIC_PHP_BASE_URL}/windows/spc-max/php-{version}-cli-win.zip"),
        Os::Linux | Os::Macos => {
            let arch = match platform.arch {
                Arch::X86_64 => "x86_64",
                Arch::Arm64 => "aarch64",
            };
            format!(
                "{STATIC_PHP_BASE_URL}/common/php-{version}-cli-{}-{arch}.tar.gz",
                platform.os.as_str()
            )
        }
    }
}
