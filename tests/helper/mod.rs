//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use flate2::Compression;
use flate2::write::GzEncoder;

use pocus::php::{DownloadError, Downloader};
use pocus::platform::Platform;
use pocus::version::{Catalog, CatalogEntry, SemVersion};

pub const PHP_VERSIONS: [SemVersion; 3] = [
    SemVersion::new(7, 4, 33),
    SemVersion::new(8, 2, 27),
    SemVersion::new(8, 3, 15),
];

/// Catalog of fake builds for `platform`, served by [`FakeDownloader`]
pub fn test_catalog(platform: Platform) -> Catalog {
    Catalog::new(
        PHP_VERSIONS
            .iter()
            .map(|version| {
                CatalogEntry::new(
                    *version,
                    platform,
                    format!("https://php.test/php-{version}-cli-{platform}.tar.gz"),
                )
            })
            .collect(),
    )
}

/// Serves PHP tarballs, composer.phar and GitHub composer.json files from
/// memory, recording every requested URL.
pub struct FakeDownloader {
    php_script: String,
    github_manifest: String,
    requests: Mutex<Vec<String>>,
}

impl FakeDownloader {
    /// `php_script` becomes the `php` binary inside every tarball
    pub fn new(php_script: impl Into<String>) -> Self {
        Self {
            php_script: php_script.into(),
            github_manifest: r#"{"require": {"php": "^7.4"}}"#.to_string(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_github_manifest(mut self, manifest: &str) -> Self {
        self.github_manifest = manifest.to_string();
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, suffix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|url| url.ends_with(suffix))
            .count()
    }
}

#[async_trait]
impl Downloader for FakeDownloader {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), DownloadError> {
        self.requests.lock().unwrap().push(url.to_string());
        std::fs::create_dir_all(dest.parent().unwrap()).unwrap();

        if url.ends_with(".tar.gz") {
            write_tarball(dest, "php", self.php_script.as_bytes());
        } else if url.ends_with("composer.phar") {
            std::fs::write(dest, "<?php // composer").unwrap();
        } else if url.ends_with("/HEAD/composer.json") {
            std::fs::write(dest, &self.github_manifest).unwrap();
        } else {
            return Err(DownloadError::Status {
                url: url.to_string(),
                status: 404,
            });
        }

        Ok(())
    }
}

fn write_tarball(path: &Path, name: &str, content: &[u8]) {
    let encoder = GzEncoder::new(File::create(path).unwrap(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    let mut header = tar::Header::new_gnu();
    header.set_path(name).unwrap();
    header.set_size(content.len() as u64);
    header.set_mode(0o755);
    header.set_cksum();
    builder.append(&header, content).unwrap();

    builder.into_inner().unwrap().finish().unwrap();
}

/// A shell script standing in for PHP.
///
/// Every invocation appends `<args>` to `log`. `composer.phar install`
/// creates `vendor/bin/<bin>` in the working directory, and running a
/// vendor bin script exits with status 5.
pub fn fake_php_script(log: &Path, bin: &str) -> String {
    format!(
        r#"#!/bin/sh
echo "$@" >> "{log}"
if [ "$2" = "install" ]; then
    mkdir -p vendor/bin && printf '<?php' > vendor/bin/{bin}
fi
case "$1" in
    */vendor/bin/*) exit 5 ;;
esac
exit 0
"#,
        log = log.display(),
    )
}

pub fn read_log(log: &Path) -> Vec<String> {
    std::fs::read_to_string(log)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

pub fn binary_path(data_dir: &Path, version: &SemVersion, platform: Platform) -> PathBuf {
    data_dir
        .join(version.to_string())
        .join(platform.php_binary_name())
}
