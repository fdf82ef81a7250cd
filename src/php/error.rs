use std::path::PathBuf;

use thiserror::Error;

use crate::platform::Platform;
use crate::version::semver::SemVersion;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("TLS certificate validation failed for {url}: {source}")]
    Tls {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected status {status} fetching {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Archive entry escapes the destination: {0}")]
    UnsafePath(String),

    #[error("Binary '{0}' not found in archive")]
    BinaryNotFound(String),
}

/// Why a cache miss could not be turned into a ready binary
#[derive(Debug, Error)]
pub enum AcquireError {
    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("PHP {version} has no published build for {platform}")]
    Unavailable {
        version: SemVersion,
        platform: Platform,
    },

    #[error("Failed to acquire PHP {version}: {source}")]
    AcquisitionFailed {
        version: SemVersion,
        #[source]
        source: AcquireError,
    },
}
