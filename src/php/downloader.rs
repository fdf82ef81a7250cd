//! HTTP download of PHP builds and other artifacts

use std::error::Error as StdError;
use std::path::Path;

#[cfg(test)]
use mockall::automock;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::config::USER_AGENT;
use crate::php::error::DownloadError;

/// Trait for fetching a URL into a local file
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Downloader: Send + Sync {
    /// Download `url` into `dest`, creating `dest`'s parent directories.
    ///
    /// On error no partially written `dest` is left behind.
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), DownloadError>;
}

/// Downloader backed by reqwest with rustls.
///
/// Certificate verification is always on; there is no switch to disable it.
pub struct HttpDownloader {
    client: reqwest::Client,
}

impl HttpDownloader {
    pub fn new() -> Result<Self, DownloadError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(DownloadError::Client)?;

        Ok(Self { client })
    }

    /// Stream the response body into `dest` chunk by chunk
    async fn write_body(
        url: &str,
        response: &mut reqwest::Response,
        dest: &Path,
    ) -> Result<u64, DownloadError> {
        let io_error = |source| DownloadError::Io {
            path: dest.to_path_buf(),
            source,
        };

        let mut file = tokio::fs::File::create(dest).await.map_err(io_error)?;
        let mut written = 0u64;

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| classify_error(url, e))?
        {
            file.write_all(&chunk).await.map_err(io_error)?;
            written += chunk.len() as u64;
        }

        file.flush().await.map_err(io_error)?;
        Ok(written)
    }
}

#[async_trait::async_trait]
impl Downloader for HttpDownloader {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), DownloadError> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| DownloadError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        debug!(%url, ?dest, "Downloading");

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Download returned status {}: {}", status, url);
            return Err(DownloadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        match Self::write_body(url, &mut response, dest).await {
            Ok(bytes) => {
                debug!(%url, bytes, "Download complete");
                Ok(())
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(dest).await;
                Err(e)
            }
        }
    }
}

/// Split transport failures into certificate problems and everything else
fn classify_error(url: &str, source: reqwest::Error) -> DownloadError {
    if is_certificate_error(&source) {
        DownloadError::Tls {
            url: url.to_string(),
            source,
        }
    } else {
        DownloadError::Network {
            url: url.to_string(),
            source,
        }
    }
}

/// rustls surfaces verification failures as "invalid peer certificate: ..."
/// somewhere in the source chain of the connect error.
fn is_certificate_error(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        let message = e.to_string().to_ascii_lowercase();
        if message.contains("certificate") {
            return true;
        }
        current = e.source();
    }
    false
}
