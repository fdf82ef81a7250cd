//! PHP binary acquisition: download, unpack and cache static builds
//!
//! - [`cache`]: Versioned on-disk cache with stage-then-rename promotion
//! - [`downloader`]: Downloader trait and the reqwest-based implementation
//! - [`extract`]: tar.gz / zip unpacking and binary lookup
//! - [`error`]: Error types for download, extraction and caching

pub mod cache;
pub mod downloader;
pub mod error;
pub mod extract;

pub use cache::{BinaryCache, CacheState};
pub use downloader::{Downloader, HttpDownloader};
pub use error::{AcquireError, CacheError, DownloadError, ExtractError};
