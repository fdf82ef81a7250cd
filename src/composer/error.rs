use std::path::PathBuf;

use thiserror::Error;

use crate::php::error::DownloadError;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid composer.json at {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Package not found: {0}")]
    NotFound(String),

    #[error("No stable release found for {0}")]
    NoStableRelease(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid GitHub repository URL: {0}")]
    InvalidGitHubUrl(String),

    #[error("Failed to download composer.json: {0}")]
    Download(#[from] DownloadError),
}

#[derive(Debug, Error)]
pub enum ComposerError {
    #[error("Failed to download Composer: {0}")]
    Download(#[from] DownloadError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to start {program:?}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' exited with {}", describe_exit(*code))]
    Failed { command: String, code: Option<i32> },

    #[error("Bin script not found: {0:?}")]
    ScriptNotFound(PathBuf),
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}
