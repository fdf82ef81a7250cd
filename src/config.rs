use serde::Deserialize;
use std::path::{Path, PathBuf};

use tracing::debug;

// =============================================================================
// Fixed names and defaults
// =============================================================================

/// User agent sent with every HTTP request
pub const USER_AGENT: &str = concat!("pocus/", env!("CARGO_PKG_VERSION"));

/// Staging directory for in-flight downloads, relative to the data dir
pub const DOWNLOADS_DIR: &str = "downloads";

/// Composer PHAR location, relative to the data dir
pub const COMPOSER_PHAR: &str = "composer.phar";

/// Optional configuration file, relative to the data dir
pub const CONFIG_FILE: &str = "config.json";

/// Log file, relative to the data dir
pub const LOG_FILE: &str = "pocus.log";

/// Requirement assumed for packages that do not declare `require.php`
pub const DEFAULT_PHP_REQUIREMENT: &str = ">=7.0";

pub const DEFAULT_PACKAGIST_URL: &str = "https://packagist.org";
pub const DEFAULT_GITHUB_RAW_URL: &str = "https://raw.githubusercontent.com";
pub const DEFAULT_COMPOSER_URL: &str =
    "https://getcomposer.org/download/latest-stable/composer.phar";

/// pocus configuration, read from `config.json` in the data dir
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PocusConfig {
    /// Base URL of the Packagist API
    pub packagist_url: String,
    /// Base URL serving raw GitHub file contents
    pub github_raw_url: String,
    /// Download URL of composer.phar
    pub composer_url: String,
}

impl Default for PocusConfig {
    fn default() -> Self {
        Self {
            packagist_url: DEFAULT_PACKAGIST_URL.to_string(),
            github_raw_url: DEFAULT_GITHUB_RAW_URL.to_string(),
            composer_url: DEFAULT_COMPOSER_URL.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl PocusConfig {
    /// Load `config.json` from `data_dir`, falling back to defaults when absent
    pub fn load(data_dir: &Path) -> Result<Self, ConfigError> {
        let path = data_dir.join(CONFIG_FILE);

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(?path, "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
    }
}

/// Returns the pocus data directory.
/// Uses $POCUS_HOME if set, otherwise ~/.pocus,
/// or ./.pocus if no home directory is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("POCUS_HOME").ok(), dirs::home_dir())
}

fn data_dir_with_env(pocus_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    pocus_home
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".pocus")))
        .unwrap_or_else(|| PathBuf::from(".pocus"))
}
