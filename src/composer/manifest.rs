//! composer.json reading and generation

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::composer::error::ManifestError;

/// The parts of a composer.json pocus reads or writes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComposerManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub package_type: Option<String>,
    #[serde(default)]
    pub require: BTreeMap<String, String>,
}

impl ComposerManifest {
    /// A throwaway project that requires `package` at `version` on `php`
    pub fn for_package(package: &str, version: &str, php: &str) -> Self {
        Self {
            name: Some("pocus/temp-project".to_string()),
            description: Some("Temporary project created by pocus".to_string()),
            package_type: Some("project".to_string()),
            require: BTreeMap::from([
                ("php".to_string(), php.to_string()),
                (package.to_string(), version.to_string()),
            ]),
        }
    }

    pub fn read(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn write(&self, path: &Path) -> Result<(), ManifestError> {
        let write_error = |source| ManifestError::Write {
            path: path.to_path_buf(),
            source,
        };

        let mut content = serde_json::to_string_pretty(self).map_err(|e| write_error(e.into()))?;
        content.push('\n');
        std::fs::write(path, content).map_err(write_error)
    }

    /// The raw `require.php` constraint, if declared
    pub fn php_requirement(&self) -> Option<&str> {
        self.require.get("php").map(String::as_str)
    }
}
