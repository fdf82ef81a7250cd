use thiserror::Error;

use crate::platform::Platform;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConstraintError {
    #[error("Malformed constraint '{expr}': {reason}")]
    Malformed { expr: String, reason: String },
}

impl ConstraintError {
    pub(crate) fn malformed(expr: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            expr: expr.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("No PHP version matching '{constraint}' is available for {platform}")]
    NoMatchingVersion {
        constraint: String,
        platform: Platform,
    },
}
