//! API version pin in a changelog.
//!
//! A changelog pins the API it documents with a line
//! `[api-version]: <sha1 of the api file>`. When the dump changes the pin
//! goes stale, which forces the changelog to be revisited.

use once_cell::sync::Lazy;
use regex::Regex;
use sha1::{Digest, Sha1};
use std::path::{Path, PathBuf};

static API_VERSION_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[api-version\]: ([a-f0-9]{40})$").expect("valid regex"));

/// Error reading the api or changelog file.
#[derive(Debug, thiserror::Error)]
pub enum ChangelogError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
}

/// Outcome of comparing a changelog pin with the api file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangelogStatus {
    /// The pin matches.
    UpToDate,
    /// A well-formed pin exists but names another digest.
    Stale {
        /// Digest currently pinned.
        pinned: String,
        /// Digest of the api file.
        actual: String,
    },
    /// No well-formed pin line.
    Missing {
        /// Digest of the api file.
        actual: String,
    },
}

impl ChangelogStatus {
    /// Process exit code: 0 up to date, 10 stale, 11 missing.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::UpToDate => 0,
            Self::Stale { .. } => 10,
            Self::Missing { .. } => 11,
        }
    }

    /// The pin line the changelog should contain, when it doesn't.
    #[must_use]
    pub fn expected_line(&self) -> Option<String> {
        match self {
            Self::UpToDate => None,
            Self::Stale { actual, .. } | Self::Missing { actual } => {
                Some(format!("[api-version]: {actual}"))
            }
        }
    }

    /// Multi-line instructions for fixing `changelog`, when it needs fixing.
    #[must_use]
    pub fn notice(&self, changelog: &Path) -> Option<String> {
        let line = self.expected_line()?;
        let (problem, action) = match self {
            Self::UpToDate => return None,
            Self::Stale { .. } => (
                "ERROR: The api changelog file is out of date. Please update the file at",
                "and then modify the [api-version] line as following:",
            ),
            Self::Missing { .. } => (
                "ERROR: The api changelog file does not have a version pin. Please update\nthe file at",
                "And add the following line:",
            ),
        };
        Some(format!(
            "{problem}\n\n{}\n\n{action}\n\n>>>>\n{line}\n<<<<",
            changelog.display()
        ))
    }
}

/// Lowercase hex SHA-1 of `bytes`.
#[must_use]
pub fn api_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Returns the digest of the first `[api-version]` line.
#[must_use]
pub fn find_api_version(changelog: &str) -> Option<&str> {
    changelog.lines().find_map(|line| {
        API_VERSION_LINE
            .captures(line.trim_end())
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    })
}

/// Compares the pin in `changelog` with the digest of `api`.
#[must_use]
pub fn check(api: &[u8], changelog: &str) -> ChangelogStatus {
    let actual = api_digest(api);
    match find_api_version(changelog) {
        Some(pinned) if pinned == actual => ChangelogStatus::UpToDate,
        Some(pinned) => ChangelogStatus::Stale {
            pinned: pinned.to_string(),
            actual,
        },
        None => ChangelogStatus::Missing { actual },
    }
}

/// Reads both files and runs [`check`].
///
/// # Errors
///
/// Returns [`ChangelogError::Io`] if either file cannot be read.
pub fn check_files(api: &Path, changelog: &Path) -> Result<ChangelogStatus, ChangelogError> {
    let api_bytes = std::fs::read(api).map_err(|source| ChangelogError::Io {
        path: api.to_path_buf(),
        source,
    })?;
    let changelog_text =
        std::fs::read_to_string(changelog).map_err(|source| ChangelogError::Io {
            path: changelog.to_path_buf(),
            source,
        })?;
    Ok(check(&api_bytes, &changelog_text))
}
