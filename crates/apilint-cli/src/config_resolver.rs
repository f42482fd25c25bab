//! Configuration file resolution relative to the checked dump.
//!
//! Resolves the configuration file path using a deterministic priority order:
//!
//! 1. `--config` flag (explicit path)
//! 2. `apilint.toml` or `.apilint.toml` in the directory holding the
//!    after-dump, then in each parent directory up to the repository root
//!    (the first directory containing `.git`)
//! 3. No config found → defaults

use std::path::{Path, PathBuf};

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly specified via `--config` flag.
    Explicit(PathBuf),
    /// Found next to the dump or in one of its parent directories.
    Discovered(PathBuf),
    /// No config found; defaults will be used.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Discovered(p) => Some(p),
            Self::Default => None,
        }
    }
}

/// Config file names, checked in order within each directory.
const CONFIG_NAMES: &[&str] = &["apilint.toml", ".apilint.toml"];

/// Marks the top of a repository; the search does not go above it.
const REPO_MARKER: &str = ".git";

/// Resolves the configuration for the dump at `dump`.
///
/// See module-level docs for resolution order.
#[must_use]
pub fn resolve(dump: &Path, explicit: Option<&Path>) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    let start = match dump.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let start = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());

    for dir in start.ancestors() {
        for name in CONFIG_NAMES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                tracing::debug!("Found config: {}", candidate.display());
                return ConfigSource::Discovered(candidate);
            }
        }
        if dir.join(REPO_MARKER).exists() {
            tracing::debug!("Stopped config search at {}", dir.display());
            break;
        }
    }

    ConfigSource::Default
}
