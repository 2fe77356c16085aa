//! # Profile Loading
//!
//! Reads jurisdiction profiles from a directory of JSON files and builds
//! the validated `ProfileStore` the engine consumes.
//!
//! ## Loading Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Every *.json file in the directory is a candidate profile          │
//! │     (files are visited in sorted name order - deterministic)           │
//! │  2. Strict serde parse into JurisdictionProfile - a percent rule       │
//! │     without a rate never gets past this point                          │
//! │  3. ProfileStore::insert validates value-level invariants              │
//! │  4. Files that fail parsing or validation are WARNED and EXCLUDED      │
//! │     from the resolvable set; loading continues                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use closewise_core::{EngineResult, JurisdictionProfile, ProfileStore};

use crate::error::{ConfigError, ConfigResult};

// =============================================================================
// Parsing
// =============================================================================

/// Strictly parses one profile document.
pub fn parse_profile(json: &str) -> Result<JurisdictionProfile, serde_json::Error> {
    serde_json::from_str(json)
}

/// Builds a store from already-parsed profiles, failing on the first
/// invalid one. Useful for tests and embedded fixtures.
pub fn build_store(
    profiles: impl IntoIterator<Item = JurisdictionProfile>,
) -> EngineResult<ProfileStore> {
    let mut store = ProfileStore::new();
    for profile in profiles {
        store.insert(profile)?;
    }
    Ok(store)
}

// =============================================================================
// Directory Loading
// =============================================================================

/// Loads every `*.json` profile under `dir` into a `ProfileStore`.
///
/// Files that fail to read, parse, or validate are warned and skipped so
/// one bad profile cannot take down the rest of the configuration; an
/// unreadable directory is an error.
pub fn load_profiles_from_dir(dir: impl AsRef<Path>) -> ConfigResult<ProfileStore> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|source| ConfigError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    // Sorted visit order keeps replacement semantics deterministic when two
    // files derive the same geography path.
    files.sort();

    let mut store = ProfileStore::new();

    for path in files {
        let file = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(error) => {
                warn!(%file, %error, "skipping unreadable profile file");
                continue;
            }
        };

        let profile = match parse_profile(&content) {
            Ok(profile) => profile,
            Err(error) => {
                warn!(%file, %error, "skipping unparseable profile file");
                continue;
            }
        };

        let jurisdiction_id = profile.jurisdiction_id.clone();
        match store.insert(profile) {
            Ok(path) => {
                debug!(%file, %jurisdiction_id, %path, "loaded jurisdiction profile");
            }
            Err(error) => {
                warn!(%file, %jurisdiction_id, %error, "excluding invalid profile");
            }
        }
    }

    Ok(store)
}

// =============================================================================
// Unit Tests
// =============================================================================
