//! # Jurisdiction Resolver
//!
//! Maps a property location to the single best-matching jurisdiction
//! profile via a priority fallback chain.
//!
//! ## Fallback Chain
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              Candidate paths, most specific first                       │
//! │                                                                         │
//! │  1. PA/zip/15213        (postal code supplied)                         │
//! │  2. PA/city/pittsburgh  (city supplied)                                │
//! │  3. PA/county/allegheny (county supplied)                              │
//! │  4. PA                  (always)                                       │
//! │  5. DEFAULT             (always)                                       │
//! │                                                                         │
//! │  Candidates whose locality field was not supplied are skipped.         │
//! │  The first path present in the store wins. No path present at all      │
//! │  fails with ConfigurationNotFound carrying every attempted path.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Resolution is a pure lookup: identical inputs against an unchanged store
//! always select the identical path.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use ts_rs::TS;

use crate::deal::PropertyLocation;
use crate::error::{EngineError, EngineResult};
use crate::profile::{JurisdictionProfile, SpecificityLevel};
use crate::DEFAULT_PROFILE_KEY;

// =============================================================================
// Match Level
// =============================================================================

/// How specifically the resolved profile matched the property location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MatchLevel {
    Zip,
    City,
    County,
    State,
    Default,
}

impl fmt::Display for MatchLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchLevel::Zip => write!(f, "zip"),
            MatchLevel::City => write!(f, "city"),
            MatchLevel::County => write!(f, "county"),
            MatchLevel::State => write!(f, "state"),
            MatchLevel::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// Geography Paths
// =============================================================================

/// Normalizes a state code for use in a geography path.
fn normalize_state(state: &str) -> String {
    state.trim().to_uppercase()
}

/// Normalizes a locality (county/city/postal code) for use in a path.
fn normalize_locality(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Derives the store key for a profile from its own locality fields.
///
/// The reserved jurisdiction id `DEFAULT` maps to the `DEFAULT` path
/// regardless of level.
pub fn profile_path(profile: &JurisdictionProfile) -> String {
    if profile.jurisdiction_id == DEFAULT_PROFILE_KEY {
        return DEFAULT_PROFILE_KEY.to_string();
    }

    let state = normalize_state(&profile.state);
    match profile.level {
        SpecificityLevel::Zip => {
            // validate() guarantees the field is present for this level
            let zip = profile.postal_code.as_deref().unwrap_or_default();
            format!("{state}/zip/{}", normalize_locality(zip))
        }
        SpecificityLevel::City => {
            let city = profile.city.as_deref().unwrap_or_default();
            format!("{state}/city/{}", normalize_locality(city))
        }
        SpecificityLevel::County => {
            let county = profile.county.as_deref().unwrap_or_default();
            format!("{state}/county/{}", normalize_locality(county))
        }
        SpecificityLevel::State => state,
    }
}

/// Builds the candidate path list for a property location in descending
/// specificity, skipping paths whose locality field was not supplied.
fn candidate_paths(location: &PropertyLocation) -> Vec<(String, MatchLevel)> {
    let state = normalize_state(&location.state);
    let mut candidates = Vec::with_capacity(5);

    if let Some(zip) = location.postal_code.as_deref().filter(|z| !z.trim().is_empty()) {
        candidates.push((
            format!("{state}/zip/{}", normalize_locality(zip)),
            MatchLevel::Zip,
        ));
    }
    if let Some(city) = location.city.as_deref().filter(|c| !c.trim().is_empty()) {
        candidates.push((
            format!("{state}/city/{}", normalize_locality(city)),
            MatchLevel::City,
        ));
    }
    if let Some(county) = location.county.as_deref().filter(|c| !c.trim().is_empty()) {
        candidates.push((
            format!("{state}/county/{}", normalize_locality(county)),
            MatchLevel::County,
        ));
    }
    candidates.push((state, MatchLevel::State));
    candidates.push((DEFAULT_PROFILE_KEY.to_string(), MatchLevel::Default));

    candidates
}

// =============================================================================
// Profile Store
// =============================================================================

/// A successfully resolved profile plus the path that matched.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedProfile<'a> {
    pub profile: &'a JurisdictionProfile,
    pub level: MatchLevel,
}

/// In-memory mapping of geography path to jurisdiction profile.
///
/// The store is populated up front (by `closewise-config` or a test
/// fixture) and injected into the engine; the engine never mutates it.
#[derive(Debug, Clone, Default)]
pub struct ProfileStore {
    profiles: BTreeMap<String, JurisdictionProfile>,
}

impl ProfileStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        ProfileStore {
            profiles: BTreeMap::new(),
        }
    }

    /// Validates and inserts a profile, returning the geography path it was
    /// stored under. Invalid profiles are rejected and never become
    /// resolvable. A later insert at the same path replaces the earlier one.
    pub fn insert(&mut self, profile: JurisdictionProfile) -> EngineResult<String> {
        profile.validate()?;
        let path = profile_path(&profile);
        self.profiles.insert(path.clone(), profile);
        Ok(path)
    }

    /// Looks up a profile by exact geography path.
    pub fn get(&self, path: &str) -> Option<&JurisdictionProfile> {
        self.profiles.get(path)
    }

    /// Number of stored profiles.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether the store holds no profiles.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Iterates stored paths in deterministic (sorted) order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Resolves the best-matching profile for a property location.
    ///
    /// Tries the candidate paths in descending specificity and returns the
    /// first one present, together with the matched path and level.
    pub fn resolve<'a>(
        &'a self,
        location: &PropertyLocation,
    ) -> EngineResult<(String, ResolvedProfile<'a>)> {
        let candidates = candidate_paths(location);

        for (path, level) in &candidates {
            if let Some(profile) = self.profiles.get(path) {
                return Ok((path.clone(), ResolvedProfile { profile, level: *level }));
            }
        }

        Err(EngineError::ConfigurationNotFound {
            attempted: candidates.into_iter().map(|(path, _)| path).collect(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::SpecificityLevel;

    fn profile(
        id: &str,
        level: SpecificityLevel,
        state: &str,
        county: Option<&str>,
        city: Option<&str>,
        zip: Option<&str>,
    ) -> JurisdictionProfile {
        JurisdictionProfile {
            jurisdiction_id: id.to_string(),
            level,
            state: state.to_string(),
            county: county.map(str::to_string),
            city: city.map(str::to_string),
            postal_code: zip.map(str::to_string),
            description: None,
            transfer_taxes: Vec::new(),
            recording: None,
            title: None,
            settlement: None,
            proration: None,
        }
    }

    fn populated_store() -> ProfileStore {
        let mut store = ProfileStore::new();
        store
            .insert(profile("PA", SpecificityLevel::State, "PA", None, None, None))
            .unwrap();
        store
            .insert(profile(
                "PA_ALLEGHENY",
                SpecificityLevel::County,
                "PA",
                Some("Allegheny"),
                None,
                None,
            ))
            .unwrap();
        store
            .insert(profile(
                "PA_PITTSBURGH",
                SpecificityLevel::City,
                "PA",
                None,
                Some("Pittsburgh"),
                None,
            ))
            .unwrap();
        store
            .insert(profile(
                "PA_15213",
                SpecificityLevel::Zip,
                "PA",
                None,
                None,
                Some("15213"),
            ))
            .unwrap();
        store
            .insert(profile(
                "DEFAULT",
                SpecificityLevel::State,
                "US",
                None,
                None,
                None,
            ))
            .unwrap();
        store
    }

    #[test]
    fn test_profile_paths() {
        assert_eq!(
            profile_path(&profile("PA", SpecificityLevel::State, "pa", None, None, None)),
            "PA"
        );
        assert_eq!(
            profile_path(&profile(
                "PA_ALLEGHENY",
                SpecificityLevel::County,
                "PA",
                Some("Allegheny"),
                None,
                None
            )),
            "PA/county/allegheny"
        );
        assert_eq!(
            profile_path(&profile(
                "DEFAULT",
                SpecificityLevel::State,
                "US",
                None,
                None,
                None
            )),
            "DEFAULT"
        );
    }

    #[test]
    fn test_most_specific_candidate_wins() {
        let store = populated_store();
        let location = PropertyLocation {
            state: "PA".to_string(),
            county: Some("Allegheny".to_string()),
            city: Some("Pittsburgh".to_string()),
            postal_code: Some("15213".to_string()),
        };

        let (path, resolved) = store.resolve(&location).unwrap();
        assert_eq!(path, "PA/zip/15213");
        assert_eq!(resolved.level, MatchLevel::Zip);
        assert_eq!(resolved.profile.jurisdiction_id, "PA_15213");
    }

    #[test]
    fn test_fallback_skips_unsupplied_localities() {
        let store = populated_store();
        let location = PropertyLocation {
            state: "PA".to_string(),
            county: Some("Allegheny".to_string()),
            city: None,
            postal_code: None,
        };

        let (path, resolved) = store.resolve(&location).unwrap();
        assert_eq!(path, "PA/county/allegheny");
        assert_eq!(resolved.level, MatchLevel::County);
    }

    #[test]
    fn test_fallback_to_state_then_default() {
        let store = populated_store();

        let (path, resolved) = store
            .resolve(&PropertyLocation::state_only("PA"))
            .unwrap();
        assert_eq!(path, "PA");
        assert_eq!(resolved.level, MatchLevel::State);

        // Texas has no profile; only the DEFAULT fallback remains
        let (path, resolved) = store
            .resolve(&PropertyLocation::state_only("TX"))
            .unwrap();
        assert_eq!(path, "DEFAULT");
        assert_eq!(resolved.level, MatchLevel::Default);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let store = populated_store();
        let location = PropertyLocation {
            state: "pa".to_string(),
            county: Some("ALLEGHENY".to_string()),
            city: None,
            postal_code: None,
        };

        let (path, _) = store.resolve(&location).unwrap();
        assert_eq!(path, "PA/county/allegheny");
    }

    #[test]
    fn test_no_match_reports_attempted_paths() {
        let store = ProfileStore::new();
        let location = PropertyLocation {
            state: "TX".to_string(),
            county: Some("Harris".to_string()),
            city: None,
            postal_code: None,
        };

        let err = store.resolve(&location).unwrap_err();
        match err {
            EngineError::ConfigurationNotFound { attempted } => {
                assert_eq!(
                    attempted,
                    vec![
                        "TX/county/harris".to_string(),
                        "TX".to_string(),
                        "DEFAULT".to_string()
                    ]
                );
            }
            other => panic!("expected ConfigurationNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let store = populated_store();
        let location = PropertyLocation {
            state: "PA".to_string(),
            county: Some("Allegheny".to_string()),
            city: Some("Pittsburgh".to_string()),
            postal_code: None,
        };

        let (first, _) = store.resolve(&location).unwrap();
        let (second, _) = store.resolve(&location).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_profile_rejected_at_insert() {
        let mut store = ProfileStore::new();
        let mut bad = profile("PA_BAD", SpecificityLevel::County, "PA", None, None, None);
        bad.county = None; // county level without a county
        assert!(store.insert(bad).is_err());
        assert!(store.is_empty());
    }
}
