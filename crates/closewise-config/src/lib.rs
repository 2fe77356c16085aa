//! # closewise-config: Jurisdiction Profile Ingestion
//!
//! Loads jurisdiction profiles from structured JSON files into the
//! validated in-memory [`ProfileStore`](closewise_core::ProfileStore) the
//! calculation engine consumes.
//!
//! The engine itself defines only the lookup contract; this crate owns the
//! storage mechanism. Profiles failing schema parsing or value-level
//! validation are logged and excluded from the resolvable set at load time,
//! so unchecked external data never reaches a calculator.
//!
//! ## Example
//!
//! ```rust,no_run
//! use closewise_config::load_profiles_from_dir;
//! use closewise_core::ClosingCostEngine;
//!
//! let store = load_profiles_from_dir("config/jurisdictions")?;
//! let engine = ClosingCostEngine::new(store);
//! # Ok::<(), closewise_config::ConfigError>(())
//! ```

pub mod error;
pub mod loader;

pub use error::{ConfigError, ConfigResult};
pub use loader::{build_store, load_profiles_from_dir, parse_profile};
