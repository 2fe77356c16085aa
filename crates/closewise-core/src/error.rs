//! # Error Types
//!
//! Domain-specific error types for closewise-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  closewise-core errors (this file)                                     │
//! │  ├── EngineError::Validation            - deal fails the input        │
//! │  │                                        contract (full field list)  │
//! │  ├── EngineError::ConfigurationNotFound - no jurisdiction profile     │
//! │  │                                        resolves (attempted paths)  │
//! │  ├── EngineError::InvalidConfiguration  - profile data is internally  │
//! │  │                                        inconsistent                │
//! │  └── EngineError::InvalidDate           - date string fails calendar  │
//! │                                           parsing                     │
//! │                                                                         │
//! │  closewise-config errors (separate crate)                              │
//! │  └── ConfigError - filesystem / JSON parse failures                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Errors are enum variants, never String
//! 3. Calculation either fully succeeds or fully fails - no partial results
//! 4. Inconsistent configuration fails fast, never defaults to a silent zero

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// Field Violation
// =============================================================================

/// A single field-level violation found during deal validation.
///
/// Violations are collected, not thrown one at a time, so the caller sees
/// the full list before any calculation runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FieldViolation {
    /// Dotted path of the offending field, e.g. `property.state`.
    pub field: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        FieldViolation {
            field: field.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// Engine Error
// =============================================================================

/// Errors surfaced by the calculation engine.
///
/// All are synchronous and final: inputs are deterministic, so nothing is
/// retried internally.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// The deal failed the input contract. Carries every field-level
    /// violation; nothing was calculated.
    #[error("deal validation failed with {} violation(s)", .0.len())]
    Validation(Vec<FieldViolation>),

    /// No jurisdiction profile resolved for the property location,
    /// including the absence of a DEFAULT fallback.
    #[error("no jurisdiction profile matched; attempted paths: [{}]", .attempted.join(", "))]
    ConfigurationNotFound { attempted: Vec<String> },

    /// A profile or rule is internally inconsistent (e.g. a split payer
    /// whose percentages do not sum to 100).
    #[error("invalid configuration: {detail}")]
    InvalidConfiguration { detail: String },

    /// A supplied date string is not a valid ISO calendar date.
    #[error("invalid calendar date '{input}': expected YYYY-MM-DD")]
    InvalidDate { input: String },
}

impl EngineError {
    /// Shorthand for an `InvalidConfiguration` error.
    pub fn invalid_config(detail: impl Into<String>) -> Self {
        EngineError::InvalidConfiguration {
            detail: detail.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// Unit Tests
// =============================================================================
