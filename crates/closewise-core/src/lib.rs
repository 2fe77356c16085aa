//! # closewise-core: Pure Closing-Cost Calculation Engine
//!
//! This crate is the **heart** of Closewise. It computes itemized
//! real-estate closing costs (transfer taxes, recording fees, title
//! insurance, prorated taxes/HOA dues) for a purchase transaction and
//! allocates each cost between buyer and seller following
//! settlement-statement (HUD-style) conventions.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Closewise Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Frontend / Callers (TypeScript, API)            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  closewise-config                               │   │
//! │  │     Loads *.json jurisdiction profiles into a ProfileStore     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ ProfileStore (injected)                │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ closewise-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │   │ resolver │ │ transfer │ │  title   │ │    proration     │  │   │
//! │  │   │ fallback │ │   tax    │ │ premiums │ │  day-count math  │  │   │
//! │  │   │  chain   │ │  rules   │ │ discount │ │  HUD treatment   │  │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘  │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────────────────────────┐   │   │
//! │  │   │recording │ │settlement│ │  engine: the aggregator      │   │   │
//! │  │   │   fees   │ │   fees   │ │  (allocation happens HERE)   │   │   │
//! │  │   └──────────┘ └──────────┘ └──────────────────────────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO CLOCKS • NO RANDOMNESS • PURE FUNCTIONS          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - integer-cents `Money` with a single rounding boundary
//! - [`dates`] - strict ISO parsing and day-count conventions
//! - [`deal`] - the immutable transaction input
//! - [`profile`] - strongly-typed jurisdiction configuration
//! - [`resolver`] - geography-path fallback chain over a `ProfileStore`
//! - [`validation`] - aggregate deal validation
//! - [`transfer_tax`], [`recording`], [`title`], [`proration`],
//!   [`settlement`] - the calculators
//! - [`statement`] - ledger output types
//! - [`engine`] - the `calculate` facade and output aggregator
//! - [`error`] - typed engine errors
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: `calculate` is deterministic - same deal and
//!    store produce byte-identical statements
//! 2. **No I/O**: profile loading lives in `closewise-config`; this crate
//!    only ever sees an in-memory store
//! 3. **Single Rounding Step**: intermediates stay exact `Decimal`s until
//!    they become ledger `Money`
//! 4. **Explicit Errors**: inconsistent configuration fails fast, never a
//!    silent zero
//!
//! ## Example
//!
//! ```rust
//! use closewise_core::{
//!     ClosingCostEngine, Deal, JurisdictionProfile, ProfileStore,
//!     PropertyLocation, SpecificityLevel,
//! };
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//!
//! let mut store = ProfileStore::new();
//! store.insert(JurisdictionProfile {
//!     jurisdiction_id: "PA".to_string(),
//!     level: SpecificityLevel::State,
//!     state: "PA".to_string(),
//!     county: None,
//!     city: None,
//!     postal_code: None,
//!     description: None,
//!     transfer_taxes: Vec::new(),
//!     recording: None,
//!     title: None,
//!     settlement: None,
//!     proration: None,
//! }).unwrap();
//!
//! let engine = ClosingCostEngine::new(store);
//! let deal = Deal {
//!     property: PropertyLocation::state_only("PA"),
//!     purchase_price: dec!(300000),
//!     loan_amount: dec!(240000),
//!     closing_date: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
//!     documents: Default::default(),
//!     selections: Default::default(),
//!     tax_lines: Vec::new(),
//!     hoa_lines: Vec::new(),
//!     fee_overrides: Default::default(),
//! };
//!
//! let statement = engine.calculate(&deal).unwrap();
//! assert_eq!(statement.diagnostics.matched_path, "PA");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod dates;
pub mod deal;
pub mod engine;
pub mod error;
pub mod money;
pub mod profile;
pub mod proration;
pub mod recording;
pub mod resolver;
pub mod settlement;
pub mod statement;
pub mod title;
pub mod transfer_tax;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use closewise_core::Deal` instead of
// `use closewise_core::deal::Deal`

pub use dates::{parse_iso_date, DayCount};
pub use deal::{
    AncillaryDocument, BuyerSelections, Deal, DocumentCounts, PaymentStatus, PropertyLocation,
    RecurringCharge, Side,
};
pub use engine::{ClosingCostEngine, EngineOptions};
pub use error::{EngineError, EngineResult, FieldViolation};
pub use money::{Money, RoundingMode};
pub use profile::{
    Bracket, FeeConfig, FeeSchedule, JurisdictionProfile, PageTier, PayerRule, PolicyPricing,
    PremiumBasis, ProrationPolicy, ProrationStyle, RateBand, RecordingSchedule,
    SettlementSchedule, SimultaneousIssueDiscount, SpecificityLevel, TaxBase, TaxCalc,
    TitlePolicy, TitleSchedule, TransferTaxRule,
};
pub use proration::{ProratedLine, ProrationResult};
pub use recording::{RecordingOutcome, RecordingResult};
pub use resolver::{MatchLevel, ProfileStore, ResolvedProfile};
pub use settlement::{SettlementFee, SettlementResult};
pub use statement::{
    CalculationTrace, CategoryGroup, ClosingStatement, CostCategory, Diagnostics, EntryKind,
    LineItem, SideLedger,
};
pub use title::{EndorsementFee, TitleResult};
pub use transfer_tax::{TaxRuleOutcome, TransferTaxResult};
pub use validation::validate_deal;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Reserved jurisdiction identifier (and geography path) for the generic
/// fallback profile tried after every state-specific candidate.
pub const DEFAULT_PROFILE_KEY: &str = "DEFAULT";
