//! # Deal Types
//!
//! The transaction under calculation and its building blocks.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                             Deal                                        │
//! │                                                                         │
//! │  property: PropertyLocation      state + optional county/city/zip      │
//! │  purchase_price, loan_amount     exact Decimal dollars                 │
//! │  closing_date                    NaiveDate                             │
//! │  documents: DocumentCounts       deed/mortgage/ancillary counts+pages  │
//! │  selections: BuyerSelections     owner policy, endorsements, CPL       │
//! │  tax_lines / hoa_lines           RecurringCharge prorations            │
//! │  fee_overrides                   flat-fee amount overrides             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A `Deal` is immutable once submitted to the engine: it is created by the
//! caller and consumed read-only. Every `calculate` call sees exactly the
//! data it was given - no clocks, no ambient state.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Side
// =============================================================================

/// A party to the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Buyer,
    Seller,
}

impl Side {
    /// Returns the other party.
    pub fn opposite(&self) -> Side {
        match self {
            Side::Buyer => Side::Seller,
            Side::Seller => Side::Buyer,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buyer => write!(f, "buyer"),
            Side::Seller => write!(f, "seller"),
        }
    }
}

// =============================================================================
// Property Location
// =============================================================================

/// Where the property sits. State is required; everything else narrows the
/// jurisdiction match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PropertyLocation {
    /// Two-letter state code (required).
    pub state: String,

    /// County name, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,

    /// City name, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    /// Postal code, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
}

impl PropertyLocation {
    /// A state-only location.
    pub fn state_only(state: impl Into<String>) -> Self {
        PropertyLocation {
            state: state.into(),
            county: None,
            city: None,
            postal_code: None,
        }
    }
}

// =============================================================================
// Documents
// =============================================================================

/// An ancillary document to record (power of attorney, release, etc.).
///
/// `doc_type` is matched against the jurisdiction's ancillary fee schedule;
/// unmatched types record for free as far as this engine is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AncillaryDocument {
    /// Document-type tag, e.g. `power_of_attorney`.
    pub doc_type: String,
    /// Number of documents of this type.
    pub documents: u32,
    /// Total page count across those documents.
    pub pages: u32,
}

/// Document counts and page counts for the recording fee calculator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DocumentCounts {
    pub deed_documents: u32,
    pub deed_pages: u32,
    pub mortgage_documents: u32,
    pub mortgage_pages: u32,

    /// Extra documents beyond deed and mortgage.
    #[serde(default)]
    pub ancillary: Vec<AncillaryDocument>,
}

// =============================================================================
// Buyer Selections
// =============================================================================

/// Optional products the buyer opted into.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BuyerSelections {
    /// Whether an owner title policy was selected.
    pub owner_policy: bool,

    /// Endorsement identifiers, e.g. `ALTA-1`. Identifiers missing from the
    /// jurisdiction's endorsement table contribute nothing.
    #[serde(default)]
    pub endorsements: Vec<String>,

    /// Whether a closing protection letter was selected.
    pub closing_protection_letter: bool,
}

// =============================================================================
// Recurring Charges
// =============================================================================

/// Payment status of a recurring bill relative to the closing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// The bill was paid in advance, covering the whole period.
    Paid,
    /// The bill is payable after closing (in arrears).
    Unpaid,
    /// Not known; the jurisdiction's default proration style decides.
    Unknown,
}

/// A recurring charge (property tax, HOA dues) to prorate between the
/// parties by ownership days within its billing period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RecurringCharge {
    /// Display description, e.g. `County Property Tax 2024`.
    pub description: String,

    /// Total billed amount for the period, in dollars.
    #[ts(type = "number")]
    pub amount: Decimal,

    /// First day of the billing period.
    #[ts(as = "String")]
    pub period_start: NaiveDate,

    /// Last day of the billing period.
    #[ts(as = "String")]
    pub period_end: NaiveDate,

    /// Whether the bill has already been paid.
    pub payment_status: PaymentStatus,

    /// Nominal payer of the bill, when known. Informational only; the
    /// debit/credit treatment follows `payment_status`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billed_to: Option<Side>,
}

// =============================================================================
// Deal
// =============================================================================

/// The purchase transaction under calculation.
///
/// ## Invariants (checked by [`crate::validation::validate_deal`])
/// - `property.state` is non-empty
/// - `purchase_price >= 0`
/// - `0 <= loan_amount <= purchase_price`
/// - recurring charge periods run forward and amounts are non-negative
/// - fee overrides are non-negative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Deal {
    pub property: PropertyLocation,

    /// Purchase price in dollars.
    #[ts(type = "number")]
    pub purchase_price: Decimal,

    /// Loan amount in dollars. Zero for an all-cash deal.
    #[ts(type = "number")]
    pub loan_amount: Decimal,

    /// Closing date.
    #[ts(as = "String")]
    pub closing_date: NaiveDate,

    #[serde(default)]
    pub documents: DocumentCounts,

    #[serde(default)]
    pub selections: BuyerSelections,

    /// Property-tax lines to prorate.
    #[serde(default)]
    pub tax_lines: Vec<RecurringCharge>,

    /// HOA dues lines to prorate.
    #[serde(default)]
    pub hoa_lines: Vec<RecurringCharge>,

    /// Flat-fee overrides keyed by fee name (e.g. `settlement_fee`).
    /// An override replaces the profile amount, or adds a new seller-paid
    /// fee if the profile has no entry for that key.
    #[serde(default)]
    #[ts(type = "Record<string, number>")]
    pub fee_overrides: BTreeMap<String, Decimal>,
}

// =============================================================================
// Unit Tests
// =============================================================================
