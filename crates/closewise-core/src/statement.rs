//! # Closing Statement Types
//!
//! The aggregated output of a calculation: per-side debit/credit ledgers,
//! totals, nets, category groups, and diagnostics.
//!
//! ## Ledger Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ClosingStatement                                 │
//! │                                                                         │
//! │  buyer: SideLedger          seller: SideLedger                         │
//! │  ├── debits: [LineItem]     ├── debits: [LineItem]                     │
//! │  ├── credits: [LineItem]    ├── credits: [LineItem]                    │
//! │  ├── total_debits           ├── total_debits                           │
//! │  ├── total_credits          ├── total_credits                          │
//! │  └── net = debits-credits   └── net = debits-credits                   │
//! │                                                                         │
//! │  categories: [CategoryGroup]   signed subtotals per cost category      │
//! │  diagnostics: Diagnostics      matched path + optional raw trace       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every line item belongs to exactly one side and is exactly one of
//! debit/credit; amounts are non-negative magnitudes.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::deal::Side;
use crate::money::Money;
use crate::proration::ProrationResult;
use crate::recording::RecordingResult;
use crate::resolver::MatchLevel;
use crate::settlement::SettlementResult;
use crate::title::TitleResult;
use crate::transfer_tax::TransferTaxResult;

// =============================================================================
// Categories
// =============================================================================

/// Cost category a line item is grouped under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CostCategory {
    TransferTaxes,
    RecordingFees,
    TitleInsurance,
    SettlementFees,
    Prorations,
}

impl CostCategory {
    /// Every category, in statement display order.
    pub const ALL: [CostCategory; 5] = [
        CostCategory::TransferTaxes,
        CostCategory::RecordingFees,
        CostCategory::TitleInsurance,
        CostCategory::SettlementFees,
        CostCategory::Prorations,
    ];
}

impl fmt::Display for CostCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CostCategory::TransferTaxes => write!(f, "Transfer Taxes"),
            CostCategory::RecordingFees => write!(f, "Recording Fees"),
            CostCategory::TitleInsurance => write!(f, "Title Insurance"),
            CostCategory::SettlementFees => write!(f, "Settlement Fees"),
            CostCategory::Prorations => write!(f, "Prorations"),
        }
    }
}

// =============================================================================
// Line Items
// =============================================================================

/// Whether a line item increases or reduces what its side owes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Owed at closing by this side.
    Debit,
    /// Reduces what this side owes.
    Credit,
}

/// One ledger entry on the settlement statement. Never mutated after
/// creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    pub description: String,
    pub category: CostCategory,
    pub side: Side,
    pub kind: EntryKind,
    /// Non-negative magnitude.
    pub amount: Money,
}

impl LineItem {
    /// A debit entry.
    pub fn debit(
        category: CostCategory,
        side: Side,
        description: impl Into<String>,
        amount: Money,
    ) -> Self {
        LineItem {
            description: description.into(),
            category,
            side,
            kind: EntryKind::Debit,
            amount,
        }
    }

    /// A credit entry.
    pub fn credit(
        category: CostCategory,
        side: Side,
        description: impl Into<String>,
        amount: Money,
    ) -> Self {
        LineItem {
            description: description.into(),
            category,
            side,
            kind: EntryKind::Credit,
            amount,
        }
    }

    /// Debits count positive, credits negative.
    pub fn signed_amount(&self) -> Money {
        match self.kind {
            EntryKind::Debit => self.amount,
            EntryKind::Credit => -self.amount,
        }
    }
}

// =============================================================================
// Ledgers and Groups
// =============================================================================

/// One party's view of the statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SideLedger {
    pub side: Side,
    pub debits: Vec<LineItem>,
    pub credits: Vec<LineItem>,
    pub total_debits: Money,
    pub total_credits: Money,
    /// `total_debits - total_credits`; positive means this side pays.
    pub net: Money,
}

/// All line items of one category across both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryGroup {
    pub category: CostCategory,
    pub items: Vec<LineItem>,
    /// Signed sum of member items (debits +, credits -).
    pub subtotal: Money,
}

// =============================================================================
// Diagnostics
// =============================================================================

/// Raw per-calculator intermediate results, attached in verbose mode for
/// audit/debugging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationTrace {
    pub transfer_taxes: TransferTaxResult,
    pub recording: Option<RecordingResult>,
    pub title: Option<TitleResult>,
    pub settlement: SettlementResult,
    pub prorations: ProrationResult,
}

/// Which configuration produced this statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Diagnostics {
    /// The matched profile's identifier, e.g. `PA_ALLEGHENY`.
    pub jurisdiction_id: String,
    /// The geography path that matched, e.g. `PA/county/allegheny`.
    pub matched_path: String,
    pub matched_by: MatchLevel,
    /// Raw calculator results; present only when verbose mode is on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(skip)]
    pub trace: Option<CalculationTrace>,
}

// =============================================================================
// Closing Statement
// =============================================================================

/// The full aggregated calculation result. Constructed fresh on every
/// `calculate` invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClosingStatement {
    pub buyer: SideLedger,
    pub seller: SideLedger,
    /// Non-empty categories, in statement display order.
    pub categories: Vec<CategoryGroup>,
    pub diagnostics: Diagnostics,
}

// =============================================================================
// Unit Tests
// =============================================================================
