//! # Deal Validation
//!
//! Input validation for the calculation engine.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: The type system                                              │
//! │  ├── Document counts are u32 (non-negative by construction)            │
//! │  └── closing_date is a parsed NaiveDate (no invalid calendar dates)    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - value-level rules                              │
//! │  ├── Violations are COLLECTED, not thrown one at a time                │
//! │  └── A single aggregate error carries the full field list              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Calculators fail fast on inconsistent configuration          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing is calculated until the deal passes in full.

use rust_decimal::Decimal;

use crate::deal::{Deal, RecurringCharge};
use crate::error::{EngineError, EngineResult, FieldViolation};

// =============================================================================
// Deal Validation
// =============================================================================

/// Checks a deal against the input contract.
///
/// ## Rules
/// - `property.state` must be present
/// - `purchase_price >= 0` (a zero-price deal is degenerate but computable)
/// - `0 <= loan_amount <= purchase_price`
/// - every recurring charge needs a non-negative amount and a period that
///   runs forward
/// - fee overrides must be non-negative
///
/// Returns `EngineError::Validation` carrying every violation found.
pub fn validate_deal(deal: &Deal) -> EngineResult<()> {
    let mut violations: Vec<FieldViolation> = Vec::new();

    if deal.property.state.trim().is_empty() {
        violations.push(FieldViolation::new("property.state", "is required"));
    }

    if deal.purchase_price < Decimal::ZERO {
        violations.push(FieldViolation::new(
            "purchase_price",
            "must be non-negative",
        ));
    }

    if deal.loan_amount < Decimal::ZERO {
        violations.push(FieldViolation::new("loan_amount", "must be non-negative"));
    } else if deal.loan_amount > deal.purchase_price {
        violations.push(FieldViolation::new(
            "loan_amount",
            "cannot exceed purchase price",
        ));
    }

    validate_lines(&deal.tax_lines, "tax_lines", &mut violations);
    validate_lines(&deal.hoa_lines, "hoa_lines", &mut violations);

    for (key, amount) in &deal.fee_overrides {
        if *amount < Decimal::ZERO {
            violations.push(FieldViolation::new(
                format!("fee_overrides.{key}"),
                "must be non-negative",
            ));
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(EngineError::Validation(violations))
    }
}

fn validate_lines(lines: &[RecurringCharge], field: &str, violations: &mut Vec<FieldViolation>) {
    for (index, line) in lines.iter().enumerate() {
        if line.amount < Decimal::ZERO {
            violations.push(FieldViolation::new(
                format!("{field}[{index}].amount"),
                "must be non-negative",
            ));
        }
        if line.period_end <= line.period_start {
            violations.push(FieldViolation::new(
                format!("{field}[{index}].period_end"),
                "must be after period_start",
            ));
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
