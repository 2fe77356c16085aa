//! # Title Insurance Calculator
//!
//! Computes lender/owner policy premiums, the simultaneous-issue discount,
//! endorsement fees, and the closing-protection-letter fee.
//!
//! ## Premium Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  lender premium   priced on its basis, only if loan_amount > 0         │
//! │  owner premium    priced on its basis, only if the buyer selected it   │
//! │       │                                                                 │
//! │       ▼  both non-zero?                                                 │
//! │  simultaneous issue: discount the combined subtotal, then              │
//! │  redistribute the discounted total back across the two premiums        │
//! │  in proportion to their pre-discount share                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  + endorsements (unknown identifiers contribute zero)                  │
//! │  + CPL fee (only if selected and configured)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Allocation happens in the aggregator: lender premium, endorsements, and
//! CPL are buyer debits; the owner premium is a seller credit unless the
//! schedule's `buyer_pays_owner_policy` flag reroutes it to a buyer debit.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::deal::Deal;
use crate::error::{EngineError, EngineResult};
use crate::profile::{PolicyPricing, PremiumBasis, TitlePolicy, TitleSchedule};

// =============================================================================
// Results
// =============================================================================

/// One selected endorsement with its configured fee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndorsementFee {
    pub id: String,
    pub fee: Decimal,
}

/// Output of the title insurance calculator. Premiums are net of the
/// simultaneous-issue discount; the discount itself is carried separately
/// for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TitleResult {
    pub lender_premium: Decimal,
    pub owner_premium: Decimal,
    /// Amount taken off the combined premium subtotal; zero when the
    /// discount did not apply.
    pub simultaneous_discount: Decimal,
    pub endorsements: Vec<EndorsementFee>,
    pub cpl_fee: Decimal,
    pub total: Decimal,
}

// =============================================================================
// Calculator
// =============================================================================

/// Computes title insurance premiums and fees for the deal.
pub fn calculate_title_insurance(
    schedule: &TitleSchedule,
    deal: &Deal,
) -> EngineResult<TitleResult> {
    let mut lender_premium = if deal.loan_amount > Decimal::ZERO {
        premium(&schedule.lender_policy, deal)
    } else {
        Decimal::ZERO
    };

    let mut owner_premium = if deal.selections.owner_policy {
        schedule
            .owner_policy
            .as_ref()
            .map(|policy| premium(policy, deal))
            .unwrap_or(Decimal::ZERO)
    } else {
        Decimal::ZERO
    };

    let mut simultaneous_discount = Decimal::ZERO;
    if lender_premium > Decimal::ZERO && owner_premium > Decimal::ZERO {
        if let Some(discount) = &schedule.simultaneous_issue {
            if discount.discount_pct.is_sign_negative() || discount.discount_pct > Decimal::ONE_HUNDRED {
                return Err(EngineError::invalid_config(format!(
                    "simultaneous issue discount must be within 0-100, got {}",
                    discount.discount_pct
                )));
            }

            let subtotal = lender_premium + owner_premium;
            simultaneous_discount = subtotal * discount.discount_pct / Decimal::ONE_HUNDRED;
            let discounted = subtotal - simultaneous_discount;

            // Redistribute in proportion to each premium's pre-discount share;
            // deriving the owner side by subtraction keeps the pair exact.
            let discounted_lender = discounted * lender_premium / subtotal;
            owner_premium = discounted - discounted_lender;
            lender_premium = discounted_lender;
        }
    }

    let mut endorsements = Vec::new();
    let mut endorsement_total = Decimal::ZERO;
    for id in &deal.selections.endorsements {
        // Unknown identifiers contribute zero
        if let Some(fee) = schedule.endorsements.get(id) {
            endorsement_total += *fee;
            endorsements.push(EndorsementFee {
                id: id.clone(),
                fee: *fee,
            });
        }
    }

    let cpl_fee = if deal.selections.closing_protection_letter {
        schedule.closing_protection_letter.unwrap_or(Decimal::ZERO)
    } else {
        Decimal::ZERO
    };

    let total = lender_premium + owner_premium + endorsement_total + cpl_fee;

    Ok(TitleResult {
        lender_premium,
        owner_premium,
        simultaneous_discount,
        endorsements,
        cpl_fee,
        total,
    })
}

/// Prices one policy on its basis amount.
fn premium(policy: &TitlePolicy, deal: &Deal) -> Decimal {
    let basis = match policy.basis {
        PremiumBasis::LoanAmount => deal.loan_amount,
        PremiumBasis::PurchasePrice => deal.purchase_price,
    };

    match &policy.pricing {
        PolicyPricing::Percent { rate } => basis * *rate / Decimal::ONE_HUNDRED,
        PolicyPricing::Flat { amount } => *amount,
        PolicyPricing::RateTable { bands } => {
            for band in bands {
                let in_band = basis >= band.min && band.max.map_or(true, |max| basis <= max);
                if !in_band {
                    continue;
                }
                if let Some(flat) = band.flat {
                    return flat;
                }
                if let Some(rate) = band.rate {
                    return basis * rate / Decimal::ONE_HUNDRED;
                }
            }
            Decimal::ZERO
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
