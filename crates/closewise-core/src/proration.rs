//! # Proration Calculator
//!
//! Allocates recurring charges (property tax, HOA dues) between buyer and
//! seller by ownership days within the billing period.
//!
//! ## Day Split
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  period_start ──────────────── closing ──────────────── period_end     │
//! │                                                                         │
//! │  buyer_days  = days(period_start, closing)                             │
//! │                + 1 when the policy gives the buyer the closing day     │
//! │                (clamped to [0, days_in_period])                        │
//! │  seller_days = days_in_period - buyer_days                             │
//! │                                                                         │
//! │  daily_rate   = amount / days_in_period   (exact, unrounded)           │
//! │  buyer_share  = daily_rate * buyer_days   (rounded per policy, once)   │
//! │  seller_share = amount - buyer_share      (derived: shares always sum  │
//! │                                            exactly to the line amount) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## HUD Debit/Credit Treatment
//! The treatment below is the crux of settlement-statement correctness; a
//! sign or direction error here silently misstates cash due at closing.
//!
//! | payment status | buyer                   | seller                  |
//! |----------------|-------------------------|-------------------------|
//! | paid           | DEBIT of seller_share   | CREDIT of buyer_share   |
//! | unpaid         | CREDIT of seller_share  | DEBIT of buyer_share    |
//! | unknown        | resolved via the policy's default proration style |

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::deal::{PaymentStatus, RecurringCharge, Side};
use crate::error::{EngineError, EngineResult};
use crate::money::{Money, RoundingMode};
use crate::profile::{ProrationPolicy, ProrationStyle};

// =============================================================================
// Results
// =============================================================================

/// One prorated recurring charge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProratedLine {
    pub description: String,
    /// Total billed amount for the period (exact cents).
    pub amount: Money,
    /// Days from period start through the closing split point.
    pub buyer_days: i64,
    /// Remaining days of the period.
    pub seller_days: i64,
    /// Unrounded daily rate, for display/audit.
    pub daily_rate: Decimal,
    /// Pre-closing share, rounded once per the policy's rounding mode.
    pub buyer_share: Money,
    /// Post-closing share, derived so the shares sum to `amount`.
    pub seller_share: Money,
    /// The payment status after resolving `Unknown` via the policy.
    pub effective_status: PaymentStatus,
}

/// Output of the proration calculator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProrationResult {
    pub entries: Vec<ProratedLine>,
}

// =============================================================================
// Calculator
// =============================================================================

/// Prorates every recurring charge line against the closing date.
pub fn prorate_lines(
    lines: &[RecurringCharge],
    closing_date: NaiveDate,
    policy: &ProrationPolicy,
) -> EngineResult<ProrationResult> {
    let entries = lines
        .iter()
        .map(|line| prorate_line(line, closing_date, policy))
        .collect::<EngineResult<Vec<_>>>()?;

    Ok(ProrationResult { entries })
}

/// Prorates a single recurring charge.
pub fn prorate_line(
    line: &RecurringCharge,
    closing_date: NaiveDate,
    policy: &ProrationPolicy,
) -> EngineResult<ProratedLine> {
    let days_in_period = policy
        .day_count
        .days_between(line.period_start, line.period_end);
    if days_in_period <= 0 {
        // A calendar-valid period can still count zero days under 30/360
        // (e.g. Jan 30 -> Jan 31); a daily rate is undefined there.
        return Err(EngineError::invalid_config(format!(
            "proration '{}': period counts {days_in_period} day(s) under the {} convention",
            line.description, policy.day_count
        )));
    }

    let daily_rate = line.amount / Decimal::from(days_in_period);

    let days_to_closing = policy
        .day_count
        .days_between(line.period_start, closing_date);
    let raw_buyer_days = match policy.closing_day_owner {
        Side::Buyer => days_to_closing + 1,
        Side::Seller => days_to_closing,
    };
    let buyer_days = raw_buyer_days.clamp(0, days_in_period);
    let seller_days = days_in_period - buyer_days;

    let amount = Money::from_decimal(line.amount, RoundingMode::Cents);
    // Rounding happens exactly once, here; the seller share is derived by
    // subtraction so the two always sum to the line amount.
    let buyer_share =
        Money::from_decimal(daily_rate * Decimal::from(buyer_days), policy.rounding).min(amount);
    let seller_share = amount - buyer_share;

    let effective_status = match line.payment_status {
        PaymentStatus::Unknown => match policy.default_style {
            ProrationStyle::PaidInAdvanceCommon => PaymentStatus::Paid,
            ProrationStyle::ArrearsCommon => PaymentStatus::Unpaid,
        },
        status => status,
    };

    Ok(ProratedLine {
        description: line.description.clone(),
        amount,
        buyer_days,
        seller_days,
        daily_rate,
        buyer_share,
        seller_share,
        effective_status,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
