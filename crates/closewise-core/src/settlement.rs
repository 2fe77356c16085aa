//! # Settlement & Flat Fees
//!
//! Merges the jurisdiction's flat-fee schedule with the deal's overrides
//! into a deterministic fee list.
//!
//! ## Merge Rules
//! - an override for a configured fee replaces its amount, keeping the
//!   configured payer
//! - an override for an unknown fee adds a new seller-paid fee
//! - iteration order is the sorted fee key order, so repeated runs produce
//!   identical output

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{EngineError, EngineResult};
use crate::profile::{FeeConfig, PayerRule, SettlementSchedule};

// =============================================================================
// Results
// =============================================================================

/// One settlement/flat fee after override merging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementFee {
    /// Fee key, e.g. `settlement_fee`.
    pub key: String,
    /// Display description, e.g. `Settlement Fee`.
    pub description: String,
    pub amount: Decimal,
    pub payer: PayerRule,
}

/// Output of the settlement fee stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettlementResult {
    pub entries: Vec<SettlementFee>,
    pub total: Decimal,
}

// =============================================================================
// Calculator
// =============================================================================

/// Builds the override-merged settlement fee list.
pub fn calculate_settlement_fees(
    schedule: Option<&SettlementSchedule>,
    overrides: &BTreeMap<String, Decimal>,
) -> EngineResult<SettlementResult> {
    let mut fees: BTreeMap<String, FeeConfig> = schedule.cloned().unwrap_or_default();

    for (key, amount) in overrides {
        match fees.get_mut(key) {
            Some(fee) => fee.amount = *amount,
            None => {
                fees.insert(
                    key.clone(),
                    FeeConfig {
                        amount: *amount,
                        payer: PayerRule::Seller,
                    },
                );
            }
        }
    }

    let mut entries = Vec::with_capacity(fees.len());
    let mut total = Decimal::ZERO;

    for (key, fee) in fees {
        fee.payer.ensure_valid(&format!("settlement fee '{key}'"))?;
        if fee.amount.is_sign_negative() {
            return Err(EngineError::invalid_config(format!(
                "settlement fee '{key}': amount must be non-negative, got {}",
                fee.amount
            )));
        }

        total += fee.amount;
        entries.push(SettlementFee {
            description: fee_description(&key),
            key,
            amount: fee.amount,
            payer: fee.payer,
        });
    }

    Ok(SettlementResult { entries, total })
}

/// Title-cases a snake_case fee key: `payoff_statement_fee` ->
/// `Payoff Statement Fee`.
fn fee_description(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// =============================================================================
// Unit Tests
// =============================================================================
