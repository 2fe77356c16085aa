//! # Transfer Tax Calculator
//!
//! Evaluates a jurisdiction's ordered list of transfer-tax rules against the
//! deal's base amounts.
//!
//! ## Calculation Types
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  percent          base * rate / 100                                    │
//! │  flat             configured amount, base ignored                      │
//! │  tiered_brackets  Σ rate/100 * max(0, min(base, upper) - lower)        │
//! │                   per bracket; an unbounded bracket's effective        │
//! │                   upper bound is the base amount itself                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Brackets contribute independently - each taxes only its own slice, so a
//! contiguous table starting at zero behaves exactly like marginal tax
//! brackets: no double-count, no gap at the boundaries.
//!
//! Amounts stay unrounded `Decimal`s here; allocation and rounding happen
//! in the aggregator.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::deal::Deal;
use crate::error::{EngineError, EngineResult};
use crate::profile::{Bracket, PayerRule, TaxBase, TaxCalc, TransferTaxRule};

// =============================================================================
// Results
// =============================================================================

/// One evaluated transfer-tax rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxRuleOutcome {
    pub name: String,
    pub description: String,
    /// Computed tax amount, unrounded dollars.
    pub amount: Decimal,
    /// Who pays, carried through to the aggregator.
    pub payer: PayerRule,
}

/// Output of the transfer tax calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferTaxResult {
    /// One entry per enabled rule, in rule order.
    pub entries: Vec<TaxRuleOutcome>,
    /// Sum of all entries.
    pub total: Decimal,
}

// =============================================================================
// Calculator
// =============================================================================

/// Evaluates every enabled rule against the deal.
///
/// Rules with `enabled = false` are skipped entirely. A rule with a
/// negative rate/amount or an invalid split fails fast with
/// `InvalidConfiguration` - never a silent zero.
pub fn calculate_transfer_taxes(
    rules: &[TransferTaxRule],
    deal: &Deal,
) -> EngineResult<TransferTaxResult> {
    let mut entries = Vec::new();
    let mut total = Decimal::ZERO;

    for rule in rules.iter().filter(|r| r.enabled) {
        let context = format!("transfer tax '{}'", rule.name);
        rule.payer.ensure_valid(&context)?;

        let base = base_amount(rule.base, deal);
        let amount = match &rule.calc {
            TaxCalc::Percent { rate } => {
                if rate.is_sign_negative() {
                    return Err(EngineError::invalid_config(format!(
                        "{context}: rate must be non-negative, got {rate}"
                    )));
                }
                base * *rate / Decimal::ONE_HUNDRED
            }
            TaxCalc::Flat { amount } => {
                if amount.is_sign_negative() {
                    return Err(EngineError::invalid_config(format!(
                        "{context}: flat amount must be non-negative, got {amount}"
                    )));
                }
                *amount
            }
            TaxCalc::TieredBrackets { brackets } => {
                if brackets.is_empty() {
                    return Err(EngineError::invalid_config(format!(
                        "{context}: bracket table must not be empty"
                    )));
                }
                bracket_tax(base, brackets, &context)?
            }
        };

        total += amount;
        entries.push(TaxRuleOutcome {
            name: rule.name.clone(),
            description: rule.description.clone(),
            amount,
            payer: rule.payer.clone(),
        });
    }

    Ok(TransferTaxResult { entries, total })
}

/// Selects the deal amount a rule is assessed on.
fn base_amount(base: TaxBase, deal: &Deal) -> Decimal {
    match base {
        TaxBase::Price | TaxBase::Deed => deal.purchase_price,
        TaxBase::Loan | TaxBase::Mortgage => deal.loan_amount,
    }
}

/// Sums each bracket's tax on its own slice of the base.
fn bracket_tax(base: Decimal, brackets: &[Bracket], context: &str) -> EngineResult<Decimal> {
    let mut total = Decimal::ZERO;

    for bracket in brackets {
        if bracket.rate.is_sign_negative() {
            return Err(EngineError::invalid_config(format!(
                "{context}: bracket rate must be non-negative, got {}",
                bracket.rate
            )));
        }

        let upper = bracket.upper.unwrap_or(base);
        let portion = (base.min(upper) - bracket.lower).max(Decimal::ZERO);
        total += portion * bracket.rate / Decimal::ONE_HUNDRED;
    }

    Ok(total)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deal::PropertyLocation;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn deal(price: Decimal, loan: Decimal) -> Deal {
        Deal {
            property: PropertyLocation::state_only("PA"),
            purchase_price: price,
            loan_amount: loan,
            closing_date: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
            documents: Default::default(),
            selections: Default::default(),
            tax_lines: Vec::new(),
            hoa_lines: Vec::new(),
            fee_overrides: Default::default(),
        }
    }

    fn percent_rule(name: &str, base: TaxBase, rate: Decimal, payer: PayerRule) -> TransferTaxRule {
        TransferTaxRule {
            name: name.to_string(),
            description: name.to_string(),
            base,
            calc: TaxCalc::Percent { rate },
            payer,
            enabled: true,
        }
    }

    fn standard_brackets() -> Vec<Bracket> {
        vec![
            Bracket {
                lower: dec!(0),
                upper: Some(dec!(100000)),
                rate: dec!(0.5),
            },
            Bracket {
                lower: dec!(100000),
                upper: Some(dec!(500000)),
                rate: dec!(1.0),
            },
            Bracket {
                lower: dec!(500000),
                upper: None,
                rate: dec!(1.5),
            },
        ]
    }

    #[test]
    fn test_percent_rules_on_price_and_loan() {
        let rules = vec![
            percent_rule("deed_tax", TaxBase::Price, dec!(1.0), PayerRule::Seller),
            percent_rule("mortgage_tax", TaxBase::Loan, dec!(0.5), PayerRule::Buyer),
        ];

        let result =
            calculate_transfer_taxes(&rules, &deal(dec!(300000), dec!(240000))).unwrap();
        assert_eq!(result.entries.len(), 2);
        assert_eq!(result.entries[0].amount, dec!(3000));
        assert_eq!(result.entries[1].amount, dec!(1200));
        assert_eq!(result.total, dec!(4200));
    }

    #[test]
    fn test_seller_paid_state_and_school_district_taxes() {
        // 1% state + 0.5% school district on a $200k price = $3,000
        let rules = vec![
            percent_rule("state_tax", TaxBase::Price, dec!(1.0), PayerRule::Seller),
            percent_rule("school_tax", TaxBase::Price, dec!(0.5), PayerRule::Seller),
        ];

        let result =
            calculate_transfer_taxes(&rules, &deal(dec!(200000), dec!(150000))).unwrap();
        assert_eq!(result.total, dec!(3000));
        assert!(result
            .entries
            .iter()
            .all(|e| e.payer == PayerRule::Seller));
    }

    #[test]
    fn test_flat_rule_ignores_base() {
        let rules = vec![TransferTaxRule {
            name: "stamp".to_string(),
            description: "Document Stamp".to_string(),
            base: TaxBase::Price,
            calc: TaxCalc::Flat { amount: dec!(125) },
            payer: PayerRule::Buyer,
            enabled: true,
        }];

        let result = calculate_transfer_taxes(&rules, &deal(dec!(1), dec!(0))).unwrap();
        assert_eq!(result.total, dec!(125));
    }

    #[test]
    fn test_bracket_tax_spans_brackets() {
        // $300k: 100k @ 0.5% + 200k @ 1% = $500 + $2,000 = $2,500
        let tax = bracket_tax(dec!(300000), &standard_brackets(), "test").unwrap();
        assert_eq!(tax, dec!(2500));
    }

    #[test]
    fn test_bracket_tax_within_first_bracket() {
        let tax = bracket_tax(dec!(50000), &standard_brackets(), "test").unwrap();
        assert_eq!(tax, dec!(250));
    }

    #[test]
    fn test_bracket_tax_into_unbounded_bracket() {
        // $1M: 100k @ 0.5% + 400k @ 1% + 500k @ 1.5% = $12,000
        let tax = bracket_tax(dec!(1000000), &standard_brackets(), "test").unwrap();
        assert_eq!(tax, dec!(12000));
    }

    #[test]
    fn test_bracket_continuity_at_boundary() {
        // Exactly at the 100k boundary the second bracket's slice is empty,
        // so the tax equals the first bracket's full slice - no double
        // count, no gap.
        let at_boundary = bracket_tax(dec!(100000), &standard_brackets(), "test").unwrap();
        assert_eq!(at_boundary, dec!(500));

        let just_above = bracket_tax(dec!(100001), &standard_brackets(), "test").unwrap();
        assert_eq!(just_above, dec!(500.01));
    }

    #[test]
    fn test_base_below_all_brackets() {
        let brackets = vec![Bracket {
            lower: dec!(100000),
            upper: None,
            rate: dec!(1.0),
        }];
        let tax = bracket_tax(dec!(50000), &brackets, "test").unwrap();
        assert_eq!(tax, Decimal::ZERO);
    }

    #[test]
    fn test_disabled_rule_skipped() {
        let mut rule = percent_rule("off", TaxBase::Price, dec!(1.0), PayerRule::Seller);
        rule.enabled = false;

        let result =
            calculate_transfer_taxes(&[rule], &deal(dec!(300000), dec!(0))).unwrap();
        assert!(result.entries.is_empty());
        assert_eq!(result.total, Decimal::ZERO);
    }

    #[test]
    fn test_negative_rate_fails_fast() {
        let rules = vec![percent_rule(
            "bad",
            TaxBase::Price,
            dec!(-1.0),
            PayerRule::Seller,
        )];
        let err = calculate_transfer_taxes(&rules, &deal(dec!(100), dec!(0))).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_invalid_split_fails_fast() {
        let rules = vec![percent_rule(
            "bad_split",
            TaxBase::Price,
            dec!(1.0),
            PayerRule::Split {
                buyer_pct: dec!(60),
                seller_pct: dec!(50),
            },
        )];
        let err = calculate_transfer_taxes(&rules, &deal(dec!(100), dec!(0))).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_empty_bracket_table_fails_fast() {
        let rules = vec![TransferTaxRule {
            name: "empty".to_string(),
            description: "Empty".to_string(),
            base: TaxBase::Price,
            calc: TaxCalc::TieredBrackets {
                brackets: Vec::new(),
            },
            payer: PayerRule::Buyer,
            enabled: true,
        }];
        let err = calculate_transfer_taxes(&rules, &deal(dec!(100), dec!(0))).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfiguration { .. }));
    }
}
