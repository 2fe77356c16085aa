//! # Closing Cost Engine
//!
//! The calculation facade and output aggregator.
//!
//! ## Control Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  calculate(deal)                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate_deal ── all violations collected, or nothing runs            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ProfileStore::resolve ── zip > city > county > state > DEFAULT        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  transfer taxes │ recording │ title │ settlement │ prorations          │
//! │  (each calculator is independent and returns raw amounts)              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  AGGREGATION ── the ONLY place allocation becomes signed ledger        │
//! │  entries: per-side debits/credits, totals, nets, category groups       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine is a pure function of (deal, store): no I/O, no clocks, no
//! randomness. Identical inputs produce byte-identical statements.

use rust_decimal::Decimal;

use crate::deal::{Deal, PaymentStatus, Side};
use crate::error::{EngineError, EngineResult};
use crate::money::{Money, RoundingMode};
use crate::profile::PayerRule;
use crate::proration::{prorate_lines, ProrationResult};
use crate::recording::{calculate_recording_fees, RecordingResult};
use crate::resolver::ProfileStore;
use crate::settlement::calculate_settlement_fees;
use crate::statement::{
    CalculationTrace, CategoryGroup, ClosingStatement, CostCategory, Diagnostics, EntryKind,
    LineItem, SideLedger,
};
use crate::title::{calculate_title_insurance, TitleResult};
use crate::transfer_tax::calculate_transfer_taxes;
use crate::validation::validate_deal;

// =============================================================================
// Options
// =============================================================================

/// Engine behavior switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineOptions {
    /// Attach raw per-calculator results to the diagnostics.
    pub verbose: bool,
}

// =============================================================================
// Engine
// =============================================================================

/// The closing cost calculation engine.
///
/// Holds the injected profile store; `calculate` never mutates it, so one
/// engine can serve any number of concurrent calculations.
#[derive(Debug, Clone)]
pub struct ClosingCostEngine {
    store: ProfileStore,
    options: EngineOptions,
}

impl ClosingCostEngine {
    /// Creates an engine over an already-populated profile store.
    pub fn new(store: ProfileStore) -> Self {
        ClosingCostEngine {
            store,
            options: EngineOptions::default(),
        }
    }

    /// Creates an engine with explicit options.
    pub fn with_options(store: ProfileStore, options: EngineOptions) -> Self {
        ClosingCostEngine { store, options }
    }

    /// Read-only access to the injected store.
    pub fn store(&self) -> &ProfileStore {
        &self.store
    }

    /// Calculates the full closing statement for a deal.
    ///
    /// Either fully succeeds or fully fails - there is no partial-result
    /// mode.
    pub fn calculate(&self, deal: &Deal) -> EngineResult<ClosingStatement> {
        validate_deal(deal)?;

        let (matched_path, resolved) = self.store.resolve(&deal.property)?;
        let profile = resolved.profile;

        // Run the calculators independently against the profile and deal.
        let taxes = calculate_transfer_taxes(&profile.transfer_taxes, deal)?;

        let recording: Option<RecordingResult> = profile
            .recording
            .as_ref()
            .map(|schedule| calculate_recording_fees(schedule, &deal.documents));

        let title: Option<TitleResult> = match &profile.title {
            Some(schedule) => Some(calculate_title_insurance(schedule, deal)?),
            None => None,
        };

        let settlement = calculate_settlement_fees(profile.settlement.as_ref(), &deal.fee_overrides)?;

        let prorations: ProrationResult =
            if deal.tax_lines.is_empty() && deal.hoa_lines.is_empty() {
                ProrationResult::default()
            } else {
                let policy = profile.proration.as_ref().ok_or_else(|| {
                    EngineError::invalid_config(format!(
                        "profile '{}' has recurring charge lines to prorate but no proration policy",
                        profile.jurisdiction_id
                    ))
                })?;
                let mut result = prorate_lines(&deal.tax_lines, deal.closing_date, policy)?;
                let hoa = prorate_lines(&deal.hoa_lines, deal.closing_date, policy)?;
                result.entries.extend(hoa.entries);
                result
            };

        // Aggregation: the only place allocation becomes signed entries.
        let mut items: Vec<LineItem> = Vec::new();

        for entry in &taxes.entries {
            allocate_debit(
                &mut items,
                CostCategory::TransferTaxes,
                &entry.description,
                entry.amount,
                &entry.payer,
            );
        }

        if let Some(recording) = &recording {
            // Recording fees are buyer debits by convention
            for entry in &recording.entries {
                push_item(
                    &mut items,
                    LineItem::debit(
                        CostCategory::RecordingFees,
                        Side::Buyer,
                        entry.description.clone(),
                        Money::from_decimal(entry.amount, RoundingMode::Cents),
                    ),
                );
            }
        }

        if let Some(title) = &title {
            let buyer_pays_owner = profile
                .title
                .as_ref()
                .map(|schedule| schedule.buyer_pays_owner_policy)
                .unwrap_or(false);

            push_item(
                &mut items,
                LineItem::debit(
                    CostCategory::TitleInsurance,
                    Side::Buyer,
                    "Lender Title Insurance Policy",
                    Money::from_decimal(title.lender_premium, RoundingMode::Cents),
                ),
            );

            let owner_premium = Money::from_decimal(title.owner_premium, RoundingMode::Cents);
            let owner_item = if buyer_pays_owner {
                LineItem::debit(
                    CostCategory::TitleInsurance,
                    Side::Buyer,
                    "Owner Title Insurance Policy",
                    owner_premium,
                )
            } else {
                LineItem::credit(
                    CostCategory::TitleInsurance,
                    Side::Seller,
                    "Owner Title Insurance Policy",
                    owner_premium,
                )
            };
            push_item(&mut items, owner_item);

            for endorsement in &title.endorsements {
                push_item(
                    &mut items,
                    LineItem::debit(
                        CostCategory::TitleInsurance,
                        Side::Buyer,
                        format!("Endorsement: {}", endorsement.id),
                        Money::from_decimal(endorsement.fee, RoundingMode::Cents),
                    ),
                );
            }

            push_item(
                &mut items,
                LineItem::debit(
                    CostCategory::TitleInsurance,
                    Side::Buyer,
                    "Closing Protection Letter",
                    Money::from_decimal(title.cpl_fee, RoundingMode::Cents),
                ),
            );
        }

        for fee in &settlement.entries {
            allocate_debit(
                &mut items,
                CostCategory::SettlementFees,
                &fee.description,
                fee.amount,
                &fee.payer,
            );
        }

        for line in &prorations.entries {
            match line.effective_status {
                // Seller prepaid the period: the buyer reimburses the
                // post-closing share, the seller is credited the
                // pre-closing share.
                PaymentStatus::Paid => {
                    push_item(
                        &mut items,
                        LineItem::debit(
                            CostCategory::Prorations,
                            Side::Buyer,
                            line.description.clone(),
                            line.seller_share,
                        ),
                    );
                    push_item(
                        &mut items,
                        LineItem::credit(
                            CostCategory::Prorations,
                            Side::Seller,
                            line.description.clone(),
                            line.buyer_share,
                        ),
                    );
                }
                // Bill payable after closing: the seller hands over the
                // pre-closing share, the buyer is credited the
                // post-closing share.
                PaymentStatus::Unpaid => {
                    push_item(
                        &mut items,
                        LineItem::debit(
                            CostCategory::Prorations,
                            Side::Seller,
                            line.description.clone(),
                            line.buyer_share,
                        ),
                    );
                    push_item(
                        &mut items,
                        LineItem::credit(
                            CostCategory::Prorations,
                            Side::Buyer,
                            line.description.clone(),
                            line.seller_share,
                        ),
                    );
                }
                // prorate_line resolved Unknown via the policy default
                PaymentStatus::Unknown => unreachable!("unknown status survived proration"),
            }
        }

        let buyer = build_ledger(Side::Buyer, &items);
        let seller = build_ledger(Side::Seller, &items);
        let categories = build_categories(&items);

        let trace = self.options.verbose.then(|| CalculationTrace {
            transfer_taxes: taxes,
            recording,
            title,
            settlement,
            prorations,
        });

        Ok(ClosingStatement {
            buyer,
            seller,
            categories,
            diagnostics: Diagnostics {
                jurisdiction_id: profile.jurisdiction_id.clone(),
                matched_path,
                matched_by: resolved.level,
                trace,
            },
        })
    }
}

// =============================================================================
// Aggregation Helpers
// =============================================================================

/// Appends an item unless its amount is zero.
fn push_item(items: &mut Vec<LineItem>, item: LineItem) {
    if !item.amount.is_zero() {
        items.push(item);
    }
}

/// Turns one charge into debit entries per its payer rule.
///
/// Splits round the buyer portion to cents and derive the seller portion by
/// subtraction, so the two sides always sum to the rounded total.
fn allocate_debit(
    items: &mut Vec<LineItem>,
    category: CostCategory,
    description: &str,
    amount: Decimal,
    payer: &PayerRule,
) {
    let total = Money::from_decimal(amount, RoundingMode::Cents);
    match payer {
        PayerRule::Buyer => {
            push_item(items, LineItem::debit(category, Side::Buyer, description, total));
        }
        PayerRule::Seller => {
            push_item(items, LineItem::debit(category, Side::Seller, description, total));
        }
        PayerRule::Split { buyer_pct, .. } => {
            let buyer_amount = Money::from_decimal(
                amount * *buyer_pct / Decimal::ONE_HUNDRED,
                RoundingMode::Cents,
            );
            let seller_amount = total - buyer_amount;
            push_item(
                items,
                LineItem::debit(category, Side::Buyer, description, buyer_amount),
            );
            push_item(
                items,
                LineItem::debit(category, Side::Seller, description, seller_amount),
            );
        }
    }
}

/// Collects one side's debits/credits and computes its totals and net.
fn build_ledger(side: Side, items: &[LineItem]) -> SideLedger {
    let mut debits = Vec::new();
    let mut credits = Vec::new();
    let mut total_debits = Money::zero();
    let mut total_credits = Money::zero();

    for item in items.iter().filter(|item| item.side == side) {
        match item.kind {
            EntryKind::Debit => {
                total_debits += item.amount;
                debits.push(item.clone());
            }
            EntryKind::Credit => {
                total_credits += item.amount;
                credits.push(item.clone());
            }
        }
    }

    SideLedger {
        side,
        debits,
        credits,
        total_debits,
        total_credits,
        net: total_debits - total_credits,
    }
}

/// Groups items by category with signed subtotals, skipping empty groups.
fn build_categories(items: &[LineItem]) -> Vec<CategoryGroup> {
    CostCategory::ALL
        .iter()
        .filter_map(|&category| {
            let members: Vec<LineItem> = items
                .iter()
                .filter(|item| item.category == category)
                .cloned()
                .collect();
            if members.is_empty() {
                return None;
            }

            let subtotal = members
                .iter()
                .fold(Money::zero(), |sum, item| sum + item.signed_amount());
            Some(CategoryGroup {
                category,
                items: members,
                subtotal,
            })
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::DayCount;
    use crate::deal::{
        AncillaryDocument, BuyerSelections, DocumentCounts, PropertyLocation, RecurringCharge,
    };
    use crate::profile::{
        FeeConfig, FeeSchedule, JurisdictionProfile, PolicyPricing, PremiumBasis, ProrationPolicy,
        ProrationStyle, RecordingSchedule, SimultaneousIssueDiscount, SpecificityLevel, TaxBase,
        TaxCalc, TitlePolicy, TitleSchedule, TransferTaxRule,
    };
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn pa_profile() -> JurisdictionProfile {
        let mut endorsements = BTreeMap::new();
        endorsements.insert("ALTA-1".to_string(), dec!(100));

        let mut settlement = BTreeMap::new();
        settlement.insert(
            "settlement_fee".to_string(),
            FeeConfig {
                amount: dec!(500),
                payer: PayerRule::Seller,
            },
        );
        settlement.insert(
            "attorney_fee".to_string(),
            FeeConfig {
                amount: dec!(600),
                payer: PayerRule::Seller,
            },
        );

        JurisdictionProfile {
            jurisdiction_id: "PA".to_string(),
            level: SpecificityLevel::State,
            state: "PA".to_string(),
            county: None,
            city: None,
            postal_code: None,
            description: Some("Pennsylvania".to_string()),
            transfer_taxes: vec![
                TransferTaxRule {
                    name: "state_transfer_tax".to_string(),
                    description: "PA State Transfer Tax".to_string(),
                    base: TaxBase::Price,
                    calc: TaxCalc::Percent { rate: dec!(1.0) },
                    payer: PayerRule::Seller,
                    enabled: true,
                },
                TransferTaxRule {
                    name: "school_district_tax".to_string(),
                    description: "School District Transfer Tax".to_string(),
                    base: TaxBase::Price,
                    calc: TaxCalc::Percent { rate: dec!(0.5) },
                    payer: PayerRule::Seller,
                    enabled: true,
                },
            ],
            recording: Some(RecordingSchedule {
                deed: Some(FeeSchedule {
                    per_document: dec!(50),
                    per_page: dec!(2),
                    page_tiers: Vec::new(),
                }),
                mortgage: Some(FeeSchedule {
                    per_document: dec!(50),
                    per_page: dec!(2),
                    page_tiers: Vec::new(),
                }),
                ancillary: BTreeMap::new(),
                flat_surcharge: None,
            }),
            title: Some(TitleSchedule {
                lender_policy: TitlePolicy {
                    basis: PremiumBasis::LoanAmount,
                    pricing: PolicyPricing::Percent { rate: dec!(0.5) },
                },
                owner_policy: Some(TitlePolicy {
                    basis: PremiumBasis::PurchasePrice,
                    pricing: PolicyPricing::Percent { rate: dec!(0.6) },
                }),
                simultaneous_issue: Some(SimultaneousIssueDiscount {
                    discount_pct: dec!(25),
                }),
                endorsements,
                closing_protection_letter: Some(dec!(150)),
                buyer_pays_owner_policy: false,
            }),
            settlement: Some(settlement),
            proration: Some(ProrationPolicy {
                day_count: DayCount::Actual365,
                closing_day_owner: Side::Buyer,
                rounding: RoundingMode::Cents,
                default_style: ProrationStyle::PaidInAdvanceCommon,
            }),
        }
    }

    fn pa_store() -> ProfileStore {
        let mut store = ProfileStore::new();
        store.insert(pa_profile()).unwrap();
        store
    }

    fn pa_deal() -> Deal {
        Deal {
            property: PropertyLocation {
                state: "PA".to_string(),
                county: Some("Allegheny".to_string()),
                city: Some("Pittsburgh".to_string()),
                postal_code: None,
            },
            purchase_price: dec!(300000),
            loan_amount: dec!(240000),
            closing_date: date(2024, 6, 15),
            documents: DocumentCounts {
                deed_documents: 1,
                deed_pages: 3,
                mortgage_documents: 1,
                mortgage_pages: 5,
                ancillary: Vec::new(),
            },
            selections: BuyerSelections {
                owner_policy: true,
                endorsements: vec!["ALTA-1".to_string()],
                closing_protection_letter: true,
            },
            tax_lines: Vec::new(),
            hoa_lines: Vec::new(),
            fee_overrides: BTreeMap::new(),
        }
    }

    fn find<'a>(ledger: &'a [LineItem], description: &str) -> &'a LineItem {
        ledger
            .iter()
            .find(|item| item.description == description)
            .unwrap_or_else(|| panic!("no line item '{description}'"))
    }

    #[test]
    fn test_seller_paid_transfer_taxes() {
        // $200k price, 1% state + 0.5% school district, both seller-paid
        let mut deal = pa_deal();
        deal.purchase_price = dec!(200000);
        deal.loan_amount = dec!(150000);

        let engine = ClosingCostEngine::new(pa_store());
        let statement = engine.calculate(&deal).unwrap();

        let state_tax = find(&statement.seller.debits, "PA State Transfer Tax");
        let school_tax = find(&statement.seller.debits, "School District Transfer Tax");
        assert_eq!(state_tax.amount, Money::from_dollars(2000));
        assert_eq!(school_tax.amount, Money::from_dollars(1000));

        // Fully seller-debited: nothing tax-related on the buyer side
        assert!(statement
            .buyer
            .debits
            .iter()
            .all(|item| item.category != CostCategory::TransferTaxes));

        let taxes = statement
            .categories
            .iter()
            .find(|group| group.category == CostCategory::TransferTaxes)
            .unwrap();
        assert_eq!(taxes.subtotal, Money::from_dollars(3000));
    }

    #[test]
    fn test_recording_fees_are_buyer_debits() {
        let engine = ClosingCostEngine::new(pa_store());
        let statement = engine.calculate(&pa_deal()).unwrap();

        let deed = find(&statement.buyer.debits, "Deed Recording");
        let mortgage = find(&statement.buyer.debits, "Mortgage Recording");
        assert_eq!(deed.amount, Money::from_dollars(56));
        assert_eq!(mortgage.amount, Money::from_dollars(60));
    }

    #[test]
    fn test_title_allocation() {
        let engine = ClosingCostEngine::new(pa_store());
        let statement = engine.calculate(&pa_deal()).unwrap();

        // Pre-discount $1,200 + $1,800, 25% simultaneous issue discount,
        // redistributed to $900 lender / $1,350 owner
        let lender = find(&statement.buyer.debits, "Lender Title Insurance Policy");
        assert_eq!(lender.amount, Money::from_dollars(900));

        // Owner policy is a seller credit unless the schedule reroutes it
        let owner = find(&statement.seller.credits, "Owner Title Insurance Policy");
        assert_eq!(owner.amount, Money::from_dollars(1350));

        let endorsement = find(&statement.buyer.debits, "Endorsement: ALTA-1");
        assert_eq!(endorsement.amount, Money::from_dollars(100));

        let cpl = find(&statement.buyer.debits, "Closing Protection Letter");
        assert_eq!(cpl.amount, Money::from_dollars(150));
    }

    #[test]
    fn test_buyer_pays_owner_policy_flag() {
        let mut profile = pa_profile();
        profile.title.as_mut().unwrap().buyer_pays_owner_policy = true;
        let mut store = ProfileStore::new();
        store.insert(profile).unwrap();

        let engine = ClosingCostEngine::new(store);
        let statement = engine.calculate(&pa_deal()).unwrap();

        let owner = find(&statement.buyer.debits, "Owner Title Insurance Policy");
        assert_eq!(owner.amount, Money::from_dollars(1350));
        assert!(statement.seller.credits.is_empty());
    }

    #[test]
    fn test_settlement_fee_override() {
        let mut deal = pa_deal();
        deal.fee_overrides
            .insert("settlement_fee".to_string(), dec!(450));
        deal.fee_overrides.insert("wire_fee".to_string(), dec!(30));

        let engine = ClosingCostEngine::new(pa_store());
        let statement = engine.calculate(&deal).unwrap();

        let settlement_fee = find(&statement.seller.debits, "Settlement Fee");
        assert_eq!(settlement_fee.amount, Money::from_dollars(450));

        // Unknown override key becomes a new seller-paid fee
        let wire_fee = find(&statement.seller.debits, "Wire Fee");
        assert_eq!(wire_fee.amount, Money::from_dollars(30));
    }

    #[test]
    fn test_split_fee_allocation() {
        let mut profile = pa_profile();
        profile.settlement.as_mut().unwrap().insert(
            "escrow_fee".to_string(),
            FeeConfig {
                amount: dec!(401),
                payer: PayerRule::Split {
                    buyer_pct: dec!(50),
                    seller_pct: dec!(50),
                },
            },
        );
        let mut store = ProfileStore::new();
        store.insert(profile).unwrap();

        let engine = ClosingCostEngine::new(store);
        let statement = engine.calculate(&pa_deal()).unwrap();

        // $401 split 50/50: buyer rounds to $200.50, seller gets the rest
        let buyer_half = find(&statement.buyer.debits, "Escrow Fee");
        let seller_half = find(&statement.seller.debits, "Escrow Fee");
        assert_eq!(buyer_half.amount, Money::from_cents(20050));
        assert_eq!(seller_half.amount, Money::from_cents(20050));
    }

    #[test]
    fn test_paid_proration_treatment() {
        // $1,200 full-year line, actual/365, closing mid-year, Paid status,
        // buyer owns the closing day
        let mut deal = pa_deal();
        deal.tax_lines.push(RecurringCharge {
            description: "Annual Property Tax".to_string(),
            amount: dec!(1200),
            period_start: date(2024, 1, 1),
            period_end: date(2024, 12, 31),
            payment_status: PaymentStatus::Paid,
            billed_to: Some(Side::Seller),
        });

        let engine = ClosingCostEngine::new(pa_store());
        let statement = engine.calculate(&deal).unwrap();

        // Buyer is debited the seller's (post-closing) share; seller is
        // credited the buyer's (pre-closing) share; shares sum to $1,200.
        let buyer_debit = find(&statement.buyer.debits, "Annual Property Tax");
        let seller_credit = find(&statement.seller.credits, "Annual Property Tax");
        assert_eq!(buyer_debit.amount, Money::from_cents(65_096));
        assert_eq!(seller_credit.amount, Money::from_cents(54_904));
        assert_eq!(
            buyer_debit.amount + seller_credit.amount,
            Money::from_dollars(1200)
        );
    }

    #[test]
    fn test_unpaid_proration_treatment() {
        let mut deal = pa_deal();
        deal.tax_lines.push(RecurringCharge {
            description: "Annual Property Tax".to_string(),
            amount: dec!(1200),
            period_start: date(2024, 1, 1),
            period_end: date(2024, 12, 31),
            payment_status: PaymentStatus::Unpaid,
            billed_to: Some(Side::Seller),
        });

        let engine = ClosingCostEngine::new(pa_store());
        let statement = engine.calculate(&deal).unwrap();

        // Seller is debited the pre-closing share; buyer is credited the
        // post-closing share.
        let seller_debit = find(&statement.seller.debits, "Annual Property Tax");
        let buyer_credit = find(&statement.buyer.credits, "Annual Property Tax");
        assert_eq!(seller_debit.amount, Money::from_cents(54_904));
        assert_eq!(buyer_credit.amount, Money::from_cents(65_096));
    }

    #[test]
    fn test_hoa_lines_prorate_too() {
        let mut deal = pa_deal();
        deal.hoa_lines.push(RecurringCharge {
            description: "HOA Dues Q2".to_string(),
            amount: dec!(300),
            period_start: date(2024, 4, 1),
            period_end: date(2024, 6, 30),
            payment_status: PaymentStatus::Paid,
            billed_to: None,
        });

        let engine = ClosingCostEngine::new(pa_store());
        let statement = engine.calculate(&deal).unwrap();

        let buyer_debit = find(&statement.buyer.debits, "HOA Dues Q2");
        let seller_credit = find(&statement.seller.credits, "HOA Dues Q2");
        assert_eq!(
            buyer_debit.amount + seller_credit.amount,
            Money::from_dollars(300)
        );
    }

    #[test]
    fn test_unknown_ancillary_document_is_free() {
        let mut deal = pa_deal();
        deal.documents.ancillary.push(AncillaryDocument {
            doc_type: "power_of_attorney".to_string(),
            documents: 1,
            pages: 2,
        });

        let engine = ClosingCostEngine::new(pa_store());
        let statement = engine.calculate(&deal).unwrap();

        // Calculation succeeds and only deed/mortgage recording lines exist
        let recording_items: Vec<_> = statement
            .buyer
            .debits
            .iter()
            .filter(|item| item.category == CostCategory::RecordingFees)
            .collect();
        assert_eq!(recording_items.len(), 2);
    }

    #[test]
    fn test_loan_exceeding_price_fails_validation() {
        let mut deal = pa_deal();
        deal.loan_amount = dec!(400000);

        let engine = ClosingCostEngine::new(pa_store());
        let err = engine.calculate(&deal).unwrap_err();
        match err {
            EngineError::Validation(violations) => {
                assert_eq!(violations.len(), 1);
                assert_eq!(violations[0].field, "loan_amount");
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_unresolvable_location_fails() {
        let mut deal = pa_deal();
        deal.property = PropertyLocation::state_only("TX");

        let engine = ClosingCostEngine::new(pa_store());
        let err = engine.calculate(&deal).unwrap_err();
        assert!(matches!(err, EngineError::ConfigurationNotFound { .. }));
    }

    #[test]
    fn test_proration_lines_without_policy_fail() {
        let mut profile = pa_profile();
        profile.proration = None;
        let mut store = ProfileStore::new();
        store.insert(profile).unwrap();

        let mut deal = pa_deal();
        deal.tax_lines.push(RecurringCharge {
            description: "Tax".to_string(),
            amount: dec!(100),
            period_start: date(2024, 1, 1),
            period_end: date(2024, 12, 31),
            payment_status: PaymentStatus::Paid,
            billed_to: None,
        });

        let engine = ClosingCostEngine::new(store);
        let err = engine.calculate(&deal).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_nets_balance_ledger_totals() {
        let mut deal = pa_deal();
        deal.tax_lines.push(RecurringCharge {
            description: "Annual Property Tax".to_string(),
            amount: dec!(1200),
            period_start: date(2024, 1, 1),
            period_end: date(2024, 12, 31),
            payment_status: PaymentStatus::Paid,
            billed_to: None,
        });

        let engine = ClosingCostEngine::new(pa_store());
        let statement = engine.calculate(&deal).unwrap();

        assert_eq!(
            statement.buyer.net,
            statement.buyer.total_debits - statement.buyer.total_credits
        );
        assert_eq!(
            statement.seller.net,
            statement.seller.total_debits - statement.seller.total_credits
        );

        // Category subtotals sum to the signed grand total
        let category_sum = statement
            .categories
            .iter()
            .fold(Money::zero(), |sum, group| sum + group.subtotal);
        let ledger_sum = statement.buyer.net + statement.seller.net;
        assert_eq!(category_sum, ledger_sum);
    }

    #[test]
    fn test_diagnostics_record_match() {
        let engine = ClosingCostEngine::new(pa_store());
        let statement = engine.calculate(&pa_deal()).unwrap();

        assert_eq!(statement.diagnostics.jurisdiction_id, "PA");
        assert_eq!(statement.diagnostics.matched_path, "PA");
        assert_eq!(
            statement.diagnostics.matched_by,
            crate::resolver::MatchLevel::State
        );
        assert!(statement.diagnostics.trace.is_none());
    }

    #[test]
    fn test_verbose_mode_attaches_trace() {
        let engine =
            ClosingCostEngine::with_options(pa_store(), EngineOptions { verbose: true });
        let statement = engine.calculate(&pa_deal()).unwrap();

        let trace = statement.diagnostics.trace.as_ref().unwrap();
        assert_eq!(trace.transfer_taxes.entries.len(), 2);
        assert_eq!(trace.title.as_ref().unwrap().simultaneous_discount, dec!(750));
    }

    #[test]
    fn test_calculate_is_idempotent() {
        let mut deal = pa_deal();
        deal.tax_lines.push(RecurringCharge {
            description: "Annual Property Tax".to_string(),
            amount: dec!(1200),
            period_start: date(2024, 1, 1),
            period_end: date(2024, 12, 31),
            payment_status: PaymentStatus::Unknown,
            billed_to: None,
        });

        let engine = ClosingCostEngine::new(pa_store());
        let first = serde_json::to_string(&engine.calculate(&deal).unwrap()).unwrap();
        let second = serde_json::to_string(&engine.calculate(&deal).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_cash_deal_has_no_lender_policy_line() {
        let mut deal = pa_deal();
        deal.loan_amount = Decimal::ZERO;
        deal.documents.mortgage_documents = 0;
        deal.documents.mortgage_pages = 0;

        let engine = ClosingCostEngine::new(pa_store());
        let statement = engine.calculate(&deal).unwrap();

        assert!(statement
            .buyer
            .debits
            .iter()
            .all(|item| item.description != "Lender Title Insurance Policy"));
    }
}
