//! # Jurisdiction Profiles
//!
//! Strongly-typed configuration for a geography: transfer-tax rules,
//! recording fee schedules, title insurance rates, settlement fees, and the
//! proration policy.
//!
//! ## Schema Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Profile Ingestion Pipeline                          │
//! │                                                                         │
//! │  External JSON ──► serde (tagged enums) ──► validate() ──► ProfileStore │
//! │                                                                         │
//! │  • calc_type / pricing / payer are serde-tagged enums, so a percent    │
//! │    rule without a rate cannot exist after parsing                      │
//! │  • validate() catches value-level inconsistencies the type system      │
//! │    cannot: split percentages that do not sum to 100, negative rates,   │
//! │    empty bracket tables, inverted bounds                               │
//! │  • calculators still fail fast on anything validate() would reject,    │
//! │    because profiles can also be built directly in memory               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Profiles are loaded once per calculation from an external store and are
//! never mutated by the engine.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::dates::DayCount;
use crate::deal::Side;
use crate::error::{EngineError, EngineResult};
use crate::money::RoundingMode;

/// Tolerance when checking that split percentages sum to 100.
const SPLIT_TOLERANCE: Decimal = dec!(0.01);

// =============================================================================
// Payer Rules
// =============================================================================

/// Who pays a configured charge by default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "payer", rename_all = "snake_case")]
pub enum PayerRule {
    Buyer,
    Seller,
    /// Split between the parties; percentages must sum to 100.
    Split {
        buyer_pct: Decimal,
        seller_pct: Decimal,
    },
}

impl PayerRule {
    /// Fails with `InvalidConfiguration` if this is a split whose
    /// percentages do not sum to 100 (within a one-basis-point tolerance).
    pub fn ensure_valid(&self, context: &str) -> EngineResult<()> {
        if let PayerRule::Split {
            buyer_pct,
            seller_pct,
        } = self
        {
            let total = *buyer_pct + *seller_pct;
            if (total - dec!(100)).abs() > SPLIT_TOLERANCE {
                return Err(EngineError::invalid_config(format!(
                    "{context}: split percentages must sum to 100, got {total}"
                )));
            }
            if buyer_pct.is_sign_negative() || seller_pct.is_sign_negative() {
                return Err(EngineError::invalid_config(format!(
                    "{context}: split percentages must be non-negative"
                )));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Transfer Tax Rules
// =============================================================================

/// Which deal amount a transfer tax is computed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxBase {
    /// The purchase price.
    Price,
    /// The loan amount.
    Loan,
    /// Deed-side tax; conventionally assessed on the sale price.
    Deed,
    /// Mortgage-side tax; conventionally assessed on the loan amount.
    Mortgage,
}

/// A slice of a tiered bracket table.
///
/// `upper` of `None` means the bracket is unbounded above.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    /// Inclusive lower bound of the slice, in dollars.
    pub lower: Decimal,
    /// Inclusive upper bound, or `None` for unbounded.
    #[serde(default)]
    pub upper: Option<Decimal>,
    /// Percent rate applied to the portion of the base inside this slice
    /// (1.0 = 1%).
    pub rate: Decimal,
}

/// How a transfer tax is calculated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "calc_type", rename_all = "snake_case")]
pub enum TaxCalc {
    /// `base * rate / 100`, rate as a percent number.
    Percent { rate: Decimal },
    /// A flat amount; the base is ignored.
    Flat { amount: Decimal },
    /// Each bracket taxes only its own slice of the base.
    TieredBrackets { brackets: Vec<Bracket> },
}

/// One transfer-tax rule in a jurisdiction's ordered rule list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferTaxRule {
    /// Stable rule name, e.g. `state_transfer_tax`.
    pub name: String,
    /// Display description, e.g. `PA State Transfer Tax`.
    pub description: String,
    /// Which deal amount the tax is assessed on.
    pub base: TaxBase,
    #[serde(flatten)]
    pub calc: TaxCalc,
    #[serde(flatten)]
    pub payer: PayerRule,
    /// Disabled rules are skipped entirely.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

// =============================================================================
// Recording Fee Schedules
// =============================================================================

/// A page-count tier that overrides the standard per-page pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageTier {
    pub pages_min: u32,
    /// `None` = unbounded above.
    #[serde(default)]
    pub pages_max: Option<u32>,
    /// Replaces the schedule's per-page fee within this tier.
    #[serde(default)]
    pub per_page_override: Option<Decimal>,
    /// Replaces the whole formula with `flat_override * documents`.
    #[serde(default)]
    pub flat_override: Option<Decimal>,
}

/// Per-document and per-page recording charges for one document class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub per_document: Decimal,
    pub per_page: Decimal,
    /// Optional page-count tiers, checked in order; first match wins.
    #[serde(default)]
    pub page_tiers: Vec<PageTier>,
}

/// Government recording charges for deed, mortgage, and ancillary documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordingSchedule {
    #[serde(default)]
    pub deed: Option<FeeSchedule>,
    #[serde(default)]
    pub mortgage: Option<FeeSchedule>,
    /// Schedules keyed by ancillary `doc_type`; unknown types are skipped.
    #[serde(default)]
    pub ancillary: BTreeMap<String, FeeSchedule>,
    /// Flat surcharge added once per recording package.
    #[serde(default)]
    pub flat_surcharge: Option<Decimal>,
}

// =============================================================================
// Title Insurance Schedules
// =============================================================================

/// Which deal amount a title premium is computed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PremiumBasis {
    LoanAmount,
    PurchasePrice,
}

/// One band of a title rate table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateBand {
    /// Inclusive lower bound of the basis amount, in dollars.
    pub min: Decimal,
    /// Inclusive upper bound, or `None` for unbounded.
    #[serde(default)]
    pub max: Option<Decimal>,
    /// Percent rate applied to the basis amount (1.0 = 1%).
    #[serde(default)]
    pub rate: Option<Decimal>,
    /// Flat premium for this band; takes precedence over `rate`.
    #[serde(default)]
    pub flat: Option<Decimal>,
}

/// How a title policy premium is priced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "pricing", rename_all = "snake_case")]
pub enum PolicyPricing {
    /// `basis * rate / 100`, rate as a percent number.
    Percent { rate: Decimal },
    /// A flat premium regardless of the basis amount.
    Flat { amount: Decimal },
    /// First band containing the basis amount wins; no band = no premium.
    RateTable { bands: Vec<RateBand> },
}

/// Pricing for one title policy (lender or owner).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitlePolicy {
    pub basis: PremiumBasis,
    #[serde(flatten)]
    pub pricing: PolicyPricing,
}

/// Reduced combined pricing when both policies are issued together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimultaneousIssueDiscount {
    /// Percent discount on the combined premium subtotal (25 = 25% off).
    pub discount_pct: Decimal,
}

/// Title insurance rates for a jurisdiction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleSchedule {
    pub lender_policy: TitlePolicy,
    #[serde(default)]
    pub owner_policy: Option<TitlePolicy>,
    #[serde(default)]
    pub simultaneous_issue: Option<SimultaneousIssueDiscount>,
    /// Endorsement fees keyed by identifier, e.g. `ALTA-1`.
    #[serde(default)]
    pub endorsements: BTreeMap<String, Decimal>,
    /// Closing-protection-letter fee, when the jurisdiction offers one.
    #[serde(default)]
    pub closing_protection_letter: Option<Decimal>,
    /// When true, a selected owner policy is a buyer debit instead of the
    /// customary seller credit. Explicit allocation input, never inferred.
    #[serde(default)]
    pub buyer_pays_owner_policy: bool,
}

// =============================================================================
// Settlement Fees
// =============================================================================

/// A configured flat fee with its default payer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeConfig {
    pub amount: Decimal,
    #[serde(flatten)]
    pub payer: PayerRule,
}

/// Settlement/flat fees keyed by fee name (`settlement_fee`, `attorney_fee`,
/// `notary_fee`, `wire_fee`, `courier_fee`, `payoff_statement_fee`, ...).
pub type SettlementSchedule = BTreeMap<String, FeeConfig>;

// =============================================================================
// Proration Policy
// =============================================================================

/// Fallback treatment for recurring bills with unknown payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProrationStyle {
    /// Bills in this jurisdiction are customarily paid in advance.
    PaidInAdvanceCommon,
    /// Bills are customarily paid in arrears.
    ArrearsCommon,
}

/// How recurring charges are split between the parties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProrationPolicy {
    pub day_count: DayCount,
    /// Which party owns the property on the closing day itself.
    pub closing_day_owner: Side,
    pub rounding: RoundingMode,
    /// Resolves `PaymentStatus::Unknown` lines.
    pub default_style: ProrationStyle,
}

// =============================================================================
// Jurisdiction Profile
// =============================================================================

/// Specificity of a profile's geography, from broadest to narrowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecificityLevel {
    State,
    County,
    City,
    Zip,
}

impl fmt::Display for SpecificityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecificityLevel::State => write!(f, "state"),
            SpecificityLevel::County => write!(f, "county"),
            SpecificityLevel::City => write!(f, "city"),
            SpecificityLevel::Zip => write!(f, "zip"),
        }
    }
}

/// The full configuration for one geography.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JurisdictionProfile {
    /// Stable identifier, e.g. `PA_ALLEGHENY`. The reserved identifier
    /// `DEFAULT` marks the generic fallback profile.
    pub jurisdiction_id: String,

    pub level: SpecificityLevel,

    /// Two-letter state code.
    pub state: String,

    #[serde(default)]
    pub county: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Ordered transfer-tax rule list.
    #[serde(default)]
    pub transfer_taxes: Vec<TransferTaxRule>,

    #[serde(default)]
    pub recording: Option<RecordingSchedule>,

    #[serde(default)]
    pub title: Option<TitleSchedule>,

    #[serde(default)]
    pub settlement: Option<SettlementSchedule>,

    #[serde(default)]
    pub proration: Option<ProrationPolicy>,
}

impl JurisdictionProfile {
    /// Checks the value-level invariants the schema cannot express.
    ///
    /// Profiles failing this are rejected at load time and excluded from
    /// the resolvable set.
    pub fn validate(&self) -> EngineResult<()> {
        let mut issues: Vec<String> = Vec::new();

        if self.jurisdiction_id.trim().is_empty() {
            issues.push("jurisdiction_id must not be empty".to_string());
        }
        if self.state.trim().is_empty() {
            issues.push("state is required".to_string());
        }

        match self.level {
            SpecificityLevel::Zip if self.postal_code.is_none() => {
                issues.push("level 'zip' requires postal_code".to_string());
            }
            SpecificityLevel::City if self.city.is_none() => {
                issues.push("level 'city' requires city".to_string());
            }
            SpecificityLevel::County if self.county.is_none() => {
                issues.push("level 'county' requires county".to_string());
            }
            _ => {}
        }

        for rule in &self.transfer_taxes {
            let ctx = format!("transfer tax '{}'", rule.name);
            if let Err(e) = rule.payer.ensure_valid(&ctx) {
                issues.push(e.to_string());
            }
            match &rule.calc {
                TaxCalc::Percent { rate } if rate.is_sign_negative() => {
                    issues.push(format!("{ctx}: rate must be non-negative"));
                }
                TaxCalc::Flat { amount } if amount.is_sign_negative() => {
                    issues.push(format!("{ctx}: flat amount must be non-negative"));
                }
                TaxCalc::TieredBrackets { brackets } => {
                    if brackets.is_empty() {
                        issues.push(format!("{ctx}: bracket table must not be empty"));
                    }
                    for bracket in brackets {
                        if bracket.rate.is_sign_negative() {
                            issues.push(format!("{ctx}: bracket rate must be non-negative"));
                        }
                        if bracket.lower.is_sign_negative() {
                            issues.push(format!("{ctx}: bracket lower bound must be non-negative"));
                        }
                        if let Some(upper) = bracket.upper {
                            if upper < bracket.lower {
                                issues.push(format!(
                                    "{ctx}: bracket upper bound {upper} is below lower bound {}",
                                    bracket.lower
                                ));
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        if let Some(recording) = &self.recording {
            let mut schedules: Vec<(&str, &FeeSchedule)> = Vec::new();
            if let Some(deed) = &recording.deed {
                schedules.push(("recording.deed", deed));
            }
            if let Some(mortgage) = &recording.mortgage {
                schedules.push(("recording.mortgage", mortgage));
            }
            for (doc_type, schedule) in &recording.ancillary {
                schedules.push((doc_type.as_str(), schedule));
            }
            for (name, schedule) in schedules {
                if schedule.per_document.is_sign_negative()
                    || schedule.per_page.is_sign_negative()
                {
                    issues.push(format!("{name}: recording fees must be non-negative"));
                }
                for tier in &schedule.page_tiers {
                    if let Some(max) = tier.pages_max {
                        if max < tier.pages_min {
                            issues.push(format!("{name}: page tier bounds are inverted"));
                        }
                    }
                }
            }
            if let Some(surcharge) = recording.flat_surcharge {
                if surcharge.is_sign_negative() {
                    issues.push("recording.flat_surcharge must be non-negative".to_string());
                }
            }
        }

        if let Some(title) = &self.title {
            let mut policies = vec![("title.lender_policy", &title.lender_policy)];
            if let Some(owner) = &title.owner_policy {
                policies.push(("title.owner_policy", owner));
            }
            for (name, policy) in policies {
                match &policy.pricing {
                    PolicyPricing::Percent { rate } if rate.is_sign_negative() => {
                        issues.push(format!("{name}: rate must be non-negative"));
                    }
                    PolicyPricing::Flat { amount } if amount.is_sign_negative() => {
                        issues.push(format!("{name}: flat premium must be non-negative"));
                    }
                    PolicyPricing::RateTable { bands } => {
                        if bands.is_empty() {
                            issues.push(format!("{name}: rate table must not be empty"));
                        }
                        for band in bands {
                            if band.rate.is_none() && band.flat.is_none() {
                                issues.push(format!(
                                    "{name}: rate band needs either a rate or a flat premium"
                                ));
                            }
                        }
                    }
                    _ => {}
                }
            }
            if let Some(discount) = &title.simultaneous_issue {
                if discount.discount_pct.is_sign_negative() || discount.discount_pct > dec!(100) {
                    issues.push(format!(
                        "title.simultaneous_issue: discount_pct must be within 0-100, got {}",
                        discount.discount_pct
                    ));
                }
            }
            for (id, fee) in &title.endorsements {
                if fee.is_sign_negative() {
                    issues.push(format!("title.endorsements['{id}'] must be non-negative"));
                }
            }
            if let Some(cpl) = title.closing_protection_letter {
                if cpl.is_sign_negative() {
                    issues.push("title.closing_protection_letter must be non-negative".to_string());
                }
            }
        }

        if let Some(settlement) = &self.settlement {
            for (key, fee) in settlement {
                if fee.amount.is_sign_negative() {
                    issues.push(format!("settlement['{key}']: amount must be non-negative"));
                }
                if let Err(e) = fee.payer.ensure_valid(&format!("settlement['{key}']")) {
                    issues.push(e.to_string());
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(EngineError::invalid_config(format!(
                "profile '{}': {}",
                self.jurisdiction_id,
                issues.join("; ")
            )))
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
