//! # Recording Fee Calculator
//!
//! Computes per-document/per-page government recording charges for deed,
//! mortgage, and ancillary documents.
//!
//! ## Fee Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  standard:   documents * per_document + pages * per_page               │
//! │                                                                         │
//! │  page tiers (first match on page count wins):                          │
//! │    flat_override      documents * flat_override                        │
//! │    per_page_override  documents * per_document + pages * override      │
//! │                                                                         │
//! │  total = deed + mortgage + Σ ancillary + flat surcharge                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ancillary documents with no matching schedule contribute zero and are
//! silently skipped - unknown ancillary types are expected to occur.
//!
//! All recording fees are buyer debits by convention; no configuration can
//! reroute this allocation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::deal::DocumentCounts;
use crate::profile::{FeeSchedule, RecordingSchedule};

// =============================================================================
// Results
// =============================================================================

/// One recording charge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingOutcome {
    pub description: String,
    /// Charge amount, unrounded dollars.
    pub amount: Decimal,
}

/// Output of the recording fee calculator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordingResult {
    pub entries: Vec<RecordingOutcome>,
    pub total: Decimal,
}

// =============================================================================
// Calculator
// =============================================================================

/// Computes all recording charges for the deal's document package.
pub fn calculate_recording_fees(
    schedule: &RecordingSchedule,
    documents: &DocumentCounts,
) -> RecordingResult {
    let mut entries = Vec::new();
    let mut total = Decimal::ZERO;

    let mut push = |description: String, amount: Decimal| {
        total += amount;
        entries.push(RecordingOutcome {
            description,
            amount,
        });
    };

    if let Some(deed) = &schedule.deed {
        push(
            "Deed Recording".to_string(),
            document_fee(deed, documents.deed_documents, documents.deed_pages),
        );
    }

    if let Some(mortgage) = &schedule.mortgage {
        push(
            "Mortgage Recording".to_string(),
            document_fee(
                mortgage,
                documents.mortgage_documents,
                documents.mortgage_pages,
            ),
        );
    }

    for ancillary in &documents.ancillary {
        // No schedule for this doc type: skip, not an error
        if let Some(fee_schedule) = schedule.ancillary.get(&ancillary.doc_type) {
            push(
                format!("{} Recording", ancillary.doc_type),
                document_fee(fee_schedule, ancillary.documents, ancillary.pages),
            );
        }
    }

    if let Some(surcharge) = schedule.flat_surcharge {
        push("Recording Surcharge".to_string(), surcharge);
    }

    RecordingResult { entries, total }
}

/// Fee for one document class, honoring page-tier overrides.
fn document_fee(schedule: &FeeSchedule, documents: u32, pages: u32) -> Decimal {
    for tier in &schedule.page_tiers {
        let in_tier = pages >= tier.pages_min && tier.pages_max.map_or(true, |max| pages <= max);
        if !in_tier {
            continue;
        }
        if let Some(flat) = tier.flat_override {
            return flat * Decimal::from(documents);
        }
        if let Some(per_page) = tier.per_page_override {
            return Decimal::from(documents) * schedule.per_document
                + Decimal::from(pages) * per_page;
        }
    }

    Decimal::from(documents) * schedule.per_document + Decimal::from(pages) * schedule.per_page
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deal::AncillaryDocument;
    use crate::profile::PageTier;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn flat_schedule(per_document: Decimal, per_page: Decimal) -> FeeSchedule {
        FeeSchedule {
            per_document,
            per_page,
            page_tiers: Vec::new(),
        }
    }

    fn standard_counts() -> DocumentCounts {
        DocumentCounts {
            deed_documents: 1,
            deed_pages: 3,
            mortgage_documents: 1,
            mortgage_pages: 5,
            ancillary: Vec::new(),
        }
    }

    #[test]
    fn test_deed_and_mortgage_fees() {
        let schedule = RecordingSchedule {
            deed: Some(flat_schedule(dec!(50), dec!(2))),
            mortgage: Some(flat_schedule(dec!(50), dec!(2))),
            ancillary: BTreeMap::new(),
            flat_surcharge: None,
        };

        let result = calculate_recording_fees(&schedule, &standard_counts());
        // Deed: 1*$50 + 3*$2 = $56; Mortgage: 1*$50 + 5*$2 = $60
        assert_eq!(result.entries[0].amount, dec!(56));
        assert_eq!(result.entries[1].amount, dec!(60));
        assert_eq!(result.total, dec!(116));
    }

    #[test]
    fn test_unknown_ancillary_type_contributes_zero() {
        let schedule = RecordingSchedule {
            deed: Some(flat_schedule(dec!(50), dec!(2))),
            mortgage: None,
            ancillary: BTreeMap::new(),
            flat_surcharge: None,
        };

        let mut counts = standard_counts();
        counts.ancillary.push(AncillaryDocument {
            doc_type: "power_of_attorney".to_string(),
            documents: 1,
            pages: 2,
        });

        let result = calculate_recording_fees(&schedule, &counts);
        assert_eq!(result.entries.len(), 1); // deed only
        assert_eq!(result.total, dec!(56));
    }

    #[test]
    fn test_matched_ancillary_type_charged() {
        let mut ancillary = BTreeMap::new();
        ancillary.insert("release".to_string(), flat_schedule(dec!(25), dec!(1)));

        let schedule = RecordingSchedule {
            deed: None,
            mortgage: None,
            ancillary,
            flat_surcharge: None,
        };

        let mut counts = DocumentCounts::default();
        counts.ancillary.push(AncillaryDocument {
            doc_type: "release".to_string(),
            documents: 2,
            pages: 4,
        });

        let result = calculate_recording_fees(&schedule, &counts);
        assert_eq!(result.entries[0].description, "release Recording");
        assert_eq!(result.entries[0].amount, dec!(54)); // 2*$25 + 4*$1
    }

    #[test]
    fn test_flat_surcharge_added() {
        let schedule = RecordingSchedule {
            deed: Some(flat_schedule(dec!(50), dec!(0))),
            mortgage: None,
            ancillary: BTreeMap::new(),
            flat_surcharge: Some(dec!(10)),
        };

        let result = calculate_recording_fees(&schedule, &standard_counts());
        assert_eq!(result.entries.last().unwrap().description, "Recording Surcharge");
        assert_eq!(result.total, dec!(60));
    }

    #[test]
    fn test_page_tier_flat_override() {
        let schedule = FeeSchedule {
            per_document: dec!(50),
            per_page: dec!(2),
            page_tiers: vec![PageTier {
                pages_min: 0,
                pages_max: Some(10),
                per_page_override: None,
                flat_override: Some(dec!(75)),
            }],
        };

        // 3 pages fall in the tier: flat $75 per document
        assert_eq!(document_fee(&schedule, 1, 3), dec!(75));
        // 20 pages fall outside: standard formula
        assert_eq!(document_fee(&schedule, 1, 20), dec!(90));
    }

    #[test]
    fn test_page_tier_per_page_override() {
        let schedule = FeeSchedule {
            per_document: dec!(50),
            per_page: dec!(2),
            page_tiers: vec![PageTier {
                pages_min: 11,
                pages_max: None,
                per_page_override: Some(dec!(1)),
                flat_override: None,
            }],
        };

        // 20 pages: 1*$50 + 20*$1 = $70 (override), not 1*$50 + 20*$2
        assert_eq!(document_fee(&schedule, 1, 20), dec!(70));
    }

    #[test]
    fn test_missing_schedules_contribute_nothing() {
        let schedule = RecordingSchedule::default();
        let result = calculate_recording_fees(&schedule, &standard_counts());
        assert!(result.entries.is_empty());
        assert_eq!(result.total, Decimal::ZERO);
    }
}
