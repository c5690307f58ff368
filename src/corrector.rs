// 🧮 Corrector - applies the deduction table to one ledger entry

use crate::ledger::{format_amount, LedgerEntry};
use crate::rules::{classify, rule_for, CategoryTag};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrectedEntry {
    pub account_label: String,
    pub amount: f64,
    pub category: CategoryTag,

    /// amount × fraction, unrounded
    pub deductible_amount: f64,

    /// amount − deductible_amount
    pub correction_amount: f64,

    pub explanation: &'static str,
}

impl CorrectedEntry {
    /// One audit-trail line for this entry
    pub fn audit_line(&self) -> String {
        format!("- Row '{}': {}", self.account_label, self.explanation)
    }

    pub fn has_correction(&self) -> bool {
        self.correction_amount != 0.0
    }

    /// Export cells, in the order the derived columns are appended
    pub fn derived_cells(&self) -> [String; 4] {
        [
            self.category.as_str().to_string(),
            format_amount(self.deductible_amount),
            self.explanation.to_string(),
            format_amount(self.correction_amount),
        ]
    }
}

/// Classify an entry and compute its deductible and correction amounts.
pub fn correct(entry: LedgerEntry) -> CorrectedEntry {
    let category = classify(&entry.account_label);
    let rule = rule_for(category);

    let deductible_amount = entry.amount * rule.fraction;
    let correction_amount = entry.amount - deductible_amount;

    CorrectedEntry {
        account_label: entry.account_label,
        amount: entry.amount,
        category,
        deductible_amount,
        correction_amount,
        explanation: rule.explanation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(label: &str, amount: f64) -> LedgerEntry {
        LedgerEntry {
            account_label: label.to_string(),
            amount,
        }
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn test_representation_entry() {
        let corrected = correct(entry("Representatiekosten klant", 100.0));

        assert_eq!(corrected.category, CategoryTag::RepresentationCosts);
        assert_close(corrected.deductible_amount, 80.0);
        assert_close(corrected.correction_amount, 20.0);
        assert_eq!(corrected.explanation, "80% deductible under fiscal rules");
        assert!(corrected.has_correction());
    }

    #[test]
    fn test_full_deduction_has_zero_correction() {
        let corrected = correct(entry("Huur kantoor", 1250.5));

        assert_eq!(corrected.category, CategoryTag::HousingCosts);
        assert_eq!(corrected.deductible_amount, 1250.5);
        assert_eq!(corrected.correction_amount, 0.0);
        assert!(!corrected.has_correction());
    }

    #[test]
    fn test_negative_amount_keeps_sign() {
        let corrected = correct(entry("Creditnota lease", -200.0));

        assert_eq!(corrected.category, CategoryTag::VehicleCosts);
        assert_close(corrected.deductible_amount, -180.0);
        assert_close(corrected.correction_amount, -20.0);
    }

    #[test]
    fn test_conservation() {
        let cases = [
            ("Representatie", 33.33),
            ("Leaseauto", 0.07),
            ("Huur", -19.99),
            ("Diversen", 1e9),
            ("Relatiegeschenk", 0.0),
        ];

        for (label, amount) in cases {
            let c = correct(entry(label, amount));
            let tolerance = 1e-9 * amount.abs().max(1.0);
            assert!((c.deductible_amount + c.correction_amount - c.amount).abs() <= tolerance);
        }
    }

    #[test]
    fn test_stored_value_is_raw_product() {
        let corrected = correct(entry("Representatie", 10.01));
        assert_eq!(corrected.deductible_amount, 10.01 * 0.8);
    }

    #[test]
    fn test_derived_cells() {
        let corrected = correct(entry("Representatiekosten klant", 100.0));
        assert_eq!(
            corrected.derived_cells(),
            [
                "RepresentationCosts".to_string(),
                "80.0".to_string(),
                "80% deductible under fiscal rules".to_string(),
                "20.0".to_string(),
            ]
        );
    }

    #[test]
    fn test_audit_line_format() {
        let corrected = correct(entry("Leaseauto directie", 500.0));
        assert_eq!(
            corrected.audit_line(),
            "- Row 'Leaseauto directie': 90% deductible for business vehicle costs"
        );
    }
}
