// 🏷️ Classification Rules - Rules as Data
// Keyword rules map ledger-account labels to cost categories,
// and the deduction table maps each category to its fiscal treatment.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// CATEGORY TAG
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoryTag {
    /// Business entertainment and client gifts
    RepresentationCosts,
    /// Lease and business vehicle costs
    VehicleCosts,
    /// Rent and accommodation
    HousingCosts,
    /// Catch-all, fully deductible
    OtherCosts,
}

impl CategoryTag {
    pub const ALL: [CategoryTag; 4] = [
        CategoryTag::RepresentationCosts,
        CategoryTag::VehicleCosts,
        CategoryTag::HousingCosts,
        CategoryTag::OtherCosts,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryTag::RepresentationCosts => "RepresentationCosts",
            CategoryTag::VehicleCosts => "VehicleCosts",
            CategoryTag::HousingCosts => "HousingCosts",
            CategoryTag::OtherCosts => "OtherCosts",
        }
    }

    /// Position in `ALL`; used for fixed-order aggregation.
    pub fn index(&self) -> usize {
        match self {
            CategoryTag::RepresentationCosts => 0,
            CategoryTag::VehicleCosts => 1,
            CategoryTag::HousingCosts => 2,
            CategoryTag::OtherCosts => 3,
        }
    }
}

impl fmt::Display for CategoryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// KEYWORD RULES
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize)]
pub struct KeywordRule {
    /// Rule ID for tracking
    pub id: &'static str,

    /// Lowercase substrings; any one of them triggers the rule
    pub keywords: &'static [&'static str],

    /// Category to assign
    pub category: CategoryTag,
}

impl KeywordRule {
    /// Check if any keyword occurs in the (already lowercased) label
    pub fn matching_keyword(&self, label_lower: &str) -> Option<&'static str> {
        self.keywords
            .iter()
            .copied()
            .find(|keyword| label_lower.contains(keyword))
    }

    /// Case-insensitive substring match against the raw label
    pub fn matches(&self, label: &str) -> bool {
        self.matching_keyword(&label.to_lowercase()).is_some()
    }
}

/// Evaluated top-down; the first matching rule wins.
/// A label containing both "huur" and "auto" is a vehicle cost.
pub const KEYWORD_RULES: &[KeywordRule] = &[
    KeywordRule {
        id: "representation",
        keywords: &["representatie", "relatiegeschenk"],
        category: CategoryTag::RepresentationCosts,
    },
    KeywordRule {
        id: "vehicle",
        keywords: &["auto", "lease"],
        category: CategoryTag::VehicleCosts,
    },
    KeywordRule {
        id: "housing",
        keywords: &["huur"],
        category: CategoryTag::HousingCosts,
    },
];

// ============================================================================
// CLASSIFICATION RESULT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassificationResult {
    pub category: CategoryTag,
    pub rule_id: Option<&'static str>,
    pub keyword: Option<&'static str>,
}

impl Default for ClassificationResult {
    fn default() -> Self {
        ClassificationResult {
            category: CategoryTag::OtherCosts,
            rule_id: None,
            keyword: None,
        }
    }
}

/// Classify a ledger-account label, reporting which rule fired
pub fn classify_detailed(account_label: &str) -> ClassificationResult {
    let label_lower = account_label.to_lowercase();

    for rule in KEYWORD_RULES {
        if let Some(keyword) = rule.matching_keyword(&label_lower) {
            return ClassificationResult {
                category: rule.category,
                rule_id: Some(rule.id),
                keyword: Some(keyword),
            };
        }
    }

    // No match: catch-all
    ClassificationResult::default()
}

/// Map a free-text ledger-account label to its category. Total: never fails.
pub fn classify(account_label: &str) -> CategoryTag {
    classify_detailed(account_label).category
}

// ============================================================================
// DEDUCTION RULE TABLE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DeductionRule {
    pub category: CategoryTag,

    /// Deductible share of the amount, in [0, 1]
    pub fraction: f64,

    pub explanation: &'static str,
}

pub const DEDUCTION_RULES: [DeductionRule; 4] = [
    DeductionRule {
        category: CategoryTag::RepresentationCosts,
        fraction: 0.8,
        explanation: "80% deductible under fiscal rules",
    },
    DeductionRule {
        category: CategoryTag::VehicleCosts,
        fraction: 0.9,
        explanation: "90% deductible for business vehicle costs",
    },
    // No housing-specific limitation; treated as full deduction.
    DeductionRule {
        category: CategoryTag::HousingCosts,
        fraction: 1.0,
        explanation: "Fully deductible",
    },
    DeductionRule {
        category: CategoryTag::OtherCosts,
        fraction: 1.0,
        explanation: "Fully deductible",
    },
];

/// Look up the deduction rule for a category. Total over the enum.
pub fn rule_for(category: CategoryTag) -> DeductionRule {
    DEDUCTION_RULES[category.index()]
}

// ============================================================================
// TESTS
// ============================================================================
