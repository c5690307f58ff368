// 📊 Run Summary - per-category totals and a fingerprint of the derived columns

use crate::corrector::CorrectedEntry;
use crate::rules::{rule_for, CategoryTag, KEYWORD_RULES};
use serde::Serialize;
use sha2::{Digest, Sha256};

// ============================================================================
// SUMMARY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: CategoryTag,
    pub rows: usize,
    pub amount: f64,
    pub deductible: f64,
    pub correction: f64,
}

impl CategoryTotal {
    fn empty(category: CategoryTag) -> Self {
        CategoryTotal {
            category,
            rows: 0,
            amount: 0.0,
            deductible: 0.0,
            correction: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrectionSummary {
    pub rows: usize,
    pub total_amount: f64,
    pub total_deductible: f64,
    pub total_correction: f64,

    /// Every category, in `CategoryTag::ALL` order
    pub per_category: Vec<CategoryTotal>,
}

impl CorrectionSummary {
    pub fn from_entries(entries: &[CorrectedEntry]) -> Self {
        let mut per_category: Vec<CategoryTotal> =
            CategoryTag::ALL.iter().map(|c| CategoryTotal::empty(*c)).collect();

        for entry in entries {
            let total = &mut per_category[entry.category.index()];
            total.rows += 1;
            total.amount += entry.amount;
            total.deductible += entry.deductible_amount;
            total.correction += entry.correction_amount;
        }

        CorrectionSummary {
            rows: entries.len(),
            total_amount: entries.iter().map(|e| e.amount).sum(),
            total_deductible: entries.iter().map(|e| e.deductible_amount).sum(),
            total_correction: entries.iter().map(|e| e.correction_amount).sum(),
            per_category,
        }
    }

    pub fn corrected_rows(&self) -> usize {
        self.per_category
            .iter()
            .filter(|t| rule_for(t.category).fraction < 1.0)
            .map(|t| t.rows)
            .sum()
    }
}

/// SHA-256 over the exported derived cells, row by row.
/// Equal digests mean byte-identical derived columns.
pub fn derived_digest(entries: &[CorrectedEntry]) -> String {
    let mut hasher = Sha256::new();

    for entry in entries {
        for cell in entry.derived_cells() {
            hasher.update(cell.as_bytes());
            hasher.update([0x1f]);
        }
        hasher.update([0x1e]);
    }

    format!("{:x}", hasher.finalize())
}

// ============================================================================
// TERMINAL OUTPUT
// ============================================================================

pub fn format_summary(summary: &CorrectionSummary) -> String {
    let mut out = String::new();

    out.push_str(&format!("✓ Rows processed: {}\n", summary.rows));
    out.push_str(&format!(
        "✓ Total amount: {:.2}  deductible: {:.2}  correction: {:.2}\n",
        summary.total_amount, summary.total_deductible, summary.total_correction
    ));
    out.push('\n');
    out.push_str(&format!(
        "{:<22} {:>6} {:>14} {:>14} {:>14}\n",
        "Category", "Rows", "Amount", "Deductible", "Correction"
    ));

    for total in &summary.per_category {
        out.push_str(&format!(
            "{:<22} {:>6} {:>14.2} {:>14.2} {:>14.2}\n",
            total.category.as_str(),
            total.rows,
            total.amount,
            total.deductible,
            total.correction
        ));
    }

    out
}

/// Keyword rules and deduction table as printable text
pub fn format_rules() -> String {
    let mut out = String::from("Classification (first match wins):\n");

    for (i, rule) in KEYWORD_RULES.iter().enumerate() {
        out.push_str(&format!(
            "  {}. {:<12} {:<20} ← {}\n",
            i + 1,
            rule.id,
            rule.category.as_str(),
            rule.keywords.join(" | ")
        ));
    }
    out.push_str(&format!(
        "  {}. {:<12} {:<20} ← (anything else)\n",
        KEYWORD_RULES.len() + 1,
        "default",
        CategoryTag::OtherCosts.as_str()
    ));

    out.push_str("\nDeduction table:\n");
    for category in CategoryTag::ALL {
        let rule = rule_for(category);
        out.push_str(&format!(
            "  {:<20} {:>5.0}%  {}\n",
            category.as_str(),
            rule.fraction * 100.0,
            rule.explanation
        ));
    }

    out
}
