// 📐 Shape Layer - Column Schema
// Required input columns and the derived columns appended on export

use crate::config::Config;
use crate::error::{CorrectionError, Result};
use crate::ledger::LedgerTable;

// ============================================================================
// COLUMN NAMES
// ============================================================================

pub const DEFAULT_LABEL_COLUMN: &str = "Grootboekrekening";
pub const DEFAULT_AMOUNT_COLUMN: &str = "Bedrag (EUR)";

pub const CATEGORY_COLUMN: &str = "Fiscale categorie";
pub const DEDUCTIBLE_COLUMN: &str = "Fiscaal aftrekbaar (EUR)";
pub const EXPLANATION_COLUMN: &str = "Fiscale toelichting";
pub const CORRECTION_COLUMN: &str = "Fiscale correctie (EUR)";

/// Derived columns, in append order
pub const DERIVED_COLUMNS: [&str; 4] = [
    CATEGORY_COLUMN,
    DEDUCTIBLE_COLUMN,
    EXPLANATION_COLUMN,
    CORRECTION_COLUMN,
];

pub fn is_derived_column(name: &str) -> bool {
    DERIVED_COLUMNS.contains(&name)
}

// ============================================================================
// SCHEMA VALIDATOR
// ============================================================================

/// Positions of the two required columns in a validated table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub label: usize,
    pub amount: usize,
}

#[derive(Debug, Clone)]
pub struct SchemaValidator {
    label_column: String,
    amount_column: String,
}

impl SchemaValidator {
    pub fn new(label_column: impl Into<String>, amount_column: impl Into<String>) -> Self {
        SchemaValidator {
            label_column: label_column.into(),
            amount_column: amount_column.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.label_column.clone(), config.amount_column.clone())
    }

    pub fn label_column(&self) -> &str {
        &self.label_column
    }

    pub fn amount_column(&self) -> &str {
        &self.amount_column
    }

    pub fn required_columns(&self) -> Vec<String> {
        vec![self.label_column.clone(), self.amount_column.clone()]
    }

    /// Locate both required columns or report every missing one
    pub fn validate(&self, table: &LedgerTable) -> Result<ColumnLayout> {
        let label = table.column_index(&self.label_column);
        let amount = table.column_index(&self.amount_column);

        match (label, amount) {
            (Some(label), Some(amount)) => Ok(ColumnLayout { label, amount }),
            _ => {
                let mut missing = Vec::new();
                if label.is_none() {
                    missing.push(self.label_column.clone());
                }
                if amount.is_none() {
                    missing.push(self.amount_column.clone());
                }

                Err(CorrectionError::Schema {
                    missing,
                    required: self.required_columns(),
                })
            }
        }
    }

    /// Remove derived columns left over from an earlier run
    pub fn strip_derived(&self, table: &mut LedgerTable) -> Vec<String> {
        table.remove_columns(&DERIVED_COLUMNS)
    }
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new(DEFAULT_LABEL_COLUMN, DEFAULT_AMOUNT_COLUMN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str]) -> LedgerTable {
        LedgerTable::new(
            headers.iter().map(|h| h.to_string()).collect(),
            vec![headers.iter().map(|_| "x".to_string()).collect()],
        )
    }

    #[test]
    fn test_validate_finds_columns() {
        let validator = SchemaValidator::default();
        let layout = validator
            .validate(&table(&["Datum", "Bedrag (EUR)", "Grootboekrekening"]))
            .unwrap();

        assert_eq!(layout, ColumnLayout { label: 2, amount: 1 });
    }

    #[test]
    fn test_missing_amount_column() {
        let validator = SchemaValidator::default();
        let err = validator.validate(&table(&["Grootboekrekening"])).unwrap_err();

        match err {
            CorrectionError::Schema { missing, required } => {
                assert_eq!(missing, vec!["Bedrag (EUR)".to_string()]);
                assert_eq!(required.len(), 2);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_missing_both_columns() {
        let validator = SchemaValidator::default();
        let err = validator.validate(&table(&["Omschrijving", "Bedrag"])).unwrap_err();

        match err {
            CorrectionError::Schema { missing, .. } => assert_eq!(missing.len(), 2),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_column_names_are_case_sensitive() {
        let validator = SchemaValidator::default();
        assert!(validator
            .validate(&table(&["grootboekrekening", "Bedrag (EUR)"]))
            .is_err());
    }

    #[test]
    fn test_custom_column_names() {
        let validator = SchemaValidator::new("Account", "Amount");
        assert!(validator.validate(&table(&["Account", "Amount"])).is_ok());
        assert_eq!(validator.label_column(), "Account");
    }

    #[test]
    fn test_strip_derived_columns() {
        let validator = SchemaValidator::default();
        let mut t = table(&[
            "Grootboekrekening",
            "Bedrag (EUR)",
            "Fiscale categorie",
            "Fiscaal aftrekbaar (EUR)",
            "Fiscale toelichting",
            "Fiscale correctie (EUR)",
        ]);

        let removed = validator.strip_derived(&mut t);
        assert_eq!(removed.len(), 4);
        assert_eq!(t.headers, vec!["Grootboekrekening", "Bedrag (EUR)"]);
        assert_eq!(t.records[0].len(), 2);
    }

    #[test]
    fn test_is_derived_column() {
        assert!(is_derived_column("Fiscale toelichting"));
        assert!(!is_derived_column("Toelichting"));
        assert!(!is_derived_column("Categorie"));
        assert!(!is_derived_column("Grootboekrekening"));
    }
}
