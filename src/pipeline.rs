// 🔁 Correction Pipeline
// raw rows → classified rows → corrected rows → audit trail + output table
//
// Fail-fast: a run either corrects every row or returns an error and no output.

use crate::config::Config;
use crate::corrector::{correct, CorrectedEntry};
use crate::error::{CorrectionError, Result};
use crate::ledger::{decode_csv, encode_csv, parse_amount, LedgerEntry, LedgerTable};
use crate::report::{derived_digest, CorrectionSummary};
use crate::schema::{ColumnLayout, SchemaValidator, DERIVED_COLUMNS};
use serde::Serialize;
use tracing::{debug, info};

// ============================================================================
// AUDIT TRAIL
// ============================================================================

/// One line per processed entry; line i belongs to output row i
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditTrail {
    lines: Vec<String>,
}

impl AuditTrail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: String) {
        self.lines.push(line);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.lines.iter()
    }

    /// Newline-joined text for a rendering layer
    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

// ============================================================================
// ENTRY-LEVEL RUN
// ============================================================================

/// Correct every entry in order and collect the audit trail.
pub fn run<I>(entries: I) -> (Vec<CorrectedEntry>, AuditTrail)
where
    I: IntoIterator<Item = LedgerEntry>,
{
    let mut corrected = Vec::new();
    let mut audit = AuditTrail::new();

    for (index, entry) in entries.into_iter().enumerate() {
        let row = correct(entry);
        debug!(row = index + 1, category = %row.category, "corrected entry");

        audit.push(row.audit_line());
        corrected.push(row);
    }

    (corrected, audit)
}

// ============================================================================
// TABLE-LEVEL RUN
// ============================================================================

/// Output of one table run
#[derive(Debug, Clone, Serialize)]
pub struct CorrectionRun {
    /// Original columns followed by the four derived columns
    pub table: LedgerTable,
    pub entries: Vec<CorrectedEntry>,
    pub audit: AuditTrail,

    /// Derived columns found on the input and recomputed
    pub stripped_columns: Vec<String>,
}

impl CorrectionRun {
    pub fn summary(&self) -> CorrectionSummary {
        CorrectionSummary::from_entries(&self.entries)
    }

    pub fn digest(&self) -> String {
        derived_digest(&self.entries)
    }

    pub fn to_csv(&self, delimiter: u8) -> Result<Vec<u8>> {
        encode_csv(&self.table, delimiter)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    validator: SchemaValidator,
}

impl Pipeline {
    pub fn new(validator: SchemaValidator) -> Self {
        Pipeline { validator }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(SchemaValidator::from_config(config))
    }

    pub fn validator(&self) -> &SchemaValidator {
        &self.validator
    }

    /// Decode delimited bytes and run them
    pub fn run_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<CorrectionRun> {
        let table = decode_csv(bytes, delimiter)?;
        self.run_table(table)
    }

    /// Strip stale derived columns, validate, correct, and append the results.
    pub fn run_table(&self, mut table: LedgerTable) -> Result<CorrectionRun> {
        let stripped_columns = self.validator.strip_derived(&mut table);
        let layout = self.validator.validate(&table)?;
        let entries = self.extract_entries(&table, layout)?;

        let (corrected, audit) = run(entries);

        let mut columns: [Vec<String>; 4] = Default::default();
        for entry in &corrected {
            for (column, cell) in columns.iter_mut().zip(entry.derived_cells()) {
                column.push(cell);
            }
        }
        for (name, values) in DERIVED_COLUMNS.iter().zip(columns) {
            table.push_column(name, values);
        }

        info!(
            rows = corrected.len(),
            stripped = stripped_columns.len(),
            "correction run complete"
        );

        Ok(CorrectionRun {
            table,
            entries: corrected,
            audit,
            stripped_columns,
        })
    }

    /// Read label and amount from every row; the first bad amount fails the run
    pub fn extract_entries(
        &self,
        table: &LedgerTable,
        layout: ColumnLayout,
    ) -> Result<Vec<LedgerEntry>> {
        table
            .records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let label = record.get(layout.label).map(String::as_str).unwrap_or("");
                let raw_amount = record.get(layout.amount).map(String::as_str).unwrap_or("");

                let amount =
                    parse_amount(raw_amount).ok_or_else(|| CorrectionError::NumericConversion {
                        row: index + 1,
                        label: label.to_string(),
                        value: raw_amount.to_string(),
                    })?;

                Ok(LedgerEntry::new(label, amount))
            })
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
