// Fiscal Correction - Core Library
// Classifies ledger entries, applies the deduction table and builds the export.
// Shared by the CLI, the terminal viewer and the web server.

pub mod config;
pub mod corrector;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod rules;
pub mod schema;

// Re-export commonly used types
pub use config::{Config, ServerConfig, CONFIG_FILE_NAME, DEFAULT_EXPORT_FILE_NAME};
pub use corrector::{correct, CorrectedEntry};
pub use error::{CorrectionError, Result};
pub use ledger::{
    decode_csv, encode_csv, format_amount, load_csv, parse_amount, write_csv, LedgerEntry,
    LedgerTable,
};
pub use pipeline::{run, AuditTrail, CorrectionRun, Pipeline};
pub use report::{
    derived_digest, format_rules, format_summary, CategoryTotal, CorrectionSummary,
};
pub use rules::{
    classify, classify_detailed, rule_for, CategoryTag, ClassificationResult, DeductionRule,
    KeywordRule, DEDUCTION_RULES, KEYWORD_RULES,
};
pub use schema::{
    ColumnLayout, SchemaValidator, CATEGORY_COLUMN, CORRECTION_COLUMN, DEDUCTIBLE_COLUMN,
    DERIVED_COLUMNS, EXPLANATION_COLUMN,
};
