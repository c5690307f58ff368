// 🚨 Error Taxonomy - typed failures surfaced to the caller
// Nothing here is logged-and-continued: a failed run produces no output.

use thiserror::Error;

/// Result type alias using `CorrectionError`.
pub type Result<T> = std::result::Result<T, CorrectionError>;

#[derive(Debug, Error)]
pub enum CorrectionError {
    /// Required column(s) missing from the input header.
    #[error(
        "missing required column(s) {}; input must contain {}",
        quote_all(.missing),
        quote_all(.required)
    )]
    Schema {
        missing: Vec<String>,
        required: Vec<String>,
    },

    /// An amount cell could not be read as a finite number.
    #[error("row {row} ('{label}'): cannot read amount '{value}' as a number")]
    NumericConversion {
        row: usize,
        label: String,
        value: String,
    },

    /// The uploaded bytes are not a readable delimited table.
    #[error("cannot decode input at line {line}: {message}")]
    Decode { line: u64, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl CorrectionError {
    /// Stable machine-readable code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Schema { .. } => "SCHEMA_ERROR",
            Self::NumericConversion { .. } => "NUMERIC_CONVERSION_ERROR",
            Self::Decode { .. } => "DECODE_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }

    /// HTTP status for the server front-end.
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Schema { .. } | Self::NumericConversion { .. } => 422,
            Self::Decode { .. } => 400,
            Self::Io(_) | Self::Config(_) => 500,
        }
    }

    /// True for errors caused by the submitted data rather than the host.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::Schema { .. } | Self::NumericConversion { .. } | Self::Decode { .. }
        )
    }
}

impl From<config::ConfigError> for CorrectionError {
    fn from(err: config::ConfigError) -> Self {
        CorrectionError::Config(err.to_string())
    }
}

fn quote_all(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("'{}'", n))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_names_fields() {
        let err = CorrectionError::Schema {
            missing: vec!["Bedrag (EUR)".to_string()],
            required: vec!["Grootboekrekening".to_string(), "Bedrag (EUR)".to_string()],
        };

        let msg = err.to_string();
        assert!(msg.contains("missing required column(s) 'Bedrag (EUR)'"));
        assert!(msg.contains("'Grootboekrekening', 'Bedrag (EUR)'"));
        assert_eq!(err.code(), "SCHEMA_ERROR");
        assert_eq!(err.status_code(), 422);
    }

    #[test]
    fn test_numeric_error_carries_row_context() {
        let err = CorrectionError::NumericConversion {
            row: 3,
            label: "Huur kantoor".to_string(),
            value: "abc".to_string(),
        };

        assert_eq!(
            err.to_string(),
            "row 3 ('Huur kantoor'): cannot read amount 'abc' as a number"
        );
        assert!(err.is_input_error());
    }

    #[test]
    fn test_io_error_is_not_input_error() {
        let err: CorrectionError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.code(), "IO_ERROR");
        assert_eq!(err.status_code(), 500);
        assert!(!err.is_input_error());
    }
}
