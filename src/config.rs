// ⚙️ Runtime Configuration
// Optional fiscal-correction.toml, then FISCAL__* environment variables.
// CLI flags are applied on top by the binaries.

use serde::Deserialize;
use std::path::Path;

use crate::error::{CorrectionError, Result};
use crate::schema::{is_derived_column, DEFAULT_AMOUNT_COLUMN, DEFAULT_LABEL_COLUMN};

pub const DEFAULT_EXPORT_FILE_NAME: &str = "fiscale_correctie_resultaat.csv";
pub const CONFIG_FILE_NAME: &str = "fiscal-correction.toml";
pub const ENV_PREFIX: &str = "FISCAL";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Header of the ledger-account label column.
    #[serde(default = "default_label_column")]
    pub label_column: String,
    /// Header of the amount column.
    #[serde(default = "default_amount_column")]
    pub amount_column: String,
    /// Field delimiter for both input and export.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// File name offered for the corrected export.
    #[serde(default = "default_export_file_name")]
    pub export_file_name: String,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_label_column() -> String {
    DEFAULT_LABEL_COLUMN.to_string()
}

fn default_amount_column() -> String {
    DEFAULT_AMOUNT_COLUMN.to_string()
}

fn default_delimiter() -> char {
    ','
}

fn default_export_file_name() -> String {
    DEFAULT_EXPORT_FILE_NAME.to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            label_column: default_label_column(),
            amount_column: default_amount_column(),
            delimiter: default_delimiter(),
            export_file_name: default_export_file_name(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    /// Load from `fiscal-correction.toml` (optional) and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(CONFIG_FILE_NAME)
    }

    /// Load from a TOML file (optional); `FISCAL__*` variables override it.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make a run ill-defined.
    pub fn validate(&self) -> Result<()> {
        if self.label_column.trim().is_empty() || self.amount_column.trim().is_empty() {
            return Err(CorrectionError::Config(
                "label and amount column names must not be empty".to_string(),
            ));
        }
        if self.label_column == self.amount_column {
            return Err(CorrectionError::Config(format!(
                "label and amount column are both '{}'",
                self.label_column
            )));
        }
        for name in [&self.label_column, &self.amount_column] {
            if is_derived_column(name) {
                return Err(CorrectionError::Config(format!(
                    "'{}' is a derived column and cannot be used as input",
                    name
                )));
            }
        }
        self.delimiter_byte().map(|_| ())
    }

    /// The delimiter as the single byte the CSV layer expects.
    pub fn delimiter_byte(&self) -> Result<u8> {
        if self.delimiter.is_ascii() && self.delimiter != '"' && self.delimiter != '\n' {
            Ok(self.delimiter as u8)
        } else {
            Err(CorrectionError::Config(format!(
                "unsupported delimiter {:?}",
                self.delimiter
            )))
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.label_column, "Grootboekrekening");
        assert_eq!(config.amount_column, "Bedrag (EUR)");
        assert_eq!(config.delimiter_byte().unwrap(), b',');
        assert_eq!(config.export_file_name, "fiscale_correctie_resultaat.csv");
        assert_eq!(config.server_addr(), "0.0.0.0:3000");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_derived_column_as_input() {
        let config = Config {
            amount_column: "Fiscale correctie (EUR)".to_string(),
            ..Config::default()
        };
        assert_eq!(config.validate().unwrap_err().code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_rejects_same_column_twice() {
        let config = Config {
            amount_column: "Grootboekrekening".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_non_ascii_delimiter() {
        let config = Config {
            delimiter: '€',
            ..Config::default()
        };
        assert!(config.delimiter_byte().is_err());

        let semicolon = Config {
            delimiter: ';',
            ..Config::default()
        };
        assert_eq!(semicolon.delimiter_byte().unwrap(), b';');
    }

    #[test]
    fn test_load_from_toml_and_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            "label_column = \"Rekening\"\ndelimiter = \";\"\n\n[server]\nport = 8080\n",
        )
        .unwrap();

        let from_file = Config::load_from(&path).unwrap();
        assert_eq!(from_file.label_column, "Rekening");
        assert_eq!(from_file.delimiter_byte().unwrap(), b';');
        assert_eq!(from_file.server.port, 8080);
        assert_eq!(from_file.server.host, "0.0.0.0");

        std::env::set_var("FISCAL__AMOUNT_COLUMN", "Saldo");
        std::env::set_var("FISCAL__DELIMITER", "|");
        let layered = Config::load_from(&path);
        std::env::remove_var("FISCAL__AMOUNT_COLUMN");
        std::env::remove_var("FISCAL__DELIMITER");

        let layered = layered.unwrap();
        assert_eq!(layered.label_column, "Rekening");
        assert_eq!(layered.amount_column, "Saldo");
        assert_eq!(layered.delimiter_byte().unwrap(), b'|');
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.label_column, "Grootboekrekening");
        assert_eq!(config.export_file_name, DEFAULT_EXPORT_FILE_NAME);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "label_column = \"Fiscale correctie (EUR)\"\n").unwrap();

        assert_eq!(Config::load_from(&path).unwrap_err().code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_deserialize_partial() {
        let config: Config = serde_json::from_str(r#"{"amount_column": "Amount"}"#).unwrap();
        assert_eq!(config.amount_column, "Amount");
        assert_eq!(config.label_column, "Grootboekrekening");
        assert_eq!(config.server.port, 3000);
    }
}
