//! Settings loaded from `obras.toml`.
//!
//! [`ObrasConfig`] holds every configurable value. Keys missing from the
//! file take their defaults. `OBRAS_DATABASE` takes precedence over the file.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ObrasError;
use crate::etl::{CsvSource, Encoding};

/// File read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "obras.toml";

/// Environment variable that overrides `database_path`.
pub const DATABASE_ENV: &str = "OBRAS_DATABASE";

/// Top-level configuration read from `obras.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObrasConfig {
    /// SQLite database path.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// CSV export used by `obras load` without `--file`.
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,

    /// CSV field delimiter. Must be a single ASCII character.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// CSV encoding (`utf-8` or `latin-1`).
    #[serde(default = "default_encoding")]
    pub encoding: String,

    /// Rows per transaction during bulk load.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

// Default database: "obras_urbanas.db".
fn default_database_path() -> PathBuf {
    PathBuf::from("obras_urbanas.db")
}

fn default_csv_path() -> PathBuf {
    PathBuf::from("observatorio-de-obras-urbanas.csv")
}

// Default delimiter: ";".
fn default_delimiter() -> String {
    ";".to_string()
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

// Default batch: 500 rows.
fn default_batch_size() -> usize {
    500
}

impl Default for ObrasConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            csv_path: default_csv_path(),
            delimiter: default_delimiter(),
            encoding: default_encoding(),
            batch_size: default_batch_size(),
        }
    }
}

impl ObrasConfig {
    /// Loads the given file, or `obras.toml` when none is given.
    ///
    /// An explicit path must exist. A missing default file yields the
    /// default values.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ObrasError> {
        let mut config = match path {
            Some(path) if !path.exists() => {
                return Err(ObrasError::FileNotFound(path.to_path_buf()));
            }
            Some(path) => Self::parse(&std::fs::read_to_string(path)?)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::parse(&std::fs::read_to_string(default)?)?
                } else {
                    Self::default()
                }
            }
        };

        // The environment wins over the file.
        config.apply_database_override(std::env::var(DATABASE_ENV).ok());
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self, ObrasError> {
        let config: ObrasConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_database_override(&mut self, value: Option<String>) {
        if let Some(path) = value
            && !path.trim().is_empty()
        {
            self.database_path = PathBuf::from(path.trim());
        }
    }

    /// Checks the delimiter, encoding and batch size.
    pub fn validate(&self) -> Result<(), ObrasError> {
        self.delimiter_byte()?;
        self.encoding()?;
        if self.batch_size == 0 {
            return Err(ObrasError::Config("batch_size must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn delimiter_byte(&self) -> Result<u8, ObrasError> {
        match self.delimiter.as_bytes() {
            [byte] if byte.is_ascii() => Ok(*byte),
            _ => Err(ObrasError::Config(format!(
                "delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            ))),
        }
    }

    pub fn encoding(&self) -> Result<Encoding, ObrasError> {
        self.encoding.parse()
    }

    /// Builds the CSV source from these settings.
    pub fn csv_source(&self) -> Result<CsvSource, ObrasError> {
        Ok(CsvSource {
            path: self.csv_path.clone(),
            delimiter: self.delimiter_byte()?,
            encoding: self.encoding()?,
        })
    }
}
