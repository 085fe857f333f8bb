//! Configuration structures for the inventory pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::TallyError;
use crate::parse::schema::{ColumnSchema, FieldRole};

/// Main configuration for the tally pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TallyConfig {
    /// Line parsing configuration.
    pub parsing: ParsingConfig,

    /// Inventory store configuration.
    pub store: StoreConfig,

    /// Export configuration.
    pub export: ExportConfig,
}

/// Line parsing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingConfig {
    /// Column names expected on invoice rows, in order.
    pub expected_schema: Vec<String>,

    /// Rows with fewer fields than this are rejected.
    pub min_fields: usize,

    /// Lines containing any of these substrings are discarded (case-insensitive).
    pub noise_markers: Vec<String>,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            expected_schema: ColumnSchema::default_names(),
            min_fields: 6,
            noise_markers: [
                "Customer", "Invoice", "Total", "Subtotal", "Date", "Quantity", "Page ", "---",
                "===",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Inventory store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the JSON inventory file.
    pub path: PathBuf,

    /// Save attempts before a batch is reported as failed.
    pub max_save_attempts: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("inventory.json"),
            max_save_attempts: 3,
        }
    }
}

/// Export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Default path of the CSV export.
    pub path: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("inventory.csv"),
        }
    }
}

impl TallyConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Check settings the pipeline cannot work without.
    pub fn validate(&self) -> Result<(), TallyError> {
        let schema = ColumnSchema::new(self.parsing.expected_schema.clone());
        if schema.position(FieldRole::ItemName).is_none() {
            return Err(TallyError::Config(
                "expected_schema must contain an item name column".to_string(),
            ));
        }
        if self.parsing.min_fields == 0 {
            return Err(TallyError::Config("min_fields must be at least 1".to_string()));
        }
        if self.store.max_save_attempts == 0 {
            return Err(TallyError::Config(
                "store.max_save_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
