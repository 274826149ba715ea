use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::codec::RecordFormat;
use crate::error::{FatError, Result};

pub const DEFAULT_SEGMENT_CAPACITY: usize = 20;
pub const DEFAULT_CATALOG_FILE: &str = "fat_table";

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Fs,
    Memory,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the catalog record and every segment record.
    pub root: PathBuf,
    /// Catalog record name, without extension.
    pub catalog_file: String,
    /// Max chars per segment.
    pub segment_capacity: usize,
    pub format: RecordFormat,
    pub backend: Backend,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            catalog_file: DEFAULT_CATALOG_FILE.to_string(),
            segment_capacity: DEFAULT_SEGMENT_CAPACITY,
            format: RecordFormat::Json,
            backend: Backend::Fs,
        }
    }
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory,
            ..Default::default()
        }
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Read a JSON config file; missing keys fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let cfg: StoreConfig = serde_json::from_slice(&bytes)
            .map_err(|e| FatError::Config(format!("{}: {e}", path.display())))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.segment_capacity == 0 {
            return Err(FatError::Config("segment_capacity must be at least 1".into()));
        }
        if self.catalog_file.trim().is_empty() {
            return Err(FatError::Config("catalog_file must not be empty".into()));
        }
        Ok(())
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.root
            .join(format!("{}.{}", self.catalog_file, self.format.extension()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_layout() {
        let cfg = StoreConfig::default();
        assert_eq!(cfg.segment_capacity, 20);
        assert_eq!(cfg.catalog_path(), PathBuf::from("./fat_table.json"));
        cfg.validate().unwrap();
    }

    #[test]
    fn zero_capacity_rejected() {
        let cfg = StoreConfig {
            segment_capacity: 0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(FatError::Config(_))));
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fat.json");
        std::fs::write(&path, br#"{ "segment_capacity": 8, "format": "cbor" }"#).unwrap();
        let cfg = StoreConfig::from_file(&path).unwrap();
        assert_eq!(cfg.segment_capacity, 8);
        assert_eq!(cfg.format, RecordFormat::Cbor);
        assert_eq!(cfg.catalog_file, DEFAULT_CATALOG_FILE);
        assert_eq!(cfg.backend, Backend::Fs);
    }
}
