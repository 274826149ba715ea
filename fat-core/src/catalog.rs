use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::codec::RecordFormat;
use crate::config::{Backend, StoreConfig};
use crate::domain::FileEntry;
use crate::error::Result;
use crate::store::fs::write_atomic;

/// Ordered file entries; position is insertion order and never changes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: Vec<FileEntry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn get(&self, pos: usize) -> Option<&FileEntry> {
        self.entries.get(pos)
    }

    pub fn get_mut(&mut self, pos: usize) -> Option<&mut FileEntry> {
        self.entries.get_mut(pos)
    }

    /// Append and return the new entry's catalog position.
    pub fn push(&mut self, entry: FileEntry) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }
}

/// Where the catalog record lives between runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogLocation {
    File { path: PathBuf, format: RecordFormat },
    /// Nothing survives the process; pairs with the in-memory segment store.
    Memory,
}

impl CatalogLocation {
    pub fn for_config(config: &StoreConfig) -> Self {
        match config.backend {
            Backend::Fs => CatalogLocation::File {
                path: config.catalog_path(),
                format: config.format,
            },
            Backend::Memory => CatalogLocation::Memory,
        }
    }

    /// An absent record yields an empty catalog.
    pub fn load_all(&self) -> Result<Catalog> {
        let CatalogLocation::File { path, format } = self else {
            return Ok(Catalog::new());
        };
        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no catalog yet; starting empty");
                return Ok(Catalog::new());
            }
            Err(e) => return Err(e.into()),
        };
        let catalog: Catalog = format.decode(&bytes, "catalog")?;
        info!(path = %path.display(), entries = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    /// Overwrite the persisted catalog wholesale.
    pub fn persist_all(&self, catalog: &Catalog) -> Result<()> {
        let CatalogLocation::File { path, format } = self else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        write_atomic(path, &format.encode(catalog)?)?;
        info!(path = %path.display(), entries = catalog.len(), "catalog persisted");
        Ok(())
    }
}
