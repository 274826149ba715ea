use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::SegmentStore;
use crate::codec::RecordFormat;
use crate::config::StoreConfig;
use crate::domain::{Locator, Segment};
use crate::error::{FatError, Result};

/// One record file per segment: `<root>/<locator>.<ext>`.
pub struct FsSegmentStore {
    root: PathBuf,
    format: RecordFormat,
    /// Catalog record name, skipped by `locators()`.
    catalog_file: String,
}

impl FsSegmentStore {
    pub fn open(config: &StoreConfig) -> Result<Self> {
        fs::create_dir_all(&config.root)?;
        Ok(Self {
            root: config.root.clone(),
            format: config.format,
            catalog_file: config.catalog_file.clone(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, locator: &Locator) -> PathBuf {
        self.root
            .join(format!("{}.{}", locator, self.format.extension()))
    }
}

/// Write `bytes` to `path` through a sibling temp file so readers never see a
/// half-written record.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

impl SegmentStore for FsSegmentStore {
    fn write_segment(&mut self, locator: &Locator, segment: &Segment) -> Result<()> {
        let bytes = self.format.encode(segment)?;
        let path = self.path_for(locator);
        write_atomic(&path, &bytes)?;
        debug!(%locator, path = %path.display(), "fs: write segment");
        Ok(())
    }

    fn read_segment(&self, locator: &Locator) -> Result<Segment> {
        let bytes = match fs::read(self.path_for(locator)) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(FatError::NotFound {
                    locator: locator.clone(),
                });
            }
            Err(e) => return Err(e.into()),
        };
        self.format.decode(&bytes, "segment")
    }

    fn remove_segment(&mut self, locator: &Locator) -> Result<bool> {
        match fs::remove_file(self.path_for(locator)) {
            Ok(()) => {
                debug!(%locator, "fs: removed segment");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn locators(&self) -> Result<Vec<Locator>> {
        let suffix = format!(".{}", self.format.extension());
        let mut out = Vec::new();
        for entry in walkdir::WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if let Some(stem) = name.strip_suffix(&suffix) {
                if stem != self.catalog_file {
                    out.push(Locator::new(stem));
                }
            }
        }
        out.sort();
        Ok(out)
    }

    fn contains(&self, locator: &Locator) -> Result<bool> {
        Ok(self.path_for(locator).is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(dir: &Path, format: RecordFormat) -> FsSegmentStore {
        let cfg = StoreConfig {
            root: dir.to_path_buf(),
            format,
            ..Default::default()
        };
        FsSegmentStore::open(&cfg).unwrap()
    }

    #[test]
    fn write_then_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open(dir.path(), RecordFormat::Json);
        let loc = Locator::new("notes_ab_0");
        store.write_segment(&loc, &Segment::new("hello", true)).unwrap();
        assert!(dir.path().join("notes_ab_0.json").is_file());
        assert_eq!(store.read_segment(&loc).unwrap(), Segment::new("hello", true));
    }

    #[test]
    fn overwrite_replaces_record() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open(dir.path(), RecordFormat::Cbor);
        let loc = Locator::new("x_0");
        store.write_segment(&loc, &Segment::new("first", false)).unwrap();
        store.write_segment(&loc, &Segment::new("second", true)).unwrap();
        assert_eq!(store.read_segment(&loc).unwrap().payload, "second");
        assert_eq!(store.locators().unwrap(), vec![loc]);
    }

    #[test]
    fn missing_and_corrupt_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(dir.path(), RecordFormat::Json);
        let missing = store.read_segment(&Locator::new("gone_0")).unwrap_err();
        assert!(missing.is_not_found());

        fs::write(dir.path().join("bad_0.json"), b"{\"payload\": 12").unwrap();
        let bad = store.read_segment(&Locator::new("bad_0")).unwrap_err();
        assert!(matches!(bad, FatError::MalformedRecord { .. }));
    }

    #[test]
    fn locators_skip_catalog_and_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open(dir.path(), RecordFormat::Json);
        store
            .write_segment(&Locator::new("b_1"), &Segment::new("", true))
            .unwrap();
        store
            .write_segment(&Locator::new("a_0"), &Segment::new("", false))
            .unwrap();
        fs::write(dir.path().join("fat_table.json"), b"[]").unwrap();
        fs::write(dir.path().join("readme.txt"), b"hi").unwrap();
        assert_eq!(
            store.locators().unwrap(),
            vec![Locator::new("a_0"), Locator::new("b_1")]
        );
    }

    #[test]
    fn remove_reports_presence() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open(dir.path(), RecordFormat::Json);
        let loc = Locator::new("r_0");
        store.write_segment(&loc, &Segment::new("z", true)).unwrap();
        assert!(store.remove_segment(&loc).unwrap());
        assert!(!store.remove_segment(&loc).unwrap());
        assert!(!store.contains(&loc).unwrap());
    }
}
