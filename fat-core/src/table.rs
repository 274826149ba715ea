use time::OffsetDateTime;
use tracing::info;

use crate::catalog::{Catalog, CatalogLocation};
use crate::chain::{Allocator, read_chain};
use crate::config::StoreConfig;
use crate::domain::{BaseLocator, FileEntry};
use crate::error::{FatError, Result};
use crate::store::SegmentStore;
use crate::store::factory::open_store;

/// One row of a listing. `index` is the 1-based position among the rows of
/// this listing only; `position` is the entry's place in the catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Listed<'a> {
    pub index: usize,
    pub position: usize,
    pub entry: &'a FileEntry,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpenedFile {
    pub position: usize,
    pub entry: FileEntry,
    pub content: String,
}

/// A modification waiting for confirmation. Dropping it discards the edit;
/// nothing is written until [`FileTable::commit_edit`].
#[derive(Debug)]
#[must_use = "an edit does nothing until committed"]
pub struct PendingEdit {
    position: usize,
    content: String,
}

impl PendingEdit {
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// File table manager: owns the catalog and drives the allocation engine.
pub struct FileTable {
    catalog: Catalog,
    location: CatalogLocation,
    store: Box<dyn SegmentStore>,
    allocator: Allocator,
}

fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

impl FileTable {
    /// Open the configured store and load the persisted catalog.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        config.validate()?;
        let store = open_store(config)?;
        Self::with_store(
            store,
            CatalogLocation::for_config(config),
            config.segment_capacity,
        )
    }

    pub fn with_store(
        store: Box<dyn SegmentStore>,
        location: CatalogLocation,
        segment_capacity: usize,
    ) -> Result<Self> {
        let allocator = Allocator::new(segment_capacity)?;
        let catalog = location.load_all()?;
        Ok(Self {
            catalog,
            location,
            store,
            allocator,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &dyn SegmentStore {
        self.store.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn store_mut(&mut self) -> &mut dyn SegmentStore {
        self.store.as_mut()
    }

    pub fn allocator(&self) -> &Allocator {
        &self.allocator
    }

    pub fn entry(&self, position: usize) -> Result<&FileEntry> {
        self.catalog
            .get(position)
            .ok_or_else(|| FatError::invalid_selection(position, "no such catalog position"))
    }

    fn live_entry_mut(&mut self, position: usize) -> Result<&mut FileEntry> {
        let entry = self
            .catalog
            .get_mut(position)
            .ok_or_else(|| FatError::invalid_selection(position, "no such catalog position"))?;
        if entry.is_deleted {
            return Err(FatError::invalid_selection(position, "file is in the trash"));
        }
        Ok(entry)
    }

    /// Write `content` as a new chain and append its entry. Returns the
    /// catalog position.
    pub fn create(&mut self, name: &str, content: &str) -> Result<usize> {
        let base = BaseLocator::generate(name)?;
        self.allocator.allocate(self.store.as_mut(), content, &base)?;
        let ts = now();
        let position = self.catalog.push(FileEntry {
            name: name.to_string(),
            base_locator: base,
            is_deleted: false,
            total_length: content.chars().count(),
            created_at: ts,
            modified_at: ts,
            deleted_at: None,
        });
        info!(name, position, "file created");
        Ok(position)
    }

    /// Entries whose deletion flag equals `deleted`, in catalog order.
    pub fn list(&self, deleted: bool) -> Vec<Listed<'_>> {
        self.catalog
            .entries()
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_deleted == deleted)
            .enumerate()
            .map(|(i, (position, entry))| Listed {
                index: i + 1,
                position,
                entry,
            })
            .collect()
    }

    /// Map a 1-based display index from `list(require_deleted)` back to a
    /// catalog position.
    pub fn resolve(&self, display_index: usize, require_deleted: bool) -> Result<usize> {
        if display_index == 0 {
            return Err(FatError::invalid_selection(display_index, "indices start at 1"));
        }
        let listing = self.list(require_deleted);
        listing
            .get(display_index - 1)
            .map(|row| row.position)
            .ok_or_else(|| {
                let what = if require_deleted { "deleted" } else { "live" };
                FatError::invalid_selection(
                    display_index,
                    format!("only {} {what} file(s)", listing.len()),
                )
            })
    }

    /// Content of the entry at `position`. A live entry without a chain is
    /// an integrity failure.
    pub fn read(&self, position: usize) -> Result<String> {
        let entry = self.entry(position)?;
        read_chain(self.store.as_ref(), &entry.chain_start()).map_err(|e| match e {
            FatError::NotFound { locator } => FatError::Integrity(format!(
                "file '{}' has no chain at {locator}",
                entry.name
            )),
            other => other,
        })
    }

    pub fn open_file(&self, display_index: usize) -> Result<OpenedFile> {
        let position = self.resolve(display_index, false)?;
        let content = self.read(position)?;
        Ok(OpenedFile {
            position,
            entry: self.entry(position)?.clone(),
            content,
        })
    }

    pub fn stage_modify(&self, position: usize, content: impl Into<String>) -> Result<PendingEdit> {
        let entry = self.entry(position)?;
        if entry.is_deleted {
            return Err(FatError::invalid_selection(position, "file is in the trash"));
        }
        Ok(PendingEdit {
            position,
            content: content.into(),
        })
    }

    /// Rewrite the whole chain with the staged content.
    pub fn commit_edit(&mut self, edit: PendingEdit) -> Result<()> {
        let base = self.live_entry_mut(edit.position)?.base_locator.clone();
        self.allocator
            .replace(self.store.as_mut(), &edit.content, &base)?;
        let entry = self.live_entry_mut(edit.position)?;
        entry.total_length = edit.content.chars().count();
        entry.modified_at = now().max(entry.created_at);
        info!(name = %entry.name, position = edit.position, "file modified");
        Ok(())
    }

    pub fn modify(&mut self, position: usize, content: &str) -> Result<()> {
        let edit = self.stage_modify(position, content)?;
        self.commit_edit(edit)
    }

    /// Move an entry to the trash. The chain is left in place.
    pub fn soft_delete(&mut self, position: usize) -> Result<()> {
        let entry = self.live_entry_mut(position)?;
        entry.is_deleted = true;
        entry.deleted_at = Some(now());
        info!(name = %entry.name, position, "file moved to trash");
        Ok(())
    }

    pub fn restore(&mut self, position: usize) -> Result<()> {
        let entry = self
            .catalog
            .get_mut(position)
            .ok_or_else(|| FatError::invalid_selection(position, "no such catalog position"))?;
        if !entry.is_deleted {
            return Err(FatError::invalid_selection(position, "file is not deleted"));
        }
        entry.is_deleted = false;
        entry.deleted_at = None;
        info!(name = %entry.name, position, "file recovered");
        Ok(())
    }

    pub fn persist_all(&self) -> Result<()> {
        self.location.persist_all(&self.catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> FileTable {
        FileTable::open(&StoreConfig::in_memory()).unwrap()
    }

    #[test]
    fn create_records_metadata_and_chain() {
        let mut t = table();
        let pos = t.create("notes", &"n".repeat(45)).unwrap();
        let e = t.entry(pos).unwrap();
        assert_eq!(e.name, "notes");
        assert_eq!(e.total_length, 45);
        assert!(!e.is_deleted);
        assert_eq!(e.created_at, e.modified_at);
        assert_eq!(e.deleted_at, None);
        assert_eq!(t.read(pos).unwrap(), "n".repeat(45));
        assert_eq!(t.store().locators().unwrap().len(), 3);
    }

    #[test]
    fn same_name_files_get_distinct_chains() {
        let mut t = table();
        let a = t.create("dup", "first").unwrap();
        let b = t.create("dup", "second").unwrap();
        assert_ne!(
            t.entry(a).unwrap().base_locator,
            t.entry(b).unwrap().base_locator
        );
        assert_eq!(t.read(a).unwrap(), "first");
        assert_eq!(t.read(b).unwrap(), "second");
    }

    #[test]
    fn list_renumbers_per_filter() {
        let mut t = table();
        for name in ["a", "b", "c", "d"] {
            t.create(name, name).unwrap();
        }
        t.soft_delete(1).unwrap();
        t.soft_delete(3).unwrap();

        let live: Vec<(usize, usize, &str)> = t
            .list(false)
            .iter()
            .map(|r| (r.index, r.position, r.entry.name.as_str()))
            .collect();
        assert_eq!(live, vec![(1, 0, "a"), (2, 2, "c")]);

        let trash: Vec<(usize, usize)> = t.list(true).iter().map(|r| (r.index, r.position)).collect();
        assert_eq!(trash, vec![(1, 1), (2, 3)]);

        assert_eq!(t.list(false), t.list(false));
    }

    #[test]
    fn resolve_uses_filtered_indices() {
        let mut t = table();
        t.create("a", "").unwrap();
        t.create("b", "").unwrap();
        t.soft_delete(0).unwrap();
        assert_eq!(t.resolve(1, false).unwrap(), 1);
        assert_eq!(t.resolve(1, true).unwrap(), 0);
        assert!(matches!(
            t.resolve(2, true),
            Err(FatError::InvalidSelection { index: 2, .. })
        ));
        assert!(matches!(t.resolve(0, false), Err(FatError::InvalidSelection { .. })));
    }

    #[test]
    fn unconfirmed_edit_changes_nothing() {
        let mut t = table();
        let pos = t.create("draft", "original text").unwrap();
        let before = t.entry(pos).unwrap().clone();
        let edit = t.stage_modify(pos, "replacement").unwrap();
        assert_eq!(edit.content(), "replacement");
        drop(edit);
        assert_eq!(t.entry(pos).unwrap(), &before);
        assert_eq!(t.read(pos).unwrap(), "original text");
    }

    #[test]
    fn committed_edit_rewrites_chain() {
        let mut t = table();
        let pos = t.create("draft", &"x".repeat(50)).unwrap();
        let created = t.entry(pos).unwrap().created_at;
        let edit = t.stage_modify(pos, "short").unwrap();
        t.commit_edit(edit).unwrap();

        let e = t.entry(pos).unwrap();
        assert_eq!(e.total_length, 5);
        assert!(e.modified_at >= created);
        assert_eq!(t.read(pos).unwrap(), "short");
        assert_eq!(t.store().locators().unwrap(), vec![e.chain_start()]);
    }

    #[test]
    fn deleted_files_cannot_be_modified() {
        let mut t = table();
        let pos = t.create("gone", "bye").unwrap();
        t.soft_delete(pos).unwrap();
        assert!(matches!(t.modify(pos, "x"), Err(FatError::InvalidSelection { .. })));
        assert!(matches!(t.soft_delete(pos), Err(FatError::InvalidSelection { .. })));
    }

    #[test]
    fn delete_then_restore_round_trips() {
        let mut t = table();
        let pos = t.create("keep", "payload").unwrap();
        let original = t.entry(pos).unwrap().clone();

        t.soft_delete(pos).unwrap();
        let deleted = t.entry(pos).unwrap();
        assert!(deleted.is_deleted);
        assert!(deleted.deleted_at.is_some());
        assert_eq!(t.read(pos).unwrap(), "payload");

        t.restore(pos).unwrap();
        assert_eq!(t.entry(pos).unwrap(), &original);
    }

    #[test]
    fn restore_of_live_entry_fails() {
        let mut t = table();
        let pos = t.create("live", "").unwrap();
        assert!(matches!(t.restore(pos), Err(FatError::InvalidSelection { .. })));
    }

    #[test]
    fn missing_chain_is_integrity_error() {
        let mut t = table();
        let pos = t.create("broken", "abc").unwrap();
        let start = t.entry(pos).unwrap().chain_start();
        t.store.remove_segment(&start).unwrap();
        assert!(matches!(t.read(pos), Err(FatError::Integrity(_))));
    }

    #[test]
    fn open_file_resolves_live_index() {
        let mut t = table();
        t.create("one", "1").unwrap();
        t.create("two", "22").unwrap();
        t.soft_delete(0).unwrap();
        let opened = t.open_file(1).unwrap();
        assert_eq!(opened.position, 1);
        assert_eq!(opened.entry.name, "two");
        assert_eq!(opened.content, "22");
    }
}
