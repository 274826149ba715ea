#![forbid(unsafe_code)]

pub mod error;
pub mod config;

pub mod util {
    pub mod sanitize;
}

pub mod codec;
pub mod domain;

pub mod store;
pub mod chain;
pub mod catalog;
pub mod table;
pub mod verify;

// Re-exports: stable API surface
pub use catalog::{Catalog, CatalogLocation};
pub use chain::{Allocator, read_chain};
pub use codec::RecordFormat;
pub use config::{Backend, StoreConfig};
pub use domain::{BaseLocator, FileEntry, Locator, Segment};
pub use error::{FatError, Result};
pub use store::SegmentStore;
pub use table::{FileTable, Listed, OpenedFile, PendingEdit};
pub use verify::{VerifyReport, verify};
