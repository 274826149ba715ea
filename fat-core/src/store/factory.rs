use super::SegmentStore;
use super::fs::FsSegmentStore;
use super::mem::MemSegmentStore;
use crate::config::{Backend, StoreConfig};
use crate::error::Result;

pub fn open_store(config: &StoreConfig) -> Result<Box<dyn SegmentStore>> {
    match config.backend {
        Backend::Fs => Ok(Box::new(FsSegmentStore::open(config)?)),
        Backend::Memory => Ok(Box::new(MemSegmentStore::new())),
    }
}
