use std::collections::BTreeMap;

use tracing::debug;

use super::SegmentStore;
use crate::domain::{Locator, Segment};
use crate::error::{FatError, Result};

/// Arena of segments keyed by locator; nothing outlives the value.
#[derive(Clone, Debug, Default)]
pub struct MemSegmentStore {
    segments: BTreeMap<Locator, Segment>,
}

impl MemSegmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl SegmentStore for MemSegmentStore {
    fn write_segment(&mut self, locator: &Locator, segment: &Segment) -> Result<()> {
        debug!(%locator, len = segment.payload.len(), "mem: write segment");
        self.segments.insert(locator.clone(), segment.clone());
        Ok(())
    }

    fn read_segment(&self, locator: &Locator) -> Result<Segment> {
        self.segments
            .get(locator)
            .cloned()
            .ok_or_else(|| FatError::NotFound {
                locator: locator.clone(),
            })
    }

    fn remove_segment(&mut self, locator: &Locator) -> Result<bool> {
        Ok(self.segments.remove(locator).is_some())
    }

    fn locators(&self) -> Result<Vec<Locator>> {
        Ok(self.segments.keys().cloned().collect())
    }

    fn contains(&self, locator: &Locator) -> Result<bool> {
        Ok(self.segments.contains_key(locator))
    }
}
