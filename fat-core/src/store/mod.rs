// fat_core/src/store/mod.rs
use std::collections::HashSet;

use tracing::debug;

use crate::domain::{Locator, Segment};
use crate::error::{FatError, Result};

pub mod factory;
pub mod fs;
pub mod mem;

/// Key-addressed segment records. The only layer that touches segment storage.
pub trait SegmentStore {
    /// Persist `segment` at `locator`, replacing whatever was there.
    fn write_segment(&mut self, locator: &Locator, segment: &Segment) -> Result<()>;

    /// Fails with `NotFound` when nothing is stored at `locator`.
    fn read_segment(&self, locator: &Locator) -> Result<Segment>;

    /// Returns false when nothing was stored at `locator`.
    fn remove_segment(&mut self, locator: &Locator) -> Result<bool>;

    /// Every segment locator currently held, in no particular order.
    fn locators(&self) -> Result<Vec<Locator>>;

    fn contains(&self, locator: &Locator) -> Result<bool> {
        match self.read_segment(locator) {
            Ok(_) => Ok(true),
            Err(FatError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Patch the `next_locator` of the segment at `locator`.
    fn link_next(&mut self, locator: &Locator, next: &Locator) -> Result<()> {
        let mut seg = self.read_segment(locator)?;
        seg.next_locator = Some(next.clone());
        self.write_segment(locator, &seg)
    }

    /// Delete the chain rooted at `start`, stopping after the `is_last`
    /// segment. An absent start is a no-op. Returns the number removed.
    fn delete_chain(&mut self, start: &Locator) -> Result<usize> {
        let mut seen = HashSet::new();
        let mut current = Some(start.clone());
        let mut removed = 0usize;
        while let Some(loc) = current {
            if !seen.insert(loc.clone()) {
                break;
            }
            let seg = match self.read_segment(&loc) {
                Ok(seg) => seg,
                Err(FatError::NotFound { .. }) => break,
                Err(e) => return Err(e),
            };
            self.remove_segment(&loc)?;
            removed += 1;
            if seg.is_last {
                break;
            }
            current = seg.next_locator;
        }
        debug!(start = %start, removed, "chain deleted");
        Ok(removed)
    }
}
