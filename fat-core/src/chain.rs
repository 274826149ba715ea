//! Allocation engine: splits content into bounded segments, links them into a
//! chain, and walks chains back into content.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::domain::{BaseLocator, Locator, Segment};
use crate::error::{FatError, Result};
use crate::store::SegmentStore;

/// How a chain walk ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// Reached a segment flagged `is_last`.
    Eof,
    /// Ran out of links (or hit a missing record) before any `is_last`.
    Truncated,
    /// A link pointed back at an already visited segment.
    Cycle,
}

#[derive(Clone, Debug)]
pub struct ChainWalk {
    pub content: String,
    /// Segment locators in visitation order.
    pub visited: Vec<Locator>,
    pub termination: Termination,
}

#[derive(Clone, Copy, Debug)]
pub struct Allocator {
    capacity: usize,
}

impl Allocator {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(FatError::Config("segment capacity must be at least 1".into()));
        }
        Ok(Self { capacity })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// `max(1, ceil(chars / capacity))`.
    pub fn segment_count(&self, chars: usize) -> usize {
        chars.div_ceil(self.capacity).max(1)
    }

    /// Chunk `content` into runs of at most `capacity` chars. Empty content
    /// yields a single empty chunk.
    pub fn split<'a>(&self, content: &'a str) -> Vec<&'a str> {
        let mut chunks = Vec::with_capacity(self.segment_count(content.len()));
        let mut start = 0usize;
        let mut count = 0usize;
        for (idx, _) in content.char_indices() {
            if count == self.capacity {
                chunks.push(&content[start..idx]);
                start = idx;
                count = 0;
            }
            count += 1;
        }
        chunks.push(&content[start..]);
        chunks
    }

    /// Write `content` as a chain under `base` and return its start locator.
    ///
    /// Segment `i + 1` is durable before segment `i` is patched to point at
    /// it, so a reader never follows a link to a record that does not exist.
    pub fn allocate(
        &self,
        store: &mut dyn SegmentStore,
        content: &str,
        base: &BaseLocator,
    ) -> Result<Locator> {
        let chunks = self.split(content);
        let last = chunks.len() - 1;
        let mut prev: Option<Locator> = None;
        for (i, chunk) in chunks.into_iter().enumerate() {
            let loc = base.segment(i);
            store.write_segment(&loc, &Segment::new(chunk, i == last))?;
            if let Some(p) = prev.take() {
                store.link_next(&p, &loc)?;
            }
            prev = Some(loc);
        }
        debug!(%base, segments = last + 1, "chain allocated");
        Ok(base.chain_start())
    }

    /// Delete the chain under `base` and rebuild it in place with `content`.
    pub fn replace(
        &self,
        store: &mut dyn SegmentStore,
        content: &str,
        base: &BaseLocator,
    ) -> Result<Locator> {
        store.delete_chain(&base.chain_start())?;
        self.allocate(store, content, base)
    }
}

/// Concatenate a chain's payloads. Fails only when `start` itself is absent.
pub fn read_chain(store: &dyn SegmentStore, start: &Locator) -> Result<String> {
    Ok(walk_chain(store, start)?.content)
}

pub fn walk_chain(store: &dyn SegmentStore, start: &Locator) -> Result<ChainWalk> {
    let mut content = String::new();
    let mut visited = Vec::new();
    let mut seen = HashSet::new();
    let mut loc = start.clone();
    let mut seg = store.read_segment(start)?;

    let termination = loop {
        seen.insert(loc.clone());
        visited.push(loc.clone());
        content.push_str(&seg.payload);
        if seg.is_last {
            break Termination::Eof;
        }
        let Some(next) = seg.next_locator.take() else {
            warn!(%start, at = %loc, "chain ends without an end-of-file segment");
            break Termination::Truncated;
        };
        if seen.contains(&next) {
            warn!(%start, at = %next, "chain loops back on itself");
            break Termination::Cycle;
        }
        seg = match store.read_segment(&next) {
            Ok(s) => s,
            Err(FatError::NotFound { .. }) => {
                warn!(%start, missing = %next, "chain link points at a missing segment");
                break Termination::Truncated;
            }
            Err(e) => return Err(e),
        };
        loc = next;
    };

    Ok(ChainWalk {
        content,
        visited,
        termination,
    })
}
