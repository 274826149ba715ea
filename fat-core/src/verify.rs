//! Read-only consistency check of catalog against segment storage.

use std::collections::HashSet;

use tracing::warn;

use crate::chain::{Termination, walk_chain};
use crate::domain::Locator;
use crate::error::{FatError, Result};
use crate::table::FileTable;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChainStatus {
    Ok,
    /// Chain start has no record.
    Missing,
    /// Walk ended without reaching an end-of-file segment.
    Truncated,
    Cycle,
    LengthMismatch { expected: usize, actual: usize },
}

#[derive(Clone, Debug)]
pub struct ChainReport {
    pub position: usize,
    pub name: String,
    pub is_deleted: bool,
    pub segments: usize,
    pub status: ChainStatus,
}

#[derive(Clone, Debug, Default)]
pub struct VerifyReport {
    pub chains: Vec<ChainReport>,
    /// Stored segments no catalog entry reaches.
    pub orphans: Vec<Locator>,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.orphans.is_empty() && self.chains.iter().all(|c| c.status == ChainStatus::Ok)
    }
}

/// Walk every entry's chain, live and deleted, and collect unreachable
/// segments. Never modifies storage.
pub fn verify(table: &FileTable) -> Result<VerifyReport> {
    let store = table.store();
    let mut reachable = HashSet::new();
    let mut chains = Vec::with_capacity(table.catalog().len());

    for (position, entry) in table.catalog().entries().iter().enumerate() {
        let (segments, status) = match walk_chain(store, &entry.chain_start()) {
            Ok(walk) => {
                let actual = walk.content.chars().count();
                let status = match walk.termination {
                    Termination::Truncated => ChainStatus::Truncated,
                    Termination::Cycle => ChainStatus::Cycle,
                    Termination::Eof if actual != entry.total_length => {
                        ChainStatus::LengthMismatch {
                            expected: entry.total_length,
                            actual,
                        }
                    }
                    Termination::Eof => ChainStatus::Ok,
                };
                let n = walk.visited.len();
                reachable.extend(walk.visited);
                (n, status)
            }
            Err(FatError::NotFound { .. }) => (0, ChainStatus::Missing),
            Err(e) => return Err(e),
        };
        if status != ChainStatus::Ok {
            warn!(name = %entry.name, position, ?status, "chain check failed");
        }
        chains.push(ChainReport {
            position,
            name: entry.name.clone(),
            is_deleted: entry.is_deleted,
            segments,
            status,
        });
    }

    let mut orphans: Vec<Locator> = store
        .locators()?
        .into_iter()
        .filter(|l| !reachable.contains(l))
        .collect();
    orphans.sort();

    Ok(VerifyReport { chains, orphans })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::domain::Segment;

    #[test]
    fn healthy_table_is_clean() {
        let mut t = FileTable::open(&StoreConfig::in_memory()).unwrap();
        t.create("a", &"a".repeat(30)).unwrap();
        let b = t.create("b", "").unwrap();
        t.soft_delete(b).unwrap();

        let report = verify(&t).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.chains.len(), 2);
        assert_eq!(report.chains[0].segments, 2);
        assert!(report.chains[1].is_deleted);
    }

    #[test]
    fn empty_table_is_clean() {
        let t = FileTable::open(&StoreConfig::in_memory()).unwrap();
        let report = verify(&t).unwrap();
        assert!(report.is_clean());
        assert!(report.chains.is_empty());
    }

    #[test]
    fn reports_missing_truncated_and_orphans() {
        let mut t = FileTable::open(&StoreConfig::in_memory()).unwrap();
        let a = t.create("a", "abcdef").unwrap();
        let b = t.create("b", "x".repeat(45).as_str()).unwrap();
        let base_a = t.entry(a).unwrap().base_locator.clone();
        let base_b = t.entry(b).unwrap().base_locator.clone();

        let store = t.store_mut();
        store.remove_segment(&base_a.chain_start()).unwrap();
        store.remove_segment(&base_b.segment(2)).unwrap();
        let stray = Locator::new("stray_0");
        store.write_segment(&stray, &Segment::new("?", true)).unwrap();

        let report = verify(&t).unwrap();
        assert!(!report.is_clean());
        assert_eq!(report.chains[0].status, ChainStatus::Missing);
        assert_eq!(report.chains[1].status, ChainStatus::Truncated);
        assert_eq!(report.chains[1].segments, 2);
        assert_eq!(report.orphans, vec![stray]);
    }
}
