// fat_core/src/domain.rs
use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::Result;
use crate::util::sanitize::file_stem;

/// Opaque key addressing one durable segment record.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locator(String);

impl Locator {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stem from which every segment locator of one chain is derived.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BaseLocator(String);

impl BaseLocator {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// `<stem>_<16 hex chars>`; the random suffix keeps same-named files on
    /// separate chains.
    pub fn generate(name: &str) -> Result<Self> {
        let mut id = [0u8; 8];
        getrandom::getrandom(&mut id)
            .map_err(|e| std::io::Error::other(format!("getrandom: {e}")))?;
        Ok(Self(format!("{}_{}", file_stem(name), hex::encode(id))))
    }

    /// Locator of the segment at 0-based chain position `index`.
    pub fn segment(&self, index: usize) -> Locator {
        Locator(format!("{}_{index}", self.0))
    }

    pub fn chain_start(&self) -> Locator {
        self.segment(0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BaseLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub payload: String,
    pub next_locator: Option<Locator>,
    pub is_last: bool,
}

impl Segment {
    pub fn new(payload: impl Into<String>, is_last: bool) -> Self {
        Self {
            payload: payload.into(),
            next_locator: None,
            is_last,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    pub base_locator: BaseLocator,
    pub is_deleted: bool,
    /// Length in chars of the most recently saved content.
    pub total_length: usize,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub modified_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub deleted_at: Option<OffsetDateTime>,
}

impl FileEntry {
    pub fn chain_start(&self) -> Locator {
        self.base_locator.chain_start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_locators_follow_base() {
        let base = BaseLocator::new("notes_00ff");
        assert_eq!(base.chain_start().as_str(), "notes_00ff_0");
        assert_eq!(base.segment(12).as_str(), "notes_00ff_12");
    }

    #[test]
    fn generated_bases_do_not_collide() {
        let a = BaseLocator::generate("notes").unwrap();
        let b = BaseLocator::generate("notes").unwrap();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("notes_"));
        assert_eq!(a.as_str().len(), "notes_".len() + 16);
    }
}
