use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{FatError, Result};

pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(value).map_err(|e| std::io::Error::other(e).into())
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8], what: &str) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| FatError::malformed(what, e))
}
