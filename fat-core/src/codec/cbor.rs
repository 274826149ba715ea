use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{FatError, Result};

pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(64);
    ciborium::ser::into_writer(value, &mut out)
        .map_err(|e| std::io::Error::other(format!("cbor encode: {e}")))?;
    Ok(out)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8], what: &str) -> Result<T> {
    ciborium::de::from_reader(bytes).map_err(|e| FatError::malformed(what, e))
}
