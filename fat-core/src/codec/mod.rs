use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub mod cbor;
pub mod json;

/// On-disk encoding shared by segment and catalog records.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordFormat {
    #[default]
    Json,
    Cbor,
}

impl RecordFormat {
    pub fn extension(self) -> &'static str {
        match self {
            RecordFormat::Json => "json",
            RecordFormat::Cbor => "cbor",
        }
    }

    pub fn encode<T: Serialize>(self, value: &T) -> Result<Vec<u8>> {
        match self {
            RecordFormat::Json => json::encode(value),
            RecordFormat::Cbor => cbor::encode(value),
        }
    }

    /// `what` names the record kind in `MalformedRecord` errors.
    pub fn decode<T: DeserializeOwned>(self, bytes: &[u8], what: &str) -> Result<T> {
        match self {
            RecordFormat::Json => json::decode(bytes, what),
            RecordFormat::Cbor => cbor::decode(bytes, what),
        }
    }
}
