//! Value Codec Module
//!
//! Converts a [`CacheValue`] to and from the opaque payload stored in the
//! `value` column. The value is wrapped in a single-field envelope and
//! serialized with bincode; the enum tag preserves the value's type.

use bincode::Options;
use serde::{Deserialize, Serialize};

use crate::cache::{CacheValue, MAX_PAYLOAD_SIZE};
use crate::error::{CacheError, Result};

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    value: &'a CacheValue,
}

#[derive(Deserialize)]
struct Envelope {
    value: CacheValue,
}

/// Varint integers, little endian, trailing bytes rejected.
fn options() -> impl Options {
    bincode::DefaultOptions::new()
}

// == Encode ==
/// Serializes a value into a payload.
///
/// Fails with `PayloadTooLarge` if the result does not fit the column.
pub fn encode(value: &CacheValue) -> Result<Vec<u8>> {
    let bytes = options()
        .serialize(&EnvelopeRef { value })
        .map_err(|e| CacheError::Encode(e.to_string()))?;

    if bytes.len() > MAX_PAYLOAD_SIZE {
        return Err(CacheError::PayloadTooLarge {
            size: bytes.len(),
            max: MAX_PAYLOAD_SIZE,
        });
    }

    Ok(bytes)
}

// == Decode ==
/// Deserializes a payload produced by [`encode`].
pub fn decode(bytes: &[u8]) -> Result<CacheValue> {
    options()
        .with_limit(MAX_PAYLOAD_SIZE as u64)
        .deserialize::<Envelope>(bytes)
        .map(|envelope| envelope.value)
        .map_err(|e| CacheError::Decode(e.to_string()))
}
