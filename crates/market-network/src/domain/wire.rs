//! # Wire Codec
//!
//! Structured payloads (profiles, lists, messages, stored overlay values,
//! node records) are bincode with varint integers. Decoding is bounded and
//! rejects trailing bytes so every payload has exactly one encoding, which
//! the signature schemes rely on.

use super::errors::MarketError;
use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Encode a payload.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, MarketError> {
    bincode::DefaultOptions::new()
        .reject_trailing_bytes()
        .serialize(value)
        .map_err(|e| MarketError::Encoding(e.to_string()))
}

/// Decode an untrusted payload of at most `limit` bytes.
pub fn decode<T: DeserializeOwned>(bytes: &[u8], limit: u64) -> Result<T, MarketError> {
    if bytes.len() as u64 > limit {
        return Err(MarketError::Malformed(format!(
            "payload of {} bytes exceeds limit {}",
            bytes.len(),
            limit
        )));
    }
    bincode::DefaultOptions::new()
        .with_limit(limit)
        .reject_trailing_bytes()
        .deserialize(bytes)
        .map_err(|e| MarketError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u64,
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = encode(&Sample {
            name: "ada".to_string(),
            count: 3,
        })
        .unwrap();
        bytes.push(0);

        assert!(matches!(
            decode::<Sample>(&bytes, 1024),
            Err(MarketError::Malformed(_))
        ));
    }

    #[test]
    fn test_limit_enforced() {
        let bytes = encode(&Sample {
            name: "x".repeat(100),
            count: 1,
        })
        .unwrap();

        assert!(decode::<Sample>(&bytes, 16).is_err());
        assert!(decode::<Sample>(&bytes, 1024).is_ok());
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert!(decode::<Sample>(&[0xff, 0xff, 0xff], 1024).is_err());
    }
}
