//! # Domain Errors
//!
//! Internal error types for the market protocol. Public operations collapse
//! these to absent/negative results; they exist so tests and logs can tell
//! failures apart.

use super::value_objects::Guid;
use shared_crypto::CryptoError;
use thiserror::Error;

/// Why a remote-supplied identity, key or signed record was not trusted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerificationError {
    /// Signature did not verify against the claimed signing key.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Key material is malformed or not a valid curve point.
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Binding hash window is not below the threshold.
    #[error("Proof of work not met: window value {window}")]
    ProofOfWorkNotMet {
        /// Big-endian value of the 3-byte window
        window: u32,
    },

    /// Claimed GUID is not the prefix of the binding hash.
    #[error("GUID does not match binding hash")]
    GuidMismatch,

    /// Returned bytes do not hash to the requested content hash.
    #[error("Content hash mismatch")]
    ContentHashMismatch,

    /// Follower record attests to following someone else.
    #[error("Follower record targets a different node")]
    FollowTargetMismatch,
}

/// Local persistence errors (cache, follow store, profile store).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("I/O error: {message}")]
    Io {
        /// Underlying error text
        message: String,
    },

    /// Stored bytes could not be decoded.
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io {
            message: e.to_string(),
        }
    }
}

/// Market protocol errors.
#[derive(Debug, Error)]
pub enum MarketError {
    /// No address known for the peer, or the RPC failed.
    #[error("Peer unreachable: {0}")]
    Unreachable(Guid),

    /// Authentication failure.
    #[error("Verification failed: {0}")]
    Verification(#[from] VerificationError),

    /// Structured payload could not be parsed or is missing fields.
    #[error("Malformed payload: {0}")]
    Malformed(String),

    /// Local value could not be serialized.
    #[error("Encoding failed: {0}")]
    Encoding(String),

    /// Oversized message or notification, or missing local prerequisite.
    #[error("Policy violation: {0}")]
    PolicyViolation(String),

    /// Encryption or decryption failed.
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Local store failure.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Peer or overlay answered but declined.
    #[error("Rejected: {0}")]
    Rejected(String),
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for `MarketConfig`.
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// A value is out of range.
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pow_error_reports_window() {
        let err = VerificationError::ProofOfWorkNotMet { window: 4242 };
        assert!(err.to_string().contains("4242"));
    }

    #[test]
    fn test_verification_converts_to_market_error() {
        let err: MarketError = VerificationError::GuidMismatch.into();
        assert!(matches!(
            err,
            MarketError::Verification(VerificationError::GuidMismatch)
        ));
    }

    #[test]
    fn test_io_error_converts_to_store_error() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: StoreError = io.into();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_unreachable_names_peer() {
        let err = MarketError::Unreachable(Guid::from_bytes([0xab; 20]));
        assert!(err.to_string().contains("abab"));
    }
}
