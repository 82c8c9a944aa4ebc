//! # Shared Crypto - Market Network Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `signatures` | Ed25519 | Identity keys, signed payloads, key-chain attestations |
//! | `hashing` | SHA-512, SHA-1 | GUID binding hash, overlay keys and content addressing |
//! | `sealed_box` | X25519 + HKDF-SHA256 + XChaCha20-Poly1305 | Ephemeral-box encryption of messages and orders |
//!
//! ## Security Properties
//!
//! - **Ed25519**: Deterministic nonces, no RNG dependency when signing
//! - **Ephemeral box**: One-time sender key per message, authenticated ciphertext
//! - **XChaCha20**: 192-bit random nonce, safe to generate per message

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod hashing;
pub mod sealed_box;
pub mod signatures;

// Re-exports
pub use errors::CryptoError;
pub use hashing::{binding_hash, digest, BindingHash, Digest20};
pub use sealed_box::{open, seal, EncryptionKeyPair, SealedBox};
pub use signatures::{verify_detached, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
