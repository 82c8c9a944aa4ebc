//! # Hashing
//!
//! Two digests with distinct roles:
//!
//! - SHA-512 binding hash: derives a GUID from public key material and
//!   carries the proof-of-work window.
//! - SHA-1 overlay digest: the 20-byte Kademlia key space, also used to
//!   content-address cached resources.

use sha1::Sha1;
use sha2::{Digest, Sha512};

/// SHA-512 output (512-bit).
pub type BindingHash = [u8; 64];

/// SHA-1 output (160-bit).
pub type Digest20 = [u8; 20];

/// Hash identity key material with SHA-512.
pub fn binding_hash(data: &[u8]) -> BindingHash {
    let mut output = [0u8; 64];
    output.copy_from_slice(&Sha512::digest(data));
    output
}

/// Hash multiple inputs with SHA-512 as if they were concatenated.
pub fn binding_hash_many(inputs: &[&[u8]]) -> BindingHash {
    let mut hasher = Sha512::new();
    for input in inputs {
        hasher.update(input);
    }
    let mut output = [0u8; 64];
    output.copy_from_slice(&hasher.finalize());
    output
}

/// Overlay digest (SHA-1) used for DHT keys and content addressing.
pub fn digest(data: &[u8]) -> Digest20 {
    let mut output = [0u8; 20];
    output.copy_from_slice(&Sha1::digest(data));
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_known_vector() {
        assert_eq!(
            hex::encode(digest(b"abc")),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn test_binding_hash_known_vector() {
        assert_eq!(
            hex::encode(&binding_hash(b"abc")[..8]),
            "ddaf35a193617aba"
        );
    }

    #[test]
    fn test_binding_hash_many_matches_concatenation() {
        let joined = binding_hash(b"signaturekey");
        let parts = binding_hash_many(&[b"signature", b"key"]);
        assert_eq!(joined, parts);
    }

    #[test]
    fn test_different_inputs() {
        assert_ne!(digest(b"input1"), digest(b"input2"));
    }
}
