//! # Local Identity
//!
//! The node's own keys: Ed25519 signing key, the X25519 key derived from the
//! same seed, the resulting node record and the payment master key used for
//! moderator registration.

use super::errors::VerificationError;
use super::value_objects::{Guid, NodeIdentity, SignedPubkey};
use super::verification::derive_guid;
use shared_crypto::{Ed25519KeyPair, EncryptionKeyPair};
use std::fmt;
use std::net::SocketAddr;

/// Keys and node record of the local node.
pub struct LocalIdentity {
    keypair: Ed25519KeyPair,
    encryption: EncryptionKeyPair,
    node: NodeIdentity,
    payment_master_pubkey: Vec<u8>,
}

impl LocalIdentity {
    /// Load an identity from its signing seed.
    ///
    /// Fails if the seed's signed key does not meet the proof-of-work constraint.
    pub fn from_seed(seed: [u8; 32], address: Option<SocketAddr>) -> Result<Self, VerificationError> {
        let keypair = Ed25519KeyPair::from_seed(seed);
        let signed_pubkey = SignedPubkey::from_keypair(&keypair);
        let guid = derive_guid(&signed_pubkey)?;

        Ok(Self {
            encryption: EncryptionKeyPair::from_seed(seed),
            keypair,
            node: NodeIdentity::new(guid, address, signed_pubkey),
            payment_master_pubkey: Vec::new(),
        })
    }

    /// Grind random keys until one meets the proof-of-work constraint.
    ///
    /// Takes on the order of seconds.
    pub fn generate(address: Option<SocketAddr>) -> Self {
        loop {
            let seed = Ed25519KeyPair::generate().to_seed();
            if let Ok(identity) = Self::from_seed(seed, address) {
                return identity;
            }
        }
    }

    /// Attach the payment master public key.
    pub fn with_payment_master_pubkey(mut self, key: Vec<u8>) -> Self {
        self.payment_master_pubkey = key;
        self
    }

    /// GUID.
    pub fn guid(&self) -> Guid {
        self.node.id
    }

    /// Node record as published to peers.
    pub fn node(&self) -> &NodeIdentity {
        &self.node
    }

    /// Self-signed key.
    pub fn signed_pubkey(&self) -> &SignedPubkey {
        &self.node.signed_pubkey
    }

    /// Detached Ed25519 signature.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.keypair.sign(message).to_vec()
    }

    /// X25519 key pair for opening sealed boxes.
    pub fn encryption_keys(&self) -> &EncryptionKeyPair {
        &self.encryption
    }

    /// X25519 public key.
    pub fn encryption_public_key(&self) -> [u8; 32] {
        self.encryption.public_key()
    }

    /// Payment master public key; empty if not configured.
    pub fn payment_master_pubkey(&self) -> &[u8] {
        &self.payment_master_pubkey
    }
}

impl fmt::Debug for LocalIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalIdentity")
            .field("guid", &self.node.id)
            .field("address", &self.node.address)
            .finish_non_exhaustive()
    }
}
