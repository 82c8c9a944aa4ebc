//! # Value Objects
//!
//! Identifiers and node references exchanged with peers.

use serde::{Deserialize, Serialize};
use shared_crypto::signatures::SIGNATURE_LEN;
use shared_crypto::{digest, Ed25519KeyPair};
use std::fmt;
use std::net::SocketAddr;

/// GUID length in bytes.
pub const GUID_LEN: usize = 20;

/// Signed public key length: signature (64) followed by the verify key (32).
pub const SIGNED_PUBKEY_LEN: usize = 96;

/// 20-byte network identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Guid([u8; GUID_LEN]);

impl Guid {
    /// Wrap raw bytes.
    pub const fn from_bytes(bytes: [u8; GUID_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse from an untrusted slice.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        bytes.try_into().ok().map(Self)
    }

    /// Parse from lowercase or uppercase hex.
    pub fn from_hex(s: &str) -> Option<Self> {
        hex::decode(s).ok().and_then(|bytes| Self::from_slice(&bytes))
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; GUID_LEN] {
        &self.0
    }

    /// Lowercase hex.
    pub fn hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Guid({})", self.hex())
    }
}

/// SHA-1 digest of a resource's raw bytes, also the overlay key space.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentHash([u8; 20]);

/// Keys in the shared overlay are pre-digested content hashes.
pub type OverlayKey = ContentHash;

impl ContentHash {
    /// Hash `data`.
    pub fn of(data: &[u8]) -> Self {
        Self(digest(data))
    }

    /// Wrap raw bytes.
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Parse from hex.
    pub fn from_hex(s: &str) -> Option<Self> {
        let bytes = hex::decode(s).ok()?;
        bytes.as_slice().try_into().ok().map(Self)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Owned raw bytes.
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// Lowercase hex, the cache file name.
    pub fn hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.hex())
    }
}

/// Mailbox key for an identity: `digest(guid)`.
pub fn mailbox_key(guid: &Guid) -> OverlayKey {
    ContentHash::of(guid.as_bytes())
}

/// Signature over a signing key, followed by that key.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignedPubkey(Vec<u8>);

impl SignedPubkey {
    /// Wrap untrusted bytes as received from a peer.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Self-sign the key pair's public key.
    pub fn from_keypair(keypair: &Ed25519KeyPair) -> Self {
        let public = keypair.public_key();
        let signature = keypair.sign(public.as_bytes());
        let mut bytes = Vec::with_capacity(SIGNED_PUBKEY_LEN);
        bytes.extend_from_slice(signature.as_bytes());
        bytes.extend_from_slice(public.as_bytes());
        Self(bytes)
    }

    /// Raw bytes (the binding hash input).
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Signature portion.
    pub fn signature(&self) -> &[u8] {
        self.0.get(..SIGNATURE_LEN).unwrap_or(&[])
    }

    /// Verify key portion. Empty if the blob is too short.
    pub fn verify_key(&self) -> &[u8] {
        self.0.get(SIGNATURE_LEN..).unwrap_or(&[])
    }

    /// True when no key material is present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SignedPubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignedPubkey({})", hex::encode(self.verify_key()))
    }
}

/// Reference to a peer. Compared by `id` only.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeIdentity {
    /// GUID.
    pub id: Guid,
    /// Live endpoint, when known.
    pub address: Option<SocketAddr>,
    /// Self-signed signing key.
    pub signed_pubkey: SignedPubkey,
}

impl NodeIdentity {
    /// Peer with a known endpoint.
    pub fn new(id: Guid, address: Option<SocketAddr>, signed_pubkey: SignedPubkey) -> Self {
        Self {
            id,
            address,
            signed_pubkey,
        }
    }

    /// Bare reference used as a mailbox recipient when only the GUID is known.
    pub fn from_guid(id: Guid) -> Self {
        Self {
            id,
            address: None,
            signed_pubkey: SignedPubkey::default(),
        }
    }

    /// Same node at a different endpoint.
    pub fn with_address(mut self, address: SocketAddr) -> Self {
        self.address = Some(address);
        self
    }

    /// True if RPCs can be issued to this node.
    pub fn is_reachable(&self) -> bool {
        self.address.is_some()
    }
}

impl PartialEq for NodeIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for NodeIdentity {}
