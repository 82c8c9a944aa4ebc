//! # Domain Entities
//!
//! Payloads exchanged with peers: profiles, listings, social-graph records,
//! direct messages and stored overlay values.

use super::errors::MarketError;
use super::value_objects::{ContentHash, Guid, SignedPubkey};
use super::wire;
use serde::{Deserialize, Serialize};

/// Sub-key signed by the owning identity (e.g. the bitcoin master key).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyEntry {
    /// Key bytes.
    pub public_key: Vec<u8>,
    /// Owner's Ed25519 signature over `public_key`.
    pub signature: Vec<u8>,
}

/// PGP public key plus a clearsigned statement binding it to a GUID.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PgpCredential {
    /// Armored public key.
    pub public_key: String,
    /// Armored clearsigned text, expected to contain the owner's GUID in hex.
    pub signature: String,
}

/// A node's public profile.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Display name.
    pub name: String,
    /// Optional handle.
    pub handle: Option<String>,
    /// Free-form description.
    pub about: String,
    /// Avatar image.
    pub avatar_hash: Option<ContentHash>,
    /// Header image.
    pub header_hash: Option<ContentHash>,
    /// Adult content flag.
    pub nsfw: bool,
    /// Offers moderation services.
    pub moderator: bool,
    /// Signed bitcoin master public key.
    pub bitcoin_key: Option<PublicKeyEntry>,
    /// Optional PGP credential.
    pub pgp_key: Option<PgpCredential>,
}

impl Profile {
    /// Public metadata snapshot.
    pub fn metadata(&self) -> Metadata {
        Metadata {
            name: self.name.clone(),
            handle: self.handle.clone(),
            avatar_hash: self.avatar_hash,
            nsfw: self.nsfw,
        }
    }
}

/// Lightweight profile subset used in store listings and follow records.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Display name.
    pub name: String,
    /// Optional handle.
    pub handle: Option<String>,
    /// Avatar image.
    pub avatar_hash: Option<ContentHash>,
    /// Adult content flag.
    pub nsfw: bool,
}

/// Summary of one listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ListingMetadata {
    /// Hash of the full contract.
    pub contract_hash: ContentHash,
    /// Item title.
    pub title: String,
    /// Thumbnail image.
    pub thumbnail_hash: Option<ContentHash>,
    /// Category label.
    pub category: String,
    /// Price in `currency_code`.
    pub price: f64,
    /// ISO currency code or `BTC`.
    pub currency_code: String,
    /// Adult content flag.
    pub nsfw: bool,
}

/// A store's listing summaries.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Listings {
    /// One entry per contract.
    pub listings: Vec<ListingMetadata>,
    /// Store handle.
    pub handle: Option<String>,
    /// Store avatar.
    pub avatar_hash: Option<ContentHash>,
}

/// Attestation that `guid` follows `following`, signed by `guid`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follower {
    /// Follower GUID.
    pub guid: Guid,
    /// Followed GUID.
    pub following: Guid,
    /// Follower's signed key.
    pub signed_pubkey: SignedPubkey,
    /// Follower's metadata snapshot.
    pub metadata: Metadata,
    /// Signature over the record with this field empty.
    pub signature: Vec<u8>,
}

impl Follower {
    /// Bytes the signature covers.
    pub fn signing_bytes(&self) -> Result<Vec<u8>, MarketError> {
        let unsigned = Follower {
            signature: Vec::new(),
            ..self.clone()
        };
        wire::encode(&unsigned)
    }
}

/// A node's followers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Followers {
    /// Follower records.
    pub followers: Vec<Follower>,
}

/// A followed user, with metadata signed by that user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowingUser {
    /// Followed GUID.
    pub guid: Guid,
    /// Followed user's signed key.
    pub signed_pubkey: SignedPubkey,
    /// Followed user's metadata.
    pub metadata: Metadata,
    /// Followed user's signature over the encoded metadata.
    pub signature: Vec<u8>,
}

/// Users a node follows.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Following {
    /// Followed users.
    pub users: Vec<FollowingUser>,
}

/// Direct message category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    /// Conversation between users.
    Chat,
    /// Order lifecycle update.
    Order,
    /// Dispute with a moderator.
    Dispute,
}

impl MessageType {
    /// Name handed to message listeners.
    pub fn name(&self) -> &'static str {
        match self {
            MessageType::Chat => "CHAT",
            MessageType::Order => "ORDER",
            MessageType::Dispute => "DISPUTE",
        }
    }
}

/// Signed direct message, encrypted before it leaves the node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaintextMessage {
    /// Sender GUID.
    pub sender_guid: Guid,
    /// Sender's signed key.
    pub signed_pubkey: SignedPubkey,
    /// Sender's X25519 key for replies.
    pub encryption_pubkey: Vec<u8>,
    /// Category.
    pub message_type: MessageType,
    /// Optional subject (the order id for order updates).
    pub subject: Option<String>,
    /// Body text.
    pub message: String,
    /// Sender handle.
    pub handle: Option<String>,
    /// Sender avatar.
    pub avatar_hash: Option<ContentHash>,
    /// Unix seconds.
    pub timestamp: u64,
    /// Signature over the message with this field empty.
    pub signature: Vec<u8>,
}

impl PlaintextMessage {
    /// Bytes the signature covers.
    pub fn signing_bytes(&self) -> Result<Vec<u8>, MarketError> {
        let unsigned = PlaintextMessage {
            signature: Vec::new(),
            ..self.clone()
        };
        wire::encode(&unsigned)
    }
}

/// Value held in the overlay under a key: `(subkey, data)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredValue {
    /// Subkey; for mailbox entries the ephemeral public key.
    pub value_key: Vec<u8>,
    /// Stored bytes; for mailbox entries the box ciphertext.
    pub serialized_data: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn follower() -> Follower {
        Follower {
            guid: Guid::from_bytes([1; 20]),
            following: Guid::from_bytes([2; 20]),
            signed_pubkey: SignedPubkey::from_bytes(vec![3; 96]),
            metadata: Metadata {
                name: "Ada".to_string(),
                ..Default::default()
            },
            signature: vec![9; 64],
        }
    }

    #[test]
    fn test_follower_signing_bytes_ignore_signature() {
        let a = follower();
        let mut b = follower();
        b.signature = vec![7; 64];

        assert_eq!(a.signing_bytes().unwrap(), b.signing_bytes().unwrap());
    }

    #[test]
    fn test_follower_signing_bytes_cover_target() {
        let a = follower();
        let mut b = follower();
        b.following = Guid::from_bytes([4; 20]);

        assert_ne!(a.signing_bytes().unwrap(), b.signing_bytes().unwrap());
    }

    #[test]
    fn test_message_type_names() {
        assert_eq!(MessageType::Chat.name(), "CHAT");
        assert_eq!(MessageType::Order.name(), "ORDER");
        assert_eq!(MessageType::Dispute.name(), "DISPUTE");
    }

    #[test]
    fn test_profile_metadata_snapshot() {
        let profile = Profile {
            name: "Shop".to_string(),
            handle: Some("@shop".to_string()),
            about: "long text".to_string(),
            avatar_hash: Some(ContentHash::of(b"avatar")),
            nsfw: true,
            ..Default::default()
        };
        let metadata = profile.metadata();

        assert_eq!(metadata.name, "Shop");
        assert_eq!(metadata.handle.as_deref(), Some("@shop"));
        assert_eq!(metadata.avatar_hash, profile.avatar_hash);
        assert!(metadata.nsfw);
    }
}
