//! # Outbound Ports
//!
//! Collaborators the protocol core drives: the RPC transport, the shared
//! key-value overlay, local stores and the PGP credential checker.

use crate::domain::{
    ContentHash, Followers, Following, FollowingUser, Guid, NodeIdentity, OverlayKey,
    PgpCredential, Profile, StoreError,
};
use async_trait::async_trait;

/// Acknowledgement token peers send as the first payload element.
pub const ACK: &[u8] = b"True";

/// Result of one RPC exchange.
///
/// Transport failures and timeouts arrive as `success == false`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RpcResponse {
    /// Whether the peer answered.
    pub success: bool,
    /// Response parts.
    pub payload: Vec<Vec<u8>>,
}

impl RpcResponse {
    /// Successful response.
    pub fn ok(payload: Vec<Vec<u8>>) -> Self {
        Self {
            success: true,
            payload,
        }
    }

    /// Failed exchange.
    pub fn failed() -> Self {
        Self::default()
    }

    /// Peer answered and its first part is the acknowledgement token.
    pub fn acknowledged(&self) -> bool {
        self.success && self.payload.first().map(Vec::as_slice) == Some(ACK)
    }
}

/// RPC transport - outbound port.
///
/// One request/response exchange per call. Retries and timeouts belong to
/// the implementation.
#[async_trait]
pub trait MarketRpc: Send + Sync {
    /// Full contract bytes by hash.
    async fn call_get_contract(&self, node: &NodeIdentity, hash: &ContentHash) -> RpcResponse;

    /// Image bytes by hash.
    async fn call_get_image(&self, node: &NodeIdentity, hash: &ContentHash) -> RpcResponse;

    /// Signed profile: `[profile, signature]`.
    async fn call_get_profile(&self, node: &NodeIdentity) -> RpcResponse;

    /// Signed metadata: `[metadata, signature]`.
    async fn call_get_user_metadata(&self, node: &NodeIdentity) -> RpcResponse;

    /// Signed listings: `[listings, signature]`.
    async fn call_get_listings(&self, node: &NodeIdentity) -> RpcResponse;

    /// Signed single listing summary: `[listing_metadata, signature]`.
    async fn call_get_contract_metadata(
        &self,
        node: &NodeIdentity,
        hash: &ContentHash,
    ) -> RpcResponse;

    /// Follow request; answer `["True", metadata, metadata_signature]`.
    async fn call_follow(
        &self,
        node: &NodeIdentity,
        follower: Vec<u8>,
        signature: Vec<u8>,
    ) -> RpcResponse;

    /// Unfollow request signed over `"unfollow:" ‖ guid`.
    async fn call_unfollow(&self, node: &NodeIdentity, signature: Vec<u8>) -> RpcResponse;

    /// Signed follower list: `[followers, signature]`.
    async fn call_get_followers(&self, node: &NodeIdentity) -> RpcResponse;

    /// Signed following list: `[following, signature]`.
    async fn call_get_following(&self, node: &NodeIdentity) -> RpcResponse;

    /// Follower notification.
    async fn call_notify(
        &self,
        node: &NodeIdentity,
        message: String,
        signature: Vec<u8>,
    ) -> RpcResponse;

    /// Direct message box.
    async fn call_message(
        &self,
        node: &NodeIdentity,
        ephemeral_pubkey: [u8; 32],
        ciphertext: Vec<u8>,
    ) -> RpcResponse;

    /// Sealed contract with the buyer's order; answer `[signature over payment address]`.
    async fn call_order(
        &self,
        node: &NodeIdentity,
        ephemeral_pubkey: [u8; 32],
        ciphertext: Vec<u8>,
    ) -> RpcResponse;

    /// Sealed contract with the vendor's confirmation.
    async fn call_order_confirmation(
        &self,
        node: &NodeIdentity,
        ephemeral_pubkey: [u8; 32],
        ciphertext: Vec<u8>,
    ) -> RpcResponse;

    /// Whether the transport can carry calls yet.
    fn is_ready(&self) -> bool;
}

/// Shared key-value overlay (DHT) - outbound port.
///
/// Keys are already digested. `set` stores `StoredValue { value_key: subkey,
/// serialized_data: value }` and `get` returns those records wire-encoded.
#[async_trait]
pub trait Overlay: Send + Sync {
    /// All records under `key`.
    async fn get(&self, key: &OverlayKey) -> Vec<Vec<u8>>;

    /// Store `value` under `(key, subkey)`.
    async fn set(&self, key: OverlayKey, subkey: Vec<u8>, value: Vec<u8>) -> bool;

    /// Remove `(key, subkey)`; `signature` is the owner's signature over `subkey`.
    async fn delete(&self, key: OverlayKey, subkey: Vec<u8>, signature: Vec<u8>) -> bool;

    /// Current record for a GUID, with its live address if online.
    async fn resolve(&self, guid: &Guid) -> Option<NodeIdentity>;
}

/// Content-addressed resource cache - outbound port.
pub trait ResourceCache: Send + Sync {
    /// Whether `hash` is cached.
    fn contains(&self, hash: &ContentHash) -> bool;

    /// Persist `bytes` under their own hash. No-op if already present.
    fn store(&self, bytes: &[u8]) -> Result<ContentHash, StoreError>;

    /// Cached bytes.
    fn load(&self, hash: &ContentHash) -> Result<Option<Vec<u8>>, StoreError>;
}

/// Local social graph - outbound port.
pub trait FollowStore: Send + Sync {
    /// Nodes following us.
    fn followers(&self) -> Result<Followers, StoreError>;

    /// Nodes we follow.
    fn following(&self) -> Result<Following, StoreError>;

    /// Add or replace (by GUID) a followed user.
    fn follow(&self, user: FollowingUser) -> Result<(), StoreError>;

    /// Remove a followed user.
    fn unfollow(&self, guid: &Guid) -> Result<(), StoreError>;
}

/// Local profile - outbound port.
pub trait ProfileStore: Send + Sync {
    /// Current profile.
    fn get(&self) -> Result<Profile, StoreError>;

    /// Replace the profile.
    fn update(&self, profile: Profile) -> Result<(), StoreError>;
}

/// PGP credential checker - outbound port.
pub trait CredentialVerifier: Send + Sync {
    /// Whether `credential` is valid and bound to `guid`.
    fn verify(&self, credential: &PgpCredential, guid: &Guid) -> bool;
}

/// Application listener for decrypted inbox messages.
pub trait MessageListener: Send + Sync {
    /// Deliver one verified message.
    fn notify(
        &self,
        sender: Guid,
        encryption_pubkey: Vec<u8>,
        subject: Option<String>,
        message_type: &str,
        body: String,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acknowledged() {
        assert!(RpcResponse::ok(vec![b"True".to_vec()]).acknowledged());
        assert!(!RpcResponse::ok(vec![b"False".to_vec()]).acknowledged());
        assert!(!RpcResponse::ok(vec![]).acknowledged());
        assert!(!RpcResponse {
            success: false,
            payload: vec![b"True".to_vec()],
        }
        .acknowledged());
    }

    #[test]
    fn test_failed_response_is_empty() {
        let response = RpcResponse::failed();
        assert!(!response.success);
        assert!(response.payload.is_empty());
    }
}
