//! # Inbound Ports
//!
//! Operations exposed to the application. Failures of any kind collapse to
//! an absent or negative result so callers cannot tell which check failed.

use crate::domain::{
    Contract, ContentHash, Followers, Following, Guid, ListingMetadata, Listings, MessageType,
    Metadata, NodeIdentity, Profile,
};
use crate::ports::outbound::MessageListener;
use async_trait::async_trait;

/// Market API - inbound port.
#[async_trait]
pub trait MarketApi: Send + Sync {
    /// Fetch, verify and cache a contract; its images are fetched in the background.
    async fn fetch_contract(&self, node: &NodeIdentity, hash: ContentHash) -> Option<Contract>;

    /// Fetch, verify and cache an image.
    async fn fetch_image(&self, node: &NodeIdentity, hash: ContentHash) -> Option<Vec<u8>>;

    /// Fetch a signed profile. An unverifiable PGP credential is stripped.
    async fn fetch_profile(&self, node: &NodeIdentity) -> Option<Profile>;

    /// Fetch signed name/handle/avatar.
    async fn fetch_user_metadata(&self, node: &NodeIdentity) -> Option<Metadata>;

    /// Fetch a store's signed listing summaries.
    async fn fetch_listings(&self, node: &NodeIdentity) -> Option<Listings>;

    /// Fetch one signed listing summary.
    async fn fetch_contract_metadata(
        &self,
        node: &NodeIdentity,
        hash: ContentHash,
    ) -> Option<ListingMetadata>;

    /// Encrypt, sign and deliver a message, falling back to the mailbox.
    /// Returns true if the message was delivered or stored.
    async fn send_message(
        &self,
        recipient: &NodeIdentity,
        recipient_encryption_key: &[u8],
        message_type: MessageType,
        body: &str,
        subject: Option<&str>,
        store_only: bool,
    ) -> bool;

    /// Deliver every verifiable mailbox entry to `listener` and clear the mailbox.
    /// Returns the number of messages delivered.
    async fn drain_inbox(&self, listener: &dyn MessageListener) -> usize;

    /// Follow `target`; true once the following entry is persisted.
    async fn follow(&self, target: &NodeIdentity) -> bool;

    /// Unfollow `target`.
    async fn unfollow(&self, target: &NodeIdentity) -> bool;

    /// Verified follower list of `node`.
    async fn get_followers(&self, node: &NodeIdentity) -> Option<Followers>;

    /// Verified following list of `node`.
    async fn get_following(&self, node: &NodeIdentity) -> Option<Following>;

    /// Notify every online follower; returns how many acknowledged.
    async fn send_notification(&self, message: &str) -> usize;

    /// Send an order to the vendor; returns the vendor's signature over the
    /// buyer's payment address.
    async fn purchase(&self, vendor: &NodeIdentity, contract: &Contract) -> Option<Vec<u8>>;

    /// Send the vendor's confirmation to the buyer, or to the buyer's mailbox.
    async fn confirm_order(&self, buyer: &Guid, contract: &Contract) -> bool;

    /// Publish this node as a moderator.
    async fn make_moderator(&self) -> bool;

    /// Retract the moderator record.
    async fn unmake_moderator(&self) -> bool;

    /// Moderator records that pass identity verification.
    async fn fetch_moderators(&self) -> Vec<NodeIdentity>;
}
