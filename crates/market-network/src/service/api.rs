//! `MarketApi` for `MarketService`: component results collapse to
//! absent/negative values here and nowhere else.

use super::MarketService;
use crate::domain::{
    ContentHash, Contract, Followers, Following, Guid, ListingMetadata, Listings, MarketError,
    MessageType, Metadata, NodeIdentity, Profile,
};
use crate::ports::{MarketApi, MessageListener};
use async_trait::async_trait;
use market_telemetry::log_event;

const COMPONENT: &str = "api";

/// Log the failure at DEBUG and drop it.
fn settle<T>(operation: &'static str, result: Result<T, MarketError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            log_event!(debug, COMPONENT, "Operation yielded no result", operation = operation, error = %e);
            None
        }
    }
}

#[async_trait]
impl MarketApi for MarketService {
    async fn fetch_contract(&self, node: &NodeIdentity, hash: ContentHash) -> Option<Contract> {
        settle("fetch_contract", self.fetcher().fetch_contract(node, &hash).await)
    }

    async fn fetch_image(&self, node: &NodeIdentity, hash: ContentHash) -> Option<Vec<u8>> {
        settle("fetch_image", self.fetcher().fetch_image(node, &hash).await)
    }

    async fn fetch_profile(&self, node: &NodeIdentity) -> Option<Profile> {
        settle("fetch_profile", self.fetcher().fetch_profile(node).await)
    }

    async fn fetch_user_metadata(&self, node: &NodeIdentity) -> Option<Metadata> {
        settle("fetch_user_metadata", self.fetcher().fetch_user_metadata(node).await)
    }

    async fn fetch_listings(&self, node: &NodeIdentity) -> Option<Listings> {
        settle("fetch_listings", self.fetcher().fetch_listings(node).await)
    }

    async fn fetch_contract_metadata(
        &self,
        node: &NodeIdentity,
        hash: ContentHash,
    ) -> Option<ListingMetadata> {
        settle(
            "fetch_contract_metadata",
            self.fetcher().fetch_contract_metadata(node, &hash).await,
        )
    }

    async fn send_message(
        &self,
        recipient: &NodeIdentity,
        recipient_encryption_key: &[u8],
        message_type: MessageType,
        body: &str,
        subject: Option<&str>,
        store_only: bool,
    ) -> bool {
        let result = self
            .messenger()
            .send_message(
                recipient,
                recipient_encryption_key,
                message_type,
                body,
                subject,
                store_only,
            )
            .await;
        settle("send_message", result).is_some()
    }

    async fn drain_inbox(&self, listener: &dyn MessageListener) -> usize {
        settle("drain_inbox", self.messenger().drain_inbox(listener).await).unwrap_or(0)
    }

    async fn follow(&self, target: &NodeIdentity) -> bool {
        settle("follow", self.social().follow(target).await).is_some()
    }

    async fn unfollow(&self, target: &NodeIdentity) -> bool {
        settle("unfollow", self.social().unfollow(target).await).is_some()
    }

    async fn get_followers(&self, node: &NodeIdentity) -> Option<Followers> {
        settle("get_followers", self.social().get_followers(node).await)
    }

    async fn get_following(&self, node: &NodeIdentity) -> Option<Following> {
        settle("get_following", self.social().get_following(node).await)
    }

    async fn send_notification(&self, message: &str) -> usize {
        settle("send_notification", self.social().send_notification(message).await).unwrap_or(0)
    }

    async fn purchase(&self, vendor: &NodeIdentity, contract: &Contract) -> Option<Vec<u8>> {
        settle("purchase", self.purchases().purchase(vendor, contract).await)
    }

    async fn confirm_order(&self, buyer: &Guid, contract: &Contract) -> bool {
        settle("confirm_order", self.purchases().confirm_order(buyer, contract).await).is_some()
    }

    async fn make_moderator(&self) -> bool {
        settle("make_moderator", self.moderators().make_moderator().await).is_some()
    }

    async fn unmake_moderator(&self) -> bool {
        settle("unmake_moderator", self.moderators().unmake_moderator().await).is_some()
    }

    async fn fetch_moderators(&self) -> Vec<NodeIdentity> {
        self.moderators().fetch_moderators().await
    }
}
