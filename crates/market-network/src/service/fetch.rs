//! # Resource Fetch-Verify-Cache
//!
//! Every fetch follows the same order: RPC, verify, parse, cache, then spawn
//! background fetches for dependent images. Nothing is cached or followed up
//! before verification succeeds.

use super::helpers::{first_part, require_address, verified_payload};
use super::MarketContext;
use crate::domain::{
    canonical_json, verify_key_chain, verify_signature, wire, ContentHash, Contract,
    ListingMetadata, Listings, MarketError, Metadata, NodeIdentity, Profile, VerificationError,
};
use market_telemetry::{log_peer_event, log_resource_event};
use std::sync::Arc;
use tokio::task::JoinHandle;

const COMPONENT: &str = "fetch";

/// Fetch-verify-cache component.
#[derive(Clone)]
pub struct ResourceFetcher {
    ctx: Arc<MarketContext>,
}

impl ResourceFetcher {
    /// Create the component.
    pub fn new(ctx: Arc<MarketContext>) -> Self {
        Self { ctx }
    }

    /// Fetch a contract by hash.
    ///
    /// The raw bytes must hash to `hash`, the vendor's signature over the
    /// canonical listing must verify against `node`, and every listed
    /// moderator's key chain must verify. Referenced images that are not
    /// cached yet are fetched in the background.
    pub async fn fetch_contract(
        &self,
        node: &NodeIdentity,
        hash: &ContentHash,
    ) -> Result<Contract, MarketError> {
        require_address(node)?;
        let response = self.ctx.rpc.call_get_contract(node, hash).await;
        let raw = first_part(&response, node)?;
        if ContentHash::of(raw) != *hash {
            return Err(VerificationError::ContentHashMismatch.into());
        }

        let contract = Contract::from_bytes(raw)?;
        verify_signature(
            node.signed_pubkey.verify_key(),
            &canonical_json(contract.listing()?)?,
            &contract.vendor_signature()?,
        )?;
        for moderator in contract.moderators()? {
            verify_key_chain(&moderator)?;
        }
        let images = contract.image_hashes()?;

        self.ctx.cache.store(raw)?;
        log_resource_event!(debug, COMPONENT, "Contract verified and cached", hash, images = images.len());

        self.spawn_missing_images(node, images);
        Ok(contract)
    }

    /// Fetch an image by hash.
    pub async fn fetch_image(
        &self,
        node: &NodeIdentity,
        hash: &ContentHash,
    ) -> Result<Vec<u8>, MarketError> {
        require_address(node)?;
        let response = self.ctx.rpc.call_get_image(node, hash).await;
        let bytes = first_part(&response, node)?;
        if ContentHash::of(bytes) != *hash {
            return Err(VerificationError::ContentHashMismatch.into());
        }
        self.ctx.cache.store(bytes)?;
        Ok(bytes.to_vec())
    }

    /// Fetch a signed profile.
    ///
    /// A PGP credential that does not verify is removed; the rest of the
    /// profile is still returned.
    pub async fn fetch_profile(&self, node: &NodeIdentity) -> Result<Profile, MarketError> {
        require_address(node)?;
        let response = self.ctx.rpc.call_get_profile(node).await;
        let data = verified_payload(&response, node)?;
        let mut profile: Profile = wire::decode(data, self.ctx.config.max_payload_bytes)?;

        if let Some(credential) = &profile.pgp_key {
            if !self.ctx.credentials.verify(credential, &node.id) {
                log_peer_event!(debug, COMPONENT, "Stripping unverifiable PGP credential", node.id);
                profile.pgp_key = None;
            }
        }

        self.spawn_missing_images(node, profile.avatar_hash.into_iter().chain(profile.header_hash));
        Ok(profile)
    }

    /// Fetch signed name/handle/avatar.
    pub async fn fetch_user_metadata(&self, node: &NodeIdentity) -> Result<Metadata, MarketError> {
        require_address(node)?;
        let response = self.ctx.rpc.call_get_user_metadata(node).await;
        let data = verified_payload(&response, node)?;
        let metadata: Metadata = wire::decode(data, self.ctx.config.max_payload_bytes)?;

        self.spawn_missing_images(node, metadata.avatar_hash);
        Ok(metadata)
    }

    /// Fetch a store's signed listing summaries.
    pub async fn fetch_listings(&self, node: &NodeIdentity) -> Result<Listings, MarketError> {
        require_address(node)?;
        let response = self.ctx.rpc.call_get_listings(node).await;
        let data = verified_payload(&response, node)?;
        wire::decode(data, self.ctx.config.max_payload_bytes)
    }

    /// Fetch one signed listing summary and its thumbnail.
    pub async fn fetch_contract_metadata(
        &self,
        node: &NodeIdentity,
        hash: &ContentHash,
    ) -> Result<ListingMetadata, MarketError> {
        require_address(node)?;
        let response = self.ctx.rpc.call_get_contract_metadata(node, hash).await;
        let data = verified_payload(&response, node)?;
        let listing: ListingMetadata = wire::decode(data, self.ctx.config.max_payload_bytes)?;

        self.spawn_missing_images(node, listing.thumbnail_hash);
        Ok(listing)
    }

    /// Whether `hash` is already cached.
    pub fn is_cached(&self, hash: &ContentHash) -> bool {
        self.ctx.cache.contains(hash)
    }

    /// Cached bytes for `hash`.
    pub fn cached(&self, hash: &ContentHash) -> Result<Option<Vec<u8>>, MarketError> {
        Ok(self.ctx.cache.load(hash)?)
    }

    /// Fetch an image on a background task with its own outcome.
    pub fn spawn_image_fetch(
        &self,
        node: &NodeIdentity,
        hash: ContentHash,
    ) -> JoinHandle<Result<Vec<u8>, MarketError>> {
        let fetcher = self.clone();
        let node = node.clone();
        tokio::spawn(async move {
            let result = fetcher.fetch_image(&node, &hash).await;
            if let Err(e) = &result {
                log_resource_event!(debug, COMPONENT, "Background image fetch failed", hash, error = %e);
            }
            result
        })
    }

    fn spawn_missing_images<I>(&self, node: &NodeIdentity, hashes: I)
    where
        I: IntoIterator<Item = ContentHash>,
    {
        for hash in hashes {
            if !self.is_cached(&hash) {
                // Detached; the caller does not wait on dependent images
                drop(self.spawn_image_fetch(node, hash));
            }
        }
    }
}
